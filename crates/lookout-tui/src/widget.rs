//! Dashboard rendering: pure functions of the published feed state.
//!
//! Nothing here mutates alert state; every panel is drawn from the
//! immutable [`FeedSnapshot`] and media reading passed in.

use lookout_core::alert::Alert;
use lookout_feed::{FeedSnapshot, MediaState, MediaStatus, PushState, SelectionTracker};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Everything the dashboard draws from.
pub struct DashboardView<'a> {
    pub state: &'a FeedSnapshot,
    pub media: Option<&'a MediaStatus>,
    pub selection: &'a SelectionTracker,
    pub cursor: usize,
    pub show_help: bool,
}

/// Render the full dashboard into the frame.
pub fn render(frame: &mut Frame, view: &DashboardView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(8),    // body
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], view.state);
    render_body(frame, chunks[1], view);
    render_status_bar(frame, chunks[2], view.state);

    if view.show_help {
        render_help_overlay(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &FeedSnapshot) {
    let clock = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let title = Line::from(vec![
        Span::styled(
            " LOOKOUT ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("Detection Dashboard"),
        Span::raw("  "),
        Span::styled(
            format!("{} alerts", state.alerts.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let header = Paragraph::new(title)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(clock, Style::default().fg(Color::DarkGray))),
        )
        .alignment(Alignment::Left);
    frame.render_widget(header, area);
}

fn render_body(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_alert_list(frame, columns[0], view);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(5)])
        .split(columns[1]);

    render_detail_panel(frame, right[0], view);
    render_feed_panel(frame, right[1], view.media);
}

fn render_alert_list(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let state = view.state;
    let block = Block::default().borders(Borders::ALL).title("Recent Alerts");

    if state.alerts.is_empty() {
        let message = if let Some(error) = &state.fetch_error {
            Line::from(Span::styled(
                format!("Error loading alerts: {error}"),
                Style::default().fg(Color::Red),
            ))
        } else if !state.loaded {
            Line::from(Span::styled(
                "Loading alerts...",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(Span::styled(
                "No alerts available.",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let selected_id = view.selection.selected_id();
    let items: Vec<ListItem> = state
        .alerts
        .iter()
        .map(|alert| alert_row(alert, selected_id == Some(alert.id.as_str())))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(view.cursor.min(state.alerts.len() - 1)));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn alert_row(alert: &Alert, selected: bool) -> ListItem<'static> {
    let confidence_color = if alert.confidence >= 0.9 {
        Color::Red
    } else if alert.confidence >= 0.7 {
        Color::Yellow
    } else {
        Color::Green
    };

    let marker = if selected { "* " } else { "  " };
    ListItem::new(Line::from(vec![
        Span::raw(marker.to_string()),
        Span::styled(
            format!("{:<20}", alert.category),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:>7}", alert.confidence_percent()),
            Style::default().fg(confidence_color),
        ),
        Span::raw("  "),
        Span::styled(
            alert.detected_at_local(),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

fn render_detail_panel(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let block = Block::default().borders(Borders::ALL).title("Alert Clip");

    let content = match view.selection.current(&view.state.alerts) {
        Some(alert) => vec![
            Line::from(vec![
                Span::styled("Type: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(alert.category.clone()),
            ]),
            Line::from(vec![
                Span::styled("Confidence: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(alert.confidence_percent()),
            ]),
            Line::from(vec![
                Span::styled("Detected At: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(alert.detected_at_local()),
            ]),
            Line::from(""),
            Line::from(Span::styled("Clip:", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(
                alert.clip_reference.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "Select an alert to view the clip.",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))],
    };

    frame.render_widget(
        Paragraph::new(content).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_feed_panel(frame: &mut Frame, area: Rect, media: Option<&MediaStatus>) {
    let block = Block::default().borders(Borders::ALL).title("Live Feed");

    let content = match media {
        Some(status) => {
            let color = match status.state {
                MediaState::Live => Color::Green,
                MediaState::Connecting => Color::Yellow,
                MediaState::Stalled => Color::Yellow,
                MediaState::Down => Color::Red,
            };
            vec![
                Line::from(vec![
                    Span::raw("Stream: "),
                    Span::styled(
                        status.state.label(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!(
                        "{} received, {}/s",
                        format_bytes(status.bytes_received),
                        format_bytes(status.bytes_per_sec)
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
        None => vec![Line::from(Span::styled(
            "No feed configured.",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))],
    };

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &FeedSnapshot) {
    let mut spans = vec![Span::styled(
        " q quit | ?/h help | j/k move | Enter inspect | r refresh ",
        Style::default().fg(Color::DarkGray),
    )];

    if state.fetch_in_flight {
        spans.push(Span::styled("fetching… ", Style::default().fg(Color::Yellow)));
    } else if state.fetch_error.is_some() {
        spans.push(Span::styled("poll error ", Style::default().fg(Color::Red)));
    }

    let push_color = match state.push {
        PushState::Connected => Color::Green,
        PushState::Connecting => Color::Yellow,
        PushState::Disconnected => Color::DarkGray,
    };
    spans.push(Span::styled(
        format!("push: {}", state.push.label()),
        Style::default().fg(push_color),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Up/k, Down/j   move the list cursor"),
        Line::from("  Home/g, End/G  jump to newest / oldest"),
        Line::from("  Enter          inspect the alert under the cursor"),
        Line::from("  Esc            close help / clear inspection"),
        Line::from("  r              fetch a snapshot now"),
        Line::from("  q              quit"),
    ];
    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Help (Esc to close)"),
    );
    frame.render_widget(help, area);
}

/// Center a `percent_x` by `percent_y` rectangle inside `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Human-readable byte count.
fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MiB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
