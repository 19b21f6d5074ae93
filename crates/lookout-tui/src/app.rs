//! Main application loop for the LOOKOUT TUI.
//!
//! The `App` owns the terminal and the list cursor; alert state itself is
//! owned by the feed coordinator and observed here through a `watch`
//! receiver as immutable snapshots. Rendering is a pure function of the
//! latest snapshot, the media reading, and the selection.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};
use tracing::debug;

use lookout_feed::{FeedHandle, FeedSnapshot, MediaHandle, MediaStatus, SelectionTracker};

use crate::event::{AppEvent, InputHandler};
use crate::widget::{render, DashboardView};

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// How long to wait for a key event before checking for feed updates.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Main application state.
pub struct App {
    /// Latest published feed state (cloned out of the watch channel)
    state: FeedSnapshot,
    feed_rx: watch::Receiver<FeedSnapshot>,
    /// Manual-refresh requests back to the coordinator
    refresh_tx: mpsc::Sender<()>,
    media_rx: Option<watch::Receiver<MediaStatus>>,
    /// The currently inspected alert, tracked by id only
    selection: SelectionTracker,
    input_handler: InputHandler,
    /// List cursor position (0 = newest)
    cursor: usize,
    show_help: bool,
    should_quit: bool,
    /// Whether the UI needs a redraw
    dirty: bool,
}

impl App {
    /// Create the app wired to a running feed (and optional media monitor).
    pub fn new(feed: &FeedHandle, media: Option<&MediaHandle>) -> Self {
        let feed_rx = feed.subscribe();
        let state = feed_rx.borrow().clone();
        Self {
            state,
            feed_rx,
            refresh_tx: feed.refresh_sender(),
            media_rx: media.map(|m| m.subscribe()),
            selection: SelectionTracker::new(),
            input_handler: InputHandler::new(),
            cursor: 0,
            show_help: false,
            should_quit: false,
            dirty: true,
        }
    }

    /// Run the TUI until quit. Sets up and restores the terminal.
    pub fn run(&mut self) -> AppResult<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> AppResult<()> {
        while !self.should_quit {
            // Input first; one callback at a time, handled to completion.
            if event::poll(INPUT_POLL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let app_event = self.input_handler.handle_key(key);
                        self.handle_event(app_event);
                    }
                    Event::Resize(..) => self.dirty = true,
                    _ => {}
                }
            }

            self.absorb_updates();

            if self.dirty {
                let media = self.media_rx.as_ref().map(|rx| rx.borrow().clone());
                let view = DashboardView {
                    state: &self.state,
                    media: media.as_ref(),
                    selection: &self.selection,
                    cursor: self.cursor,
                    show_help: self.show_help,
                };
                terminal.draw(|frame| render(frame, &view))?;
                self.dirty = false;
            }
        }
        Ok(())
    }

    /// Pull the latest published snapshots, if any changed.
    fn absorb_updates(&mut self) {
        if self.feed_rx.has_changed().unwrap_or(false) {
            self.state = self.feed_rx.borrow_and_update().clone();
            // Keep the cursor on a valid row as the list shrinks.
            if !self.state.alerts.is_empty() {
                self.cursor = self.cursor.min(self.state.alerts.len() - 1);
            } else {
                self.cursor = 0;
            }
            self.dirty = true;
        }
        if let Some(rx) = self.media_rx.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                rx.mark_unchanged();
                self.dirty = true;
            }
        }
    }

    /// Apply one user event.
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit | AppEvent::ForceQuit => {
                self.should_quit = true;
            }
            AppEvent::NavigateUp => {
                self.cursor = self.cursor.saturating_sub(1);
                self.dirty = true;
            }
            AppEvent::NavigateDown => {
                if self.cursor + 1 < self.state.alerts.len() {
                    self.cursor += 1;
                    self.dirty = true;
                }
            }
            AppEvent::GoToTop => {
                self.cursor = 0;
                self.dirty = true;
            }
            AppEvent::GoToBottom => {
                self.cursor = self.state.alerts.len().saturating_sub(1);
                self.dirty = true;
            }
            AppEvent::Select => {
                if let Some(alert) = self.state.alerts.get(self.cursor) {
                    debug!(id = %alert.id, "alert selected");
                    self.selection.select(alert.id.clone());
                    self.dirty = true;
                }
            }
            AppEvent::Cancel => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.selection.clear();
                }
                self.dirty = true;
            }
            AppEvent::Refresh => {
                // Full channel means a fetch is already queued; fine either way.
                let _ = self.refresh_tx.try_send(());
                self.dirty = true;
            }
            AppEvent::ShowHelp => {
                self.show_help = true;
                self.dirty = true;
            }
            AppEvent::None => {}
        }
    }
}

/// Put the terminal into raw mode on the alternate screen.
fn setup_terminal() -> AppResult<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore terminal to its normal state.
///
/// Also called from the binary's panic hook, so it must be safe to run
/// whether or not setup completed.
pub fn restore_terminal() -> AppResult<()> {
    let _ = crossterm::terminal::disable_raw_mode();
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen)?;
    crossterm::execute!(stdout, crossterm::cursor::Show)?;
    Ok(())
}
