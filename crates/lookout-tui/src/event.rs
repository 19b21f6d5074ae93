//! Event handling for the LOOKOUT TUI.
//!
//! Provides keyboard input handling and event routing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Application-level events that can trigger state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Request application quit
    Quit,
    /// Force quit (Ctrl+C)
    ForceQuit,
    /// Navigate up in the alert list
    NavigateUp,
    /// Navigate down in the alert list
    NavigateDown,
    /// Go to the newest alert
    GoToTop,
    /// Go to the oldest retained alert
    GoToBottom,
    /// Inspect the alert under the cursor
    Select,
    /// Cancel: close help or clear the inspected alert
    Cancel,
    /// Request an immediate snapshot fetch
    Refresh,
    /// Show the help overlay
    ShowHelp,
    /// No action needed
    None,
}

/// Input handler for converting key events to app events.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Create a new input handler.
    pub fn new() -> Self {
        Self
    }

    /// Handle a key event and return the corresponding app event.
    pub fn handle_key(&self, key: KeyEvent) -> AppEvent {
        // Ctrl+C always force quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::ForceQuit;
        }

        match key.code {
            // Quit
            KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,

            // Help
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => AppEvent::ShowHelp,

            // Cancel/back
            KeyCode::Esc => AppEvent::Cancel,

            // List navigation
            KeyCode::Up | KeyCode::Char('k') => AppEvent::NavigateUp,
            KeyCode::Down | KeyCode::Char('j') => AppEvent::NavigateDown,
            KeyCode::Home | KeyCode::Char('g') => AppEvent::GoToTop,
            KeyCode::End | KeyCode::Char('G') => AppEvent::GoToBottom,

            // Selection
            KeyCode::Enter => AppEvent::Select,

            // Refresh
            KeyCode::Char('r') | KeyCode::Char('R') => AppEvent::Refresh,

            _ => AppEvent::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key_event_with_mods(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_quit_keys() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), AppEvent::Quit);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('Q'))), AppEvent::Quit);
    }

    #[test]
    fn test_ctrl_c_force_quit() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::ForceQuit
        );
        // Plain 'c' is not bound
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('c'))), AppEvent::None);
    }

    #[test]
    fn test_navigation_keys() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Up)), AppEvent::NavigateUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('k'))), AppEvent::NavigateUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Down)), AppEvent::NavigateDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('j'))), AppEvent::NavigateDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::Home)), AppEvent::GoToTop);
        assert_eq!(handler.handle_key(key_event(KeyCode::End)), AppEvent::GoToBottom);
    }

    #[test]
    fn test_select_and_cancel() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Enter)), AppEvent::Select);
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), AppEvent::Cancel);
    }

    #[test]
    fn test_refresh_and_help() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('r'))), AppEvent::Refresh);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('?'))), AppEvent::ShowHelp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('h'))), AppEvent::ShowHelp);
    }
}
