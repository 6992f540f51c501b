pub mod widgets;

use crate::app::App;
use crate::models::SessionState;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub use widgets::Theme;

pub fn render(frame: &mut Frame, app: &mut App, state: SessionState, theme: &Theme) {
    // Width available for text is total width - 2 (for borders)
    let available_width = frame.area().width.saturating_sub(2).max(1) as usize;

    let input_lines = if app.input_buffer.is_empty() {
        1
    } else {
        app.input_buffer.chars().count().div_ceil(available_width)
    };

    // Min 1, max roughly half the screen
    let max_lines = (frame.area().height as usize / 2).saturating_sub(2).max(1);
    let actual_lines = input_lines.clamp(1, max_lines);

    #[allow(clippy::cast_possible_truncation)]
    let input_height = (actual_lines + 2) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),               // Transcript
            Constraint::Length(1),            // Progress gauge
            Constraint::Length(1),            // Current clue
            Constraint::Length(1),            // Status line
            Constraint::Length(input_height), // Input field
            Constraint::Length(1),            // Keymap bar
        ])
        .split(frame.area());

    widgets::render_transcript(frame, app, theme, chunks[0]);
    widgets::render_progress(frame, app, theme, chunks[1]);
    widgets::render_clue(frame, app, chunks[2]);
    widgets::render_status_bar(frame, app, state, chunks[3]);
    widgets::render_input_field(frame, app, state, theme, chunks[4]);
    widgets::render_bottom_bar(frame, app, chunks[5]);

    if app.show_help {
        widgets::render_help_window(frame, theme, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ChatView;
    use crate::models::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App, state: SessionState) -> String {
        let theme = Theme::from_config(&AppConfig::default().theme);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| render(f, app, state, &theme))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_render_empty_session() {
        let mut app = App::new("http://127.0.0.1:5000");
        let screen = draw(&mut app, SessionState::Idle);
        assert!(screen.contains("Welcome to StoryChat"));
        assert!(screen.contains("(no clue yet)"));
        assert!(screen.contains("Type your reply..."));
    }

    #[test]
    fn test_render_exchange_state() {
        let mut app = App::new("http://127.0.0.1:5000");
        app.append_player("open the gate");
        app.append_npc("The gate groans.");
        app.append_system("Clue updated.");
        app.set_clue("the well is dry");
        app.set_progress(40.0);

        let screen = draw(&mut app, SessionState::Idle);
        assert!(screen.contains("You: open the gate"));
        assert!(screen.contains("The gate groans."));
        assert!(screen.contains("Clue updated."));
        assert!(screen.contains("the well is dry"));
        assert!(screen.contains("40%"));
    }

    #[test]
    fn test_render_awaiting_and_completed() {
        let mut app = App::new("http://127.0.0.1:5000");
        app.append_player("hello");
        app.show_typing();
        app.set_input_enabled(false);
        let screen = draw(&mut app, SessionState::Awaiting);
        assert!(screen.contains("Waiting for the story..."));

        app.remove_typing();
        let screen = draw(&mut app, SessionState::Completed);
        assert!(screen.contains("The story has ended."));
    }

    #[test]
    fn test_render_help_and_tiny_terminal() {
        let mut app = App::new("");
        app.show_help = true;
        let theme = Theme::from_config(&AppConfig::default().theme);
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        assert!(terminal
            .draw(|f| render(f, &mut app, SessionState::Idle, &theme))
            .is_ok());
    }
}
