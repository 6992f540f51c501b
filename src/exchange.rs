// Player input -> server response cycle

use tracing::{debug, error, info, warn};

use crate::api::ApiError;
use crate::models::{
    PlayResponse, SessionState, CLUE_UPDATED_NOTICE, EXCHANGE_FAILED_MESSAGE, NO_CLUE,
    STORY_COMPLETED_NOTICE,
};

/// The surface an exchange draws on. Implemented by the terminal app state
/// and by a recording fake in tests.
pub trait ChatView {
    fn input_text(&self) -> &str;
    fn clear_input(&mut self);
    fn append_player(&mut self, text: &str);
    fn append_npc(&mut self, text: &str);
    fn append_system(&mut self, text: &str);
    fn show_typing(&mut self);
    fn remove_typing(&mut self);
    /// Percentage as sent by the server, not clamped.
    fn set_progress(&mut self, percent: f64);
    fn set_clue(&mut self, clue: &str);
    fn set_input_enabled(&mut self, enabled: bool);
    fn focus_input(&mut self);
}

/// Guards the send action. At most one exchange is in flight, and none
/// after the story has completed.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn can_send(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    /// Starts an exchange from the current input. Returns the text to send,
    /// or `None` when nothing should be sent.
    pub fn begin<V: ChatView>(&mut self, view: &mut V) -> Option<String> {
        if !self.can_send() {
            debug!(state = ?self.state, "send ignored");
            return None;
        }

        let input = view.input_text().trim().to_string();
        if input.is_empty() {
            return None;
        }

        view.append_player(&input);
        view.clear_input();
        view.set_input_enabled(false);
        view.show_typing();
        self.state = SessionState::Awaiting;

        Some(input)
    }

    /// Renders the outcome of the in-flight exchange.
    pub fn finish<V: ChatView>(&mut self, view: &mut V, outcome: Result<PlayResponse, ApiError>) {
        if self.state != SessionState::Awaiting {
            warn!(state = ?self.state, "exchange result arrived with none in flight");
            return;
        }

        view.remove_typing();

        match outcome {
            Ok(response) => {
                view.append_npc(&response.message);

                if let Some(progress) = response.progress {
                    view.set_progress(progress);
                }

                if response.passed {
                    if let Some(clue) = response.new_clue() {
                        view.set_clue(clue);
                        view.append_system(CLUE_UPDATED_NOTICE);
                    } else {
                        view.set_clue(NO_CLUE);
                    }
                }

                if response.completed {
                    info!("story completed");
                    view.append_system(STORY_COMPLETED_NOTICE);
                    self.state = SessionState::Completed;
                    return;
                }
            }
            Err(err) => {
                error!(error = %err, "exchange failed");
                view.append_npc(EXCHANGE_FAILED_MESSAGE);
            }
        }

        self.state = SessionState::Idle;
        view.set_input_enabled(true);
        view.focus_input();
    }
}
