use crate::exchange::ChatView;
use crate::models::{EntryKind, TranscriptEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Transcript,
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub transcript: Vec<TranscriptEntry>,
    pub input_buffer: String,
    pub input_enabled: bool,
    pub focus: Focus,
    pub scroll_offset: usize,
    pub show_help: bool,
    pub exit_pending: bool,
    pub server_url: String,

    // Story state as last reported by the server
    pub progress: Option<f64>,
    pub clue: Option<String>,
}

impl App {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            transcript: Vec::new(),
            input_buffer: String::new(),
            input_enabled: true,
            focus: Focus::Input,
            scroll_offset: 0,
            show_help: false,
            exit_pending: false,
            server_url: server_url.into(),
            progress: None,
            clue: None,
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub const fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::Transcript,
            Focus::Transcript => Focus::Input,
        };
    }

    /// Whether keystrokes should edit the input line.
    pub fn accepts_typing(&self) -> bool {
        self.input_enabled && self.focus == Focus::Input
    }

    pub fn type_char(&mut self, c: char) {
        if self.accepts_typing() {
            self.input_buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.accepts_typing() {
            self.input_buffer.pop();
        }
    }

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub const fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        // Clamped to the real bottom while rendering
        self.scroll_offset = usize::MAX;
    }

    fn push_entry(&mut self, kind: EntryKind, text: &str) {
        self.transcript.push(TranscriptEntry::new(kind, text));
        self.scroll_to_bottom();
    }
}

impl ChatView for App {
    fn input_text(&self) -> &str {
        &self.input_buffer
    }

    fn clear_input(&mut self) {
        self.input_buffer.clear();
    }

    fn append_player(&mut self, text: &str) {
        self.push_entry(EntryKind::Player, text);
    }

    fn append_npc(&mut self, text: &str) {
        self.push_entry(EntryKind::Npc, text);
    }

    fn append_system(&mut self, text: &str) {
        self.push_entry(EntryKind::System, text);
    }

    fn show_typing(&mut self) {
        self.transcript.push(TranscriptEntry::typing());
        self.scroll_to_bottom();
    }

    fn remove_typing(&mut self) {
        if let Some(pos) = self
            .transcript
            .iter()
            .rposition(|entry| entry.kind == EntryKind::Typing)
        {
            self.transcript.remove(pos);
        }
    }

    fn set_progress(&mut self, percent: f64) {
        self.progress = Some(percent);
    }

    fn set_clue(&mut self, clue: &str) {
        self.clue = Some(clue.to_string());
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn focus_input(&mut self) {
        self.focus = Focus::Input;
    }
}
