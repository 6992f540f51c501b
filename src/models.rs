use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Clue text shown when a stage is passed without a new clue.
pub const NO_CLUE: &str = "(no clue)";

pub const CLUE_UPDATED_NOTICE: &str = "Clue updated.";
pub const STORY_COMPLETED_NOTICE: &str = "Story completed.";
pub const EXCHANGE_FAILED_MESSAGE: &str = "Network error. Check the log for details.";
pub const TYPING_PLACEHOLDER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Player,
    Npc,
    System,
    Typing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn typing() -> Self {
        Self::new(EntryKind::Typing, TYPING_PLACEHOLDER)
    }
}

/// Whether the player may send. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Awaiting,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayRequest {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayResponse {
    pub message: String,
    #[serde(default, deserialize_with = "number_or_none")]
    pub progress: Option<f64>,
    #[serde(default, deserialize_with = "flag_or_false")]
    pub passed: bool,
    #[serde(default, deserialize_with = "string_or_none")]
    pub clue: Option<String>,
    #[serde(default, deserialize_with = "flag_or_false")]
    pub completed: bool,
}

impl PlayResponse {
    /// The clue to display after a stage pass, if it carries any text.
    pub fn new_clue(&self) -> Option<&str> {
        self.clue.as_deref().filter(|clue| !clue.is_empty())
    }
}

// Optional fields of the wrong JSON type are ignored rather than rejected.
fn number_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_f64))
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_str).map(str::to_owned))
}

fn flag_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(serde_json::Value::Bool(true))))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: String,
    /// Seconds before a play request is abandoned. Unset waits indefinitely.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: None,
            log_file: None,
            theme: ThemeConfig::default(),
        }
    }
}

#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub player_message_color: String,
    pub npc_message_color: String,
    pub system_message_color: String,
    pub border_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            player_message_color: "cyan".to_string(),
            npc_message_color: "green".to_string(),
            system_message_color: "darkgray".to_string(),
            border_color: "cyan".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_request_serialization() {
        let request = PlayRequest {
            input: "open the door".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"input":"open the door"}"#);
    }

    #[test]
    fn test_play_response_minimal() {
        let response: PlayResponse = serde_json::from_str(r#"{"message":"Hello"}"#).unwrap();
        assert_eq!(response.message, "Hello");
        assert!(response.progress.is_none());
        assert!(!response.passed);
        assert!(response.clue.is_none());
        assert!(!response.completed);
    }

    #[test]
    fn test_play_response_full() {
        let json = r#"{
            "message": "The guard nods.",
            "progress": 25,
            "passed": true,
            "clue": "Look behind the painting",
            "completed": false
        }"#;
        let response: PlayResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.progress, Some(25.0));
        assert!(response.passed);
        assert_eq!(response.new_clue(), Some("Look behind the painting"));
    }

    #[test]
    fn test_play_response_missing_message_is_rejected() {
        let response: Result<PlayResponse, _> = serde_json::from_str(r#"{"progress":10}"#);
        assert!(response.is_err());
    }

    #[test]
    fn test_play_response_ignores_non_numeric_progress() {
        let response: PlayResponse =
            serde_json::from_str(r#"{"message":"Hi","progress":"40"}"#).unwrap();
        assert!(response.progress.is_none());
    }

    #[test]
    fn test_play_response_null_fields_default() {
        let json = r#"{"message":"Hi","progress":null,"passed":null,"clue":null,"completed":null}"#;
        let response: PlayResponse = serde_json::from_str(json).unwrap();
        assert!(response.progress.is_none());
        assert!(!response.passed);
        assert!(!response.completed);
    }

    #[test]
    fn test_play_response_ignores_non_string_clue() {
        let response: PlayResponse =
            serde_json::from_str(r#"{"message":"Try again","passed":false,"clue":7}"#).unwrap();
        assert_eq!(response.message, "Try again");
        assert!(response.clue.is_none());
        assert!(response.new_clue().is_none());
    }

    #[test]
    fn test_empty_clue_is_not_a_new_clue() {
        let response: PlayResponse =
            serde_json::from_str(r#"{"message":"Hi","passed":true,"clue":""}"#).unwrap();
        assert!(response.new_clue().is_none());
    }

    #[test]
    fn test_session_state_default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert!(config.request_timeout.is_none());
        assert!(config.log_file.is_none());
        assert_eq!(config.theme.npc_message_color, "green");
    }

    #[test]
    fn test_app_config_partial_theme() {
        let config: AppConfig = toml::from_str(
            r#"
            server_url = "http://story.local"

            [theme]
            npc_message_color = "yellow"
            "#,
        )
        .unwrap();
        assert_eq!(config.theme.npc_message_color, "yellow");
        assert_eq!(config.theme.border_color, "cyan");
    }
}
