use std::str::FromStr;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::{EntryKind, SessionState, ThemeConfig, TranscriptEntry};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub player: Color,
    pub npc: Color,
    pub system: Color,
    pub border: Color,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            player: parse_color(&config.player_message_color, Color::Cyan),
            npc: parse_color(&config.npc_message_color, Color::Green),
            system: parse_color(&config.system_message_color, Color::DarkGray),
            border: parse_color(&config.border_color, Color::Cyan),
        }
    }
}

/// Accepts ratatui color names ("lightblue", "dark-gray") and hex ("#ff8800").
pub fn parse_color(name: &str, fallback: Color) -> Color {
    Color::from_str(name.trim()).unwrap_or(fallback)
}

/// Fill ratio for a server-reported percentage. The server does not promise
/// 0..=100, so the bar is clamped.
pub fn progress_ratio(progress: Option<f64>) -> f64 {
    match progress {
        Some(percent) if percent.is_finite() => (percent / 100.0).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

pub fn render_help_window(frame: &mut Frame, theme: &Theme, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            "StoryChat - Keyboard Shortcuts",
            Style::default().fg(theme.border).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("General:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Ctrl+H        - Show/hide this help"),
        Line::from("  Ctrl+Q        - Quit"),
        Line::from("  Ctrl+C (x2)   - Quit"),
        Line::from(""),
        Line::from(Span::styled("Story:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Enter         - Send your move"),
        Line::from("  Tab           - Switch focus input/transcript"),
        Line::from(""),
        Line::from(Span::styled("Navigation:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Up/Down       - Scroll transcript"),
        Line::from("  PgUp/PgDn     - Scroll transcript"),
        Line::from("  Home/End      - Jump to start/end"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(theme.border)),
        )
        .wrap(Wrap { trim: false });

    let popup_width = 56;
    let popup_height = 20;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help_paragraph, popup_area);
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Press Ctrl+C again to exit, Esc to cancel",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            "Enter: Send | Tab: Toggle Focus | Ctrl+H: Help | Ctrl+C: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    let bar = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style);

    frame.render_widget(bar, area);
}

pub fn render_status_bar(frame: &mut Frame, app: &App, state: SessionState, area: Rect) {
    let (indicator, color) = match state {
        SessionState::Idle => ("", Color::Green),
        SessionState::Awaiting => (" [Waiting for reply...]", Color::Yellow),
        SessionState::Completed => (" [Story completed]", Color::Magenta),
    };

    let status = Paragraph::new(format!("{}{indicator}", app.server_url))
        .alignment(Alignment::Right)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));

    frame.render_widget(status, area);
}

pub fn render_progress(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let label = app
        .progress
        .map_or_else(|| "Progress -".to_string(), |p| format!("Progress {p:.0}%"));

    let gauge = Gauge::default()
        .ratio(progress_ratio(app.progress))
        .label(label)
        .gauge_style(Style::default().fg(theme.border).bg(Color::Black));

    frame.render_widget(gauge, area);
}

pub fn render_clue(frame: &mut Frame, app: &App, area: Rect) {
    let clue = app.clue.as_deref().unwrap_or("(no clue yet)");

    let line = Line::from(vec![
        Span::styled("Clue: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(clue.to_string(), Style::default().fg(Color::Yellow)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Splits entry text into display lines. Every entry gets at least one line,
/// so an empty message still shows up in the transcript.
fn text_lines(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        vec![""]
    } else {
        lines
    }
}

pub fn transcript_lines(entries: &[TranscriptEntry], theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in entries {
        lines.push(Line::from(""));
        match entry.kind {
            EntryKind::Player => {
                let style = Style::default().fg(theme.player);
                for (i, text) in text_lines(&entry.text).into_iter().enumerate() {
                    let prefix = if i == 0 { "You: " } else { "     " };
                    lines.push(Line::from(vec![
                        Span::styled(prefix, style.add_modifier(Modifier::BOLD)),
                        Span::styled(text.to_string(), style),
                    ]));
                }
            }
            EntryKind::Npc => {
                for text in text_lines(&entry.text) {
                    lines.push(Line::from(Span::styled(
                        text.to_string(),
                        Style::default().fg(theme.npc),
                    )));
                }
            }
            EntryKind::System => {
                lines.push(Line::from(Span::styled(
                    format!("  {}", entry.text),
                    Style::default()
                        .fg(theme.system)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
            EntryKind::Typing => {
                lines.push(Line::from(Span::styled(
                    entry.text.clone(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }
    lines
}

pub fn render_transcript(frame: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    if app.transcript.is_empty() {
        let welcome_text = vec![
            Line::from(Span::styled(
                "Welcome to StoryChat",
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Type your first move to begin the story",
                Style::default().fg(theme.border),
            )),
        ];

        let welcome_paragraph = Paragraph::new(welcome_text).alignment(Alignment::Center);

        let welcome_height = 2;
        let welcome_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(welcome_height),
            width: area.width,
            height: welcome_height.min(area.height),
        };

        frame.render_widget(welcome_paragraph, welcome_area);
        return;
    }

    let lines = transcript_lines(&app.transcript, theme);

    // Account for wrapping when working out how far down we can scroll
    let available_width = (area.width as usize).max(1);
    let total_visual_lines: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(available_width).max(1))
        .sum();

    let visible_height = area.height as usize;
    let max_scroll = total_visual_lines.saturating_sub(visible_height);
    let actual_scroll = app.scroll_offset.min(max_scroll);
    app.scroll_offset = actual_scroll;

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(actual_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(transcript, area);
}

pub fn render_input_field(
    frame: &mut Frame,
    app: &App,
    state: SessionState,
    theme: &Theme,
    area: Rect,
) {
    let placeholder = match state {
        SessionState::Idle => "Type your reply...",
        SessionState::Awaiting => "Waiting for the story...",
        SessionState::Completed => "The story has ended.",
    };

    let (input_text, input_style) = if app.input_buffer.is_empty() {
        (placeholder, Style::default().fg(Color::Gray))
    } else {
        (
            app.input_buffer.as_str(),
            Style::default().fg(theme.player).add_modifier(Modifier::BOLD),
        )
    };

    let border_style = if app.input_enabled && app.focus == Focus::Input {
        Style::default().fg(theme.border)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(input_text)
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Your move ")
                .border_style(border_style),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(input, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio_clamps() {
        assert!((progress_ratio(Some(40.0)) - 0.4).abs() < f64::EPSILON);
        assert!((progress_ratio(Some(150.0)) - 1.0).abs() < f64::EPSILON);
        assert!(progress_ratio(Some(-5.0)).abs() < f64::EPSILON);
        assert!(progress_ratio(Some(f64::NAN)).abs() < f64::EPSILON);
        assert!(progress_ratio(None).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("yellow", Color::White), Color::Yellow);
        assert_eq!(parse_color("#ff8800", Color::White), Color::Rgb(0xff, 0x88, 0x00));
        assert_eq!(parse_color("not-a-color", Color::White), Color::White);
    }

    #[test]
    fn test_theme_from_default_config() {
        let theme = Theme::from_config(&ThemeConfig::default());
        assert_eq!(theme.player, Color::Cyan);
        assert_eq!(theme.npc, Color::Green);
        assert_eq!(theme.system, Color::DarkGray);
    }

    #[test]
    fn test_player_entry_is_prefixed_with_you() {
        let theme = Theme::from_config(&ThemeConfig::default());
        let entries = vec![TranscriptEntry::new(EntryKind::Player, "open the gate\nquietly")];
        let lines = transcript_lines(&entries, &theme);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].to_string(), "You: open the gate");
        assert_eq!(lines[2].to_string(), "     quietly");
    }

    #[test]
    fn test_empty_npc_message_still_gets_a_line() {
        let theme = Theme::from_config(&ThemeConfig::default());
        let entries = vec![
            TranscriptEntry::new(EntryKind::Player, "hello"),
            TranscriptEntry::new(EntryKind::Npc, ""),
        ];
        let lines = transcript_lines(&entries, &theme);

        // separator + player, separator + empty npc line
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3].to_string(), "");
    }
}
