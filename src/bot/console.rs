//! Line-oriented console transport.
//!
//! Each input line is `[user@channel>] <text>`. Without the address prefix the
//! configured console identity is used. A body of `@<control-id>` selects a
//! control, so the controls printed as `[label] (@id)` can be answered by
//! pasting the id back.

use crate::bot::panel::Panel;
use crate::bot::server::{InboundEvent, Notice};
use crate::config::ConsoleConfig;

/// Parse one console line. Blank lines yield `None`.
pub fn parse_line(line: &str, defaults: &ConsoleConfig) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (author, channel, body) = match split_address(line) {
        Some((author, channel, body)) => (author.to_string(), channel.to_string(), body),
        None => (defaults.user.clone(), defaults.channel.clone(), line),
    };
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match body.strip_prefix('@') {
        Some(id) if !id.trim().is_empty() => {
            Some(InboundEvent::selection(author, channel, id.trim()))
        }
        _ => Some(InboundEvent::text(author, channel, body)),
    }
}

fn split_address(line: &str) -> Option<(&str, &str, &str)> {
    let (address, body) = line.split_once('>')?;
    if address.chars().any(char::is_whitespace) {
        return None;
    }
    let (author, channel) = address.split_once('@')?;
    if author.is_empty() || channel.is_empty() {
        return None;
    }
    Some((author, channel, body))
}

pub fn render_panel(panel: &Panel) -> String {
    let mut out = panel.render_text();
    out.push('\n');
    out
}

pub fn render_notice(notice: &Notice) -> String {
    format!("-> {}\n{}", notice.key, render_panel(&notice.panel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::server::EventKind;

    fn defaults() -> ConsoleConfig {
        ConsoleConfig::default()
    }

    #[test]
    fn bare_lines_use_console_identity() {
        let ev = parse_line("!help", &defaults()).unwrap();
        assert_eq!(ev.author, "console");
        assert_eq!(ev.channel, "local");
        assert_eq!(ev.kind, EventKind::Text("!help".to_string()));
    }

    #[test]
    fn addressed_lines_and_selections() {
        let ev = parse_line("alice@kitchen> 5 sugar", &defaults()).unwrap();
        assert_eq!((ev.author.as_str(), ev.channel.as_str()), ("alice", "kitchen"));
        assert_eq!(ev.kind, EventKind::Text("5 sugar".to_string()));

        let ev = parse_line("bob@hall> @confirm:yes", &defaults()).unwrap();
        assert_eq!(ev.kind, EventKind::Selection("confirm:yes".to_string()));
    }

    #[test]
    fn text_with_angle_bracket_is_not_an_address() {
        let ev = parse_line("3 eggs > 2 eggs", &defaults()).unwrap();
        assert_eq!(ev.author, "console");
        assert_eq!(ev.kind, EventKind::Text("3 eggs > 2 eggs".to_string()));
        assert!(parse_line("   ", &defaults()).is_none());
        assert!(parse_line("alice@k>   ", &defaults()).is_none());
    }
}
