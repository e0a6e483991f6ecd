//! Command token extraction from raw message text.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::domain::entities::Content;

/// A command is a leading slash token, optionally preceded by whitespace.
static COMMAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(/\S+)").expect("valid command pattern"));

/// Extracts the command name from message text, keeping the leading slash.
///
/// A trailing `@botname` mention is stripped, so `/help@MyBot args` yields
/// `/help`. Returns `None` when the text does not start with a command.
pub fn extract_command(text: &str) -> Option<String> {
    let token = COMMAND_RE.captures(text)?.get(1)?.as_str();
    let name = token.split('@').next().unwrap_or(token);
    if name.len() < 2 {
        // a bare slash selects nothing
        return None;
    }
    Some(name.to_string())
}

/// Parses message text into structured content.
///
/// Command arguments are the whitespace-delimited tokens after the command.
pub fn parse_content(text: &str) -> Content {
    match extract_command(text) {
        Some(name) => {
            let args = text
                .split_whitespace()
                .skip(1)
                .map(|arg| arg.to_string())
                .collect();
            Content::Command { name, args }
        }
        None => Content::Text(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_command() {
        assert_eq!(extract_command("/help"), Some("/help".to_string()));
    }

    #[test]
    fn strips_bot_mention_and_arguments() {
        assert_eq!(
            extract_command("/help@MyBot arg1 arg2"),
            Some("/help".to_string())
        );
    }

    #[test]
    fn tolerates_leading_whitespace() {
        assert_eq!(extract_command("  /start"), Some("/start".to_string()));
    }

    #[test]
    fn rejects_text_without_command() {
        assert_eq!(extract_command("no slash here"), None);
        assert_eq!(extract_command("look at /help mid-text"), None);
        assert_eq!(extract_command(""), None);
    }

    #[test]
    fn rejects_bare_slash() {
        assert_eq!(extract_command("/"), None);
        assert_eq!(extract_command("/@MyBot"), None);
    }

    #[test]
    fn parses_command_arguments() {
        let content = parse_content("/events@MyBot today 5");
        assert_eq!(
            content,
            Content::Command {
                name: "/events".to_string(),
                args: vec!["today".to_string(), "5".to_string()],
            }
        );
    }

    #[test]
    fn parses_plain_text_as_text() {
        let content = parse_content("bom dia");
        assert_eq!(content, Content::Text("bom dia".to_string()));
    }
}
