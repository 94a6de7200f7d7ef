use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use serde_json::json;

use crate::platform::InboundMessage;
use crate::resolver::CommandMatch;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

/// An outbound request, ready for the gateway.
#[derive(Debug)]
pub struct RequestPayload {
    pub url: String,
    pub body: serde_json::Value,
    pub headers: HashMap<String, String>,
}

/// Build the outbound request for a matched command.
pub fn build(matched: &CommandMatch<'_>, message: &InboundMessage) -> RequestPayload {
    let api_call = &matched.command.api_call;

    let body = if matched.attachment_style {
        json!({
            "image_url": message.attachments[0],
            "workout_date": extract_date(&message.text),
        })
    } else {
        let content = message
            .text
            .strip_prefix(matched.command.cmd_prefix.as_str())
            .unwrap_or(&message.text)
            .trim();

        let mut args = api_call.args.clone();
        // The single empty-string value is the substitution slot. Without
        // one the args pass through unchanged and the content is dropped.
        if let Some(slot) = args.values_mut().find(|v| v.is_empty()) {
            *slot = content.to_string();
        }
        serde_json::to_value(args).unwrap_or_else(|_| json!({}))
    };

    RequestPayload {
        url: api_call.url.clone(),
        body,
        headers: api_call.headers.clone(),
    }
}

/// First yyyy-mm-dd shaped substring of the text, verbatim and without
/// calendar validation, falling back to today's local date.
fn extract_date(text: &str) -> String {
    match DATE_PATTERN.find(text) {
        Some(m) => m.as_str().to_string(),
        None => Local::now().format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::resolver::resolve;

    fn config() -> Config {
        serde_yaml::from_str(
            r#"
bot:
  token: "tok"
channels:
  workouts:
    id: 42
    rowing:
      cmd_prefix: "!rowing"
      api_call:
        url: "http://api.local/rowing"
        headers:
          X-Api-Key: "secret"
  journal:
    id: 7
    log:
      cmd_prefix: "!log"
      api_call:
        url: "http://api.local/log"
        args:
          user: ""
          note: "fixed"
    echo:
      cmd_prefix: "!echo"
      api_call:
        url: "http://api.local/echo"
        args:
          mode: "loud"
"#,
        )
        .unwrap()
    }

    fn message(channel_id: i64, text: &str, attachments: &[&str]) -> InboundMessage {
        InboundMessage {
            author_name: "alice".to_string(),
            channel_id,
            text: text.to_string(),
            attachments: attachments.iter().map(|a| a.to_string()).collect(),
            from_self: false,
        }
    }

    fn today() -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }

    #[test]
    fn test_extract_date_verbatim() {
        assert_eq!(extract_date("workout 2024-03-05 done"), "2024-03-05");
    }

    #[test]
    fn test_extract_date_takes_first_match() {
        assert_eq!(extract_date("2023-01-02 and 2024-03-05"), "2023-01-02");
    }

    #[test]
    fn test_extract_date_no_calendar_validation() {
        assert_eq!(extract_date("see 9999-99-99"), "9999-99-99");
    }

    #[test]
    fn test_extract_date_defaults_to_today() {
        assert_eq!(extract_date("no date here"), today());
    }

    #[test]
    fn test_attachment_payload() {
        let config = config();
        let msg = message(42, "!rowing 2024-03-05", &["http://cdn.local/a.png"]);
        let matched = resolve(&config, 42, &msg).unwrap();
        let payload = build(&matched, &msg);

        assert_eq!(payload.url, "http://api.local/rowing");
        assert_eq!(payload.body["image_url"], "http://cdn.local/a.png");
        assert_eq!(payload.body["workout_date"], "2024-03-05");
        assert_eq!(payload.headers["X-Api-Key"], "secret");
    }

    #[test]
    fn test_attachment_payload_defaults_date() {
        let config = config();
        let msg = message(42, "!rowing", &["http://cdn.local/a.png"]);
        let matched = resolve(&config, 42, &msg).unwrap();
        let payload = build(&matched, &msg);
        assert_eq!(payload.body["workout_date"], today().as_str());
    }

    #[test]
    fn test_text_substitution() {
        let config = config();
        let msg = message(7, "!log  hello ", &[]);
        let matched = resolve(&config, 7, &msg).unwrap();
        let payload = build(&matched, &msg);

        assert_eq!(payload.body["user"], "hello");
        assert_eq!(payload.body["note"], "fixed");
        assert!(payload.headers.is_empty());
    }

    #[test]
    fn test_no_slot_discards_content() {
        let config = config();
        let msg = message(7, "!echo something", &[]);
        let matched = resolve(&config, 7, &msg).unwrap();
        let payload = build(&matched, &msg);

        assert_eq!(payload.body, serde_json::json!({"mode": "loud"}));
    }

    #[test]
    fn test_image_command_without_attachment_builds_text_payload() {
        let config = config();
        let msg = message(42, "!rowing", &[]);
        let matched = resolve(&config, 42, &msg).unwrap();
        let payload = build(&matched, &msg);

        // No args configured, so the body is an empty object
        assert_eq!(payload.body, serde_json::json!({}));
    }
}
