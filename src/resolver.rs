use crate::config::{CommandConfig, Config};
use crate::platform::InboundMessage;

/// Command-type name whose payload is built from an attachment URL instead
/// of free text. Tied to the naming convention of the config file, not a
/// per-command flag.
const IMAGE_COMMAND_TYPE: &str = "rowing";

/// A command selected for an inbound message.
#[derive(Debug)]
pub struct CommandMatch<'a> {
    pub command_type: &'a str,
    pub command: &'a CommandConfig,
    /// True when the command handles attachments and the message carries at
    /// least one. An image command with no attachment falls through to
    /// text-style handling.
    pub attachment_style: bool,
}

/// Select the command for a message, or `None` when the channel is not
/// configured or nothing matches (both are silent no-ops).
///
/// Commands are tried in declaration order and the first prefix match wins.
/// An empty `cmd_prefix` matches every message in its channel.
pub fn resolve<'a>(
    config: &'a Config,
    channel_id: i64,
    message: &InboundMessage,
) -> Option<CommandMatch<'a>> {
    let channel = config.channel_by_id(channel_id)?;

    let entry = channel
        .commands
        .iter()
        .find(|entry| message.text.starts_with(&entry.command.cmd_prefix))?;

    let attachment_style =
        entry.name == IMAGE_COMMAND_TYPE && !message.attachments.is_empty();

    Some(CommandMatch {
        command_type: &entry.name,
        command: &entry.command,
        attachment_style,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

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
  journal:
    id: 7
    log:
      cmd_prefix: "!log"
      api_call:
        url: "http://api.local/log"
    l:
      cmd_prefix: "!l"
      api_call:
        url: "http://api.local/l"
  firehose:
    id: 9
    relay:
      cmd_prefix: ""
      api_call:
        url: "http://api.local/relay"
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

    #[test]
    fn test_unconfigured_channel_is_none() {
        let config = config();
        let msg = message(999, "!log hi", &[]);
        assert!(resolve(&config, 999, &msg).is_none());
        // Repeated calls stay a no-op
        assert!(resolve(&config, 999, &msg).is_none());
    }

    #[test]
    fn test_no_prefix_match_is_none() {
        let config = config();
        let msg = message(7, "hello there", &[]);
        assert!(resolve(&config, 7, &msg).is_none());
    }

    #[test]
    fn test_first_declared_wins() {
        let config = config();
        let msg = message(7, "!log today", &[]);
        let matched = resolve(&config, 7, &msg).unwrap();
        assert_eq!(matched.command_type, "log");
    }

    #[test]
    fn test_shorter_prefix_matches_when_longer_does_not() {
        let config = config();
        let msg = message(7, "!list", &[]);
        let matched = resolve(&config, 7, &msg).unwrap();
        assert_eq!(matched.command_type, "l");
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let config = config();
        let msg = message(7, "!LOG today", &[]);
        assert!(resolve(&config, 7, &msg).is_none());
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let config = config();
        let msg = message(9, "anything at all", &[]);
        let matched = resolve(&config, 9, &msg).unwrap();
        assert_eq!(matched.command_type, "relay");
    }

    #[test]
    fn test_image_command_with_attachment_is_attachment_style() {
        let config = config();
        let msg = message(42, "!rowing", &["http://cdn.local/a.png"]);
        let matched = resolve(&config, 42, &msg).unwrap();
        assert!(matched.attachment_style);
    }

    #[test]
    fn test_image_command_without_attachment_is_text_style() {
        let config = config();
        let msg = message(42, "!rowing", &[]);
        let matched = resolve(&config, 42, &msg).unwrap();
        assert!(!matched.attachment_style);
    }
}
