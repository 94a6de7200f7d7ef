use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub channels: ChannelSet,
}

#[derive(Debug, Deserialize)]
pub struct BotConfig {
    pub token: String,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub log_location: Option<PathBuf>,
}

/// Named channels, kept in YAML declaration order.
#[derive(Debug)]
pub struct ChannelSet(pub Vec<NamedChannel>);

#[derive(Debug)]
pub struct NamedChannel {
    pub name: String,
    pub channel: ChannelConfig,
}

/// One chat channel: its numeric id plus its commands.
///
/// Command order is declaration order from the config file. Resolution is
/// first-match-wins, so an ordered list is required here, not a map.
#[derive(Debug)]
pub struct ChannelConfig {
    pub id: i64,
    pub commands: Vec<NamedCommand>,
}

#[derive(Debug)]
pub struct NamedCommand {
    pub name: String,
    pub command: CommandConfig,
}

#[derive(Debug, Deserialize)]
pub struct CommandConfig {
    pub cmd_prefix: String,
    pub api_call: ApiCallConfig,
}

#[derive(Debug, Deserialize)]
pub struct ApiCallConfig {
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Template arguments for text commands. At most one value may be the
    /// empty string; that slot receives the prefix-stripped message text.
    #[serde(default)]
    pub args: HashMap<String, String>,
}

impl<'de> Deserialize<'de> for ChannelSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = ChannelSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of channel name to channel config")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut channels = Vec::new();
                while let Some((name, channel)) = map.next_entry::<String, ChannelConfig>()? {
                    channels.push(NamedChannel { name, channel });
                }
                Ok(ChannelSet(channels))
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

// A channel section mixes the reserved `id` key with command-type keys, and
// the command order must survive parsing, so this can't be a derived map.
impl<'de> Deserialize<'de> for ChannelConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ChannelVisitor;

        impl<'de> Visitor<'de> for ChannelVisitor {
            type Value = ChannelConfig;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a channel config with an `id` and command entries")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut id: Option<i64> = None;
                let mut commands = Vec::new();

                while let Some(key) = map.next_key::<String>()? {
                    if key == "id" {
                        if id.is_some() {
                            return Err(de::Error::duplicate_field("id"));
                        }
                        id = Some(map.next_value()?);
                    } else {
                        let command: CommandConfig = map.next_value()?;
                        commands.push(NamedCommand { name: key, command });
                    }
                }

                let id = id.ok_or_else(|| de::Error::missing_field("id"))?;
                Ok(ChannelConfig { id, commands })
            }
        }

        deserializer.deserialize_map(ChannelVisitor)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Shape checks that must fail before the dispatcher starts, plus lint
    /// warnings for legal-but-suspect configurations. Called separately from
    /// `load` so the warnings land after the log sink is up.
    pub fn validate(&self) -> Result<()> {
        for named_channel in &self.channels.0 {
            let channel_name = &named_channel.name;
            let commands = &named_channel.channel.commands;

            for entry in commands {
                let slots = entry
                    .command
                    .api_call
                    .args
                    .values()
                    .filter(|v| v.is_empty())
                    .count();
                if slots > 1 {
                    anyhow::bail!(
                        "channel '{}' command '{}': args has {} empty-string values, at most one substitution slot is allowed",
                        channel_name,
                        entry.name,
                        slots
                    );
                }
                if !entry.command.api_call.args.is_empty() && slots == 0 {
                    warn!(
                        "channel '{}' command '{}': args has no substitution slot, message text will be discarded",
                        channel_name, entry.name
                    );
                }
                if entry.command.cmd_prefix.is_empty() {
                    warn!(
                        "channel '{}' command '{}': empty cmd_prefix matches every message in the channel",
                        channel_name, entry.name
                    );
                }
            }

            // Overlapping prefixes are legal; the first declared wins.
            for (i, earlier) in commands.iter().enumerate() {
                for later in &commands[i + 1..] {
                    let a = &earlier.command.cmd_prefix;
                    let b = &later.command.cmd_prefix;
                    if a.starts_with(b.as_str()) || b.starts_with(a.as_str()) {
                        warn!(
                            "channel '{}': prefixes '{}' ({}) and '{}' ({}) overlap, '{}' is matched first",
                            channel_name, a, earlier.name, b, later.name, earlier.name
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Find a channel by its numeric id.
    pub fn channel_by_id(&self, channel_id: i64) -> Option<&ChannelConfig> {
        self.channels
            .0
            .iter()
            .find(|c| c.channel.id == channel_id)
            .map(|c| &c.channel)
    }
}
