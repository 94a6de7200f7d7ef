use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::gateway::ApiGateway;
use crate::payload;
use crate::platform::InboundMessage;
use crate::reply::format_reply;
use crate::resolver::resolve;

/// Wires resolver, payload builder, gateway and formatter into the
/// per-message pipeline. Holds no mutable state; the config tree is
/// immutable for the life of the process.
pub struct Dispatcher {
    config: Arc<Config>,
    gateway: ApiGateway,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            gateway: ApiGateway::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one inbound message and return the reply to send to its
    /// channel, or `None` when the message is not a bot concern (self-echo,
    /// unconfigured channel, no matching command — all silent by design).
    /// API failures come back as a formatted reply, never as an error.
    pub async fn on_message(&self, message: &InboundMessage) -> Option<String> {
        if message.from_self {
            return None;
        }

        info!("Message from {}: {}", message.author_name, message.text);

        let matched = resolve(&self.config, message.channel_id, message)?;
        info!(
            "Matched command '{}' in channel {} (attachment_style: {})",
            matched.command_type, message.channel_id, matched.attachment_style
        );

        let request = payload::build(&matched, message);
        let result = self.gateway.call(&request).await;

        Some(format_reply(&result))
    }
}
