pub mod telegram;

/// A message received from the chat transport, reduced to the one canonical
/// view the dispatch pipeline works with.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Display name of the author, used for logging only
    pub author_name: String,
    /// Numeric id of the originating channel
    pub channel_id: i64,
    /// The message text (caption for media messages)
    pub text: String,
    /// Download URLs of any attachments, in upload order
    pub attachments: Vec<String>,
    /// True when the bot itself authored the message
    pub from_self: bool,
}
