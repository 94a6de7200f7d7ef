use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::Me;
use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::platform::InboundMessage;

/// Run the Telegram transport: consume message events, feed them through the
/// dispatcher, send replies back to the originating chat.
pub async fn run(dispatcher: Arc<Dispatcher>) -> Result<()> {
    let bot = Bot::new(&dispatcher.config().bot.token);

    let me = bot.get_me().await?;
    info!("Logged in as {}", me.username());
    if !dispatcher.config().bot.quiet {
        println!("✅ Logged in as {}", me.username());
    }

    let handler = Update::filter_message().endpoint(handle_message);

    teloxide::dispatching::Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher, me])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    dispatcher: Arc<Dispatcher>,
    me: Me,
) -> ResponseResult<()> {
    let (author_name, from_self) = match msg.from.as_ref() {
        Some(user) => (user.first_name.clone(), user.id == me.id),
        None => return Ok(()),
    };

    // Media messages carry their text as a caption
    let text = msg
        .text()
        .or_else(|| msg.caption())
        .unwrap_or_default()
        .to_string();

    let attachments = collect_attachments(&bot, &msg).await;

    let incoming = InboundMessage {
        author_name,
        channel_id: msg.chat.id.0,
        text,
        attachments,
        from_self,
    };

    if let Some(reply) = dispatcher.on_message(&incoming).await {
        bot.send_message(msg.chat.id, reply).await?;
    }

    Ok(())
}

/// Resolve photo/document file ids into download URLs. Failures to resolve a
/// file are logged and skipped, never fatal to the message.
async fn collect_attachments(bot: &Bot, msg: &Message) -> Vec<String> {
    let mut file_ids = Vec::new();

    if let Some(photos) = msg.photo() {
        // Telegram sends several sizes of the same photo; take the largest
        if let Some(photo) = photos.last() {
            file_ids.push(photo.file.id.clone());
        }
    }
    if let Some(document) = msg.document() {
        file_ids.push(document.file.id.clone());
    }

    let mut urls = Vec::new();
    for file_id in file_ids {
        match bot.get_file(file_id).await {
            Ok(file) => urls.push(format!(
                "https://api.telegram.org/file/bot{}/{}",
                bot.token(),
                file.path
            )),
            Err(e) => warn!("Failed to resolve attachment file: {}", e),
        }
    }
    urls
}
