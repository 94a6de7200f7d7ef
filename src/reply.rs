use crate::gateway::ApiResult;

/// Render an API result into the single text reply sent back to the channel.
/// Never empty.
pub fn format_reply(result: &ApiResult) -> String {
    match result {
        ApiResult::Success {
            status,
            message,
            data,
        } => {
            let mut reply = format!("**{}:** {}", status, message);
            for (key, value) in data {
                reply.push_str(&format!("\n- **{}:** {}", key, value));
            }
            reply
        }
        ApiResult::Failure { kind, detail } => format!("❌ {}: {}", kind, detail),
    }
}
