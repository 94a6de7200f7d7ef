use std::time::Duration;

use crate::config::Config;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of probing one configured endpoint.
#[derive(Debug, PartialEq)]
enum ProbeOutcome {
    Ok,
    HttpError(u16),
    Timeout(String),
    ConnectionError(String),
    RequestError(String),
}

async fn probe(client: &reqwest::Client, url: &str, timeout: Duration) -> ProbeOutcome {
    match client.get(url).timeout(timeout).send().await {
        Ok(resp) if resp.status().is_success() => ProbeOutcome::Ok,
        Ok(resp) => ProbeOutcome::HttpError(resp.status().as_u16()),
        Err(e) if e.is_timeout() => ProbeOutcome::Timeout(e.to_string()),
        Err(e) if e.is_connect() => ProbeOutcome::ConnectionError(e.to_string()),
        Err(e) => ProbeOutcome::RequestError(e.to_string()),
    }
}

/// Best-effort reachability probe over every configured `api_call.url`.
/// Purely advisory; never fails the process and never blocks dispatch.
pub async fn run(config: &Config) {
    println!("🔍 Checking API endpoints...");

    let client = reqwest::Client::new();

    for named_channel in &config.channels.0 {
        for entry in &named_channel.channel.commands {
            let label = format!(
                "channel '{}' command '{}'",
                named_channel.name, entry.name
            );
            match probe(&client, &entry.command.api_call.url, PROBE_TIMEOUT).await {
                ProbeOutcome::Ok => println!("✅ {}: OK", label),
                ProbeOutcome::HttpError(status) => println!("⚠️ {}: Error ({})", label, status),
                ProbeOutcome::Timeout(e) => println!("❌ {}: Timeout error ({})", label, e),
                ProbeOutcome::ConnectionError(e) => {
                    println!("❌ {}: Connection error ({})", label, e)
                }
                ProbeOutcome::RequestError(e) => println!("❌ {}: Request error ({})", label, e),
            }
        }
    }
}
