//! Telegram Bot API messenger (`sendMessage`).

#![allow(missing_docs)]

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::HttpConfig;
use crate::core::errors::{HsbError, Result};
use crate::notify::delivery::Messenger;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramMessenger {
    http: Client,
    api_base: String,
    token: String,
}

impl TelegramMessenger {
    pub fn new(api_base: &str, token: &str, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(http.timeout_secs))
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .build()
            .map_err(|err| HsbError::Configuration {
                details: format!("cannot build Telegram HTTP client: {err}"),
            })?;
        Ok(Self {
            http: client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

impl Messenger for TelegramMessenger {
    fn send(&self, destination: &str, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.send_message_url())
            .json(&SendMessageRequest {
                chat_id: destination,
                text,
            })
            .send()
            // The URL embeds the bot token; keep it out of error text.
            .map_err(|err| HsbError::SendMessage {
                details: err.without_url().to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|err| HsbError::SendMessage {
            details: err.without_url().to_string(),
        })?;
        interpret_response(status, &body)?;
        tracing::debug!(chat_id = %destination, "telegram accepted message");
        Ok(())
    }
}

fn interpret_response(status: StatusCode, body: &str) -> Result<()> {
    let parsed: Option<BotApiResponse> = serde_json::from_str(body).ok();
    match parsed {
        Some(reply) if status.is_success() && reply.ok => Ok(()),
        Some(reply) => Err(HsbError::SendMessage {
            details: format!(
                "HTTP {}: {}",
                status.as_u16(),
                reply
                    .description
                    .unwrap_or_else(|| "request rejected".to_string())
            ),
        }),
        None => Err(HsbError::SendMessage {
            details: format!("HTTP {}: unreadable Bot API reply", status.as_u16()),
        }),
    }
}
