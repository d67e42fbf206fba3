use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{NotificationSink, NotifyError};
use crate::config::TelegramSettings;

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Pushes alerts to a Telegram chat through the Bot API.
pub struct TelegramSink {
    client: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(settings: &TelegramSettings) -> Self {
        Self {
            client: Client::new(),
            bot_token: settings.bot_token.clone(),
            chat_id: settings.chat_id.clone(),
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        let response: SendMessageResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(NotifyError::Rejected(
                response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            ));
        }

        debug!(chat_id = %self.chat_id, "telegram alert delivered");
        Ok(())
    }
}
