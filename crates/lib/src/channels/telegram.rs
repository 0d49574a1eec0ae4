//! Telegram channel: webhook update types, sendMessage and getFile via Bot API.

use serde::Deserialize;
use serde_json::json;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram update payload (webhook POST body).
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

/// One inbound chat message. All content fields are optional; absence of all
/// of text/caption/photo/document is treated as empty text downstream.
#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Photo size variants ordered smallest to largest; the last entry is the highest resolution.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub document: Option<TelegramDocument>,
    #[serde(default)]
    pub from: Option<TelegramUser>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
}

/// Attachment sent as a document (uncompressed file) rather than a photo.
#[derive(Debug, Deserialize)]
pub struct TelegramDocument {
    pub file_id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Deserialize)]
struct GetFileResponse {
    ok: bool,
    #[serde(default)]
    result: Option<TelegramFile>,
}

#[derive(Debug, Deserialize)]
struct TelegramFile {
    #[serde(default)]
    file_path: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("telegram api error: {0}")]
    Api(String),
}

/// Client for the Telegram Bot API: posts replies and resolves file download URLs.
/// No retries; transport defaults apply.
#[derive(Clone)]
pub struct TelegramClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(token: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| TELEGRAM_API_BASE.to_string());
        Self {
            base_url,
            token,
            client: reqwest::Client::new(),
        }
    }

    /// POST /sendMessage — post text into a chat, optionally as a reply to a prior message.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<(), TelegramError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(id) = reply_to_message_id {
            body["reply_to_message_id"] = id.into();
        }
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(TelegramError::Api(format!(
                "sendMessage failed: {} {}",
                status, body
            )));
        }
        Ok(())
    }

    /// GET /getFile — resolve a stored file id to a time-limited download URL.
    /// The URL is fetched fresh per call and never cached.
    pub async fn get_file_url(&self, file_id: &str) -> Result<String, TelegramError> {
        let url = format!(
            "{}/bot{}/getFile?file_id={}",
            self.base_url, self.token, file_id
        );
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(TelegramError::Api(format!(
                "getFile failed: {} {}",
                status, body
            )));
        }
        let data: GetFileResponse = res.json().await?;
        if !data.ok {
            return Err(TelegramError::Api("getFile returned ok: false".to_string()));
        }
        match data.result.and_then(|f| f.file_path) {
            Some(path) => Ok(format!("{}/file/bot{}/{}", self.base_url, self.token, path)),
            None => Err(TelegramError::Api(
                "getFile response missing file_path".to_string(),
            )),
        }
    }
}
