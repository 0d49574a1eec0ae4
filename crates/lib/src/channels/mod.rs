//! Communication channels (Telegram).
//!
//! Webhook update types and the Bot API client used by the gateway to
//! resolve attachments and deliver replies.

mod telegram;

pub use telegram::{
    PhotoSize, TelegramChat, TelegramClient, TelegramDocument, TelegramError, TelegramMessage,
    TelegramUpdate, TelegramUser,
};
