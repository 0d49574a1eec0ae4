//! Message normalization: one inbound Telegram message becomes one chat turn.
//!
//! The gateway detects image presence once and passes the flag down; this
//! module never re-derives it. A set flag without an extractable attachment
//! degrades to the plain-text shape, but a failed attachment resolution
//! propagates — it is not silently downgraded to text-only.

use crate::channels::{TelegramClient, TelegramError, TelegramMessage};
use crate::llm::{ChatContent, ChatMessage, ContentPart, ImageUrl};

const DEFAULT_IMAGE_PROMPT: &str = "What is in this image?";

/// True when the message carries a still image: a non-empty photo sequence,
/// or a document whose declared MIME type is image/*.
pub fn has_image_attachment(message: &TelegramMessage) -> bool {
    let has_photo = message.photo.as_ref().is_some_and(|p| !p.is_empty());
    let has_image_document = message
        .document
        .as_ref()
        .and_then(|d| d.mime_type.as_deref())
        .is_some_and(|m| m.starts_with("image/"));
    has_photo || has_image_document
}

/// Role attributed to the inbound sender: assistant only for automated senders.
fn sender_role(message: &TelegramMessage) -> &'static str {
    if message.from.as_ref().is_some_and(|u| u.is_bot) {
        "assistant"
    } else {
        "user"
    }
}

/// Text if present and non-empty, else caption if present and non-empty, else empty.
fn text_content(message: &TelegramMessage) -> String {
    message
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| message.caption.as_deref().filter(|c| !c.is_empty()))
        .unwrap_or_default()
        .to_string()
}

/// File id to resolve: last (highest-resolution) photo variant, else an
/// image-typed document.
fn image_file_id(message: &TelegramMessage) -> Option<&str> {
    if let Some(photo) = message.photo.as_ref().filter(|p| !p.is_empty()) {
        return photo.last().map(|p| p.file_id.as_str());
    }
    let doc = message.document.as_ref()?;
    if doc
        .mime_type
        .as_deref()
        .is_some_and(|m| m.starts_with("image/"))
    {
        return Some(doc.file_id.as_str());
    }
    None
}

fn text_turn(message: &TelegramMessage, text: String) -> ChatMessage {
    ChatMessage {
        role: sender_role(message).to_string(),
        content: ChatContent::Text(text),
    }
}

/// Build the single chat turn for an inbound message.
///
/// With `include_image` set, the attachment is resolved to a download URL and
/// the turn becomes typed parts attributed to the user. Without an extractable
/// attachment the flag degrades to the plain-text shape.
pub async fn message_to_chat(
    message: &TelegramMessage,
    telegram: &TelegramClient,
    include_image: bool,
) -> Result<ChatMessage, TelegramError> {
    let text = text_content(message);

    if !include_image {
        return Ok(text_turn(message, text));
    }

    let Some(file_id) = image_file_id(message) else {
        return Ok(text_turn(message, text));
    };

    let image_url = telegram.get_file_url(file_id).await?;

    let prompt = if text.is_empty() {
        DEFAULT_IMAGE_PROMPT.to_string()
    } else {
        text
    };
    Ok(ChatMessage {
        role: "user".to_string(),
        content: ChatContent::Parts(vec![
            ContentPart::Text { text: prompt },
            ContentPart::ImageUrl {
                image_url: ImageUrl { url: image_url },
            },
        ]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{PhotoSize, TelegramChat, TelegramDocument, TelegramUser};

    fn message() -> TelegramMessage {
        TelegramMessage {
            message_id: 5,
            chat: TelegramChat { id: 1 },
            text: None,
            caption: None,
            photo: None,
            document: None,
            from: None,
        }
    }

    fn client() -> TelegramClient {
        TelegramClient::new("unused".to_string(), None)
    }

    #[test]
    fn text_takes_precedence_over_caption() {
        let mut msg = message();
        msg.text = Some("text".to_string());
        msg.caption = Some("caption".to_string());
        assert_eq!(text_content(&msg), "text");
    }

    #[test]
    fn empty_text_falls_through_to_caption() {
        let mut msg = message();
        msg.text = Some(String::new());
        msg.caption = Some("caption".to_string());
        assert_eq!(text_content(&msg), "caption");
    }

    #[test]
    fn missing_text_and_caption_is_empty() {
        assert_eq!(text_content(&message()), "");
    }

    #[test]
    fn photo_file_id_is_the_last_variant() {
        let mut msg = message();
        msg.photo = Some(vec![
            PhotoSize {
                file_id: "a".to_string(),
            },
            PhotoSize {
                file_id: "b".to_string(),
            },
        ]);
        assert_eq!(image_file_id(&msg), Some("b"));
    }

    #[test]
    fn image_document_file_id_is_used_when_no_photo() {
        let mut msg = message();
        msg.document = Some(TelegramDocument {
            file_id: "doc".to_string(),
            mime_type: Some("image/png".to_string()),
        });
        assert_eq!(image_file_id(&msg), Some("doc"));
    }

    #[test]
    fn non_image_document_yields_no_file_id() {
        let mut msg = message();
        msg.document = Some(TelegramDocument {
            file_id: "doc".to_string(),
            mime_type: Some("application/pdf".to_string()),
        });
        assert_eq!(image_file_id(&msg), None);
    }

    #[test]
    fn empty_photo_sequence_is_not_an_image() {
        let mut msg = message();
        msg.photo = Some(Vec::new());
        assert!(!has_image_attachment(&msg));
        assert_eq!(image_file_id(&msg), None);
    }

    #[test]
    fn image_detection_from_photo_or_image_document() {
        let mut msg = message();
        msg.photo = Some(vec![PhotoSize {
            file_id: "a".to_string(),
        }]);
        assert!(has_image_attachment(&msg));

        let mut msg = message();
        msg.document = Some(TelegramDocument {
            file_id: "doc".to_string(),
            mime_type: Some("image/jpeg".to_string()),
        });
        assert!(has_image_attachment(&msg));

        let mut msg = message();
        msg.document = Some(TelegramDocument {
            file_id: "doc".to_string(),
            mime_type: None,
        });
        assert!(!has_image_attachment(&msg));
    }

    #[tokio::test]
    async fn without_image_flag_content_is_plain_text() {
        let mut msg = message();
        msg.text = Some("hello".to_string());
        // A photo may be present; the flag decides, not the payload.
        msg.photo = Some(vec![PhotoSize {
            file_id: "a".to_string(),
        }]);
        let turn = message_to_chat(&msg, &client(), false)
            .await
            .expect("build turn");
        assert_eq!(turn.role, "user");
        assert_eq!(turn.content, ChatContent::Text("hello".to_string()));
    }

    #[tokio::test]
    async fn automated_sender_maps_to_assistant_role() {
        let mut msg = message();
        msg.text = Some("ping".to_string());
        msg.from = Some(TelegramUser { is_bot: true });
        let turn = message_to_chat(&msg, &client(), false)
            .await
            .expect("build turn");
        assert_eq!(turn.role, "assistant");
    }

    #[tokio::test]
    async fn image_flag_without_extractable_attachment_degrades_to_text() {
        let mut msg = message();
        msg.caption = Some("see attached".to_string());
        msg.photo = Some(Vec::new());
        msg.document = Some(TelegramDocument {
            file_id: "doc".to_string(),
            mime_type: Some("application/pdf".to_string()),
        });
        msg.from = Some(TelegramUser { is_bot: true });
        let turn = message_to_chat(&msg, &client(), true)
            .await
            .expect("build turn");
        // Exactly the flag-false shape, role included.
        assert_eq!(turn.role, "assistant");
        assert_eq!(turn.content, ChatContent::Text("see attached".to_string()));
    }
}
