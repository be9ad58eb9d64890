use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::resources::client::EasemobClient;
use crate::resources::endpoint::{Call, Endpoint};

/// What `target` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Users,
    Chatgroups,
    Chatrooms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Fixed size sent with image messages.
pub const DEFAULT_IMAGE_SIZE: ImageSize = ImageSize { width: 480, height: 720 };

/// `msg` object of a message, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Txt {
        msg: String,
    },
    Cmd {
        action: String,
    },
    Img {
        url: String,
        filename: String,
        secret: String,
        size: ImageSize,
    },
    Audio {
        url: String,
        filename: String,
        length: u64,
        secret: String,
    },
    Video {
        url: String,
        filename: String,
        thumb: String,
        length: u64,
        secret: String,
        thumb_secret: String,
    },
    File {
        url: String,
        filename: String,
        length: u64,
        secret: String,
    },
}

/// Sender, recipients and extension attributes shared by every message kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub from: String,
    pub target_type: TargetType,
    pub target: Vec<String>,
    pub ext: Option<Value>,
}

impl Envelope {
    pub fn new<I, S>(from: impl Into<String>, target_type: TargetType, target: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            target_type,
            target: target.into_iter().map(Into::into).collect(),
            ext: None,
        }
    }

    pub fn ext(mut self, ext: Value) -> Self {
        self.ext = Some(ext);
        self
    }
}

/// Body of `POST messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub target_type: TargetType,
    pub target: Vec<String>,
    pub msg: MessageBody,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

impl Message {
    pub fn new(envelope: Envelope, msg: MessageBody) -> Self {
        let Envelope { from, target_type, target, ext } = envelope;
        Self { target_type, target, msg, from, ext }
    }
}

impl EasemobClient {
    pub async fn send_message(&self, message: &Message) -> Result<Value> {
        debug!("message: sending to {} {:?}", message.target.len(), message.target_type);
        self.execute_json(Call::new(Endpoint::SendMessage).json(message)?).await
    }

    pub async fn send_text(&self, envelope: Envelope, content: impl Into<String>) -> Result<Value> {
        let message = Message::new(envelope, MessageBody::Txt { msg: content.into() });
        self.send_message(&message).await
    }

    /// Transparent command message, not shown to the recipient.
    pub async fn send_cmd(&self, envelope: Envelope, action: impl Into<String>) -> Result<Value> {
        let message = Message::new(envelope, MessageBody::Cmd { action: action.into() });
        self.send_message(&message).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_message_wire_shape_and_round_trip() {
        let envelope = Envelope::new("admin", TargetType::Users, ["u1", "u2"])
            .ext(json!({"attr1": "v1"}));
        let message = Message::new(envelope, MessageBody::Txt { msg: "hello".into() });

        let encoded = serde_json::to_value(&message).unwrap();
        assert_eq!(
            encoded,
            json!({
                "target_type": "users",
                "target": ["u1", "u2"],
                "msg": {"type": "txt", "msg": "hello"},
                "from": "admin",
                "ext": {"attr1": "v1"}
            })
        );

        let decoded: Message = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn video_message_carries_all_fields() {
        let message = Message::new(
            Envelope::new("a", TargetType::Chatgroups, ["g1"]),
            MessageBody::Video {
                url: "https://a1.easemob.com/org/app/chatfiles/u".into(),
                filename: "clip.mp4".into(),
                thumb: "https://a1.easemob.com/org/app/chatfiles/t".into(),
                length: 10,
                secret: "s".into(),
                thumb_secret: "ts".into(),
            },
        );
        let encoded = serde_json::to_value(&message).unwrap();
        assert_eq!(encoded["msg"]["type"], "video");
        assert_eq!(encoded["msg"]["thumb_secret"], "ts");
        assert_eq!(encoded["target_type"], "chatgroups");
        assert!(encoded.get("ext").is_none());
    }
}
