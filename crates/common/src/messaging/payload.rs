use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const COMMUNITY_ID: &str = "community_id";
const CHANNEL_ID: &str = "channel_id";
const MESSAGE_ID: &str = "message_id";
const MESSAGE_TYPE: &str = "message_type";
const TIMESTAMP: &str = "timestamp";
const REPLY_ID: &str = "reply_id";
const IMAGES: &str = "images";
const REPLIES: &str = "replies";

/// Errors that can occur while reading a payload out of a node's extra data map
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Whether a message starts a thread or answers one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Post,
    Reply,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Post => write!(f, "post"),
            MessageType::Reply => write!(f, "reply"),
        }
    }
}

impl FromStr for MessageType {
    type Err = PayloadError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(MessageType::Post),
            "reply" => Ok(MessageType::Reply),
            other => Err(PayloadError::InvalidField {
                field: MESSAGE_TYPE,
                reason: format!("unknown message type '{}'", other),
            }),
        }
    }
}

/// Community metadata attached to every direct message as the transaction's extra data
///
/// The message text itself travels encrypted; this part is public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageExtraData {
    pub community_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub message_type: MessageType,
    /// Milliseconds since the unix epoch, as reported by the sender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// The message this one answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<String>>,
}

impl MessageExtraData {
    pub fn post(community_id: &str, channel_id: &str, message_id: &str) -> Self {
        Self {
            community_id: community_id.to_string(),
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            message_type: MessageType::Post,
            timestamp: None,
            reply_id: None,
            images: None,
            replies: None,
        }
    }

    pub fn reply(community_id: &str, channel_id: &str, message_id: &str, reply_id: &str) -> Self {
        Self {
            message_type: MessageType::Reply,
            reply_id: Some(reply_id.to_string()),
            ..Self::post(community_id, channel_id, message_id)
        }
    }

    /// Flatten into the node's string-to-string extra data map
    ///
    /// Lists are stored as JSON arrays inside their string value.
    pub fn to_extra_data(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(COMMUNITY_ID.to_string(), self.community_id.clone());
        map.insert(CHANNEL_ID.to_string(), self.channel_id.clone());
        map.insert(MESSAGE_ID.to_string(), self.message_id.clone());
        map.insert(MESSAGE_TYPE.to_string(), self.message_type.to_string());
        if let Some(timestamp) = self.timestamp {
            map.insert(TIMESTAMP.to_string(), timestamp.to_string());
        }
        if let Some(reply_id) = &self.reply_id {
            map.insert(REPLY_ID.to_string(), reply_id.clone());
        }
        if let Some(images) = &self.images {
            map.insert(IMAGES.to_string(), encode_list(images));
        }
        if let Some(replies) = &self.replies {
            map.insert(REPLIES.to_string(), encode_list(replies));
        }
        map
    }

    /// Read a payload back out of a node's extra data map
    ///
    /// Returns `Ok(None)` when the map has no `community_id`: the message was not sent by
    /// this application.
    pub fn from_extra_data(map: &BTreeMap<String, String>) -> Result<Option<Self>, PayloadError> {
        let Some(community_id) = map.get(COMMUNITY_ID) else {
            return Ok(None);
        };

        let required = |field: &'static str| {
            map.get(field)
                .cloned()
                .ok_or(PayloadError::MissingField(field))
        };

        let timestamp = map
            .get(TIMESTAMP)
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| PayloadError::InvalidField {
                    field: TIMESTAMP,
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Some(Self {
            community_id: community_id.clone(),
            channel_id: required(CHANNEL_ID)?,
            message_id: required(MESSAGE_ID)?,
            message_type: required(MESSAGE_TYPE)?.parse()?,
            timestamp,
            reply_id: map.get(REPLY_ID).cloned(),
            images: map.get(IMAGES).map(|raw| decode_list(IMAGES, raw)).transpose()?,
            replies: map.get(REPLIES).map(|raw| decode_list(REPLIES, raw)).transpose()?,
        }))
    }
}

fn encode_list(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}

fn decode_list(field: &'static str, raw: &str) -> Result<Vec<String>, PayloadError> {
    serde_json::from_str(raw).map_err(|e| PayloadError::InvalidField {
        field,
        reason: e.to_string(),
    })
}
