//! Conversation records as they appear in a chat export, plus the row shape
//! they are stored as.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Node id → mapping entry. Sorted so that flattening is deterministic.
pub type Mapping = BTreeMap<String, MappingEntry>;

/// One element of the export's top-level array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    pub id: Option<String>,
    pub title: Option<String>,
    pub create_time: Option<f64>,
    pub update_time: Option<f64>,
    pub current_node: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub mapping: Mapping,
}

impl Conversation {
    /// The conversation id, or `None` when it is missing or empty.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A node of the conversation tree. Structural entries (the virtual root)
/// carry no message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingEntry {
    pub message: Option<Message>,
    pub parent: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    #[serde(deserialize_with = "null_as_default")]
    pub author: Author,
    pub content: Option<MessageContent>,
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.author.role.as_deref()
    }

    /// Non-empty string parts joined by a blank line. Non-text parts
    /// (image pointers, tool payloads) are skipped.
    #[must_use]
    pub fn text(&self) -> String {
        let Some(content) = &self.content else {
            return String::new();
        };
        content
            .parts
            .iter()
            .filter_map(serde_json::Value::as_str)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// `metadata.create_time`, falling back to `metadata.finish_time`.
    #[must_use]
    pub fn timestamp(&self) -> Option<f64> {
        self.metadata.as_ref().and_then(|meta| meta.create_time.or(meta.finish_time))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageContent {
    #[serde(deserialize_with = "null_as_default")]
    pub parts: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageMetadata {
    pub create_time: Option<f64>,
    pub finish_time: Option<f64>,
}

/// Stored form of a conversation: its metadata plus the fingerprint it was
/// last ingested with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRow {
    pub id: String,
    pub title: Option<String>,
    pub create_time: Option<f64>,
    pub update_time: Option<f64>,
    pub current_node: Option<String>,
    pub fingerprint: String,
}

impl ConversationRow {
    #[must_use]
    pub fn from_export(id: &str, conversation: &Conversation, fingerprint: String) -> Self {
        Self {
            id: id.to_owned(),
            title: conversation.title.clone(),
            create_time: conversation.create_time,
            update_time: conversation.update_time,
            current_node: conversation.current_node.clone(),
            fingerprint,
        }
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
