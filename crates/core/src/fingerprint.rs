//! Change-detection digest for conversations.

use sha2::{Digest as _, Sha256};

use crate::Conversation;

/// SHA-256 (lowercase hex) over the fields that change when a conversation
/// is edited: id, `update_time`, mapping size and `current_node`.
///
/// Each field is length-prefixed, so no choice of field contents can make two
/// different field tuples hash the same input. Title and message text are not
/// part of the digest.
#[must_use]
pub fn fingerprint(conversation: &Conversation) -> String {
    let update_time = conversation.update_time.map(|t| t.to_string()).unwrap_or_default();
    let mapping_len = conversation.mapping.len().to_string();
    let fields = [
        conversation.id.as_deref().unwrap_or_default(),
        update_time.as_str(),
        mapping_len.as_str(),
        conversation.current_node.as_deref().unwrap_or_default(),
    ];

    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
