//! Per-conversation project summary and "ghost" detection: a conversation
//! whose last message is a user complaint that never got an answer.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use ia_core::ConversationRow;
use ia_core::constants::GHOST_KEYWORDS;
use ia_storage::Storage;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// A suspected unresolved problem and the nodes that show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostProblem {
    pub description: String,
    pub evidence: Vec<String>,
}

/// One conversation treated as a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub title: Option<String>,
    pub node_ids: Vec<String>,
    pub ghost_problems: Vec<GhostProblem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub projects: Vec<Project>,
}

impl AnalysisSummary {
    /// Read a summary previously written by [`AnalysisSummary::write`].
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not a summary.
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let raw = fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Write the summary as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), ServiceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

/// First ghost keyword contained in `content`, compared case-insensitively.
fn ghost_keyword(content: &str) -> Option<&'static str> {
    let lowered = content.to_lowercase();
    GHOST_KEYWORDS.iter().copied().find(|kw| lowered.contains(*kw))
}

pub struct AnalysisService {
    storage: Arc<Storage>,
}

impl AnalysisService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// One project per stored conversation, ordered by conversation id.
    ///
    /// # Errors
    /// Returns error if a store read fails.
    pub fn analyze(&self) -> Result<AnalysisSummary, ServiceError> {
        let conversations = self.storage.list_conversations()?;
        let mut projects = Vec::with_capacity(conversations.len());
        for conversation in &conversations {
            projects.push(Project {
                project_id: conversation.id.clone(),
                title: conversation.title.clone(),
                node_ids: self.storage.node_ids_for_conversation(&conversation.id)?,
                ghost_problems: self.detect_ghosts(conversation)?,
            });
        }
        let ghosts: usize = projects.iter().map(|p| p.ghost_problems.len()).sum();
        tracing::info!(projects = projects.len(), ghosts, "Analysis complete");
        Ok(AnalysisSummary { projects })
    }

    /// Flags a conversation whose current node is a user message mentioning
    /// an error. At most one problem per conversation.
    ///
    /// # Errors
    /// Returns error if the node lookup fails.
    pub fn detect_ghosts(
        &self,
        conversation: &ConversationRow,
    ) -> Result<Vec<GhostProblem>, ServiceError> {
        let Some(current) = conversation.current_node.as_deref().filter(|c| !c.is_empty()) else {
            return Ok(Vec::new());
        };
        let Some(node) = self.storage.get_node(current)? else {
            return Ok(Vec::new());
        };
        if !node.role.as_deref().is_some_and(|role| role.eq_ignore_ascii_case("user")) {
            return Ok(Vec::new());
        }
        Ok(ghost_keyword(&node.content)
            .map(|kw| GhostProblem {
                description: format!("Unresolved user message containing '{kw}'"),
                evidence: vec![current.to_owned()],
            })
            .into_iter()
            .collect())
    }
}
