#![forbid(unsafe_code)]

//! Named, immutable document snapshots.
//!
//! A [`Project`] is created on explicit save and never changes afterwards.
//! The [`ProjectLibrary`] keeps projects newest first, independent of the
//! live document and its undo history.

use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::id::{IdGenerator, ProjectId};
use crate::model::Document;

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A saved snapshot of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    #[serde(rename = "timestamp")]
    created_at: u64,
    #[serde(rename = "storytellings")]
    document: Document,
}

impl Project {
    /// Build a project. Returns `None` when `name` is blank after trimming.
    #[must_use]
    pub fn new(
        id: ProjectId,
        name: &str,
        created_at: u64,
        document: Document,
    ) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id,
            name: name.to_owned(),
            created_at,
            document,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Repair the saved document after deserialization.
    #[must_use]
    pub fn normalized(mut self, ids: &mut IdGenerator) -> Self {
        self.document = self.document.normalized(ids);
        self
    }
}

/// Saved projects, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectLibrary {
    projects: Vec<Project>,
}

impl ProjectLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap projects loaded from storage, assumed to be newest first.
    #[must_use]
    pub fn from_projects(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Save `document` under `name`, stamped with the current time.
    pub fn save(
        &mut self,
        name: &str,
        document: &Document,
        ids: &mut IdGenerator,
    ) -> Option<&Project> {
        self.save_at(name, document, ids, now_millis())
    }

    /// Save with an explicit timestamp. A blank name is a no-op.
    pub fn save_at(
        &mut self,
        name: &str,
        document: &Document,
        ids: &mut IdGenerator,
        created_at: u64,
    ) -> Option<&Project> {
        let project = Project::new(ids.project_id(), name, created_at, document.clone())?;
        self.projects.insert(0, project);
        self.projects.first()
    }

    /// Delete a project. Returns the removed project, if it existed.
    pub fn delete(&mut self, id: &ProjectId) -> Option<Project> {
        let idx = self.projects.iter().position(|p| &p.id == id)?;
        Some(self.projects.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
