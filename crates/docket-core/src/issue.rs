//! Issue struct -- the central domain model for docket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Kind, Priority, Status};
use crate::id::IssueId;
use crate::time;

/// Represents a trackable work item.
///
/// `labels` and `files` are hydrated sub-collections: they are populated by
/// the operations that promise them and must not be assumed present
/// otherwise. `files` is sorted alphabetically whenever it is hydrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,

    /// Parent in the sub-issue tree; multiple roots are allowed.
    #[serde(default)]
    pub parent_id: Option<IssueId>,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default, rename = "type")]
    pub kind: Kind,

    #[serde(default)]
    pub assignee: String,

    /// Label names attached to this issue (empty array, never null).
    #[serde(default)]
    pub labels: Vec<String>,

    /// File paths attached to this issue (paths only, no blobs).
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(with = "time::timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "time::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Returns `true` when the issue has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Builder for constructing an [`Issue`] with a fluent API.
///
/// The id defaults to `DKT-1`; the store overwrites it on insert.
pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    /// Creates a new builder with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        let now = time::now();
        Self {
            issue: Issue {
                id: IssueId::new(1).expect("1 is positive"),
                parent_id: None,
                title: title.into(),
                description: String::new(),
                status: Status::default(),
                priority: Priority::default(),
                kind: Kind::default(),
                assignee: String::new(),
                labels: Vec::new(),
                files: Vec::new(),
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn id(mut self, id: IssueId) -> Self {
        self.issue.id = id;
        self
    }

    pub fn parent(mut self, parent: IssueId) -> Self {
        self.issue.parent_id = Some(parent);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.issue.description = description.into();
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.issue.status = status;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.issue.priority = priority;
        self
    }

    pub fn kind(mut self, kind: Kind) -> Self {
        self.issue.kind = kind;
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.issue.assignee = assignee.into();
        self
    }

    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.issue.labels = labels;
        self
    }

    pub fn files(mut self, files: Vec<String>) -> Self {
        self.issue.files = files;
        self
    }

    pub fn created_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.created_at = t;
        self
    }

    pub fn updated_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.updated_at = t;
        self
    }

    /// Consumes the builder and returns the constructed [`Issue`].
    pub fn build(self) -> Issue {
        self.issue
    }
}
