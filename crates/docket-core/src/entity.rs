//! Secondary entities: comments, labels, relations, and activity rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::RelationType;
use crate::id::IssueId;
use crate::time;

/// A comment on an issue. Cascades with its issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub issue_id: IssueId,
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(with = "time::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A label. Names are globally unique; the color is advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A typed edge between two distinct issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub id: i64,
    pub source_id: IssueId,
    pub target_id: IssueId,
    pub relation_type: RelationType,
    #[serde(with = "time::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// An append-only audit record describing one change to an issue.
///
/// `field_changed` is either a field name (`status`, `parent_id`, ...) or an
/// event name (`created`, `comment_added`, `label_removed`, ...). Activity
/// rows are written in the same transaction as the mutation they describe
/// and are never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub issue_id: IssueId,
    pub field_changed: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    pub changed_by: String,
    #[serde(with = "time::timestamp")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_serde_roundtrip() {
        let comment = Comment {
            id: 4,
            issue_id: "DKT-2".parse().unwrap(),
            body: "Looks good".into(),
            author: Some("alice".into()),
            created_at: time::now(),
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["issue_id"], "DKT-2");
        let back: Comment = serde_json::from_value(json).unwrap();
        assert_eq!(back.body, "Looks good");
    }

    #[test]
    fn anonymous_comment_author_is_null() {
        let comment = Comment {
            id: 1,
            issue_id: "DKT-1".parse().unwrap(),
            body: "note".into(),
            author: None,
            created_at: time::now(),
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert!(json["author"].is_null());
    }

    #[test]
    fn relation_serde_uses_wire_type() {
        let rel = Relation {
            id: 1,
            source_id: "DKT-1".parse().unwrap(),
            target_id: "DKT-2".parse().unwrap(),
            relation_type: RelationType::DependsOn,
            created_at: time::now(),
        };
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["relation_type"], "depends_on");
    }
}
