//! Enum types for the docket issue tracker.
//!
//! Each enum is a closed set with:
//! - a case-insensitive `FromStr` that rejects unknown values
//! - `as_str()` returning the canonical wire form
//! - serde via the string form
//!
//! Canonical forms are lower-case and hyphenated (`in-progress`); the one
//! exception is `depends_on`, which keeps its underscore on the wire but
//! also parses with a hyphen.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} {value:?} (expected one of: {})", .allowed.join(", "))]
pub struct ParseEnumError {
    /// Which enum was being parsed (e.g. "status").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// The canonical values accepted.
    pub allowed: &'static [&'static str],
}

// ---------------------------------------------------------------------------
// Macro: defines a closed enum with canonical strings and optional aliases.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, kind = $kind:expr, default = $default:ident,
        variants: [
            $( ($variant:ident, $str:literal $(, $alias:literal)* ) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[ $( Self::$variant, )+ ];

            /// Canonical wire forms, matching [`Self::ALL`].
            pub const NAMES: &'static [&'static str] = &[ $( $str, )+ ];

            /// Returns the canonical string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_ascii_lowercase();
                match lower.as_str() {
                    $( $str $( | $alias )* => Ok(Self::$variant), )+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                        allowed: Self::NAMES,
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ===========================================================================
// Status
// ===========================================================================

define_enum! {
    /// Workflow state of an issue.
    Status, kind = "status", default = Backlog,
    variants: [
        (Backlog, "backlog"),
        (Todo, "todo"),
        (InProgress, "in-progress", "in_progress"),
        (Review, "review"),
        (Done, "done"),
    ]
}

impl Status {
    /// Rank used by the default list sort: active work first, done last.
    pub fn workflow_rank(self) -> i32 {
        match self {
            Self::InProgress => 0,
            Self::Todo => 1,
            Self::Backlog => 2,
            Self::Review => 3,
            Self::Done => 4,
        }
    }
}

// ===========================================================================
// Priority
// ===========================================================================

define_enum! {
    /// How urgent an issue is.
    Priority, kind = "priority", default = None,
    variants: [
        (Critical, "critical"),
        (High, "high"),
        (Medium, "medium"),
        (Low, "low"),
        (None, "none"),
    ]
}

impl Priority {
    /// Rank for sorting: critical=0 through none=4.
    pub fn rank(self) -> i32 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::None => 4,
        }
    }
}

// ===========================================================================
// Kind
// ===========================================================================

define_enum! {
    /// Categorises the kind of work.
    Kind, kind = "type", default = Task,
    variants: [
        (Bug, "bug"),
        (Feature, "feature"),
        (Task, "task"),
        (Epic, "epic"),
        (Chore, "chore"),
    ]
}

// ===========================================================================
// RelationType
// ===========================================================================

define_enum! {
    /// Relationship between two issues.
    RelationType, kind = "relation type", default = Blocks,
    variants: [
        (Blocks, "blocks"),
        (DependsOn, "depends_on", "depends-on"),
        (RelatesTo, "relates_to", "relates-to"),
        (Duplicates, "duplicates"),
    ]
}

impl RelationType {
    /// Returns `true` for the types that form the planning DAG.
    ///
    /// Only directional types participate in cycle detection; each forms an
    /// independent graph.
    pub fn is_directional(self) -> bool {
        matches!(self, Self::Blocks | Self::DependsOn)
    }

    /// Label used when describing the relation from the target's side.
    pub fn inverse_label(self) -> &'static str {
        match self {
            Self::Blocks => "blocked_by",
            Self::DependsOn => "dependency_of",
            Self::RelatesTo => "relates_to",
            Self::Duplicates => "duplicate_of",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_default_is_backlog() {
        assert_eq!(Status::default(), Status::Backlog);
        assert!(Status::Backlog.is_default());
        assert!(!Status::Done.is_default());
    }

    #[test]
    fn status_parse_case_insensitive() {
        assert_eq!("In-Progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("in_progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("DONE".parse::<Status>().unwrap(), Status::Done);
    }

    #[test]
    fn status_rejects_unknown() {
        let err = "open".parse::<Status>().unwrap_err();
        assert_eq!(err.kind, "status");
        assert!(err.allowed.contains(&"backlog"));
    }

    #[test]
    fn status_serde_uses_hyphenated_form() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
        let back: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Status::InProgress);
    }

    #[test]
    fn workflow_rank_orders_active_first() {
        assert!(Status::InProgress.workflow_rank() < Status::Todo.workflow_rank());
        assert!(Status::Todo.workflow_rank() < Status::Backlog.workflow_rank());
        assert!(Status::Review.workflow_rank() < Status::Done.workflow_rank());
    }

    #[test]
    fn priority_rank() {
        assert_eq!(Priority::Critical.rank(), 0);
        assert_eq!(Priority::None.rank(), 4);
        assert_eq!(Priority::default(), Priority::None);
    }

    #[test]
    fn kind_parse() {
        assert_eq!("bug".parse::<Kind>().unwrap(), Kind::Bug);
        assert_eq!(Kind::default(), Kind::Task);
        assert!("story".parse::<Kind>().is_err());
    }

    #[test]
    fn relation_type_wire_form_keeps_underscore() {
        assert_eq!(RelationType::DependsOn.as_str(), "depends_on");
        assert_eq!(
            "depends-on".parse::<RelationType>().unwrap(),
            RelationType::DependsOn
        );
    }

    #[test]
    fn relation_type_directional() {
        assert!(RelationType::Blocks.is_directional());
        assert!(RelationType::DependsOn.is_directional());
        assert!(!RelationType::RelatesTo.is_directional());
        assert!(!RelationType::Duplicates.is_directional());
    }

    #[test]
    fn relation_inverse_labels() {
        assert_eq!(RelationType::Blocks.inverse_label(), "blocked_by");
        assert_eq!(RelationType::DependsOn.inverse_label(), "dependency_of");
        assert_eq!(RelationType::RelatesTo.inverse_label(), "relates_to");
        assert_eq!(RelationType::Duplicates.inverse_label(), "duplicate_of");
    }
}
