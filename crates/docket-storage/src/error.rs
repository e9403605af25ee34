//! Storage error types.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g., "issue", "label").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Input violates a declared invariant.
    #[error("{message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// The operation conflicts with existing state (sub-issues present,
    /// non-empty database on import).
    #[error("{message}")]
    Conflict {
        /// Description of the conflict.
        message: String,
    },

    /// A relation of this type already links the endpoint pair, in one
    /// direction or the other.
    #[error("a {relation_type} relation between {source_id} and {target} already exists")]
    DuplicateRelation {
        /// Wire form of the relation type.
        relation_type: String,
        /// External form of the source issue id.
        source_id: String,
        /// External form of the target issue id.
        target: String,
    },

    /// Adding the edge would close a cycle in the relation graph.
    ///
    /// `path` is the cycle as internal issue ids, starting and ending at
    /// the would-be source. Formatting is left to the presentation layer.
    #[error("relation would create a cycle: {}", format_cycle(.path))]
    CycleDetected {
        /// The discovered cycle, e.g. `[3, 1, 2, 3]`.
        path: Vec<i64>,
    },

    /// Failed to establish or configure a database connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A transaction operation failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A schema migration failed.
    #[error("migration to version {version} failed: {reason}")]
    Migration {
        /// Target schema version of the failed step.
        version: i64,
        /// Underlying error description.
        reason: String,
    },

    /// A raw SQLite query error.
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    // -- Constructors --------------------------------------------------------

    /// Creates a [`StoreError::NotFound`] for the given entity kind and id.
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a [`StoreError::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a [`StoreError::Conflict`] with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    // -- Predicates ----------------------------------------------------------

    /// Returns `true` if this is a [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for errors that map to the CONFLICT exit code.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. } | Self::DuplicateRelation { .. } | Self::CycleDetected { .. }
        )
    }
}

/// Renders a cycle path as `DKT-3 -> DKT-1 -> DKT-2 -> DKT-3`.
fn format_cycle(path: &[i64]) -> String {
    path.iter()
        .map(|id| format!("{}-{id}", docket_core::id::ID_PREFIX))
        .collect::<Vec<_>>()
        .join(" -> ")
}
