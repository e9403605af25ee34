//! Output envelope, error taxonomy, and exit-code mapping.
//!
//! Every command speaks through this module. Structured mode writes one
//! JSON envelope to stdout; human mode writes the message to stdout and
//! errors to stderr with an `Error:` prefix. A multi-line human message is
//! emitted verbatim so callers control their own layout.

use std::io::{self, Write};

use serde::Serialize;

use docket_core::enums::ParseEnumError;
use docket_core::filter::SortError;
use docket_core::id::ParseIdError;
use docket_planner::PlanError;
use docket_storage::StoreError;

use crate::context::RuntimeContext;

/// Stable error codes carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    GeneralError,
    NotFound,
    ValidationError,
    Conflict,
}

impl ErrorCode {
    /// The wire form of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GeneralError => "GENERAL_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
        }
    }

    /// The process exit code for this error class.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::GeneralError => 1,
            Self::NotFound => 2,
            Self::ValidationError => 3,
            Self::Conflict => 4,
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Classifies an error chain into its wire code.
///
/// Walks the chain so a wrapped storage or parse error keeps its class.
pub fn error_code_for(err: &anyhow::Error) -> ErrorCode {
    for cause in err.chain() {
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return match store_err {
                StoreError::NotFound { .. } => ErrorCode::NotFound,
                StoreError::Validation { .. } => ErrorCode::ValidationError,
                StoreError::Conflict { .. }
                | StoreError::DuplicateRelation { .. }
                | StoreError::CycleDetected { .. } => ErrorCode::Conflict,
                _ => ErrorCode::GeneralError,
            };
        }
        if let Some(plan_err) = cause.downcast_ref::<PlanError>() {
            return match plan_err {
                PlanError::Cycle { .. } => ErrorCode::Conflict,
                PlanError::UnknownRoot(_) => ErrorCode::NotFound,
            };
        }
        if cause.downcast_ref::<ParseIdError>().is_some()
            || cause.downcast_ref::<ParseEnumError>().is_some()
            || cause.downcast_ref::<SortError>().is_some()
        {
            return ErrorCode::ValidationError;
        }
    }
    ErrorCode::GeneralError
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    ok: bool,
    data: &'a T,
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'a str,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    ok: bool,
    error: &'a str,
    code: ErrorCode,
}

/// Emits a success result: the envelope in structured mode, the message
/// alone in human mode.
pub fn emit_success<T: Serialize>(ctx: &RuntimeContext, data: &T, message: &str) {
    if ctx.json {
        let envelope = SuccessEnvelope {
            ok: true,
            data,
            message,
        };
        print_json(&envelope);
        return;
    }
    if message.is_empty() {
        return;
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Multi-line messages are preformatted; never decorate them.
    let _ = writeln!(handle, "{message}");
}

/// Emits an error and returns the exit code the process should use.
pub fn emit_error(json: bool, err: &anyhow::Error) -> i32 {
    let code = error_code_for(err);
    let text = format!("{err:#}");
    if json {
        print_json(&ErrorEnvelope {
            ok: false,
            error: &text,
            code,
        });
    } else {
        eprintln!("Error: {text}");
    }
    code.exit_code()
}

/// Informational note: stderr, human mode only, silent when quiet.
pub fn info(ctx: &RuntimeContext, message: &str) {
    if !ctx.json && !ctx.quiet {
        eprintln!("{message}");
    }
}

/// Warning: stderr, silent only in structured mode.
pub fn warn(ctx: &RuntimeContext, message: &str) {
    if !ctx.json {
        eprintln!("warning: {message}");
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`).
            let _ = writeln!(handle, "{json}");
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(ErrorCode::GeneralError.exit_code(), 1);
        assert_eq!(ErrorCode::NotFound.exit_code(), 2);
        assert_eq!(ErrorCode::ValidationError.exit_code(), 3);
        assert_eq!(ErrorCode::Conflict.exit_code(), 4);
    }

    #[test]
    fn store_errors_map_to_codes() {
        let err = anyhow::Error::new(StoreError::not_found("issue", "DKT-9"));
        assert_eq!(error_code_for(&err), ErrorCode::NotFound);

        let err = anyhow::Error::new(StoreError::validation("bad input"));
        assert_eq!(error_code_for(&err), ErrorCode::ValidationError);

        let err = anyhow::Error::new(StoreError::CycleDetected { path: vec![1, 2, 1] });
        assert_eq!(error_code_for(&err), ErrorCode::Conflict);

        let err = anyhow::Error::new(StoreError::DuplicateRelation {
            relation_type: "blocks".into(),
            source_id: "DKT-1".into(),
            target: "DKT-2".into(),
        });
        assert_eq!(error_code_for(&err), ErrorCode::Conflict);

        let err = anyhow::Error::new(StoreError::Connection("gone".into()));
        assert_eq!(error_code_for(&err), ErrorCode::GeneralError);
    }

    #[test]
    fn wrapped_errors_keep_their_class() {
        let err = anyhow::Error::new(StoreError::not_found("issue", "DKT-9"))
            .context("while showing the issue");
        assert_eq!(error_code_for(&err), ErrorCode::NotFound);
    }

    #[test]
    fn parse_errors_are_validation() {
        let parse_err = "abc".parse::<docket_core::IssueId>().unwrap_err();
        assert_eq!(
            error_code_for(&anyhow::Error::new(parse_err)),
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn unknown_errors_are_general() {
        let err = anyhow::anyhow!("something odd");
        assert_eq!(error_code_for(&err), ErrorCode::GeneralError);
    }
}
