//! Unified error type used across all collection phases.

use thiserror::Error;

use crate::ir::validate::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Validate,
    Resolve,
    Reconcile,
    Filter,
    Assemble,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Resolve => write!(f, "Resolve"),
            Phase::Reconcile => write!(f, "Reconcile"),
            Phase::Filter => write!(f, "Filter"),
            Phase::Assemble => write!(f, "Assemble"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("[{phase}:{code}] {message}{}", component_suffix(.component_id))]
pub struct CollectError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub component_id: Option<String>,
}

fn component_suffix(component_id: &Option<String>) -> String {
    match component_id {
        Some(id) => format!(" (component '{}')", id),
        None => String::new(),
    }
}

impl From<ValidationError> for CollectError {
    fn from(e: ValidationError) -> Self {
        CollectError {
            code: e.code.to_string(),
            phase: Phase::Reconcile,
            message: e.message,
            component_id: e.component_id,
        }
    }
}

impl CollectError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        CollectError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            component_id: None,
        }
    }

    pub fn validate(code: &str, message: impl Into<String>, component_id: Option<String>) -> Self {
        CollectError {
            code: code.into(),
            phase: Phase::Validate,
            message: message.into(),
            component_id,
        }
    }

    pub fn resolve(code: &str, message: impl Into<String>, component_id: Option<String>) -> Self {
        CollectError {
            code: code.into(),
            phase: Phase::Resolve,
            message: message.into(),
            component_id,
        }
    }

    pub fn filter(code: &str, message: impl Into<String>, component_id: Option<String>) -> Self {
        CollectError {
            code: code.into(),
            phase: Phase::Filter,
            message: message.into(),
            component_id,
        }
    }

    pub fn assemble(code: &str, message: impl Into<String>, component_id: Option<String>) -> Self {
        CollectError {
            code: code.into(),
            phase: Phase::Assemble,
            message: message.into(),
            component_id,
        }
    }

    /// Collapse a phase's error list into the single failure handed to callers.
    /// The first error keeps its code and phase; the rest are appended to the message.
    pub fn collapse(mut errors: Vec<CollectError>) -> Option<CollectError> {
        if errors.is_empty() {
            return None;
        }
        let mut first = errors.remove(0);
        if !errors.is_empty() {
            let rest: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            first.message = format!("{}; also: {}", first.message, rest.join("; "));
        }
        Some(first)
    }
}
