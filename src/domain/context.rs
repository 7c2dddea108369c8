//! Operation Context
//!
//! Metadata about the current operation, threaded through handlers for
//! tracing and attribution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for an operation, used for tracing and attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    /// Who initiated the operation (teller terminal, batch job, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiated_by: Option<String>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            correlation_id: None,
            initiated_by: None,
        }
    }

    /// Create context with a correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Create context with an initiator tag
    pub fn with_initiator(mut self, initiated_by: impl Into<String>) -> Self {
        self.initiated_by = Some(initiated_by.into());
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context() {
        let ctx = OperationContext::new();
        assert!(ctx.correlation_id.is_none());
        assert!(ctx.initiated_by.is_none());
    }

    #[test]
    fn test_ensure_correlation_id_is_stable() {
        let mut ctx = OperationContext::new();
        let id = ctx.ensure_correlation_id();
        assert_eq!(ctx.ensure_correlation_id(), id);
    }

    #[test]
    fn test_builder_style() {
        let id = Uuid::new_v4();
        let ctx = OperationContext::new()
            .with_correlation_id(id)
            .with_initiator("teller-42");
        assert_eq!(ctx.correlation_id, Some(id));
        assert_eq!(ctx.initiated_by.as_deref(), Some("teller-42"));
    }
}
