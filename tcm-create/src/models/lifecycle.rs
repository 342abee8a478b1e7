//! Request lifecycle tracking
//!
//! One instance exists per asynchronous operation of a creation session
//! (reference load, file upload, final submit). Only the owning component
//! mutates it.

use serde::{Deserialize, Serialize};

/// State of a single asynchronous operation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum RequestLifecycle {
    /// Not started, or reset
    #[default]
    Idle,
    /// Request in flight
    Pending,
    /// Last request completed successfully
    Succeeded,
    /// Last request failed with the surfaced reason
    Failed(String),
}

impl RequestLifecycle {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestLifecycle::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RequestLifecycle::Pending)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, RequestLifecycle::Succeeded)
    }

    /// Failure reason, if the last request failed
    pub fn failure(&self) -> Option<&str> {
        match self {
            RequestLifecycle::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let lifecycle = RequestLifecycle::default();
        assert!(lifecycle.is_idle());
        assert!(!lifecycle.is_pending());
        assert_eq!(lifecycle.failure(), None);
    }

    #[test]
    fn test_failure_reason() {
        let lifecycle = RequestLifecycle::Failed("network error".to_string());
        assert_eq!(lifecycle.failure(), Some("network error"));
        assert!(!lifecycle.is_succeeded());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(RequestLifecycle::Failed("boom".to_string())).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "boom");

        let json = serde_json::to_value(RequestLifecycle::Pending).unwrap();
        assert_eq!(json["state"], "pending");
    }
}
