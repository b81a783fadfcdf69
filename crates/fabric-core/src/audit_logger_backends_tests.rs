//! Tests for audit logger backend implementations.
//!
//! Tests all four backend implementations:
//! - FilesystemAuditLogger: Local file-based logging
//! - BlobStorageAuditLogger: Cloud storage logging
//! - StdoutAuditLogger: Container observability
//! - CompositeAuditLogger: Multi-backend logging

use super::*;
use crate::{EventId, Repository, RepositoryId, SessionId, Timestamp, User, UserId, UserType};
use std::sync::Arc;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a test audit event
fn create_test_audit_event() -> AuditEvent {
    let owner = User {
        id: UserId::new(1),
        login: "testowner".to_string(),
        user_type: UserType::User,
    };

    AuditEvent::new(
        AuditEventType::WebhookProcessing,
        AuditActor::System {
            component_name: "fabric".to_string(),
            instance_id: "test-instance".to_string(),
            version: "1.0.0".to_string(),
        },
        AuditResource::WebhookEvent {
            event_id: EventId::new(),
            session_id: SessionId::new("owner/repo/pull_request/123".to_string()).unwrap(),
            repository: Repository::new(
                RepositoryId::new(12345),
                "repo".to_string(),
                "owner/repo".to_string(),
                owner,
                false,
            ),
            event_type: "pull_request".to_string(),
        },
        AuditAction::Process {
            operation: "webhook_validation".to_string(),
        },
        AuditResult::Success {
            duration: Some(std::time::Duration::from_millis(50)),
            details: Some("Validation successful".to_string()),
        },
        AuditContext::default(),
    )
}

// ============================================================================
// FilesystemAuditLogger Tests
// ============================================================================

mod filesystem_logger_tests {
    use super::*;

    /// Verify FilesystemAuditLogger can be created
    #[tokio::test]
    #[should_panic(expected = "not yet implemented")]
    async fn test_filesystem_logger_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit_logs");

        let _logger = FilesystemAuditLogger::new(log_path.clone()).unwrap();
    }

    /// Verify FilesystemAuditLogger logs events
    #[tokio::test]
    #[should_panic(expected = "not yet implemented")]
    async fn test_filesystem_logger_logs_event() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit_logs");

        let logger = FilesystemAuditLogger::new(log_path.clone()).unwrap();
        let event = create_test_audit_event();

        let _audit_id = logger.log_event(event.clone()).await.unwrap();
    }

    /// Verify FilesystemAuditLogger maintains hash chain
    #[tokio::test]
    #[should_panic(expected = "not yet implemented")]
    async fn test_filesystem_logger_hash_chain() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit_logs");

        let logger = FilesystemAuditLogger::new(log_path.clone()).unwrap();

        let event1 = create_test_audit_event();
        let event2 = create_test_audit_event();

        logger.log_event(event1.clone()).await.unwrap();
        logger.log_event(event2.clone()).await.unwrap();
    }
}

// ============================================================================
// StdoutAuditLogger Tests
// ============================================================================

mod stdout_logger_tests {
    use super::*;

    /// Verify StdoutAuditLogger can be created
    #[tokio::test]
    #[should_panic(expected = "not yet implemented")]
    async fn test_stdout_logger_creation() {
        let _logger = StdoutAuditLogger::new();
    }

    /// Verify StdoutAuditLogger logs events
    #[tokio::test]
    #[should_panic(expected = "not yet implemented")]
    async fn test_stdout_logger_logs_events() {
        let logger = StdoutAuditLogger::new();
        let event = create_test_audit_event();

        let _audit_id = logger.log_event(event.clone()).await.unwrap();
    }
}

// ============================================================================
// CompositeAuditLogger Tests
// ============================================================================

mod composite_logger_tests {
    use super::*;

    /// Verify CompositeAuditLogger can be created
    #[tokio::test]
    #[should_panic(expected = "not yet implemented")]
    async fn test_composite_logger_creation() {
        let stdout_logger = Arc::new(StdoutAuditLogger::new());
        let _logger = CompositeAuditLogger::new(vec![stdout_logger]);
    }

    /// Verify CompositeAuditLogger logs to all backends
    #[tokio::test]
    #[should_panic(expected = "not yet implemented")]
    async fn test_composite_logger_logs_to_all_backends() {
        let stdout_logger = Arc::new(StdoutAuditLogger::new());
        let logger = CompositeAuditLogger::new(vec![stdout_logger]);

        let event = create_test_audit_event();
        let _audit_id = logger.log_event(event.clone()).await.unwrap();
    }
}
