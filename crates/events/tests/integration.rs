//! Integration tests for events

#[cfg(test)]
mod tests {
    use esmc_events::*;

    #[tokio::test]
    async fn test_event_sender_emits() {
        let (tx, mut rx) = channel();

        tx.emit_warning_with_context("unexpected algorithm", "ed25519");
        tx.emit_operation_failed(
            "verify package",
            &esmc_errors::Error::from(esmc_errors::StorageError::PathNotFound {
                path: "/srv/pkg".into(),
            }),
        );

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1,
            AppEvent::General(GeneralEvent::Warning { context: Some(ref c), .. }) if c == "ed25519"
        ));
        assert!(event1.is_diagnostic());

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::General(GeneralEvent::OperationFailed { .. })
        ));
        assert_eq!(event2.log_level(), tracing::Level::ERROR);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_integrity(IntegrityEvent::Started {
            root: "/srv/pkg".into(),
        });
    }

    #[test]
    fn test_missing_sender_is_silent() {
        let sender: Option<EventSender> = None;
        sender.emit_license(LicenseEvent::BlessingDegraded {
            reason: "unreadable".into(),
        });
    }

    #[test]
    fn test_diagnostics_are_warnings() {
        let degraded = AppEvent::License(LicenseEvent::BlessingDegraded {
            reason: "bad json".into(),
        });
        assert_eq!(degraded.log_level(), tracing::Level::WARN);
        assert!(degraded.is_diagnostic());

        let completed = AppEvent::Integrity(IntegrityEvent::Completed {
            passed: true,
            verified: 1,
            modified: 0,
            missing: 0,
            duration_ms: 3,
        });
        assert_eq!(completed.log_level(), tracing::Level::INFO);
        assert!(!completed.is_diagnostic());
        assert_eq!(completed.log_target(), "esmc::events::integrity");
    }

    #[test]
    fn test_event_serialization_shape() {
        let event = AppEvent::Integrity(IntegrityEvent::FileMissing {
            path: "lib/a.js".into(),
            reason: "not found".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "integrity");
        assert_eq!(json["event"]["type"], "file_missing");
        assert_eq!(json["event"]["path"], "lib/a.js");
    }
}
