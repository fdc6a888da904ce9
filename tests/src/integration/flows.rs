//! # Integration Test Flows
//!
//! Issue/verify lifecycles driven through the public `OtpApi` surface with
//! the in-memory store, recording channels and a manual clock.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use otp_verification::{
        Clock, DeploymentMode, Destination, DestinationKind, InMemoryOtpStore, ManualClock, Metrics,
        OtpApi, OtpConfig, OtpConfigBuilder, OtpError, OtpService, RecordingEmailChannel,
        RecordingSmsChannel, ScriptedCodeSource,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Fixture {
        store: Arc<InMemoryOtpStore>,
        email: Arc<RecordingEmailChannel>,
        sms: Arc<RecordingSmsChannel>,
        clock: Arc<ManualClock>,
        metrics: Arc<Metrics>,
        service: OtpService<InMemoryOtpStore>,
    }

    fn fixture(config: OtpConfig) -> Fixture {
        let store = Arc::new(InMemoryOtpStore::new());
        let email = Arc::new(RecordingEmailChannel::new());
        let sms = Arc::new(RecordingSmsChannel::new());
        let clock = Arc::new(ManualClock::default());
        let metrics = Arc::new(Metrics::new());
        let service = OtpService::new(store.clone(), config)
            .with_email_channel(email.clone())
            .with_sms_channel(sms.clone())
            .with_clock(clock.clone())
            .with_metrics(metrics.clone());
        Fixture {
            store,
            email,
            sms,
            clock,
            metrics,
            service,
        }
    }

    /// Pull the code out of the last email body (production never echoes it).
    fn code_from_email(email: &RecordingEmailChannel) -> String {
        let body = email.last().expect("email sent").html_body;
        body.as_bytes()
            .windows(6)
            .find(|w| w.iter().all(u8::is_ascii_digit))
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .expect("code in body")
    }

    fn other_code(code: &str) -> String {
        let n: u32 = code.parse().unwrap();
        format!("{:06}", (n + 1) % 1_000_000)
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_production_email_lifecycle_uses_delivered_code() {
        let f = fixture(OtpConfig::default());

        let outcome = f
            .service
            .issue(DestinationKind::Email, "investor@example.com")
            .await
            .unwrap();
        assert!(outcome.code.is_none());

        let code = code_from_email(&f.email);
        let verified = f
            .service
            .verify(DestinationKind::Email, "investor@example.com", &code)
            .await
            .unwrap();
        assert!(verified.verified);

        let snapshot = f.metrics.snapshot();
        assert_eq!(snapshot.email_issued, 1);
        assert_eq!(snapshot.verified, 1);
    }

    #[tokio::test]
    async fn test_issue_twice_only_second_code_works() {
        let store = Arc::new(InMemoryOtpStore::new());
        let service = OtpService::new(store, OtpConfig::development())
            .with_email_channel(Arc::new(RecordingEmailChannel::new()))
            .with_code_source(Arc::new(ScriptedCodeSource::new(["482913", "105577"])));

        for _ in 0..2 {
            service.issue(DestinationKind::Email, "a@b.com").await.unwrap();
        }

        assert!(matches!(
            service.verify(DestinationKind::Email, "a@b.com", "482913").await,
            Err(OtpError::InvalidOrExpired)
        ));
        assert!(service
            .verify(DestinationKind::Email, "a@b.com", "105577")
            .await
            .unwrap()
            .verified);
    }

    #[tokio::test]
    async fn test_lockout_after_failed_attempts_then_reissue_recovers() {
        let f = fixture(OtpConfig::development());
        let code = f
            .service
            .issue(DestinationKind::Phone, "(555) 123-4567")
            .await
            .unwrap()
            .code
            .unwrap();
        let bad = other_code(&code);

        for _ in 0..5 {
            assert!(matches!(
                f.service.verify(DestinationKind::Phone, "5551234567", &bad).await,
                Err(OtpError::InvalidOrExpired)
            ));
        }
        assert!(matches!(
            f.service.verify(DestinationKind::Phone, "5551234567", &code).await,
            Err(OtpError::MaxAttemptsExceeded { max: 5 })
        ));
        assert_eq!(f.metrics.snapshot().rejected_max_attempts, 1);

        // A fresh code carries a fresh budget.
        let fresh = f
            .service
            .issue(DestinationKind::Phone, "+1 555 123 4567")
            .await
            .unwrap()
            .code
            .unwrap();
        assert!(f
            .service
            .verify(DestinationKind::Phone, "+15551234567", &fresh)
            .await
            .is_ok());
        assert_eq!(f.sms.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_exclusive() {
        let f = fixture(OtpConfig::development());
        let code = f
            .service
            .issue(DestinationKind::Email, "a@b.com")
            .await
            .unwrap()
            .code
            .unwrap();

        f.clock.advance(Duration::minutes(10));
        assert!(matches!(
            f.service.verify(DestinationKind::Email, "a@b.com", &code).await,
            Err(OtpError::InvalidOrExpired)
        ));
    }

    #[tokio::test]
    async fn test_failed_attempt_on_expired_record_still_counts() {
        let f = fixture(OtpConfig::development());
        let code = f
            .service
            .issue(DestinationKind::Email, "a@b.com")
            .await
            .unwrap()
            .code
            .unwrap();

        f.clock.advance(Duration::hours(1));
        let _ = f
            .service
            .verify(DestinationKind::Email, "a@b.com", &code)
            .await;

        let records = f.store.records();
        assert_eq!(records[0].attempts, 1);
    }

    #[tokio::test]
    async fn test_short_ttl_and_custom_platform() {
        let config = OtpConfigBuilder::new()
            .deployment_mode(DeploymentMode::Development)
            .ttl_secs(90)
            .platform_name("Northwind Invest")
            .build()
            .unwrap();
        let f = fixture(config);

        let outcome = f
            .service
            .issue(DestinationKind::Email, "a@b.com")
            .await
            .unwrap();
        let sent = f.email.last().unwrap();
        assert!(sent.subject.contains("Northwind Invest"));
        assert!(sent.html_body.contains("2 minutes"));

        f.clock.advance(Duration::seconds(91));
        assert!(matches!(
            f.service
                .verify(DestinationKind::Email, "a@b.com", outcome.code.as_deref().unwrap())
                .await,
            Err(OtpError::InvalidOrExpired)
        ));
    }

    #[tokio::test]
    async fn test_destinations_are_isolated() {
        let f = fixture(OtpConfig::development());
        let a = f
            .service
            .issue(DestinationKind::Email, "a@b.com")
            .await
            .unwrap()
            .code
            .unwrap();
        let c = f
            .service
            .issue(DestinationKind::Email, "c@d.com")
            .await
            .unwrap()
            .code
            .unwrap();

        if a != c {
            assert!(f
                .service
                .verify(DestinationKind::Email, "c@d.com", &a)
                .await
                .is_err());
        }
        assert!(f.service.verify(DestinationKind::Email, "a@b.com", &a).await.is_ok());
        assert!(f.service.verify(DestinationKind::Email, "c@d.com", &c).await.is_ok());
    }

    #[tokio::test]
    async fn test_purge_keeps_only_live_records() {
        let f = fixture(OtpConfig::development());
        for _ in 0..3 {
            f.service
                .issue(DestinationKind::Email, "a@b.com")
                .await
                .unwrap();
        }
        assert_eq!(f.store.len(), 3);

        let purged = f.store.purge_expired(f.clock.now());
        assert_eq!(purged, 2);
        assert_eq!(
            f.store.records()[0].destination,
            Destination::Email("a@b.com".into())
        );
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            /// Any punctuation of the same national number reaches the same record.
            #[test]
            fn prop_phone_formatting_is_irrelevant(
                area in 200u32..999,
                line in 0u32..10_000_000,
                sep in "[ .-]{0,2}",
            ) {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                let f = fixture(OtpConfig::development());
                let digits = format!("{area}{line:07}");
                let dressed = format!("({area}){sep}{}{sep}{}", &digits[3..6], &digits[6..]);

                let code = runtime
                    .block_on(f.service.issue(DestinationKind::Phone, &dressed))
                    .unwrap()
                    .code
                    .unwrap();
                let outcome = runtime
                    .block_on(f.service.verify(DestinationKind::Phone, &digits, &code))
                    .unwrap();
                prop_assert!(outcome.verified);
                prop_assert_eq!(
                    f.sms.last().unwrap().to,
                    format!("+1{digits}")
                );
            }
        }
    }
}
