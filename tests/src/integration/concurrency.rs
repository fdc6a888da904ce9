//! # Concurrency Tests
//!
//! Racing requests against one shared service and store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use otp_verification::{
        Clock, DestinationKind, InMemoryOtpStore, OtpApi, OtpConfig, OtpError, OtpService,
        RecordingEmailChannel, SystemClock,
    };

    const CONTENDERS: usize = 32;

    fn shared_service() -> (Arc<InMemoryOtpStore>, Arc<OtpService<InMemoryOtpStore>>) {
        let store = Arc::new(InMemoryOtpStore::new());
        let service = OtpService::new(store.clone(), OtpConfig::development())
            .with_email_channel(Arc::new(RecordingEmailChannel::new()));
        (store, Arc::new(service))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_issuance_leaves_one_live_record() {
        let (store, service) = shared_service();

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .issue(DestinationKind::Email, "race@example.com")
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let now = SystemClock.now();
        let records = store.records();
        assert_eq!(records.len(), CONTENDERS);
        assert_eq!(records.iter().filter(|r| r.is_live(now)).count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_verification_succeeds_once() {
        let (_store, service) = shared_service();
        let code = service
            .issue(DestinationKind::Email, "once@example.com")
            .await
            .unwrap()
            .code
            .unwrap();

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let service = service.clone();
                let code = code.clone();
                tokio::spawn(async move {
                    service
                        .verify(DestinationKind::Email, "once@example.com", &code)
                        .await
                })
            })
            .collect();

        let mut verified = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(outcome) => {
                    assert!(outcome.verified);
                    verified += 1;
                }
                Err(OtpError::InvalidOrExpired) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(verified, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_destinations_do_not_interfere() {
        let (store, service) = shared_service();

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    let address = format!("user{i}@example.com");
                    let code = service
                        .issue(DestinationKind::Email, &address)
                        .await
                        .unwrap()
                        .code
                        .unwrap();
                    service
                        .verify(DestinationKind::Email, &address, &code)
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().unwrap().verified);
        }
        assert!(store.records().iter().all(|r| r.verified));
    }
}
