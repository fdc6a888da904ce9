//! # Wire Tests
//!
//! The JSON-lines driver end to end: raw request lines in, response lines out.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use onboard_node::{build_service, run_session, SessionStats};
    use otp_verification::{InMemoryOtpStore, Metrics, OtpConfig};
    use serde_json::Value;

    async fn run(config: OtpConfig, input: &str) -> (Vec<Value>, SessionStats, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new());
        let service = build_service(&config, Arc::new(InMemoryOtpStore::new()), metrics.clone());
        let mut out = Vec::new();
        let stats = run_session(&service, input.as_bytes(), &mut out)
            .await
            .unwrap();
        let responses = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (responses, stats, metrics)
    }

    #[tokio::test]
    async fn test_validation_errors_on_the_wire() {
        let input = concat!(
            r#"{"op":"issue","destinationKind":"EMAIL","destination":"not-an-email"}"#, "\n",
            r#"{"op":"verify","destinationKind":"EMAIL","destination":"a@b.com","code":"12a45"}"#, "\n",
            r#"{"op":"verify","destinationKind":"EMAIL","destination":"a@b.com","code":"123"}"#, "\n",
            r#"{"op":"verify","destinationKind":"FAX","destination":"1","code":"123456"}"#, "\n",
        );
        let (responses, stats, metrics) = run(OtpConfig::default(), input).await;

        assert_eq!(stats, SessionStats { handled: 4, failed: 4 });
        for response in &responses {
            assert_eq!(response["success"], false);
            assert_eq!(response["error"]["kind"], "validation_error");
        }
        // The unparseable line never reaches the service.
        assert_eq!(metrics.snapshot().rejected_validation, 3);
    }

    #[tokio::test]
    async fn test_production_issue_hides_code() {
        let input = concat!(
            r#"{"op":"issue","destinationKind":"PHONE","destination":"(555) 123-4567"}"#,
            "\n"
        );
        let (responses, stats, _) = run(OtpConfig::default(), input).await;

        assert_eq!(stats.failed, 0);
        assert_eq!(responses[0]["success"], true);
        assert!(responses[0].get("code").is_none());
        assert!(responses[0]["message"].is_string());
    }

    #[tokio::test]
    async fn test_development_round_trip_and_reuse() {
        let config = OtpConfig::development();
        let metrics = Arc::new(Metrics::new());
        let service = build_service(&config, Arc::new(InMemoryOtpStore::new()), metrics);

        let mut out = Vec::new();
        let issue = r#"{"op":"issue","destinationKind":"EMAIL","destination":"a@b.com"}"#;
        run_session(&service, format!("{issue}\n").as_bytes(), &mut out)
            .await
            .unwrap();
        let issued: Value = serde_json::from_slice(&out).unwrap();
        let code = issued["code"].as_str().unwrap();

        let verify = format!(
            r#"{{"op":"verify","destinationKind":"EMAIL","destination":"a@b.com","code":"{code}"}}"#
        );
        let mut out = Vec::new();
        let stats = run_session(&service, format!("{verify}\n{verify}\n").as_bytes(), &mut out)
            .await
            .unwrap();
        assert_eq!(stats, SessionStats { handled: 2, failed: 1 });

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["verified"], true);
        assert_eq!(lines[1]["error"]["kind"], "invalid_or_expired");
    }
}
