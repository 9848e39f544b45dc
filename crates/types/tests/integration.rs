//! Integration tests for types crate

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use esmc_types::*;
    use proptest::prelude::*;

    #[test]
    fn test_expired_license_is_valid_free() {
        let evaluated = EvaluatedLicense::expired();
        assert!(evaluated.valid);
        assert!(evaluated.expired);
        assert_eq!(evaluated.tier.as_deref(), Some(FREE_TIER));
        assert!(evaluated.error.is_none());
    }

    #[test]
    fn test_report_serializes_outcome_tag() {
        let report = IntegrityReport::aborted(IntegrityOutcome::ManifestMissing, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["kind"], "manifest_missing");
    }

    proptest! {
        #[test]
        fn plain_dates_parse_to_midnight(days in -20_000i64..20_000) {
            let date = (Utc::now() + Duration::days(days)).date_naive();
            let parsed = parse_end_date(&date.format("%Y-%m-%d").to_string()).unwrap();
            prop_assert_eq!(parsed.date_naive(), date);
            prop_assert_eq!(parsed.time(), chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        }
    }
}
