//! Default-filling for model output.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::models::{utc_timestamp_at, ClientProfile, CoverageResult};

/// Fills every absent result key with its default and returns the full result.
///
/// Present keys are never touched, whatever their value: an explicit `0`,
/// `null` or a negative amount is passed through as the model sent it.
pub fn normalize(parsed: Map<String, Value>, profile: &ClientProfile) -> CoverageResult {
    normalize_at(parsed, profile, Utc::now())
}

pub fn normalize_at(
    mut parsed: Map<String, Value>,
    profile: &ClientProfile,
    now: DateTime<Utc>,
) -> CoverageResult {
    let currency = profile.currency_or_default();

    parsed
        .entry("coverage_currency")
        .or_insert_with(|| json!(currency));
    parsed.entry("coverage_amount").or_insert_with(|| json!(0));
    parsed
        .entry("breakdown")
        .or_insert_with(|| Value::Object(Map::new()));
    parsed
        .entry("assumptions")
        .or_insert_with(|| Value::Object(Map::new()));
    parsed
        .entry("recommendations")
        .or_insert_with(|| Value::Array(Vec::new()));
    parsed
        .entry("research_notes")
        .or_insert_with(|| json!(""));
    parsed
        .entry("timestamp")
        .or_insert_with(|| json!(utc_timestamp_at(now)));

    CoverageResult::from_complete(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile(currency: &str) -> ClientProfile {
        ClientProfile {
            age: 40,
            annual_income: 60_000.0,
            dependents: 1,
            location: "Ontario".to_string(),
            total_debt: 0.0,
            available_savings: 0.0,
            existing_life_insurance: 0.0,
            income_replacement_years: 5,
            currency: currency.to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn empty_object_gets_every_default() {
        let result = normalize_at(Map::new(), &profile("CAD"), now());

        assert_eq!(result.coverage_currency, json!("CAD"));
        assert_eq!(result.coverage_amount, json!(0));
        assert_eq!(result.breakdown, json!({}));
        assert_eq!(result.assumptions, json!({}));
        assert_eq!(result.recommendations, json!([]));
        assert_eq!(result.research_notes, json!(""));
        assert_eq!(result.timestamp, json!("2025-01-02T03:04:05.000000+00:00"));
        assert!(result.extra.is_empty());
    }

    #[test]
    fn blank_profile_currency_falls_back_to_usd() {
        let result = normalize_at(Map::new(), &profile(""), now());
        assert_eq!(result.coverage_currency, json!("USD"));
    }

    #[test]
    fn present_values_are_never_overridden() {
        let parsed = json!({
            "coverage_amount": 0,
            "coverage_currency": "EUR",
            "breakdown": null,
            "research_notes": "",
            "recommendations": [{"name": "A"}],
            "timestamp": "yesterday"
        });
        let result = normalize_at(
            parsed.as_object().unwrap().clone(),
            &profile("CAD"),
            now(),
        );

        assert_eq!(result.coverage_amount, json!(0));
        assert_eq!(result.coverage_currency, json!("EUR"));
        assert_eq!(result.breakdown, Value::Null);
        assert_eq!(result.recommendations, json!([{"name": "A"}]));
        assert_eq!(result.timestamp, json!("yesterday"));
        assert_eq!(result.assumptions, json!({}));
    }

    #[test]
    fn negative_amount_passes_through() {
        let parsed = json!({"coverage_amount": -1500});
        let result = normalize_at(parsed.as_object().unwrap().clone(), &profile("USD"), now());
        assert_eq!(result.coverage_amount, json!(-1500));
    }

    #[test]
    fn normalizing_a_complete_result_is_idempotent() {
        let first = normalize_at(
            json!({"coverage_amount": 813520, "note": "kept"})
                .as_object()
                .unwrap()
                .clone(),
            &profile("USD"),
            now(),
        );
        let later = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let second = normalize_at(first.clone().into_map(), &profile("GBP"), later);

        assert_eq!(first, second);
    }
}
