use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Returns the current instant as ISO-8601 with an explicit `+00:00` offset.
pub fn utc_timestamp() -> String {
    utc_timestamp_at(Utc::now())
}

pub fn utc_timestamp_at(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, false)
}

// ============ Request Models ============

/// Financial profile submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub age: i32,
    pub annual_income: f64,
    pub dependents: i32,
    pub location: String,
    pub total_debt: f64,
    pub available_savings: f64,
    pub existing_life_insurance: f64,
    pub income_replacement_years: i32,
    /// ISO 4217 code, defaults to USD.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl ClientProfile {
    /// Currency to report in: the profile's own code, or USD when blank.
    pub fn currency_or_default(&self) -> &str {
        let code = self.currency.trim();
        if code.is_empty() {
            DEFAULT_CURRENCY
        } else {
            code
        }
    }
}

/// The profile as embedded in the prompt, stamped with the request time.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSnapshot<'a> {
    #[serde(flatten)]
    pub profile: &'a ClientProfile,
    pub request_timestamp: String,
}

impl<'a> ProfileSnapshot<'a> {
    pub fn new(profile: &'a ClientProfile) -> Self {
        Self::at(profile, Utc::now())
    }

    pub fn at(profile: &'a ClientProfile, instant: DateTime<Utc>) -> Self {
        Self {
            profile,
            request_timestamp: utc_timestamp_at(instant),
        }
    }
}

// ============ Response Models ============

/// Normalized coverage recommendation.
///
/// Values are kept exactly as the model returned them; the typed accessors
/// below coerce leniently for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub coverage_amount: Value,
    pub coverage_currency: Value,
    pub breakdown: Value,
    pub assumptions: Value,
    pub recommendations: Value,
    pub research_notes: Value,
    pub timestamp: Value,
    /// Any additional keys the model returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CoverageResult {
    /// Builds a result from an object that already carries every required key.
    ///
    /// Keys that are somehow still missing become `null`.
    pub(crate) fn from_complete(mut map: Map<String, Value>) -> Self {
        Self {
            coverage_amount: take(&mut map, "coverage_amount"),
            coverage_currency: take(&mut map, "coverage_currency"),
            breakdown: take(&mut map, "breakdown"),
            assumptions: take(&mut map, "assumptions"),
            recommendations: take(&mut map, "recommendations"),
            research_notes: take(&mut map, "research_notes"),
            timestamp: take(&mut map, "timestamp"),
            extra: map,
        }
    }

    /// Flattens the result back into a single JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = self.extra;
        map.insert("coverage_amount".into(), self.coverage_amount);
        map.insert("coverage_currency".into(), self.coverage_currency);
        map.insert("breakdown".into(), self.breakdown);
        map.insert("assumptions".into(), self.assumptions);
        map.insert("recommendations".into(), self.recommendations);
        map.insert("research_notes".into(), self.research_notes);
        map.insert("timestamp".into(), self.timestamp);
        map
    }

    pub fn coverage_amount_f64(&self) -> f64 {
        crate::coverage::safe_number(&self.coverage_amount)
    }

    pub fn currency_code(&self) -> Option<&str> {
        self.coverage_currency
            .as_str()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn breakdown_field(&self, key: &str) -> Option<&Value> {
        self.breakdown.get(key)
    }

    pub fn assumption(&self, key: &str) -> Option<&Value> {
        self.assumptions.get(key)
    }

    pub fn research_notes_text(&self) -> Option<&str> {
        self.research_notes.as_str().filter(|s| !s.is_empty())
    }

    pub fn timestamp_text(&self) -> Option<&str> {
        self.timestamp.as_str().filter(|s| !s.is_empty())
    }

    /// Product suggestions, skipping entries that are not JSON objects.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.recommendations
            .as_array()
            .map(|items| items.iter().filter_map(Recommendation::from_value).collect())
            .unwrap_or_default()
    }
}

fn take(map: &mut Map<String, Value>, key: &str) -> Value {
    map.remove(key).unwrap_or(Value::Null)
}

/// A term-life product suggested by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub source: Option<String>,
}

impl Recommendation {
    fn from_value(value: &Value) -> Option<Self> {
        let item = value.as_object()?;
        let text = |key: &str| {
            item.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Some(Self {
            name: text("name"),
            summary: text("summary"),
            link: text("link"),
            source: text("source"),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn profile_json() -> Value {
        json!({
            "age": 35,
            "annual_income": 85000.0,
            "dependents": 2,
            "location": "United States",
            "total_debt": 200000.0,
            "available_savings": 50000.0,
            "existing_life_insurance": 100000.0,
            "income_replacement_years": 10
        })
    }

    #[test]
    fn profile_currency_defaults_to_usd() {
        let profile: ClientProfile = serde_json::from_value(profile_json()).unwrap();
        assert_eq!(profile.currency, "USD");
    }

    #[test]
    fn profile_rejects_wrong_types() {
        let mut body = profile_json();
        body["age"] = json!("thirty five");
        assert!(serde_json::from_value::<ClientProfile>(body).is_err());

        let mut body = profile_json();
        body.as_object_mut().unwrap().remove("annual_income");
        assert!(serde_json::from_value::<ClientProfile>(body).is_err());
    }

    #[test]
    fn snapshot_flattens_profile_and_adds_timestamp() {
        let profile: ClientProfile = serde_json::from_value(profile_json()).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let value = serde_json::to_value(ProfileSnapshot::at(&profile, at)).unwrap();

        assert_eq!(value["age"], 35);
        assert_eq!(value["currency"], "USD");
        assert_eq!(value["request_timestamp"], "2025-03-01T12:00:00.000000+00:00");
    }

    #[test]
    fn result_map_round_trip_keeps_extra_keys() {
        let mut map = Map::new();
        map.insert("coverage_amount".into(), json!(1000));
        map.insert("model_version".into(), json!("x"));
        let result = CoverageResult::from_complete(map);

        assert_eq!(result.extra.get("model_version"), Some(&json!("x")));
        assert_eq!(result.breakdown, Value::Null);

        let back = result.into_map();
        assert_eq!(back.get("coverage_amount"), Some(&json!(1000)));
        assert_eq!(back.get("model_version"), Some(&json!("x")));
    }

    #[test]
    fn recommendations_are_read_leniently() {
        let mut map = Map::new();
        map.insert(
            "recommendations".into(),
            json!([
                {"name": "Term 20", "summary": "Level premium", "link": "https://x.test"},
                "not an object",
                {"name": "  ", "source": "insurer site"}
            ]),
        );
        let result = CoverageResult::from_complete(map);
        let recs = result.recommendations();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].name.as_deref(), Some("Term 20"));
        assert_eq!(recs[0].source, None);
        assert_eq!(recs[1].name, None);
        assert_eq!(recs[1].source.as_deref(), Some("insurer site"));
    }
}
