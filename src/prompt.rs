use crate::errors::AppError;
use crate::models::ProfileSnapshot;

const PROFILE_PLACEHOLDER: &str = "{client_profile_json}";
const LIMIT_PLACEHOLDER: &str = "{recommendation_limit}";

/// Advisor prompt.
///
/// The two "tools" are described to the model but never invoked: the model is
/// asked to simulate their output and to report when it could not search.
pub const ADVISOR_PROMPT: &str = r#"You are a conservative life insurance advisor assistant. You will receive a JSON object named `client_profile` describing an individual's financial situation.

Important: You have access to two backend tools:
1) E2B sandbox - runs deterministic python code securely for calculations.
2) Firecrawl search - can perform up-to-date product search for "term life insurance" for the client's location and return up to {recommendation_limit} recommended products with name, summary, link, source, and recency.

However, you do not actually call HTTP endpoints in this environment. Instead, you MUST:
- Simulate the exact outputs as if you had used E2B and Firecrawl.
- Compute coverage deterministically:
   - Default real discount rate r = 0.02 if not provided.
   - discounted_income = annual_income * ((1 - (1 + r) ** (-income_replacement_years)) / r)
   - recommended_coverage = max(0, discounted_income + total_debt - available_savings - existing_life_insurance)
- Return ONLY a single JSON object (no markdown or commentary) with keys:
  coverage_amount (integer),
  coverage_currency (3-letter code),
  breakdown (income_replacement, debt_obligations, assets_offset, methodology),
  assumptions (income_replacement_years, real_discount_rate, additional_notes),
  recommendations (list up to {recommendation_limit} items: name, summary, link, source),
  research_notes (short disclaimer),
  timestamp (ISO8601 UTC).

Client profile JSON:
{client_profile_json}

Important:
- Treat missing numeric values as 0.
- If you could not perform live Firecrawl searches, set recommendations to [] and state that in research_notes.
- Output must be strict JSON only.
"#;

/// Renders the advisor prompt for one request.
pub fn build_prompt(
    snapshot: &ProfileSnapshot<'_>,
    recommendation_limit: usize,
) -> Result<String, AppError> {
    let profile_json = serde_json::to_string(snapshot)?;
    Ok(ADVISOR_PROMPT
        .replace(LIMIT_PLACEHOLDER, &recommendation_limit.to_string())
        .replace(PROFILE_PLACEHOLDER, &profile_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientProfile;
    use chrono::{TimeZone, Utc};

    fn profile() -> ClientProfile {
        ClientProfile {
            age: 35,
            annual_income: 85_000.0,
            dependents: 2,
            location: "United States".to_string(),
            total_debt: 200_000.0,
            available_savings: 50_000.0,
            existing_life_insurance: 100_000.0,
            income_replacement_years: 10,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn prompt_embeds_profile_and_timestamp() {
        let profile = profile();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let prompt = build_prompt(&ProfileSnapshot::at(&profile, at), 5).unwrap();

        assert!(prompt.contains("\"annual_income\":85000.0"));
        assert!(prompt.contains("\"location\":\"United States\""));
        assert!(prompt.contains("\"request_timestamp\":\"2025-06-01T08:30:00.000000+00:00\""));
        assert!(!prompt.contains(PROFILE_PLACEHOLDER));
    }

    #[test]
    fn prompt_uses_recommendation_limit() {
        let profile = profile();
        let prompt = build_prompt(&ProfileSnapshot::new(&profile), 3).unwrap();

        assert!(prompt.contains("list up to 3 items"));
        assert!(prompt.contains("return up to 3 recommended products"));
        assert!(!prompt.contains(LIMIT_PLACEHOLDER));
    }

    #[test]
    fn prompt_keeps_fallback_instruction() {
        let profile = profile();
        let prompt = build_prompt(&ProfileSnapshot::new(&profile), 5).unwrap();
        assert!(prompt.contains("set recommendations to [] and state that in research_notes"));
        assert!(prompt.contains("Output must be strict JSON only."));
    }
}
