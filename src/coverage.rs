//! Local coverage arithmetic.
//!
//! This mirrors the formula the prompt asks the model to apply, so the model's
//! figure can be shown next to an independently computed one.

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;

use crate::models::{ClientProfile, CoverageResult};
use crate::normalizer;

pub const DEFAULT_REAL_DISCOUNT_RATE: f64 = 0.02;

static CURRENCY_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"C\$|A\$|[,$€£₹]").expect("valid currency regex"));

/// Present value multiplier for a level income over `years` at real rate `rate`.
///
/// A non-positive rate degenerates to plain multiplication by the horizon.
pub fn annuity_factor(years: u32, rate: f64) -> f64 {
    if rate <= 0.0 {
        return f64::from(years);
    }
    if years == 0 {
        return 0.0;
    }
    (1.0 - (1.0 + rate).powf(-f64::from(years))) / rate
}

/// Coerces a loosely typed JSON value to a number, falling back to 0.
///
/// Strings may carry thousands separators and currency symbols ("$1,200").
pub fn safe_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => {
            if let Ok(n) = s.trim().parse::<f64>() {
                return n;
            }
            CURRENCY_NOISE
                .replace_all(s, "")
                .trim()
                .parse()
                .unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// Reads a discount rate that may be given as a fraction (0.02), a percentage
/// (2) or a string ("2%"). Values below 1 are taken as fractions.
pub fn parse_percentage(value: Option<&Value>, fallback: f64) -> f64 {
    let numeric = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace('%', "").trim().parse::<f64>().ok(),
        _ => None,
    };
    match numeric {
        Some(n) if n < 1.0 => n,
        Some(n) => n / 100.0,
        None => fallback,
    }
}

/// Step-by-step breakdown of the coverage formula for one profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageEstimate {
    pub income: f64,
    pub years: u32,
    pub real_rate: f64,
    pub annuity_factor: f64,
    pub discounted_income: f64,
    pub debt: f64,
    pub savings: f64,
    pub existing_cover: f64,
    /// Savings plus existing cover, as a negative adjustment.
    pub assets_offset: f64,
    /// Coverage before the zero floor; may be negative.
    pub raw_coverage: f64,
    pub recommended: f64,
}

impl CoverageEstimate {
    pub fn compute(profile: &ClientProfile, real_rate: f64) -> Self {
        let income = profile.annual_income;
        let years = u32::try_from(profile.income_replacement_years.max(0)).unwrap_or(0);
        let factor = annuity_factor(years, real_rate);
        let discounted_income = income * factor;
        let offset = profile.available_savings + profile.existing_life_insurance;
        let raw_coverage = discounted_income + profile.total_debt - offset;

        Self {
            income,
            years,
            real_rate,
            annuity_factor: factor,
            discounted_income,
            debt: profile.total_debt,
            savings: profile.available_savings,
            existing_cover: profile.existing_life_insurance,
            assets_offset: -offset,
            raw_coverage,
            recommended: raw_coverage.max(0.0),
        }
    }

    /// Recommended coverage rounded to whole currency units.
    pub fn recommended_amount(&self) -> i64 {
        self.recommended.round() as i64
    }

    /// Expresses the local computation as a coverage result, for offline use.
    pub fn to_result(&self, profile: &ClientProfile) -> CoverageResult {
        let mut map = Map::new();
        map.insert("coverage_amount".into(), json!(self.recommended_amount()));
        map.insert(
            "breakdown".into(),
            json!({
                "income_replacement": self.discounted_income.round(),
                "debt_obligations": self.debt.round(),
                "assets_offset": self.assets_offset.round(),
                "methodology": format!(
                    "Present value of {} years of income at a {:.2}% real discount rate, plus debt, minus savings and existing cover.",
                    self.years,
                    self.real_rate * 100.0
                ),
            }),
        );
        map.insert(
            "assumptions".into(),
            json!({
                "income_replacement_years": self.years,
                "real_discount_rate": self.real_rate,
                "additional_notes": "Computed locally from the submitted profile.",
            }),
        );
        map.insert(
            "research_notes".into(),
            json!("Offline estimate: no live product search was performed."),
        );
        normalizer::normalize(map, profile)
    }
}
