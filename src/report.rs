//! Display model for the interactive variant: the model's recommendation laid
//! out next to the locally computed formula, step by step.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

use crate::coverage::{parse_percentage, safe_number, CoverageEstimate, DEFAULT_REAL_DISCOUNT_RATE};
use crate::models::{ClientProfile, CoverageResult};

pub const DISCLAIMER: &str = "Prototype only — not licensed financial advice. Verify with a professional.";

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "CAD" => Some("C$"),
        "AUD" => Some("A$"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// Formats a whole-unit amount with thousands separators and the currency's
/// symbol, or with the code as a suffix when no symbol is known.
pub fn format_currency(amount: f64, currency_code: &str) -> String {
    let code = match currency_code.trim() {
        "" => "USD".to_string(),
        c => c.to_uppercase(),
    };
    let formatted = group_thousands(amount);
    match currency_symbol(&code) {
        Some(symbol) => format!("{}{}", symbol, formatted),
        None => format!("{} {}", formatted, code),
    }
}

fn group_thousands(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub value: String,
}

impl ReportRow {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLine {
    pub rank: usize,
    pub name: String,
    pub summary: String,
    pub link: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportAssumptions {
    pub income_replacement_years: Value,
    pub real_discount_rate: Value,
    pub notes: String,
}

/// Everything the interactive variant shows for one recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub currency: String,
    pub total_coverage: String,
    pub inputs: Vec<ReportRow>,
    pub steps: Vec<ReportRow>,
    pub model_breakdown: Vec<ReportRow>,
    pub methodology: Option<String>,
    pub products: Vec<ProductLine>,
    pub assumptions: ReportAssumptions,
    pub research_notes: Option<String>,
    pub generated: Option<String>,
    pub estimate: CoverageEstimate,
    pub disclaimer: &'static str,
}

impl CoverageReport {
    pub fn build(result: &CoverageResult, profile: &ClientProfile) -> Self {
        let currency = result
            .currency_code()
            .unwrap_or_else(|| profile.currency_or_default())
            .to_string();
        let money = |amount: f64| format_currency(amount, &currency);
        let coverage_amount = result.coverage_amount_f64();

        let real_rate = parse_percentage(
            result.assumption("real_discount_rate"),
            DEFAULT_REAL_DISCOUNT_RATE,
        );
        let estimate = CoverageEstimate::compute(profile, real_rate);

        let inputs = vec![
            ReportRow::new("Annual income", money(estimate.income)),
            ReportRow::new(
                "Income replacement horizon",
                format!("{} years", estimate.years),
            ),
            ReportRow::new("Total debt", money(estimate.debt)),
            ReportRow::new("Liquid assets", money(profile.available_savings)),
            ReportRow::new("Existing life cover", money(profile.existing_life_insurance)),
            ReportRow::new("Real discount rate", format!("{:.2}%", real_rate * 100.0)),
        ];

        let steps = vec![
            ReportRow::new("Annuity factor", format!("{:.3}", estimate.annuity_factor)),
            ReportRow::new(
                "Discounted income replacement",
                money(estimate.discounted_income),
            ),
            ReportRow::new("+ Outstanding debt", money(estimate.debt)),
            ReportRow::new("- Assets & existing cover", money(estimate.assets_offset)),
            ReportRow::new("= Formula estimate", money(estimate.recommended)),
            ReportRow::new("= Model recommendation", money(coverage_amount)),
        ];

        let breakdown_amount = |key: &str| {
            money(
                result
                    .breakdown_field(key)
                    .map(safe_number)
                    .unwrap_or_default(),
            )
        };
        let model_breakdown = vec![
            ReportRow::new(
                "Income replacement value",
                breakdown_amount("income_replacement"),
            ),
            ReportRow::new("Debt obligations", breakdown_amount("debt_obligations")),
            ReportRow::new(
                "Assets & existing cover offset",
                breakdown_amount("assets_offset"),
            ),
        ];

        let methodology = result
            .breakdown_field("methodology")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_owned);

        let products = result
            .recommendations()
            .into_iter()
            .enumerate()
            .map(|(idx, rec)| ProductLine {
                rank: idx + 1,
                name: rec.name.unwrap_or_else(|| "Unnamed Product".to_string()),
                summary: rec
                    .summary
                    .unwrap_or_else(|| "No summary provided.".to_string()),
                link: rec.link,
                source: rec.source,
            })
            .collect();

        let assumptions = ReportAssumptions {
            income_replacement_years: result
                .assumption("income_replacement_years")
                .cloned()
                .unwrap_or_else(|| json!(profile.income_replacement_years)),
            real_discount_rate: result
                .assumption("real_discount_rate")
                .cloned()
                .unwrap_or_else(|| json!("2%")),
            notes: result
                .assumption("additional_notes")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };

        Self {
            total_coverage: money(coverage_amount),
            currency,
            inputs,
            steps,
            model_breakdown,
            methodology,
            products,
            assumptions,
            research_notes: result.research_notes_text().map(str::to_owned),
            generated: result.timestamp_text().map(str::to_owned),
            estimate,
            disclaimer: DISCLAIMER,
        }
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[ReportRow]) -> fmt::Result {
    let width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    for row in rows {
        writeln!(f, "  {:<width$}  {}", row.label, row.value, width = width)?;
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recommended Coverage")?;
        writeln!(f, "  Total Coverage Needed: {}", self.total_coverage)?;
        writeln!(f)?;

        writeln!(f, "Calculation Inputs")?;
        write_rows(f, &self.inputs)?;
        writeln!(f)?;

        writeln!(f, "Step-by-step Coverage Math")?;
        write_rows(f, &self.steps)?;
        writeln!(f)?;

        writeln!(f, "How this number was calculated")?;
        write_rows(f, &self.model_breakdown)?;
        if let Some(methodology) = &self.methodology {
            writeln!(f, "  {}", methodology)?;
        }
        writeln!(f)?;

        if !self.products.is_empty() {
            writeln!(f, "Top Term Life Options")?;
            for product in &self.products {
                writeln!(f, "  {}. {} — {}", product.rank, product.name, product.summary)?;
                if let Some(link) = &product.link {
                    writeln!(f, "     {}", link)?;
                }
                if let Some(source) = &product.source {
                    writeln!(f, "     Source: {}", source)?;
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "Model assumptions")?;
        writeln!(
            f,
            "  Income replacement years: {}",
            display_value(&self.assumptions.income_replacement_years)
        )?;
        writeln!(
            f,
            "  Real discount rate: {}",
            display_value(&self.assumptions.real_discount_rate)
        )?;
        writeln!(f, "  Notes: {}", self.assumptions.notes)?;

        if let Some(notes) = &self.research_notes {
            writeln!(f)?;
            writeln!(f, "{}", notes)?;
        }
        if let Some(generated) = &self.generated {
            writeln!(f, "Generated: {}", generated)?;
        }
        writeln!(f)?;
        write!(f, "{}", self.disclaimer)
    }
}
