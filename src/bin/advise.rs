//! Interactive coverage advisor for the terminal.
//!
//! Asks Gemini for a recommendation and prints it next to the locally computed
//! formula. `--offline` skips the model and prints the local estimate only.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use coverage_advisor::advisor::AdvisorService;
use coverage_advisor::config::Config;
use coverage_advisor::coverage::{CoverageEstimate, DEFAULT_REAL_DISCOUNT_RATE};
use coverage_advisor::gemini_client::GeminiClient;
use coverage_advisor::models::ClientProfile;
use coverage_advisor::report::CoverageReport;

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "UPPER")]
enum Currency {
    Usd,
    Cad,
    Eur,
    Gbp,
    Aud,
    Inr,
}

impl Currency {
    fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cad => "CAD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aud => "AUD",
            Currency::Inr => "INR",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "advise", about = "Life insurance coverage advisor")]
struct Args {
    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(i32).range(18..=85))]
    age: i32,

    #[arg(long, default_value_t = 85_000.0, value_parser = non_negative)]
    annual_income: f64,

    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(i32).range(0..=10))]
    dependents: i32,

    /// Country / state
    #[arg(long, default_value = "United States")]
    location: String,

    /// Total outstanding debt, including mortgage
    #[arg(long, default_value_t = 200_000.0, value_parser = non_negative)]
    total_debt: f64,

    /// Savings and investments available to dependents
    #[arg(long, default_value_t = 50_000.0, value_parser = non_negative)]
    savings: f64,

    #[arg(long, default_value_t = 100_000.0, value_parser = non_negative)]
    existing_cover: f64,

    /// Income replacement horizon in years (5, 10 or 15)
    #[arg(long, default_value_t = 10, value_parser = horizon)]
    years: i32,

    #[arg(long, value_enum, default_value_t = Currency::Usd)]
    currency: Currency,

    /// Skip the model and print the local formula only
    #[arg(long)]
    offline: bool,

    /// Print the normalized result as JSON instead of the report
    #[arg(long)]
    json: bool,
}

fn non_negative(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
    if value < 0.0 {
        return Err("must be zero or greater".to_string());
    }
    Ok(value)
}

fn horizon(raw: &str) -> Result<i32, String> {
    match raw.parse::<i32>() {
        Ok(years @ (5 | 10 | 15)) => Ok(years),
        _ => Err("horizon must be 5, 10 or 15".to_string()),
    }
}

impl Args {
    fn profile(&self) -> ClientProfile {
        ClientProfile {
            age: self.age,
            annual_income: self.annual_income,
            dependents: self.dependents,
            location: self.location.clone(),
            total_debt: self.total_debt,
            available_savings: self.savings,
            existing_life_insurance: self.existing_cover,
            income_replacement_years: self.years,
            currency: self.currency.code().to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coverage_advisor=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let profile = args.profile();

    let result = if args.offline {
        CoverageEstimate::compute(&profile, DEFAULT_REAL_DISCOUNT_RATE).to_result(&profile)
    } else {
        let config = Config::from_env()?;
        let gemini = GeminiClient::from_config(&config)?;
        let advisor = AdvisorService::new(Arc::new(gemini), &config);
        eprintln!(
            "Asking {} to simulate E2B & Firecrawl and return final JSON...",
            advisor.model_name()
        );
        advisor.advise(&profile).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", CoverageReport::build(&result, &profile));
    }

    Ok(())
}
