use std::fmt;
use std::str::FromStr;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Upper bound on recommended products the prompt may ask for.
pub const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub google_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    pub max_output_tokens: u32,
    pub recommendation_limit: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("google_api_key", &"[REDACTED]")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_timeout_secs", &self.gemini_timeout_secs)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("recommendation_limit", &self.recommendation_limit)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment (and `.env`, if present).
    ///
    /// A missing `GOOGLE_API_KEY` is a startup error: there is no fallback credential.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|name| std::env::var(name).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Gemini model: {}", config.gemini_model);
        tracing::debug!("Gemini base URL: {}", config.gemini_base_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let google_api_key = var("GOOGLE_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("GOOGLE_API_KEY environment variable required"))?;

        let gemini_base_url = var("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let parsed = url::Url::parse(&gemini_base_url)
            .map_err(|e| anyhow::anyhow!("GEMINI_BASE_URL is not a valid URL: {}", e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("GEMINI_BASE_URL must start with http:// or https://");
        }

        let recommendation_limit: usize =
            parse_or(var("RECOMMENDATION_LIMIT"), "RECOMMENDATION_LIMIT", MAX_RECOMMENDATIONS)?;
        if recommendation_limit > MAX_RECOMMENDATIONS {
            anyhow::bail!(
                "RECOMMENDATION_LIMIT must be between 0 and {}",
                MAX_RECOMMENDATIONS
            );
        }

        let max_output_tokens: u32 = parse_or(var("MAX_OUTPUT_TOKENS"), "MAX_OUTPUT_TOKENS", 1024)?;
        if max_output_tokens == 0 {
            anyhow::bail!("MAX_OUTPUT_TOKENS must be greater than zero");
        }

        Ok(Self {
            port: parse_or(var("PORT"), "PORT", 8000)?,
            google_api_key,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url,
            gemini_timeout_secs: parse_or(var("GEMINI_TIMEOUT_SECS"), "GEMINI_TIMEOUT_SECS", 60)?,
            max_output_tokens,
            recommendation_limit,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, name: &str, default: T) -> anyhow::Result<T> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", name, value)),
        None => Ok(default),
    }
}
