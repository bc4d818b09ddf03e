use anyhow::Context;
use clap::{Parser, ValueEnum};

/// NBA schedule browser with on-demand AI outcome predictions
#[derive(Parser, Debug, Clone)]
#[command(name = "courtside", version, about)]
pub struct Config {
    /// Base URL of the schedule/prediction backend
    #[arg(long, env = "COURTSIDE_API_URL", default_value = "http://127.0.0.1:8000")]
    pub api_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Wire shape of the predict endpoint (deployments differ)
    #[arg(long, env = "PREDICT_STYLE", value_enum, default_value = "post")]
    pub predict_style: PredictStyle,

    /// Restrict schedule navigation to today and future dates
    #[arg(long, env = "FUTURE_ONLY", default_value = "false")]
    pub future_only: bool,

    /// Cap on upcoming-feed entries requested from the server
    #[arg(long, env = "FEED_LIMIT")]
    pub feed_limit: Option<u32>,

    /// Request a prediction for this contest id after the initial load
    #[arg(long, env = "PREDICT_CONTEST")]
    pub predict_contest: Option<String>,
}

/// The predict endpoint exists in two deployed shapes; which one a backend
/// speaks is configuration, not core behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PredictStyle {
    /// `POST /predict` with a JSON body
    Post,
    /// `GET /predict/{id}?home=&away=`
    Get,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.api_url).context("api_url is not a valid URL")?;
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        if self.feed_limit == Some(0) {
            anyhow::bail!("feed_limit must be positive when set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            api_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 10,
            predict_style: PredictStyle::Post,
            future_only: false,
            feed_limit: None,
            predict_contest: None,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url_and_zero_timeout() {
        let mut config = base_config();
        config.api_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.feed_limit = Some(0);
        assert!(config.validate().is_err());
    }
}
