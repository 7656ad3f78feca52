use std::env;

use reqwest::Url;

use crate::error::{GatewayError, Result};
use crate::model::{Credential, SamplingParams};
use crate::session::{default_system_prompt, SessionConfig};

pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub deployment_name: String,
    pub credential: Credential,
    pub api_version: Option<String>,
    pub system_prompt: String,
    pub sampling: SamplingParams,
    pub max_context_messages: Option<usize>,
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint = get("AZURE_OPENAI_ENDPOINT").ok_or_else(|| {
            GatewayError::Configuration("AZURE_OPENAI_ENDPOINT is not set".to_string())
        })?;
        validate_endpoint(&endpoint)?;

        let credential = match (lookup("AZURE_OPENAI_KEY"), lookup("AZURE_OPENAI_AD_TOKEN")) {
            (Some(key), _) if key.trim().is_empty() => {
                return Err(GatewayError::Configuration(
                    "AZURE_OPENAI_KEY is set but empty".to_string(),
                ))
            }
            (Some(key), _) => Credential::ApiKey(key.trim().to_string()),
            (None, Some(token)) if token.trim().is_empty() => {
                return Err(GatewayError::Configuration(
                    "AZURE_OPENAI_AD_TOKEN is set but empty".to_string(),
                ))
            }
            (None, Some(token)) => Credential::BearerToken(token.trim().to_string()),
            (None, None) => Credential::None,
        };

        let defaults = SamplingParams::default();
        let temperature = parse_or(&get, "TEMPERATURE", defaults.temperature)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(GatewayError::Configuration(format!(
                "TEMPERATURE must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }
        let max_tokens: u32 = parse_or(&get, "MAX_TOKENS", defaults.max_tokens)?;
        if max_tokens == 0 {
            return Err(GatewayError::Configuration(
                "MAX_TOKENS must be greater than zero".to_string(),
            ));
        }

        let max_context_messages = match get("MAX_CONTEXT_MESSAGES") {
            Some(raw) => Some(parse_value::<usize>("MAX_CONTEXT_MESSAGES", &raw)?),
            None => None,
        };
        if max_context_messages == Some(0) {
            return Err(GatewayError::Configuration(
                "MAX_CONTEXT_MESSAGES must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            endpoint,
            deployment_name: get("DEPLOYMENT_NAME").unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            credential,
            api_version: get("AZURE_OPENAI_API_VERSION"),
            system_prompt: get("SYSTEM_PROMPT").unwrap_or_else(default_system_prompt),
            sampling: SamplingParams {
                temperature,
                max_tokens,
            },
            max_context_messages,
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&get, "PORT", 8080)?,
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            system_prompt: self.system_prompt.clone(),
            model_id: self.deployment_name.clone(),
            endpoint: self.endpoint.clone(),
            sampling: self.sampling,
            max_context_messages: self.max_context_messages,
        }
    }
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).map_err(|e| {
        GatewayError::Configuration(format!("invalid AZURE_OPENAI_ENDPOINT '{}': {}", endpoint, e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(GatewayError::Configuration(format!(
            "AZURE_OPENAI_ENDPOINT must use http or https, got '{}'",
            other
        ))),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| GatewayError::Configuration(format!("invalid {} '{}': {}", key, raw, e)))
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com/")]).unwrap();
        assert_eq!(settings.deployment_name, "gpt-4o");
        assert_eq!(settings.credential, Credential::None);
        assert_eq!(settings.sampling, SamplingParams::default());
        assert_eq!(settings.max_context_messages, None);
        assert_eq!(settings.port, 8080);
        assert!(settings.system_prompt.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_missing_endpoint_is_fatal() {
        let err = settings(&[("DEPLOYMENT_NAME", "gpt-4o-mini")]).unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));

        let err = settings(&[("AZURE_OPENAI_ENDPOINT", "   ")]).unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        assert!(settings(&[("AZURE_OPENAI_ENDPOINT", "not a url")]).is_err());
        assert!(settings(&[("AZURE_OPENAI_ENDPOINT", "ftp://example.com")]).is_err());
    }

    #[test]
    fn test_credentials() {
        let key = settings(&[
            ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com"),
            ("AZURE_OPENAI_KEY", "abc"),
            ("AZURE_OPENAI_AD_TOKEN", "tok"),
        ])
        .unwrap();
        assert_eq!(key.credential, Credential::ApiKey("abc".into()));

        let token = settings(&[
            ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com"),
            ("AZURE_OPENAI_AD_TOKEN", "tok"),
        ])
        .unwrap();
        assert_eq!(token.credential, Credential::BearerToken("tok".into()));

        assert!(settings(&[
            ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com"),
            ("AZURE_OPENAI_KEY", ""),
        ])
        .is_err());
    }

    #[test]
    fn test_overrides_and_validation() {
        let settings_ok = settings(&[
            ("AZURE_OPENAI_ENDPOINT", "http://localhost:8081"),
            ("DEPLOYMENT_NAME", "gpt-4o-mini"),
            ("TEMPERATURE", "0.2"),
            ("MAX_TOKENS", "256"),
            ("MAX_CONTEXT_MESSAGES", "10"),
            ("SYSTEM_PROMPT", "Be brief."),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(settings_ok.deployment_name, "gpt-4o-mini");
        assert_eq!(settings_ok.sampling.max_tokens, 256);
        assert_eq!(settings_ok.max_context_messages, Some(10));
        assert_eq!(settings_ok.port, 9000);

        let session = settings_ok.session_config();
        assert_eq!(session.system_prompt, "Be brief.");
        assert_eq!(session.model_id, "gpt-4o-mini");

        let endpoint = ("AZURE_OPENAI_ENDPOINT", "http://localhost:8081");
        assert!(settings(&[endpoint, ("TEMPERATURE", "hot")]).is_err());
        assert!(settings(&[endpoint, ("TEMPERATURE", "3.5")]).is_err());
        assert!(settings(&[endpoint, ("MAX_TOKENS", "0")]).is_err());
        assert!(settings(&[endpoint, ("PORT", "99999")]).is_err());
    }

    #[test]
    fn test_zero_context_window_is_rejected() {
        let endpoint = ("AZURE_OPENAI_ENDPOINT", "http://localhost:8081");
        let err = settings(&[endpoint, ("MAX_CONTEXT_MESSAGES", "0")]).unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));

        let one = settings(&[endpoint, ("MAX_CONTEXT_MESSAGES", "1")]).unwrap();
        assert_eq!(one.max_context_messages, Some(1));
    }
}
