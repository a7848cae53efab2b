use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PREFERENCES_PATH: &str = "lingo-preferences.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub translator_token: Option<String>,
    pub summarizer_token: Option<String>,
    pub language_token: Option<String>,
    pub openai_org_id: Option<String>,
    pub openai_model: String,
    pub api_base: String,
    /// `None` disables the per-operation timeout.
    pub operation_timeout: Option<Duration>,
    pub preferences_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            translator_token: None,
            summarizer_token: None,
            language_token: None,
            openai_org_id: None,
            openai_model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            operation_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be exercised
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let shared_key = non_empty("OPENAI_API_KEY");

        let operation_timeout = match non_empty("LINGO_OPERATION_TIMEOUT_SECS") {
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|e| format!("LINGO_OPERATION_TIMEOUT_SECS: {e}"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
        };

        Ok(Self {
            translator_token: non_empty("LINGO_TRANSLATOR_TOKEN").or_else(|| shared_key.clone()),
            summarizer_token: non_empty("LINGO_SUMMARIZER_TOKEN").or_else(|| shared_key.clone()),
            language_token: non_empty("LINGO_LANGUAGE_TOKEN").or(shared_key),
            openai_org_id: non_empty("OPENAI_ORG_ID"),
            openai_model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: non_empty("LINGO_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            operation_timeout,
            preferences_path: non_empty("LINGO_PREFERENCES_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_PREFERENCES_PATH), PathBuf::from),
        })
    }
}
