use std::fmt;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ImportError;

pub const DEFAULT_BASE_URL: &str = "https://scohibllvlqujmvtuamv.supabase.co";
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const TEMPERATURE_TABLE: &str = "temperature_entries";
pub const PERIOD_TABLE: &str = "period_entries";

/// Remote endpoint and credential. Kept apart from the spreadsheet settings so
/// `preview` can run without a key.
pub struct ApiConfig {
    pub base_url: String,
    service_key: SecretString,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, service_key: SecretString) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }

    /// Reads `SUPABASE_SERVICE_KEY` and the optional `SUPABASE_URL` override.
    pub fn from_env() -> Result<Self, ImportError> {
        let key = std::env::var("SUPABASE_SERVICE_KEY").unwrap_or_default();
        let base_url =
            std::env::var("SUPABASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::from_parts(&base_url, &key)
    }

    fn from_parts(base_url: &str, key: &str) -> Result<Self, ImportError> {
        if key.trim().is_empty() {
            return Err(ImportError::MissingCredential);
        }
        if base_url.trim().is_empty() {
            return Err(ImportError::Config("base URL must not be empty".to_string()));
        }
        Ok(Self::new(base_url.trim(), SecretString::from(key.trim().to_string())))
    }

    pub fn service_key(&self) -> &str {
        self.service_key.expose_secret()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"[redacted]")
            .finish()
    }
}

/// Settings for one import run.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub user_email: String,
    pub spreadsheet: PathBuf,
    pub sheet: Option<String>,
    pub batch_size: usize,
    pub temperature_table: String,
    pub period_table: String,
}

impl ImportConfig {
    pub fn new(user_email: impl Into<String>, spreadsheet: impl Into<PathBuf>) -> Self {
        Self {
            user_email: user_email.into(),
            spreadsheet: spreadsheet.into(),
            sheet: None,
            batch_size: DEFAULT_BATCH_SIZE,
            temperature_table: TEMPERATURE_TABLE.to_string(),
            period_table: PERIOD_TABLE.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ImportError> {
        if self.user_email.trim().is_empty() {
            return Err(ImportError::EmptyEmail);
        }
        if self.batch_size == 0 {
            return Err(ImportError::Config("batch size must be at least 1".to_string()));
        }
        if self.temperature_table.trim().is_empty() || self.period_table.trim().is_empty() {
            return Err(ImportError::Config("table names must not be empty".to_string()));
        }
        Ok(())
    }
}
