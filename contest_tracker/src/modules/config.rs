use anyhow::{Context, Result};
use contest_tracker_libs::{
    ContestBoard, FilePreferenceStore, HttpContestClient, PersistedFilter, PreferenceStore,
};
use std::{env, path::PathBuf, sync::Arc};
use url::Url;

pub const API_URL_ENV: &str = "CONTEST_API_URL";
pub const PREFERENCES_ENV: &str = "CONTEST_TRACKER_PREFERENCES";

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_PREFERENCES: &str = "contest_tracker.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: Url,
    pub preferences: PathBuf,
}

impl Config {
    /// Command line values win over environment variables, which win over defaults.
    pub fn from_env(api_url: Option<String>, preferences: Option<PathBuf>) -> Result<Self> {
        Self::resolve(api_url, preferences, |key| env::var(key).ok())
    }

    fn resolve(
        api_url: Option<String>,
        preferences: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_url = api_url.or_else(|| lookup(API_URL_ENV)).unwrap_or_else(|| {
            tracing::warn!(
                "{} environment variable is not set. Default value `{}` will be used.",
                API_URL_ENV,
                DEFAULT_API_URL
            );
            String::from(DEFAULT_API_URL)
        });
        let api_url = Url::parse(&api_url).with_context(|| {
            let message = format!("`{}` is not a valid contest service url", api_url);
            tracing::error!(message);
            message
        })?;

        let preferences = preferences
            .or_else(|| lookup(PREFERENCES_ENV).map(PathBuf::from))
            .unwrap_or_else(|| {
                tracing::debug!(
                    "{} is not set, preferences are kept in {}",
                    PREFERENCES_ENV,
                    DEFAULT_PREFERENCES
                );
                PathBuf::from(DEFAULT_PREFERENCES)
            });

        Ok(Self {
            api_url,
            preferences,
        })
    }

    pub fn preference_store(&self) -> Arc<dyn PreferenceStore> {
        Arc::new(FilePreferenceStore::new(&self.preferences))
    }

    pub fn filter(&self) -> PersistedFilter {
        PersistedFilter::load(self.preference_store())
    }

    pub fn board(&self) -> Result<ContestBoard<HttpContestClient>> {
        let client = HttpContestClient::new(self.api_url.as_str()).with_context(|| {
            let message = format!("couldn't create contest client for {}", self.api_url);
            tracing::error!(message);
            message
        })?;

        Ok(ContestBoard::new(client, self.filter()))
    }
}
