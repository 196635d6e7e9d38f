//! Runtime configuration read from environment variables.
//!
//! A `.env` file in the working directory is loaded by `main` via dotenvy
//! before [`Config::load`] runs, so either source works.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::utils::get_database_path;

/// Path of the AI edge function relative to the project URL.
pub const AI_FUNCTION_PATH: &str = "/functions/v1/ai-process";

/// Default timeout for a single AI request.
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(60);

/// Central configuration for the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Full URL of the AI function, or `None` when no backend is configured.
    pub ai_endpoint: Option<String>,
    /// Bearer token sent with every AI request (may be empty).
    pub ai_api_key: String,
    /// Per-request timeout for AI calls.
    pub ai_timeout: Duration,
    /// SQLite database file.
    pub db_path: PathBuf,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no database path is configured and the platform
    /// data directory cannot be determined.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// `SECONDBRAIN_AI_URL` wins over `SUPABASE_URL` + [`AI_FUNCTION_PATH`];
    /// `SECONDBRAIN_AI_KEY` wins over `SUPABASE_PUBLISHABLE_KEY`, which wins
    /// over `SUPABASE_ANON_KEY`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ai_endpoint = get("SECONDBRAIN_AI_URL").or_else(|| {
            get("SUPABASE_URL")
                .map(|base| format!("{}{}", base.trim_end_matches('/'), AI_FUNCTION_PATH))
        });

        let ai_api_key = get("SECONDBRAIN_AI_KEY")
            .or_else(|| get("SUPABASE_PUBLISHABLE_KEY"))
            .or_else(|| get("SUPABASE_ANON_KEY"))
            .unwrap_or_default();

        let ai_timeout = get("SECONDBRAIN_AI_TIMEOUT_SECS")
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            // A zero timeout would fail every request immediately
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_AI_TIMEOUT);

        let db_path = match get("SECONDBRAIN_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => get_database_path()?,
        };

        Ok(Self {
            ai_endpoint,
            ai_api_key,
            ai_timeout,
            db_path,
        })
    }

    /// Returns `true` when an AI endpoint is available.
    pub fn ai_configured(&self) -> bool {
        self.ai_endpoint.is_some()
    }
}
