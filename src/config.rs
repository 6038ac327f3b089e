//! Service configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `HARBOR_MODEL_DIR` | `models` |
//! | `HARBOR_BIND_ADDR` | `0.0.0.0:8000` |
//! | `HARBOR_CORS_ORIGINS` | the three local dev front-ends; `*` for any |
//! | `HARBOR_UNKNOWN_CATEGORY_POLICY` | `passthrough` (or `reject`) |
//! | `HARBOR_REQUIRE_MANIFEST` | `false` |
//! | `HARBOR_LOG_MODE` | `stdout` (or `file`) |
//! | `HARBOR_LOG_FILE` | `harbor.log` |
//!
//! Log verbosity is controlled separately through `RUST_LOG`.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::adapters::LoadOptions;
use crate::domain::UnknownCategoryPolicy;
use crate::HarborError;

const DEFAULT_MODEL_DIR: &str = "models";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:5000",
];
const DEFAULT_LOG_FILE: &str = "harbor.log";

/// Allowed browser origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Stdout,
    File,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub model_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub cors_origins: CorsOrigins,
    pub unknown_category_policy: UnknownCategoryPolicy,
    pub require_manifest: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

fn parse_bool(name: &str, value: &str) -> Result<bool, HarborError> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Ok(true),
        "0" | "false" | "FALSE" | "no" | "NO" | "" => Ok(false),
        other => Err(HarborError::Config(format!(
            "{name} must be a boolean, got {other:?}"
        ))),
    }
}

fn parse_origins(value: &str) -> Result<CorsOrigins, HarborError> {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        return Ok(CorsOrigins::Any);
    }
    if origins.is_empty() {
        return Err(HarborError::Config(
            "HARBOR_CORS_ORIGINS must list at least one origin".to_string(),
        ));
    }
    if let Some(bad) = origins
        .iter()
        .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
    {
        return Err(HarborError::Config(format!(
            "CORS origin {bad:?} must start with http:// or https://"
        )));
    }
    Ok(CorsOrigins::List(origins))
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `HarborError::Config` for any malformed value.
    pub fn from_env() -> Result<Self, HarborError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    ///
    /// # Errors
    /// Returns `HarborError::Config` for any malformed value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarborError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_dir = lookup("HARBOR_MODEL_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR), PathBuf::from);

        let bind = lookup("HARBOR_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.trim().parse::<SocketAddr>().map_err(|e| {
            HarborError::Config(format!("HARBOR_BIND_ADDR {bind:?} is not an address: {e}"))
        })?;

        let cors_origins = match lookup("HARBOR_CORS_ORIGINS") {
            Some(v) => parse_origins(&v)?,
            None => CorsOrigins::List(DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()),
        };

        let unknown_category_policy = match lookup("HARBOR_UNKNOWN_CATEGORY_POLICY") {
            Some(v) => v.parse().map_err(HarborError::Config)?,
            None => UnknownCategoryPolicy::default(),
        };

        let require_manifest = match lookup("HARBOR_REQUIRE_MANIFEST") {
            Some(v) => parse_bool("HARBOR_REQUIRE_MANIFEST", &v)?,
            None => false,
        };

        let log_mode = match lookup("HARBOR_LOG_MODE").as_deref().map(str::trim) {
            None | Some("stdout") => LogMode::Stdout,
            Some("file") => LogMode::File,
            Some(other) => {
                return Err(HarborError::Config(format!(
                    "HARBOR_LOG_MODE must be stdout or file, got {other:?}"
                )))
            }
        };
        let log_file = lookup("HARBOR_LOG_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);

        Ok(Self {
            model_dir,
            bind_addr,
            cors_origins,
            unknown_category_policy,
            require_manifest,
            log_mode,
            log_file,
        })
    }

    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_manifest: self.require_manifest,
        }
    }
}
