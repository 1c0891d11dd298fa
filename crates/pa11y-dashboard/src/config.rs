//! Dashboard configuration.
//!
//! Settings come from an optional `config/<env>` file (TOML, YAML, or JSON)
//! overlaid with `DASHBOARD_*` environment variables. Missing keys take the
//! defaults below during deserialization, so a loaded [`DashboardConfig`] is
//! always fully normalized.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Prefix of the environment variables read by [`DashboardConfig::load`].
pub const ENV_PREFIX: &str = "DASHBOARD";

/// Default webservice location when none is configured.
const DEFAULT_WEBSERVICE: &str = "http://localhost:3000/";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or the merged settings did not deserialize.
    #[error("failed to load configuration: {source}")]
    Load {
        /// The underlying loader error.
        #[from]
        source: config::ConfigError,
    },

    /// The settings deserialized but are unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment mode. Anything other than `production` runs as development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum RunMode {
    /// Raw error details are shown on error pages.
    #[default]
    Development,
    /// Error details are hidden and static assets are cached for a week.
    Production,
}

impl RunMode {
    /// Whether this is production mode.
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl From<String> for RunMode {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// Where the webservice lives: a full URL, or a host and port pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WebserviceAddress {
    /// A base URL such as `http://localhost:3000/`.
    Url(String),
    /// A host and port, reached over plain HTTP.
    HostPort {
        /// Host name or address.
        host: String,
        /// TCP port.
        port: u16,
    },
}

impl WebserviceAddress {
    /// The base URL the client should use.
    pub fn to_url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::HostPort { host, port } => format!("http://{host}:{port}/"),
        }
    }
}

impl Default for WebserviceAddress {
    fn default() -> Self {
        Self::Url(DEFAULT_WEBSERVICE.to_owned())
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardConfig {
    /// Location of pa11y-webservice.
    #[serde(default)]
    pub webservice: WebserviceAddress,
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind. `0` picks a free port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Omit every mutating route.
    #[serde(default)]
    pub readonly: bool,
    /// Ask search engines not to index the dashboard.
    #[serde(default = "default_true")]
    pub noindex: bool,
    /// Banner text shown on every page.
    #[serde(default, alias = "siteMessage", alias = "sitemessage")]
    pub site_message: Option<String>,
    /// Deployment mode.
    #[serde(default)]
    pub env: RunMode,
    /// Stop serving after any route failure, not only after a dropped
    /// webservice connection.
    #[serde(default = "default_true")]
    pub fail_fast: bool,
    /// How long a stopping server waits for open connections to finish.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
    /// Directory served under `/assets`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    4000
}

const fn default_true() -> bool {
    true
}

const fn default_shutdown_grace_ms() -> u64 {
    1000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            webservice: WebserviceAddress::default(),
            host: default_host(),
            port: default_port(),
            readonly: false,
            noindex: true,
            site_message: None,
            env: RunMode::default(),
            fail_fast: true,
            shutdown_grace_ms: default_shutdown_grace_ms(),
            public_dir: default_public_dir(),
        }
    }
}

impl DashboardConfig {
    /// Load `config_dir/<env_name>.{toml,yaml,json}` (if present) overlaid
    /// with `DASHBOARD_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `DASHBOARD_WEBSERVICE__HOST`.
    pub fn load(config_dir: &Path, env_name: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(config_dir.join(env_name)).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize::<Self>()?.normalized()
    }

    /// Parse settings from an in-memory document of the given format.
    pub fn parse(content: &str, format: config::FileFormat) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, format))
            .build()?;

        settings.try_deserialize::<Self>()?.normalized()
    }

    /// Blank site messages become `None`; the webservice address must be set.
    fn normalized(mut self) -> Result<Self, ConfigError> {
        if self
            .site_message
            .as_deref()
            .is_some_and(|m| m.trim().is_empty())
        {
            self.site_message = None;
        }
        match &self.webservice {
            WebserviceAddress::Url(url) if url.trim().is_empty() => {
                Err(ConfigError::Invalid("webservice URL is empty".to_owned()))
            }
            WebserviceAddress::HostPort { host, .. } if host.trim().is_empty() => {
                Err(ConfigError::Invalid("webservice host is empty".to_owned()))
            }
            _ => Ok(self),
        }
    }
}
