use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::errors::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                Environment::with_prefix("TRACKER_STATS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the tracker web interface. May embed `user:password@`.
    #[serde(default = "TrackerConfig::default_url")]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "TrackerConfig::default_user_agent")]
    pub user_agent: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            username: None,
            password: None,
            user_agent: Self::default_user_agent(),
        }
    }
}

impl TrackerConfig {
    fn default_url() -> String {
        "https://bugs.python.org/".to_string()
    }

    fn default_user_agent() -> String {
        format!("tracker-stats/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Splits the configured URL into a credential-free base and the
    /// credentials to send. Explicit `username`/`password` settings win over
    /// userinfo embedded in the URL.
    pub fn endpoint(&self) -> Result<(Url, Option<Credentials>), AppError> {
        let mut base = Url::parse(&self.url)
            .map_err(|err| AppError::InvalidTrackerUrl(format!("{}: {err}", self.url)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let embedded = if base.username().is_empty() {
            None
        } else {
            Some(Credentials {
                username: base.username().to_string(),
                password: base.password().map(str::to_string),
            })
        };
        // Cannot fail for http(s) URLs, which always have a host.
        let _ = base.set_username("");
        let _ = base.set_password(None);

        let credentials = match (&self.username, embedded) {
            (Some(username), _) => Some(Credentials {
                username: username.clone(),
                password: self.password.clone(),
            }),
            (None, Some(mut creds)) => {
                if self.password.is_some() {
                    creds.password = self.password.clone();
                }
                Some(creds)
            }
            (None, None) => None,
        };

        Ok((base, credentials))
    }

    /// Like `endpoint`, but anonymous access is an error.
    pub fn require_credentials(&self) -> Result<(Url, Credentials), AppError> {
        match self.endpoint()? {
            (base, Some(credentials)) => Ok((base, credentials)),
            (_, None) => Err(AppError::MissingCredentials),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

impl CacheConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("cache")
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Raw CSV export, fetched once and kept until removed by hand.
    pub fn csv_path(&self) -> PathBuf {
        self.dir.join("issues.csv")
    }

    pub fn collection_path(&self) -> PathBuf {
        self.dir.join("collection.json")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
        }
    }
}

impl OutputConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("output")
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn script_path(&self) -> PathBuf {
        self.dir.join("issue_stats.js")
    }
}
