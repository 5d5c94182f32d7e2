//! Where to find homerunner.
//!
//! # Design
//! The environment is read once into a `HomerunnerConfig` value and handed
//! to the client, instead of being consulted inside the constructor. Tests
//! build configs through [`HomerunnerConfig::from_lookup`] and never touch
//! the process environment.

/// Environment variable holding homerunner's full base URL.
pub const URL_ENV: &str = "HOMERUNNER_URL";

/// Environment variable holding the port for the localhost fallback.
pub const PORT_ENV: &str = "HOMERUNNER_PORT";

/// Port homerunner listens on by default.
pub const DEFAULT_PORT: u16 = 54321;

/// Resolved homerunner location settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomerunnerConfig {
    /// Full base URL. Takes precedence over `port`.
    pub url: Option<String>,
    /// Port of a homerunner running on localhost.
    pub port: Option<String>,
}

impl HomerunnerConfig {
    /// Read `HOMERUNNER_URL` and `HOMERUNNER_PORT` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count
    /// as unset, so an empty `HOMERUNNER_PORT` falls back to the default port
    /// rather than producing `http://localhost:`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            url: non_empty(URL_ENV),
            port: non_empty(PORT_ENV),
        }
    }

    /// The base URL this config points at.
    pub fn base_url(&self) -> String {
        match (&self.url, &self.port) {
            (Some(url), _) => url.clone(),
            (None, Some(port)) => format!("http://localhost:{port}"),
            (None, None) => format!("http://localhost:{DEFAULT_PORT}"),
        }
    }
}
