use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Admin secret used when nothing is configured; `main` warns while it is active.
pub const DEFAULT_ADMIN_PASSWORD: &str = "0405";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub page: PageConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub admin_password: String,
    /// Base64 encoded key material (at least 64 bytes) for the private cookie jar.
    /// A random key is generated per process when unset.
    pub cookie_key: Option<String>,
    /// Drop the `Secure` attribute from the session cookie (plain-http development).
    pub insecure_cookie: bool,
    pub loglevel: String,
    /// Row id of the profile every public and admin operation targets.
    pub owner_id: i64,
    pub login_attempts_per_minute: u32,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:biolink.sqlite".to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            cookie_key: None,
            insecure_cookie: false,
            loglevel: "info".to_string(),
            owner_id: 1,
            login_attempts_per_minute: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Maximum staleness of the public page before the database is read again.
    pub revalidate_secs: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            revalidate_secs: 60,
        }
    }
}

impl PageConfig {
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub resend_api_key: Option<String>,
    pub from: String,
    pub to: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            from: "Contact Form <noreply@example.com>".to_string(),
            to: "owner@example.com".to_string(),
        }
    }
}

impl Config {
    /// Layered load: defaults, `config.toml`, `BIOLINK_*` variables, then the
    /// plain deployment variables (`DATABASE_URL`, `ADMIN_PASSWORD`, `RESEND_API_KEY`).
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("BIOLINK_").split("__"))
            .merge(plain_env())
            .extract()
    }

    pub fn uses_default_password(&self) -> bool {
        self.basic.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

fn plain_env() -> Env {
    Env::raw()
        .only(&["DATABASE_URL", "ADMIN_PASSWORD", "RESEND_API_KEY"])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case("database_url") {
                "basic.database_url".into()
            } else if key.as_str().eq_ignore_ascii_case("admin_password") {
                "basic.admin_password".into()
            } else {
                "contact.resend_api_key".into()
            }
        })
}
