//! Process configuration, read once at startup from the environment.
//!
//! Values are layered: serialized defaults first, then the raw process
//! environment (`JWT_SECRET`, `PORT`, `DB_HOST`, ...). Call `dotenvy::dotenv()`
//! before [`Config::load`] to pick up a local `.env` file.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::ConnectionDescriptor;
use crate::error::RefriError;

/// Settings parsed as typed values (numbers, booleans).
const TYPED_KEYS: &[&str] = &["port", "db_port", "db_ssl_relaxed"];

/// Settings kept as the exact text from the environment. Figment would read
/// `JWT_SECRET=123456` as a number and `DB_PASSWORD=0042` as `42`.
const TEXT_KEYS: &[&str] = &[
    "jwt_secret",
    "loglevel",
    "database_url",
    "db_host",
    "db_user",
    "db_password",
    "db_name",
];

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// HMAC secret used to verify bearer tokens. Required to serve traffic.
    pub jwt_secret: Option<String>,
    pub port: u16,
    pub loglevel: String,

    /// Connection string form; takes precedence over the `db_*` parameters.
    pub database_url: Option<String>,
    /// Encrypt the connection without verifying the server certificate.
    pub db_ssl_relaxed: bool,
    pub db_host: Option<String>,
    pub db_port: u16,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            port: 3000,
            loglevel: "info".to_string(),
            database_url: None,
            db_ssl_relaxed: false,
            db_host: None,
            db_port: 5432,
            db_user: None,
            db_password: None,
            db_name: None,
        }
    }
}

impl Config {
    /// Extract configuration from the process environment.
    pub fn load() -> Result<Self, RefriError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(TYPED_KEYS));
        for (key, value) in Env::raw().only(TEXT_KEYS).iter() {
            figment = figment.merge(Serialized::default(key.as_str(), value));
        }
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self, RefriError> {
        Ok(figment.extract()?)
    }

    /// Pick the migration target: `DATABASE_URL` if set, otherwise the
    /// discrete `DB_*` parameters.
    pub fn connection_descriptor(&self) -> Result<ConnectionDescriptor, RefriError> {
        if let Some(url) = self.database_url.as_ref().filter(|u| !u.trim().is_empty()) {
            return Ok(ConnectionDescriptor::Url {
                url: url.trim().to_string(),
                tls_relaxed: self.db_ssl_relaxed,
            });
        }

        let host = self
            .db_host
            .clone()
            .ok_or(RefriError::MissingDatabaseSetting("DB_HOST"))?;
        let user = self
            .db_user
            .clone()
            .ok_or(RefriError::MissingDatabaseSetting("DB_USER"))?;
        let database = self
            .db_name
            .clone()
            .ok_or(RefriError::MissingDatabaseSetting("DB_NAME"))?;

        Ok(ConnectionDescriptor::Params {
            host,
            port: self.db_port,
            user,
            password: self.db_password.clone(),
            database,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("port", &self.port)
            .field("loglevel", &self.loglevel)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("db_ssl_relaxed", &self.db_ssl_relaxed)
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_password", &self.db_password.as_ref().map(|_| "[REDACTED]"))
            .field("db_name", &self.db_name)
            .finish()
    }
}
