use std::fmt;
use url::Url;

use crate::error::RefriError;

/// Where the migration runner connects.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionDescriptor {
    /// Single connection string, e.g. `postgres://user:pw@host/db`.
    Url { url: String, tls_relaxed: bool },
    /// Discrete PostgreSQL parameters.
    Params {
        host: String,
        port: u16,
        user: String,
        password: Option<String>,
        database: String,
    },
}

impl ConnectionDescriptor {
    /// Render the descriptor as a driver URL understood by `sqlx::AnyConnection`.
    ///
    /// With `tls_relaxed`, PostgreSQL URLs get `sslmode=require`: the session is
    /// encrypted but the server certificate is not verified.
    pub fn to_url(&self) -> Result<Url, RefriError> {
        match self {
            ConnectionDescriptor::Url { url, tls_relaxed } => {
                let mut url = Url::parse(url)?;
                if *tls_relaxed && is_postgres(&url) {
                    let kept: Vec<(String, String)> = url
                        .query_pairs()
                        .filter(|(k, _)| k != "sslmode")
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect();
                    url.query_pairs_mut()
                        .clear()
                        .extend_pairs(kept)
                        .append_pair("sslmode", "require");
                }
                Ok(url)
            }
            ConnectionDescriptor::Params {
                host,
                port,
                user,
                password,
                database,
            } => {
                let mut url = Url::parse("postgres://localhost")?;
                url.set_host(Some(host))?;
                // Setting parts on a postgres:// URL only fails for cannot-be-a-base URLs.
                let _ = url.set_port(Some(*port));
                let _ = url.set_username(user);
                let _ = url.set_password(password.as_deref());
                url.set_path(&format!("/{database}"));
                Ok(url)
            }
        }
    }

    /// Host/database summary that is safe to log.
    pub fn redacted(&self) -> String {
        match self.to_url() {
            Ok(url) => format!(
                "{}://{}{}",
                url.scheme(),
                url.host_str().unwrap_or(""),
                url.path()
            ),
            Err(_) => "<invalid url>".to_string(),
        }
    }
}

fn is_postgres(url: &Url) -> bool {
    matches!(url.scheme(), "postgres" | "postgresql")
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionDescriptor::Url { tls_relaxed, .. } => f
                .debug_struct("Url")
                .field("url", &self.redacted())
                .field("tls_relaxed", tls_relaxed)
                .finish(),
            ConnectionDescriptor::Params {
                host,
                port,
                user,
                password,
                database,
            } => f
                .debug_struct("Params")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("password", &password.as_ref().map(|_| "[REDACTED]"))
                .field("database", database)
                .finish(),
        }
    }
}
