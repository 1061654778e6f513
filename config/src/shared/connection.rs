use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio_postgres::{Config as PgConnectOptions, config::SslMode};

use crate::DeserializableSecretString;
use crate::shared::ValidationError;

/// Configuration for connecting to a Postgres database.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PgConnectionConfig {
    /// Hostname or IP address of the Postgres server.
    pub host: String,
    /// Port number on which the Postgres server is listening.
    pub port: u16,
    /// Name of the Postgres database to connect to.
    pub name: String,
    /// Username for authenticating with the Postgres server.
    pub username: String,
    /// Password for the specified user. Redacted in debug output.
    pub password: Option<DeserializableSecretString>,
    /// TLS configuration for secure connections.
    pub tls: TlsConfig,
}

/// TLS settings for secure Postgres connections.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TlsConfig {
    /// PEM-encoded trusted root certificates.
    pub trusted_root_certs: String,
    /// Whether TLS is enabled for the connection.
    pub enabled: bool,
}

impl TlsConfig {
    /// Validates the [`TlsConfig`].
    ///
    /// Returns [`ValidationError::MissingTrustedRootCerts`] if TLS is enabled
    /// but no certificates are provided.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.trusted_root_certs.is_empty() {
            return Err(ValidationError::MissingTrustedRootCerts);
        }

        Ok(())
    }
}

impl PgConnectionConfig {
    /// Creates connection options for connecting to the PostgreSQL server
    /// without selecting a database.
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.tls.enabled {
            SslMode::Require
        } else {
            SslMode::Prefer
        };

        let mut options = PgConnectOptions::new();
        options
            .host(self.host.clone())
            .port(self.port)
            .user(self.username.clone())
            .ssl_mode(ssl_mode);

        if let Some(password) = &self.password {
            options.password(password.expose_secret());
        }

        options
    }

    /// Creates connection options for connecting to the configured database.
    pub fn with_db(&self) -> PgConnectOptions {
        let mut options = self.without_db();
        options.dbname(self.name.clone());
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(tls_enabled: bool) -> PgConnectionConfig {
        PgConnectionConfig {
            host: "localhost".to_string(),
            port: 5432,
            name: "orders".to_string(),
            username: "monitor".to_string(),
            password: None,
            tls: TlsConfig {
                trusted_root_certs: String::new(),
                enabled: tls_enabled,
            },
        }
    }

    #[test]
    fn test_tls_validation_requires_root_certs() {
        assert!(sample_config(false).tls.validate().is_ok());
        assert!(matches!(
            sample_config(true).tls.validate(),
            Err(ValidationError::MissingTrustedRootCerts)
        ));
    }

    #[test]
    fn test_with_db_sets_database_name() {
        let options = sample_config(false).with_db();
        assert_eq!(options.get_dbname(), Some("orders"));
    }
}
