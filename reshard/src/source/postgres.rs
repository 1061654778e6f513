use std::fmt;
use std::io::BufReader;
use std::str::FromStr;
use std::sync::Arc;

use config::shared::PgConnectionConfig;
use rustls::ClientConfig;
use tokio_postgres::tls::MakeTlsConnect;
use tokio_postgres::{
    Client, Config, Connection, NoTls, SimpleQueryMessage, SimpleQueryRow, Socket,
};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{Instrument, error, info, warn};

use crate::error::{MonitorError, MonitorResult};
use crate::source::{MetricsSource, WorkerMetrics};

/// Introspection query projecting the progress counters of every shard whose
/// migration is currently in progress.
const POLL_QUERY: &str = "select shard_name, approx_bytes_to_copy, bytes_copied, \
     changelog_entries_fetched, changelog_entries_applied \
     from reshard.shard_migration_progress \
     where state = 'in_progress' \
     order by shard_name asc";

/// Spawns a background task to drive a PostgreSQL connection until it
/// terminates.
///
/// The task logs when the connection terminates, either successfully or with
/// an error.
fn spawn_postgres_connection<T>(connection: Connection<Socket, T::Stream>)
where
    T: MakeTlsConnect<Socket>,
    T::Stream: Send + 'static,
{
    let span = tracing::Span::current();
    let task = async move {
        if let Err(e) = connection.await {
            error!("an error occurred during the Postgres connection: {}", e);
            return;
        }

        info!("postgres connection terminated successfully")
    }
    .instrument(span);

    tokio::spawn(task);
}

/// A client polling migration progress from the cluster coordinator.
///
/// Connects once at startup; every poll issues a single read-only
/// introspection query over that connection.
#[derive(Debug, Clone)]
pub struct PgMetricsSource {
    client: Arc<Client>,
}

impl PgMetricsSource {
    /// Establishes a connection to PostgreSQL. The connection uses TLS if
    /// configured in the supplied [`PgConnectionConfig`].
    pub async fn connect(pg_connection_config: PgConnectionConfig) -> MonitorResult<Self> {
        match pg_connection_config.tls.enabled {
            true => PgMetricsSource::connect_tls(pg_connection_config).await,
            false => PgMetricsSource::connect_no_tls(pg_connection_config).await,
        }
    }

    /// Establishes a connection to PostgreSQL without TLS encryption.
    async fn connect_no_tls(pg_connection_config: PgConnectionConfig) -> MonitorResult<Self> {
        let config: Config = pg_connection_config.with_db();

        let (client, connection) = config.connect(NoTls).await?;
        spawn_postgres_connection::<NoTls>(connection);

        info!("successfully connected to postgres without tls");

        Ok(PgMetricsSource {
            client: Arc::new(client),
        })
    }

    /// Establishes a TLS-encrypted connection to PostgreSQL using the
    /// trusted root certificates from the connection config.
    async fn connect_tls(pg_connection_config: PgConnectionConfig) -> MonitorResult<Self> {
        let config: Config = pg_connection_config.with_db();

        let mut root_store = rustls::RootCertStore::empty();
        let mut root_certs_reader =
            BufReader::new(pg_connection_config.tls.trusted_root_certs.as_bytes());
        for cert in rustls_pemfile::certs(&mut root_certs_reader) {
            let cert = cert?;
            root_store.add(cert)?;
        }

        let tls_config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let (client, connection) = config.connect(MakeRustlsConnect::new(tls_config)).await?;
        spawn_postgres_connection::<MakeRustlsConnect>(connection);

        info!("successfully connected to postgres with tls");

        Ok(PgMetricsSource {
            client: Arc::new(client),
        })
    }

    /// Builds a [`WorkerMetrics`] from one result row.
    ///
    /// Validation happens here, before the row ever reaches the aggregator:
    /// a missing column or an unparsable counter rejects the whole row.
    fn parse_row(row: &SimpleQueryRow) -> MonitorResult<WorkerMetrics> {
        Ok(WorkerMetrics {
            shard: get_row_value(row, "shard_name")?,
            approx_bytes_to_copy: get_row_value(row, "approx_bytes_to_copy")?,
            bytes_copied: get_row_value(row, "bytes_copied")?,
            changelog_fetched: get_row_value(row, "changelog_entries_fetched")?,
            changelog_applied: get_row_value(row, "changelog_entries_applied")?,
        })
    }
}

/// Extracts and parses a single column from a simple query row.
fn get_row_value<T: FromStr>(row: &SimpleQueryRow, column: &str) -> MonitorResult<T>
where
    T::Err: fmt::Debug,
{
    let value = row
        .try_get(column)
        .map_err(|e| MonitorError::MalformedRecord(format!("column '{column}' is unreadable: {e}")))?
        .ok_or_else(|| MonitorError::MalformedRecord(format!("column '{column}' is null")))?;

    value.parse().map_err(|e: T::Err| {
        MonitorError::MalformedRecord(format!("column '{column}' failed to parse: {e:?}"))
    })
}

impl MetricsSource for PgMetricsSource {
    async fn poll_workers(&self) -> MonitorResult<Vec<WorkerMetrics>> {
        let mut workers = Vec::new();

        for message in self.client.simple_query(POLL_QUERY).await? {
            if let SimpleQueryMessage::Row(row) = message {
                match Self::parse_row(&row) {
                    Ok(metrics) => workers.push(metrics),
                    Err(err) => {
                        warn!("skipping malformed metrics row: {}", err);
                    }
                }
            }
        }

        Ok(workers)
    }
}
