use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use crate::compare::{QueryExecutor, SchemaCatalog, Table, TableRef};
use crate::config::ConnectionSettings;
use crate::db::{catalog, executor};
use crate::db::types::ResultSet;
use crate::error::{AppError, ErrorKind};
use crate::safety;

/// A connected SQL Server session. Implements both collaborator seams the
/// comparison engine consumes: statement execution and schema metadata.
pub struct SqlClient {
    inner: tiberius::Client<tokio_util::compat::Compat<TcpStream>>,
}

impl SqlClient {
    /// Connect using resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error if DNS resolution, TCP connect, or login fails, or
    /// if the configured timeout elapses during connect or login.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let config = build_config(settings)
            .map_err(|err| AppError::new(ErrorKind::Config, err.to_string()))?;
        let timeout_duration = if settings.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(settings.timeout_ms))
        };

        // `timeout` wraps the future in an outer Result for Elapsed vs IO errors.
        let tcp = if let Some(duration) = timeout_duration {
            timeout(duration, TcpStream::connect(config.get_addr()))
                .await
                .map_err(|_| {
                    AppError::new(
                        ErrorKind::Connection,
                        format!("Connection timed out after {} ms", settings.timeout_ms),
                    )
                })?
                .map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()))?
        } else {
            TcpStream::connect(config.get_addr())
                .await
                .map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()))?
        };
        tcp.set_nodelay(true)?;

        let inner = if let Some(duration) = timeout_duration {
            timeout(
                duration,
                tiberius::Client::connect(config, tcp.compat_write()),
            )
            .await
            .map_err(|_| {
                AppError::new(
                    ErrorKind::Connection,
                    format!("Login timed out after {} ms", settings.timeout_ms),
                )
            })?
            .map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()))?
        } else {
            tiberius::Client::connect(config, tcp.compat_write())
                .await
                .map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()))?
        };
        Ok(Self { inner })
    }
}

impl QueryExecutor for SqlClient {
    async fn execute(&mut self, sql: &str) -> Result<Vec<ResultSet>> {
        safety::validate_read_only(sql)
            .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
        tracing::debug!(bytes = sql.len(), "executing generated statement");
        let stream = tiberius::Query::new(sql.to_string())
            .query(&mut self.inner)
            .await
            .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
        executor::collect_result_sets(stream).await
    }
}

impl SchemaCatalog for SqlClient {
    async fn table(&mut self, table: &TableRef) -> Result<Table> {
        catalog::load_table(&mut self.inner, table).await
    }
}

fn build_config(settings: &ConnectionSettings) -> Result<tiberius::Config> {
    let mut config = tiberius::Config::new();
    config.host(&settings.server);
    config.port(settings.port);
    config.database(&settings.database);

    match (&settings.user, &settings.password) {
        (Some(user), Some(pass)) => {
            config.authentication(tiberius::AuthMethod::sql_server(user, pass));
        }
        (Some(user), None) => {
            return Err(anyhow!(
                "Password is required for SQL authentication (user: {})",
                user
            ));
        }
        _ => {}
    }

    if settings.encrypt {
        config.encryption(tiberius::EncryptionLevel::Required);
    } else {
        config.encryption(tiberius::EncryptionLevel::NotSupported);
    }

    if settings.trust_cert {
        config.trust_cert();
    }

    Ok(config)
}
