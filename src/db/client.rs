use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::debug;

use crate::config::ConnectionSettings;
use crate::db::connection::build_config;
use crate::error::{AppError, ErrorKind};

/// Connect to SQL Server using resolved settings.
///
/// The configured timeout bounds the TCP connect and the TDS login
/// separately; a timeout of 0 disables it. Errors carry the Connection kind
/// except for settings problems, which surface as Config.
pub async fn connect(
    settings: &ConnectionSettings,
) -> Result<tiberius::Client<tokio_util::compat::Compat<TcpStream>>> {
    let config =
        build_config(settings).map_err(|err| AppError::new(ErrorKind::Config, err.to_string()))?;
    let limit = (settings.timeout_ms > 0).then(|| Duration::from_millis(settings.timeout_ms));

    debug!(
        "connecting to {} (database {})",
        config.get_addr(),
        settings.database
    );
    let tcp = within(
        limit,
        "Connection",
        settings.timeout_ms,
        TcpStream::connect(config.get_addr()),
    )
    .await?;
    tcp.set_nodelay(true)?;

    within(
        limit,
        "Login",
        settings.timeout_ms,
        tiberius::Client::connect(config, tcp.compat_write()),
    )
    .await
}

async fn within<F, T, E>(limit: Option<Duration>, label: &str, limit_ms: u64, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: fmt::Display,
{
    let outcome = match limit {
        Some(duration) => timeout(duration, fut).await.map_err(|_| {
            AppError::new(
                ErrorKind::Connection,
                format!("{} timed out after {} ms", label, limit_ms),
            )
        })?,
        None => fut.await,
    };
    outcome.map_err(|err| AppError::new(ErrorKind::Connection, err.to_string()).into())
}
