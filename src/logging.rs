//! # Logging
//! src/logging.rs
//!
//! Instala el subscriber de `tracing` con dos destinos:
//! - consola (stdout), legible
//! - archivo append-only (`--log-file`), sin colores, vía un writer no bloqueante
//!
//! El [`WorkerGuard`] devuelto debe vivir mientras corra el servidor; al
//! soltarlo se vacían las líneas pendientes al archivo.

use crate::config::Config;
use crate::error::{Result, ServerError};
use std::fs::OpenOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Inicializa el logging global a partir de la configuración
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| ServerError::Logging(format!("invalid log level {:?}: {}", config.log_level, e)))?;

    if let Some(parent) = config.log_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Abrimos nosotros el archivo para garantizar modo append
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_names(true))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_thread_names(true)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| ServerError::Logging(e.to_string()))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.log_file = dir.path().join("server.log");
        config.log_level = "pool_server=loud".to_string();

        let result = init(&config);
        assert!(matches!(result, Err(ServerError::Logging(_))));
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.log_file = dir.path().join("logs").join("server.log");

        // Puede fallar si otro test ya instaló un subscriber global;
        // el archivo se crea antes de ese punto en cualquier caso.
        let _ = init(&config);
        assert!(config.log_file.exists());
    }
}
