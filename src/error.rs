//! # Errores del Servidor
//! src/error.rs
//!
//! Solo los errores de arranque llegan hasta aquí. Los errores de cada
//! conexión se resuelven localmente en el handler y terminan como un
//! [`Outcome`](crate::server::handler::Outcome), nunca como `ServerError`.

use std::path::PathBuf;
use thiserror::Error;

/// Errores fatales del servidor (bind, directorio raíz, logging, config)
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuración inválida
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No se pudo abrir el socket de escucha
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// No se pudo crear o acceder al directorio raíz
    #[error("root directory {path:?} unavailable: {source}")]
    RootDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No se pudo inicializar el sistema de logging
    #[error("logging setup failed: {0}")]
    Logging(String),

    /// Otro error de IO durante el arranque (spawn de threads, etc.)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias de resultado para operaciones de arranque
pub type Result<T> = std::result::Result<T, ServerError>;
