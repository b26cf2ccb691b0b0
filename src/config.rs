//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor con soporte completo
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./pool_server --port 8080 \
//!   --root ./www \
//!   --workers 4 \
//!   --queue-capacity 10
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! SERVER_PORT=5296 SERVER_ROOT=/srv/www ./pool_server
//! ```

use crate::error::{Result, ServerError};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Estrategia para despachar las conexiones aceptadas
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Pool fijo de workers alimentado por una cola acotada
    Pool,

    /// Un thread nuevo por cada conexión aceptada
    ThreadPerConnection,

    /// Atiende una sola conexión en el thread que llama y termina
    Single,

    /// Listener no bloqueante sondeado periódicamente; alimenta la misma cola acotada
    Polling,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Pool => "pool",
            Strategy::ThreadPerConnection => "thread-per-connection",
            Strategy::Single => "single",
            Strategy::Polling => "polling",
        }
    }
}

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "pool_server")]
#[command(about = "Servidor HTTP de archivos estáticos con pool fijo de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "SERVER_PORT")]
    pub port: u16,

    /// Directorio raíz desde el que se sirven los archivos
    #[arg(long = "root", default_value = "./www", env = "SERVER_ROOT")]
    pub root_dir: PathBuf,

    /// Documento por defecto para `/` o path vacío
    #[arg(long = "index", default_value = "index.html", env = "SERVER_INDEX")]
    pub index_file: String,

    // === Pool y cola ===

    /// Número fijo de workers
    #[arg(short, long, default_value = "4", env = "SERVER_WORKERS")]
    pub workers: usize,

    /// Capacidad de la cola de conexiones pendientes
    #[arg(short = 'q', long = "queue-capacity", default_value = "10", env = "SERVER_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Estrategia de despacho de conexiones
    #[arg(long, value_enum, default_value = "pool", env = "SERVER_STRATEGY")]
    pub strategy: Strategy,

    /// Intervalo de sondeo del listener (solo estrategia `polling`)
    #[arg(long = "poll-interval-ms", default_value = "10")]
    pub poll_interval_ms: u64,

    // === Observabilidad ===

    /// Segundos entre reportes de estadísticas (0 = desactivado)
    #[arg(long = "report-interval", default_value = "10", env = "SERVER_REPORT_INTERVAL")]
    pub report_interval_secs: u64,

    /// Archivo de log (append-only)
    #[arg(long = "log-file", default_value = "server.log", env = "SERVER_LOG_FILE")]
    pub log_file: PathBuf,

    /// Filtro de nivel de log (sintaxis de EnvFilter)
    #[arg(long = "log-level", default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    // === Conexiones ===

    /// Timeout de lectura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout-ms", default_value = "0")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "write-timeout-ms", default_value = "0")]
    pub write_timeout_ms: u64,

    /// Tamaño del buffer de lectura del request
    #[arg(long = "read-buffer", default_value = "1024")]
    pub read_buffer_size: usize,

    /// Tamaño del buffer de copia al transmitir archivos
    #[arg(long = "copy-buffer", default_value = "8192")]
    pub copy_buffer_size: usize,

    /// Omite el header Content-Length en respuestas 200
    #[arg(long = "no-content-length", action = clap::ArgAction::SetFalse)]
    pub content_length: bool,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use pool_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    pub fn report_interval(&self) -> Option<Duration> {
        (self.report_interval_secs > 0).then(|| Duration::from_secs(self.report_interval_secs))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ServerError::Config("workers must be >= 1".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(ServerError::Config("queue capacity must be >= 1".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(ServerError::Config("read buffer must be > 0".to_string()));
        }
        if self.copy_buffer_size == 0 {
            return Err(ServerError::Config("copy buffer must be > 0".to_string()));
        }

        // El index se une al root tal cual: no debe poder salirse de él
        let index = self.index_file.as_str();
        if index.is_empty() {
            return Err(ServerError::Config("index file must not be empty".to_string()));
        }
        if index.contains('/') || index.contains('\\') || index == "." || index == ".." {
            return Err(ServerError::Config(format!(
                "index file must be a plain file name, got {:?}",
                index
            )));
        }

        Ok(())
    }

    /// Registra un resumen de la configuración efectiva
    pub fn print_summary(&self) {
        tracing::info!(
            address = %self.address(),
            root = %self.root_dir.display(),
            index = %self.index_file,
            strategy = self.strategy.as_str(),
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            report_interval_secs = self.report_interval_secs,
            log_file = %self.log_file.display(),
            read_timeout_ms = self.read_timeout_ms,
            write_timeout_ms = self.write_timeout_ms,
            content_length = self.content_length,
            "server configuration"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto (idéntica a los defaults del CLI)
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            root_dir: PathBuf::from("./www"),
            index_file: "index.html".to_string(),
            workers: 4,
            queue_capacity: 10,
            strategy: Strategy::Pool,
            poll_interval_ms: 10,
            report_interval_secs: 10,
            log_file: PathBuf::from("server.log"),
            log_level: "info".to_string(),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            read_buffer_size: 1024,
            copy_buffer_size: 8192,
            content_length: true,
        }
    }
}
