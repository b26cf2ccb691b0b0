//! # Pool Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 de archivos estáticos con un pool fijo de workers
//! alimentado por una cola acotada. Sirve para observar concurrencia,
//! sincronización con monitores (mutex + variables de condición) y
//! backpressure sobre el backlog del kernel.
//!
//! ## Arquitectura
//!
//! - `config`: argumentos CLI / variables de entorno
//! - `error`: errores fatales de arranque
//! - `logging`: salida estructurada a consola y archivo
//! - `workers`: cola FIFO acotada y pool de workers
//! - `http`: request line, respuestas y tipos MIME
//! - `files`: resolución de paths dentro del directorio raíz
//! - `server`: accept loops y máquina de estados por conexión
//! - `metrics`: contadores compartidos y reporte periódico
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use pool_server::config::Config;
//! use pool_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(config).expect("no se pudo abrir el puerto");
//! server.run().expect("error fatal");
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod workers;
