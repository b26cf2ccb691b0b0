//! # Handler de Conexión
//! src/server/handler.rs
//!
//! Máquina de estados que ejecuta cada worker por conexión:
//!
//! ```text
//! ACCEPTED → READING → RESOLVING → OK | NOT_FOUND | SERVER_ERROR → CLOSED
//!                 └──────────── (lectura 0 / error) ─────────────→ CLOSED
//! ```
//!
//! Cada camino termina exactamente una vez: actualiza el registro de
//! estadísticas (éxito o fallo, conexión activa liberada) y emite una sola
//! línea de log. Ningún error de una conexión sale de aquí.

use crate::config::Config;
use crate::files::DocumentRoot;
use crate::http::mime::mime_for;
use crate::http::response::error_response;
use crate::http::{Request, ResponseHead, StatusCode};
use crate::metrics::{Completion, StatsRegistry};
use crate::server::task::Task;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Parámetros del handler derivados de la configuración
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub read_buffer_size: usize,
    pub copy_buffer_size: usize,
    pub content_length: bool,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl HandlerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            read_buffer_size: config.read_buffer_size,
            copy_buffer_size: config.copy_buffer_size,
            content_length: config.content_length,
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Estado terminal de una conexión
#[derive(Debug)]
pub enum Outcome {
    /// El cliente cerró sin mandar nada (lectura de 0 bytes)
    PeerClosed,

    /// Falló la lectura del request (incluye timeout)
    ReadFailed(io::Error),

    /// Se envió una respuesta completa
    Responded {
        status: StatusCode,
        path: String,
        /// Bytes de body enviados
        bytes: u64,
        /// Motivo del error (404 / 500)
        reason: Option<String>,
    },

    /// La respuesta quedó a medias (fallo de escritura o de lectura del archivo)
    Aborted {
        status: StatusCode,
        path: String,
        error: io::Error,
    },
}

impl Outcome {
    /// Solo un 200 transmitido completo cuenta como éxito
    pub fn completion(&self) -> Completion {
        match self {
            Outcome::Responded { status, .. } if status.is_success() => Completion::Success,
            _ => Completion::Failure,
        }
    }

    /// Código de estado enviado (o intentado), si se llegó a responder
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Outcome::Responded { status, .. } | Outcome::Aborted { status, .. } => Some(*status),
            Outcome::PeerClosed | Outcome::ReadFailed(_) => None,
        }
    }
}

/// Libera la conexión activa aunque el handler haga panic
///
/// Si nadie llama a `finish`, el request cuenta como fallido.
struct ActiveConnection<'a> {
    stats: &'a StatsRegistry,
    start: Instant,
    finished: bool,
}

impl<'a> ActiveConnection<'a> {
    fn open(stats: &'a StatsRegistry) -> Self {
        stats.connection_opened();
        Self {
            stats,
            start: Instant::now(),
            finished: false,
        }
    }

    fn finish(mut self, completion: Completion) -> Duration {
        self.finished = true;
        let elapsed = self.start.elapsed();
        self.stats.connection_closed(completion, elapsed);
        elapsed
    }
}

impl Drop for ActiveConnection<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.stats.connection_closed(Completion::Failure, self.start.elapsed());
        }
    }
}

/// Handler compartido por todos los workers
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    root: DocumentRoot,
    stats: StatsRegistry,
    settings: HandlerSettings,
}

impl ConnectionHandler {
    pub fn new(root: DocumentRoot, stats: StatsRegistry, settings: HandlerSettings) -> Self {
        Self { root, stats, settings }
    }

    pub fn stats(&self) -> &StatsRegistry {
        &self.stats
    }

    /// Atiende una tarea de la cola y cierra su conexión
    pub fn handle_task(&self, task: Task) -> Outcome {
        let peer = task.peer_label();
        tracing::trace!(peer = %peer, waited_ms = task.waited().as_millis() as u64, "task picked up");

        let mut stream = task.into_stream();
        if let Err(e) = stream.set_read_timeout(self.settings.read_timeout) {
            tracing::warn!(peer = %peer, error = %e, "failed to set read timeout");
        }
        if let Err(e) = stream.set_write_timeout(self.settings.write_timeout) {
            tracing::warn!(peer = %peer, error = %e, "failed to set write timeout");
        }

        self.handle(&mut stream, &peer)
        // `stream` se suelta aquí: CLOSED
    }

    /// Ejecuta la máquina de estados sobre cualquier stream bidireccional
    ///
    /// Las estadísticas quedan actualizadas antes de retornar, es decir,
    /// antes de que el llamador cierre el stream.
    pub fn handle<S: Read + Write>(&self, stream: &mut S, peer: &str) -> Outcome {
        let active = ActiveConnection::open(&self.stats);

        let outcome = self.process(stream);
        if let Err(e) = stream.flush() {
            tracing::debug!(peer, error = %e, "flush failed");
        }

        let elapsed = active.finish(outcome.completion());
        log_outcome(&outcome, peer, elapsed);
        outcome
    }

    fn process<S: Read + Write>(&self, stream: &mut S) -> Outcome {
        // READING
        let mut buffer = vec![0u8; self.settings.read_buffer_size];
        let bytes_read = match stream.read(&mut buffer) {
            Ok(0) => return Outcome::PeerClosed,
            Ok(n) => n,
            Err(e) => return Outcome::ReadFailed(e),
        };

        // RESOLVING
        let request = Request::parse(&buffer[..bytes_read]);
        let target = match self.root.resolve(request.path()) {
            Ok(target) => target,
            Err(e) => {
                return respond_error(stream, StatusCode::NotFound, request.path(), e.to_string());
            }
        };

        let mut file = match File::open(&target.path) {
            Ok(file) => file,
            Err(e) => {
                return respond_error(
                    stream,
                    StatusCode::InternalServerError,
                    &target.relative,
                    format!("open failed: {}", e),
                );
            }
        };

        let content_length = if self.settings.content_length {
            match file.metadata() {
                Ok(meta) => Some(meta.len()),
                Err(e) => {
                    return respond_error(
                        stream,
                        StatusCode::InternalServerError,
                        &target.relative,
                        format!("metadata failed: {}", e),
                    );
                }
            }
        } else {
            None
        };

        // OK: el tipo sale del nombre pedido, no del destino de un symlink
        let head = ResponseHead::ok(mime_for(Path::new(&target.relative)), content_length);
        if let Err(error) = stream.write_all(&head.to_bytes()) {
            return Outcome::Aborted {
                status: StatusCode::Ok,
                path: target.relative,
                error,
            };
        }

        match copy_body(&mut file, stream, self.settings.copy_buffer_size) {
            Ok(bytes) => Outcome::Responded {
                status: StatusCode::Ok,
                path: target.relative,
                bytes,
                reason: None,
            },
            Err(error) => Outcome::Aborted {
                status: StatusCode::Ok,
                path: target.relative,
                error,
            },
        }
    }
}

/// Envía una respuesta de error fija
fn respond_error<W: Write>(stream: &mut W, status: StatusCode, path: &str, reason: String) -> Outcome {
    let response = error_response(status);

    match stream.write_all(response) {
        Ok(()) => Outcome::Responded {
            status,
            path: path.to_string(),
            bytes: body_length(response),
            reason: Some(reason),
        },
        Err(error) => Outcome::Aborted {
            status,
            path: path.to_string(),
            error,
        },
    }
}

/// Bytes después del separador de headers
fn body_length(response: &[u8]) -> u64 {
    response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (response.len() - pos - 4) as u64)
        .unwrap_or(0)
}

/// Copia el archivo al stream con un buffer fijo hasta agotarlo
fn copy_body<R: Read, W: Write>(file: &mut R, stream: &mut W, buffer_size: usize) -> io::Result<u64> {
    let mut buffer = vec![0u8; buffer_size];
    let mut total = 0u64;

    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        stream.write_all(&buffer[..n])?;
        total += n as u64;
    }
}

/// Una línea de log por conexión
fn log_outcome(outcome: &Outcome, peer: &str, elapsed: Duration) {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

    match outcome {
        Outcome::PeerClosed => {
            tracing::warn!(peer, elapsed_ms, "connection closed before request");
        }
        Outcome::ReadFailed(e) => {
            tracing::error!(peer, elapsed_ms, error = %e, "failed to read request");
        }
        Outcome::Responded { status, path, bytes, reason: None } => {
            tracing::info!(peer, path = %path, status = status.as_u16(), bytes, elapsed_ms, "served");
        }
        Outcome::Responded { status: StatusCode::NotFound, path, reason: Some(reason), .. } => {
            tracing::warn!(peer, path = %path, status = 404, reason = %reason, elapsed_ms, "not found");
        }
        Outcome::Responded { status, path, reason: Some(reason), .. } => {
            tracing::error!(peer, path = %path, status = status.as_u16(), reason = %reason, elapsed_ms, "server error");
        }
        Outcome::Aborted { status, path, error } => {
            tracing::error!(peer, path = %path, status = status.as_u16(), error = %error, elapsed_ms, "response aborted");
        }
    }
}
