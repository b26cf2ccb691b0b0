//! # Tarea
//! src/server/task.rs
//!
//! Una conexión aceptada esperando a ser atendida. La crea el accept loop,
//! vive en la cola hasta que un worker la toma, y el stream se cierra al
//! soltar la tarea al final del handler.

use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

/// Conexión aceptada pendiente de procesar
#[derive(Debug)]
pub struct Task {
    stream: TcpStream,
    peer: Option<SocketAddr>,
    accepted_at: Instant,
}

impl Task {
    pub fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            stream,
            peer,
            accepted_at: Instant::now(),
        }
    }

    /// Dirección del cliente para logs ("unknown" si no se pudo obtener)
    pub fn peer_label(&self) -> String {
        self.peer
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Tiempo que la tarea lleva desde que se aceptó (incluye espera en cola)
    pub fn waited(&self) -> Duration {
        self.accepted_at.elapsed()
    }

    /// Cede el stream (y su cierre) a quien lo procese
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}
