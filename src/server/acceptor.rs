//! # Accept Loops
//! src/server/acceptor.rs
//!
//! Una función por estrategia de despacho. Todas comparten la regla del
//! accept: un error al aceptar se registra y el loop sigue.
//!
//! - `pool` y `polling` encolan en la cola acotada (backpressure: si la cola
//!   está llena el accept loop se bloquea y el kernel retiene las conexiones
//!   en el backlog del listener)
//! - `thread-per-connection` lanza un thread por conexión, sin límite
//! - `single` atiende una conexión en el thread actual y retorna

use crate::server::handler::{ConnectionHandler, Outcome};
use crate::server::task::Task;
use crate::workers::TaskQueue;
use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Accept bloqueante que alimenta la cola
///
/// Retorna cuando la cola se cierra.
pub fn accept_into_queue(listener: &TcpListener, queue: &TaskQueue<Task>) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let task = Task::new(stream);
                tracing::debug!(peer = %task.peer_label(), queued = queue.len(), "connection accepted");

                if push(queue, task).is_err() {
                    tracing::info!("queue closed, accept loop stopping");
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }
}

/// Listener no bloqueante sondeado cada `interval`
///
/// Las conexiones aceptadas vuelven a modo bloqueante antes de encolarse:
/// el handler asume lecturas y escrituras bloqueantes.
pub fn poll_into_queue(listener: &TcpListener, queue: &TaskQueue<Task>, interval: Duration) -> io::Result<()> {
    listener.set_nonblocking(true)?;

    while !queue.is_closed() {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = stream.set_nonblocking(false) {
                    tracing::warn!(peer = %peer, error = %e, "failed to restore blocking mode, dropping connection");
                    continue;
                }

                let task = Task::new(stream);
                tracing::debug!(peer = %peer, queued = queue.len(), "connection accepted");
                if push(queue, task).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(interval);
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }

    tracing::info!("queue closed, polling loop stopping");
    Ok(())
}

/// Encola la tarea; con la cola llena lo registra y se bloquea hasta que haya lugar
///
/// Solo devuelve la tarea si la cola está cerrada.
fn push(queue: &TaskQueue<Task>, task: Task) -> Result<(), Task> {
    match queue.try_enqueue(task) {
        Ok(()) => Ok(()),
        Err(task) if queue.is_closed() => Err(task),
        Err(task) => {
            tracing::debug!(
                peer = %task.peer_label(),
                capacity = queue.capacity(),
                "queue full, accept loop waiting"
            );
            queue.enqueue(task)
        }
    }
}

/// Un thread por conexión aceptada
pub fn thread_per_connection(listener: &TcpListener, handler: Arc<ConnectionHandler>) {
    for (id, stream) in listener.incoming().enumerate() {
        match stream {
            Ok(stream) => {
                let handler = Arc::clone(&handler);
                let spawned = thread::Builder::new()
                    .name(format!("conn-{}", id))
                    .spawn(move || {
                        handler.handle_task(Task::new(stream));
                    });

                // Si el spawn falla el closure (y el stream) se sueltan: la conexión se cierra
                if let Err(e) = spawned {
                    tracing::error!(error = %e, "failed to spawn connection thread");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }
}

/// Atiende exactamente una conexión en el thread actual
pub fn single(listener: &TcpListener, handler: &ConnectionHandler) -> io::Result<Outcome> {
    let (stream, _) = listener.accept()?;
    Ok(handler.handle_task(Task::new(stream)))
}
