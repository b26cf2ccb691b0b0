//! # Pool Fijo de Workers
//! src/workers/pool.rs
//!
//! `W` threads de larga vida, cada uno en el ciclo
//! `dequeue → handle → repetir`. El tamaño es fijo desde el arranque:
//! las conexiones en exceso esperan en la cola en vez de crear threads.

use crate::workers::queue::TaskQueue;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Pool de workers que consume de una [`TaskQueue`]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Lanza `size` workers que procesan tareas con `handler`
    ///
    /// Cada tarea la recibe exactamente un worker y solo ese worker.
    pub fn start<T, F>(size: usize, queue: Arc<TaskQueue<T>>, handler: F) -> io::Result<Self>
    where
        T: Send + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);

        Self::spawn_all(size, &queue, |i| {
            let queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            let name = format!("worker-{}", i);

            thread::Builder::new()
                .name(name.clone())
                .spawn(move || Self::worker_loop(&name, &queue, handler.as_ref()))
        })
    }

    /// Lanza los workers uno por uno con `spawn`
    ///
    /// Si alguno falla, cierra la cola y espera a los que ya arrancaron:
    /// no quedan workers bloqueados en `dequeue` para siempre.
    fn spawn_all<T, S>(size: usize, queue: &TaskQueue<T>, mut spawn: S) -> io::Result<Self>
    where
        S: FnMut(usize) -> io::Result<JoinHandle<()>>,
    {
        let mut handles = Vec::with_capacity(size);

        for i in 0..size {
            match spawn(i) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::error!(worker = i, error = %e, "failed to spawn worker, stopping the pool");
                    queue.close();
                    Self { handles }.join();
                    return Err(e);
                }
            }
        }

        Ok(Self { handles })
    }

    /// Loop principal del worker
    fn worker_loop<T, F>(name: &str, queue: &TaskQueue<T>, handler: &F)
    where
        F: Fn(T),
    {
        tracing::debug!(worker = name, "worker started");

        // Solo termina si la cola se cierra y se vacía
        while let Some(task) = queue.dequeue() {
            // Un panic en una conexión no debe matar al worker
            if panic::catch_unwind(AssertUnwindSafe(|| handler(task))).is_err() {
                tracing::error!(worker = name, "task handler panicked; worker continues");
            }
        }

        tracing::debug!(worker = name, "worker stopped");
    }

    /// Número de workers del pool
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Espera a que terminen todos los workers
    ///
    /// Solo retorna después de cerrar la cola.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                tracing::error!("worker thread exited with a panic");
            }
        }
    }
}
