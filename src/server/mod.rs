//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Une las piezas:
//!
//! ```text
//! listener ──accept──▶ TaskQueue (acotada) ──dequeue──▶ W workers ──▶ ConnectionHandler
//!                                                                         │
//!                                          StatsRegistry ◀────────────────┘
//!                                                │
//!                                            Reporter (cada N segundos)
//! ```
//!
//! El accept loop corre en el thread que llama a [`Server::run`].

pub mod acceptor;
pub mod handler;
pub mod task;

pub use handler::{ConnectionHandler, HandlerSettings, Outcome};
pub use task::Task;

use crate::config::{Config, Strategy};
use crate::error::{Result, ServerError};
use crate::files::DocumentRoot;
use crate::metrics::reporter::summary_line;
use crate::metrics::{Reporter, StatsRegistry};
use crate::workers::{TaskQueue, WorkerPool};
use std::fs;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

/// Servidor de archivos estáticos
pub struct Server {
    config: Config,
    listener: TcpListener,
    handler: Arc<ConnectionHandler>,
    stats: StatsRegistry,
}

impl Server {
    /// Valida la configuración, prepara el root y abre el socket
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;
        let address = config.address();

        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        Self::from_listener(config, listener)
    }

    /// Igual que [`Server::bind`] pero con un listener ya abierto
    pub fn from_listener(config: Config, listener: TcpListener) -> Result<Self> {
        config.validate()?;

        let root = prepare_root(&config)?;
        let stats = StatsRegistry::new();
        let handler = ConnectionHandler::new(root, stats.clone(), HandlerSettings::from_config(&config));

        Ok(Self {
            config,
            listener,
            handler: Arc::new(handler),
            stats,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Registro compartido (un clon ve los mismos contadores)
    pub fn stats(&self) -> StatsRegistry {
        self.stats.clone()
    }

    /// Arranca reporter y workers y entra al accept loop
    ///
    /// Con `pool`, `polling` y `thread-per-connection` no retorna en
    /// operación normal. Con `single` retorna después de una conexión.
    pub fn run(self) -> Result<()> {
        let address = self.local_addr()?;
        tracing::info!(
            address = %address,
            strategy = self.config.strategy.as_str(),
            root = %self.config.root_dir.display(),
            "server listening"
        );

        match self.config.strategy {
            Strategy::Pool | Strategy::Polling => self.run_queued(),
            Strategy::ThreadPerConnection => {
                self.spawn_reporter(None)?;
                acceptor::thread_per_connection(&self.listener, Arc::clone(&self.handler));
                Ok(())
            }
            Strategy::Single => {
                self.spawn_reporter(None)?;
                let outcome = acceptor::single(&self.listener, &self.handler)?;
                let summary = summary_line(&self.stats.snapshot());
                tracing::info!(
                    status = outcome.status().map(|s| s.as_u16()),
                    summary = %summary,
                    "single connection done"
                );
                Ok(())
            }
        }
    }

    /// Cola acotada + pool fijo
    fn run_queued(self) -> Result<()> {
        let queue = Arc::new(TaskQueue::new(self.config.queue_capacity));
        self.spawn_reporter(Some(Arc::clone(&queue)))?;

        let handler = Arc::clone(&self.handler);
        let pool = WorkerPool::start(self.config.workers, Arc::clone(&queue), move |task: Task| {
            handler.handle_task(task);
        })?;
        tracing::info!(
            workers = pool.size(),
            queue_capacity = queue.capacity(),
            "worker pool started"
        );

        let accepted = match self.config.strategy {
            Strategy::Polling => acceptor::poll_into_queue(&self.listener, &queue, self.config.poll_interval()),
            _ => {
                acceptor::accept_into_queue(&self.listener, &queue);
                Ok(())
            }
        };

        // El accept loop terminó: drenar la cola y esperar a los workers
        queue.close();
        pool.join();
        accepted.map_err(ServerError::from)
    }

    /// Lanza el reporter si el intervalo no es 0
    fn spawn_reporter(&self, queue: Option<Arc<TaskQueue<Task>>>) -> Result<()> {
        let Some(interval) = self.config.report_interval() else {
            return Ok(());
        };

        let reporter = Reporter::new(self.stats.clone(), interval);
        let reporter = match queue {
            Some(queue) => reporter.with_queue(queue),
            None => reporter,
        };
        reporter.spawn()?;
        Ok(())
    }
}

/// Crea el directorio raíz si no existe y lo abre
fn prepare_root(config: &Config) -> Result<DocumentRoot> {
    let root_error = |source| ServerError::RootDir {
        path: config.root_dir.clone(),
        source,
    };

    fs::create_dir_all(&config.root_dir).map_err(root_error)?;
    DocumentRoot::new(&config.root_dir, config.index_file.clone()).map_err(root_error)
}
