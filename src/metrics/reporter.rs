//! # Reporter de Estadísticas
//! src/metrics/reporter.rs
//!
//! Thread independiente que cada `interval` toma un snapshot del registro y
//! lo escribe al log, junto con la ocupación de la cola si la hay. Solo lee:
//! nunca modifica los contadores.

use crate::metrics::registry::{StatsRegistry, StatsSnapshot};
use crate::workers::{QueueStats, TaskQueue};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

type QueueSource = Box<dyn Fn() -> QueueStats + Send>;

/// Reporter periódico
pub struct Reporter {
    stats: StatsRegistry,
    interval: Duration,
    queue: Option<QueueSource>,
}

impl Reporter {
    pub fn new(stats: StatsRegistry, interval: Duration) -> Self {
        Self {
            stats,
            interval,
            queue: None,
        }
    }

    /// Incluye el estado de la cola en cada reporte
    pub fn with_queue<T: Send + 'static>(mut self, queue: Arc<TaskQueue<T>>) -> Self {
        self.queue = Some(Box::new(move || queue.stats()));
        self
    }

    /// Lanza el loop perpetuo en su propio thread (`stats-reporter`)
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("stats-reporter".to_string())
            .spawn(move || self.run())
    }

    fn run(self) {
        loop {
            thread::sleep(self.interval);
            self.report();
        }
    }

    /// Emite un reporte y devuelve el snapshot usado
    pub fn report(&self) -> StatsSnapshot {
        let snapshot = self.stats.snapshot();
        tracing::info!(
            total = snapshot.total_requests,
            successful = snapshot.successful_requests,
            failed = snapshot.failed_requests,
            active = snapshot.active_connections,
            avg_response_us = snapshot.average_response_time_us,
            uptime_secs = snapshot.uptime_secs,
            json = %snapshot.to_json(),
            "{}",
            summary_line(&snapshot)
        );

        if let Some(queue) = self.queue_stats() {
            tracing::info!(
                queued = queue.len,
                capacity = queue.capacity,
                json = %queue.to_json(),
                "queue"
            );
        }
        snapshot
    }

    /// Estado actual de la cola observada, si hay una
    pub fn queue_stats(&self) -> Option<QueueStats> {
        self.queue.as_ref().map(|stats| stats())
    }
}

/// Línea de resumen legible para el log
pub fn summary_line(snapshot: &StatsSnapshot) -> String {
    format!(
        "stats: total={} active={} ok={} failed={} avg_response={:.3}ms",
        snapshot.total_requests,
        snapshot.active_connections,
        snapshot.successful_requests,
        snapshot.failed_requests,
        snapshot.average_response_time_us as f64 / 1000.0
    )
}
