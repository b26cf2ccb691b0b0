//! # Registro de Estadísticas
//! src/metrics/registry.rs
//!
//! Contadores compartidos del servidor, todos detrás de un único `Mutex`.
//! Se inyecta como `StatsRegistry` (clonable, comparte el estado) en workers,
//! accept loop y reporter; no hay contadores globales.
//!
//! Invariantes:
//! - `successful + failed <= total` en todo momento
//! - al terminar todos los requests en vuelo: `successful + failed == total`
//!   y `active_connections == 0`

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Registro de estadísticas thread-safe
#[derive(Debug, Clone)]
pub struct StatsRegistry {
    inner: Arc<Mutex<Counters>>,
    start_time: Instant,
}

/// Datos internos protegidos por el lock
#[derive(Debug, Default)]
struct Counters {
    /// Requests aceptados (uno por conexión que entra al handler)
    total_requests: u64,

    /// Requests respondidos con 200 y transmitidos completos
    successful_requests: u64,

    /// Requests terminados en 404, 500 o error de IO
    failed_requests: u64,

    /// Conexiones dentro del handler en este momento
    active_connections: u64,

    /// Suma de los tiempos de respuesta de los requests terminados
    total_response_time: Duration,
}

/// Resultado final de un request, para el registro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    Failure,
}

impl StatsRegistry {
    /// Crea un registro con todos los contadores en cero
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Counters::default())),
            start_time: Instant::now(),
        }
    }

    // Las secciones críticas no hacen panic, así que un lock envenenado
    // sigue teniendo contadores consistentes.
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Entrada al handler: cuenta el request y la conexión activa
    pub fn connection_opened(&self) {
        let mut data = self.lock();
        data.total_requests += 1;
        data.active_connections += 1;
    }

    /// Salida del handler: registra el resultado y libera la conexión activa
    ///
    /// Cada request termina exactamente una vez, como éxito o como fallo.
    pub fn connection_closed(&self, completion: Completion, elapsed: Duration) {
        let mut data = self.lock();
        match completion {
            Completion::Success => data.successful_requests += 1,
            Completion::Failure => data.failed_requests += 1,
        }
        data.total_response_time += elapsed;
        data.active_connections = data.active_connections.saturating_sub(1);
    }

    pub fn total_requests(&self) -> u64 {
        self.lock().total_requests
    }

    pub fn successful_requests(&self) -> u64 {
        self.lock().successful_requests
    }

    pub fn failed_requests(&self) -> u64 {
        self.lock().failed_requests
    }

    pub fn active_connections(&self) -> u64 {
        self.lock().active_connections
    }

    /// Tiempo promedio de respuesta (cero si aún no hay requests)
    pub fn average_response_time(&self) -> Duration {
        let data = self.lock();
        Self::average(&data)
    }

    // total_response_time / total_requests; los requests en vuelo aún no
    // suman tiempo, así que el promedio queda por debajo mientras haya carga.
    fn average(data: &Counters) -> Duration {
        if data.total_requests == 0 {
            return Duration::ZERO;
        }
        // Duration / u32 no alcanza para contadores grandes
        let nanos = data.total_response_time.as_nanos() / data.total_requests as u128;
        Duration::from_nanos(nanos as u64)
    }

    /// Copia consistente de todos los contadores (tomada bajo un solo lock)
    pub fn snapshot(&self) -> StatsSnapshot {
        let data = self.lock();
        let completed = data.successful_requests + data.failed_requests;

        StatsSnapshot {
            total_requests: data.total_requests,
            successful_requests: data.successful_requests,
            failed_requests: data.failed_requests,
            active_connections: data.active_connections,
            in_flight: data.total_requests.saturating_sub(completed),
            average_response_time_us: Self::average(&data).as_micros() as u64,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

}

impl Default for StatsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot de estadísticas (para reporter y tests)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub active_connections: u64,
    pub in_flight: u64,
    pub average_response_time_us: u64,
    pub uptime_secs: u64,
}

impl StatsSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
