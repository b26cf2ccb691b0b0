//! # Workers
//! src/workers/mod.rs
//!
//! Productor/consumidor acotado: una [`TaskQueue`] de capacidad fija y un
//! [`WorkerPool`] de tamaño fijo que la consume. Limita cuántas conexiones
//! se procesan a la vez sin importar la tasa de llegada.

pub mod pool;
pub mod queue;

pub use pool::WorkerPool;
pub use queue::{QueueStats, TaskQueue};
