//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Este módulo implementa las estadísticas del servidor:
//! - Contadores de requests (totales, exitosos, fallidos)
//! - Conexiones activas
//! - Tiempo promedio de respuesta
//! - Reporte periódico al log

pub mod registry;
pub mod reporter;

pub use registry::{Completion, StatsRegistry, StatsSnapshot};
pub use reporter::Reporter;
