//! # Pool Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, inicializa el logging y entra al accept loop.
//! Cualquier error de arranque termina el proceso con código 1.

use pool_server::config::Config;
use pool_server::logging;
use pool_server::server::Server;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    // El guard debe vivir hasta el final para vaciar el archivo de log
    let _guard = match logging::init(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    config.print_summary();

    match Server::bind(config).and_then(Server::run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal error");
            ExitCode::FAILURE
        }
    }
}
