//! # Tipos MIME
//! src/http/mime.rs
//!
//! Tabla cerrada por extensión. Lo que no está en la tabla se envía como
//! `application/octet-stream` (incluye `.css`, `.js`, etc.).

use std::path::Path;

/// Tipo por defecto para extensiones desconocidas
pub const DEFAULT_MIME: &str = "application/octet-stream";

const MIME_TABLE: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
];

/// Resuelve el Content-Type a partir de la extensión del archivo
///
/// La comparación de la extensión no distingue mayúsculas.
///
/// # Ejemplo
/// ```
/// use pool_server::http::mime::mime_for;
/// use std::path::Path;
///
/// assert_eq!(mime_for(Path::new("www/index.html")), "text/html");
/// assert_eq!(mime_for(Path::new("style.css")), "application/octet-stream");
/// ```
pub fn mime_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MIME;
    };

    MIME_TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}
