//! # Módulo HTTP
//!
//! Lo mínimo de HTTP/1.1 que necesita el servidor de archivos:
//!
//! - Scan de la request line (`GET /<path> HTTP/1.1`), sin headers
//! - Encabezados de respuesta y respuestas de error fijas
//! - Códigos de estado 200 / 404 / 500
//! - Tabla de tipos MIME por extensión
//!
//! No hay conexiones persistentes ni chunked transfer: una respuesta por
//! conexión y después se cierra.
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 404 Not Found\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 13\r\n
//! \r\n
//! 404 Not Found
//! ```

pub mod mime;
pub mod request;
pub mod response;
pub mod status;

// Re-exportamos los tipos principales para facilitar su uso
pub use request::Request;
pub use response::ResponseHead;
pub use status::StatusCode;
