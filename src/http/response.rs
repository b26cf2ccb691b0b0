//! # Construcción de Respuestas HTTP
//!
//! Las respuestas de error son fijas y se envían byte a byte como están.
//! La respuesta 200 se envía en dos partes: primero el encabezado (status
//! line + headers) construido aquí y después el contenido del archivo,
//! transmitido por el handler con un buffer de copia.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 2\r\n
//! \r\n
//! hi
//! ```

use super::StatusCode;

/// Respuesta 404 completa
pub const NOT_FOUND: &[u8] =
    b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 13\r\n\r\n404 Not Found";

/// Respuesta 500 completa
pub const INTERNAL_SERVER_ERROR: &[u8] = b"HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: 25\r\n\r\n500 Internal Server Error";

/// Encabezado de una respuesta HTTP/1.1
///
/// Los headers se guardan en orden de inserción para que la salida sea
/// determinista.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers en orden de inserción
    headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// Crea un encabezado sin headers
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Encabezado 200 para un archivo
    ///
    /// `content_length` es `None` en la variante sin tamaño.
    ///
    /// # Ejemplo
    /// ```
    /// use pool_server::http::ResponseHead;
    ///
    /// let head = ResponseHead::ok("text/html", Some(2));
    /// assert_eq!(
    ///     head.to_bytes(),
    ///     b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 2\r\n\r\n".to_vec()
    /// );
    /// ```
    pub fn ok(content_type: &str, content_length: Option<u64>) -> Self {
        let head = Self::new(StatusCode::Ok).with_header("Content-Type", content_type);
        match content_length {
            Some(len) => head.with_header("Content-Length", &len.to_string()),
            None => head,
        }
    }

    /// Agrega un header (si ya existe se reemplaza en su posición)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
        self
    }

    /// Convierte el encabezado a bytes listos para el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = format!("HTTP/1.1 {}\r\n", self.status).into_bytes();

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result
    }
}

/// Respuesta completa y fija para un código de error
pub fn error_response(status: StatusCode) -> &'static [u8] {
    match status {
        StatusCode::NotFound => NOT_FOUND,
        _ => INTERNAL_SERVER_ERROR,
    }
}
