//! # Lectura de la Request Line
//! src/http/request.rs
//!
//! El servidor solo consume la primera línea del request:
//!
//! ```text
//! GET /path/to/file.html HTTP/1.1\r\n
//! ```
//!
//! El scan es best-effort: se toma el primer token después de `GET /`.
//! Cualquier otra cosa (otro método, línea truncada, basura) degenera en un
//! path vacío, que luego se resuelve al documento por defecto.

/// Request reducido a lo que usa el servidor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Path pedido, sin la `/` inicial, sin query y ya decodificado
    path: String,
}

impl Request {
    /// Extrae el path de la primera línea del buffer
    ///
    /// Nunca falla: una línea malformada produce un path vacío.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use pool_server::http::Request;
    ///
    /// let request = Request::parse(b"GET /docs/a%20b.html?v=2 HTTP/1.1\r\n\r\n");
    /// assert_eq!(request.path(), "docs/a b.html");
    ///
    /// let request = Request::parse(b"garbage");
    /// assert_eq!(request.path(), "");
    /// ```
    pub fn parse(buffer: &[u8]) -> Self {
        let line_end = buffer
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .unwrap_or(buffer.len());
        let line = String::from_utf8_lossy(&buffer[..line_end]);

        let path = match line.strip_prefix("GET /") {
            Some(rest) => {
                let token = rest.split(char::is_whitespace).next().unwrap_or("");
                Self::url_decode(Self::strip_query(token))
            }
            None => String::new(),
        };

        Self { path }
    }

    /// Quita query string y fragmento
    fn strip_query(token: &str) -> &str {
        let end = token.find(|c| c == '?' || c == '#').unwrap_or(token.len());
        &token[..end]
    }

    /// Decodifica escapes `%XX`
    ///
    /// Un escape inválido se deja tal cual. Si el resultado no es UTF-8
    /// válido, los bytes sobrantes se reemplazan por U+FFFD.
    fn url_decode(s: &str) -> String {
        match urlencoding::decode(s) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned(),
        }
    }

    /// Path pedido (relativo, puede estar vacío)
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root() {
        let request = Request::parse(b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(request.path(), "");
    }

    #[test]
    fn test_parse_with_path() {
        let request = Request::parse(b"GET /images/logo.png HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(request.path(), "images/logo.png");
    }

    #[test]
    fn test_parse_without_version() {
        let request = Request::parse(b"GET /index.html\r\n");
        assert_eq!(request.path(), "index.html");
    }

    #[test]
    fn test_parse_strips_query_and_fragment() {
        assert_eq!(Request::parse(b"GET /a.html?x=1 HTTP/1.1").path(), "a.html");
        assert_eq!(Request::parse(b"GET /a.html#top HTTP/1.1").path(), "a.html");
        assert_eq!(Request::parse(b"GET /?x=1 HTTP/1.1").path(), "");
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(Request::parse(b"GET /hello%20world.txt HTTP/1.1").path(), "hello world.txt");
        assert_eq!(Request::parse(b"GET /%2e%2e/secret HTTP/1.1").path(), "../secret");
    }

    #[test]
    fn test_url_decode_invalid_escape_kept() {
        assert_eq!(Request::parse(b"GET /100%zz HTTP/1.1").path(), "100%zz");
        assert_eq!(Request::parse(b"GET /trailing% HTTP/1.1").path(), "trailing%");
        assert_eq!(Request::parse(b"GET /short%4 HTTP/1.1").path(), "short%4");
    }

    #[test]
    fn test_url_decode_invalid_utf8_is_lossy() {
        assert_eq!(Request::parse(b"GET /a%FFb.html HTTP/1.1").path(), "a\u{FFFD}b.html");
    }

    #[test]
    fn test_other_methods_degenerate_to_empty() {
        assert_eq!(Request::parse(b"POST /upload HTTP/1.1\r\n\r\n").path(), "");
        assert_eq!(Request::parse(b"HEAD /index.html HTTP/1.1\r\n\r\n").path(), "");
    }

    #[test]
    fn test_garbage_degenerates_to_empty() {
        assert_eq!(Request::parse(b"\x00\x01\x02\x03garbage").path(), "");
        assert_eq!(Request::parse(b"").path(), "");
        assert_eq!(Request::parse(b"GET").path(), "");
        assert_eq!(Request::parse(b"\r\nGET /late.html HTTP/1.1").path(), "");
    }

    #[test]
    fn test_only_first_line_is_used() {
        let request = Request::parse(b"GET /first.html HTTP/1.1\nGET /second.html HTTP/1.1\n");
        assert_eq!(request.path(), "first.html");
    }
}
