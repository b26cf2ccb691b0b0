//! # Resolución de Archivos
//! src/files.rs
//!
//! Convierte el path del request en un archivo dentro del directorio raíz.
//!
//! Reglas:
//! 1. Path vacío o `/` → documento por defecto (`index.html`)
//! 2. Segmentos vacíos y `.` se ignoran; `..` retrocede un segmento
//! 3. Un `..` que saldría del root se rechaza
//! 4. Segmentos con `\`, NUL o prefijos de unidad se rechazan
//! 5. El destino real (siguiendo symlinks) debe quedar dentro del root
//!
//! Todos los rechazos terminan en 404: el servidor no distingue "prohibido"
//! de "no existe".

use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Motivos por los que un path no es servible
#[derive(Debug, Error)]
pub enum ResolveError {
    /// El path intenta salir del root o contiene segmentos inválidos
    #[error("path rejected: {0:?}")]
    Traversal(String),

    /// No existe
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Es un directorio
    #[error("is a directory: {}", .0.display())]
    IsDirectory(PathBuf),

    /// Existe pero su destino real está fuera del root (symlink)
    #[error("resolves outside root: {}", .0.display())]
    EscapesRoot(PathBuf),
}

/// Archivo resuelto para un request (vive solo durante el request)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Path relativo ya saneado (ej: `images/logo.png`)
    pub relative: String,

    /// Path en disco dentro del root
    pub path: PathBuf,
}

/// Directorio raíz de documentos
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
    index_file: String,
}

impl DocumentRoot {
    /// Crea el root; el directorio debe existir
    ///
    /// Se guarda canonicalizado para poder comparar destinos de symlinks.
    pub fn new(root: impl AsRef<Path>, index_file: impl Into<String>) -> io::Result<Self> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
            index_file: index_file.into(),
        })
    }

    /// Path canónico del root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resuelve el path de un request
    ///
    /// Un `Ok` no garantiza que el archivo se pueda abrir: eso lo decide el
    /// handler (500 si falla la apertura).
    pub fn resolve(&self, request_path: &str) -> Result<ResolvedTarget, ResolveError> {
        let relative = match sanitize(request_path)? {
            segments if segments.is_empty() => self.index_file.clone(),
            segments => segments.join("/"),
        };
        let path = self.root.join(&relative);

        let real = match path.canonicalize() {
            Ok(real) => real,
            Err(e) if is_not_found(&e) => return Err(ResolveError::NotFound(path)),
            // Existe pero no se puede inspeccionar: que falle al abrir (500)
            Err(_) => return Ok(ResolvedTarget { relative, path }),
        };

        if !real.starts_with(&self.root) {
            return Err(ResolveError::EscapesRoot(path));
        }
        if real.is_dir() {
            return Err(ResolveError::IsDirectory(path));
        }

        Ok(ResolvedTarget { relative, path: real })
    }
}

/// Normaliza el path a segmentos acotados al root
fn sanitize(request_path: &str) -> Result<Vec<&str>, ResolveError> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in request_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(ResolveError::Traversal(request_path.to_string()));
                }
            }
            _ => {
                if !is_plain_segment(segment) {
                    return Err(ResolveError::Traversal(request_path.to_string()));
                }
                segments.push(segment);
            }
        }
    }

    Ok(segments)
}

/// Un segmento válido es exactamente un componente normal de path
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains('\\') || segment.contains('\0') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}

fn is_not_found(e: &io::Error) -> bool {
    // Un segmento intermedio que es archivo, o un nombre demasiado largo,
    // tampoco puede existir
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidFilename
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_root() -> (TempDir, DocumentRoot) {
        let dir = TempDir::new().unwrap();
        let www = dir.path().join("www");
        fs::create_dir(&www).unwrap();

        fs::write(www.join("index.html"), "hi").unwrap();
        fs::write(www.join("style.css"), "body {}").unwrap();
        fs::create_dir(www.join("sub")).unwrap();
        fs::write(www.join("sub").join("page.html"), "<p>sub</p>").unwrap();
        fs::write(dir.path().join("secret.txt"), "outside").unwrap();

        let root = DocumentRoot::new(&www, "index.html").unwrap();
        (dir, root)
    }

    #[test]
    fn test_empty_path_resolves_to_index() {
        let (_dir, root) = create_test_root();
        for path in ["", "/", "//", "."] {
            let target = root.resolve(path).unwrap();
            assert_eq!(target.relative, "index.html");
            assert_eq!(target.path, root.root().join("index.html"));
        }
    }

    #[test]
    fn test_nested_file() {
        let (_dir, root) = create_test_root();
        let target = root.resolve("sub/page.html").unwrap();
        assert_eq!(target.relative, "sub/page.html");
        assert!(target.path.ends_with("sub/page.html"));
    }

    #[test]
    fn test_dot_segments_are_normalized() {
        let (_dir, root) = create_test_root();
        let target = root.resolve("sub/../sub/./page.html").unwrap();
        assert_eq!(target.relative, "sub/page.html");
    }

    #[test]
    fn test_parent_escape_rejected() {
        let (_dir, root) = create_test_root();
        for path in ["../secret.txt", "sub/../../secret.txt", "..", "../www/index.html"] {
            assert!(
                matches!(root.resolve(path), Err(ResolveError::Traversal(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_invalid_segments_rejected() {
        let (_dir, root) = create_test_root();
        assert!(matches!(root.resolve("a\\..\\b"), Err(ResolveError::Traversal(_))));
        assert!(matches!(root.resolve("a\0b"), Err(ResolveError::Traversal(_))));
    }

    #[test]
    fn test_missing_file() {
        let (_dir, root) = create_test_root();
        assert!(matches!(root.resolve("missing.txt"), Err(ResolveError::NotFound(_))));
        assert!(matches!(root.resolve("index.html/child"), Err(ResolveError::NotFound(_))));
    }

    #[test]
    fn test_name_too_long_is_not_found() {
        let (_dir, root) = create_test_root();
        let long_name = format!("{}.html", "a".repeat(300));
        assert!(matches!(root.resolve(&long_name), Err(ResolveError::NotFound(_))));

        let long_nested = format!("sub/{}", "b".repeat(300));
        assert!(matches!(root.resolve(&long_nested), Err(ResolveError::NotFound(_))));
    }

    #[test]
    fn test_directory_is_not_servable() {
        let (_dir, root) = create_test_root();
        assert!(matches!(root.resolve("sub"), Err(ResolveError::IsDirectory(_))));
        assert!(matches!(root.resolve("sub/"), Err(ResolveError::IsDirectory(_))));
    }

    #[test]
    fn test_index_that_is_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("index.html")).unwrap();
        let root = DocumentRoot::new(dir.path(), "index.html").unwrap();
        assert!(matches!(root.resolve("/"), Err(ResolveError::IsDirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_rejected() {
        let (dir, root) = create_test_root();
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), root.root().join("link.txt")).unwrap();
        assert!(matches!(root.resolve("link.txt"), Err(ResolveError::EscapesRoot(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_allowed() {
        let (_dir, root) = create_test_root();
        std::os::unix::fs::symlink(root.root().join("index.html"), root.root().join("home.html")).unwrap();
        let target = root.resolve("home.html").unwrap();
        assert_eq!(target.path, root.root().join("index.html"));
    }

    #[test]
    fn test_root_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(DocumentRoot::new(dir.path().join("nope"), "index.html").is_err());
    }
}
