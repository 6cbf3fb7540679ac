//! Loads raw documents from the content root.
//!
//! Containment is checked twice: lexically on the identifier before the
//! store is touched, then on the canonical path so a symlink inside the
//! root cannot point the read somewhere else.

use std::io;
use std::path::{Component, Path, PathBuf};

use super::ContentError;
use crate::models::RawDocument;

/// File-system operations the fetcher needs.
pub trait DocumentStore: Send + Sync {
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`DocumentStore`] backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl DocumentStore for LocalStore {
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

#[derive(Debug, Clone)]
pub struct ContentFetcher<S = LocalStore> {
    root: PathBuf,
    store: S,
}

impl ContentFetcher<LocalStore> {
    /// Create a fetcher rooted at `root`, which must exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        Ok(Self::with_store(root, LocalStore))
    }
}

impl<S: DocumentStore> ContentFetcher<S> {
    /// Create a fetcher over a custom store. `root` is used as given and
    /// should already be canonical.
    pub fn with_store(root: PathBuf, store: S) -> Self {
        Self { root, store }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an identifier to a canonical path inside the root.
    pub fn resolve(&self, identifier: &str) -> Result<PathBuf, ContentError> {
        let relative = lexical_relative(identifier)?;
        let candidate = self.root.join(relative);

        let canonical = self.store.canonicalize(&candidate).map_err(|e| {
            tracing::debug!("Cannot resolve {}: {}", candidate.display(), e);
            ContentError::FileNotFound(identifier.to_string())
        })?;

        if !canonical.starts_with(&self.root) {
            tracing::warn!(
                "Rejected {:?}: resolves to {} outside the content root",
                identifier,
                canonical.display()
            );
            return Err(ContentError::PathSecurity(identifier.to_string()));
        }

        Ok(canonical)
    }

    /// Load the raw text of a document.
    pub fn load(&self, identifier: &str) -> Result<RawDocument, ContentError> {
        let path = self.resolve(identifier)?;
        let text = self.store.read_to_string(&path).map_err(|e| {
            tracing::debug!("Cannot read {}: {}", path.display(), e);
            ContentError::FileNotFound(identifier.to_string())
        })?;

        Ok(RawDocument {
            identifier: identifier.to_string(),
            text,
        })
    }
}

/// Turn an identifier into a relative path made only of normal components.
fn lexical_relative(identifier: &str) -> Result<PathBuf, ContentError> {
    if identifier.contains('\0') {
        tracing::warn!("Rejected identifier containing NUL byte");
        return Err(ContentError::PathSecurity(identifier.to_string()));
    }

    let mut relative = PathBuf::new();
    for component in Path::new(identifier).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                tracing::warn!("Rejected path traversal attempt: {:?}", identifier);
                return Err(ContentError::PathSecurity(identifier.to_string()));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(ContentError::FileNotFound(identifier.to_string()));
    }
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Store that records every call and serves nothing.
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<PathBuf>>,
    }

    impl DocumentStore for RecordingStore {
        fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
            self.calls.lock().unwrap().push(path.to_path_buf());
            Err(io::ErrorKind::NotFound.into())
        }

        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.calls.lock().unwrap().push(path.to_path_buf());
            Err(io::ErrorKind::NotFound.into())
        }
    }

    fn recording_fetcher() -> ContentFetcher<RecordingStore> {
        ContentFetcher::with_store(PathBuf::from("/srv/docs"), RecordingStore::default())
    }

    #[test]
    fn traversal_is_rejected_before_touching_the_store() {
        let fetcher = recording_fetcher();
        for id in [
            "../secret.md",
            "../../etc/passwd",
            "guides/../../../etc/passwd",
            "guides/../intro.md",
            "./../x.md",
        ] {
            let result = fetcher.load(id);
            assert!(
                matches!(result, Err(ContentError::PathSecurity(_))),
                "{id} should be rejected"
            );
        }
        assert!(fetcher.store.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn absolute_paths_are_rejected() {
        let fetcher = recording_fetcher();
        assert!(matches!(
            fetcher.load("/etc/passwd"),
            Err(ContentError::PathSecurity(_))
        ));
        assert!(fetcher.store.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn nul_bytes_are_rejected() {
        let fetcher = recording_fetcher();
        assert!(matches!(
            fetcher.load("intro.md\0.txt"),
            Err(ContentError::PathSecurity(_))
        ));
    }

    #[test]
    fn empty_identifier_is_not_found() {
        let fetcher = recording_fetcher();
        assert!(matches!(
            fetcher.load(""),
            Err(ContentError::FileNotFound(_))
        ));
        assert!(matches!(
            fetcher.load("./"),
            Err(ContentError::FileNotFound(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let fetcher = recording_fetcher();
        assert!(matches!(
            fetcher.load("missing.md"),
            Err(ContentError::FileNotFound(_))
        ));
        let calls = fetcher.store.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), [PathBuf::from("/srv/docs/missing.md")]);
    }

    #[test]
    fn loads_files_inside_the_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("guides")).unwrap();
        std::fs::write(dir.path().join("guides/setup.md"), "# Setup\n").unwrap();

        let fetcher = ContentFetcher::new(dir.path()).unwrap();
        let doc = fetcher.load("guides/setup.md").unwrap();
        assert_eq!(doc.identifier, "guides/setup.md");
        assert_eq!(doc.text, "# Setup\n");
    }

    #[test]
    fn directories_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("guides")).unwrap();

        let fetcher = ContentFetcher::new(dir.path()).unwrap();
        assert!(matches!(
            fetcher.load("guides"),
            Err(ContentError::FileNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_leaving_the_root_are_rejected() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.md"), "secret").unwrap();

        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.md"),
            root.path().join("linked.md"),
        )
        .unwrap();

        let fetcher = ContentFetcher::new(root.path()).unwrap();
        assert!(matches!(
            fetcher.load("linked.md"),
            Err(ContentError::PathSecurity(_))
        ));
    }
}
