//! Server configuration loaded from defaults, then environment variables,
//! then command line flags.
//!
//! Environment variables:
//! - `FOLIO_CONTENT_ROOT` - Directory holding the markdown documents (default: `content/docs`)
//! - `FOLIO_CATALOG` - JSON catalog file replacing the built-in one
//! - `FOLIO_PORT` - HTTP port (default: `3000`)
//! - `FOLIO_BIND` - Bind address (default: `127.0.0.1`)
//! - `FOLIO_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::catalog::DocumentCatalog;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_CONTENT_ROOT: &str = "content/docs";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub content_root: PathBuf,
    /// Catalog file given explicitly. Without one the platform config
    /// directory is tried, then the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            content_root: PathBuf::from(DEFAULT_CONTENT_ROOT),
            catalog_path: None,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("FOLIO_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid FOLIO_PORT '{}'", raw);
                defaults.port
            }),
            None => defaults.port,
        };

        let cors_origins = lookup("FOLIO_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Self {
            bind: lookup("FOLIO_BIND").unwrap_or(defaults.bind),
            port,
            content_root: lookup("FOLIO_CONTENT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_root),
            catalog_path: lookup("FOLIO_CATALOG").map(PathBuf::from),
            cors_origins,
        }
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn with_bind(mut self, bind: Option<String>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        self
    }

    pub fn with_content_root(mut self, root: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.content_root = root;
        }
        self
    }

    pub fn with_catalog(mut self, catalog: Option<PathBuf>) -> Self {
        if catalog.is_some() {
            self.catalog_path = catalog;
        }
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Load the document catalog this configuration points at.
    pub fn load_catalog(&self) -> anyhow::Result<DocumentCatalog> {
        if let Some(path) = &self.catalog_path {
            return load_catalog_file(path);
        }

        match default_catalog_path() {
            Some(path) if path.is_file() => load_catalog_file(&path),
            _ => {
                tracing::debug!("Using built-in catalog");
                Ok(DocumentCatalog::builtin())
            }
        }
    }
}

fn load_catalog_file(path: &Path) -> anyhow::Result<DocumentCatalog> {
    let catalog = DocumentCatalog::from_json_file(path)
        .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
    tracing::info!(
        "Loaded catalog from {} ({} documents)",
        path.display(),
        catalog.entries().len()
    );
    Ok(catalog)
}

/// `catalog.json` in the platform config directory.
pub fn default_catalog_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "folio").map(|dirs| dirs.config_dir().join("catalog.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr(), "127.0.0.1:3000");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("FOLIO_PORT", "8080"),
            ("FOLIO_BIND", "0.0.0.0"),
            ("FOLIO_CONTENT_ROOT", "/srv/docs"),
            ("FOLIO_CATALOG", "/etc/folio/catalog.json"),
            ("FOLIO_CORS_ORIGINS", "https://a.dev, https://b.dev,"),
        ]));
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.content_root, PathBuf::from("/srv/docs"));
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/folio/catalog.json"))
        );
        assert_eq!(
            config.cors_origins,
            Some(vec!["https://a.dev".to_string(), "https://b.dev".to_string()])
        );
    }

    #[test]
    fn invalid_port_keeps_default() {
        let config = ServerConfig::from_lookup(lookup(&[("FOLIO_PORT", "http")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn flags_override_environment() {
        let config = ServerConfig::from_lookup(lookup(&[("FOLIO_PORT", "8080")]))
            .with_port(Some(9000))
            .with_bind(None)
            .with_content_root(Some(PathBuf::from("docs")));
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.content_root, PathBuf::from("docs"));
    }

    #[test]
    fn explicit_catalog_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{
                "categories": [{ "id": "intro", "label": "Intro", "order": 1 }],
                "documents": [{
                    "fileName": "start.md",
                    "title": "Start",
                    "description": "First steps",
                    "category": "intro",
                    "order": 1
                }]
            }"#,
        )
        .unwrap();

        let config = ServerConfig::default().with_catalog(Some(path));
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.entries().len(), 1);
        assert!(!catalog.entries()[0].featured);
    }

    #[test]
    fn broken_catalog_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{ "categories": [], "documents": [{
                "fileName": "a.md", "title": "A", "description": "",
                "category": "missing", "order": 1
            }] }"#,
        )
        .unwrap();

        let err = ServerConfig::default()
            .with_catalog(Some(path))
            .load_catalog()
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load catalog"));
    }
}
