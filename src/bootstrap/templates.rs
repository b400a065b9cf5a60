//! CMS page templates on disk.
//!
//! Templates are JSON files below a root directory. They are listed and served
//! to the content administration shell and submitted during site generation.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::backend::PageTemplate;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template path '{0}' is not inside the template directory")]
    InvalidPath(String),

    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Template IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Template '{path}' is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Template task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Read-only view of the template directory.
///
/// Filesystem work runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths (with `/` separators) of every template, sorted.
    ///
    /// A missing root directory yields an empty list.
    pub async fn template_paths(&self) -> Result<Vec<String>, TemplateError> {
        let store = self.clone();
        blocking(move || store.list()).await
    }

    /// Raw content of one template.
    pub async fn template(&self, relative: &str) -> Result<String, TemplateError> {
        let store = self.clone();
        let relative = relative.to_string();
        blocking(move || store.read(&relative)).await
    }

    /// Every template, parsed.
    pub async fn load_all(&self) -> Result<Vec<PageTemplate>, TemplateError> {
        let store = self.clone();
        blocking(move || store.read_all()).await
    }

    fn list(&self) -> Result<Vec<String>, TemplateError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let walk = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walk {
            let entry = entry.map_err(io::Error::from)?;
            let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
            if !entry.file_type().is_file() || !is_json {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let parts: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                paths.push(parts.join("/"));
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn read(&self, relative: &str) -> Result<String, TemplateError> {
        let path = self.resolve(relative)?;
        Ok(fs::read_to_string(path)?)
    }

    fn read_all(&self) -> Result<Vec<PageTemplate>, TemplateError> {
        self.list()?
            .into_iter()
            .map(|path| {
                let raw = self.read(&path)?;
                let content = serde_json::from_str(&raw).map_err(|source| TemplateError::Parse {
                    path: path.clone(),
                    source,
                })?;
                Ok(PageTemplate { path, content })
            })
            .collect()
    }

    /// Absolute path of an existing template file inside the root.
    ///
    /// Symlinks are resolved before the containment check.
    fn resolve(&self, relative: &str) -> Result<PathBuf, TemplateError> {
        let candidate = Path::new(relative.trim_start_matches('/'));
        let escapes = candidate
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.is_empty() || escapes {
            return Err(TemplateError::InvalidPath(relative.to_string()));
        }

        let not_found = || TemplateError::NotFound(relative.to_string());
        let resolved = match self.root.join(candidate).canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        let root = self.root.canonicalize()?;
        if !resolved.starts_with(&root) {
            return Err(TemplateError::InvalidPath(relative.to_string()));
        }
        if !resolved.is_file() {
            return Err(not_found());
        }
        Ok(resolved)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

async fn blocking<T, F>(work: F) -> Result<T, TemplateError>
where
    F: FnOnce() -> Result<T, TemplateError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_templates() -> (tempfile::TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Pages")).unwrap();
        fs::create_dir_all(dir.path().join(".backup")).unwrap();
        fs::write(dir.path().join("Pages/HomePage.json"), r#"{"type":"HomePage"}"#).unwrap();
        fs::write(dir.path().join("Header.json"), r#"{"type":"Header"}"#).unwrap();
        fs::write(dir.path().join(".backup/Old.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let store = TemplateStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn lists_json_templates_recursively() {
        let (_dir, store) = store_with_templates();
        assert_eq!(
            store.template_paths().await.unwrap(),
            vec!["Header.json".to_string(), "Pages/HomePage.json".to_string()]
        );
    }

    #[tokio::test]
    async fn reads_single_template() {
        let (_dir, store) = store_with_templates();
        assert_eq!(
            store.template("Pages/HomePage.json").await.unwrap(),
            r#"{"type":"HomePage"}"#
        );
        assert!(matches!(
            store.template("Pages/Missing.json").await,
            Err(TemplateError::NotFound(_))
        ));
        assert!(matches!(
            store.template("Pages").await,
            Err(TemplateError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_paths_outside_root() {
        let (_dir, store) = store_with_templates();
        assert!(matches!(
            store.template("../etc/passwd").await,
            Err(TemplateError::InvalidPath(_))
        ));
        assert!(matches!(store.template("").await, Err(TemplateError::InvalidPath(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_root_is_rejected() {
        let (dir, store) = store_with_templates();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.json"), r#"{"secret":true}"#).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.json"),
            dir.path().join("Pages/Linked.json"),
        )
        .unwrap();

        assert!(matches!(
            store.template("Pages/Linked.json").await,
            Err(TemplateError::InvalidPath(_))
        ));
        assert!(!store
            .template_paths()
            .await
            .unwrap()
            .contains(&"Pages/Linked.json".to_string()));
    }

    #[tokio::test]
    async fn loads_all_parsed() {
        let (_dir, store) = store_with_templates();
        let templates = store.load_all().await.unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].content["type"], "HomePage");
    }

    #[tokio::test]
    async fn missing_root_is_empty() {
        let store = TemplateStore::new("/no/such/template/dir");
        assert!(store.template_paths().await.unwrap().is_empty());
        assert!(matches!(
            store.template("Home.json").await,
            Err(TemplateError::NotFound(_))
        ));
    }
}
