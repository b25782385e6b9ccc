// ============================================================================
// SSG Infrastructure - Local Disk Host
// File: crates/ssg-infrastructure/src/host/local.rs
// ============================================================================

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error};

use ssg_core::error::DomainError;
use ssg_core::services::StaticHost;

/// Writes generated pages below `root`, which the HTTP layer serves as
/// `/static`.
#[derive(Debug, Clone)]
pub struct LocalHost {
    root: PathBuf,
}

impl LocalHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Only plain relative names are accepted, one path segment each.
fn single_segment(part: &str) -> Result<&str, DomainError> {
    let mut components = Path::new(part).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(part),
        _ => Err(DomainError::Host(format!("refusing unsafe path segment {:?}", part))),
    }
}

#[async_trait]
impl StaticHost for LocalHost {
    async fn save(&self, text: &str, name: &str, prefix: &str) -> Result<String, DomainError> {
        let dir = self.root.join(single_segment(prefix)?);
        let path = dir.join(single_segment(name)?);

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            error!("Failed to create {}: {}", dir.display(), e);
            DomainError::Host(e.to_string())
        })?;
        tokio::fs::write(&path, text).await.map_err(|e| {
            error!("Failed to write {}: {}", path.display(), e);
            DomainError::Host(e.to_string())
        })?;

        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(format!("{}/{}", prefix, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_writes_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalHost::new(dir.path());

        let location = host.save("<p>hi</p>", "post.html", "alice").await.unwrap();
        assert_eq!(location, "alice/post.html");

        let written = std::fs::read_to_string(dir.path().join("alice").join("post.html")).unwrap();
        assert_eq!(written, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_save_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let host = LocalHost::new(dir.path());

        for (name, prefix) in [("../x.html", "alice"), ("x.html", ".."), ("a/b.html", "alice"), ("x.html", "")] {
            let result = host.save("x", name, prefix).await;
            assert!(matches!(result, Err(DomainError::Host(_))), "{} {}", name, prefix);
        }
    }
}
