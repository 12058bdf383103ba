use std::fs;
use std::path::{Path, PathBuf};

pub trait SceneStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String>;
}

/// Writes objects as files below `root`, mirroring the key layout.
#[derive(Debug, Clone)]
pub struct LocalDirectoryStore {
    root: PathBuf,
}

impl LocalDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, String> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, std::path::Component::ParentDir))
        {
            return Err(format!("invalid object key '{key}'"));
        }
        Ok(self.root.join(relative))
    }
}

impl SceneStore for LocalDirectoryStore {
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| format!("failed to create {}: {error}", parent.display()))?;
        }
        fs::write(&path, body)
            .map_err(|error| format!("failed to write {}: {error}", path.display()))
    }
}
