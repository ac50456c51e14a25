//! Loading template records from YAML files.

use crate::error::{Result, StencilError};
use crate::template::Template;
use std::path::{Path, PathBuf};

/// Parse one template file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Template> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        StencilError::UserError(format!(
            "failed to read template file '{}': {}",
            path.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&content).map_err(|e| {
        StencilError::UserError(format!(
            "failed to parse template file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load every `*.yaml` / `*.yml` file directly inside `dir`, in file name
/// order. Other files and subdirectories are ignored.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Template>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| {
        StencilError::UserError(format!(
            "failed to read template directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_yaml(path))
        .collect();
    paths.sort();

    tracing::debug!(dir = %dir.display(), files = paths.len(), "loading templates");
    paths.iter().map(load_file).collect()
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}
