use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Read-only view of a `.env` file.
///
/// Values are parsed with `dotenvy` without touching the process
/// environment. A missing file behaves like an empty one.
pub struct EnvFile {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl EnvFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match dotenvy::from_path_iter(&path) {
            Ok(entries) => entries
                .collect::<Result<HashMap<_, _>, _>>()
                .with_context(|| format!("parsing {}", path.display()))?,
            Err(e) if e.not_found() => HashMap::new(),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
