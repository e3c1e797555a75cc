//! JSON-backed template library for GridLife.
//!
//! The repository is one file holding a `name -> record` mapping, read and
//! written wholesale. Writes re-read the file, insert, and write everything
//! back; there is no append-only log and no support for concurrent writers.

use gridlife_core::{StoreError, TemplateRecord, TemplateStore};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Template repository stored as a single JSON file.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    path: PathBuf,
}

impl TemplateLibrary {
    /// Opens a library at `path`. The file does not have to exist yet; a
    /// missing file reads as an empty library.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole repository.
    pub fn load_all(&self) -> Result<BTreeMap<String, TemplateRecord>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };
        serde_json::from_str(&raw).map_err(|err| StoreError::Malformed(err.to_string()))
    }

    /// Looks up one record by name.
    pub fn load(&self, name: &str) -> Result<TemplateRecord, StoreError> {
        self.load_all()?
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    fn write_all(&self, entries: &BTreeMap<String, TemplateRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Picks `config{N}` starting from the entry count, bumping past any name
    /// already taken so an existing entry is never overwritten.
    fn next_free_name(entries: &BTreeMap<String, TemplateRecord>) -> String {
        let mut index = entries.len();
        loop {
            let candidate = format!("config{index}");
            if !entries.contains_key(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }
}

impl TemplateStore for TemplateLibrary {
    fn append(&mut self, record: TemplateRecord) -> Result<String, StoreError> {
        let mut entries = self.load_all()?;
        let name = Self::next_free_name(&entries);
        entries.insert(name.clone(), record);
        self.write_all(&entries)?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_generation_skips_taken_names() {
        let mut entries = BTreeMap::new();
        entries.insert(String::from("config0"), TemplateRecord::from_rows(vec![]));
        entries.insert(String::from("config1"), TemplateRecord::from_rows(vec![]));
        assert_eq!(TemplateLibrary::next_free_name(&entries), "config2");

        // A hole plus a colliding count: {config0, config2} has two entries,
        // so the first candidate is the taken "config2" and must be bumped.
        entries.remove("config1");
        entries.insert(String::from("config2"), TemplateRecord::from_rows(vec![]));
        assert_eq!(TemplateLibrary::next_free_name(&entries), "config3");
    }
}
