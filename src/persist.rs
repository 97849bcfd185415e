//! JSON persistence for a built [`CategoryRegistry`].
//!
//! A registry is saved alongside the model it was built for so that loading a
//! model does not have to rebuild every catalogue and node set.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::CategoryError;
use crate::registry::CategoryRegistry;

/// Errors raised while saving or loading a registry.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid registry: {0}")]
    Invalid(#[from] CategoryError),
}

impl CategoryRegistry {
    /// Write the registry as compact JSON.
    pub fn write_json_into<W: Write>(&self, writer: W) -> Result<(), PersistError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a registry written by [`write_json_into`](Self::write_json_into).
    ///
    /// The loaded registry is checked with [`validate`](Self::validate).
    pub fn read_json_from<R: Read>(reader: R) -> Result<Self, PersistError> {
        let registry: Self = serde_json::from_reader(reader)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn to_json_string(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, PersistError> {
        let registry: Self = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Save the registry to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json_into(&mut writer)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), "saved category registry");
        Ok(())
    }

    /// Load a registry from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let registry = Self::read_json_from(BufReader::new(File::open(path)?))?;
        tracing::debug!(
            path = %path.display(),
            n_features = registry.n_features(),
            n_nodes = registry.n_nodes(),
            "loaded category registry"
        );
        Ok(registry)
    }
}
