//! Import settings shared by format workers and post-process steps.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for one importer.
///
/// Every field has a default, so a settings file only needs to name the
/// values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Run the scene validation gate after every post-process step
    pub validate_each_step: bool,

    /// `gen_normals` recomputes normals even where the file provides them
    pub force_gen_normals: bool,

    /// Material names `remove_redundant_materials` never drops
    pub keep_materials: Vec<String>,

    /// Let the OBJ worker triangulate while loading
    pub obj_triangulate_on_load: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            validate_each_step: cfg!(debug_assertions),
            force_gen_normals: false,
            keep_materials: Vec::new(),
            obj_triangulate_on_load: false,
        }
    }
}

impl ImportSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether `name` is protected from material removal.
    pub fn keeps_material(&self, name: &str) -> bool {
        self.keep_materials.iter().any(|m| m == name)
    }
}
