//! Explicit registry of MLR model types
//!
//! Model types are registered by name at start-up. Lookup never touches the
//! filesystem.

use super::models::{ConstantModel, LinearModel};
use super::MlrModel;
use crate::config::MlrSettings;
use crate::errors::{ClimDiagError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Builds a fresh, unfitted model from settings
pub type ModelConstructor = fn(&MlrSettings) -> Box<dyn MlrModel>;

/// Mapping from model type name to constructor
#[derive(Clone, Default)]
pub struct ModelRegistry {
    constructors: BTreeMap<String, ModelConstructor>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}

fn new_constant(settings: &MlrSettings) -> Box<dyn MlrModel> {
    Box::new(ConstantModel::new(settings))
}

fn new_linear(settings: &MlrSettings) -> Box<dyn MlrModel> {
    Box::new(LinearModel::new(settings))
}

impl ModelRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every model type shipped with the crate
    #[must_use]
    pub fn with_builtin_models() -> Self {
        let mut constructors: BTreeMap<String, ModelConstructor> = BTreeMap::new();
        constructors.insert(ConstantModel::NAME.to_string(), new_constant);
        constructors.insert(LinearModel::NAME.to_string(), new_linear);
        Self { constructors }
    }

    /// Add a model type
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::DuplicateModel`] if `name` is taken.
    pub fn register(&mut self, name: &str, constructor: ModelConstructor) -> Result<()> {
        if self.constructors.contains_key(name) {
            return Err(ClimDiagError::DuplicateModel {
                name: name.to_string(),
            });
        }
        self.constructors.insert(name.to_string(), constructor);
        log::debug!("Registered MLR model type '{name}'");
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Create the model named by `settings.mlr_model_type`
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::UnknownModel`] for unregistered names.
    pub fn create(&self, settings: &MlrSettings) -> Result<Box<dyn MlrModel>> {
        self.create_named(&settings.mlr_model_type, settings)
    }

    /// Create a model by explicit name
    ///
    /// # Errors
    ///
    /// Returns [`ClimDiagError::UnknownModel`] for unregistered names.
    pub fn create_named(&self, name: &str, settings: &MlrSettings) -> Result<Box<dyn MlrModel>> {
        let constructor =
            self.constructors
                .get(name)
                .ok_or_else(|| ClimDiagError::UnknownModel {
                    name: name.to_string(),
                    available: self.constructors.keys().cloned().collect(),
                })?;
        Ok(constructor(settings))
    }
}
