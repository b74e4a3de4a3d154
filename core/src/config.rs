//! Per-view configuration: which collection a controller manages and how it
//! is labelled, searched and sorted.
//!
//! A view is usually described in TOML:
//!
//! ```toml
//! endpoint = "employees"
//! entity_name = "Employé"
//! sort_options = ["name", "last_name", "hourly_rate"]
//! table_columns = ["name", "last_name", "role", "hourly_rate"]
//! search_fields = ["name", "last_name", "role"]
//!
//! [form_defaults]
//! name = ""
//! hourly_rate = ""
//!
//! [messages]
//! load_error = "Erreur lors du chargement des employés"
//! create_success = "Employé créé avec succès"
//! update_success = "Employé mis à jour avec succès"
//! save_error = "Erreur lors de la sauvegarde"
//! delete_success = "Employé supprimé avec succès"
//! delete_error = "Erreur lors de la suppression"
//! ```

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{Entity, FieldSpec};

/// User-facing notification texts. Error texts are prefixes; the remote
/// detail is appended as `"{prefix}: {detail}"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Messages {
    pub load_error: String,
    pub create_success: String,
    pub update_success: String,
    pub save_error: String,
    pub delete_success: String,
    pub delete_error: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct ViewConfig<E: Entity> {
    /// Collection path segment, e.g. `employees` for `/api/employees`.
    pub endpoint: String,
    /// Singular display label, e.g. `Employé`.
    pub entity_name: String,
    #[serde(default)]
    pub form_defaults: E::Draft,
    #[serde(default)]
    pub sort_options: Vec<E::Field>,
    #[serde(default)]
    pub table_columns: Vec<E::Field>,
    #[serde(default)]
    pub search_fields: Vec<E::Field>,
    pub messages: Messages,
}

impl<E: Entity> ViewConfig<E> {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim_matches('/').is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        Ok(())
    }

    /// Sort key a fresh controller starts with: `name` when offered,
    /// otherwise the first sort option.
    pub fn initial_sort(&self) -> Option<E::Field> {
        self.sort_options
            .iter()
            .copied()
            .find(|f| f.name() == "name")
            .or_else(|| self.sort_options.first().copied())
    }

    pub fn ensure_sortable(&self, key: E::Field) -> Result<(), ConfigError> {
        if self.sort_options.contains(&key) {
            Ok(())
        } else {
            Err(ConfigError::UnknownSortKey(key.name().to_string()))
        }
    }
}
