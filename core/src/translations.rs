//! Static UI string table.
//!
//! Built once at startup and handed to consumers as `Arc<Translations>`;
//! nothing in the crate reads a global table.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Fr,
}

const EN: &[(&str, &str)] = &[
    ("employeeManagement", "Employee Management"),
    ("employees", "Employees"),
    ("sites", "Sites"),
    ("roles", "Roles"),
    ("timesheet", "Timesheet"),
    ("add", "Add"),
    ("edit", "Edit"),
    ("create", "Create"),
    ("update", "Update"),
    ("noneFound", "No {entity} found"),
    ("noMatch", "No {entity} matches your search"),
    (
        "confirmDelete",
        "Are you sure you want to delete this {entity}? This action cannot be undone.",
    ),
];

const FR: &[(&str, &str)] = &[
    ("employeeManagement", "Gestion des Employés"),
    ("employees", "Employés"),
    ("sites", "Sites"),
    ("roles", "Rôles"),
    ("timesheet", "Feuille de Temps"),
    ("add", "Ajouter"),
    ("edit", "Modifier"),
    ("create", "Créer"),
    ("update", "Mettre à Jour"),
    ("noneFound", "Aucun {entity} trouvé"),
    ("noMatch", "Aucun {entity} ne correspond à votre recherche"),
    (
        "confirmDelete",
        "Êtes-vous sûr de vouloir supprimer ce {entity}? Cette action est irréversible.",
    ),
];

const DEFAULT_CURRENCY: &str = "FCFA";

#[derive(Debug, Clone)]
pub struct Translations {
    locale: Locale,
    entries: HashMap<String, String>,
    currency_symbol: String,
}

/// Shape of a translations override file.
#[derive(Debug, Deserialize)]
struct TranslationsFile {
    locale: Locale,
    #[serde(default)]
    currency_symbol: Option<String>,
    #[serde(default)]
    entries: HashMap<String, String>,
}

impl Translations {
    pub fn builtin(locale: Locale) -> Self {
        let table = match locale {
            Locale::En => EN,
            Locale::Fr => FR,
        };
        Self {
            locale,
            entries: table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            currency_symbol: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Builtin table for the file's locale with the file's entries laid over it.
    ///
    /// ```toml
    /// locale = "en"
    /// currency_symbol = "EUR"
    ///
    /// [entries]
    /// employees = "Staff"
    /// ```
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: TranslationsFile = toml::from_str(raw)?;
        let mut translations = Self::builtin(file.locale);
        translations.entries.extend(file.entries);
        if let Some(symbol) = file.currency_symbol {
            translations.currency_symbol = symbol;
        }
        Ok(translations)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Entry for `key`, or the key itself when the table has none.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }

    /// `t(key)` with `{entity}` replaced.
    pub fn t_entity(&self, key: &str, entity: &str) -> String {
        self.t(key).replace("{entity}", entity)
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::builtin(Locale::Fr)
    }
}
