//! Entity schema and the payroll resources managed through it.
//!
//! # Design
//! Views refer to entity fields by name (search fields, sort keys, table
//! columns). Instead of looking names up on untyped maps, every entity
//! declares an enumerated field table (`Entity::Field`) whose variants know
//! their wire name and whether they sort numerically. Config files name
//! fields through that enum, so an unknown field is rejected when the config
//! is parsed rather than silently matching nothing at runtime.
//!
//! These types mirror the mock-server's schema but are defined
//! independently; integration tests catch drift between the two crates.

use std::borrow::Cow;
use std::fmt;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a persisted entity.
pub type EntityId = i64;

/// How a field's value is compared when it is the active sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Locale-aware string comparison; missing values are `""`.
    Text,
    /// Floating-point comparison; missing or unparsable values are `0`.
    Numeric,
}

/// One entry of an entity's field table.
pub trait FieldSpec:
    Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    /// Every field of the entity, in declaration order.
    const ALL: &'static [Self];

    /// Wire name, as it appears in JSON bodies and config files.
    fn name(self) -> &'static str;

    fn kind(self) -> FieldKind;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

/// A record of a REST collection.
pub trait Entity: Clone + fmt::Debug + DeserializeOwned + 'static {
    type Field: FieldSpec;

    /// Create/update payload: the editable fields, without `id`.
    type Draft: Clone + Default + fmt::Debug + PartialEq + Serialize + DeserializeOwned;

    /// Display name used in logs and config errors.
    const KIND: &'static str;

    fn id(&self) -> EntityId;

    /// Value of `field` rendered as text; `None` when the record lacks it.
    fn get(&self, field: Self::Field) -> Option<Cow<'_, str>>;

    /// Copy of the editable fields, used to seed an edit draft.
    fn to_draft(&self) -> Self::Draft;
}

fn text(value: &str) -> Option<Cow<'_, str>> {
    Some(Cow::Borrowed(value))
}

fn opt_text(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

fn number<T: ToString>(value: T) -> Option<Cow<'static, str>> {
    Some(Cow::Owned(value.to_string()))
}

/// Accepts `"12.50"`, `12.5` or `null` and keeps the textual form.
///
/// Decimal columns come back from the server as strings, while hand-written
/// config defaults tend to use bare numbers.
fn amount<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role_id: Option<EntityId>,
    /// Role name, joined in by the server.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub construction_site_id: Option<EntityId>,
    /// Construction site name, joined in by the server.
    #[serde(default)]
    pub construction_site: Option<String>,
    #[serde(default, deserialize_with = "amount")]
    pub hourly_rate: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub fire_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeDraft {
    pub name: String,
    pub last_name: String,
    pub role_id: Option<EntityId>,
    #[serde(deserialize_with = "amount")]
    pub hourly_rate: String,
    pub construction_site_id: Option<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeField {
    Id,
    Name,
    LastName,
    RoleId,
    Role,
    ConstructionSiteId,
    ConstructionSite,
    HourlyRate,
    Status,
    FireDate,
}

impl FieldSpec for EmployeeField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::LastName,
        Self::RoleId,
        Self::Role,
        Self::ConstructionSiteId,
        Self::ConstructionSite,
        Self::HourlyRate,
        Self::Status,
        Self::FireDate,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::LastName => "last_name",
            Self::RoleId => "role_id",
            Self::Role => "role",
            Self::ConstructionSiteId => "construction_site_id",
            Self::ConstructionSite => "construction_site",
            Self::HourlyRate => "hourly_rate",
            Self::Status => "status",
            Self::FireDate => "fire_date",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id | Self::RoleId | Self::ConstructionSiteId | Self::HourlyRate => {
                FieldKind::Numeric
            }
            _ => FieldKind::Text,
        }
    }
}

impl Entity for Employee {
    type Field = EmployeeField;
    type Draft = EmployeeDraft;
    const KIND: &'static str = "Employee";

    fn id(&self) -> EntityId {
        self.id
    }

    fn get(&self, field: EmployeeField) -> Option<Cow<'_, str>> {
        match field {
            EmployeeField::Id => number(self.id),
            EmployeeField::Name => text(&self.name),
            EmployeeField::LastName => text(&self.last_name),
            EmployeeField::RoleId => self.role_id.and_then(number),
            EmployeeField::Role => opt_text(&self.role),
            EmployeeField::ConstructionSiteId => self.construction_site_id.and_then(number),
            EmployeeField::ConstructionSite => opt_text(&self.construction_site),
            EmployeeField::HourlyRate => text(&self.hourly_rate),
            EmployeeField::Status => opt_text(&self.status),
            EmployeeField::FireDate => opt_text(&self.fire_date),
        }
    }

    fn to_draft(&self) -> EmployeeDraft {
        EmployeeDraft {
            name: self.name.clone(),
            last_name: self.last_name.clone(),
            role_id: self.role_id,
            hourly_rate: self.hourly_rate.clone(),
            construction_site_id: self.construction_site_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Construction site
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionSite {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionSiteDraft {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionSiteField {
    Id,
    Name,
    Address,
}

impl FieldSpec for ConstructionSiteField {
    const ALL: &'static [Self] = &[Self::Id, Self::Name, Self::Address];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Address => "address",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Numeric,
            Self::Name | Self::Address => FieldKind::Text,
        }
    }
}

impl Entity for ConstructionSite {
    type Field = ConstructionSiteField;
    type Draft = ConstructionSiteDraft;
    const KIND: &'static str = "ConstructionSite";

    fn id(&self) -> EntityId {
        self.id
    }

    fn get(&self, field: ConstructionSiteField) -> Option<Cow<'_, str>> {
        match field {
            ConstructionSiteField::Id => number(self.id),
            ConstructionSiteField::Name => text(&self.name),
            ConstructionSiteField::Address => opt_text(&self.address),
        }
    }

    fn to_draft(&self) -> ConstructionSiteDraft {
        ConstructionSiteDraft {
            name: self.name.clone(),
            address: self.address.clone().unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleDraft {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleField {
    Id,
    Name,
}

impl FieldSpec for RoleField {
    const ALL: &'static [Self] = &[Self::Id, Self::Name];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Numeric,
            Self::Name => FieldKind::Text,
        }
    }
}

impl Entity for Role {
    type Field = RoleField;
    type Draft = RoleDraft;
    const KIND: &'static str = "Role";

    fn id(&self) -> EntityId {
        self.id
    }

    fn get(&self, field: RoleField) -> Option<Cow<'_, str>> {
        match field {
            RoleField::Id => number(self.id),
            RoleField::Name => text(&self.name),
        }
    }

    fn to_draft(&self) -> RoleDraft {
        RoleDraft {
            name: self.name.clone(),
        }
    }
}
