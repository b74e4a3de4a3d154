//! Client-side CRUD controller for REST collections.
//!
//! # Overview
//! A `CrudController` keeps a local copy of one collection (`/api/{resource}`),
//! derives a searched and sorted view of it, and drives create/edit/delete
//! through a modal draft. Requests are built and parsed here but executed by
//! the host (host-does-IO pattern), so every state transition can be tested
//! against a scripted transport.
//!
//! # Design
//! - `ResourceClient` is stateless: `build_*` produces a request, `parse_*`
//!   consumes the response.
//! - Entities expose their fields through an enumerated table
//!   (`Entity::Field`), which is what view configs refer to.
//! - UI strings come from an injected `Translations` table.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod translations;
pub mod types;
pub mod view;

pub use client::ResourceClient;
pub use config::{Messages, ViewConfig};
pub use controller::{CrudController, Host, Modal, Severity, Transport};
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use translations::{Locale, Translations};
pub use types::{
    ConstructionSite, ConstructionSiteDraft, ConstructionSiteField, Employee, EmployeeDraft,
    EmployeeField, Entity, EntityId, FieldKind, FieldSpec, Role, RoleDraft, RoleField,
};
