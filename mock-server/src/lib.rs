use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstructionSite {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Employee as listed: the stored row plus joined role and site names.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub role_id: i64,
    pub role: String,
    pub construction_site_id: i64,
    pub construction_site: String,
    /// Decimal column, serialized as text with two fraction digits.
    pub hourly_rate: String,
    pub status: String,
    pub fire_date: Option<String>,
}

#[derive(Clone, Debug)]
struct EmployeeRow {
    name: String,
    last_name: String,
    role_id: i64,
    construction_site_id: i64,
    hourly_rate: f64,
    status: String,
    fire_date: Option<String>,
}

#[derive(Deserialize)]
pub struct RoleRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ConstructionSiteRequest {
    pub name: String,
    pub address: String,
}

#[derive(Deserialize)]
pub struct EmployeeRequest {
    pub name: String,
    pub last_name: String,
    pub role_id: i64,
    #[serde(deserialize_with = "rate")]
    pub hourly_rate: f64,
    pub construction_site_id: i64,
}

/// Accepts `12.5` or `"12.5"`, as form inputs send either.
fn rate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid hourly_rate `{s}`"))),
    }
}

/// Error body carrying a human-readable `detail`.
#[derive(Debug)]
pub struct Detail {
    status: StatusCode,
    detail: String,
}

impl Detail {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn invalid(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    fn not_found(entity: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{entity} not found"))
    }

    fn conflict(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, detail)
    }
}

impl IntoResponse for Detail {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<JsonRejection> for Detail {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

#[derive(Debug, Default)]
pub struct Store {
    roles: BTreeMap<i64, Role>,
    sites: BTreeMap<i64, ConstructionSite>,
    employees: BTreeMap<i64, EmployeeRow>,
    role_seq: i64,
    site_seq: i64,
    employee_seq: i64,
}

impl Store {
    fn employee(&self, id: i64, row: &EmployeeRow) -> Employee {
        Employee {
            id,
            name: row.name.clone(),
            last_name: row.last_name.clone(),
            role_id: row.role_id,
            role: self
                .roles
                .get(&row.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_default(),
            construction_site_id: row.construction_site_id,
            construction_site: self
                .sites
                .get(&row.construction_site_id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            hourly_rate: format!("{:.2}", row.hourly_rate),
            status: row.status.clone(),
            fire_date: row.fire_date.clone(),
        }
    }

    fn check_employee(&self, input: &EmployeeRequest) -> Result<(), Detail> {
        check_len("name", &input.name, 100)?;
        check_len("last_name", &input.last_name, 100)?;
        if input.role_id <= 0 || input.construction_site_id <= 0 {
            return Err(Detail::invalid("role_id and construction_site_id must be greater than 0"));
        }
        if !(input.hourly_rate.is_finite() && input.hourly_rate > 0.0) {
            return Err(Detail::invalid("hourly_rate must be greater than 0"));
        }
        if !self.roles.contains_key(&input.role_id) {
            return Err(Detail::invalid(format!("role {} does not exist", input.role_id)));
        }
        if !self.sites.contains_key(&input.construction_site_id) {
            return Err(Detail::invalid(format!(
                "construction site {} does not exist",
                input.construction_site_id
            )));
        }
        Ok(())
    }

    fn check_role_name(&self, name: &str, except: Option<i64>) -> Result<(), Detail> {
        check_len("name", name, 100)?;
        let taken = self
            .roles
            .iter()
            .any(|(id, role)| role.name == name && Some(*id) != except);
        if taken {
            return Err(Detail::conflict(format!("Role '{name}' already exists")));
        }
        Ok(())
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), Detail> {
    let len = value.trim().chars().count();
    if len == 0 || value.chars().count() > max {
        return Err(Detail::invalid(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(())
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/health", get(health))
        .route("/api/roles", get(list_roles).post(create_role))
        .route("/api/roles/{id}", put(update_role).delete(delete_role))
        .route("/api/construction-sites", get(list_sites).post(create_site))
        .route(
            "/api/construction-sites/{id}",
            put(update_site).delete(delete_site),
        )
        .route("/api/employees", get(list_employees).post(create_employee))
        .route(
            "/api/employees/{id}",
            put(update_employee).delete(delete_employee),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

fn deleted(entity: &str) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": format!("{entity} deleted successfully") }))
}

// --- roles ---

async fn list_roles(State(db): State<Db>) -> Json<Vec<Role>> {
    let store = db.read().await;
    let mut roles: Vec<Role> = store.roles.values().cloned().collect();
    roles.sort_by(|a, b| a.name.cmp(&b.name));
    Json(roles)
}

async fn create_role(
    State(db): State<Db>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Role>), Detail> {
    let Json(input) = payload?;
    let mut store = db.write().await;
    store.check_role_name(&input.name, None)?;
    store.role_seq += 1;
    let role = Role {
        id: store.role_seq,
        name: input.name,
    };
    store.roles.insert(role.id, role.clone());
    debug!("created role {}", role.id);
    Ok((StatusCode::CREATED, Json(role)))
}

async fn update_role(
    State(db): State<Db>,
    Path(id): Path<i64>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Json<Role>, Detail> {
    let Json(input) = payload?;
    let mut store = db.write().await;
    if !store.roles.contains_key(&id) {
        return Err(Detail::not_found("Role"));
    }
    store.check_role_name(&input.name, Some(id))?;
    let role = Role {
        id,
        name: input.name,
    };
    store.roles.insert(id, role.clone());
    Ok(Json(role))
}

async fn delete_role(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, Detail> {
    let mut store = db.write().await;
    if !store.roles.contains_key(&id) {
        return Err(Detail::not_found("Role"));
    }
    if store.employees.values().any(|e| e.role_id == id) {
        return Err(Detail::conflict("Role is still assigned to employees"));
    }
    store.roles.remove(&id);
    debug!("deleted role {id}");
    Ok(deleted("Role"))
}

// --- construction sites ---

async fn list_sites(State(db): State<Db>) -> Json<Vec<ConstructionSite>> {
    let store = db.read().await;
    let mut sites: Vec<ConstructionSite> = store.sites.values().cloned().collect();
    sites.sort_by(|a, b| a.name.cmp(&b.name));
    Json(sites)
}

fn check_site(input: &ConstructionSiteRequest) -> Result<(), Detail> {
    check_len("name", &input.name, 200)?;
    check_len("address", &input.address, 500)
}

async fn create_site(
    State(db): State<Db>,
    payload: Result<Json<ConstructionSiteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConstructionSite>), Detail> {
    let Json(input) = payload?;
    check_site(&input)?;
    let mut store = db.write().await;
    store.site_seq += 1;
    let site = ConstructionSite {
        id: store.site_seq,
        name: input.name,
        address: input.address,
    };
    store.sites.insert(site.id, site.clone());
    debug!("created construction site {}", site.id);
    Ok((StatusCode::CREATED, Json(site)))
}

async fn update_site(
    State(db): State<Db>,
    Path(id): Path<i64>,
    payload: Result<Json<ConstructionSiteRequest>, JsonRejection>,
) -> Result<Json<ConstructionSite>, Detail> {
    let Json(input) = payload?;
    check_site(&input)?;
    let mut store = db.write().await;
    let site = store
        .sites
        .get_mut(&id)
        .ok_or_else(|| Detail::not_found("Construction site"))?;
    site.name = input.name;
    site.address = input.address;
    Ok(Json(site.clone()))
}

async fn delete_site(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, Detail> {
    let mut store = db.write().await;
    if !store.sites.contains_key(&id) {
        return Err(Detail::not_found("Construction site"));
    }
    if store.employees.values().any(|e| e.construction_site_id == id) {
        return Err(Detail::conflict(
            "Construction site is still assigned to employees",
        ));
    }
    store.sites.remove(&id);
    debug!("deleted construction site {id}");
    Ok(deleted("Construction site"))
}

// --- employees ---

async fn list_employees(State(db): State<Db>) -> Json<Vec<Employee>> {
    let store = db.read().await;
    let mut employees: Vec<Employee> = store
        .employees
        .iter()
        .map(|(id, row)| store.employee(*id, row))
        .collect();
    employees.sort_by(|a, b| (&a.name, &a.last_name).cmp(&(&b.name, &b.last_name)));
    Json(employees)
}

async fn create_employee(
    State(db): State<Db>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), Detail> {
    let Json(input) = payload?;
    let mut store = db.write().await;
    store.check_employee(&input)?;
    store.employee_seq += 1;
    let id = store.employee_seq;
    let row = EmployeeRow {
        name: input.name,
        last_name: input.last_name,
        role_id: input.role_id,
        construction_site_id: input.construction_site_id,
        hourly_rate: input.hourly_rate,
        status: "active".to_string(),
        fire_date: None,
    };
    let created = store.employee(id, &row);
    store.employees.insert(id, row);
    debug!("created employee {id}");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_employee(
    State(db): State<Db>,
    Path(id): Path<i64>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<Json<Employee>, Detail> {
    let Json(input) = payload?;
    let mut store = db.write().await;
    if !store.employees.contains_key(&id) {
        return Err(Detail::not_found("Employee"));
    }
    store.check_employee(&input)?;
    let row = store
        .employees
        .get_mut(&id)
        .ok_or_else(|| Detail::not_found("Employee"))?;
    row.name = input.name;
    row.last_name = input.last_name;
    row.role_id = input.role_id;
    row.construction_site_id = input.construction_site_id;
    row.hourly_rate = input.hourly_rate;
    let row = row.clone();
    Ok(Json(store.employee(id, &row)))
}

async fn delete_employee(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, Detail> {
    let mut store = db.write().await;
    store
        .employees
        .remove(&id)
        .ok_or_else(|| Detail::not_found("Employee"))?;
    debug!("deleted employee {id}");
    Ok(deleted("Employee"))
}
