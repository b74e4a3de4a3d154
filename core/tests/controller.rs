//! Controller behaviour against a scripted transport and a recording host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;

use crud_core::{
    ApiError, ConfigError, CrudController, Employee, EmployeeDraft, EmployeeField, HttpMethod,
    HttpRequest, HttpResponse, Locale, Messages, Modal, Severity, Transport, Translations,
    ViewConfig,
};

mod common;

use common::RecordingHost;

const BASE_URL: &str = "http://localhost:8000";

#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn reply(&self, status: u16, body: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    fn fail(&self, message: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push_back(Err(ApiError::Transport(message.to_string())));
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    fn methods(&self) -> Vec<HttpMethod> {
        self.requests.borrow().iter().map(|r| r.method).collect()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
    }
}

fn config() -> ViewConfig<Employee> {
    ViewConfig {
        endpoint: "employees".to_string(),
        entity_name: "Employé".to_string(),
        form_defaults: EmployeeDraft {
            hourly_rate: "15".to_string(),
            ..EmployeeDraft::default()
        },
        sort_options: vec![EmployeeField::Name, EmployeeField::HourlyRate],
        table_columns: vec![EmployeeField::Name, EmployeeField::HourlyRate],
        search_fields: vec![EmployeeField::Name, EmployeeField::LastName],
        messages: Messages {
            load_error: "Erreur de chargement".to_string(),
            create_success: "Employé créé".to_string(),
            update_success: "Employé mis à jour".to_string(),
            save_error: "Erreur de sauvegarde".to_string(),
            delete_success: "Employé supprimé".to_string(),
            delete_error: "Erreur de suppression".to_string(),
        },
    }
}

type Controller = CrudController<Employee, ScriptedTransport, RecordingHost>;

fn controller() -> Controller {
    CrudController::new(
        config(),
        Arc::new(Translations::builtin(Locale::Fr)),
        BASE_URL,
        ScriptedTransport::default(),
        RecordingHost::new(),
    )
    .unwrap()
}

const TWO_EMPLOYEES: &str = r#"[
    {"id":1,"name":"Amy","last_name":"Pond","hourly_rate":"10"},
    {"id":2,"name":"bob","last_name":"Smith","hourly_rate":"5"}
]"#;

fn body(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
}

fn names(c: &Controller) -> Vec<String> {
    c.filtered_sorted().iter().map(|e| e.name.clone()).collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[tokio::test]
async fn activate_loads_exactly_once() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES);

    c.activate().await;
    c.activate().await;

    assert!(c.is_active());
    assert_eq!(c.transport().methods(), vec![HttpMethod::Get]);
    assert_eq!(c.transport().requests()[0].path, "http://localhost:8000/api/employees");
    assert_eq!(c.items().len(), 2);
    assert_eq!(c.host().loading_calls.get(), 1);
    assert!(!c.host().busy.get());
}

#[tokio::test]
async fn sorted_by_rate_puts_lower_rate_first() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES);
    c.list().await;

    c.set_sort_by(EmployeeField::HourlyRate).unwrap();
    assert_eq!(names(&c), vec!["bob", "Amy"]);

    c.set_sort_by(EmployeeField::Name).unwrap();
    assert_eq!(names(&c), vec!["Amy", "bob"]);
}

#[tokio::test]
async fn search_filters_on_configured_fields() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES);
    c.list().await;

    c.set_search_term("SMI");
    assert_eq!(names(&c), vec!["bob"]);

    c.set_search_term("10");
    assert!(c.filtered_sorted().is_empty(), "hourly_rate is not searchable");
    assert_eq!(c.empty_message(), "Aucun employé ne correspond à votre recherche");
}

#[tokio::test]
async fn failed_reload_keeps_stale_collection() {
    let mut c = controller();
    c.transport()
        .reply(200, TWO_EMPLOYEES)
        .reply(500, r#"{"detail":"Error retrieving employees: db down"}"#);

    c.list().await;
    c.list().await;

    assert_eq!(c.items().len(), 2);
    assert_eq!(
        c.host().last_message(),
        Some((
            "Erreur de chargement: Error retrieving employees: db down".to_string(),
            Severity::Error
        ))
    );
    assert!(!c.host().busy.get());
}

#[tokio::test]
async fn transport_failure_uses_transport_message() {
    let mut c = controller();
    c.transport().fail("Network Error");

    c.list().await;

    assert!(c.items().is_empty());
    assert_eq!(c.empty_message(), "Aucun employé trouvé");
    assert_eq!(
        c.host().last_message(),
        Some(("Erreur de chargement: Network Error".to_string(), Severity::Error))
    );
}

#[tokio::test]
async fn empty_reload_clears_collection() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES).reply(200, "[]");

    c.list().await;
    c.list().await;

    assert!(c.items().is_empty());
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_sends_exactly_the_defaults() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES);
    c.list().await;

    // leftover edit state must not leak into the create
    let amy = c.items()[0].clone();
    c.begin_edit(&amy);
    c.begin_create();
    assert_eq!(c.modal_title(), "Ajouter Employé");
    assert_eq!(c.button_text(), "Créer");

    c.transport()
        .reply(201, r#"{"id":3}"#)
        .reply(200, TWO_EMPLOYEES);
    c.save().await;

    let requests = c.transport().requests();
    assert_eq!(
        c.transport().methods(),
        vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Get]
    );
    assert_eq!(requests[1].path, "http://localhost:8000/api/employees");
    let expected = serde_json::to_value(&config().form_defaults).unwrap();
    assert_eq!(body(&requests[1]), expected);
    assert_eq!(body(&requests[1])["hourly_rate"], "15");

    assert_eq!(c.modal(), &Modal::Closed);
    assert_eq!(
        c.host().last_message(),
        Some(("Employé créé".to_string(), Severity::Success))
    );
}

#[tokio::test]
async fn edit_updates_the_selected_entity() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES);
    c.list().await;

    let bob = c.items()[1].clone();
    c.begin_edit(&bob);
    assert_eq!(c.modal().editing_id(), Some(2));
    assert_eq!(c.modal_title(), "Modifier Employé");
    assert_eq!(c.button_text(), "Mettre à Jour");

    c.draft_mut().unwrap().name = "Robert".to_string();

    c.transport()
        .reply(200, r#"{"success":true,"message":"Employee updated successfully"}"#)
        .reply(200, TWO_EMPLOYEES);
    c.save().await;

    let requests = c.transport().requests();
    assert_eq!(requests[1].method, HttpMethod::Put);
    assert_eq!(requests[1].path, "http://localhost:8000/api/employees/2");
    let sent = body(&requests[1]);
    assert_eq!(sent["name"], "Robert");
    assert_eq!(sent["last_name"], "Smith");
    assert!(sent.get("id").is_none());

    assert!(!c.modal().is_open());
    assert_eq!(requests[2].method, HttpMethod::Get);
    assert_eq!(
        c.host().messages(),
        vec![("Employé mis à jour".to_string(), Severity::Success)]
    );
}

#[tokio::test]
async fn edit_does_not_touch_the_collection_until_reload() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES);
    c.list().await;

    let amy = c.items()[0].clone();
    c.begin_edit(&amy);
    c.draft_mut().unwrap().name = "Changed".to_string();

    assert_eq!(c.items()[0].name, "Amy");
}

#[tokio::test]
async fn failed_save_keeps_modal_and_draft() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES);
    c.list().await;

    let amy = c.items()[0].clone();
    c.begin_edit(&amy);
    c.draft_mut().unwrap().hourly_rate = "-3".to_string();
    let before = c.modal().clone();

    c.transport()
        .reply(422, r#"{"detail":[{"loc":["body","hourly_rate"],"msg":"ensure this value is greater than 0"}]}"#);
    c.save().await;

    assert_eq!(c.modal(), &before);
    assert_eq!(c.draft().unwrap().hourly_rate, "-3");
    assert_eq!(
        c.transport().methods(),
        vec![HttpMethod::Get, HttpMethod::Put],
        "no reload after a failed save"
    );
    assert_eq!(
        c.host().last_message(),
        Some((
            "Erreur de sauvegarde: ensure this value is greater than 0".to_string(),
            Severity::Error
        ))
    );
    assert!(!c.host().busy.get());
}

#[tokio::test]
async fn failed_save_can_be_retried() {
    let mut c = controller();
    c.begin_create();
    c.draft_mut().unwrap().name = "Rory".to_string();

    c.transport().fail("Network Error");
    c.save().await;
    assert!(c.modal().is_open());

    c.transport().reply(201, "{}").reply(200, "[]");
    c.save().await;

    let requests = c.transport().requests();
    assert_eq!(body(&requests[0]), body(&requests[1]));
    assert!(!c.modal().is_open());
}

#[tokio::test]
async fn save_without_open_modal_sends_nothing() {
    let mut c = controller();
    c.save().await;
    assert!(c.transport().requests().is_empty());
    assert!(c.host().messages().is_empty());
}

#[tokio::test]
async fn close_modal_discards_edit_target() {
    let mut c = controller();
    c.transport().reply(200, TWO_EMPLOYEES);
    c.list().await;

    let amy = c.items()[0].clone();
    c.begin_edit(&amy);
    c.close_modal();

    assert_eq!(c.modal(), &Modal::Closed);
    assert!(c.draft().is_none());
    assert!(c.draft_mut().is_none());
    assert_eq!(c.modal_title(), "Ajouter Employé");
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

#[tokio::test]
async fn declined_remove_sends_nothing() {
    let mut c = controller();
    c.host().answer.set(false);

    c.remove(1).await;

    assert!(c.transport().requests().is_empty());
    assert_eq!(c.host().loading_calls.get(), 0);
    assert_eq!(
        c.host().prompts.borrow().as_slice(),
        ["Êtes-vous sûr de vouloir supprimer ce employé? Cette action est irréversible."]
    );
}

#[tokio::test]
async fn confirmed_remove_deletes_once_then_reloads() {
    let mut c = controller();
    c.transport()
        .reply(200, r#"{"success":true}"#)
        .reply(200, r#"[{"id":2,"name":"bob","hourly_rate":"5"}]"#);

    c.remove(1).await;

    let requests = c.transport().requests();
    assert_eq!(
        c.transport().methods(),
        vec![HttpMethod::Delete, HttpMethod::Get]
    );
    assert_eq!(requests[0].path, "http://localhost:8000/api/employees/1");
    assert_eq!(c.items().len(), 1);
    assert_eq!(
        c.host().messages(),
        vec![("Employé supprimé".to_string(), Severity::Success)]
    );
}

#[tokio::test]
async fn failed_remove_reports_detail_without_reload() {
    let mut c = controller();
    c.transport().reply(404, r#"{"detail":"Employee not found"}"#);

    c.remove(7).await;

    assert_eq!(c.transport().methods(), vec![HttpMethod::Delete]);
    assert_eq!(
        c.host().last_message(),
        Some((
            "Erreur de suppression: Employee not found".to_string(),
            Severity::Error
        ))
    );
}

#[tokio::test]
async fn failed_remove_without_detail_uses_status() {
    let mut c = controller();
    c.transport().reply(500, "Internal Server Error");

    c.remove(7).await;

    assert_eq!(
        c.host().last_message(),
        Some((
            "Erreur de suppression: Request failed with status code 500".to_string(),
            Severity::Error
        ))
    );
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn sort_key_must_be_offered() {
    let mut c = controller();
    assert_eq!(c.sort_by(), Some(EmployeeField::Name));
    let err = c.set_sort_by(EmployeeField::Status).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownSortKey(ref key) if key == "status"));
    assert_eq!(c.sort_by(), Some(EmployeeField::Name));
}

#[test]
fn empty_endpoint_is_rejected() {
    let mut cfg = config();
    cfg.endpoint = String::new();
    let result = CrudController::new(
        cfg,
        Arc::new(Translations::default()),
        BASE_URL,
        ScriptedTransport::default(),
        RecordingHost::new(),
    );
    assert!(matches!(result, Err(ConfigError::EmptyEndpoint)));
}

#[test]
fn labels_follow_injected_translations() {
    let c = CrudController::new(
        config(),
        Arc::new(Translations::builtin(Locale::En)),
        BASE_URL,
        ScriptedTransport::default(),
        RecordingHost::new(),
    )
    .unwrap();
    assert_eq!(c.modal_title(), "Add Employé");
    assert_eq!(c.button_text(), "Create");
    assert_eq!(c.empty_message(), "No employé found");
    assert_eq!(c.table_columns(), &[EmployeeField::Name, EmployeeField::HourlyRate]);
    assert_eq!(c.sort_options().len(), 2);
}
