//! View controller for one REST collection.
//!
//! # Design
//! `CrudController` owns the in-memory collection, the search/sort inputs
//! and the modal draft. It never performs I/O itself: requests go through
//! the host's `Transport`, busy state and notifications through the `Host`.
//!
//! Remote failures never escape an operation. Each one is turned into an
//! error notification and the operation completes normally, leaving the
//! collection (on load) or the draft (on save) as it was.
//!
//! The collection changes only when a list request succeeds; a saved draft
//! is never merged into it locally.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::client::ResourceClient;
use crate::config::ViewConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpRequest, HttpResponse};
use crate::translations::Translations;
use crate::types::{Entity, EntityId, FieldSpec};
use crate::view;

/// Notification severity passed to `Host::show_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Executes requests built by the controller.
///
/// Non-2xx responses are returned as `Ok`; only a failure to obtain any
/// response should be reported as `ApiError::Transport`.
#[async_trait(?Send)]
pub trait Transport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// UI capabilities the controller relies on.
#[async_trait(?Send)]
pub trait Host {
    /// Run `operation` while the UI shows a busy state. The busy state must
    /// be cleared however the operation ends.
    async fn with_loading<'a>(&'a self, operation: LocalBoxFuture<'a, ()>);

    fn show_message(&self, text: &str, severity: Severity);

    /// Ask the user to confirm a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// The create/edit dialog. The edit target and its draft live and die
/// together.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal<D> {
    Closed,
    Creating { draft: D },
    Editing { id: EntityId, draft: D },
}

impl<D> Modal<D> {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            Modal::Closed => None,
            Modal::Creating { draft } | Modal::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn editing_id(&self) -> Option<EntityId> {
        match self {
            Modal::Editing { id, .. } => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SaveKind {
    Create,
    Update,
}

pub struct CrudController<E: Entity, T, H> {
    config: ViewConfig<E>,
    translations: Arc<Translations>,
    client: ResourceClient,
    transport: T,
    host: H,
    items: Vec<E>,
    search_term: String,
    sort_by: Option<E::Field>,
    modal: Modal<E::Draft>,
    activated: bool,
}

/// Shared borrows of the parts an in-flight operation reads, split off so
/// the operation can hold `&mut` to the collection at the same time.
struct Remote<'a, E: Entity, T, H> {
    config: &'a ViewConfig<E>,
    client: &'a ResourceClient,
    transport: &'a T,
    host: &'a H,
}

impl<E: Entity, T: Transport, H: Host> Remote<'_, E, T, H> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!("{} {}", request.method, request.path);
        self.transport.execute(request).await
    }

    /// Replace `items` with the remote collection, or notify and keep them.
    async fn reload(&self, items: &mut Vec<E>) {
        let result = match self.send(self.client.build_list()).await {
            Ok(response) => self.client.parse_list::<E>(response),
            Err(err) => Err(err),
        };
        match result {
            Ok(fresh) => {
                debug!("loaded {} {} record(s)", fresh.len(), E::KIND);
                *items = fresh;
            }
            Err(err) => self.notify_failure(&self.config.messages.load_error, &err),
        }
    }

    fn notify_failure(&self, prefix: &str, err: &ApiError) {
        warn!("{} {}: {err}", E::KIND, self.client.collection_url());
        self.host.show_message(
            &format!("{prefix}: {}", err.user_message()),
            Severity::Error,
        );
    }
}

impl<E: Entity, T: Transport, H: Host> CrudController<E, T, H> {
    pub fn new(
        config: ViewConfig<E>,
        translations: Arc<Translations>,
        base_url: &str,
        transport: T,
        host: H,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = ResourceClient::new(base_url, &config.endpoint);
        let sort_by = config.initial_sort();
        Ok(Self {
            config,
            translations,
            client,
            transport,
            host,
            items: Vec::new(),
            search_term: String::new(),
            sort_by,
            modal: Modal::Closed,
            activated: false,
        })
    }

    fn split(&mut self) -> (Remote<'_, E, T, H>, &mut Vec<E>, &mut Modal<E::Draft>) {
        (
            Remote {
                config: &self.config,
                client: &self.client,
                transport: &self.transport,
                host: &self.host,
            },
            &mut self.items,
            &mut self.modal,
        )
    }

    /// Lifecycle hook for the hosting view. The first call loads the
    /// collection; later calls do nothing.
    pub async fn activate(&mut self) {
        if self.activated {
            debug!("{} view already active", E::KIND);
            return;
        }
        self.activated = true;
        self.list().await;
    }

    pub fn is_active(&self) -> bool {
        self.activated
    }

    /// Fetch the whole collection and replace the local copy.
    pub async fn list(&mut self) {
        let (remote, items, _) = self.split();
        let host = remote.host;
        host.with_loading(Box::pin(async move { remote.reload(items).await }))
            .await;
    }

    pub fn filtered_sorted(&self) -> Vec<&E> {
        view::filter_sorted(
            &self.items,
            &self.config.search_fields,
            &self.search_term,
            self.sort_by,
        )
    }

    pub fn begin_create(&mut self) {
        self.modal = Modal::Creating {
            draft: self.config.form_defaults.clone(),
        };
    }

    pub fn begin_edit(&mut self, entity: &E) {
        self.modal = Modal::Editing {
            id: entity.id(),
            draft: entity.to_draft(),
        };
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
    }

    /// Create or update from the open draft, then reload.
    ///
    /// On failure the modal stays open with the draft untouched so the user
    /// can correct it and retry.
    pub async fn save(&mut self) {
        let prepared = match &self.modal {
            Modal::Closed => {
                debug!("save ignored: no {} draft open", E::KIND);
                return;
            }
            Modal::Creating { draft } => self
                .client
                .build_create(draft)
                .map(|request| (request, SaveKind::Create)),
            Modal::Editing { id, draft } => self
                .client
                .build_update(*id, draft)
                .map(|request| (request, SaveKind::Update)),
        };

        let (remote, items, modal) = self.split();
        let host = remote.host;
        host.with_loading(Box::pin(async move {
            let outcome = match prepared {
                Ok((request, kind)) => match remote.send(request).await {
                    Ok(response) => match kind {
                        SaveKind::Create => remote.client.parse_create(response),
                        SaveKind::Update => remote.client.parse_update(response),
                    }
                    .map(|()| kind),
                    Err(err) => Err(err),
                },
                Err(err) => Err(err),
            };
            match outcome {
                Ok(kind) => {
                    let messages = &remote.config.messages;
                    let text = match kind {
                        SaveKind::Create => &messages.create_success,
                        SaveKind::Update => &messages.update_success,
                    };
                    remote.host.show_message(text, Severity::Success);
                    *modal = Modal::Closed;
                    remote.reload(items).await;
                }
                Err(err) => remote.notify_failure(&remote.config.messages.save_error, &err),
            }
        }))
        .await;
    }

    /// Delete `id` after the user confirms, then reload.
    pub async fn remove(&mut self, id: EntityId) {
        let prompt = self
            .translations
            .t_entity("confirmDelete", &self.config.entity_name.to_lowercase());
        if !self.host.confirm(&prompt).await {
            debug!("delete of {} {id} declined", E::KIND);
            return;
        }

        let (remote, items, _) = self.split();
        let host = remote.host;
        host.with_loading(Box::pin(async move {
            let outcome = match remote.send(remote.client.build_delete(id)).await {
                Ok(response) => remote.client.parse_delete(response),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(()) => {
                    remote
                        .host
                        .show_message(&remote.config.messages.delete_success, Severity::Success);
                    remote.reload(items).await;
                }
                Err(err) => remote.notify_failure(&remote.config.messages.delete_error, &err),
            }
        }))
        .await;
    }

    pub fn modal_title(&self) -> String {
        let verb = if self.modal.editing_id().is_some() {
            "edit"
        } else {
            "add"
        };
        format!("{} {}", self.translations.t(verb), self.config.entity_name)
    }

    pub fn button_text(&self) -> &str {
        if self.modal.editing_id().is_some() {
            self.translations.t("update")
        } else {
            self.translations.t("create")
        }
    }

    /// Distinguishes an empty collection from a search with no hits.
    pub fn empty_message(&self) -> String {
        let key = if self.items.is_empty() {
            "noneFound"
        } else {
            "noMatch"
        };
        self.translations
            .t_entity(key, &self.config.entity_name.to_lowercase())
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn sort_by(&self) -> Option<E::Field> {
        self.sort_by
    }

    pub fn set_sort_by(&mut self, key: E::Field) -> Result<(), ConfigError> {
        self.config.ensure_sortable(key)?;
        debug!("{} view sorted by {}", E::KIND, key.name());
        self.sort_by = Some(key);
        Ok(())
    }

    pub fn modal(&self) -> &Modal<E::Draft> {
        &self.modal
    }

    pub fn draft(&self) -> Option<&E::Draft> {
        self.modal.draft()
    }

    pub fn draft_mut(&mut self) -> Option<&mut E::Draft> {
        match &mut self.modal {
            Modal::Closed => None,
            Modal::Creating { draft } | Modal::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn config(&self) -> &ViewConfig<E> {
        &self.config
    }

    pub fn table_columns(&self) -> &[E::Field] {
        &self.config.table_columns
    }

    pub fn sort_options(&self) -> &[E::Field] {
        &self.config.sort_options
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
