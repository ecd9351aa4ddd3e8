//! The list view controller.
//!
//! One controller owns the filter/sort/page state of one entity list and
//! mediates every change to that list:
//! 1.  State mutators (`set_search_term`, `set_filter`, `set_sort`,
//!     `go_to_page`) only touch [`ListState`]; `refresh()` derives the page.
//! 2.  In local mode the whole collection is fetched once and projected in
//!     memory; in remote mode every refresh is a gateway query.
//! 3.  Mutations validate, call the gateway, then reconcile the cached rows.
//!     Each mutation emits exactly one notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::app::auth::AuthSession;
use crate::app::notify::{Notification, Notifier};
use crate::domain::model::{Draft, EntitySchema, Record, RecordId};
use crate::domain::query::{project, total_pages, FilterValue, ListState, QueryParams};
use crate::domain::validate::{validate_draft, ValidationError};
use crate::infra::gateway::{GatewayError, ListPage, RecordGateway};

/// Page size used when local mode pulls the whole collection.
const BULK_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Fetch everything once; search, filter, sort and page in memory.
    Local,
    /// Send the state to the gateway on every refresh.
    ///
    /// The store has no OR across fields, so the search term only matches the
    /// schema's first search field (e.g. `name` for employees). Local mode
    /// matches any search field, so the two modes can disagree on a search.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    /// Nothing loaded yet (or cleared by logout).
    Idle,
    Loading,
    /// At least one row matches.
    Ready,
    /// Loaded, but nothing matches.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("You must be signed in to do that")]
    NotAuthenticated,

    #[error("The view was closed before the request completed")]
    Closed,

    #[error("{label} {id} could not be deleted")]
    DeleteRejected { label: String, id: RecordId },
}

/// Marks a controller as torn down from outside, e.g. when the user leaves
/// the view while a request is still running.
#[derive(Debug, Clone, Default)]
pub struct TeardownHandle {
    closed: Arc<AtomicBool>,
}

impl TeardownHandle {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct ListViewController {
    schema: Arc<dyn EntitySchema>,
    gateway: Arc<dyn RecordGateway>,
    notifier: Arc<dyn Notifier>,
    auth: Arc<dyn AuthSession>,
    mode: ListMode,
    state: ListState,
    /// Whole collection (local) or the last fetched page (remote).
    records: Vec<Record>,
    visible: Vec<Record>,
    match_count: usize,
    loaded: bool,
    status: ViewStatus,
    teardown: TeardownHandle,
}

impl ListViewController {
    pub fn new(
        schema: Arc<dyn EntitySchema>,
        gateway: Arc<dyn RecordGateway>,
        notifier: Arc<dyn Notifier>,
        auth: Arc<dyn AuthSession>,
        mode: ListMode,
    ) -> Self {
        let state = ListState::new(schema.as_ref());
        Self {
            schema,
            gateway,
            notifier,
            auth,
            mode,
            state,
            records: Vec::new(),
            visible: Vec::new(),
            match_count: 0,
            loaded: false,
            status: ViewStatus::Idle,
            teardown: TeardownHandle::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.state = self.state.with_page_size(page_size);
        self
    }

    /// Starts the view pre-filtered, e.g. employees with `status = on leave`.
    pub fn with_filter(mut self, dimension: &str, value: &str) -> Self {
        self.state.set_filter(dimension, FilterValue::parse(value));
        self
    }

    pub fn schema(&self) -> &Arc<dyn EntitySchema> {
        &self.schema
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// Rows of the current page.
    pub fn visible(&self) -> &[Record] {
        &self.visible
    }

    /// Cached rows backing the view.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.match_count, self.state.page_size())
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        self.teardown.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.teardown.is_closed()
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.state.set_search_term(term);
    }

    pub fn set_filter(&mut self, dimension: &str, value: &str) {
        self.state.set_filter(dimension, FilterValue::parse(value));
    }

    pub fn set_sort(&mut self, field: &str) {
        self.state.set_sort(field);
    }

    /// Moves to `page` if it exists in the last derived result. Out-of-range
    /// pages are ignored. Call `refresh()` afterwards to load the page.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        let total = self.total_pages();
        self.state.go_to_page(page, total)
    }

    /// Re-derives the visible page from the current state.
    pub async fn refresh(&mut self) -> Result<(), ControllerError> {
        let result = self.try_refresh().await;
        self.report_failure(&result);
        result
    }

    /// Drops cached rows and fetches again.
    pub async fn reload(&mut self) -> Result<(), ControllerError> {
        self.loaded = false;
        self.refresh().await
    }

    /// Loads a single record for a detail view.
    pub async fn fetch_record(&mut self, id: RecordId) -> Result<Record, ControllerError> {
        let result = self.try_fetch_record(id).await;
        self.report_failure(&result);
        result
    }

    pub async fn add_record(&mut self, draft: &Draft) -> Result<Record, ControllerError> {
        let result = self.try_add(draft).await;
        let message = format!("{} added successfully", self.schema.label());
        self.report(&result, message);
        result
    }

    pub async fn update_record(
        &mut self,
        id: RecordId,
        draft: &Draft,
    ) -> Result<Record, ControllerError> {
        let result = self.try_update(id, draft).await;
        let message = format!("{} updated successfully", self.schema.label());
        self.report(&result, message);
        result
    }

    pub async fn remove_record(&mut self, id: RecordId) -> Result<(), ControllerError> {
        let result = self.try_remove(id).await;
        let message = format!("{} deleted successfully", self.schema.label());
        self.report(&result, message);
        result
    }

    /// Signs out through the auth session and forgets cached rows.
    pub fn logout(&mut self) {
        self.auth.logout();
        self.records.clear();
        self.visible.clear();
        self.match_count = 0;
        self.loaded = false;
        self.status = ViewStatus::Idle;
        self.notifier.notify(Notification::info("Signed out"));
    }

    async fn try_refresh(&mut self) -> Result<(), ControllerError> {
        self.ensure_ready()?;
        match self.mode {
            ListMode::Local => {
                if !self.loaded {
                    self.status = ViewStatus::Loading;
                    self.fetch_all().await?;
                }
                self.derive_local();
                Ok(())
            }
            ListMode::Remote => {
                self.status = ViewStatus::Loading;
                self.fetch_remote_page().await
            }
        }
    }

    async fn try_fetch_record(&mut self, id: RecordId) -> Result<Record, ControllerError> {
        self.ensure_ready()?;
        let result = self.gateway.get_by_id(self.schema.as_ref(), id).await;
        self.ensure_open()?;
        Ok(result?)
    }

    async fn try_add(&mut self, draft: &Draft) -> Result<Record, ControllerError> {
        self.ensure_ready()?;
        let valid = validate_draft(self.schema.as_ref(), draft)?;
        if self.mode == ListMode::Local && !self.loaded {
            // The new row joins the cache, so the cache must hold the collection.
            self.fetch_all().await?;
        }

        let created = self.gateway.create(self.schema.as_ref(), &valid.fields).await;
        self.ensure_open()?;
        let record = created?;

        self.state.reset_page();
        match self.mode {
            ListMode::Local => {
                self.records.push(record.clone());
                self.derive_local();
            }
            ListMode::Remote => self.refetch_after_mutation().await,
        }
        Ok(record)
    }

    async fn try_update(&mut self, id: RecordId, draft: &Draft) -> Result<Record, ControllerError> {
        self.ensure_ready()?;
        let valid = validate_draft(self.schema.as_ref(), draft)?;

        let updated = self
            .gateway
            .update(self.schema.as_ref(), id, &valid)
            .await;
        self.ensure_open()?;
        let record = match updated {
            Ok(record) => record,
            Err(e) => {
                if e.is_not_found() {
                    self.reconcile().await;
                }
                return Err(e.into());
            }
        };

        replace_by_id(&mut self.records, &record);
        match self.mode {
            ListMode::Local => self.derive_local(),
            ListMode::Remote => replace_by_id(&mut self.visible, &record),
        }
        Ok(record)
    }

    async fn try_remove(&mut self, id: RecordId) -> Result<(), ControllerError> {
        self.ensure_ready()?;

        let deleted = self.gateway.delete(self.schema.as_ref(), id).await;
        self.ensure_open()?;
        match deleted {
            Ok(true) => {}
            Ok(false) => {
                return Err(ControllerError::DeleteRejected {
                    label: self.schema.label().to_string(),
                    id,
                })
            }
            Err(e) => {
                if e.is_not_found() {
                    self.reconcile().await;
                }
                return Err(e.into());
            }
        }

        self.records.retain(|r| r.id != id);
        self.visible.retain(|r| r.id != id);
        match self.mode {
            ListMode::Local => self.derive_local(),
            ListMode::Remote => {
                self.match_count = self.match_count.saturating_sub(1);
                self.refetch_after_mutation().await;
            }
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ControllerError> {
        if self.teardown.is_closed() {
            tracing::debug!(table = self.schema.table_name(), "ignoring response for closed view");
            return Err(ControllerError::Closed);
        }
        Ok(())
    }

    /// Open and signed in; the gate in front of every gateway call.
    fn ensure_ready(&self) -> Result<(), ControllerError> {
        self.ensure_open()?;
        if !self.auth.is_authenticated() {
            return Err(ControllerError::NotAuthenticated);
        }
        Ok(())
    }

    /// Local mode: pulls the whole collection page by page.
    async fn fetch_all(&mut self) -> Result<(), ControllerError> {
        let mut all = Vec::new();
        loop {
            let query = QueryParams::page(BULK_PAGE_SIZE, all.len());
            let page = self.gateway.list(self.schema.as_ref(), &query).await;
            self.ensure_open()?;
            let page = page?;
            let fetched = page.records.len();
            all.extend(page.records);
            if fetched == 0 || all.len() >= page.total {
                break;
            }
        }
        self.records = all;
        self.loaded = true;
        Ok(())
    }

    fn derive_local(&mut self) {
        let mut projection = project(&self.records, self.schema.as_ref(), &self.state);
        if self.state.current_page() > projection.total_pages {
            self.state.clamp_page(projection.total_pages);
            projection = project(&self.records, self.schema.as_ref(), &self.state);
        }
        self.visible = projection.rows;
        self.match_count = projection.match_count;
        self.status = self.loaded_status();
    }

    async fn fetch_remote_page(&mut self) -> Result<(), ControllerError> {
        let mut query = QueryParams::from_state(self.schema.as_ref(), &self.state);
        let mut page = self.fetch_page(&query).await?;

        let pages = total_pages(page.total, self.state.page_size());
        if self.state.current_page() > pages {
            self.state.clamp_page(pages);
            query = QueryParams::from_state(self.schema.as_ref(), &self.state);
            page = self.fetch_page(&query).await?;
        }

        self.match_count = page.total;
        self.visible = page.records.clone();
        self.records = page.records;
        self.loaded = true;
        self.status = self.loaded_status();
        Ok(())
    }

    async fn fetch_page(
        &self,
        query: &QueryParams,
    ) -> Result<ListPage, ControllerError> {
        let page = self.gateway.list(self.schema.as_ref(), query).await;
        self.ensure_open()?;
        Ok(page?)
    }

    /// The mutation already succeeded, so a failed follow-up fetch is only
    /// recorded on the view, not reported as a second notification.
    async fn refetch_after_mutation(&mut self) {
        if let Err(e) = self.fetch_remote_page().await {
            tracing::warn!(table = self.schema.table_name(), "refresh after mutation failed: {e}");
            self.status = ViewStatus::Failed(e.to_string());
        }
    }

    /// Reloads after a stale id so the view matches the store again.
    async fn reconcile(&mut self) {
        self.loaded = false;
        if let Err(e) = self.try_refresh().await {
            tracing::warn!(table = self.schema.table_name(), "reconcile failed: {e}");
            self.status = ViewStatus::Failed(e.to_string());
        }
    }

    fn loaded_status(&self) -> ViewStatus {
        if self.match_count == 0 {
            ViewStatus::Empty
        } else {
            ViewStatus::Ready
        }
    }

    fn report<T>(&mut self, result: &Result<T, ControllerError>, success: String) {
        match result {
            Ok(_) => self.notifier.notify(Notification::success(success)),
            Err(_) => self.report_failure(result),
        }
    }

    /// One error notification per failed operation. Closed views stay silent.
    fn report_failure<T>(&mut self, result: &Result<T, ControllerError>) {
        let Err(e) = result else {
            return;
        };
        match e {
            ControllerError::Closed => {}
            ControllerError::Gateway(inner) => {
                tracing::warn!(table = self.schema.table_name(), "gateway call failed: {inner}");
                if matches!(self.status, ViewStatus::Loading) {
                    self.status = ViewStatus::Failed(inner.to_string());
                }
                self.notifier.notify(Notification::error(e.to_string()));
            }
            _ => self.notifier.notify(Notification::error(e.to_string())),
        }
    }
}

/// Swaps in `record` at the position of the row with the same id.
fn replace_by_id(rows: &mut [Record], record: &Record) {
    if let Some(slot) = rows.iter_mut().find(|r| r.id == record.id) {
        *slot = record.clone();
    }
}
