//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use staffsync::app::auth::SessionFlag;
use staffsync::app::list_controller::TeardownHandle;
use staffsync::app::notify::{Notification, NotificationKind, NotificationLog};
use staffsync::domain::model::{EntitySchema, Fields};
use staffsync::infra::config::GatewayConfig;
use staffsync::infra::gateway::ListPage;
use staffsync::storage::seed;
use staffsync::transport::http::{create_router, AppState};
use staffsync::{
    Draft, EmployeeSchema, GatewayError, InMemoryGateway, ListMode, ListViewController, Record,
    RecordGateway, RecordId, RecordStore, SchemaRegistry,
};
use staffsync::domain::query::QueryParams;
use staffsync::domain::validate::ValidRecord;

pub fn empty_store() -> Arc<RecordStore> {
    Arc::new(RecordStore::new(SchemaRegistry::with_defaults()))
}

/// Store with the full demo data: 6 departments, 15 employees, 4 leave requests.
pub async fn seeded_store() -> Arc<RecordStore> {
    let store = empty_store();
    seed::seed_demo(&store).await.expect("seed demo data");
    store
}

/// Store holding only the first `n` demo employees (ids 1..=n).
pub async fn store_with_employees(n: usize) -> Arc<RecordStore> {
    let store = empty_store();
    let rows = seed::demo_employees().into_iter().take(n).collect();
    for result in store.create("employee1", rows).await.expect("create") {
        result.expect("demo employee accepted");
    }
    store
}

pub fn valid_employee() -> Draft {
    Draft::new()
        .set("first_name", "Ada")
        .set("last_name", "Lovelace")
        .set("email", "ada@example.com")
        .set("department", "Engineering")
        .set("position", "Analyst")
}

/// Counts calls per operation and forwards to an inner gateway.
pub struct CountingGateway {
    inner: Arc<dyn RecordGateway>,
    pub lists: AtomicUsize,
    pub gets: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl CountingGateway {
    pub fn new(inner: Arc<dyn RecordGateway>) -> Self {
        Self {
            inner,
            lists: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordGateway for CountingGateway {
    async fn list(&self, schema: &dyn EntitySchema, query: &QueryParams) -> Result<ListPage, GatewayError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(schema, query).await
    }

    async fn get_by_id(&self, schema: &dyn EntitySchema, id: RecordId) -> Result<Record, GatewayError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_id(schema, id).await
    }

    async fn create(&self, schema: &dyn EntitySchema, fields: &Fields) -> Result<Record, GatewayError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(schema, fields).await
    }

    async fn update(
        &self,
        schema: &dyn EntitySchema,
        id: RecordId,
        record: &ValidRecord,
    ) -> Result<Record, GatewayError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(schema, id, record).await
    }

    async fn delete(&self, schema: &dyn EntitySchema, id: RecordId) -> Result<bool, GatewayError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(schema, id).await
    }
}

/// Closes the armed view while a call is in flight, then lets the call finish.
pub struct ClosingGateway {
    inner: Arc<dyn RecordGateway>,
    handle: Mutex<Option<TeardownHandle>>,
}

impl ClosingGateway {
    pub fn new(inner: Arc<dyn RecordGateway>) -> Self {
        Self {
            inner,
            handle: Mutex::new(None),
        }
    }

    pub fn arm(&self, handle: TeardownHandle) {
        *self.handle.lock().unwrap() = Some(handle);
    }

    fn close_view(&self) {
        if let Some(handle) = self.handle.lock().unwrap().as_ref() {
            handle.close();
        }
    }
}

#[async_trait]
impl RecordGateway for ClosingGateway {
    async fn list(&self, schema: &dyn EntitySchema, query: &QueryParams) -> Result<ListPage, GatewayError> {
        self.close_view();
        self.inner.list(schema, query).await
    }

    async fn get_by_id(&self, schema: &dyn EntitySchema, id: RecordId) -> Result<Record, GatewayError> {
        self.close_view();
        self.inner.get_by_id(schema, id).await
    }

    async fn create(&self, schema: &dyn EntitySchema, fields: &Fields) -> Result<Record, GatewayError> {
        self.close_view();
        self.inner.create(schema, fields).await
    }

    async fn update(
        &self,
        schema: &dyn EntitySchema,
        id: RecordId,
        record: &ValidRecord,
    ) -> Result<Record, GatewayError> {
        self.close_view();
        self.inner.update(schema, id, record).await
    }

    async fn delete(&self, schema: &dyn EntitySchema, id: RecordId) -> Result<bool, GatewayError> {
        self.close_view();
        self.inner.delete(schema, id).await
    }
}

/// Reads go through to the inner gateway; every write fails as if the
/// connection dropped.
pub struct FailingGateway {
    inner: Arc<dyn RecordGateway>,
}

impl FailingGateway {
    pub fn new(inner: Arc<dyn RecordGateway>) -> Self {
        Self { inner }
    }

    fn refused() -> GatewayError {
        GatewayError::Transport("connection reset by peer".to_string())
    }
}

#[async_trait]
impl RecordGateway for FailingGateway {
    async fn list(&self, schema: &dyn EntitySchema, query: &QueryParams) -> Result<ListPage, GatewayError> {
        self.inner.list(schema, query).await
    }

    async fn get_by_id(&self, schema: &dyn EntitySchema, id: RecordId) -> Result<Record, GatewayError> {
        self.inner.get_by_id(schema, id).await
    }

    async fn create(&self, _schema: &dyn EntitySchema, _fields: &Fields) -> Result<Record, GatewayError> {
        Err(Self::refused())
    }

    async fn update(
        &self,
        _schema: &dyn EntitySchema,
        _id: RecordId,
        _record: &ValidRecord,
    ) -> Result<Record, GatewayError> {
        Err(Self::refused())
    }

    async fn delete(&self, _schema: &dyn EntitySchema, _id: RecordId) -> Result<bool, GatewayError> {
        Err(Self::refused())
    }
}

pub struct Harness {
    pub controller: ListViewController,
    pub log: NotificationLog,
    pub session: SessionFlag,
}

pub fn harness(
    schema: Arc<dyn EntitySchema>,
    gateway: Arc<dyn RecordGateway>,
    mode: ListMode,
    signed_in: bool,
) -> Harness {
    let log = NotificationLog::new();
    let session = SessionFlag::new(signed_in);
    let controller = ListViewController::new(
        schema,
        gateway,
        Arc::new(log.clone()),
        Arc::new(session.clone()),
        mode,
    );
    Harness {
        controller,
        log,
        session,
    }
}

/// Employee list over an in-process store.
pub fn employee_harness(store: Arc<RecordStore>, mode: ListMode) -> Harness {
    harness(
        Arc::new(EmployeeSchema),
        Arc::new(InMemoryGateway::new(store)),
        mode,
        true,
    )
}

pub fn of_kind(log: &NotificationLog, kind: NotificationKind) -> Vec<Notification> {
    log.snapshot().into_iter().filter(|n| n.kind == kind).collect()
}

pub fn names(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.text("name").unwrap_or_default().to_string())
        .collect()
}

/// Serves the record store router on an ephemeral port; returns its base URL.
pub async fn spawn_store(state: AppState) -> String {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

pub fn gateway_config(base_url: &str, public_key: &str) -> GatewayConfig {
    GatewayConfig {
        api_url: base_url.to_string(),
        project_id: "staffsync-test".to_string(),
        public_key: public_key.to_string(),
        timeout: Duration::from_secs(5),
    }
}
