pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::list_controller::{ListMode, ListViewController, ViewStatus};
pub use domain::model::{
    DepartmentSchema, Draft, EmployeeSchema, EntityKind, EntitySchema, LeaveRequestSchema, Record,
    RecordId, SchemaRegistry,
};
pub use infra::gateway::{GatewayError, InMemoryGateway, RecordGateway};
pub use storage::RecordStore;
pub use transport::http::HttpGateway;
