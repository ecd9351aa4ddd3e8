pub mod record_store;
pub mod seed;

pub use record_store::{RecordStore, StoreError, ID_FIELD};
