//! List state, local projection and the remote query shape.

pub mod projection;
pub mod state;
pub mod wire;

pub use projection::{project, Projection, SortKey};
pub use state::{total_pages, FilterValue, ListState, SortDirection, SortSpec, ALL};
pub use wire::{Condition, Operator, OrderBy, PagingInfo, QueryParams};
