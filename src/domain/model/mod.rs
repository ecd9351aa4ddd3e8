//! Entity schemas and canonical record shapes.

pub mod kinds;
pub mod record;
pub mod registry;

pub use kinds::{DepartmentSchema, EmployeeSchema, LeaveRequestSchema};
pub use record::{Draft, FieldValue, Fields, Record, RecordId};
pub use registry::SchemaRegistry;

use crate::domain::query::state::SortSpec;
use crate::domain::validate::ValidationError;
use std::fmt;
use std::str::FromStr;

/// The entity kinds the dashboard manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Employee,
    Department,
    LeaveRequest,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Employee,
        EntityKind::Department,
        EntityKind::LeaveRequest,
    ];

    /// Collection name used on the command line (`employees`, `departments`, `leave-requests`).
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employees",
            EntityKind::Department => "departments",
            EntityKind::LeaveRequest => "leave-requests",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "employee" | "employees" => Ok(EntityKind::Employee),
            "department" | "departments" => Ok(EntityKind::Department),
            "leave" | "leave-request" | "leave-requests" | "leave_request" => {
                Ok(EntityKind::LeaveRequest)
            }
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

/// Scalar type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    /// One of a fixed set of options (compared exactly).
    Choice(&'static [&'static str]),
    /// Calendar date, `YYYY-MM-DD` on the wire.
    Date,
    /// Id of a record of another kind.
    Reference(EntityKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical name used inside the crate.
    pub name: &'static str,
    /// Name used by the hosted record store.
    pub wire_name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Applied when the draft leaves the field blank.
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, wire_name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire_name,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, wire_name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire_name,
            kind,
            required: false,
            default: None,
        }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Contract every entity kind implements.
///
/// The controller, validator and gateways work with any kind through this
/// trait. Each schema provides:
/// - the table name on the hosted store
/// - its fields, with canonical and wire names
/// - list settings (search fields, filter dimensions, default sort, page size)
/// - optional normalization and cross-field validation hooks
pub trait EntitySchema: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Name of the collection on the hosted record store.
    fn table_name(&self) -> &str;

    /// Human-readable singular label used in notifications ("Employee").
    fn label(&self) -> &str;

    fn fields(&self) -> &[FieldSpec];

    /// Fields the free-text search term is matched against.
    fn search_fields(&self) -> &[&'static str];

    /// Dimensions available as categorical filters.
    fn filter_dimensions(&self) -> &[&'static str];

    fn default_sort(&self) -> SortSpec;

    fn page_size(&self) -> usize {
        10
    }

    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }

    fn field_by_wire_name(&self, wire_name: &str) -> Option<&FieldSpec> {
        self.fields().iter().find(|f| f.wire_name == wire_name)
    }

    /// Fills derived fields after the draft has been parsed.
    ///
    /// Default implementation does nothing.
    fn normalize(&self, _fields: &mut Fields) {}

    /// Cross-field checks run after every per-field check has passed.
    ///
    /// Default implementation accepts everything.
    fn validate_record(&self, _fields: &Fields) -> Result<(), ValidationError> {
        Ok(())
    }
}
