//! SchemaRegistry for mapping table names to EntitySchema implementations.

use crate::domain::model::{
    DepartmentSchema, EmployeeSchema, EntityKind, EntitySchema, LeaveRequestSchema,
};
use std::collections::HashMap;
use std::sync::Arc;

/// A registry that maps table names to their EntitySchema implementations.
#[derive(Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<dyn EntitySchema>>,
}

impl SchemaRegistry {
    /// Creates a new empty SchemaRegistry.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Registry holding the Employee, Department and LeaveRequest schemas.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register(EmployeeSchema);
        reg.register(DepartmentSchema);
        reg.register(LeaveRequestSchema);
        reg
    }

    /// Registers a schema under its table name.
    pub fn register<S: EntitySchema + 'static>(&mut self, schema: S) {
        self.schemas
            .insert(schema.table_name().to_string(), Arc::new(schema));
    }

    /// Retrieves a schema by table name.
    pub fn get(&self, table_name: &str) -> Option<Arc<dyn EntitySchema>> {
        self.schemas.get(table_name).cloned()
    }

    pub fn by_kind(&self, kind: EntityKind) -> Option<Arc<dyn EntitySchema>> {
        self.schemas.values().find(|s| s.kind() == kind).cloned()
    }

    /// Returns all registered table names, sorted.
    pub fn list_tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = self.schemas.keys().cloned().collect();
        tables.sort();
        tables
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
