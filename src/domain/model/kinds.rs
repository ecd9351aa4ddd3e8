use super::{EntityKind, EntitySchema, FieldKind, FieldSpec, FieldValue, Fields};
use crate::domain::query::state::{SortDirection, SortSpec};
use crate::domain::validate::ValidationError;

pub const EMPLOYEE_STATUSES: &[&str] = &["active", "on leave", "inactive", "terminated"];
pub const LEAVE_TYPES: &[&str] = &["Vacation", "Sick Leave", "Personal", "Maternity", "Training"];
pub const LEAVE_STATUSES: &[&str] = &["pending", "approved", "rejected"];

const EMPLOYEE_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("name", "Name", FieldKind::Text),
    FieldSpec::required("first_name", "first_name", FieldKind::Text),
    FieldSpec::required("last_name", "last_name", FieldKind::Text),
    FieldSpec::required("email", "email", FieldKind::Email),
    FieldSpec::required("department", "department", FieldKind::Text),
    FieldSpec::required("position", "position", FieldKind::Text),
    FieldSpec::optional("status", "status", FieldKind::Choice(EMPLOYEE_STATUSES))
        .with_default("active"),
    FieldSpec::optional("hire_date", "hire_date", FieldKind::Date),
];

/// Schema for the Employee table.
pub struct EmployeeSchema;

impl EntitySchema for EmployeeSchema {
    fn kind(&self) -> EntityKind {
        EntityKind::Employee
    }

    fn table_name(&self) -> &str {
        "employee1"
    }

    fn label(&self) -> &str {
        "Employee"
    }

    fn fields(&self) -> &[FieldSpec] {
        EMPLOYEE_FIELDS
    }

    fn search_fields(&self) -> &[&'static str] {
        &["name", "email", "position"]
    }

    fn filter_dimensions(&self) -> &[&'static str] {
        &["department", "status"]
    }

    fn default_sort(&self) -> SortSpec {
        SortSpec::new("name", SortDirection::Asc)
    }

    fn normalize(&self, fields: &mut Fields) {
        // The display name is always rebuilt from its parts.
        let first = fields.get("first_name").and_then(FieldValue::as_text);
        let last = fields.get("last_name").and_then(FieldValue::as_text);
        if let (Some(first), Some(last)) = (first, last) {
            let name = format!("{} {}", first, last);
            fields.insert("name".to_string(), FieldValue::Text(name));
        }
    }
}

const DEPARTMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", "Name", FieldKind::Text),
    FieldSpec::required("manager", "manager", FieldKind::Text),
    FieldSpec::optional("budget", "budget", FieldKind::Text),
    FieldSpec::optional("description", "description", FieldKind::Text),
];

/// Schema for the Department table.
pub struct DepartmentSchema;

impl EntitySchema for DepartmentSchema {
    fn kind(&self) -> EntityKind {
        EntityKind::Department
    }

    fn table_name(&self) -> &str {
        "department"
    }

    fn label(&self) -> &str {
        "Department"
    }

    fn fields(&self) -> &[FieldSpec] {
        DEPARTMENT_FIELDS
    }

    fn search_fields(&self) -> &[&'static str] {
        &["name", "manager"]
    }

    fn filter_dimensions(&self) -> &[&'static str] {
        &[]
    }

    fn default_sort(&self) -> SortSpec {
        SortSpec::new("name", SortDirection::Asc)
    }
}

const LEAVE_REQUEST_FIELDS: &[FieldSpec] = &[
    FieldSpec::required(
        "employee_id",
        "employee_id",
        FieldKind::Reference(EntityKind::Employee),
    ),
    FieldSpec::required("leave_type", "leave_type", FieldKind::Choice(LEAVE_TYPES)),
    FieldSpec::required("start_date", "start_date", FieldKind::Date),
    FieldSpec::required("end_date", "end_date", FieldKind::Date),
    FieldSpec::optional("status", "status", FieldKind::Choice(LEAVE_STATUSES))
        .with_default("pending"),
    FieldSpec::optional("reason", "reason", FieldKind::Text),
];

/// Schema for the LeaveRequest table.
pub struct LeaveRequestSchema;

impl EntitySchema for LeaveRequestSchema {
    fn kind(&self) -> EntityKind {
        EntityKind::LeaveRequest
    }

    fn table_name(&self) -> &str {
        "leave_request"
    }

    fn label(&self) -> &str {
        "Leave request"
    }

    fn fields(&self) -> &[FieldSpec] {
        LEAVE_REQUEST_FIELDS
    }

    fn search_fields(&self) -> &[&'static str] {
        &["leave_type", "reason"]
    }

    fn filter_dimensions(&self) -> &[&'static str] {
        &["leave_type", "status"]
    }

    fn default_sort(&self) -> SortSpec {
        SortSpec::new("start_date", SortDirection::Desc)
    }

    fn validate_record(&self, fields: &Fields) -> Result<(), ValidationError> {
        let start = fields.get("start_date").and_then(FieldValue::as_date);
        let end = fields.get("end_date").and_then(FieldValue::as_date);
        match (start, end) {
            (Some(start), Some(end)) if end < start => Err(ValidationError::InvalidDateRange {
                start: "start_date".to_string(),
                end: "end_date".to_string(),
            }),
            _ => Ok(()),
        }
    }
}
