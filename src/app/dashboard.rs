//! Headline numbers for the dashboard landing page.

use crate::domain::model::{DepartmentSchema, EmployeeSchema, EntitySchema, LeaveRequestSchema};
use crate::domain::query::{Condition, QueryParams};
use crate::infra::gateway::{GatewayError, RecordGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_employees: usize,
    pub departments: usize,
    pub on_leave: usize,
    pub pending_leave_requests: usize,
}

/// One count query per figure; the store reports totals regardless of page size.
pub async fn load_stats(gateway: &dyn RecordGateway) -> Result<DashboardStats, GatewayError> {
    let total_employees = count(gateway, &EmployeeSchema, Vec::new()).await?;
    let departments = count(gateway, &DepartmentSchema, Vec::new()).await?;
    let on_leave = count(
        gateway,
        &EmployeeSchema,
        vec![exact(&EmployeeSchema, "status", "on leave")],
    )
    .await?;
    let pending_leave_requests = count(
        gateway,
        &LeaveRequestSchema,
        vec![exact(&LeaveRequestSchema, "status", "pending")],
    )
    .await?;

    Ok(DashboardStats {
        total_employees,
        departments,
        on_leave,
        pending_leave_requests,
    })
}

async fn count(
    gateway: &dyn RecordGateway,
    schema: &dyn EntitySchema,
    conditions: Vec<Condition>,
) -> Result<usize, GatewayError> {
    let page = gateway.list(schema, &QueryParams::count(conditions)).await?;
    Ok(page.total)
}

fn exact(schema: &dyn EntitySchema, field: &str, value: &str) -> Condition {
    let wire = schema.field(field).map(|f| f.wire_name).unwrap_or(field);
    Condition::exact(wire, value)
}
