//! Demo data for the dev record store.

use serde_json::{json, Value as JsonValue};

use crate::storage::record_store::{RecordStore, StoreError};

const EMPLOYEES: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("John", "Doe", "john.doe@example.com", "Engineering", "Senior Developer", "active"),
    ("Jane", "Smith", "jane.smith@example.com", "Marketing", "Marketing Manager", "active"),
    ("Robert", "Johnson", "robert.j@example.com", "Engineering", "Developer", "inactive"),
    ("Lisa", "Wong", "lisa.wong@example.com", "HR", "HR Specialist", "on leave"),
    ("Michael", "Brown", "michael.b@example.com", "Design", "UX Designer", "active"),
    ("Emma", "Wilson", "emma.w@example.com", "Finance", "Financial Analyst", "active"),
    ("James", "Taylor", "james.t@example.com", "Engineering", "QA Engineer", "on leave"),
    ("Sophia", "Chen", "sophia.c@example.com", "Marketing", "Content Writer", "active"),
    ("David", "Park", "david.p@example.com", "Sales", "Sales Representative", "inactive"),
    ("Olivia", "Davis", "olivia.d@example.com", "HR", "Recruiter", "active"),
    ("William", "Lee", "william.l@example.com", "Engineering", "DevOps Engineer", "active"),
    ("Grace", "Kim", "grace.k@example.com", "Finance", "Accountant", "on leave"),
    ("Samuel", "White", "samuel.w@example.com", "Design", "Graphic Designer", "active"),
    ("Natalie", "Green", "natalie.g@example.com", "Marketing", "SEO Specialist", "inactive"),
    ("Thomas", "Martin", "thomas.m@example.com", "Sales", "Sales Manager", "on leave"),
];

const DEPARTMENTS: &[(&str, &str, &str)] = &[
    ("Engineering", "John Doe", "$1.2M"),
    ("Human Resources", "Jane Smith", "$450K"),
    ("Marketing", "Mark Johnson", "$780K"),
    ("Finance", "Sarah Williams", "$950K"),
    ("Design", "Michael Brown", "$400K"),
    ("Sales", "Thomas Martin", "$1.1M"),
];

/// Employee rows in wire form, in insertion order.
pub fn demo_employees() -> Vec<JsonValue> {
    EMPLOYEES
        .iter()
        .map(|(first, last, email, department, position, status)| {
            json!({
                "Name": format!("{} {}", first, last),
                "first_name": first,
                "last_name": last,
                "email": email,
                "department": department,
                "position": position,
                "status": status,
            })
        })
        .collect()
}

pub fn demo_departments() -> Vec<JsonValue> {
    DEPARTMENTS
        .iter()
        .map(|(name, manager, budget)| {
            json!({
                "Name": name,
                "manager": manager,
                "budget": budget,
            })
        })
        .collect()
}

/// Leave requests referencing the first employees created by [`seed_demo`].
pub fn demo_leave_requests() -> Vec<JsonValue> {
    vec![
        json!({"employee_id": 4, "leave_type": "Vacation", "start_date": "2023-06-10", "end_date": "2023-06-17", "status": "approved"}),
        json!({"employee_id": 7, "leave_type": "Sick Leave", "start_date": "2023-06-12", "end_date": "2023-06-14", "status": "approved"}),
        json!({"employee_id": 12, "leave_type": "Personal", "start_date": "2023-06-08", "end_date": "2023-06-15", "status": "pending"}),
        json!({"employee_id": 15, "leave_type": "Training", "start_date": "2023-06-11", "end_date": "2023-06-13", "status": "pending", "reason": "Sales onboarding"}),
    ]
}

/// Loads the demo tables into an empty store.
pub async fn seed_demo(store: &RecordStore) -> Result<(), StoreError> {
    for (table, rows) in [
        ("department", demo_departments()),
        ("employee1", demo_employees()),
        ("leave_request", demo_leave_requests()),
    ] {
        for result in store.create(table, rows).await? {
            result?;
        }
    }
    Ok(())
}
