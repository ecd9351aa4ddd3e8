//! List view controller over an in-process store, local projection mode.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use staffsync::app::list_controller::ControllerError;
use staffsync::app::notify::NotificationKind;
use staffsync::domain::validate::ValidationError;
use staffsync::{
    Draft, EmployeeSchema, GatewayError, InMemoryGateway, LeaveRequestSchema, ListMode, Record,
    RecordId, RecordStore, ViewStatus,
};

use common::{
    employee_harness, harness, names, of_kind, seeded_store, store_with_employees, valid_employee,
    ClosingGateway, CountingGateway, FailingGateway, Harness,
};

#[tokio::test]
async fn refresh_loads_the_first_page() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    assert_eq!(h.controller.status(), &ViewStatus::Idle);

    h.controller.refresh().await.unwrap();

    assert_eq!(h.controller.status(), &ViewStatus::Ready);
    assert_eq!(h.controller.records().len(), 15);
    assert_eq!(h.controller.visible().len(), 10);
    assert_eq!(h.controller.match_count(), 15);
    assert_eq!(h.controller.total_pages(), 2);
    assert!(h.log.snapshot().is_empty(), "reads are silent");
}

#[tokio::test]
async fn local_mode_fetches_once() {
    let counting = Arc::new(CountingGateway::new(Arc::new(InMemoryGateway::new(
        seeded_store().await,
    ))));
    let mut h = harness(Arc::new(EmployeeSchema), counting.clone(), ListMode::Local, true);

    h.controller.refresh().await.unwrap();
    h.controller.set_search_term("engineer");
    h.controller.refresh().await.unwrap();
    h.controller.set_filter("status", "on leave");
    h.controller.refresh().await.unwrap();

    assert_eq!(counting.lists.load(Ordering::SeqCst), 1);
    assert_eq!(names(h.controller.visible()), vec!["James Taylor"]);

    h.controller.reload().await.unwrap();
    assert_eq!(counting.lists.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_result_is_reported_as_empty() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    h.controller.set_search_term("nobody");
    h.controller.refresh().await.unwrap();
    assert_eq!(h.controller.status(), &ViewStatus::Empty);
    assert_eq!(h.controller.total_pages(), 1);
}

#[tokio::test]
async fn preset_filter_shows_employees_on_leave() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    h.controller = h.controller.with_filter("status", "on leave");

    h.controller.refresh().await.unwrap();
    assert_eq!(
        names(h.controller.visible()),
        vec!["Grace Kim", "James Taylor", "Lisa Wong", "Thomas Martin"]
    );
}

#[tokio::test]
async fn invalid_email_never_reaches_the_gateway() {
    let counting = Arc::new(CountingGateway::new(Arc::new(InMemoryGateway::new(
        seeded_store().await,
    ))));
    let mut h = harness(Arc::new(EmployeeSchema), counting.clone(), ListMode::Local, true);
    h.controller.refresh().await.unwrap();

    let err = h
        .controller
        .add_record(&valid_employee().set("email", "ada-at-example.com"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Validation(ValidationError::InvalidEmail { .. })
    ));
    assert_eq!(counting.writes(), 0);
    let errors = of_kind(&h.log, NotificationKind::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Please enter a valid email address");
    assert!(of_kind(&h.log, NotificationKind::Success).is_empty());
    assert_eq!(h.controller.records().len(), 15);
}

#[tokio::test]
async fn missing_fields_produce_one_generic_error() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    h.controller.refresh().await.unwrap();

    let err = h
        .controller
        .add_record(&Draft::new().set("first_name", "Ada"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Validation(ValidationError::MissingFields { .. })
    ));
    let all = h.log.snapshot();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].message, "All fields are required");
}

#[tokio::test]
async fn add_appends_and_returns_to_page_one() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    h.controller.refresh().await.unwrap();
    assert!(h.controller.go_to_page(2));
    h.controller.refresh().await.unwrap();

    let created = h.controller.add_record(&valid_employee()).await.unwrap();

    assert_eq!(created.id, RecordId(16));
    assert_eq!(created.text("name"), Some("Ada Lovelace"));
    assert_eq!(created.text("status"), Some("active"));
    assert_eq!(h.controller.current_page(), 1);
    assert_eq!(h.controller.records().len(), 16);
    assert_eq!(h.controller.match_count(), 16);
    // "Ada Lovelace" sorts first by name.
    assert_eq!(h.controller.visible()[0].id, RecordId(16));

    let all = h.log.snapshot();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].kind, NotificationKind::Success);
    assert_eq!(all[0].message, "Employee added successfully");
}

#[tokio::test]
async fn update_replaces_the_record_in_place() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    h.controller.refresh().await.unwrap();

    let target = h.controller.visible()[3].clone();
    let position_in_cache = h
        .controller
        .records()
        .iter()
        .position(|r| r.id == target.id)
        .unwrap();

    let draft = Draft::from_record(&target).set("position", "Staff Engineer");
    let updated = h.controller.update_record(target.id, &draft).await.unwrap();

    assert_eq!(updated.text("position"), Some("Staff Engineer"));
    assert_eq!(h.controller.visible()[3].id, target.id);
    assert_eq!(
        h.controller.visible()[3].text("position"),
        Some("Staff Engineer")
    );
    assert_eq!(h.controller.records()[position_in_cache].id, target.id);
    assert_eq!(h.controller.records().len(), 15);

    let all = h.log.snapshot();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].message, "Employee updated successfully");
}

#[tokio::test]
async fn remove_drops_the_record() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    h.controller.refresh().await.unwrap();

    h.controller.remove_record(RecordId(1)).await.unwrap();

    assert_eq!(h.controller.records().len(), 14);
    assert!(h.controller.records().iter().all(|r| r.id != RecordId(1)));
    assert!(!names(h.controller.visible()).contains(&"John Doe".to_string()));
    let all = h.log.snapshot();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].message, "Employee deleted successfully");
}

#[tokio::test]
async fn deleting_the_only_row_of_the_last_page_moves_back() {
    let mut h = employee_harness(store_with_employees(11).await, ListMode::Local);
    h.controller.refresh().await.unwrap();
    assert!(h.controller.go_to_page(2));
    h.controller.refresh().await.unwrap();
    assert_eq!(names(h.controller.visible()), vec!["William Lee"]);

    let id = h.controller.visible()[0].id;
    h.controller.remove_record(id).await.unwrap();

    assert_eq!(h.controller.current_page(), 1);
    assert_eq!(h.controller.total_pages(), 1);
    assert_eq!(h.controller.visible().len(), 10);
}

#[tokio::test]
async fn stale_update_reloads_the_list() {
    let store = seeded_store().await;
    let mut h = employee_harness(store.clone(), ListMode::Local);
    h.controller.refresh().await.unwrap();

    let target = h.controller.visible()[0].clone();
    store.delete("employee1", &[target.id]).await.unwrap();

    let err = h
        .controller
        .update_record(target.id, &Draft::from_record(&target))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ControllerError::Gateway(GatewayError::NotFound { .. })
    ));
    assert_eq!(h.controller.records().len(), 14);
    assert!(h.controller.records().iter().all(|r| r.id != target.id));
    assert_eq!(of_kind(&h.log, NotificationKind::Error).len(), 1);
}

#[tokio::test]
async fn signed_out_sessions_cannot_touch_data() {
    let counting = Arc::new(CountingGateway::new(Arc::new(InMemoryGateway::new(
        seeded_store().await,
    ))));
    let mut h = harness(Arc::new(EmployeeSchema), counting.clone(), ListMode::Local, false);

    assert_eq!(
        h.controller.refresh().await.unwrap_err(),
        ControllerError::NotAuthenticated
    );
    assert_eq!(
        h.controller.add_record(&valid_employee()).await.unwrap_err(),
        ControllerError::NotAuthenticated
    );
    assert_eq!(counting.lists.load(Ordering::SeqCst), 0);
    assert_eq!(counting.writes(), 0);
    assert_eq!(of_kind(&h.log, NotificationKind::Error).len(), 2);

    h.session.login();
    h.controller.refresh().await.unwrap();
    assert_eq!(h.controller.records().len(), 15);
}

#[tokio::test]
async fn logout_clears_the_view() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    h.controller.refresh().await.unwrap();

    h.controller.logout();

    assert!(h.controller.records().is_empty());
    assert!(h.controller.visible().is_empty());
    assert_eq!(h.controller.status(), &ViewStatus::Idle);
    let info = of_kind(&h.log, NotificationKind::Info);
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].message, "Signed out");
    assert_eq!(
        h.controller.refresh().await.unwrap_err(),
        ControllerError::NotAuthenticated
    );
}

#[tokio::test]
async fn responses_after_teardown_are_ignored() {
    let closing = Arc::new(ClosingGateway::new(Arc::new(InMemoryGateway::new(
        seeded_store().await,
    ))));
    let mut h = harness(Arc::new(EmployeeSchema), closing.clone(), ListMode::Local, true);
    closing.arm(h.controller.teardown_handle());

    assert_eq!(h.controller.refresh().await.unwrap_err(), ControllerError::Closed);
    assert!(h.controller.is_closed());
    assert!(h.controller.records().is_empty());
    assert!(h.controller.visible().is_empty());
    assert!(h.log.snapshot().is_empty());
}

#[tokio::test]
async fn mutation_finishing_after_teardown_is_silent() {
    let store = seeded_store().await;
    let closing = Arc::new(ClosingGateway::new(Arc::new(InMemoryGateway::new(
        store.clone(),
    ))));
    let mut h = harness(Arc::new(EmployeeSchema), closing.clone(), ListMode::Local, true);
    h.controller.refresh().await.unwrap();
    closing.arm(h.controller.teardown_handle());

    let err = h.controller.add_record(&valid_employee()).await.unwrap_err();

    assert_eq!(err, ControllerError::Closed);
    assert!(h.log.snapshot().is_empty());
    // The store still took the write; only the view ignored the answer.
    assert_eq!(store.counts().await, vec![
        ("department".to_string(), 6),
        ("employee1".to_string(), 16),
        ("leave_request".to_string(), 4),
    ]);
}

#[tokio::test]
async fn leave_requests_use_their_own_schema() {
    let store = seeded_store().await;
    let mut h = harness(
        Arc::new(LeaveRequestSchema),
        Arc::new(InMemoryGateway::new(store)),
        ListMode::Local,
        true,
    );
    h.controller.refresh().await.unwrap();

    // Newest start date first.
    let starts: Vec<String> = h
        .controller
        .visible()
        .iter()
        .map(|r| r.get("start_date").unwrap().to_string())
        .collect();
    assert_eq!(starts, vec!["2023-06-12", "2023-06-11", "2023-06-10", "2023-06-08"]);

    let err = h
        .controller
        .add_record(
            &Draft::new()
                .set("employee_id", "4")
                .set("leave_type", "Vacation")
                .set("start_date", "2024-05-10")
                .set("end_date", "2024-05-01"),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Validation(ValidationError::InvalidDateRange { .. })
    ));

    h.controller.set_filter("status", "pending");
    h.controller.refresh().await.unwrap();
    assert_eq!(h.controller.match_count(), 2);
}

#[tokio::test]
async fn fetch_record_reads_one_row() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);
    let record = h.controller.fetch_record(RecordId(4)).await.unwrap();
    assert_eq!(record.text("name"), Some("Lisa Wong"));
    assert_eq!(record.text("status"), Some("on leave"));

    let err = h.controller.fetch_record(RecordId(99)).await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Gateway(GatewayError::NotFound { .. })
    ));
    assert_eq!(of_kind(&h.log, NotificationKind::Error).len(), 1);
}

fn failing_harness(store: Arc<RecordStore>) -> Harness {
    let failing = Arc::new(FailingGateway::new(Arc::new(InMemoryGateway::new(store))));
    harness(Arc::new(EmployeeSchema), failing, ListMode::Local, true)
}

/// Cached rows, visible rows and page, for before/after comparisons.
fn view_of(h: &Harness) -> (Vec<Record>, Vec<Record>, usize) {
    (
        h.controller.records().to_vec(),
        h.controller.visible().to_vec(),
        h.controller.current_page(),
    )
}

#[tokio::test]
async fn rejected_add_leaves_the_view_alone() {
    let mut h = failing_harness(seeded_store().await);
    h.controller.refresh().await.unwrap();
    assert!(h.controller.go_to_page(2));
    h.controller.refresh().await.unwrap();
    let before = view_of(&h);

    let err = h.controller.add_record(&valid_employee()).await.unwrap_err();

    assert!(matches!(err, ControllerError::Gateway(GatewayError::Transport(_))));
    assert_eq!(view_of(&h), before);
    assert_eq!(h.controller.current_page(), 2);
    let all = h.log.snapshot();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].kind, NotificationKind::Error);
}

#[tokio::test]
async fn rejected_update_leaves_the_view_alone() {
    let mut h = failing_harness(seeded_store().await);
    h.controller.refresh().await.unwrap();
    let before = view_of(&h);

    let target = h.controller.visible()[0].clone();
    let draft = Draft::from_record(&target).set("position", "Staff Engineer");
    let err = h.controller.update_record(target.id, &draft).await.unwrap_err();

    assert!(matches!(err, ControllerError::Gateway(GatewayError::Transport(_))));
    assert_eq!(view_of(&h), before);
    assert_eq!(h.log.snapshot().len(), 1);
    assert_eq!(of_kind(&h.log, NotificationKind::Error).len(), 1);
}

#[tokio::test]
async fn rejected_remove_leaves_the_view_alone() {
    let mut h = failing_harness(seeded_store().await);
    h.controller.refresh().await.unwrap();
    let before = view_of(&h);

    let id = h.controller.visible()[0].id;
    let err = h.controller.remove_record(id).await.unwrap_err();

    assert!(matches!(err, ControllerError::Gateway(GatewayError::Transport(_))));
    assert_eq!(view_of(&h), before);
    assert_eq!(h.controller.match_count(), 15);
    assert_eq!(h.log.snapshot().len(), 1);
    assert_eq!(of_kind(&h.log, NotificationKind::Error).len(), 1);
}

#[tokio::test]
async fn add_before_the_first_refresh_loads_the_collection() {
    let mut h = employee_harness(seeded_store().await, ListMode::Local);

    let created = h.controller.add_record(&valid_employee()).await.unwrap();

    assert_eq!(created.id, RecordId(16));
    assert_eq!(h.controller.records().len(), 16);
    assert_eq!(h.controller.match_count(), 16);
    assert_eq!(h.controller.total_pages(), 2);
    assert_eq!(h.controller.status(), &ViewStatus::Ready);
    assert_eq!(h.log.snapshot().len(), 1);
}

#[tokio::test]
async fn blanking_an_optional_field_clears_it() {
    let store = seeded_store().await;
    let mut h = harness(
        Arc::new(LeaveRequestSchema),
        Arc::new(InMemoryGateway::new(store.clone())),
        ListMode::Local,
        true,
    );
    h.controller.refresh().await.unwrap();

    let target = h
        .controller
        .records()
        .iter()
        .find(|r| r.text("reason") == Some("Sales onboarding"))
        .cloned()
        .unwrap();
    let draft = Draft::from_record(&target).set("reason", "");
    let updated = h.controller.update_record(target.id, &draft).await.unwrap();

    assert_eq!(updated.get("reason"), None);
    assert_eq!(updated.text("leave_type"), Some("Training"));
    let cached = h
        .controller
        .records()
        .iter()
        .find(|r| r.id == target.id)
        .unwrap();
    assert_eq!(cached.get("reason"), None);

    let row = store.get("leave_request", target.id).await.unwrap();
    assert!(row.get("reason").is_none(), "stored row still has {row}");
    assert_eq!(row["status"], "pending");
    assert_eq!(of_kind(&h.log, NotificationKind::Success).len(), 1);
}
