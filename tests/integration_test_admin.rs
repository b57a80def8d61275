use journee_proches::controllers::admin_console::AdminConsole;
use journee_proches::controllers::registration_form::RegistrationFormController;
use journee_proches::domain::models::admin::NewAdmin;
use journee_proches::domain::models::personnel::AllowedAgent;
use journee_proches::domain::models::session::Role;
use journee_proches::domain::models::slot::{Capacity, Remaining, SlotLabel};
use journee_proches::error::{AppError, ValidationError};
use serde_json::json;

mod common;
use common::{TestApp, ADMIN_ID};

fn label(s: &str) -> SlotLabel {
    s.parse().unwrap()
}

async fn mounted_console(app: &TestApp) -> AdminConsole {
    let mut console = AdminConsole::new(app.state.clone(), &app.cancel);
    console.mount().await.expect("Failed to mount admin console");
    console
}

#[tokio::test]
async fn test_admin_console_requires_admin_role() {
    for role in [Role::Agent, Role::Staff] {
        let app = TestApp::with_role(role).await;
        let mut console = AdminConsole::new(app.state.clone(), &app.cancel);

        assert!(matches!(console.mount().await, Err(AppError::Forbidden(_))));
        assert!(matches!(console.allow_list().await, Err(AppError::Forbidden(_))));
        assert_eq!(app.stub.request_count(), 0);
    }
}

#[tokio::test]
async fn test_overview_lists_slots_and_lunches() {
    let app = TestApp::with_role(Role::Admin).await;
    app.stub.seed_registration("AG001", 2, "09:00");
    app.stub.seed_registration("AG002", 0, "09:00");
    app.stub.data().registrations.get_mut("AG001").unwrap().restauration_sur_place = true;

    let console = mounted_console(&app).await;

    let summaries = console.slot_summaries();
    assert_eq!(summaries.len(), 6);
    let nine = summaries.iter().find(|s| s.label == label("09:00")).unwrap();
    assert_eq!(nine.agents, 2);
    assert_eq!(nine.persons, 4);
    assert_eq!(nine.remaining, Remaining::Seats(10));
    assert_eq!(nine.lunches, 3);

    let three = summaries.iter().find(|s| s.label == label("15:00")).unwrap();
    assert!(three.restricted);
    assert_eq!(three.capacity, Capacity::Unlimited);

    assert_eq!(console.registrations().len(), 2);
    assert_eq!(console.filter_registrations("ag002").len(), 1);
    assert_eq!(console.filter_registrations("").len(), 2);
}

#[tokio::test]
async fn test_capacity_change_is_reflected_after_refresh() {
    let app = TestApp::with_role(Role::Admin).await;
    let mut console = mounted_console(&app).await;

    console.set_capacity(label("16:00"), Capacity::Limited(25)).await.unwrap();
    assert_eq!(app.stub.data().slots["16:00"].capacity, 25);
    assert_eq!(console.board().unwrap().get(label("16:00")).unwrap().capacity, Capacity::Limited(25));

    console.set_capacity(label("16:00"), Capacity::Unlimited).await.unwrap();
    assert_eq!(app.stub.data().slots["16:00"].capacity, 999);
    assert_eq!(console.board().unwrap().get(label("16:00")).unwrap().remaining(), Remaining::Unlimited);
}

#[tokio::test]
async fn test_unknown_slot_is_rejected_locally() {
    let app = TestApp::with_role(Role::Admin).await;
    let mut console = mounted_console(&app).await;
    let before = app.stub.request_count();

    let err = console.block(label("07:30"), None).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(app.stub.request_count(), before);
}

#[tokio::test]
async fn test_block_and_unblock_slot() {
    let app = TestApp::with_role(Role::Admin).await;
    let mut console = mounted_console(&app).await;

    console.block(label("11:00"), Some("  Travaux  ")).await.unwrap();
    let slot = console.board().unwrap().get(label("11:00")).unwrap();
    assert!(slot.is_blocked());
    assert_eq!(slot.block_reason(), Some("Travaux"));

    // Agents now see it disabled.
    let agent = TestApp::new().await;
    agent.stub.data().slots.get_mut("11:00").unwrap().blocked = true;
    let mut form = RegistrationFormController::new(agent.state.clone(), &agent.cancel);
    form.mount().await.unwrap();
    let choice = form.slot_choices().into_iter().find(|c| c.label == label("11:00")).unwrap();
    assert!(!choice.selectable);

    console.unblock(label("11:00")).await.unwrap();
    assert!(!console.board().unwrap().get(label("11:00")).unwrap().is_blocked());
    assert!(app.stub.data().slots["11:00"].block_reason.is_none());
}

#[tokio::test]
async fn test_explicit_flag_overrides_legacy_restriction() {
    let app = TestApp::with_role(Role::Admin).await;
    let mut console = mounted_console(&app).await;

    console.set_restricted(label("15:00"), false).await.unwrap();
    assert!(!console.board().unwrap().get(label("15:00")).unwrap().restricted);

    console.set_restricted(label("10:00"), true).await.unwrap();
    assert!(console.board().unwrap().get(label("10:00")).unwrap().restricted);
    assert_eq!(app.stub.data().slots["10:00"].admin_only, Some(true));
}

#[tokio::test]
async fn test_delete_registration_frees_seats() {
    let app = TestApp::with_role(Role::Admin).await;
    app.stub.seed_registration("AG001", 3, "14:00");
    let mut console = mounted_console(&app).await;
    assert_eq!(console.board().unwrap().get(label("14:00")).unwrap().registered_persons, 4);

    console.delete_registration("AG001").await.unwrap();
    assert!(console.registrations().is_empty());
    assert_eq!(console.board().unwrap().get(label("14:00")).unwrap().registered_persons, 0);

    // The remote envelope reports the second delete as a failure.
    let err = console.delete_registration("AG001").await.unwrap_err();
    assert!(matches!(err, AppError::Rejected(_)));
}

#[tokio::test]
async fn test_allow_list_management() {
    let app = TestApp::with_role(Role::Admin).await;
    let console = mounted_console(&app).await;

    let added = console
        .add_allowed_agent(AllowedAgent {
            staff_code: " ag777 ".into(),
            last_name: " Durand ".into(),
            first_name: "Paul".into(),
            service: Some("  ".into()),
        })
        .await
        .unwrap();
    assert_eq!(added.staff_code, "AG777");
    assert_eq!(added.last_name, "Durand");
    assert_eq!(added.service, None);

    let listed = console.allow_list().await.unwrap();
    assert_eq!(listed, vec![added]);

    let err = console
        .add_allowed_agent(AllowedAgent {
            staff_code: "x".into(),
            last_name: "D".into(),
            first_name: "Paul".into(),
            service: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.validation_errors().len(), 2);

    console.remove_allowed_agent("AG777").await.unwrap();
    assert!(console.allow_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_accounts() {
    let app = TestApp::with_role(Role::Admin).await;
    app.stub.data().admins.push(json!({ "id": ADMIN_ID, "email": "root@mairie.fr" }));
    let console = mounted_console(&app).await;

    let created = console
        .create_admin(NewAdmin { email: " Chef@Mairie.FR ".into(), password: "s3cretpass".into() })
        .await
        .unwrap();
    assert_eq!(created.email, "chef@mairie.fr");
    assert_eq!(console.admins().await.unwrap().len(), 2);

    let err = console
        .create_admin(NewAdmin { email: "not-an-email".into(), password: "short".into() })
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_errors(),
        &[ValidationError::InvalidEmail, ValidationError::PasswordTooShort { min: 8 }]
    );

    assert!(matches!(console.delete_admin(ADMIN_ID).await, Err(AppError::Forbidden(_))));
    console.delete_admin(&created.id).await.unwrap();
    assert_eq!(console.admins().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_codes_and_ids_stay_inside_their_endpoint() {
    let app = TestApp::with_role(Role::Admin).await;
    let mut console = mounted_console(&app).await;
    let before = app.stub.request_count();

    for result in [
        console.delete_registration("../creneaux").await,
        console.remove_allowed_agent("AG1/../x").await,
    ] {
        assert!(matches!(result.unwrap_err().validation_errors(), [ValidationError::InvalidStaffCode { .. }]));
    }
    assert_eq!(app.stub.request_count(), before);

    // Account ids are not personnel codes; they go out as one escaped segment.
    console.delete_admin("adm/../2").await.unwrap();
    assert_eq!(
        app.stub.requests().last().map(String::as_str),
        Some("DELETE /admin/administrateurs/adm%2F..%2F2")
    );
}
