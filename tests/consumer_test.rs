mod common;

use acme_board::model::Consumer;
use axum::http::{Method, StatusCode};
use common::{send, start, ALICE, BOB};
use crud_framework::{Principal, Role};

const CREATE: &str = "/authenticated/consumer/create";
const UPDATE: &str = "/authenticated/consumer/update";

#[tokio::test]
async fn test_full_registration_integration() {
    let system = start();
    let app = system.router();

    // Blank form for a fresh registration
    let form = send(&app, Method::GET, CREATE, Some(ALICE), None).await;
    assert_eq!(form.status, StatusCode::OK);
    assert_eq!(form.json(), serde_json::json!({ "company": "", "sector": "" }));

    let created = send(
        &app,
        Method::POST,
        CREATE,
        Some(ALICE),
        Some(r#"{"company": "Acme", "sector": "Tools"}"#),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let stored = system.consumers().find_all().await.expect("store should answer");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].username, "alice");
    assert_eq!(stored[0].company, "Acme");
    assert!(system.grants().roles_of("alice").contains(Consumer::NAME));

    // Registered consumers cannot register again
    let again = send(
        &app,
        Method::POST,
        CREATE,
        Some(ALICE),
        Some(r#"{"company": "Other", "sector": "Other"}"#),
    )
    .await;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);

    let current = send(&app, Method::GET, UPDATE, Some(ALICE), None).await;
    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.json(), serde_json::json!({ "company": "Acme", "sector": "Tools" }));

    let updated = send(
        &app,
        Method::POST,
        UPDATE,
        Some(ALICE),
        Some(r#"{"sector": "Hardware"}"#),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(
        updated.json(),
        serde_json::json!({ "company": "Acme", "sector": "Hardware" })
    );

    let stored = system.consumers().find_all().await.expect("store should answer");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sector, "Hardware");
}

#[tokio::test]
async fn test_concurrent_registrations_store_one_consumer() {
    let system = start();
    let app = system.router();
    let body = Some(r#"{"company": "Acme", "sector": "Tools"}"#);

    let (first, second) = tokio::join!(
        send(&app, Method::POST, CREATE, Some(ALICE), body),
        send(&app, Method::POST, CREATE, Some(ALICE), body),
    );

    let statuses = [first.status, second.status];
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1,
        "exactly one registration wins: {statuses:?}"
    );
    let stored = system.consumers().find_all().await.expect("store should answer");
    assert_eq!(stored.len(), 1);
    assert!(system.grants().roles_of("alice").contains(Consumer::NAME));

    let stats = system.transactions().stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.active), (1, 1, 0));
}

#[tokio::test]
async fn test_registration_requires_authentication() {
    let system = start();
    let app = system.router();

    let anonymous = send(
        &app,
        Method::POST,
        CREATE,
        None,
        Some(r#"{"company": "Acme", "sector": "Tools"}"#),
    )
    .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert!(system.consumers().find_all().await.expect("store should answer").is_empty());
}

#[tokio::test]
async fn test_update_requires_consumer_role() {
    let system = start();
    let app = system.router();

    let update = send(&app, Method::POST, UPDATE, Some(BOB), Some(r#"{"sector": "x"}"#)).await;
    assert_eq!(update.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_incomplete_registration_is_rejected() {
    let system = start();
    let app = system.router();

    let rejected = send(&app, Method::POST, CREATE, Some(BOB), Some(r#"{"sector": "Tools"}"#)).await;
    assert_eq!(rejected.status, StatusCode::NON_AUTHORITATIVE_INFORMATION);
    assert_eq!(rejected.error_fields(), ["company"]);

    assert!(system.consumers().find_all().await.expect("store should answer").is_empty());
    assert!(system.grants().roles_of("bob").is_empty());
}

#[tokio::test]
async fn test_query_parameters_are_bound() {
    let system = start();
    let app = system.router();

    let created = send(
        &app,
        Method::POST,
        "/authenticated/consumer/create?company=Acme&sector=Tools",
        Some(BOB),
        None,
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let stored = system.consumers().find_all().await.expect("store should answer");
    assert_eq!(stored[0].username, "bob");
    assert_eq!(stored[0].company, "Acme");
}

#[tokio::test]
async fn test_unregistered_commands_are_not_routed() {
    let system = start();
    let app = system.router();

    let delete = send(&app, Method::POST, "/authenticated/consumer/delete", Some(ALICE), None).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_consumer_is_a_role() {
    let principal = Principal::authenticated("alice", [Consumer::NAME]);
    assert!(principal.has_role::<Consumer>());
}
