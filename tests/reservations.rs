use axum::http::{Method, StatusCode};
use serde_json::json;

use hotel_booking::auth::Scope;
use hotel_booking::db::{PaymentRepository, ReservationRepository};

mod common;

use common::TestApp;

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, alice_id) = app.register("Alice", "alice@hotel.test").await;
    let (bob, _) = app.register("Bob", "bob@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;

    let (status, created) = app.reserve(&alice, &room, "2025-06-01", "2025-06-03").await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].clone();

    let (status, bobs) = app.call(Method::GET, "/api/reservations", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bobs, json!([]));

    let (_, alices) = app.call(Method::GET, "/api/reservations", Some(&alice), None).await;
    assert_eq!(alices.as_array().map(Vec::len), Some(1));
    assert_eq!(alices[0]["room"]["id"], room.as_str());
    assert!(alices[0].get("user").is_none());

    let (_, all) = app.call(Method::GET, "/api/reservations", Some(&admin), None).await;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
    assert_eq!(all[0]["id"], id);
    assert_eq!(all[0]["user"]["id"], alice_id.as_str());
    assert_eq!(all[0]["room"]["name"], "A");
}

#[tokio::test]
async fn new_reservation_is_pending_and_owned_by_caller() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, alice_id) = app.register("Alice", "alice@hotel.test").await;
    let (_, bob_id) = app.register("Bob", "bob@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;

    let (status, created) = app
        .call(
            Method::POST,
            "/api/reservations",
            Some(&alice),
            Some(json!({
                "user_id": bob_id,
                "room_id": room,
                "check_in": "2025-06-01T05:00:00.000Z",
                "check_out": "2025-06-04",
                "total_price": 300,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["user_id"], alice_id.as_str());
    assert_eq!(created["check_in"], "2025-06-01");
    assert_eq!(created["check_out"], "2025-06-04");
}

#[tokio::test]
async fn check_out_must_follow_check_in() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, _) = app.register("Alice", "alice@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;

    for (check_in, check_out) in [("2025-06-03", "2025-06-03"), ("2025-06-03", "2025-06-01")] {
        let (status, body) = app.reserve(&alice, &room, check_in, check_out).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["check_out"].is_array());
    }

    let stored = ReservationRepository::list(&app.state.db, &Scope::All).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn unknown_room_and_missing_fields_are_rejected() {
    let app = TestApp::new().await;
    let (alice, _) = app.register("Alice", "alice@hotel.test").await;

    let (status, body) = app.reserve(&alice, "no-such-room", "2025-06-01", "2025-06-02").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["room_id"][0], "The selected room id is invalid.");

    let (status, body) = app
        .call(Method::POST, "/api/reservations", Some(&alice), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    for field in ["room_id", "check_in", "check_out", "total_price"] {
        assert!(body["errors"][field].is_array(), "no error for {}", field);
    }
}

// Overlapping stays on the same room are not checked; both are accepted.
#[tokio::test]
async fn overlapping_reservations_both_succeed() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, _) = app.register("Alice", "alice@hotel.test").await;
    let (bob, _) = app.register("Bob", "bob@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;

    let (first, _) = app.reserve(&alice, &room, "2025-06-01", "2025-06-05").await;
    let (second, _) = app.reserve(&bob, &room, "2025-06-01", "2025-06-05").await;
    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CREATED);

    let stored = ReservationRepository::list(&app.state.db, &Scope::All).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn detail_attaches_user_room_and_payment() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, alice_id) = app.register("Alice", "alice@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;
    let (_, created) = app.reserve(&alice, &room, "2025-06-01", "2025-06-03").await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/reservations/{}", id);

    let (status, detail) = app.call(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["user"]["id"], alice_id.as_str());
    assert_eq!(detail["room"]["id"], room.as_str());
    assert!(detail["payment"].is_null());

    PaymentRepository::create(&app.state.db, &id, 200.0, "card", "paid").await.unwrap();
    let (_, detail) = app.call(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(detail["payment"]["amount"], 200.0);
    assert_eq!(detail["payment"]["status"], "paid");
}

#[tokio::test]
async fn status_updates_are_validated() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, _) = app.register("Alice", "alice@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;
    let (_, created) = app.reserve(&alice, &room, "2025-06-01", "2025-06-03").await;
    let uri = format!("/api/reservations/{}", created["id"].as_str().unwrap());

    let (status, updated) = app
        .call(Method::PUT, &uri, Some(&admin), Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "confirmed");
    assert_eq!(updated["user_id"], created["user_id"]);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&alice), Some(json!({ "status": "teleported" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["status"].is_array());

    let (status, unchanged) = app.call(Method::PUT, &uri, Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["status"], "confirmed");
}

// A non-admin addressing someone else's reservation by id sees 404.
#[tokio::test]
async fn other_users_reservations_are_out_of_reach() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, _) = app.register("Alice", "alice@hotel.test").await;
    let (bob, _) = app.register("Bob", "bob@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;
    let (_, created) = app.reserve(&alice, &room, "2025-06-01", "2025-06-03").await;
    let uri = format!("/api/reservations/{}", created["id"].as_str().unwrap());

    let (status, _) = app.call(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call(Method::PUT, &uri, Some(&bob), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, detail) = app.call(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "pending");
}

#[tokio::test]
async fn delete_then_gone() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, _) = app.register("Alice", "alice@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;
    let (_, created) = app.reserve(&alice, &room, "2025-06-01", "2025-06-03").await;
    let uri = format!("/api/reservations/{}", created["id"].as_str().unwrap());

    let (status, body) = app.call(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app.call(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_room_removes_its_reservations() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin().await;
    let (alice, _) = app.register("Alice", "alice@hotel.test").await;
    let room = app.create_room(&admin, "A", 100.0).await;
    app.reserve(&alice, &room, "2025-06-01", "2025-06-03").await;

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/rooms/{}", room), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listing) = app.call(Method::GET, "/api/reservations", Some(&alice), None).await;
    assert_eq!(listing, json!([]));
}
