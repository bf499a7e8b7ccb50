use std::sync::Arc;

use hotel_booking::api::auth::RegisterRequest;
use hotel_booking::api::reservations::CreateReservationRequest;
use hotel_booking::api::rooms::RoomRequest;
use hotel_booking::client::{ApiClient, ClientError, Session, SessionStore};
use hotel_booking::db::ReservationStatus;

mod common;

fn registration(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: Some("Ana".to_string()),
        email: Some(email.to_string()),
        password: Some("pw12345678".to_string()),
        phone: None,
    }
}

#[tokio::test]
async fn register_persists_session_and_authenticates_later_calls() {
    let (base_url, _state) = common::spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));

    let session = Arc::new(Session::open(store.clone()));
    let mut changes = session.subscribe();
    let client = ApiClient::new(base_url.clone(), session.clone());

    let user = client.register(&registration("ana@hotel.test")).await.unwrap();
    assert!(session.is_logged_in());
    assert!(!session.is_admin());
    assert!(changes.has_changed().unwrap());
    assert_eq!(changes.borrow_and_update().as_ref().map(|s| s.user.id.clone()), Some(user.id.clone()));

    // Bearer header is attached automatically
    let me = client.current_user().await.unwrap();
    assert_eq!(me.id, user.id);
    assert!(client.reservations().await.unwrap().is_empty());

    // A fresh client restored from disk is still signed in
    let restored = ApiClient::new(base_url, Arc::new(Session::open(store)));
    assert_eq!(restored.current_user().await.unwrap().id, user.id);
}

#[tokio::test]
async fn logout_clears_local_state_and_revokes_remotely() {
    let (base_url, _state) = common::spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let session = Arc::new(Session::open(store.clone()));
    let client = ApiClient::new(base_url.clone(), session.clone());

    client.register(&registration("ana@hotel.test")).await.unwrap();
    let old_token = session.token().unwrap();

    client.logout().await.unwrap();
    assert!(!session.is_logged_in());
    assert!(store.load().is_none());

    // Replaying the old token against the server fails
    let replay = Arc::new(Session::open(SessionStore::new(dir.path().join("replay.json"))));
    let user = client.login("ana@hotel.test", "pw12345678").await.unwrap();
    replay.establish(old_token, user).unwrap();
    let err = ApiClient::new(base_url, replay).current_user().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn logout_clears_locally_even_when_server_is_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let session = Arc::new(Session::open(store.clone()));
    let mut changes = session.subscribe();

    let user = hotel_booking::db::User {
        id: "u-1".to_string(),
        name: "Ana".to_string(),
        email: "ana@hotel.test".to_string(),
        password_hash: String::new(),
        role: hotel_booking::db::Role::User,
        phone: None,
        created_at: 0,
        updated_at: 0,
    };
    session.establish("stale-token".to_string(), user).unwrap();
    changes.borrow_and_update();

    let client = ApiClient::new("http://127.0.0.1:1/api", session.clone());
    let result = client.logout().await;

    assert!(matches!(result, Err(ClientError::Http(_))));
    assert!(!session.is_logged_in());
    assert!(store.load().is_none());
    assert!(changes.has_changed().unwrap());
    assert!(changes.borrow().is_none());
}

#[tokio::test]
async fn server_messages_are_surfaced() {
    let (base_url, _state) = common::spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(Session::open(SessionStore::new(dir.path().join("session.json"))));
    let client = ApiClient::new(base_url, session.clone());

    match client.login("nobody@hotel.test", "whatever1").await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid login details");
        }
        other => panic!("expected api error, got {:?}", other.map(|u| u.id)),
    }
    assert!(!session.is_logged_in());

    let mut bad = registration("ana@hotel.test");
    bad.password = Some("short".to_string());
    let err = client.register(&bad).await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(err.to_string().contains("password"));
}

#[tokio::test]
async fn admin_session_manages_rooms_and_reservations() {
    let (base_url, state) = common::spawn_server().await;
    assert!(hotel_booking::db::seed::seed_demo_data(&state.db).await.unwrap());

    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(Session::open(SessionStore::new(dir.path().join("session.json"))));
    let client = ApiClient::new(base_url.clone(), session.clone());

    client.login("admin@hotel.com", "admin123").await.unwrap();
    assert!(session.is_admin());
    assert_eq!(client.rooms().await.unwrap().len(), 4);

    let room = client
        .create_room(&RoomRequest {
            name: Some("Garden View".to_string()),
            price: Some(120.0),
            capacity: Some(2),
            room_type: Some("Deluxe".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let renamed = client
        .update_room(&room.id, &RoomRequest { name: Some("Garden Suite".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(renamed.name, "Garden Suite");
    assert_eq!(client.room(&room.id).await.unwrap(), renamed);

    // A guest books it, the admin confirms it
    let guest_session = Arc::new(Session::open(SessionStore::new(dir.path().join("guest.json"))));
    let guest = ApiClient::new(base_url, guest_session);
    guest.login("user@hotel.com", "user123").await.unwrap();
    let reservation = guest
        .create_reservation(&CreateReservationRequest {
            room_id: Some(room.id.clone()),
            check_in: Some("2025-07-01".to_string()),
            check_out: Some("2025-07-03".to_string()),
            total_price: Some(240.0),
        })
        .await
        .unwrap();
    assert_eq!(reservation.status, ReservationStatus::Pending);

    let confirmed = client
        .update_reservation_status(&reservation.id, ReservationStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);
    assert_eq!(guest.reservation(&reservation.id).await.unwrap().reservation.status, ReservationStatus::Confirmed);

    guest.delete_reservation(&reservation.id).await.unwrap();
    client.delete_room(&room.id).await.unwrap();
    assert_eq!(client.room(&room.id).await.unwrap_err().status(), Some(404));
}
