use std::sync::Arc;

use super::*;
use crate::auth::{MockIdentityProvider, SessionService};
use crate::db::DbService;
use crate::db::repository::BookingRepository;
use shared::models::ResourceKind;

async fn engine_with_config(config: Config) -> (ReservationEngine, SessionService) {
    let db = DbService::open_in_memory().await.unwrap();
    let sessions = SessionService::new(&config, Arc::new(MockIdentityProvider::accepting()));
    let engine = ReservationEngine::new(
        &config,
        BookingRepository::new(db.db),
        SyncBus::new(),
        sessions.clone(),
    );
    (engine, sessions)
}

async fn engine_with_sessions() -> (ReservationEngine, SessionService) {
    engine_with_config(Config::for_tests()).await
}

async fn admin(sessions: &SessionService, secret: &str) -> Session {
    sessions.authenticate(secret).await.unwrap()
}

fn request(resource_id: &str, date: &str, hour: u8, name: &str) -> ReserveRequest {
    ReserveRequest {
        resource_id: resource_id.to_string(),
        date: date.parse().unwrap(),
        hour,
        name: name.to_string(),
        phone: None,
    }
}

#[tokio::test]
async fn test_reserve_then_conflicting_reserve() {
    let (engine, sessions) = engine_with_sessions().await;
    let roberto = admin(&sessions, "roberto2024").await;
    let filippo = admin(&sessions, "filippo2024").await;

    let booking = engine
        .reserve(&roberto, request("campo7a", "2024-06-10", 20, "Mario Rossi"))
        .await
        .unwrap();
    assert_eq!(booking.note, "");
    assert_eq!(booking.name, "Mario Rossi");

    let conflict = engine
        .reserve(&filippo, request("campo7a", "2024-06-10", 20, "Luca Bianchi"))
        .await;
    match conflict {
        Err(EngineError::SlotTaken { resource_id, kind }) => {
            assert_eq!(resource_id, "campo7a");
            assert_eq!(kind, ResourceKind::Field);
        }
        other => panic!("expected SlotTaken, got {other:?}"),
    }

    // Exactly one booking survives for the key
    let all = engine
        .query(
            &roberto,
            Some("campo7a".into()),
            Some("2024-06-10".parse().unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Mario Rossi");
}

#[tokio::test]
async fn test_concurrent_reserves_have_one_winner() {
    let (engine, sessions) = engine_with_sessions().await;
    let roberto = admin(&sessions, "roberto2024").await;
    let filippo = admin(&sessions, "filippo2024").await;

    let (a, b) = tokio::join!(
        engine.reserve(&roberto, request("campo11", "2024-06-15", 21, "Anna")),
        engine.reserve(&filippo, request("campo11", "2024-06-15", 21, "Bruno")),
    );

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(EngineError::SlotTaken { .. })));

    let all = engine.query(&roberto, None, None).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_clubhouse_conflict_carries_kind() {
    let (engine, sessions) = engine_with_sessions().await;
    let session = admin(&sessions, "roberto2024").await;

    engine
        .reserve(&session, request("clubhouse", "2024-06-10", 20, "Festa sociale"))
        .await
        .unwrap();
    let conflict = engine
        .reserve(&session, request("clubhouse", "2024-06-10", 20, "Cena"))
        .await
        .unwrap_err();

    assert!(matches!(
        conflict,
        EngineError::SlotTaken {
            kind: ResourceKind::Clubhouse,
            ..
        }
    ));
    assert_eq!(
        conflict.user_message(),
        "An event is already scheduled in this slot"
    );
}

#[tokio::test]
async fn test_reserve_validates_input_before_store() {
    let (engine, sessions) = engine_with_sessions().await;
    let session = admin(&sessions, "roberto2024").await;

    let blank_name = engine
        .reserve(&session, request("campo7a", "2024-06-10", 20, "   "))
        .await;
    assert!(matches!(blank_name, Err(EngineError::InvalidInput(_))));

    let closed_hour = engine
        .reserve(&session, request("campo7a", "2024-06-10", 3, "Mario"))
        .await;
    assert!(matches!(closed_hour, Err(EngineError::InvalidInput(_))));

    let bad_resource = engine
        .reserve(&session, request("campo99", "2024-06-10", 20, "Mario"))
        .await;
    assert!(matches!(bad_resource, Err(EngineError::InvalidInput(_))));

    assert!(engine.query(&session, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reserve_trims_name_and_accepts_past_dates() {
    let (engine, sessions) = engine_with_sessions().await;
    let session = admin(&sessions, "roberto2024").await;

    let booking = engine
        .reserve(&session, request("campo7a", "2001-01-01", 19, "  Mario Rossi  "))
        .await
        .unwrap();
    assert_eq!(booking.name, "Mario Rossi");
}

#[tokio::test]
async fn test_annotate_updates_note_only() {
    let (engine, sessions) = engine_with_sessions().await;
    let session = admin(&sessions, "roberto2024").await;

    let mut req = request("campo7a", "2024-06-10", 20, "Mario Rossi");
    req.phone = Some("333 1234567".to_string());
    let booking = engine.reserve(&session, req).await.unwrap();

    let updated = engine
        .annotate(&session, &booking.id, "Pagamento ricevuto")
        .await
        .unwrap();
    assert_eq!(updated.note, "Pagamento ricevuto");
    assert_eq!(updated.name, "Mario Rossi");
    assert_eq!(updated.phone.as_deref(), Some("333 1234567"));
}

#[tokio::test]
async fn test_annotate_after_release_is_not_found() {
    let (engine, sessions) = engine_with_sessions().await;
    let session = admin(&sessions, "roberto2024").await;

    let booking = engine
        .reserve(&session, request("campo7a", "2024-06-10", 20, "Mario Rossi"))
        .await
        .unwrap();
    engine.release(&session, &booking.id).await.unwrap();

    let result = engine.annotate(&session, &booking.id, "troppo tardi").await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
    // Nothing was resurrected
    assert!(engine.query(&session, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let (engine, sessions) = engine_with_sessions().await;
    let session = admin(&sessions, "roberto2024").await;

    let booking = engine
        .reserve(&session, request("campo7a", "2024-06-10", 20, "Mario Rossi"))
        .await
        .unwrap();

    let first = engine.release(&session, &booking.id).await.unwrap();
    let second = engine.release(&session, &booking.id).await.unwrap();
    assert_eq!(first, ReleaseOutcome::Released);
    assert_eq!(second, ReleaseOutcome::AlreadyGone);
    assert!(engine.query(&session, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_readonly_session_cannot_mutate() {
    let (engine, sessions) = engine_with_sessions().await;
    let observer = sessions.authenticate("veritas2024").await.unwrap();

    let reserve = engine
        .reserve(&observer, request("campo7a", "2024-06-10", 20, "Mario Rossi"))
        .await;
    assert!(matches!(reserve, Err(EngineError::Unauthorized)));

    let annotate = engine.annotate(&observer, "some-id", "note").await;
    assert!(matches!(annotate, Err(EngineError::Unauthorized)));

    let release = engine.release(&observer, "some-id").await;
    assert!(matches!(release, Err(EngineError::Unauthorized)));

    // The store is unchanged, and the observer may still read it
    assert!(engine.query(&observer, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_absent_session_cannot_query() {
    let (engine, _) = engine_with_sessions().await;
    let result = engine.query(&Session::Absent, None, None).await;
    assert!(matches!(result, Err(EngineError::Unauthorized)));
}

#[tokio::test]
async fn test_revoked_admin_session_is_rejected() {
    let (engine, sessions) = engine_with_sessions().await;
    let session = admin(&sessions, "roberto2024").await;

    sessions.revoke("Roberto");

    let result = engine
        .reserve(&session, request("campo7a", "2024-06-10", 20, "Mario Rossi"))
        .await;
    assert!(matches!(result, Err(EngineError::Unauthorized)));
}

#[tokio::test]
async fn test_stalled_store_call_surfaces_store_unavailable() {
    let mut config = Config::for_tests();
    config.store_timeout_ms = 50;
    let (engine, _) = engine_with_config(config).await;

    // A store future that never resolves must be cut off by the bound,
    // not hang the caller.
    let stalled = engine.bounded(std::future::pending::<RepoResult<()>>()).await;
    assert!(matches!(stalled, Err(EngineError::StoreUnavailable(_))));
}

#[tokio::test]
async fn test_mutations_broadcast_snapshots() {
    let (engine, sessions) = engine_with_sessions().await;
    let session = admin(&sessions, "roberto2024").await;
    let mut rx = engine.subscribe();

    let booking = engine
        .reserve(&session, request("campo7a", "2024-06-10", 20, "Mario Rossi"))
        .await
        .unwrap();
    let created = rx.recv().await.unwrap();
    assert_eq!(created.action, SyncAction::Created);
    assert_eq!(created.booking_id, booking.id);
    assert_eq!(created.bookings.len(), 1);

    engine
        .annotate(&session, &booking.id, "Pagamento ricevuto")
        .await
        .unwrap();
    let annotated = rx.recv().await.unwrap();
    assert_eq!(annotated.action, SyncAction::NoteUpdated);
    assert_eq!(annotated.bookings[0].note, "Pagamento ricevuto");

    engine.release(&session, &booking.id).await.unwrap();
    let deleted = rx.recv().await.unwrap();
    assert_eq!(deleted.action, SyncAction::Deleted);
    assert!(deleted.bookings.is_empty());
    assert!(deleted.version > annotated.version);
}
