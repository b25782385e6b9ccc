//! Session SQL of the PostgreSQL adapter. Each test gets a fresh migrated
//! database from `sqlx::test`; run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::PgPool;
use ssg_core::domain::{Session, User};
use ssg_core::error::DomainError;
use ssg_core::repositories::{SessionRepository, UserRepository};
use ssg_core::services::SessionService;
use ssg_infrastructure::PgUserRepository;
use ssg_shared::ManualClock;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

async fn seeded(pool: PgPool, name: &str, sessions: &[Session]) -> PgUserRepository {
    let repo = PgUserRepository::new(pool);
    repo.insert(&User::new(name.into(), String::new(), "hash".into(), start()).unwrap())
        .await
        .unwrap();
    repo.replace_sessions(name, sessions).await.unwrap();
    repo
}

fn session(token: &str, minutes: i64) -> Session {
    Session::new(token.into(), start(), Duration::minutes(minutes))
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_duplicate_username(pool: PgPool) {
    let repo = seeded(pool, "alice", &[]).await;
    let again = User::new("alice".into(), String::new(), "other".into(), start()).unwrap();

    let result = repo.insert(&again).await;
    assert!(matches!(result, Err(DomainError::DuplicateUsername(name)) if name == "alice"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_user(pool: PgPool) {
    let repo = PgUserRepository::new(pool);
    assert!(repo.list_sessions("ghost").await.unwrap().is_none());
    assert!(matches!(
        repo.replace_sessions("ghost", &[]).await,
        Err(DomainError::UserNotFound)
    ));
    assert!(matches!(
        repo.remove_sessions("ghost", &["a".into()]).await,
        Err(DomainError::UserNotFound)
    ));
    assert!(!repo.renew_session("ghost", "a", start()).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_renew_keeps_order_and_other_elements(pool: PgPool) {
    let (a, b, c) = (session("a", 1), session("b", 2), session("c", 3));
    let repo = seeded(pool, "carol", &[a.clone(), b, c.clone()]).await;

    let later = start() + Duration::hours(1);
    assert!(repo.renew_session("carol", "b", later).await.unwrap());
    assert!(!repo.renew_session("carol", "zzz", later).await.unwrap());

    let sessions = repo.list_sessions("carol").await.unwrap().unwrap();
    let tokens: Vec<_> = sessions.iter().map(|s| s.token.as_str()).collect();
    assert_eq!(tokens, ["a", "b", "c"]);
    assert_eq!(sessions[0], a);
    assert_eq!(sessions[1].expires_at, later);
    assert_eq!(sessions[2], c);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_renew_touches_first_duplicate_only(pool: PgPool) {
    let second = session("dup", 2);
    let repo = seeded(pool, "bob", &[session("dup", 1), second.clone()]).await;

    let later = start() + Duration::minutes(5);
    assert!(repo.renew_session("bob", "dup", later).await.unwrap());

    let sessions = repo.list_sessions("bob").await.unwrap().unwrap();
    assert_eq!(sessions[0].expires_at, later);
    assert_eq!(sessions[1], second);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_remove_exact_subset(pool: PgPool) {
    let keep = [session("b", 2), session("d", 4)];
    let repo = seeded(
        pool,
        "carol",
        &[session("a", 1), keep[0].clone(), session("c", 3), keep[1].clone()],
    )
    .await;

    let removed = repo
        .remove_sessions("carol", &["a".into(), "c".into(), "missing".into()])
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(repo.list_sessions("carol").await.unwrap().unwrap(), keep);
    assert_eq!(repo.remove_sessions("carol", &[]).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_sweep_counts_removed_sessions(pool: PgPool) {
    let repo = seeded(pool, "alice", &[session("a1", 1), session("a2", 10)]).await;
    let bob = User::new("bob".into(), String::new(), "hash".into(), start()).unwrap();
    repo.insert(&bob).await.unwrap();
    repo.replace_sessions("bob", &[session("b1", 1), session("b2", 2)])
        .await
        .unwrap();

    // expiry at exactly `now` is swept
    let removed = repo.remove_all_expired(start() + Duration::minutes(2)).await.unwrap();
    assert_eq!(removed, 3);

    let alice = repo.list_sessions("alice").await.unwrap().unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].token, "a2");
    assert!(repo.list_sessions("bob").await.unwrap().unwrap().is_empty());
    assert_eq!(repo.remove_all_expired(start() + Duration::minutes(2)).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_token_in_use(pool: PgPool) {
    let repo = seeded(pool, "alice", &[session("taken", 1)]).await;
    assert!(repo.token_in_use("taken").await.unwrap());
    assert!(!repo.token_in_use("free").await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_session_lifecycle_on_postgres(pool: PgPool) {
    let repo = Arc::new(seeded(pool, "carol", &[]).await);
    let clock = Arc::new(ManualClock::new(start()));
    let sessions = SessionService::new(
        repo.clone(),
        clock.clone(),
        Duration::minutes(5),
        StdDuration::from_secs(5),
    );

    let phone = sessions.create_session("carol").await.unwrap();
    let laptop = sessions.create_session("carol").await.unwrap();

    clock.advance(Duration::minutes(3));
    assert!(sessions.validate_session("carol", &phone).await.unwrap());

    // laptop expires, phone was renewed
    clock.advance(Duration::minutes(2));
    assert!(!sessions.validate_session("carol", &laptop).await.unwrap());
    assert!(sessions.validate_session("carol", &phone).await.unwrap());

    sessions.invalidate_session("carol", &phone).await.unwrap();
    assert!(!sessions.validate_session("carol", &phone).await.unwrap());
    assert!(repo.list_sessions("carol").await.unwrap().unwrap().is_empty());
}
