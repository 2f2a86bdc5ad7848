use chrono::Duration;
use std::{
    collections::HashSet,
    sync::{Arc, Barrier},
    thread,
};

use rollcall_backend::{
    clock::ManualClock,
    models::Provenance,
    services::{
        CheckInError, CheckInService, CheckInSettings, MemorySink, SessionAuthority, TokenError,
        TokenStore,
    },
    types::TokenTtl,
};

mod support;

fn ttl(secs: i64) -> TokenTtl {
    TokenTtl::from_secs(secs).expect("ttl")
}

fn service_with(clock: Arc<ManualClock>, sink: Arc<MemorySink>, ttl_secs: i64) -> CheckInService {
    let settings = CheckInSettings {
        ttl: ttl(ttl_secs),
        ..CheckInSettings::default()
    };
    CheckInService::new(clock, sink, settings)
}

#[test]
fn test_only_one_of_many_concurrent_consumers_wins() {
    let clock = Arc::new(ManualClock::at_epoch());
    let store = Arc::new(TokenStore::new(clock));
    let sessions = SessionAuthority::new();
    let token = store.mint(sessions.current(), ttl(30));

    let contenders = 16;
    let barrier = Arc::new(Barrier::new(contenders));
    let handles: Vec<_> = (0..contenders)
        .map(|_| {
            let store = store.clone();
            let barrier = barrier.clone();
            let value = token.value.clone();
            thread::spawn(move || {
                barrier.wait();
                store.try_consume(&value)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("consumer thread"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|err| *err == TokenError::TokenNotFound));
    assert!(store.is_empty());
}

#[test]
fn test_memory_stays_bounded_under_sustained_issuance() {
    let clock = Arc::new(ManualClock::at_epoch());
    let store = TokenStore::new(clock.clone());
    let sessions = SessionAuthority::new();

    // One mint per second with a 5 second lifetime, never consumed.
    for _ in 0..600 {
        store.mint(sessions.current(), ttl(5));
        clock.advance(Duration::seconds(1));
        store.sweep_expired();
        assert!(store.len() <= 5, "store grew to {}", store.len());
    }
}

#[test]
fn test_consumed_token_is_never_resurrected() {
    let clock = Arc::new(ManualClock::at_epoch());
    let store = TokenStore::new(clock.clone());
    let sessions = SessionAuthority::new();
    let token = store.mint(sessions.current(), ttl(30));

    assert!(store.try_consume(&token.value).is_ok());
    for _ in 0..10 {
        assert_eq!(
            store.try_consume(&token.value),
            Err(TokenError::TokenNotFound)
        );
        assert_eq!(store.peek(&token.value), Err(TokenError::TokenNotFound));
        store.sweep_expired();
        store.mint(sessions.current(), ttl(30));
        clock.advance(Duration::seconds(1));
    }
}

#[test]
fn test_issued_tokens_are_distinct() {
    let clock = Arc::new(ManualClock::at_epoch());
    let store = TokenStore::new(clock);
    let sessions = SessionAuthority::new();

    let values: HashSet<_> = (0..1000)
        .map(|_| store.mint(sessions.current(), ttl(30)).value)
        .collect();
    assert_eq!(values.len(), 1000);
}

#[tokio::test]
async fn test_check_in_inside_window_records_current_session() {
    let clock = Arc::new(ManualClock::at_epoch());
    let sink = Arc::new(MemorySink::new());
    let service = service_with(clock.clone(), sink.clone(), 30);

    let issued = service.issue_token();
    clock.advance(Duration::seconds(10));
    let record = service
        .check_in(&issued.token, "s-1001", Provenance::default())
        .await
        .expect("check-in");

    assert_eq!(record.session_id, issued.session_id);
    assert_eq!(record.student_id, "s-1001");
    assert_eq!(sink.records(), vec![record]);
}

#[tokio::test]
async fn test_check_in_at_expiry_instant_is_rejected() {
    let clock = Arc::new(ManualClock::at_epoch());
    let sink = Arc::new(MemorySink::new());
    let service = service_with(clock.clone(), sink.clone(), 30);

    let issued = service.issue_token();
    clock.advance(Duration::seconds(30));
    let result = service
        .check_in(&issued.token, "s-1001", Provenance::default())
        .await;

    assert!(matches!(result, Err(CheckInError::Unauthorized)));
    assert!(sink.is_empty());
    assert!(service.store().is_empty());
}

#[tokio::test]
async fn test_token_keeps_session_it_was_minted_under() {
    let clock = Arc::new(ManualClock::at_epoch());
    let sink = Arc::new(MemorySink::new());
    let service = service_with(clock, sink, 30);

    let issued = service.issue_token();
    let rotated = service.rotate_session();
    assert_ne!(rotated, issued.session_id);

    let record = service
        .check_in(&issued.token, "s-1001", Provenance::default())
        .await
        .expect("check-in");
    assert_eq!(record.session_id, issued.session_id);

    let next = service.issue_token();
    assert_eq!(next.session_id, rotated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_check_ins_record_exactly_once() {
    let clock = Arc::new(ManualClock::at_epoch());
    let sink = Arc::new(MemorySink::new());
    let service = Arc::new(service_with(clock, sink.clone(), 30));
    let token = service.issue_token().token;

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let service = service.clone();
            let token = token.clone();
            tokio::spawn(async move {
                service
                    .check_in(&token, &format!("s-{i}"), Provenance::default())
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for task in tasks {
        match task.await.expect("task") {
            Ok(_) => successes += 1,
            Err(err) => assert!(matches!(err, CheckInError::Unauthorized)),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_sink_failure_still_spends_token() {
    let clock = Arc::new(ManualClock::at_epoch());
    let sink = Arc::new(support::FailingSink::default());
    let service = CheckInService::new(clock, sink.clone(), CheckInSettings::default());

    let token = service.issue_token().token;
    let first = service
        .check_in(&token, "s-1001", Provenance::default())
        .await;
    assert!(matches!(first, Err(CheckInError::SinkUnavailable(_))));

    let retry = service
        .check_in(&token, "s-1001", Provenance::default())
        .await;
    assert!(matches!(retry, Err(CheckInError::Unauthorized)));
    assert_eq!(sink.attempts(), 1);
}
