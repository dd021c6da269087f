// File: teamboard-core/tests/roster_refresher_tests.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use teamboard_common::models::{PresenceStatus, Snapshot, StaticProfile};
use teamboard_core::eventbus::BroadcastHub;
use teamboard_core::roster::Roster;
use teamboard_core::services::profile_normalizer::{FALLBACK_BIO, FALLBACK_USERNAME};
use teamboard_core::tasks::spawn_roster_refresh_task;

mod test_utils;
use test_utils::*;

const ALICE: u64 = 729568770808610917;
const BOB: u64 = 720607599582593054;
const GHOST: u64 = 1143225624998203473;
const BOT: u64 = 942082423846486056;

fn parse(payload: &str) -> Snapshot {
    serde_json::from_str(payload).unwrap()
}

#[tokio::test]
async fn one_failure_does_not_affect_the_rest_of_the_list() {
    let api = Arc::new(
        FakeProfileApi::new()
            .with_profile(StaticProfile::new(user(ALICE), "alice"))
            .with_behaviour(user(GHOST), ProfileBehaviour::Fail("500 from upstream".into()))
            .with_profile(StaticProfile::new(user(BOB), "bob"))
            .with_profile(StaticProfile::new(user(BOT), "helper")),
    );
    let primary = guild(1);
    let directory = Arc::new(
        FakeDirectory::new()
            .with_guild(primary)
            .with_cached(primary, user(ALICE), online_coding()),
    );
    let hub = BroadcastHub::new();
    let roster = Roster::new(vec![user(ALICE), user(GHOST), user(BOB)], vec![user(BOT)]);

    let refresher = build_refresher(api, directory, Some(primary), hub.clone(), roster);
    let snapshot = refresher.refresh_once().await;

    let ids: Vec<&str> = snapshot.team.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![ALICE.to_string(), GHOST.to_string(), BOB.to_string()]);

    assert_eq!(snapshot.team[0].username, "alice");
    assert_eq!(snapshot.team[0].status, PresenceStatus::Online);
    assert_eq!(snapshot.team[0].activities[0].name, "Visual Studio Code");

    assert_eq!(snapshot.team[1].username, FALLBACK_USERNAME);
    assert_eq!(snapshot.team[1].bio, FALLBACK_BIO);
    assert_eq!(snapshot.team[1].display_name, "ID: 1143...");

    assert_eq!(snapshot.team[2].username, "bob");
    assert_eq!(snapshot.team[2].status, PresenceStatus::Offline);

    assert_eq!(snapshot.bots.len(), 1);
    assert_eq!(snapshot.bots[0].username, "helper");
    assert!(snapshot.last_update > 0);
}

#[tokio::test]
async fn unknown_account_gets_the_fallback_record() {
    let api = Arc::new(FakeProfileApi::new().with_behaviour(user(GHOST), ProfileBehaviour::Unknown));
    let refresher = build_refresher(
        api,
        Arc::new(FakeDirectory::new()),
        None,
        BroadcastHub::new(),
        Roster::new(vec![user(GHOST)], vec![]),
    );

    let record = refresher.fetch_account(user(GHOST)).await;
    assert_eq!(record.id, GHOST.to_string());
    assert_eq!(record.username, FALLBACK_USERNAME);
    assert_eq!(record.status, PresenceStatus::Offline);
    assert!(record.activities.is_empty());
}

#[tokio::test(start_paused = true)]
async fn hung_lookup_times_out_into_a_fallback() {
    let api = Arc::new(
        FakeProfileApi::new()
            .with_behaviour(user(GHOST), ProfileBehaviour::Hang)
            .with_profile(StaticProfile::new(user(ALICE), "alice")),
    );
    let refresher = build_refresher(
        api,
        Arc::new(FakeDirectory::new()),
        None,
        BroadcastHub::new(),
        Roster::new(vec![user(GHOST), user(ALICE)], vec![]),
    )
    .with_fetch_timeout(Duration::from_secs(15));

    let started = tokio::time::Instant::now();
    let snapshot = refresher.refresh_once().await;

    assert!(started.elapsed() >= Duration::from_secs(15));
    assert!(started.elapsed() < Duration::from_secs(3600));
    assert_eq!(snapshot.team[0].username, FALLBACK_USERNAME);
    assert_eq!(snapshot.team[1].username, "alice");
}

#[tokio::test]
async fn refresh_publishes_to_the_hub() {
    let api = Arc::new(FakeProfileApi::new().with_profile(StaticProfile::new(user(ALICE), "alice")));
    let hub = BroadcastHub::new();
    let mut subscription = hub.subscribe();
    assert!(subscription.try_recv().is_none());

    let refresher = build_refresher(
        api,
        Arc::new(FakeDirectory::new()),
        None,
        hub.clone(),
        Roster::new(vec![user(ALICE)], vec![]),
    );
    let snapshot = refresher.refresh_once().await;

    let payload = subscription.try_recv().expect("publish should reach subscriber");
    assert_eq!(parse(&payload), snapshot);
    assert_eq!(*hub.current_snapshot(), snapshot);
}

#[tokio::test]
async fn empty_roster_publishes_empty_lists() {
    let hub = BroadcastHub::new();
    let refresher = build_refresher(
        Arc::new(FakeProfileApi::new()),
        Arc::new(FakeDirectory::new()),
        None,
        hub.clone(),
        Roster::new(vec![], vec![]),
    );

    let snapshot = refresher.refresh_once().await;
    assert!(snapshot.team.is_empty());
    assert!(snapshot.bots.is_empty());
    assert!(hub.current_snapshot().is_published());
}

#[tokio::test(start_paused = true)]
async fn run_loop_repeats_and_stops_on_cancel() {
    let api = Arc::new(FakeProfileApi::new().with_profile(StaticProfile::new(user(ALICE), "alice")));
    let hub = BroadcastHub::new();
    let mut subscription = hub.subscribe();
    let refresher = Arc::new(build_refresher(
        api.clone(),
        Arc::new(FakeDirectory::new()),
        None,
        hub.clone(),
        Roster::new(vec![user(ALICE)], vec![]),
    ));

    let shutdown = CancellationToken::new();
    let handle = {
        let refresher = refresher.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { refresher.run(Duration::from_secs(10), shutdown).await })
    };

    for _ in 0..3 {
        let payload = subscription.recv().await.expect("cycle should publish");
        assert_eq!(parse(&payload).team[0].username, "alice");
    }
    // three cycles, thirty seconds apart at most: well inside the profile TTL
    assert_eq!(api.calls_for(user(ALICE)), 1);

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn refresh_task_waits_for_ready() {
    let api = Arc::new(FakeProfileApi::new().with_profile(StaticProfile::new(user(ALICE), "alice")));
    let hub = BroadcastHub::new();
    let mut subscription = hub.subscribe();
    let refresher = Arc::new(build_refresher(
        api.clone(),
        Arc::new(FakeDirectory::new()),
        None,
        hub.clone(),
        Roster::new(vec![user(ALICE)], vec![]),
    ));

    let (ready_tx, ready_rx) = watch::channel(false);
    let shutdown = CancellationToken::new();
    let handle = spawn_roster_refresh_task(refresher, Duration::from_secs(10), ready_rx, shutdown.clone());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(api.total_calls(), 0);
    assert!(!hub.current_snapshot().is_published());

    ready_tx.send_replace(true);
    let payload = subscription.recv().await.expect("first cycle after ready");
    assert_eq!(parse(&payload).team.len(), 1);

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn refresh_task_exits_if_never_ready() {
    let api = Arc::new(FakeProfileApi::new());
    let hub = BroadcastHub::new();
    let refresher = Arc::new(build_refresher(
        api.clone(),
        Arc::new(FakeDirectory::new()),
        None,
        hub.clone(),
        Roster::builtin(),
    ));

    let (ready_tx, ready_rx) = watch::channel(false);
    let handle = spawn_roster_refresh_task(
        refresher,
        Duration::from_secs(10),
        ready_rx,
        CancellationToken::new(),
    );
    drop(ready_tx);

    handle.await.unwrap();
    assert_eq!(api.total_calls(), 0);
    assert!(!hub.current_snapshot().is_published());
}
