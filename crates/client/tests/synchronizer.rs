mod common;

use std::{sync::Arc, time::Duration};

use alloy_primitives::{address, Address, U256};
use raffle_client::{RaffleClient, RaffleSnapshot, RaffleUpdate, Synchronizer};
use raffle_types::RaffleState;
use tokio::{
    sync::{mpsc, watch, Notify},
    time::timeout,
};

use crate::common::{Delivery, MockEvents, MockReader, Subscription, ENTRANCE_FEE};

const WINNER: Address = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

fn client(reader: MockReader, events: MockEvents) -> RaffleClient<MockReader, MockEvents> {
    RaffleClient::new(reader, events, Duration::ZERO)
}

async fn wait_for(
    snapshots: &mut watch::Receiver<RaffleSnapshot>,
    condition: impl FnMut(&RaffleSnapshot) -> bool,
) -> RaffleSnapshot {
    timeout(Duration::from_secs(5), snapshots.wait_for(condition))
        .await
        .expect("snapshot did not converge")
        .unwrap()
        .clone()
}

#[tokio::test]
async fn test_fetch_snapshot() {
    let reader = MockReader { winner: WINNER, ..Default::default() };
    let snapshot = client(reader, MockEvents::default()).fetch().await;

    assert_eq!(snapshot.state, Some(RaffleState::Open));
    assert_eq!(snapshot.player_count, 2);
    assert_eq!(snapshot.last_winner, Some(WINNER));
    assert_eq!(snapshot.winner_label(), "0x5aAeb605...E7Ef1BeAed");
    assert_eq!(snapshot.interval_secs, 30);
    assert_eq!(snapshot.entrance_fee, "0.01");
    assert_eq!(snapshot.entrance_fee_wei, Some(U256::from(ENTRANCE_FEE)));
}

#[tokio::test]
async fn test_failed_read_keeps_placeholder() {
    let mut reader = MockReader { state: 1, ..Default::default() };
    reader.failing.insert("getEntranceFee");
    reader.failing.insert("getRecentWinner");
    let snapshot = client(reader, MockEvents::default()).fetch().await;

    assert_eq!(snapshot.state_label(), "Calculating");
    assert_eq!(snapshot.player_count, 2);
    assert_eq!(snapshot.entrance_fee, "N/A");
    assert_eq!(snapshot.entrance_fee_wei, None);
    assert_eq!(snapshot.winner_label(), "No winner yet");
}

#[tokio::test]
async fn test_reads_land_in_any_order() {
    let mut reader = MockReader { winner: WINNER, ..Default::default() };
    reader.delays.insert("getRaffleState", Duration::from_millis(40));
    reader.delays.insert("getEntranceFee", Duration::from_millis(20));
    let late = client(reader, MockEvents::default()).fetch().await;

    let mut reader = MockReader { winner: WINNER, ..Default::default() };
    reader.delays.insert("getInterval", Duration::from_millis(40));
    reader.delays.insert("getNumberOfPlayers", Duration::from_millis(20));
    let early = client(reader, MockEvents::default()).fetch().await;

    assert_eq!(late, early);
}

#[tokio::test]
async fn test_entries_increment_count() {
    let (tx, rx) = mpsc::channel(16);
    let (snapshots, _) = watch::channel(RaffleSnapshot::default());
    let synchronizer = tokio::spawn(Synchronizer::new().run(rx, snapshots));

    tx.send(RaffleUpdate::PlayerCount(U256::from(4))).await.unwrap();
    for _ in 0..3 {
        tx.send(RaffleUpdate::PlayerEntered { player: Some(WINNER) }).await.unwrap();
    }
    // A duplicate delivery counts again.
    tx.send(RaffleUpdate::PlayerEntered { player: Some(WINNER) }).await.unwrap();
    drop(tx);

    let snapshot = synchronizer.await.unwrap();
    assert_eq!(snapshot.player_count, 8);
}

#[tokio::test]
async fn test_spawned_client_follows_entries() {
    let script = vec![Subscription::Deliver(vec![
        Delivery::Entry(Some(WINNER)),
        Delivery::Entry(None),
        Delivery::Entry(Some(WINNER)),
    ])];
    let gate = Arc::new(Notify::new());
    let events = MockEvents::new(script).with_gate(gate.clone());
    let handle = client(MockReader::default(), events).spawn();
    let mut snapshots = handle.snapshots.clone();

    // Release the entries only once the initial reads have landed.
    wait_for(&mut snapshots, |s| s.state.is_some() && s.player_count == 2).await;
    gate.notify_one();

    let snapshot = wait_for(&mut snapshots, |s| s.player_count == 5).await;
    assert_eq!(snapshot.state, Some(RaffleState::Open));
    assert_eq!(snapshot.entrance_fee, "0.01");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_polling_reconciles_player_count() {
    let gate = Arc::new(Notify::new());
    let script = vec![Subscription::Deliver(vec![Delivery::Entry(Some(WINNER))])];
    let events = MockEvents::new(script).with_gate(gate.clone());
    let client = RaffleClient::new(MockReader::default(), events, Duration::from_millis(10));
    let handle = client.spawn();
    let mut snapshots = handle.snapshots.clone();

    wait_for(&mut snapshots, |s| s.state.is_some() && s.player_count == 2).await;
    gate.notify_one();
    wait_for(&mut snapshots, |s| s.player_count == 3).await;

    // Polls returning the same count leave the event-accumulated count alone.
    let reads = client.reader.reads();
    timeout(Duration::from_secs(5), async {
        while client.reader.reads() < reads + 10 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("contract was not polled");
    assert_eq!(snapshots.borrow().player_count, 3);

    // A changed count overwrites it.
    client.reader.set_players(7);
    let snapshot = wait_for(&mut snapshots, |s| s.player_count == 7).await;
    assert_eq!(snapshot.state, Some(RaffleState::Open));
    assert!(client.reader.reads() > 5);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_zero_poll_interval_reads_once() {
    let client = client(MockReader::default(), MockEvents::default());
    let handle = client.spawn();
    let mut snapshots = handle.snapshots.clone();

    wait_for(&mut snapshots, |s| s.state.is_some() && s.entrance_fee_wei.is_some()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.reader.reads(), 5);

    handle.shutdown().await;
}
