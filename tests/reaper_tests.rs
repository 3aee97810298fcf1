use std::sync::Arc;

use seabattle::{
    InMemoryStore, ManualClock, SessionReaper, Shutdown, StateStore, GAME_MAP, MATCHER_MAP,
    PLAYER_MAPS, TIME_MAP, TURN_MAP,
};
use tokio::time::Duration;

const HOUR: u64 = 3600;

async fn seed_session(store: &InMemoryStore, id: &str, opponent: &str, last_seen: u64) {
    store.hset(GAME_MAP, id, "{\"field\":[]}").await.unwrap();
    store.hset(TURN_MAP, id, "1").await.unwrap();
    store.hset(MATCHER_MAP, id, opponent).await.unwrap();
    store.hset(TIME_MAP, id, &last_seen.to_string()).await.unwrap();
}

fn reaper(store: &InMemoryStore, clock: &ManualClock, shutdown: Shutdown) -> SessionReaper {
    SessionReaper::new(
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
        Duration::from_secs(HOUR),
        Duration::from_secs(HOUR),
        shutdown,
    )
}

#[tokio::test]
async fn test_sweep_evicts_only_idle_sessions() -> anyhow::Result<()> {
    let store = InMemoryStore::new();
    let clock = ManualClock::new(100_000);
    seed_session(&store, "0", "1", 100_000 - HOUR - 1).await;
    seed_session(&store, "1", "0", 100_000 - 10).await;

    let evicted = reaper(&store, &clock, Shutdown::new()).sweep().await?;
    assert_eq!(evicted, vec!["0".to_string()]);
    for map in PLAYER_MAPS {
        assert_eq!(store.hget(map, "0").await?, None, "{} still holds 0", map);
        assert!(store.hget(map, "1").await?.is_some(), "{} lost 1", map);
    }
    Ok(())
}

#[tokio::test]
async fn test_threshold_is_exclusive() -> anyhow::Result<()> {
    let store = InMemoryStore::new();
    let clock = ManualClock::new(50_000);
    seed_session(&store, "7", "8", 50_000 - HOUR).await;
    let reaper = reaper(&store, &clock, Shutdown::new());

    assert!(reaper.sweep().await?.is_empty());
    clock.advance(1);
    assert_eq!(reaper.sweep().await?, vec!["7".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_timestamp_counts_as_ancient() -> anyhow::Result<()> {
    let store = InMemoryStore::new();
    let clock = ManualClock::new(HOUR * 2);
    store.hset(TIME_MAP, "3", "garbage").await?;
    let evicted = reaper(&store, &clock, Shutdown::new()).sweep().await?;
    assert_eq!(evicted, vec!["3".to_string()]);
    assert!(store.hkeys(TIME_MAP).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_half_deleted_session_is_cleaned() -> anyhow::Result<()> {
    let store = InMemoryStore::new();
    let clock = ManualClock::new(HOUR * 10);
    store.hset(TIME_MAP, "4", "0").await?;
    store.hset(MATCHER_MAP, "4", "5").await?;
    let evicted = reaper(&store, &clock, Shutdown::new()).sweep().await?;
    assert_eq!(evicted, vec!["4".to_string()]);
    assert_eq!(store.hget(MATCHER_MAP, "4").await?, None);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_loop_sweeps_each_interval() -> anyhow::Result<()> {
    let store = InMemoryStore::new();
    let clock = ManualClock::new(10 * HOUR);
    seed_session(&store, "0", "1", 10 * HOUR).await;
    let shutdown = Shutdown::new();
    let handle = reaper(&store, &clock, shutdown.clone()).spawn();

    // First pass: still fresh.
    clock.advance(HOUR / 2);
    tokio::time::sleep(Duration::from_secs(HOUR + 1)).await;
    assert!(store.hget(TIME_MAP, "0").await?.is_some());

    // Second pass: idle for longer than the threshold.
    clock.advance(HOUR);
    tokio::time::sleep(Duration::from_secs(HOUR)).await;
    assert_eq!(store.hget(TIME_MAP, "0").await?, None);
    assert_eq!(store.hget(GAME_MAP, "0").await?, None);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), handle).await??;
    Ok(())
}
