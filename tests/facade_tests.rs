use std::sync::Arc;

use seabattle::{
    Board, BoardReply, BoardReport, FleetCounts, GameFacade, InMemoryStore, ManualClock,
    MatchCoordinator, NotReady, RegistrationStatus, Rejection, SessionPhase, SessionReaper,
    ShotOutcome, ShotReply, Shutdown, StateStore, GAME_MAP, MATCHER_MAP, TIME_MAP, TURN_MAP,
};
use tokio::time::Duration;

const FLEET: &str = "
    ####......
    ..........
    ###.###...
    ..........
    ##.##.##..
    ..........
    #.#.#.#...
    ..........
    ..........
    ..........
";

const MATCH_INTERVAL: Duration = Duration::from_secs(3);
const START: u64 = 1_000_000;

fn fleet_grid() -> Vec<Vec<u64>> {
    Board::from_ascii(FLEET).unwrap().to_grid()
}

fn ship_cells() -> Vec<(i64, i64)> {
    let grid = fleet_grid();
    let mut cells = Vec::new();
    for (x, row) in grid.iter().enumerate() {
        for (y, &v) in row.iter().enumerate() {
            if v == 1 {
                cells.push((x as i64, y as i64));
            }
        }
    }
    cells
}

struct Harness {
    store: InMemoryStore,
    clock: ManualClock,
    facade: GameFacade,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let clock = ManualClock::new(START);
    let facade = GameFacade::new(Arc::new(store.clone()), Arc::new(clock.clone()));
    Harness {
        store,
        clock,
        facade,
    }
}

// Register two players, pair them and submit the standard fleet for both.
async fn paired_game(h: &Harness) -> (String, String) {
    let a = h.facade.register().await.unwrap();
    let b = h.facade.register().await.unwrap();
    let mut matcher =
        MatchCoordinator::new(Arc::new(h.store.clone()), MATCH_INTERVAL, Shutdown::new());
    matcher.pair_next().await.unwrap().unwrap();
    for id in [&a, &b] {
        let reply = h.facade.submit_board(id, &fleet_grid()).await.unwrap();
        assert!(matches!(reply, BoardReply::Report(BoardReport { status: true, .. })));
    }
    (a, b)
}

#[tokio::test]
async fn test_register_mints_sequential_ids() -> anyhow::Result<()> {
    let h = harness();
    assert_eq!(h.facade.register().await?, "0");
    assert_eq!(h.facade.register().await?, "1");
    assert_eq!(h.store.list_len(seabattle::REG_QUEUE), 2);
    assert_eq!(
        h.store.hget(TIME_MAP, "1").await?,
        Some(START.to_string())
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_first_moves() -> anyhow::Result<()> {
    let h = harness();
    let a = h.facade.register().await?;
    let b = h.facade.register().await?;

    for id in [&a, &b] {
        let reply = h.facade.submit_board(id, &fleet_grid()).await?;
        assert_eq!(
            reply,
            BoardReply::Report(BoardReport {
                status: true,
                ships: FleetCounts::new(4, 3, 2, 1)
            })
        );
    }

    let shutdown = Shutdown::new();
    let matcher =
        MatchCoordinator::new(Arc::new(h.store.clone()), MATCH_INTERVAL, shutdown.clone()).spawn();
    tokio::time::sleep(MATCH_INTERVAL).await;

    assert_eq!(
        h.facade.registration_status(&a).await?,
        RegistrationStatus::Paired(b.clone())
    );
    assert_eq!(
        h.facade.registration_status(&b).await?,
        RegistrationStatus::Paired(a.clone())
    );
    let turns = [
        h.store.hget(TURN_MAP, &a).await?,
        h.store.hget(TURN_MAP, &b).await?,
    ];
    assert_eq!(turns.iter().filter(|t| t.as_deref() == Some("1")).count(), 1);
    let (mover, waiter) = if turns[0].as_deref() == Some("1") { (&a, &b) } else { (&b, &a) };

    assert_eq!(h.facade.shoot(waiter, 9, 9).await?, ShotReply::NotYourTurn);
    assert_eq!(h.store.hget(TURN_MAP, waiter).await?.as_deref(), Some("0"));

    assert_eq!(
        h.facade.shoot(mover, 9, 9).await?,
        ShotReply::Outcome(ShotOutcome::Miss)
    );
    assert_eq!(h.store.hget(TURN_MAP, mover).await?.as_deref(), Some("0"));
    assert_eq!(h.store.hget(TURN_MAP, waiter).await?.as_deref(), Some("1"));
    assert_eq!(
        h.facade.session_status(waiter).await?,
        SessionPhase::InProgress { my_turn: true }
    );

    shutdown.trigger();
    matcher.await?;
    Ok(())
}

#[tokio::test]
async fn test_registration_status_is_stable() -> anyhow::Result<()> {
    let h = harness();
    let a = h.facade.register().await?;
    for _ in 0..3 {
        assert_eq!(
            h.facade.registration_status(&a).await?,
            RegistrationStatus::Waiting
        );
    }
    assert_eq!(h.facade.session_status(&a).await?, SessionPhase::Queued);

    let b = h.facade.register().await?;
    let mut matcher =
        MatchCoordinator::new(Arc::new(h.store.clone()), MATCH_INTERVAL, Shutdown::new());
    matcher.pair_next().await?;
    for _ in 0..3 {
        assert_eq!(
            h.facade.registration_status(&a).await?,
            RegistrationStatus::Paired(b.clone())
        );
    }
    assert_eq!(
        h.facade.session_status(&a).await?,
        SessionPhase::AwaitingBoards
    );
    Ok(())
}

#[tokio::test]
async fn test_status_poll_refreshes_activity() -> anyhow::Result<()> {
    let h = harness();
    let a = h.facade.register().await?;
    h.clock.advance(500);
    h.facade.registration_status(&a).await?;
    assert_eq!(
        h.store.hget(TIME_MAP, &a).await?,
        Some((START + 500).to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_invalid_board_is_not_stored() -> anyhow::Result<()> {
    let h = harness();
    let a = h.facade.register().await?;
    let mut grid = fleet_grid();
    grid[6][6] = 0;
    let reply = h.facade.submit_board(&a, &grid).await?;
    assert_eq!(
        reply,
        BoardReply::Report(BoardReport {
            status: false,
            ships: FleetCounts::new(3, 3, 2, 1)
        })
    );
    assert_eq!(
        reply.to_string(),
        r#"{"status":false,"ships":{"1":3,"2":3,"3":2,"4":1}}"#
    );
    assert_eq!(h.store.hget(GAME_MAP, &a).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_malformed_submissions_are_rejected() -> anyhow::Result<()> {
    let h = harness();
    let a = h.facade.register().await?;

    let mut grid = fleet_grid();
    grid[0][0] = 7;
    assert!(matches!(
        h.facade.submit_board(&a, &grid).await?,
        BoardReply::Rejected(Rejection::MalformedBoard(_))
    ));
    assert!(matches!(
        h.facade.submit_board(&a, &fleet_grid()[..4]).await?,
        BoardReply::Rejected(Rejection::MalformedBoard(_))
    ));
    assert_eq!(
        h.facade.submit_board("", &fleet_grid()).await?,
        BoardReply::Rejected(Rejection::MissingPlayerId)
    );

    // A pre-hit cell is rejected like any other foreign cell value.
    let mut grid = fleet_grid();
    grid[2][5] = 2;
    assert_eq!(
        h.facade.submit_board(&a, &grid).await?,
        BoardReply::Rejected(Rejection::MalformedBoard(
            "unexpected cell at (2, 5)".to_string()
        ))
    );
    assert_eq!(h.store.hget(GAME_MAP, &a).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_shot_rejections_and_not_ready() -> anyhow::Result<()> {
    let h = harness();
    let a = h.facade.register().await?;

    assert_eq!(
        h.facade.shoot("", 0, 0).await?,
        ShotReply::Rejected(Rejection::MissingPlayerId)
    );
    assert_eq!(
        h.facade.shoot(&a, 10, 0).await?,
        ShotReply::Rejected(Rejection::BadCoordinates { x: 10, y: 0 })
    );
    assert_eq!(
        h.facade.shoot(&a, 0, -1).await?,
        ShotReply::Rejected(Rejection::BadCoordinates { x: 0, y: -1 })
    );
    assert_eq!(
        h.facade.shoot(&a, 0, 0).await?,
        ShotReply::NotReady(NotReady::OwnBoard)
    );

    h.facade.submit_board(&a, &fleet_grid()).await?;
    assert_eq!(
        h.facade.shoot(&a, 0, 0).await?,
        ShotReply::NotReady(NotReady::Opponent)
    );

    let b = h.facade.register().await?;
    let mut matcher =
        MatchCoordinator::new(Arc::new(h.store.clone()), MATCH_INTERVAL, Shutdown::new());
    matcher.pair_next().await?;
    assert_eq!(
        h.facade.shoot(&a, 0, 0).await?,
        ShotReply::NotReady(NotReady::OpponentBoard)
    );
    assert_eq!(h.store.hget(TURN_MAP, &a).await?.as_deref(), Some("1"));
    assert_eq!(h.facade.session_status(&b).await?, SessionPhase::AwaitingBoards);
    Ok(())
}

#[tokio::test]
async fn test_hits_persist_and_lock_the_board() -> anyhow::Result<()> {
    let h = harness();
    let (a, b) = paired_game(&h).await;

    assert_eq!(
        h.facade.shoot(&a, 0, 0).await?,
        ShotReply::Outcome(ShotOutcome::Damage)
    );
    let stored = Board::from_json(&h.store.hget(GAME_MAP, &b).await?.unwrap())?;
    assert_eq!(stored.get(0, 0), Some(seabattle::Cell::HitShip));

    assert_eq!(
        h.facade.submit_board(&b, &fleet_grid()).await?,
        BoardReply::Locked
    );
    // The shooter's board has not been hit, but the game is under way.
    assert_eq!(
        h.facade.submit_board(&a, &fleet_grid()).await?,
        BoardReply::Locked
    );
    Ok(())
}

#[tokio::test]
async fn test_board_locks_once_both_fleets_are_stored() -> anyhow::Result<()> {
    let h = harness();
    let a = h.facade.register().await?;
    let b = h.facade.register().await?;
    let mut matcher =
        MatchCoordinator::new(Arc::new(h.store.clone()), MATCH_INTERVAL, Shutdown::new());
    matcher.pair_next().await?;

    h.facade.submit_board(&a, &fleet_grid()).await?;
    // Until the opponent commits, the layout can still change.
    let moved = Board::from_ascii(
        "
        ..........
        ####......
        ..........
        ###.###...
        ..........
        ##.##.##..
        ..........
        #.#.#.#...
        ..........
        ..........
        ",
    )?;
    assert!(matches!(
        h.facade.submit_board(&a, &moved.to_grid()).await?,
        BoardReply::Report(BoardReport { status: true, .. })
    ));
    assert_eq!(
        Board::from_json(&h.store.hget(GAME_MAP, &a).await?.unwrap())?,
        moved
    );

    h.facade.submit_board(&b, &fleet_grid()).await?;
    for id in [&a, &b] {
        assert_eq!(
            h.facade.submit_board(id, &fleet_grid()).await?,
            BoardReply::Locked
        );
    }
    assert_eq!(
        Board::from_json(&h.store.hget(GAME_MAP, &a).await?.unwrap())?,
        moved
    );
    Ok(())
}

#[tokio::test]
async fn test_registration_poll_ignores_unknown_ids() -> anyhow::Result<()> {
    let h = harness();
    assert_eq!(
        h.facade.registration_status("42").await?,
        RegistrationStatus::Waiting
    );
    assert_eq!(h.store.hget(TIME_MAP, "42").await?, None);
    assert_eq!(h.facade.session_status("42").await?, SessionPhase::Unknown);
    Ok(())
}

#[tokio::test]
async fn test_full_game_to_victory() -> anyhow::Result<()> {
    let h = harness();
    let (a, b) = paired_game(&h).await;
    let targets = ship_cells();

    for (n, &(x, y)) in targets.iter().enumerate() {
        let reply = h.facade.shoot(&a, x, y).await?;
        if n + 1 == targets.len() {
            assert_eq!(reply, ShotReply::Outcome(ShotOutcome::Kill));
            break;
        }
        assert!(matches!(
            reply,
            ShotReply::Outcome(ShotOutcome::Damage) | ShotReply::Outcome(ShotOutcome::Kill)
        ));
        // Water on every board row 9.
        assert_eq!(
            h.facade.shoot(&b, 9, 9).await?,
            ShotReply::Outcome(ShotOutcome::Miss)
        );
    }

    assert_eq!(h.facade.shoot(&b, 0, 0).await?, ShotReply::YouLose);
    assert_eq!(h.facade.shoot(&a, 9, 9).await?, ShotReply::YouWin);
    assert_eq!(h.facade.shoot(&a, 9, 9).await?, ShotReply::YouWin);
    assert_eq!(
        h.facade.session_status(&a).await?,
        SessionPhase::Finished { won: true }
    );
    assert_eq!(
        h.facade.session_status(&b).await?,
        SessionPhase::Finished { won: false }
    );
    // Finished games stay readable until evicted.
    assert!(h.store.hget(MATCHER_MAP, &a).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_evicted_opponent_is_not_ready() -> anyhow::Result<()> {
    let h = harness();
    let (a, b) = paired_game(&h).await;

    h.clock.advance(2 * 3600);
    h.facade.registration_status(&a).await?;
    let reaper = SessionReaper::new(
        Arc::new(h.store.clone()),
        Arc::new(h.clock.clone()),
        Duration::from_secs(3600),
        Duration::from_secs(3600),
        Shutdown::new(),
    );
    assert_eq!(reaper.sweep().await?, vec![b.clone()]);

    assert_eq!(
        h.facade.shoot(&a, 0, 0).await?,
        ShotReply::NotReady(NotReady::OpponentBoard)
    );
    assert_eq!(h.facade.session_status(&a).await?, SessionPhase::AwaitingBoards);
    assert_eq!(h.facade.session_status(&b).await?, SessionPhase::Unknown);
    Ok(())
}
