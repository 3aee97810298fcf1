use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use seabattle::{
    serve_connection, Board, GameClient, GameFacade, InMemoryStore, InMemoryTransport,
    MatchCoordinator, RegistrationStatus, SessionPhase, ShotReply, Shutdown, SystemClock,
    BOARD_SIZE,
};
use serde_json::json;
use tokio::time::Duration;

struct Seat {
    id: String,
    client: GameClient<InMemoryTransport>,
    rng: SmallRng,
    targets: Vec<(i64, i64)>,
    shots: usize,
}

async fn seat(facade: &GameFacade, seed: u64) -> anyhow::Result<Seat> {
    let (server_end, client_end) = InMemoryTransport::pair();
    tokio::spawn(serve_connection(facade.clone(), server_end));
    let mut client = GameClient::new(client_end);
    let id = client.register().await?;
    let targets = (0..BOARD_SIZE as i64)
        .flat_map(|x| (0..BOARD_SIZE as i64).map(move |y| (x, y)))
        .collect();
    Ok(Seat {
        id,
        client,
        rng: SmallRng::seed_from_u64(seed),
        targets,
        shots: 0,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let store = Arc::new(InMemoryStore::new());
    let facade = GameFacade::new(store.clone(), Arc::new(SystemClock));
    let shutdown = Shutdown::new();
    let matcher =
        MatchCoordinator::new(store, Duration::from_millis(10), shutdown.clone()).spawn();

    let mut seats = [seat(&facade, seed1).await?, seat(&facade, seed2).await?];
    for s in seats.iter_mut() {
        while let RegistrationStatus::Waiting = s.client.registration_status(&s.id).await? {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let board = Board::random_fleet(&mut s.rng).map_err(|e| anyhow::anyhow!(e))?;
        s.client.submit_board(&s.id, board.to_grid()).await?;
    }

    let mut turn = match seats[0].client.status(&seats[0].id).await? {
        SessionPhase::InProgress { my_turn: true } => 0,
        _ => 1,
    };
    let winner = loop {
        let s = &mut seats[turn];
        if s.targets.is_empty() {
            return Err(anyhow::anyhow!("{} ran out of targets", s.id));
        }
        let pick = s.rng.random_range(0..s.targets.len());
        let (x, y) = s.targets.swap_remove(pick);
        match s.client.shoot(&s.id, x, y).await? {
            ShotReply::Outcome(_) => {
                s.shots += 1;
                turn = 1 - turn;
            }
            ShotReply::YouWin => break turn,
            ShotReply::YouLose => break 1 - turn,
            other => return Err(anyhow::anyhow!("unexpected reply: {}", other)),
        }
    };

    shutdown.trigger();
    matcher.await?;

    let result = json!({
        "player1": {"id": seats[0].id, "shots": seats[0].shots},
        "player2": {"id": seats[1].id, "shots": seats[1].shots},
        "winner": if winner == 0 { "player1" } else { "player2" },
    });
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
