//! A commander that gives its idle bots random orders.
//!
//! ```text
//! cargo run -p random-bot -- [host port]
//! ```

use aisandbox::prelude::*;
use aisandbox::{DEFAULT_ADDRESS, Team};
use rand::Rng;

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Picks a target and a description for one bot.
fn pick_target(game: &GameInfo, level: (f64, f64), rng: &mut impl Rng) -> (Vector2, String) {
    let team: &Team = if rng.random_bool(0.5) {
        &game.team
    } else {
        &game.enemy_team
    };

    match rng.random_range(0..3) {
        0 => {
            let target = team.flag.position.unwrap_or(team.flag_spawn_location);
            (target, format!("Attacking {} flag.", team.name))
        }
        1 => (
            team.flag_score_location,
            format!("Attacking {} score location.", team.name),
        ),
        _ => {
            let (width, height) = level;
            let target = Vector2::new(
                rng.random::<f64>() * width,
                rng.random::<f64>() * height,
            );
            (target, format!("Attacking {target}."))
        }
    }
}

fn pick_order(bot: &str, target: Vector2, text: String, rng: &mut impl Rng) -> ClientMessage {
    match rng.random_range(0..4) {
        0 => Move::new(bot, text, [target]).into(),
        1 => Attack::new(bot, text, [target]).into(),
        2 => Defend::from_directions(
            bot,
            "Defending",
            [
                vec![1.0, 1.0],
                vec![1.0, -1.0, 1.0],
                vec![-1.0, -1.0, 2.0],
                vec![-1.0, 1.0, 0.0],
            ],
        )
        .into(),
        _ => Charge::new(bot, text, [target]).into(),
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

fn address() -> Result<String, String> {
    let args: Vec<String> = std::env::args().collect();
    match args.as_slice() {
        [_, host, port, ..] => {
            let port: u16 = port
                .parse()
                .map_err(|_| format!("invalid port number: {port}"))?;
            Ok(format!("{host}:{port}"))
        }
        _ => Ok(DEFAULT_ADDRESS.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    aisandbox::init_tracing();

    let addr = address()?;
    let mut session = Session::builder()
        .address(addr)
        .commander_name("RustRandom")
        .connect()
        .await
        .map_err(AiSandboxError::from)?;

    let mut level = (0.0, 0.0);
    let mut initialized = false;
    let mut rng = rand::rng();

    while let Some(update) = session.recv().await {
        match update {
            Update::Level(info) => {
                level = (info.width, info.height);
                tracing::info!(width = info.width, height = info.height, "level loaded");
            }
            Update::Game(game) => {
                // The first snapshot only needs acknowledging; orders start
                // with the first real tick.
                if !initialized {
                    initialized = true;
                    session.send(ClientMessage::Ready).await?;
                    continue;
                }

                let orders: Vec<ClientMessage> = game
                    .own_bots()
                    .filter(|bot| bot.is_alive() && bot.is_idle())
                    .map(|bot| {
                        let (target, text) = pick_target(&game, level, &mut rng);
                        pick_order(&bot.name, target, text, &mut rng)
                    })
                    .collect();
                for order in orders {
                    session.send(order).await?;
                }
            }
        }
    }

    tracing::info!("received <shutdown> from server");
    session.close().await?;
    Ok(())
}
