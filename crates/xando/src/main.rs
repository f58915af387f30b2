//! xando - terminal front end
//!
//! Local play on stdin/stdout, and a self-playing demo of the remote protocol.

#![warn(missing_docs)]

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;
use xando::{
    Difficulty, DocumentStore, GameConfig, InMemoryStore, LocalEvent, LocalGame, LocalSession,
    Mirror, Outcome, RemoteEvent, RemoteGame, RemoteSession, Strategy, generate_identity,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Play {
            mode,
            difficulty,
            ai_delay_ms,
        } => {
            let mut config = config;
            if let Some(mode) = mode {
                config = config.with_mode(mode.into());
            }
            if let Some(difficulty) = difficulty {
                config = config.with_difficulty(difficulty.into());
            }
            if let Some(ms) = ai_delay_ms {
                config = config.with_ai_delay_ms(ms);
            }
            run_play(config).await
        }
        Command::OnlineDemo { x, o } => run_online_demo(config, x.into(), o.into()).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => Ok(GameConfig::from_file(path)?),
        None => {
            debug!("No config file given, using defaults");
            Ok(GameConfig::default())
        }
    }
}

/// Play a local game on this terminal
#[instrument(skip(config), fields(mode = %config.mode(), difficulty = %config.difficulty()))]
async fn run_play(config: GameConfig) -> Result<()> {
    info!("Starting local game");
    let session = LocalSession::from_config(&config);
    let mut game = LocalGame::spawn(session, config.ai_delay());

    println!("Cells are numbered 1-9, left to right, top to bottom. 'r' resets, 'q' quits.");
    println!("{}", xando::Board::new().display());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "q" => break,
                    "r" => game.reset()?,
                    input => match input.parse::<usize>() {
                        Ok(n) if (1..=9).contains(&n) => game.play(n - 1)?,
                        _ => println!("Type a cell number 1-9, 'r' or 'q'."),
                    },
                }
            }
            event = game.next_event() => {
                let Some(event) = event else { break };
                render_local(&event);
            }
        }
    }

    game.shutdown().await;
    Ok(())
}

fn render_local(event: &LocalEvent) {
    match event {
        LocalEvent::MoveApplied { player, index, board } => {
            println!("{} takes {}", player, index + 1);
            println!("{}", board.display());
        }
        LocalEvent::AiThinking => println!("Computer is thinking..."),
        LocalEvent::Rejected(e) => println!("{}", e),
        LocalEvent::GameOver(outcome) => println!("{}. 'r' to play again, 'q' to quit.", outcome),
        LocalEvent::Reset => {
            println!("New game.");
            println!("{}", xando::Board::new().display());
        }
    }
}

/// Two computer clients matchmake against one store and play a full game
#[instrument(skip(config))]
async fn run_online_demo(config: GameConfig, x: Difficulty, o: Difficulty) -> Result<()> {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let collection = config.collection().clone();

    let first =
        RemoteSession::matchmake(store.clone(), collection.clone(), generate_identity()).await?;
    let second = RemoteSession::matchmake(store.clone(), collection, generate_identity()).await?;
    info!(
        x = first.identity(),
        o = second.identity(),
        game_id = %first.mirror().game_id(),
        "Both clients attached"
    );

    let mut clients = [
        DemoClient::new(RemoteGame::spawn(first), x),
        DemoClient::new(RemoteGame::spawn(second), o),
    ];

    while clients.iter().any(|c| c.outcome.is_none()) {
        let [a, b] = &mut clients;
        let (client, event) = tokio::select! {
            event = a.game.next_event() => (a, event),
            event = b.game.next_event() => (b, event),
        };
        match event {
            Some(event) => client.handle(event)?,
            None => break,
        }
    }

    if let Some(outcome) = clients[0].outcome {
        println!("{}", outcome);
    }
    for client in clients {
        client.game.teardown().await;
    }
    Ok(())
}

struct DemoClient {
    game: RemoteGame,
    ai: xando::AiStrategy,
    outcome: Option<Outcome>,
}

impl DemoClient {
    fn new(game: RemoteGame, difficulty: Difficulty) -> Self {
        Self {
            game,
            ai: difficulty.strategy(),
            outcome: None,
        }
    }

    fn handle(&mut self, event: RemoteEvent) -> Result<()> {
        match event {
            RemoteEvent::Synced(mirror) => self.on_synced(&mirror)?,
            RemoteEvent::Rejected(e) => debug!(error = %e, "Demo move rejected"),
            RemoteEvent::Error(e) => warn!(error = %e, "Demo client error"),
            RemoteEvent::OpponentLeft | RemoteEvent::Closed => {
                self.outcome.get_or_insert(Outcome::InProgress);
            }
        }
        Ok(())
    }

    fn on_synced(&mut self, mirror: &Mirror) -> Result<()> {
        let outcome = mirror.outcome();
        if outcome.is_terminal() {
            if self.outcome.is_none() {
                println!("{} sees:\n{}", mirror.symbol(), mirror.board().display());
            }
            self.outcome = Some(outcome);
            return Ok(());
        }
        if mirror.is_active() && mirror.is_my_turn() {
            if let Some(index) = self.ai.select_move(mirror.board(), *mirror.symbol()) {
                self.game.play(index)?;
            }
        }
        Ok(())
    }
}
