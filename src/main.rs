use std::path::PathBuf;

use broadside::{
    init_logging, ComputerPlayer, ConsolePlayer, GameClient, GameConfig, LocalGame, Server,
    TcpTransport,
};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file overriding the default game configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair clients two at a time and host their games.
    Server {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Join a game hosted by a server.
    Client {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long)]
        name: String,
        /// Let the computer pick the moves.
        #[arg(long)]
        computer: bool,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Play against the computer on the local machine.
    Local {
        #[arg(long, default_value = "Player")]
        name: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Server { bind } => {
            println!("Starting server at {}...", bind);
            let listener = TcpListener::bind(&bind).await?;
            Server::new(config).run(listener).await?;
        }
        Commands::Client {
            connect,
            name,
            computer,
            seed,
        } => {
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let mut rng = make_rng(seed);
            println!("Connecting to {}...", connect);
            let transport = Box::new(TcpTransport::connect(&connect).await?);
            let outcome = if computer {
                let player = ComputerPlayer::new(name, SmallRng::from_rng(&mut rng));
                GameClient::new(config, transport, player, rng).run().await?
            } else {
                let player = ConsolePlayer::stdin(name, &config);
                GameClient::new(config, transport, player, rng).run().await?
            };
            match (outcome.winner, outcome.won) {
                (_, true) => println!("Result: won"),
                (Some(winner), false) => println!("Result: lost to {}", winner),
                (None, _) => println!("Result: aborted"),
            }
        }
        Commands::Local { name, seed } => {
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let mut rng = make_rng(seed);
            let mut human = ConsolePlayer::stdin(name, &config);
            let mut computer = ComputerPlayer::new("Computer", SmallRng::from_rng(&mut rng));
            let report = LocalGame::new(config, rng)
                .run(&mut human, &mut computer)
                .await?;
            println!(
                "Shots fired: {}, score: {}",
                report.shots[0], report.scores[0]
            );
        }
    }
    Ok(())
}
