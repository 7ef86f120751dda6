use broadside::{ComputerPlayer, GameConfig, LocalGame};
use rand::{rngs::SmallRng, SeedableRng};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        eprintln!("Usage: {} <seed1> <seed2> [config.json]", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;
    let config = match args.get(3) {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };

    let mut p1 = ComputerPlayer::new("player1", SmallRng::seed_from_u64(seed1));
    let mut p2 = ComputerPlayer::new("player2", SmallRng::seed_from_u64(seed2));
    let dealer = SmallRng::seed_from_u64(seed1 ^ seed2.rotate_left(32));

    let report = LocalGame::new(config, dealer).run(&mut p1, &mut p2).await?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
