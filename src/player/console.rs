use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::config::GameConfig;
use crate::coord::{Coordinate, MoveCodec};
use crate::fog::{FogBoard, FogCell};
use crate::game::MoveRejection;

use super::{GameOutcome, Player, ShotNotice, Turn};

/// Human player typing moves such as `C5` (or `q` to quit).
pub struct ConsolePlayer<R> {
    name: String,
    input: R,
    codec: MoveCodec,
    letters: Vec<char>,
}

impl ConsolePlayer<BufReader<Stdin>> {
    pub fn stdin(name: impl Into<String>, config: &GameConfig) -> Self {
        Self::new(name, config, BufReader::new(tokio::io::stdin()))
    }
}

impl<R> ConsolePlayer<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(name: impl Into<String>, config: &GameConfig, input: R) -> Self {
        Self {
            name: name.into(),
            input,
            codec: MoveCodec::new(config),
            letters: config
                .alphabet
                .chars()
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        }
    }

    /// Next input line, `None` at end of input.
    async fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_view(&self, view: &FogBoard) {
        print!("   ");
        for x in 0..view.width() {
            print!(" {}", self.letters.get(x).copied().unwrap_or('?'));
        }
        println!();
        for y in 0..view.height() {
            print!("{:2} ", y + 1);
            for x in 0..view.width() {
                let ch = match view.get(Coordinate::new(x, y)) {
                    Some(FogCell::ShipHit) => 'X',
                    Some(FogCell::Water) => 'o',
                    _ => '.',
                };
                print!(" {}", ch);
            }
            println!();
        }
    }
}

#[async_trait::async_trait]
impl<R> Player for ConsolePlayer<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_move(&mut self, view: &FogBoard) -> anyhow::Result<Turn> {
        self.print_view(view);
        loop {
            println!("Your move (e.g. C5, q to quit):");
            let Some(line) = self.read_line().await? else {
                return Ok(Turn::Exit);
            };
            if matches!(line.to_ascii_lowercase().as_str(), "q" | "quit" | "exit") {
                return Ok(Turn::Exit);
            }
            match self.codec.decode(&line) {
                Ok(c) if view.is_valid_target(c) => return Ok(Turn::Fire(c)),
                Ok(_) => println!("You already fired at {}.", line.to_ascii_uppercase()),
                Err(e) => println!("{}", e),
            }
        }
    }

    async fn shot_resolved(&mut self, notice: &ShotNotice) -> anyhow::Result<()> {
        let token = self
            .codec
            .encode(notice.coord)
            .unwrap_or_else(|_| notice.coord.to_string());
        let result = if notice.sunk {
            "hit and sunk"
        } else if notice.hit {
            "hit"
        } else {
            "miss"
        };
        if notice.own_shot {
            println!("You fired at {}: {}", token, result);
        } else {
            println!("{} fired at {}: {}", notice.shooter, token, result);
        }
        if !notice.game_over {
            if notice.my_turn {
                println!("Your turn.");
            } else {
                println!("Waiting for {}...", notice.next);
            }
        }
        Ok(())
    }

    async fn move_rejected(&mut self, reason: &MoveRejection) -> anyhow::Result<()> {
        println!("Move rejected: {}", reason);
        Ok(())
    }

    async fn error(&mut self, reason: &str) -> anyhow::Result<()> {
        println!("Error: {}", reason);
        Ok(())
    }

    async fn game_over(&mut self, outcome: &GameOutcome) -> anyhow::Result<()> {
        match (&outcome.winner, outcome.won) {
            (_, true) => println!("You won!"),
            (Some(winner), false) => println!("{} won the game.", winner),
            (None, _) => println!("The game was aborted."),
        }
        Ok(())
    }

    async fn rename(&mut self, taken: &str) -> anyhow::Result<Option<String>> {
        println!("The name {:?} is taken. Choose another (empty to give up):", taken);
        match self.read_line().await? {
            Some(name) if !name.is_empty() => {
                self.name = name.clone();
                Ok(Some(name))
            }
            _ => Ok(None),
        }
    }
}
