//! Single-player match against a local opponent, without any networking.

use log::info;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;

use crate::board::Board;
use crate::config::GameConfig;
use crate::game::{Match, MatchStatus, Side};
use crate::player::Player;
use crate::session::play;

/// Summary of a finished local match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalReport {
    /// Name of the winner, `None` if the match was aborted.
    pub winner: Option<String>,
    /// Name of the side that moved first.
    pub first: String,
    pub shots: [usize; 2],
    pub scores: [u32; 2],
}

pub struct LocalGame {
    config: GameConfig,
    rng: SmallRng,
}

impl LocalGame {
    pub fn new(config: GameConfig, rng: SmallRng) -> Self {
        Self { config, rng }
    }

    /// Deal random boards, pick who starts at random and play to the end.
    /// Shots and scores in the report are ordered `[one, two]`.
    pub async fn run<'a>(
        &mut self,
        one: &'a mut dyn Player,
        two: &'a mut dyn Player,
    ) -> anyhow::Result<LocalReport> {
        let board_one =
            Board::random(&self.config, &mut self.rng).map_err(|e| anyhow::anyhow!(e))?;
        let board_two =
            Board::random(&self.config, &mut self.rng).map_err(|e| anyhow::anyhow!(e))?;
        let one_starts: bool = self.rng.random();
        info!(
            "{} moves first",
            if one_starts { one.name() } else { two.name() }
        );

        let (first, second, first_board, second_board) = if one_starts {
            (one, two, board_one, board_two)
        } else {
            (two, one, board_two, board_one)
        };
        let mut game = Match::new(first_board, second_board, Side::First, self.config.turn_rule);
        let status = play(&mut game, &mut *first, &mut *second).await?;

        let winner = match status {
            MatchStatus::Won(Side::First) => Some(first.name().to_string()),
            MatchStatus::Won(Side::Second) => Some(second.name().to_string()),
            _ => None,
        };
        let (one_side, two_side) = if one_starts {
            (Side::First, Side::Second)
        } else {
            (Side::Second, Side::First)
        };
        Ok(LocalReport {
            winner,
            first: first.name().to_string(),
            shots: [
                game.view(one_side).shots_fired(),
                game.view(two_side).shots_fired(),
            ],
            scores: [game.view(one_side).score(), game.view(two_side).score()],
        })
    }
}
