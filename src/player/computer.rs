use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::fog::FogBoard;

use super::{Player, Turn};

/// Computer opponent that fires at a uniformly random unexplored cell.
pub struct ComputerPlayer {
    name: String,
    rng: SmallRng,
}

impl ComputerPlayer {
    pub fn new(name: impl Into<String>, rng: SmallRng) -> Self {
        Self {
            name: name.into(),
            rng,
        }
    }
}

#[async_trait::async_trait]
impl Player for ComputerPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_move(&mut self, view: &FogBoard) -> anyhow::Result<Turn> {
        let targets = view.unknown_cells();
        Ok(match targets.choose(&mut self.rng) {
            Some(&c) => Turn::Fire(c),
            None => Turn::Exit,
        })
    }

    async fn rename(&mut self, taken: &str) -> anyhow::Result<Option<String>> {
        self.name = format!("{}-{}", taken, self.rng.random_range(100..1000));
        Ok(Some(self.name.clone()))
    }
}
