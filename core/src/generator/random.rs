use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Uniformly random placement over every cell outside the safe zone.
#[derive(Clone, Debug)]
pub struct RandomMinePlacer {
    rng: SmallRng,
}

impl RandomMinePlacer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }
}

impl MinePlacer for RandomMinePlacer {
    fn place(&mut self, config: GameConfig, safe: &[Coord2]) -> Vec<Coord2> {
        let (width, height) = config.size;
        let mut candidates: Vec<Coord2> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|coords| !safe.contains(coords))
            .collect();

        let mut wanted = usize::from(config.mines);
        if wanted > candidates.len() {
            log::warn!(
                "Requested {} mines but only {} cells are free, placing fewer",
                wanted,
                candidates.len()
            );
            wanted = candidates.len();
        }

        // partial Fisher-Yates: the first `wanted` slots end up a uniform sample
        for i in 0..wanted {
            let j = self.rng.random_range(i..candidates.len());
            candidates.swap(i, j);
        }
        candidates.truncate(wanted);

        log::debug!("Placed {} mines avoiding {:?}", candidates.len(), safe);
        candidates
    }
}
