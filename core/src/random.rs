use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniformly distributed bytes for CXNN, owned by a single machine
#[derive(Debug, Clone)]
pub struct RandomByteSource {
    rng: StdRng,
}

impl RandomByteSource {
    /// Seeded by the operating system
    pub fn from_os() -> Self {
        RandomByteSource {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Produces the same bytes for the same seed
    pub fn seeded(seed: u64) -> Self {
        RandomByteSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_byte(&mut self) -> u8 {
        self.rng.random()
    }
}
