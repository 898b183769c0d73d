//! Per-worker random streams.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Error, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Random stream owned by one worker for one run.
///
/// Built from the run's master seed and the worker rank, so rerunning with the
/// same seed and worker count reproduces every draw. Steps borrow it through
/// their environment and never create their own.
#[derive(Debug, Clone)]
pub struct RngHandle {
    seed: u64,
    rng: StdRng,
}

impl RngHandle {
    /// A stream seeded directly with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The stream of worker `rank` in a run seeded with `master_seed`.
    pub fn for_rank(master_seed: u64, rank: usize) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, rank as u64))
    }

    /// Seed this stream was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Seed of substream `substream` under `master_seed`.
///
/// SipHash-1-3 with zero keys over both values; stable across platforms.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
