use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaChaRng;

/// Builds the rng used for workload generation and fuel reserves.
/// Without an explicit seed the current time in milliseconds is used.
pub fn seeded_rng(seed: Option<u128>) -> ChaChaRng {
    let init = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    });
    let mut bytes = [0_u8; 32];
    bytes.iter_mut().zip(init.to_be_bytes().into_iter()).for_each(|(s, i)| *s = i);
    bytes.iter_mut().rev().zip(init.to_le_bytes().into_iter()).for_each(|(s, i)| *s = i);
    ChaChaRng::from_seed(bytes)
}
