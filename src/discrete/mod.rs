//! The discrete random variable toolkit backing every sampling site of
//! the engine.
//!
//! All variables draw from one process wide generator. Determinism is
//! not a contract, tests work with statistical bounds instead.

mod boolvar;
mod intvar;

pub use boolvar::*;
pub use intvar::*;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};

/// The process wide generator, seeded once from the operating system.
/// Guarded by a lock so worker threads may sample as well.
static RNG: Lazy<Mutex<StdRng>> = Lazy::new(|| Mutex::new(StdRng::from_entropy()));

/// Runs a closure with exclusive access to the shared generator.
pub(crate) fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    let mut rng = RNG.lock();
    f(&mut rng)
}
