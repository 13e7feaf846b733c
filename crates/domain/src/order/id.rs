//! Order id generation.

use common::OrderId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Leading letters of every order id.
pub const ORDER_ID_PREFIX: &str = "ORD";

/// Number of decimal digits after the prefix.
pub const ORDER_ID_DIGITS: usize = 5;

/// Produces short, human-readable order ids such as `ORD48213`.
///
/// Ids are random, not sequential, and are not unique by construction:
/// storage rejects a duplicate and the caller retries with a fresh id.
#[derive(Debug, Clone)]
pub struct OrderIdGenerator<R = StdRng> {
    rng: R,
}

impl OrderIdGenerator<StdRng> {
    /// Creates a generator seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Creates a deterministic generator, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> OrderIdGenerator<R> {
    /// Creates a generator drawing from the given random source.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generates a fresh id: the prefix followed by five decimal digits.
    pub fn generate(&mut self) -> OrderId {
        let number: u32 = self.rng.random_range(10_000..=99_999);
        OrderId::new(format!(
            "{}{:0width$}",
            ORDER_ID_PREFIX,
            number,
            width = ORDER_ID_DIGITS
        ))
    }
}
