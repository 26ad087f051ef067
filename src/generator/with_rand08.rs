//! Integration with `rand` (v0.8) crate.

use super::{RandSource, StdSystemTime, V7Generator};
use rand::RngCore;

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
    fn next_bits(&mut self, bits: u32) -> u64 {
        match bits {
            0 => 0,
            1..=32 => u64::from(self.0.next_u32()) >> (32 - bits),
            33..=64 => self.0.next_u64() >> (64 - bits),
            _ => panic!("bit width out of range: {}", bits),
        }
    }
}

impl<T: RngCore> V7Generator<Adapter<T>, StdSystemTime> {
    /// Creates a generator object with a specified random number generator that
    /// implements [`RngCore`] from `rand` (v0.8) crate.
    pub const fn with_rand08(rng: T) -> Self {
        Self::new(Adapter(rng))
    }
}
