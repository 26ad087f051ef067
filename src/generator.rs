//! UUIDv7 generator and related types.

use std::{thread, time};

use crate::Uuid;

pub mod with_rand08;

const NS_PER_MS: u64 = 1_000_000;

const RAND_A_BITS: u32 = 12;
const RAND_B_BITS: u32 = 62;

/// Size of the random step added to `rand_b` on a timestamp collision. The one
/// tunable constant in the layout: exhausting the 62-bit field takes on the order
/// of 2^31 colliding calls within a single millisecond.
const INCREMENT_BITS: u32 = 31;

/// One tick of the sub-millisecond precision unit (1 ms / 2^12, about 244 ns),
/// used as the back-off interval while waiting out an exhausted counter.
const TICK: time::Duration = time::Duration::from_nanos(NS_PER_MS / (1 << RAND_A_BITS));

/// A trait that defines the clock interface for [`V7Generator`].
pub trait TimeSource {
    /// Returns the current time as nanoseconds since the Unix epoch.
    fn unix_ts_ns(&mut self) -> u64;
}

/// The default time source reading the system wall clock.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ns(&mut self) -> u64 {
        time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .expect("clock may have gone backwards")
            .as_nanos() as u64
    }
}

/// Closures with the matching signature work as time sources directly; tests use
/// this to replay prepared nanosecond sequences.
impl<F: FnMut() -> u64> TimeSource for F {
    fn unix_ts_ns(&mut self) -> u64 {
        self()
    }
}

/// A trait that defines the random number generator interface for [`V7Generator`].
pub trait RandSource {
    /// Returns a uniformly distributed random integer in `[0, 2^bits)`.
    ///
    /// `bits` is at most 64. The generator range-checks every returned value and
    /// panics on a source that produces out-of-range results.
    fn next_bits(&mut self, bits: u32) -> u64;
}

/// Closures with the matching signature work as randomness sources directly;
/// tests use this to replay prepared draw sequences.
impl<F: FnMut(u32) -> u64> RandSource for F {
    fn next_bits(&mut self, bits: u32) -> u64 {
        self(bits)
    }
}

/// The last emitted identifier, broken out into the fields the next call compares
/// against and the full integer value the ordering guarantee is checked with.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct LastEmitted {
    unix_ts_ms: u64,
    rand_a: u16,
    rand_b: u64,
    value: u128,
}

/// Represents a UUIDv7 generator that guarantees each emitted identifier is
/// strictly greater, as an unsigned 128-bit integer, than the one before it.
///
/// The 12-bit `rand_a` field carries the sub-millisecond remainder of the sampled
/// timestamp, so identifiers generated within the same millisecond still order by
/// time. When even that tuple does not advance (rapid repeated calls, or a clock
/// stepping backwards), the previous timestamp fields are reused and the 62-bit
/// `rand_b` field is grown by a random positive step instead.
///
/// Both the clock and the randomness source are constructor-injected, so every
/// code path is reproducible under test. The generator owns its state exclusively
/// and performs no internal locking; share one instance across threads through a
/// mutex, as the crate-level [`uuid7()`](crate::uuid7) function does:
///
/// ```rust
/// use rand::rngs::OsRng;
/// use std::{sync, thread};
/// use uuid7_mono::V7Generator;
///
/// let g = sync::Arc::new(sync::Mutex::new(V7Generator::with_rand08(OsRng)));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = sync::Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.lock().unwrap().generate(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct V7Generator<R, T = StdSystemTime> {
    prev: Option<LastEmitted>,

    /// The random number generator used by the generator.
    rng: R,

    /// The clock used by the generator.
    clock: T,
}

impl<R: RandSource> V7Generator<R> {
    /// Creates a generator reading the system wall clock.
    pub const fn new(rng: R) -> Self {
        Self::with_rand_and_time_sources(rng, StdSystemTime)
    }
}

impl<R: RandSource, T: TimeSource> V7Generator<R, T> {
    /// Creates a generator with explicit randomness and time sources.
    pub const fn with_rand_and_time_sources(rng: R, clock: T) -> Self {
        Self {
            prev: None,
            rng,
            clock,
        }
    }

    /// Generates a new UUIDv7 object.
    ///
    /// In the vanishingly rare case that `rand_b` runs out of room before the
    /// clock advances, this method logs a warning, sleeps for one tick of the
    /// sub-millisecond precision unit, and retries until the clock moves past the
    /// stalled millisecond. The loop is self-terminating with any real clock;
    /// only a frozen artificial time source can keep it spinning.
    pub fn generate(&mut self) -> Uuid {
        loop {
            if let Some(uuid) = self.try_generate() {
                return uuid;
            }
            tracing::warn!(
                "rand_b counter exhausted before the clock advanced; \
                 the system clock is stalled or has gone backwards"
            );
            thread::sleep(TICK);
        }
    }

    /// Runs one pass of the generation algorithm, returning `None` when the
    /// colliding-timestamp counter overflows its 62-bit field.
    fn try_generate(&mut self) -> Option<Uuid> {
        let unix_ts_ns = self.clock.unix_ts_ns();
        let mut unix_ts_ms = unix_ts_ns / NS_PER_MS;
        assert!(
            unix_ts_ms < 1 << 48,
            "timestamp out of 48-bit millisecond range"
        );

        // scale the sub-millisecond remainder into the 12-bit rand_a field
        let mut rand_a = (((unix_ts_ns % NS_PER_MS) << RAND_A_BITS) / NS_PER_MS) as u16;

        let rand_b = match self.prev {
            Some(prev) if (unix_ts_ms, rand_a) <= (prev.unix_ts_ms, prev.rand_a) => {
                // the clock stalled or went backwards: keep the previous time
                // fields and grow rand_b by a random step in [1, 2^31]
                unix_ts_ms = prev.unix_ts_ms;
                rand_a = prev.rand_a;
                let rand_b = prev.rand_b + self.draw(INCREMENT_BITS) + 1;
                if rand_b >> RAND_B_BITS != 0 {
                    return None;
                }
                rand_b
            }
            _ => self.draw(RAND_B_BITS),
        };

        let uuid = Uuid::from_fields_v7(unix_ts_ms, rand_a, rand_b);
        let value = uuid.as_u128();
        if let Some(prev) = self.prev {
            // correctness oracle, not business logic; a trip means a defect
            assert!(
                prev.value < value,
                "generated a UUID that was not greater than the previous: {} -> {}",
                Uuid::from(prev.value),
                uuid,
            );
        }
        self.prev = Some(LastEmitted {
            unix_ts_ms,
            rand_a,
            rand_b,
            value,
        });
        Some(uuid)
    }

    /// Draws `bits` random bits from the source, failing fast on a source that
    /// returns a value outside the requested range.
    fn draw(&mut self, bits: u32) -> u64 {
        let value = self.rng.next_bits(bits);
        assert!(
            bits >= 64 || value >> bits == 0,
            "random source returned a value outside [0, 2^{})",
            bits,
        );
        value
    }
}

/// Supports operations as an infinite iterator that produces a new UUIDv7 object
/// for each call of `next()`.
///
/// # Examples
///
/// ```rust
/// use uuid7_mono::V7Generator;
///
/// V7Generator::with_rand08(rand::thread_rng())
///     .enumerate()
///     .skip(4)
///     .take(4)
///     .for_each(|(i, e)| println!("[{}] {}", i, e));
/// ```
impl<R: RandSource, T: TimeSource> Iterator for V7Generator<R, T> {
    type Item = Uuid;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: RandSource, T: TimeSource> std::iter::FusedIterator for V7Generator<R, T> {}

#[cfg(test)]
mod tests {
    use super::V7Generator;
    use crate::Uuid;

    /// Returns a randomness source backed by the thread RNG.
    fn thread_rand_source() -> impl FnMut(u32) -> u64 {
        |bits| {
            if bits == 0 {
                0
            } else {
                rand::random::<u64>() >> (64 - bits)
            }
        }
    }

    /// Returns a source that replays the given values and panics when exhausted.
    fn replay(values: &[u64]) -> impl FnMut() -> u64 {
        let mut iter = values.to_vec().into_iter();
        move || iter.next().expect("replayed source exhausted")
    }

    /// Produces the documented value for fixed time and randomness inputs
    #[test]
    fn produces_the_documented_value_for_fixed_time_and_randomness_inputs() {
        let mut g = V7Generator::with_rand_and_time_sources(
            |_bits: u32| 258941218144316131u64,
            || 1685940240093527761u64,
        );

        let uuid = g.generate();
        assert_eq!(uuid.to_string(), "018889de-7edd-7871-8397-f1aa7d32eae3");
        assert_eq!(uuid.unix_ts_ms(), 1685940240093);
        assert_eq!(uuid.rand_a(), 0x871);
        assert_eq!(uuid.rand_b(), 258941218144316131);
    }

    /// Increments rand_b by the drawn step plus one on a colliding timestamp
    #[test]
    fn increments_rand_b_by_the_drawn_step_plus_one_on_a_colliding_timestamp() {
        let mut rand = replay(&[258941218144316131, 2]);
        let mut g = V7Generator::with_rand_and_time_sources(
            move |_bits: u32| rand(),
            || 1685940240093527761u64,
        );

        let first = g.generate();
        let second = g.generate();
        assert_eq!(first.to_string(), "018889de-7edd-7871-8397-f1aa7d32eae3");
        assert_eq!(second.to_string(), "018889de-7edd-7871-8397-f1aa7d32eae6");
        assert_eq!(second.as_u128(), first.as_u128() + 3);
        assert_eq!(second.unix_ts_ms(), first.unix_ts_ms());
        assert_eq!(second.rand_a(), first.rand_a());
    }

    /// Draws fresh rand_b values while the timestamp advances
    #[test]
    fn draws_fresh_rand_b_values_while_the_timestamp_advances() {
        let mut time = replay(&[1_000_000_000, 2_000_000_500, 3_000_250_000]);
        let mut rand = replay(&[111, 222, 333]);
        let mut g = V7Generator::with_rand_and_time_sources(
            move |bits: u32| {
                assert_eq!(bits, 62);
                rand()
            },
            move || time(),
        );

        let a = g.generate();
        let b = g.generate();
        let c = g.generate();

        assert_eq!(a.unix_ts_ms(), 1_000);
        assert_eq!(b.unix_ts_ms(), 2_000);
        assert_eq!(c.unix_ts_ms(), 3_000);
        assert_eq!(a.rand_a(), 0);
        assert_eq!(b.rand_a(), 2); // 500 ns of remainder, scaled by 4096/10^6
        assert_eq!(c.rand_a(), 1024); // a quarter of a millisecond
        assert_eq!((a.rand_b(), b.rand_b(), c.rand_b()), (111, 222, 333));
        assert!(a < b && b < c);
    }

    /// Recovers from counter exhaustion once the clock advances
    #[test]
    fn recovers_from_counter_exhaustion_once_the_clock_advances() {
        let mut time = replay(&[0, 0, 1_000_000]);
        let mut rand = replay(&[(1 << 62) - 1, 1, 15]);
        let mut g =
            V7Generator::with_rand_and_time_sources(move |_bits: u32| rand(), move || time());

        let first = g.generate();
        assert_eq!(first.to_string(), "00000000-0000-7000-bfff-ffffffffffff");

        // the second pass trips the overflow check, backs off, and resumes with
        // the advanced millisecond and a fresh draw
        let second = g.generate();
        assert_eq!(second.to_string(), "00000000-0001-7000-8000-00000000000f");
        assert!(first < second);
    }

    /// Generates increasing UUIDs even with decreasing or constant timestamp
    #[test]
    fn generates_increasing_uuids_even_with_decreasing_or_constant_timestamp() {
        const N: u64 = 100_000;
        let ts_ns = 0x0123_4567_89abu64 * 1_000_000;
        let mut i = 0u64;
        // the clock never advances here, so keep fresh draws out of the top of
        // the rand_b field and leave the counter ample headroom
        let rand = |bits: u32| rand::random::<u64>() >> (64 - bits) >> 1;
        let mut g = V7Generator::with_rand_and_time_sources(rand, move || {
            i += 1;
            ts_ns - (i * 997).min(4_000_000_000)
        });

        let mut prev = g.generate();
        assert_eq!(prev.unix_ts_ms(), 0x0123_4567_89ab - 1);
        for _ in 0..N {
            let curr = g.generate();
            assert!(prev < curr);
            assert!(prev.as_u128() < curr.as_u128());
            prev = curr;
        }
    }

    /// Keeps version and variant bits constant for arbitrary inputs
    #[test]
    fn keeps_version_and_variant_bits_constant_for_arbitrary_inputs() {
        let mut i = 0u64;
        let mut g = V7Generator::with_rand_and_time_sources(thread_rand_source(), move || {
            i = i
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            i >> 4
        });

        let mut prev = Uuid::NIL;
        for _ in 0..10_000 {
            let e = g.generate();
            assert_eq!(e.version(), 7);
            assert_eq!(e.variant(), 0b10);
            assert!(prev < e);
            prev = e;
        }
    }

    /// Round-trips every generated value through the canonical text form
    #[test]
    fn round_trips_every_generated_value_through_the_canonical_text_form() {
        let mut g = V7Generator::new(thread_rand_source());
        for _ in 0..10_000 {
            let e = g.generate();
            let parsed: Uuid = e.to_string().parse().unwrap();
            assert_eq!(parsed, e);
            assert_eq!(parsed.as_u128(), e.as_u128());
        }
    }

    /// Panics on a randomness source returning out-of-range values
    #[test]
    #[should_panic(expected = "outside")]
    fn panics_on_a_randomness_source_returning_out_of_range_values() {
        let mut g = V7Generator::with_rand_and_time_sources(
            |_bits: u32| u64::MAX,
            || 1685940240093527761u64,
        );
        g.generate();
    }
}
