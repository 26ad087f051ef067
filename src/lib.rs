//! UUIDv7 generation with sub-millisecond timestamp precision and a monotonic
//! random counter
//!
//! ```rust
//! use uuid7_mono::uuid7;
//!
//! let uuid = uuid7();
//! println!("{}", uuid); // e.g. "018889de-7edd-7871-8397-f1aa7d32eae3"
//! println!("{:032x}", uuid.as_u128()); // as a raw 128-bit integer
//! ```
//!
//! See [RFC 9562](https://www.rfc-editor.org/rfc/rfc9562).
//!
//! # Field and bit layout
//!
//! This implementation produces identifiers with the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ms                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          unix_ts_ms           |  ver  |        rand_a         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|                        rand_b                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            rand_b                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 48-bit `unix_ts_ms` field is dedicated to the Unix timestamp in
//!   milliseconds.
//! - The 4-bit `ver` field is set at `0111`.
//! - The 12-bit `rand_a` field carries the sub-millisecond remainder of the
//!   sampled timestamp, scaled into `[0, 4096)`. Despite the RFC field name, it is
//!   a deterministic function of the clock reading, not an independent random
//!   draw; it orders identifiers generated within the same millisecond.
//! - The 2-bit `var` field is set at `10`.
//! - The 62-bit `rand_b` field is filled with a cryptographically strong random
//!   number whenever the `(unix_ts_ms, rand_a)` pair advances. When it does not
//!   (rapid repeated calls, or a clock stepping backwards), the previous `rand_b`
//!   is incremented by a random amount in `[1, 2^31]` instead, so each identifier
//!   is strictly greater than the last as an unsigned 128-bit integer.
//!
//! In the very rare circumstances where the incremented `rand_b` no longer fits
//! its 62-bit field before the clock advances, the generator logs a warning,
//! sleeps for one tick of the sub-millisecond precision unit (about 244 ns), and
//! retries with a fresh clock reading. The ordering guarantee is never given up:
//! a call blocks until the clock moves past the stalled millisecond rather than
//! emit a smaller or duplicate value.

mod id;
pub use id::{ParseError, Uuid};

pub mod generator;
pub use generator::V7Generator;

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::uuid7;
