//! Default generator and entry point function.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;

use crate::Uuid;
use inner::GlobalGenInner;

/// Returns the lock handle of process-wide global generator, creating one if none exists.
fn lock_global_gen() -> sync::MutexGuard<'static, GlobalGenInner> {
    static G: sync::OnceLock<sync::Mutex<GlobalGenInner>> = sync::OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .expect("uuid7-mono: could not lock global generator")
}

/// Generates a UUIDv7 object.
///
/// This function employs a process-wide default generator and guarantees that every
/// value it returns is strictly greater than the previous one, even within the same
/// millisecond. On Unix, the generator is reset when the process ID changes (i.e.,
/// upon process forks) to prevent collisions across processes.
///
/// The default generator is an ordinary [`V7Generator`](crate::V7Generator) behind a
/// mutex; code that needs an isolated ordering scope, or deterministic time and
/// randomness, constructs its own instance instead of calling this function.
///
/// # Examples
///
/// ```rust
/// let uuid = uuid7_mono::uuid7();
/// println!("{}", uuid); // e.g., "018889de-7edd-7871-8397-f1aa7d32eae3"
/// println!("{:032x}", uuid.as_u128()); // as a raw 128-bit integer
/// ```
pub fn uuid7() -> Uuid {
    lock_global_gen().get_mut().generate()
}

mod inner {
    use rand::rngs::{adapter::ReseedingRng, OsRng};
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Core;

    use crate::generator::{with_rand08::Adapter, StdSystemTime, V7Generator};

    /// The random number generator behind the global generator: [`ChaCha12Core`]
    /// with a [`ReseedingRng`] wrapper, emulating the strategy of
    /// [`rand::rngs::ThreadRng`].
    type GlobalGenRng = Adapter<ReseedingRng<ChaCha12Core, OsRng>>;

    const RESEED_THRESHOLD: u64 = 1024 * 64;

    /// A thin wrapper to reset the state when the process ID changes (i.e., upon Unix forks).
    #[derive(Debug)]
    pub struct GlobalGenInner {
        #[cfg(unix)]
        pid: u32,
        generator: V7Generator<GlobalGenRng, StdSystemTime>,
    }

    impl Default for GlobalGenInner {
        fn default() -> Self {
            Self {
                #[cfg(unix)]
                pid: std::process::id(),
                generator: V7Generator::new(Adapter(ReseedingRng::new(
                    ChaCha12Core::from_entropy(),
                    RESEED_THRESHOLD,
                    OsRng,
                ))),
            }
        }
    }

    impl GlobalGenInner {
        /// Returns a mutable reference to the inner [`V7Generator`] instance,
        /// resetting the generator state on Unix if the process ID has changed.
        pub fn get_mut(&mut self) -> &mut V7Generator<GlobalGenRng, StdSystemTime> {
            #[cfg(unix)]
            if self.pid != std::process::id() {
                *self = Default::default();
            }
            &mut self.generator
        }
    }
}
