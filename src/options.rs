//! Construction-time knobs shared by [`RankedSkipList`](crate::RankedSkipList)
//! and [`ZSet`](crate::ZSet).

use thiserror::Error;

use crate::level_generator::geometric::GeometricError;

/// Default cap on skip-list height.  `(1/p)^MAX_LEVEL` comfortably exceeds
/// any element count a single process will hold.
pub const DEFAULT_MAX_LEVEL: usize = 32;

/// Default probability that a node present at one level is also present at
/// the next.
pub const DEFAULT_P: f64 = 0.25;

/// Default capacity of the recycled-node free list.
pub const DEFAULT_FREE_LIST_SIZE: usize = 32;

/// Tunables for a ranked skip list.
///
/// The defaults match the reference configuration and are suitable for
/// almost all workloads; construct with [`Options::default()`] and override
/// individual fields as needed.
///
/// # Examples
///
/// ```
/// use zset::{Options, ZSet};
///
/// let options = Options {
///     seed: Some(0x5eed),
///     ..Options::default()
/// };
/// let zs: ZSet<&str, i64> = ZSet::with_options(|a, b| a < b, options).unwrap();
/// assert!(zs.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    /// Hard cap on node height.  Must be at least
    /// [`DEFAULT_MAX_LEVEL`]; construction fails otherwise.
    pub max_level: usize,
    /// Level-promotion probability, in `(0, 1)`.
    pub p: f64,
    /// Capacity of the free list of recycled nodes.  `0` disables reuse.
    pub free_list_size: usize,
    /// Seed for the level generator's PRNG.  `None` seeds from entropy;
    /// supplying a seed makes the node heights (and therefore the exact
    /// link structure) reproducible.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_level: DEFAULT_MAX_LEVEL,
            p: DEFAULT_P,
            free_list_size: DEFAULT_FREE_LIST_SIZE,
            seed: None,
        }
    }
}

/// Errors that can occur when constructing a list from [`Options`].
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum OptionsError {
    /// `max_level` was below [`DEFAULT_MAX_LEVEL`].
    #[error("max_level must be at least {DEFAULT_MAX_LEVEL}.")]
    MaxLevelTooSmall,
    /// The level generator rejected its parameters.
    #[error(transparent)]
    LevelGenerator(#[from] GeometricError),
}
