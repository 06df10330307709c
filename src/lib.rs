//! A sorted set in the style of the Redis ZSET: unique keys mapped to values
//! that are kept ordered by a caller-supplied predicate, with `O(log(n))`
//! access to the rank (1-based sorted position) of any key.
//!
//! The backing structure is a skip list whose forward links are augmented
//! with *span* counters:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! Each node carries a tower of forward links, and every link records how
//! many bottom-level steps it crosses.  Summing the spans crossed during a
//! descent yields the rank of the node reached, so ranking, access by rank,
//! and rank-windowed scans all run in the same `O(log(n))` expected time as
//! search.
//!
//! Two types are exposed.  [`RankedSkipList`] is the ordered multiset itself:
//! values sorted by a `less` predicate, addressable by rank.  [`ZSet`] layers
//! a key index on top: every key is unique, and an update through an existing
//! key repositions its value (mutating in place when the new value would not
//! move).
//!
//! # Safety
//!
//! Both structures rely on a well-behaved ordering predicate.  Given some
//! predicate `less(a, b)`, it **must** be a strict weak ordering:
//!
//! - Irreflexive: `less(a, a)` is always false.
//! - Asymmetric: if `less(a, b)` then `!less(b, a)`.
//! - Transitive: if `less(a, b)` and `less(b, c)` then `less(a, c)`, and the
//!   induced equivalence (`!less(a, b) && !less(b, a)`) is transitive too.
//!
//! A predicate which violates these properties produces an incorrectly
//! ordered list and nonsense ranks, but never memory unsafety.

// In this library, the 'height' of a node is how many forward links it has
// (minimum 1).  'Level i' is the chain formed by the i-th links, level 0
// being the full list.  A link whose forward pointer is empty still has a
// meaningful span: the number of nodes remaining after it, which keeps the
// span sum of every level equal to the list length.

#![warn(missing_docs)]

mod free_list;
pub mod level_generator;
pub mod options;
pub mod ranked_skiplist;
mod skipnode;
pub mod zset;

pub use crate::options::{Options, OptionsError};
pub use crate::ranked_skiplist::RankedSkipList;
pub use crate::zset::{RangeIterator, ZSet};
