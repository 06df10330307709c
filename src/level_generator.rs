//! Skip lists use a probabilistic distribution of nodes over their internal
//! levels: the lowest level contains every node, and each level above it
//! holds a random subset of the level below.
//!
//! Most commonly the subset is geometric: a node present at some level is
//! present at the next with a fixed probability `p`.  The [`Geometric`]
//! generator implements that distribution and is what the list types use by
//! default; custom generators are possible but rarely needed.
//!
//! [`Geometric`]: geometric::Geometric

pub mod geometric;

pub use geometric::Geometric;

/// Draws the height of each newly inserted node.
///
/// A node's height is the number of forward links it carries, and is fixed
/// for the node's lifetime at the moment of insertion.
pub trait LevelGenerator {
    /// The maximum height this generator will ever return.
    fn total(&self) -> usize;

    /// Draw a height for a new node, in the range `[1, total]`.
    fn level(&mut self) -> usize;
}
