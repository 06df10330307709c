//! A sorted set of unique keys whose values are kept ordered, in the style
//! of the Redis ZSET.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ptr::NonNull;

use crate::options::{Options, OptionsError};
use crate::ranked_skiplist::RankedSkipList;
use crate::skipnode::{self, SkipNode};

/// What a node of the backing list stores: the value that determines the
/// ordering, together with the key that owns it, so that scans can report
/// keys without a reverse index.
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

// ////////////////////////////////////////////////////////////////////////////
// ZSet
// ////////////////////////////////////////////////////////////////////////////

/// A sorted set: a map from unique keys to values ordered by a
/// caller-supplied `less` predicate, with `O(log(n))` rank queries, access
/// by rank, and rank- or bound-windowed scans.
///
/// Adding a key that is already present repositions its value; when the new
/// value would sort to the same place, the stored value is overwritten in
/// place without touching any links.
///
/// Ranks are 1-based and ascending (rank 1 is the smallest value); rank 0
/// signals an absent key.  Range indices are 0-based and may be negative to
/// count from the largest end, as in `Vec`-slicing dialects of scripting
/// languages.
///
/// The predicate **must** be a strict weak ordering; see the
/// [crate documentation](crate) for the exact contract.
///
/// # Examples
///
/// ```
/// use zset::ZSet;
///
/// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
/// zs.add("Hurst", 88);
/// zs.add("Peek", 100);
/// zs.add("Beaty", 66);
///
/// assert_eq!(zs.rank("Hurst", false), 2);
/// assert_eq!(zs.rank("Peek", true), 1);
///
/// zs.remove("Peek");
/// assert_eq!(zs.rank("Hurst", true), 1);
/// ```
pub struct ZSet<K, V> {
    dict: HashMap<K, NonNull<SkipNode<Entry<K, V>>>>,
    list: RankedSkipList<Entry<K, V>>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K: 'static, V: 'static> ZSet<K, V> {
    /// Create a new empty set whose values are ordered by `less`, using the
    /// default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let zs: ZSet<String, f64> = ZSet::new(|a, b| a < b);
    /// assert!(zs.is_empty());
    /// ```
    #[inline]
    pub fn new<F>(less: F) -> Self
    where
        F: 'static + Fn(&V, &V) -> bool,
    {
        ZSet {
            dict: HashMap::new(),
            list: RankedSkipList::new(move |a: &Entry<K, V>, b: &Entry<K, V>| {
                less(&a.value, &b.value)
            }),
        }
    }

    /// Create a new empty set with explicit [`Options`].
    ///
    /// # Errors
    ///
    /// Fails when `max_level` is below 32 or `p` lies outside `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::{Options, ZSet};
    ///
    /// let options = Options {
    ///     seed: Some(7),
    ///     free_list_size: 0,
    ///     ..Options::default()
    /// };
    /// let zs: ZSet<&str, i64> = ZSet::with_options(|a, b| a < b, options).unwrap();
    /// assert_eq!(zs.len(), 0);
    /// ```
    pub fn with_options<F>(less: F, options: Options) -> Result<Self, OptionsError>
    where
        F: 'static + Fn(&V, &V) -> bool,
    {
        Ok(ZSet {
            dict: HashMap::new(),
            list: RankedSkipList::with_options(
                move |a: &Entry<K, V>, b: &Entry<K, V>| less(&a.value, &b.value),
                options,
            )?,
        })
    }
}

impl<K, V> ZSet<K, V> {
    /// Returns the number of elements in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Clears the set, removing all keys and values.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// zs.add("a", 1);
    /// zs.clear();
    /// assert!(zs.is_empty());
    /// assert_eq!(zs.get("a"), None);
    /// ```
    pub fn clear(&mut self) {
        self.dict.clear();
        self.list.clear();
    }

    /// Creates a borrowing iterator over `(key, value)` pairs in ascending
    /// value order.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// zs.add("b", 2);
    /// zs.add("a", 1);
    ///
    /// let pairs: Vec<_> = zs.iter().map(|(k, v)| (*k, *v)).collect();
    /// assert_eq!(pairs, [("a", 1), ("b", 2)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.list.iter(),
        }
    }
}

impl<K: Hash + Eq, V> ZSet<K, V> {
    /// Add a new key or update the value of an existing one, keeping the
    /// set ordered.
    ///
    /// Returns the value that had to be displaced to reposition the key, or
    /// `None` when the key was new or its value could be overwritten in
    /// place (both bottom-level neighbors tolerate the new value, so no
    /// links move).
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// assert_eq!(zs.add("a", 1), None);
    /// assert_eq!(zs.add("b", 2), None);
    /// assert_eq!(zs.add("a", 3), Some(1)); // moved past "b"
    /// assert_eq!(zs.add("a", 4), None); // still after "b": updated in place
    /// assert_eq!(zs.get("a"), Some(&4));
    /// ```
    pub fn add(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        if let Some(&node) = self.dict.get(&key) {
            let entry = Entry {
                key: key.clone(),
                value,
            };
            match self.list.update_in_place(node, entry) {
                Ok(()) => return None,
                Err(entry) => {
                    let displaced = self.list.remove_node(node).map(|old| old.value);
                    let node = self.list.insert_node(entry);
                    self.dict.insert(key, node);
                    return displaced;
                }
            }
        }
        let node = self.list.insert_node(Entry {
            key: key.clone(),
            value,
        });
        self.dict.insert(key, node);
        None
    }

    /// Remove a key and return its value, or `None` when the key is absent
    /// (in which case the set is untouched).
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// zs.add("a", 1);
    /// assert_eq!(zs.remove("a"), Some(1));
    /// assert_eq!(zs.remove("a"), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = self.dict.remove(key)?;
        self.list.remove_node(node).map(|entry| entry.value)
    }

    /// A reference to the value stored under `key`, or `None` when absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// zs.add("a", 1);
    /// assert_eq!(zs.get("a"), Some(&1));
    /// assert_eq!(zs.get("z"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = self.dict.get(key)?;
        unsafe { (*node.as_ptr()).item.as_ref().map(|entry| &entry.value) }
    }

    /// Returns `true` if the set contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.dict.contains_key(key)
    }

    /// The 1-based rank of `key`, or 0 when the key is absent.
    ///
    /// With `reverse` false, rank 1 is the smallest value; with `reverse`
    /// true, rank 1 is the largest.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// zs.add("Hurst", 88);
    /// zs.add("Peek", 100);
    /// zs.add("Beaty", 66);
    ///
    /// assert_eq!(zs.rank("Beaty", false), 1);
    /// assert_eq!(zs.rank("Peek", false), 3);
    /// assert_eq!(zs.rank("Peek", true), 1);
    /// assert_eq!(zs.rank("missing", false), 0);
    /// ```
    pub fn rank<Q>(&self, key: &Q, reverse: bool) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = match self.dict.get(key) {
            Some(node) => *node,
            None => return 0,
        };
        let entry = match unsafe { (*node.as_ptr()).item.as_ref() } {
            Some(entry) => entry,
            None => return 0,
        };
        let rank = self.list.rank(entry);
        if rank == 0 {
            0
        } else if reverse {
            self.list.len() - rank + 1
        } else {
            rank
        }
    }
}

impl<K, V> ZSet<K, V> {
    /// Call `visitor` with every value whose 0-based position falls in
    /// `[start, end]`, along with the value's ascending 1-based rank, until
    /// the visitor returns `false`.
    ///
    /// Negative indices count from the largest end (`-1` is the last
    /// element).  With `reverse` false, positions are counted from the
    /// smallest value upward; with `reverse` true, from the largest value
    /// downward, and values are visited in descending order.  The rank
    /// passed to the visitor is the ascending rank in both directions.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
    ///     zs.add(k, v);
    /// }
    ///
    /// let mut seen = Vec::new();
    /// zs.range(0, -1, false, |v, rank| {
    ///     seen.push((*v, rank));
    ///     true
    /// });
    /// assert_eq!(seen, [(1, 1), (2, 2), (3, 3)]);
    ///
    /// seen.clear();
    /// zs.range(0, 1, true, |v, rank| {
    ///     seen.push((*v, rank));
    ///     true
    /// });
    /// assert_eq!(seen, [(3, 3), (2, 2)]);
    /// ```
    pub fn range<F>(&self, start: isize, end: isize, reverse: bool, visitor: F)
    where
        F: FnMut(&V, usize) -> bool,
    {
        let (start, end) = match self.normalize_range(start, end) {
            Some(bounds) => bounds,
            None => return,
        };
        let len = self.list.len();
        let first_rank = if reverse { len - start } else { start + 1 };
        let node = match self.list.node_by_rank(first_rank) {
            Some(node) => node,
            None => return,
        };
        self.visit(node, first_rank, end - start + 1, reverse, visitor);
    }

    /// Call `visitor` with every value inside the bounds, along with the
    /// value's ascending 1-based rank, until the visitor returns `false`.
    ///
    /// `min` must be monotone false-then-true along the sorted order (for
    /// example "value ≥ lo") and selects the first element of the window;
    /// `None` means unbounded below.  `max` must be monotone true-then-false
    /// (for example "value ≤ hi") and selects the last element; `None` means
    /// unbounded above.  With `reverse` true, the window is visited in
    /// descending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// for v in 0..10 {
    ///     zs.add(v.to_string(), v);
    /// }
    ///
    /// let mut seen = Vec::new();
    /// zs.range_by_score(
    ///     Some(&|v: &i64| *v >= 3),
    ///     Some(&|v: &i64| *v <= 5),
    ///     false,
    ///     |v, _rank| {
    ///         seen.push(*v);
    ///         true
    ///     },
    /// );
    /// assert_eq!(seen, [3, 4, 5]);
    /// ```
    pub fn range_by_score<F>(
        &self,
        min: Option<&dyn Fn(&V) -> bool>,
        max: Option<&dyn Fn(&V) -> bool>,
        reverse: bool,
        visitor: F,
    ) where
        F: FnMut(&V, usize) -> bool,
    {
        let (min_node, min_rank) = match min {
            Some(bound) => self
                .list
                .find_next_node(|entry: &Entry<K, V>| bound(&entry.value)),
            None => (self.list.min_node(), 1),
        };
        let min_node = match min_node {
            Some(node) => node,
            None => return,
        };
        let (max_node, max_rank) = match max {
            Some(bound) => self
                .list
                .find_prev_node(|entry: &Entry<K, V>| bound(&entry.value)),
            None => (self.list.max_node(), self.list.len()),
        };
        let max_node = match max_node {
            Some(node) => node,
            None => return,
        };
        // The bounds can cross when nothing satisfies both.
        if min_rank > max_rank {
            return;
        }
        let count = max_rank - min_rank + 1;
        if reverse {
            self.visit(max_node, max_rank, count, true, visitor);
        } else {
            self.visit(min_node, min_rank, count, false, visitor);
        }
    }

    /// Find the first value for which `greater` holds, together with its
    /// ascending 1-based rank.
    ///
    /// `greater` must be monotone false-then-true along the sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// for v in 0..10 {
    ///     zs.add(v.to_string(), v);
    /// }
    /// assert_eq!(zs.find_next(|v| *v >= 7), Some((&7, 8)));
    /// assert_eq!(zs.find_next(|v| *v > 9), None);
    /// ```
    pub fn find_next(&self, greater: impl Fn(&V) -> bool) -> Option<(&V, usize)> {
        let (node, rank) = self
            .list
            .find_next_node(|entry: &Entry<K, V>| greater(&entry.value));
        let node = node?;
        unsafe {
            (*node.as_ptr())
                .item
                .as_ref()
                .map(|entry| (&entry.value, rank))
        }
    }

    /// Find the last value for which `less_than` holds, together with its
    /// ascending 1-based rank.
    ///
    /// `less_than` must be monotone true-then-false along the sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// for v in 0..10 {
    ///     zs.add(v.to_string(), v);
    /// }
    /// assert_eq!(zs.find_prev(|v| *v <= 7), Some((&7, 8)));
    /// assert_eq!(zs.find_prev(|v| *v < 0), None);
    /// ```
    pub fn find_prev(&self, less_than: impl Fn(&V) -> bool) -> Option<(&V, usize)> {
        let (node, rank) = self
            .list
            .find_prev_node(|entry: &Entry<K, V>| less_than(&entry.value));
        let node = node?;
        unsafe {
            (*node.as_ptr())
                .item
                .as_ref()
                .map(|entry| (&entry.value, rank))
        }
    }

    /// Returns a cursor over the values whose 0-based positions fall in
    /// `[start, end]`, normalized exactly as in [`range`](ZSet::range).
    ///
    /// The cursor form lets callers pause, interleave other (read-only)
    /// work, and resume; the visitor form is faster when the whole window
    /// is consumed in one go.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::ZSet;
    ///
    /// let mut zs = ZSet::new(|a: &i64, b: &i64| a < b);
    /// for (k, v) in [("a", 10), ("b", 20), ("c", 30)] {
    ///     zs.add(k, v);
    /// }
    ///
    /// let mut it = zs.range_iterator(1, 2, false);
    /// assert_eq!(it.len(), 2);
    /// let mut seen = Vec::new();
    /// while it.valid() {
    ///     seen.push((*it.key().unwrap(), *it.item().unwrap(), it.rank()));
    ///     it.next();
    /// }
    /// assert_eq!(seen, [("b", 20, 2), ("c", 30, 3)]);
    /// ```
    pub fn range_iterator(&self, start: isize, end: isize, reverse: bool) -> RangeIterator<'_, K, V> {
        let (start, end) = match self.normalize_range(start, end) {
            Some(bounds) => bounds,
            None => {
                return RangeIterator {
                    node: None,
                    range_len: 0,
                    first_rank: 0,
                    cur: 0,
                    reverse,
                }
            }
        };
        let len = self.list.len();
        let first_rank = if reverse { len - start } else { start + 1 };
        let node = self
            .list
            .node_by_rank(first_rank)
            .map(|node| unsafe { &*node.as_ptr() });
        RangeIterator {
            node,
            range_len: end - start + 1,
            first_rank,
            cur: 0,
            reverse,
        }
    }

    /// Resolve negative indices against the length and clamp to the valid
    /// window; `None` when the window is empty.
    fn normalize_range(&self, mut start: isize, mut end: isize) -> Option<(usize, usize)> {
        let len = self.list.len() as isize;
        if start < 0 {
            start += len;
        }
        if end < 0 {
            end += len;
        }
        if start < 0 {
            start = 0;
        }
        if start > end || start >= len {
            return None;
        }
        if end >= len {
            end = len - 1;
        }
        Some((start as usize, end as usize))
    }

    /// Walk `count` nodes from `node` along the bottom level, feeding the
    /// visitor ascending 1-based ranks, stopping early when it returns
    /// `false`.
    fn visit<F>(
        &self,
        node: NonNull<SkipNode<Entry<K, V>>>,
        first_rank: usize,
        count: usize,
        reverse: bool,
        mut visitor: F,
    ) where
        F: FnMut(&V, usize) -> bool,
    {
        unsafe {
            let mut node = node.as_ptr();
            let mut rank = first_rank;
            let mut remaining = count;
            while remaining > 0 {
                let entry = match (*node).item.as_ref() {
                    Some(entry) => entry,
                    None => break,
                };
                if !visitor(&entry.value, rank) {
                    break;
                }
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
                let next = if reverse {
                    (*node).backward
                } else {
                    (&(*node).levels)[0].forward
                };
                node = match next {
                    Some(next) => next.as_ptr(),
                    None => break,
                };
                rank = if reverse { rank - 1 } else { rank + 1 };
            }
        }
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl<K: Hash + Eq, V> ZSet<K, V> {
    /// Checks the integrity of the set: the backing list's invariants plus
    /// the agreement between the key index and the list.
    #[allow(dead_code)]
    pub(crate) fn check(&self) {
        self.list.check();
        assert_eq!(
            self.dict.len(),
            self.list.len(),
            "key index and list must agree on length"
        );
        let mut seen = std::collections::HashSet::new();
        for (key, node) in &self.dict {
            let entry = unsafe { (*node.as_ptr()).item.as_ref() }
                .expect("indexed nodes must hold an entry");
            assert!(
                entry.key == *key,
                "an indexed node must hold the key that maps to it"
            );
            assert!(
                seen.insert(node.as_ptr()),
                "no two keys may map to the same node"
            );
        }
    }
}

// ///////////////////////////////////////////////
// RangeIterator
// ///////////////////////////////////////////////

/// A stateful cursor over a rank window of a [`ZSet`], returned by
/// [`ZSet::range_iterator`].
///
/// Unlike the visitor-based scans, a cursor can be stopped, stored, and
/// resumed.  It borrows the set, so the set cannot be mutated while a
/// cursor is alive.
///
/// [`rank`](RangeIterator::rank) always reports the cursor's position as an
/// ascending 1-based rank in the whole set, regardless of the direction of
/// iteration.
pub struct RangeIterator<'a, K, V> {
    node: Option<&'a SkipNode<Entry<K, V>>>,
    // Total number of positions in the window.
    range_len: usize,
    // Ascending rank of the first position; 0 for an empty window.
    first_rank: usize,
    // How many positions have been consumed.
    cur: usize,
    reverse: bool,
}

impl<'a, K, V> RangeIterator<'a, K, V> {
    /// The total number of positions in the window, visited or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.range_len
    }

    /// Returns `true` if the window contains no positions at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range_len == 0
    }

    /// Returns `true` while the cursor points at an element.
    #[inline]
    pub fn valid(&self) -> bool {
        self.cur < self.range_len && self.node.is_some()
    }

    /// Advance to the next position.  Does nothing once the cursor is
    /// exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if !self.valid() {
            return;
        }
        if let Some(node) = self.node {
            self.node = if self.reverse {
                node.backward_ref()
            } else {
                node.next_ref()
            };
        }
        self.cur += 1;
    }

    /// The value at the cursor, or `None` once exhausted.
    pub fn item(&self) -> Option<&'a V> {
        if !self.valid() {
            return None;
        }
        self.node?.item.as_ref().map(|entry| &entry.value)
    }

    /// The key at the cursor, or `None` once exhausted.
    pub fn key(&self) -> Option<&'a K> {
        if !self.valid() {
            return None;
        }
        self.node?.item.as_ref().map(|entry| &entry.key)
    }

    /// The ascending 1-based rank of the element at the cursor, or 0 once
    /// exhausted.
    pub fn rank(&self) -> usize {
        if !self.valid() {
            return 0;
        }
        if self.reverse {
            self.first_rank - self.cur
        } else {
            self.first_rank + self.cur
        }
    }
}

// ///////////////////////////////////////////////
// Iterators
// ///////////////////////////////////////////////

/// A borrowing iterator over the `(key, value)` pairs of a [`ZSet`] in
/// ascending value order.
pub struct Iter<'a, K, V> {
    inner: skipnode::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner
            .next_back()
            .map(|entry| (&entry.key, &entry.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// A consuming iterator over the `(key, value)` pairs of a [`ZSet`] in
/// ascending value order.
pub struct IntoIter<K, V> {
    inner: skipnode::IntoIter<Entry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner
            .next_back()
            .map(|entry| (entry.key, entry.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

// ///////////////////////////////////////////////
// Trait implementations
// ///////////////////////////////////////////////

unsafe impl<K: Send, V: Send> Send for ZSet<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for ZSet<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ZSet<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq + Clone, V> Extend<(K, V)> for ZSet<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        for (key, value) in iterable {
            self.add(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a ZSet<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for ZSet<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Consume the set, yielding its `(key, value)` pairs in ascending
    /// value order.
    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.list.into_iter(),
        }
    }
}

// ///////////////////////////////////////////////
// Tests
// ///////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::prelude::*;
    use rstest::rstest;

    use super::ZSet;
    use crate::options::Options;

    const LIST_SIZE: i64 = 10_000;

    fn scored() -> ZSet<String, i64> {
        ZSet::new(|a: &i64, b: &i64| a < b)
    }

    fn seeded(seed: u64) -> ZSet<String, i64> {
        let options = Options {
            seed: Some(seed),
            ..Options::default()
        };
        ZSet::with_options(|a: &i64, b: &i64| a < b, options).expect("options are valid")
    }

    fn perm(n: i64, seed: u64) -> Vec<i64> {
        let mut values: Vec<i64> = (0..n).collect();
        values.shuffle(&mut StdRng::seed_from_u64(seed));
        values
    }

    fn fill(zs: &mut ZSet<String, i64>, values: &[i64]) {
        for &v in values {
            zs.add(v.to_string(), v);
        }
    }

    #[test]
    fn scoreboard() {
        let mut zs = scored();
        zs.add("Hurst".to_string(), 88);
        zs.add("Peek".to_string(), 100);
        zs.add("Beaty".to_string(), 66);
        zs.check();

        assert_eq!(zs.rank("Hurst", true), 2);

        let mut names = Vec::new();
        zs.range(0, 2, false, |score, _rank| {
            names.push(*score);
            true
        });
        assert_eq!(names, [66, 88, 100]);

        assert_eq!(zs.remove("Peek"), Some(100));
        zs.check();
        assert_eq!(zs.rank("Hurst", true), 1);
    }

    #[test]
    fn ranks_over_permutation() {
        let mut zs = seeded(0x11);
        fill(&mut zs, &perm(LIST_SIZE, 0x12));
        zs.check();
        assert_eq!(zs.len(), LIST_SIZE as usize);

        for v in perm(LIST_SIZE, 0x13) {
            let key = v.to_string();
            assert_eq!(zs.rank(&key, false), (v + 1) as usize);
            assert_eq!(zs.rank(&key, true), (LIST_SIZE - v) as usize);
        }
    }

    #[test]
    fn reverse_rank_complements_forward_rank() {
        let mut zs = seeded(0x21);
        fill(&mut zs, &perm(1000, 0x22));
        for v in 0..1000 {
            let key = v.to_string();
            assert_eq!(
                zs.rank(&key, false) + zs.rank(&key, true),
                zs.len() + 1
            );
        }
        assert_eq!(zs.rank("not here", false), 0);
        assert_eq!(zs.rank("not here", true), 0);
    }

    #[test]
    fn ranks_after_removing_the_lower_half() {
        let mut zs = seeded(0x31);
        fill(&mut zs, &perm(LIST_SIZE, 0x32));
        for v in 0..LIST_SIZE / 2 {
            assert_eq!(zs.remove(&v.to_string()), Some(v));
        }
        zs.check();

        for v in LIST_SIZE / 2..LIST_SIZE {
            assert_eq!(
                zs.rank(&v.to_string(), false),
                (v - LIST_SIZE / 2 + 1) as usize
            );
        }
    }

    #[test]
    fn range_matches_sorted_slices() {
        let mut zs = seeded(0x41);
        fill(&mut zs, &perm(100, 0x42));

        let mut rng = StdRng::seed_from_u64(0x43);
        for _ in 0..200 {
            let s = rng.gen_range(-120..120);
            let e = rng.gen_range(-120..120);

            // Reference semantics on a plain vector.
            let len = 100i64;
            let mut start = if s < 0 { s + len } else { s };
            let mut end = if e < 0 { e + len } else { e };
            if start < 0 {
                start = 0;
            }
            let expected: Vec<i64> = if start > end || start >= len {
                Vec::new()
            } else {
                if end >= len {
                    end = len - 1;
                }
                (start..=end).collect()
            };

            let mut forward = Vec::new();
            zs.range(s as isize, e as isize, false, |v, rank| {
                assert_eq!(rank, (*v + 1) as usize);
                forward.push(*v);
                true
            });
            assert_eq!(forward, expected, "range({s}, {e}, false)");

            // The reverse window counts positions from the top.
            let mut backward = Vec::new();
            zs.range(s as isize, e as isize, true, |v, rank| {
                assert_eq!(rank, (*v + 1) as usize);
                backward.push(*v);
                true
            });
            let expected_rev: Vec<i64> = if expected.is_empty() {
                Vec::new()
            } else {
                (len - 1 - end..=len - 1 - start).rev().collect()
            };
            assert_eq!(backward, expected_rev, "range({s}, {e}, true)");
        }
    }

    #[test]
    fn top_two_by_reverse_range() {
        let mut zs = seeded(0x51);
        fill(&mut zs, &perm(LIST_SIZE, 0x52));

        let mut top = Vec::new();
        zs.range(0, 1, true, |v, _rank| {
            top.push(*v);
            true
        });
        assert_eq!(top, [LIST_SIZE - 1, LIST_SIZE - 2]);
    }

    #[rstest]
    #[case::forward(false, &[3, 4, 5])]
    #[case::reverse(true, &[5, 4, 3])]
    fn range_by_score_window(#[case] reverse: bool, #[case] expected: &[i64]) {
        let mut zs = seeded(0x61);
        fill(&mut zs, &perm(10, 0x62));

        let mut seen = Vec::new();
        zs.range_by_score(
            Some(&|v: &i64| *v >= 3),
            Some(&|v: &i64| *v <= 5),
            reverse,
            |v, rank| {
                assert_eq!(rank, (*v + 1) as usize);
                seen.push(*v);
                true
            },
        );
        assert_eq!(seen, expected);
    }

    #[test]
    fn range_by_score_unbounded_and_empty_windows() {
        let mut zs = seeded(0x71);
        fill(&mut zs, &perm(10, 0x72));

        let mut all = Vec::new();
        zs.range_by_score(None, None, false, |v, _| {
            all.push(*v);
            true
        });
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        // Bounds that cross select nothing.
        let mut crossed = Vec::new();
        zs.range_by_score(
            Some(&|v: &i64| *v >= 7),
            Some(&|v: &i64| *v <= 2),
            false,
            |v, _| {
                crossed.push(*v);
                true
            },
        );
        assert_eq!(crossed, Vec::<i64>::new());

        // Bounds beyond either end select nothing.
        let mut beyond = Vec::new();
        zs.range_by_score(Some(&|v: &i64| *v >= 100), None, false, |v, _| {
            beyond.push(*v);
            true
        });
        assert_eq!(beyond, Vec::<i64>::new());
    }

    #[test]
    fn empty_set_is_inert() {
        let zs = scored();
        assert_eq!(zs.len(), 0);
        assert_eq!(zs.rank("x", false), 0);

        let mut visited = false;
        zs.range_by_score(None, None, false, |_, _| {
            visited = true;
            true
        });
        zs.range(0, -1, false, |_, _| {
            visited = true;
            true
        });
        assert!(!visited);

        let it = zs.range_iterator(0, -1, false);
        assert!(!it.valid());
        assert_eq!(it.len(), 0);
    }

    #[test]
    fn removing_an_absent_key_is_a_noop() {
        let mut zs = seeded(0x81);
        fill(&mut zs, &perm(100, 0x82));

        assert_eq!(zs.remove("100"), None);
        assert_eq!(zs.len(), 100);
        zs.check();
        for v in 0..100 {
            assert_eq!(zs.rank(&v.to_string(), false), (v + 1) as usize);
        }
    }

    #[test]
    fn in_place_update_preserves_other_ranks() {
        let mut zs = scored();
        for v in 0..10 {
            zs.add(v.to_string(), v * 10);
        }

        // 51 still sits between 40 and 60: no links move.
        assert_eq!(zs.add("5".to_string(), 51), None);
        zs.check();
        assert_eq!(zs.get("5"), Some(&51));
        for v in 0..10 {
            assert_eq!(zs.rank(&v.to_string(), false), (v + 1) as usize);
        }

        // 95 moves past everything up to 90: the old value comes back.
        assert_eq!(zs.add("5".to_string(), 95), Some(51));
        zs.check();
        assert_eq!(zs.rank("5", false), 10);
    }

    #[test]
    fn tied_scores_stay_keyed_to_their_own_nodes() {
        let mut zs = scored();
        zs.add("first".to_string(), 7);
        zs.add("second".to_string(), 7);
        zs.add("third".to_string(), 7);
        zs.check();

        // Removing a key in the middle of the tie run must not disturb the
        // entries of the keys that tie with it.
        assert_eq!(zs.remove("second"), Some(7));
        zs.check();
        assert_eq!(zs.get("first"), Some(&7));
        assert_eq!(zs.get("third"), Some(&7));

        let keys: Vec<&str> = zs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["first", "third"]);

        assert_eq!(zs.remove("first"), Some(7));
        assert_eq!(zs.remove("third"), Some(7));
        zs.check();
        assert!(zs.is_empty());
    }

    #[test]
    fn visitors_can_stop_early() {
        let mut zs = seeded(0x91);
        fill(&mut zs, &perm(100, 0x92));

        let mut seen = Vec::new();
        zs.range(0, -1, false, |v, _| {
            seen.push(*v);
            seen.len() < 3
        });
        assert_eq!(seen, [0, 1, 2]);

        seen.clear();
        zs.range_by_score(Some(&|v: &i64| *v >= 10), None, true, |v, _| {
            seen.push(*v);
            false
        });
        assert_eq!(seen, [99]);
    }

    #[test]
    fn range_iterator_reports_absolute_ranks() {
        let mut zs = seeded(0xa1);
        fill(&mut zs, &perm(10, 0xa2));

        let mut it = zs.range_iterator(2, 5, false);
        assert_eq!(it.len(), 4);
        let mut seen = Vec::new();
        while it.valid() {
            seen.push((*it.item().unwrap(), it.rank()));
            it.next();
        }
        assert_eq!(seen, [(2, 3), (3, 4), (4, 5), (5, 6)]);
        assert_eq!(it.item(), None);
        assert_eq!(it.key(), None);
        assert_eq!(it.rank(), 0);
        it.next(); // exhausted cursors tolerate further advances
        assert!(!it.valid());

        // Reverse iteration still reports ascending ranks.
        let mut it = zs.range_iterator(0, 2, true);
        let mut seen = Vec::new();
        while it.valid() {
            seen.push((*it.item().unwrap(), it.rank()));
            it.next();
        }
        assert_eq!(seen, [(9, 10), (8, 9), (7, 8)]);
    }

    #[test]
    fn range_iterator_keys_and_negative_indices() {
        let mut zs = scored();
        for (k, v) in [("low", 1), ("mid", 2), ("high", 3)] {
            zs.add(k.to_string(), v);
        }

        let mut it = zs.range_iterator(-2, -1, false);
        assert_eq!(it.len(), 2);
        assert_eq!(it.key().map(String::as_str), Some("mid"));
        it.next();
        assert_eq!(it.key().map(String::as_str), Some("high"));
        it.next();
        assert!(!it.valid());

        let it = zs.range_iterator(2, 1, false);
        assert!(it.is_empty());
        assert!(!it.valid());
    }

    #[test]
    fn get_add_and_iter() {
        let mut zs = scored();
        assert_eq!(zs.get("a"), None);
        assert!(!zs.contains_key("a"));

        zs.add("a".to_string(), 2);
        zs.add("b".to_string(), 1);
        zs.add("c".to_string(), 3);
        assert_eq!(zs.get("a"), Some(&2));
        assert!(zs.contains_key("a"));

        let pairs: Vec<(&str, i64)> = zs.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(pairs, [("b", 1), ("a", 2), ("c", 3)]);
        let backward: Vec<i64> = zs.iter().rev().map(|(_, v)| *v).collect();
        assert_eq!(backward, [3, 2, 1]);

        let owned: Vec<(String, i64)> = zs.into_iter().collect();
        assert_eq!(
            owned,
            [
                ("b".to_string(), 1),
                ("a".to_string(), 2),
                ("c".to_string(), 3)
            ]
        );
    }

    #[test]
    fn churn_through_the_free_list_keeps_the_index_sound() {
        let mut zs = seeded(0xb1);
        for round in 0u64..10 {
            fill(&mut zs, &perm(200, round));
            zs.check();
            // Reshuffle every score; most adds reposition their node.
            for v in perm(200, round + 50) {
                zs.add(v.to_string(), 199 - v);
            }
            zs.check();
            for v in 0..200 {
                assert_eq!(zs.remove(&v.to_string()), Some(199 - v));
            }
            zs.check();
            assert!(zs.is_empty());
        }
    }

    #[test]
    fn debug_format() {
        let mut zs = scored();
        zs.add("a".to_string(), 1);
        zs.add("b".to_string(), 2);
        assert_eq!(format!("{:?}", zs), r#"{"a": 1, "b": 2}"#);
    }

    #[test]
    fn extend_pairs() {
        let mut zs = scored();
        zs.extend([("b".to_string(), 2), ("a".to_string(), 1)]);
        assert_eq!(zs.len(), 2);
        assert_eq!(zs.rank("a", false), 1);
    }
}
