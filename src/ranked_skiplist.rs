//! An always-sorted list with rank queries.

use std::ptr::NonNull;
use std::{fmt, iter, ops};

use crate::free_list::FreeList;
use crate::level_generator::{Geometric, LevelGenerator};
use crate::options::{Options, OptionsError, DEFAULT_MAX_LEVEL};
use crate::skipnode::SkipNode;

pub use crate::skipnode::{IntoIter, Iter};

// ////////////////////////////////////////////////////////////////////////////
// RankedSkipList
// ////////////////////////////////////////////////////////////////////////////

/// A skip list which keeps its elements sorted under a caller-supplied
/// `less` predicate and maintains a span counter on every forward link,
/// making the *rank* of an element (its 1-based position in sorted order)
/// an `O(log(n))` query rather than a walk.
///
/// Elements with equivalent order are permitted; a new element is always
/// placed after the existing elements it ties with, so insertion is stable.
///
/// The predicate **must** be a strict weak ordering (irreflexive,
/// asymmetric, transitive, with transitive equivalence).  A misbehaved
/// predicate produces garbage ordering and ranks but no memory unsafety.
///
/// # Examples
///
/// ```
/// use zset::RankedSkipList;
///
/// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
/// list.insert(30);
/// list.insert(10);
/// list.insert(20);
///
/// assert_eq!(list.rank(&20), 2);
/// assert_eq!(list.get_by_rank(3), Some(&30));
/// ```
pub struct RankedSkipList<T> {
    // Header node; holds no item and always spans `max_level` levels.
    head: Box<SkipNode<T>>,
    // Cached last node of the bottom level.
    tail: Option<NonNull<SkipNode<T>>>,
    len: usize,
    // Current height in use; at most `max_level`, at least 1.
    level: usize,
    free_list: FreeList<T>,
    level_generator: Geometric,
    less: Box<dyn Fn(&T, &T) -> bool>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<T> RankedSkipList<T> {
    /// Create a new empty list ordered by `less`, using the default
    /// configuration (`max_level = 32`, `p = 1/4`, a 32-node free list, and
    /// an entropy-seeded level generator).
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    pub fn new<F>(less: F) -> Self
    where
        F: 'static + Fn(&T, &T) -> bool,
    {
        Self::with_options(less, Options::default()).expect("default options are valid")
    }

    /// Create a new empty list ordered by `less` with explicit [`Options`].
    ///
    /// # Errors
    ///
    /// Fails when `max_level` is below 32 or `p` lies outside `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::{Options, RankedSkipList};
    ///
    /// let options = Options {
    ///     seed: Some(1),
    ///     ..Options::default()
    /// };
    /// let list = RankedSkipList::with_options(|a: &i64, b: &i64| a < b, options).unwrap();
    /// assert_eq!(list.len(), 0);
    ///
    /// let too_low = Options {
    ///     max_level: 8,
    ///     ..Options::default()
    /// };
    /// assert!(RankedSkipList::with_options(|a: &i64, b: &i64| a < b, too_low).is_err());
    /// ```
    pub fn with_options<F>(less: F, options: Options) -> Result<Self, OptionsError>
    where
        F: 'static + Fn(&T, &T) -> bool,
    {
        if options.max_level < DEFAULT_MAX_LEVEL {
            return Err(OptionsError::MaxLevelTooSmall);
        }
        let level_generator = match options.seed {
            Some(seed) => Geometric::with_seed(options.max_level, options.p, seed)?,
            None => Geometric::new(options.max_level, options.p)?,
        };
        Ok(RankedSkipList {
            head: Box::new(SkipNode::head(options.max_level)),
            tail: None,
            len: 0,
            level: 1,
            free_list: FreeList::new(options.free_list_size),
            level_generator,
            less: Box::new(less),
        })
    }

    /// Returns the number of elements in the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.extend(0..10);
    /// assert_eq!(list.len(), 10);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the list, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.extend(0..10);
    /// list.clear();
    /// assert!(list.is_empty());
    /// ```
    pub fn clear(&mut self) {
        let max_level = self.max_level();
        self.len = 0;
        self.level = 1;
        self.tail = None;
        *self.head = SkipNode::head(max_level);
    }

    /// Insert an element, keeping the list sorted.  Equivalent elements are
    /// kept in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.insert(2);
    /// list.insert(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn insert(&mut self, item: T) {
        self.insert_node(item);
    }

    /// Remove the first element equivalent to `value` under the list's
    /// ordering and return it, or `None` when no such element exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.extend(0..10);
    /// assert_eq!(list.remove(&4), Some(4));
    /// assert_eq!(list.remove(&4), None);
    /// ```
    pub fn remove(&mut self, value: &T) -> Option<T> {
        unsafe { self.remove_where(value, None) }
    }

    /// The 1-based position in sorted order of the element equivalent to
    /// `value`, or 0 when the value is absent.  When several elements tie
    /// with `value`, the rank of the last of them is reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.extend(0..10);
    /// assert_eq!(list.rank(&0), 1);
    /// assert_eq!(list.rank(&9), 10);
    /// assert_eq!(list.rank(&42), 0);
    /// ```
    pub fn rank(&self, value: &T) -> usize {
        let mut rank = 0;
        let mut x: *const SkipNode<T> = self.head.as_ref();
        unsafe {
            for i in (0..self.level).rev() {
                while let Some(forward) = (&(*x).levels)[i].forward {
                    let next = forward.as_ptr();
                    let advance = match (*next).item.as_ref() {
                        Some(next_item) => !(self.less)(value, next_item),
                        None => false,
                    };
                    if !advance {
                        break;
                    }
                    rank += (&(*x).levels)[i].span;
                    x = next;
                }
                if let Some(item) = (*x).item.as_ref() {
                    if !(self.less)(item, value) {
                        return rank;
                    }
                }
            }
        }
        0
    }

    /// The element at the given 1-based rank, or `None` when the rank lies
    /// outside `[1, len]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.extend(10..20);
    /// assert_eq!(list.get_by_rank(1), Some(&10));
    /// assert_eq!(list.get_by_rank(10), Some(&19));
    /// assert_eq!(list.get_by_rank(11), None);
    /// ```
    pub fn get_by_rank(&self, rank: usize) -> Option<&T> {
        self.node_by_rank(rank)
            .and_then(|node| unsafe { (*node.as_ptr()).item.as_ref() })
    }

    /// A reference to the smallest element, or `None` if the list is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.head.next_ref().and_then(|node| node.item.as_ref())
    }

    /// A reference to the largest element, or `None` if the list is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.tail
            .and_then(|node| unsafe { (*node.as_ptr()).item.as_ref() })
    }

    /// Find the first element for which `greater` holds, together with its
    /// 1-based rank.
    ///
    /// `greater` must be monotone along the sorted order: false on a prefix
    /// of the list and true from some point on.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.extend(0..10);
    /// assert_eq!(list.find_next(|v| *v >= 3), Some((&3, 4)));
    /// assert_eq!(list.find_next(|v| *v > 9), None);
    /// ```
    pub fn find_next(&self, greater: impl Fn(&T) -> bool) -> Option<(&T, usize)> {
        let (node, rank) = self.find_next_node(greater);
        let node = node?;
        unsafe { (*node.as_ptr()).item.as_ref().map(|item| (item, rank)) }
    }

    /// Find the last element for which `less_than` holds, together with its
    /// 1-based rank.
    ///
    /// `less_than` must be monotone along the sorted order: true on a prefix
    /// of the list and false from some point on.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.extend(0..10);
    /// assert_eq!(list.find_prev(|v| *v <= 5), Some((&5, 6)));
    /// assert_eq!(list.find_prev(|v| *v < 0), None);
    /// ```
    pub fn find_prev(&self, less_than: impl Fn(&T) -> bool) -> Option<(&T, usize)> {
        let (node, rank) = self.find_prev_node(less_than);
        let node = node?;
        unsafe { (*node.as_ptr()).item.as_ref().map(|item| (item, rank)) }
    }

    /// Creates a borrowing iterator over the elements in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let mut list = RankedSkipList::new(|a: &i64, b: &i64| a < b);
    /// list.extend([3, 1, 2]);
    /// let collected: Vec<_> = list.iter().copied().collect();
    /// assert_eq!(collected, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            first: self.head.next_ref(),
            last: self.tail.map(|node| unsafe { &*node.as_ptr() }),
            remaining: self.len,
        }
    }
}

impl<T: Ord + 'static> RankedSkipList<T> {
    /// Create a new empty list ordered by `T`'s natural `<`.
    ///
    /// # Examples
    ///
    /// ```
    /// use zset::RankedSkipList;
    ///
    /// let list: RankedSkipList<i64> = (0..5).collect();
    /// assert_eq!(list.rank(&4), 5);
    /// ```
    #[inline]
    pub fn new_ordered() -> Self {
        Self::new(|a: &T, b: &T| a < b)
    }
}

// ///////////////////////////////////////////////
// Node-level operations
// ///////////////////////////////////////////////
// The keyed facade records the node a key maps to and hands it back for
// deletion and in-place updates, so these operate on node pointers.  All of
// them locate positions by walking with the ordering predicate; pointer
// identity is never used to navigate, only to verify.

impl<T> RankedSkipList<T> {
    fn max_level(&self) -> usize {
        self.head.height()
    }

    /// Insert `item` and return the node now holding it.
    ///
    /// The returned pointer stays valid until the node is removed, moved out
    /// by `into_iter`, or the list is cleared or dropped.
    pub(crate) fn insert_node(&mut self, item: T) -> NonNull<SkipNode<T>> {
        let max_level = self.max_level();
        let head_ptr: *mut SkipNode<T> = self.head.as_mut();
        let mut update: Vec<*mut SkipNode<T>> = vec![head_ptr; max_level];
        let mut rank = vec![0usize; max_level];

        unsafe {
            // Descend, remembering at each level the last node strictly less
            // than the new item and the rank at which it sits.  Using strict
            // `less` here is what places ties after their equals.
            let mut x = head_ptr;
            for i in (0..self.level).rev() {
                rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
                while let Some(forward) = (&(*x).levels)[i].forward {
                    let next = forward.as_ptr();
                    let advance = match (*next).item.as_ref() {
                        Some(next_item) => (self.less)(next_item, &item),
                        None => false,
                    };
                    if !advance {
                        break;
                    }
                    rank[i] += (&(*x).levels)[i].span;
                    x = next;
                }
                update[i] = x;
            }

            let height = self.level_generator.level();
            if height > self.level {
                for i in self.level..height {
                    rank[i] = 0;
                    update[i] = head_ptr;
                    // A brand-new top link spans the whole existing list.
                    (&mut (*head_ptr).levels)[i].span = self.len;
                }
                self.level = height;
            }

            let mut new_node = self.free_list.acquire(item, height);
            let node_ptr = NonNull::from(new_node.as_mut());

            for i in 0..height {
                let upd = update[i];
                new_node.levels[i].forward = (&(*upd).levels)[i].forward;
                // rank[0] - rank[i] is how far the insertion point lies past
                // update[i]; the old span splits there.
                new_node.levels[i].span = (&(*upd).levels)[i].span - (rank[0] - rank[i]);
                (&mut (*upd).levels)[i].forward = Some(node_ptr);
                (&mut (*upd).levels)[i].span = (rank[0] - rank[i]) + 1;
            }
            // One more node now sits under every untouched upper link.
            for i in height..self.level {
                (&mut (*update[i]).levels)[i].span += 1;
            }

            new_node.backward = if update[0] == head_ptr {
                None
            } else {
                NonNull::new(update[0])
            };
            let forward0 = new_node.levels[0].forward;
            new_node.next = (*update[0]).next.take();
            (*update[0]).next = Some(new_node);
            match forward0 {
                Some(forward) => (*forward.as_ptr()).backward = Some(node_ptr),
                None => self.tail = Some(node_ptr),
            }

            self.len += 1;
            node_ptr
        }
    }

    /// Remove the given node and return its item.
    ///
    /// The position is located by value, never by pointer identity; when
    /// several elements tie with the node's item, pointer identity is then
    /// used to pick the recorded node out of the run of equivalents, so a
    /// facade removing one of two equal-scored keys never unlinks the
    /// other's node.
    pub(crate) fn remove_node(&mut self, node: NonNull<SkipNode<T>>) -> Option<T> {
        unsafe {
            let target: *const T = match (*node.as_ptr()).item.as_ref() {
                Some(item) => item,
                None => return None,
            };
            self.remove_where(target, Some(node.as_ptr()))
        }
    }

    /// Remove the element equivalent to `*target`: the first such element,
    /// or the node `exact` itself when one is supplied.
    ///
    /// # Safety
    ///
    /// `target` must be valid for reads for the duration of the call.  It
    /// may point into a node of this list.  `exact`, when supplied, must be
    /// a node of this list holding an item equivalent to `*target`.
    unsafe fn remove_where(
        &mut self,
        target: *const T,
        exact: Option<*mut SkipNode<T>>,
    ) -> Option<T> {
        let head_ptr: *mut SkipNode<T> = self.head.as_mut();
        let mut update: Vec<*mut SkipNode<T>> = vec![head_ptr; self.level];

        let mut x = head_ptr;
        for i in (0..self.level).rev() {
            while let Some(forward) = (&(*x).levels)[i].forward {
                let next = forward.as_ptr();
                let advance = match (*next).item.as_ref() {
                    Some(next_item) => (self.less)(next_item, &*target),
                    None => false,
                };
                if !advance {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        let mut victim = (&(*update[0]).levels)[0].forward?;
        let mut victim_ptr = victim.as_ptr();
        let equivalent = match (*victim_ptr).item.as_ref() {
            Some(found) => !(self.less)(&*target, found),
            None => false,
        };
        if !equivalent {
            return None;
        }

        // Step through the run of equivalents to the requested node.  Every
        // node stepped over becomes the new predecessor at each level it
        // participates in, which is exactly what the unlink below needs.
        if let Some(wanted) = exact {
            while victim_ptr != wanted {
                for i in 0..(*victim_ptr).height() {
                    update[i] = victim_ptr;
                }
                let next = (&(*victim_ptr).levels)[0].forward?;
                let still_equivalent = match (*next.as_ptr()).item.as_ref() {
                    Some(found) => !(self.less)(&*target, found),
                    None => false,
                };
                if !still_equivalent {
                    return None;
                }
                victim = next;
                victim_ptr = next.as_ptr();
            }
        }

        for i in 0..self.level {
            let upd = update[i];
            if (&(*upd).levels)[i].forward == Some(victim) {
                (&mut (*upd).levels)[i].span = (&(*upd).levels)[i].span + (&(*victim_ptr).levels)[i].span - 1;
                (&mut (*upd).levels)[i].forward = (&(*victim_ptr).levels)[i].forward;
            } else {
                (&mut (*upd).levels)[i].span -= 1;
            }
        }
        while self.level > 1 && (&(*head_ptr).levels)[self.level - 1].forward.is_none() {
            self.level -= 1;
        }
        match (&(*victim_ptr).levels)[0].forward {
            Some(forward) => (*forward.as_ptr()).backward = (*victim_ptr).backward,
            None => self.tail = (*victim_ptr).backward,
        }

        let mut boxed = (*update[0])
            .next
            .take()
            .expect("level-0 link must mirror an owning next link");
        (*update[0]).next = boxed.next.take();
        debug_assert!(std::ptr::eq(boxed.as_ref(), victim_ptr));
        let item = boxed.item.take();
        self.len -= 1;
        self.free_list.release(boxed);
        item
    }

    /// Overwrite the node's item in place if the replacement respects the
    /// ordering against both bottom-level neighbors; otherwise hand the
    /// replacement back so the caller can delete and reinsert.
    ///
    /// Most score refreshes leave an element where it was, and this skips
    /// the whole unlink/relink cycle for them.
    pub(crate) fn update_in_place(&mut self, node: NonNull<SkipNode<T>>, item: T) -> Result<(), T> {
        unsafe {
            let node = node.as_ptr();
            let forward_ok = match (&(*node).levels)[0].forward {
                Some(forward) => match (*forward.as_ptr()).item.as_ref() {
                    Some(next_item) => !(self.less)(next_item, &item),
                    None => true,
                },
                None => true,
            };
            let backward_ok = match (*node).backward {
                Some(backward) => match (*backward.as_ptr()).item.as_ref() {
                    Some(prev_item) => !(self.less)(&item, prev_item),
                    None => true,
                },
                None => true,
            };
            if forward_ok && backward_ok {
                (*node).item = Some(item);
                Ok(())
            } else {
                Err(item)
            }
        }
    }

    /// The node at the given 1-based rank.
    pub(crate) fn node_by_rank(&self, rank: usize) -> Option<NonNull<SkipNode<T>>> {
        if rank == 0 || rank > self.len {
            return None;
        }
        let mut traversed = 0;
        let mut x: *const SkipNode<T> = self.head.as_ref();
        unsafe {
            for i in (0..self.level).rev() {
                while let Some(forward) = (&(*x).levels)[i].forward {
                    if traversed + (&(*x).levels)[i].span > rank {
                        break;
                    }
                    traversed += (&(*x).levels)[i].span;
                    x = forward.as_ptr();
                }
                if traversed == rank {
                    return Some(NonNull::new_unchecked(x as *mut SkipNode<T>));
                }
            }
        }
        None
    }

    /// The first node for which `greater` holds, and its 1-based rank.
    pub(crate) fn find_next_node(
        &self,
        greater: impl Fn(&T) -> bool,
    ) -> (Option<NonNull<SkipNode<T>>>, usize) {
        let mut rank = 0;
        let mut x: *const SkipNode<T> = self.head.as_ref();
        unsafe {
            for i in (0..self.level).rev() {
                while let Some(forward) = (&(*x).levels)[i].forward {
                    let next = forward.as_ptr();
                    let advance = match (*next).item.as_ref() {
                        Some(next_item) => !greater(next_item),
                        None => false,
                    };
                    if !advance {
                        break;
                    }
                    rank += (&(*x).levels)[i].span;
                    x = next;
                }
            }
            // The rank is meaningful only when the node exists.
            ((&(*x).levels)[0].forward, rank + (&(*x).levels)[0].span)
        }
    }

    /// The last node for which `less_than` holds, and its 1-based rank.
    pub(crate) fn find_prev_node(
        &self,
        less_than: impl Fn(&T) -> bool,
    ) -> (Option<NonNull<SkipNode<T>>>, usize) {
        let mut rank = 0;
        let mut x: *const SkipNode<T> = self.head.as_ref();
        unsafe {
            for i in (0..self.level).rev() {
                while let Some(forward) = (&(*x).levels)[i].forward {
                    let next = forward.as_ptr();
                    let advance = match (*next).item.as_ref() {
                        Some(next_item) => less_than(next_item),
                        None => false,
                    };
                    if !advance {
                        break;
                    }
                    rank += (&(*x).levels)[i].span;
                    x = next;
                }
            }
            if rank == 0 {
                (None, 0)
            } else {
                (Some(NonNull::new_unchecked(x as *mut SkipNode<T>)), rank)
            }
        }
    }

    /// The smallest node, if any.
    pub(crate) fn min_node(&self) -> Option<NonNull<SkipNode<T>>> {
        self.head.levels[0].forward
    }

    /// The largest node, if any.
    pub(crate) fn max_node(&self) -> Option<NonNull<SkipNode<T>>> {
        self.tail
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl<T> RankedSkipList<T> {
    /// Checks the integrity of the list: length, ordering, backward links,
    /// the tail cache, mirroring of the owning chain, and the span
    /// bookkeeping of every level.
    #[allow(dead_code)]
    pub(crate) fn check(&self) {
        assert!(self.level >= 1, "current level must never drop below 1");
        for i in self.level..self.max_level() {
            assert!(
                self.head.levels[i].forward.is_none(),
                "links above the current level must be empty"
            );
        }

        unsafe {
            // Bottom level: count, order, backward links, chain mirroring.
            let mut count = 0;
            let mut prev: Option<NonNull<SkipNode<T>>> = None;
            let mut last = None;
            let mut node = self.head.levels[0].forward;
            assert_eq!(
                self.head.next.as_deref().map(|n| n as *const SkipNode<T>),
                self.head.levels[0].forward.map(|n| n.as_ptr() as *const _),
                "head's owning chain must mirror its level-0 link"
            );
            while let Some(current) = node {
                let current_ptr = current.as_ptr();
                let item = (*current_ptr)
                    .item
                    .as_ref()
                    .expect("non-header nodes must hold an item");
                if let Some(prev) = prev {
                    let prev_item = (*prev.as_ptr())
                        .item
                        .as_ref()
                        .expect("non-header nodes must hold an item");
                    assert!(
                        !(self.less)(item, prev_item),
                        "bottom level must be sorted"
                    );
                }
                assert_eq!(
                    (*current_ptr).backward,
                    prev,
                    "backward link must point at the bottom-level predecessor"
                );
                assert_eq!(
                    (*current_ptr).next.as_deref().map(|n| n as *const SkipNode<T>),
                    (&(*current_ptr).levels)[0].forward.map(|n| n.as_ptr() as *const _),
                    "owning chain must mirror the level-0 link"
                );
                count += 1;
                prev = node;
                last = node;
                node = (&(*current_ptr).levels)[0].forward;
            }
            assert_eq!(count, self.len, "length must match the bottom level");
            assert_eq!(self.tail, last, "tail must cache the last node");

            // Every level: spans must measure bottom-level distance, and the
            // trailing link's span must account for the rest of the list so
            // that each level sums to the length.
            for i in 0..self.level {
                let mut position = 0;
                let mut x: *const SkipNode<T> = self.head.as_ref();
                loop {
                    let span = (&(*x).levels)[i].span;
                    match (&(*x).levels)[i].forward {
                        Some(forward) => {
                            let mut steps = 0;
                            let mut walker = x;
                            while let Some(below) = (&(*walker).levels)[0].forward {
                                steps += 1;
                                walker = below.as_ptr();
                                if walker == forward.as_ptr() {
                                    break;
                                }
                            }
                            assert_eq!(
                                walker,
                                forward.as_ptr() as *const SkipNode<T>,
                                "a forward link must lead to a reachable node"
                            );
                            assert_eq!(
                                span, steps,
                                "span must count the bottom-level steps of its link"
                            );
                            position += span;
                            x = forward.as_ptr();
                        }
                        None => {
                            assert_eq!(
                                position + span,
                                self.len,
                                "trailing span must cover the remainder of the list"
                            );
                            break;
                        }
                    }
                }
            }
        }
    }
}

// ///////////////////////////////////////////////
// Trait implementations
// ///////////////////////////////////////////////

unsafe impl<T: Send> Send for RankedSkipList<T> {}
unsafe impl<T: Sync> Sync for RankedSkipList<T> {}

impl<T: Ord + 'static> Default for RankedSkipList<T> {
    fn default() -> Self {
        Self::new_ordered()
    }
}

impl<T: fmt::Debug> fmt::Debug for RankedSkipList<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> ops::Index<usize> for RankedSkipList<T> {
    type Output = T;

    /// Zero-based positional access; equivalent to
    /// [`get_by_rank(index + 1)`](RankedSkipList::get_by_rank).
    ///
    /// # Panics
    ///
    /// Panics when the index is out of bounds.
    fn index(&self, index: usize) -> &T {
        self.get_by_rank(index + 1)
            .unwrap_or_else(|| panic!("Index out of range"))
    }
}

impl<T> Extend<T> for RankedSkipList<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
        for element in iterable {
            self.insert(element);
        }
    }
}

impl<T: Ord + 'static> iter::FromIterator<T> for RankedSkipList<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
        let mut list = Self::new_ordered();
        list.extend(iterable);
        list
    }
}

impl<'a, T> IntoIterator for &'a RankedSkipList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> IntoIterator for RankedSkipList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Consume the list, yielding its elements in ascending order.
    fn into_iter(mut self) -> IntoIter<T> {
        let size = self.len;
        let mut first = self.head.next.take();
        if let Some(node) = first.as_deref_mut() {
            node.backward = None;
        }
        let last = self.tail;
        self.len = 0;
        self.tail = None;
        IntoIter { first, last, size }
    }
}

// ///////////////////////////////////////////////
// Tests
// ///////////////////////////////////////////////
