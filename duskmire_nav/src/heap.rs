// Bounded indexed binary min-heap — the search's open set.
//
// A fixed-capacity heap over small-integer item ids (node arena indices),
// ordered by a caller-supplied key. The heap knows nothing about nodes:
// the search computes a `SearchKey` and the heap just orders by `K: Ord`.
//
// Capacity is fixed at construction to the grid's cell count — a search
// can never hold more open entries than there are cells — so the hot
// per-tick path performs no allocation. `clear()` is O(1) via a
// generation stamp on each item slot; `contains()` checks the stamp, so
// stale slots from a previous, already-cleared generation never report
// present.
//
// See also: `pathfinding.rs` for the search that drives this, `event.rs`
// for the simpler wrapped-`BinaryHeap` ancestor of this structure.
//
// **Critical constraint: determinism.** Sift order is a pure function of
// the push/pop sequence and keys. Ties rank by whatever `K`'s `Ord`
// says; the search's key orders by f-cost then h-cost.

/// Per-item bookkeeping: where the item sits in `entries`, and which
/// queue generation that position belongs to.
#[derive(Clone, Copy)]
struct Slot {
    pos: u32,
    generation: u32,
}

/// Fixed-capacity indexed min-heap over `u32` item ids.
///
/// Items must be unique and below the capacity given at construction.
pub struct BoundedMinHeap<K> {
    /// Heap-ordered `(key, item)` pairs. Length is the current size;
    /// capacity never grows past the bound.
    entries: Vec<(K, u32)>,
    /// Slot per possible item id. Generation 0 is never live, so a
    /// zero-initialized slot reads as absent.
    slots: Vec<Slot>,
    generation: u32,
}

impl<K: Ord + Copy> BoundedMinHeap<K> {
    /// Create a heap able to hold `capacity` items with ids in
    /// `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            slots: vec![
                Slot {
                    pos: 0,
                    generation: 0,
                };
                capacity
            ],
            generation: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `item` is currently held. O(1); immune to stale slots
    /// left behind by `clear()` or `pop_min()`.
    pub fn contains(&self, item: u32) -> bool {
        self.slots[item as usize].generation == self.generation
    }

    /// Insert an item with its ordering key. The item must not already be
    /// present, and the heap must not be full.
    pub fn push(&mut self, item: u32, key: K) {
        debug_assert!(!self.contains(item), "item {item} pushed twice");
        debug_assert!(self.entries.len() < self.slots.len(), "heap over capacity");

        let pos = self.entries.len();
        self.entries.push((key, item));
        self.slots[item as usize] = Slot {
            pos: pos as u32,
            generation: self.generation,
        };
        self.sift_up(pos);
    }

    /// Remove and return the minimum-key entry.
    pub fn pop_min(&mut self) -> Option<(u32, K)> {
        let (key, item) = *self.entries.first()?;
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        self.slots[self.entries[0].1 as usize].pos = 0;
        self.entries.pop();
        // Generation 0 is never live: the popped item now reads absent.
        self.slots[item as usize].generation = 0;
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((item, key))
    }

    /// Re-key an item already in the heap and restore the heap property.
    /// Handles both cheaper and costlier new keys.
    pub fn update(&mut self, item: u32, key: K) {
        debug_assert!(self.contains(item), "update of absent item {item}");
        let pos = self.slots[item as usize].pos as usize;
        self.entries[pos].0 = key;
        let pos = self.sift_up(pos);
        self.sift_down(pos);
    }

    /// Forget all entries without deallocating backing storage. O(1).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    /// Sift the entry at `pos` toward the root. Returns its final position.
    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.entries[pos].0 >= self.entries[parent].0 {
                break;
            }
            self.swap_entries(pos, parent);
            pos = parent;
        }
        pos
    }

    /// Sift the entry at `pos` toward the leaves.
    fn sift_down(&mut self, mut pos: usize) {
        let len = self.entries.len();
        loop {
            let left = pos * 2 + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut smallest = pos;
            if self.entries[left].0 < self.entries[smallest].0 {
                smallest = left;
            }
            if right < len && self.entries[right].0 < self.entries[smallest].0 {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap_entries(pos, smallest);
            pos = smallest;
        }
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slots[self.entries[a].1 as usize].pos = a as u32;
        self.slots[self.entries[b].1 as usize].pos = b as u32;
    }
}
