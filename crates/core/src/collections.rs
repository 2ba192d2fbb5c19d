// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! An arena-backed doubly-linked list with stable, generation-checked keys.
//!
//! [`SlotList`] gives the ordering of a linked list with the memory layout of a `Vec`:
//!
//! - O(1) insertion at either end.
//! - O(1) removal by [`SlotKey`].
//! - Removing one entry never invalidates the keys of other entries.
//! - A key that outlived its entry (or whose slot was reused) is rejected rather than
//!   aliasing the new occupant.

use std::collections::TryReserveError;

/// A stable locator for one entry in a [`SlotList`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    index: usize,
    generation: u64,
}

impl SlotKey {
    /// Returns the arena index of the slot.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the generation of the slot at the time the key was issued.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Node<V> {
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
struct Slot<V> {
    // Bumped on every removal, so a key is only valid while the generation matches
    generation: u64,
    node: Option<Node<V>>,
}

/// An ordered container with O(1) keyed removal and stable keys.
#[derive(Debug)]
pub struct SlotList<V> {
    slots: Vec<Slot<V>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<V> Default for SlotList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SlotList<V> {
    /// Creates a new empty [`SlotList`] instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the list has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `value` at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena cannot grow.
    pub fn try_push_front(&mut self, value: V) -> Result<SlotKey, TryReserveError> {
        let index = self.allocate(value)?;

        self.link_mut(index).next = self.head;
        match self.head {
            Some(head) => self.link_mut(head).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        self.len += 1;

        Ok(self.key_at(index))
    }

    /// Inserts `value` at the back of the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the arena cannot grow.
    pub fn try_push_back(&mut self, value: V) -> Result<SlotKey, TryReserveError> {
        let index = self.allocate(value)?;

        self.link_mut(index).prev = self.tail;
        match self.tail {
            Some(tail) => self.link_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        Ok(self.key_at(index))
    }

    /// Removes the entry located by `key`, returning its value.
    ///
    /// Returns `None` if the key is stale: the entry was already removed, or its slot now
    /// holds a newer entry.
    pub fn remove(&mut self, key: SlotKey) -> Option<V> {
        let slot = self.slots.get_mut(key.index)?;
        if slot.generation != key.generation {
            return None;
        }

        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);

        match node.prev {
            Some(prev) => self.link_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.link_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        // Capacity was reserved when the slot was created
        self.free.push(key.index);
        self.len -= 1;

        Some(node.value)
    }

    /// Returns a reference to the entry located by `key`, if still present.
    #[must_use]
    pub fn get(&self, key: SlotKey) -> Option<&V> {
        self.slots
            .get(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.node.as_ref())
            .map(|node| &node.value)
    }

    /// Returns whether the entry located by `key` is still present.
    #[must_use]
    pub fn contains(&self, key: SlotKey) -> bool {
        self.get(key).is_some()
    }

    /// Returns an iterator over `(key, value)` pairs from front to back.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Returns the keys of all entries from front to back.
    #[must_use]
    pub fn keys(&self) -> Vec<SlotKey> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Removes every entry for which `keep` returns false.
    ///
    /// Returns the removed entries in list order.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<(SlotKey, V)>
    where
        F: FnMut(&V) -> bool,
    {
        let doomed: Vec<SlotKey> = self
            .iter()
            .filter(|(_, value)| !keep(value))
            .map(|(key, _)| key)
            .collect();

        self.remove_keys(doomed)
    }

    /// Removes every entry, returning them in list order.
    ///
    /// Slots are kept (with bumped generations) so keys issued before the drain stay stale.
    pub fn drain(&mut self) -> Vec<(SlotKey, V)> {
        let keys = self.keys();
        self.remove_keys(keys)
    }

    fn remove_keys(&mut self, keys: Vec<SlotKey>) -> Vec<(SlotKey, V)> {
        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.remove(key) {
                removed.push((key, value));
            }
        }
        removed
    }

    fn allocate(&mut self, value: V) -> Result<usize, TryReserveError> {
        let node = Node {
            value,
            prev: None,
            next: None,
        };

        if let Some(index) = self.free.pop() {
            self.slots[index].node = Some(node);
            return Ok(index);
        }

        self.slots.try_reserve(1)?;
        // Keep room to push every slot index onto the free list, so removal never allocates
        self.free.try_reserve(self.slots.len() + 1)?;

        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        Ok(index)
    }

    fn key_at(&self, index: usize) -> SlotKey {
        SlotKey {
            index,
            generation: self.slots[index].generation,
        }
    }

    fn link_mut(&mut self, index: usize) -> &mut Node<V> {
        self.slots[index]
            .node
            .as_mut()
            .expect("linked slot must be occupied")
    }
}

/// Iterator over the entries of a [`SlotList`] from front to back.
#[derive(Debug)]
pub struct Iter<'a, V> {
    list: &'a SlotList<V>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (SlotKey, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let slot = &self.list.slots[index];
        let node = slot.node.as_ref()?;

        self.cursor = node.next;
        self.remaining -= 1;

        let key = SlotKey {
            index,
            generation: slot.generation,
        };
        Some((key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a SlotList<V> {
    type Item = (SlotKey, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    use super::*;

    fn values(list: &SlotList<u32>) -> Vec<u32> {
        list.iter().map(|(_, v)| *v).collect()
    }

    #[fixture]
    fn list() -> SlotList<u32> {
        SlotList::new()
    }

    #[rstest]
    fn test_new_is_empty(list: SlotList<u32>) {
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.iter().count(), 0);
    }

    #[rstest]
    fn test_push_front_orders_newest_first(mut list: SlotList<u32>) {
        list.try_push_front(1).unwrap();
        list.try_push_front(2).unwrap();
        list.try_push_front(3).unwrap();

        assert_eq!(values(&list), vec![3, 2, 1]);
        assert_eq!(list.len(), 3);
    }

    #[rstest]
    fn test_push_back_orders_oldest_first(mut list: SlotList<u32>) {
        list.try_push_back(1).unwrap();
        list.try_push_back(2).unwrap();
        list.try_push_back(3).unwrap();

        assert_eq!(values(&list), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_mixed_pushes(mut list: SlotList<u32>) {
        list.try_push_back(2).unwrap();
        list.try_push_front(1).unwrap();
        list.try_push_back(3).unwrap();

        assert_eq!(values(&list), vec![1, 2, 3]);
    }

    #[rstest]
    #[case(0, vec![20, 30])]
    #[case(1, vec![10, 30])]
    #[case(2, vec![10, 20])]
    fn test_remove_head_middle_tail(
        mut list: SlotList<u32>,
        #[case] position: usize,
        #[case] expected: Vec<u32>,
    ) {
        let keys = [
            list.try_push_back(10).unwrap(),
            list.try_push_back(20).unwrap(),
            list.try_push_back(30).unwrap(),
        ];

        let removed = list.remove(keys[position]);

        assert_eq!(removed, Some((position as u32 + 1) * 10));
        assert_eq!(values(&list), expected);
        assert_eq!(list.len(), 2);
    }

    #[rstest]
    fn test_remove_keeps_other_keys_valid(mut list: SlotList<u32>) {
        let a = list.try_push_back(1).unwrap();
        let b = list.try_push_back(2).unwrap();
        let c = list.try_push_back(3).unwrap();

        list.remove(b);

        assert_eq!(list.get(a), Some(&1));
        assert_eq!(list.get(c), Some(&3));
        assert!(!list.contains(b));
    }

    #[rstest]
    fn test_remove_twice_is_none(mut list: SlotList<u32>) {
        let key = list.try_push_front(7).unwrap();

        assert_eq!(list.remove(key), Some(7));
        assert_eq!(list.remove(key), None);
        assert!(list.is_empty());
    }

    #[rstest]
    fn test_stale_key_rejected_after_slot_reuse(mut list: SlotList<u32>) {
        let old = list.try_push_front(1).unwrap();
        list.remove(old);

        let new = list.try_push_front(2).unwrap();

        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert_eq!(list.get(old), None);
        assert_eq!(list.remove(old), None);
        assert_eq!(list.get(new), Some(&2));
    }

    #[rstest]
    fn test_retain_returns_removed_in_order(mut list: SlotList<u32>) {
        for value in 1..=6 {
            list.try_push_back(value).unwrap();
        }

        let removed: Vec<u32> = list
            .retain(|v| v % 2 == 0)
            .into_iter()
            .map(|(_, v)| v)
            .collect();

        assert_eq!(removed, vec![1, 3, 5]);
        assert_eq!(values(&list), vec![2, 4, 6]);
    }

    #[rstest]
    fn test_drain_empties_and_invalidates_keys(mut list: SlotList<u32>) {
        let a = list.try_push_front(1).unwrap();
        let b = list.try_push_front(2).unwrap();

        let drained: Vec<u32> = list.drain().into_iter().map(|(_, v)| v).collect();

        assert_eq!(drained, vec![2, 1]);
        assert!(list.is_empty());
        assert!(!list.contains(a));
        assert!(!list.contains(b));

        // Reused slots must not resurrect the drained keys
        list.try_push_front(3).unwrap();
        list.try_push_front(4).unwrap();
        assert!(!list.contains(a));
        assert!(!list.contains(b));
    }

    #[rstest]
    fn test_iter_size_hint(mut list: SlotList<u32>) {
        list.try_push_back(1).unwrap();
        list.try_push_back(2).unwrap();

        let iter = list.iter();
        assert_eq!(iter.len(), 2);
    }

    #[derive(Clone, Debug)]
    enum Op {
        PushFront(u32),
        PushBack(u32),
        Remove(usize),
        RemoveStale(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u32>().prop_map(Op::PushFront),
            any::<u32>().prop_map(Op::PushBack),
            any::<usize>().prop_map(Op::Remove),
            any::<usize>().prop_map(Op::RemoveStale),
        ]
    }

    proptest! {
        /// Property: the list behaves like a deque model under arbitrary operations,
        /// and keys of removed entries are never honoured again.
        #[test]
        fn slot_list_matches_deque_model(ops in proptest::collection::vec(op_strategy(), 0..128)) {
            let mut list = SlotList::new();
            let mut model: VecDeque<(SlotKey, u32)> = VecDeque::new();
            let mut stale: Vec<SlotKey> = Vec::new();

            for op in ops {
                match op {
                    Op::PushFront(v) => {
                        let key = list.try_push_front(v).unwrap();
                        model.push_front((key, v));
                    }
                    Op::PushBack(v) => {
                        let key = list.try_push_back(v).unwrap();
                        model.push_back((key, v));
                    }
                    Op::Remove(i) => {
                        if !model.is_empty() {
                            let (key, v) = model.remove(i % model.len()).unwrap();
                            prop_assert_eq!(list.remove(key), Some(v));
                            stale.push(key);
                        }
                    }
                    Op::RemoveStale(i) => {
                        if !stale.is_empty() {
                            let key = stale[i % stale.len()];
                            prop_assert_eq!(list.remove(key), None);
                        }
                    }
                }

                let expected: Vec<(SlotKey, u32)> = model.iter().copied().collect();
                let actual: Vec<(SlotKey, u32)> = list.iter().map(|(k, v)| (k, *v)).collect();
                prop_assert_eq!(actual, expected);
                prop_assert_eq!(list.len(), model.len());
            }
        }
    }
}
