//! Fixed-capacity slot tables addressed by 1-based handles.

use super::ResourceError;

/// Handle to a loaded texture. `0` is never issued and means "no texture".
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct TextureHandle(pub(crate) u32);

/// Handle to a loaded font. `0` is never issued and means "no font".
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct FontHandle(pub(crate) u32);

macro_rules! handle_common {
    ($t:ty) => {
        impl $t {
            pub const INVALID: Self = Self(0);

            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != 0
            }

            /// Raw handle value: slot index + 1, or 0.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl SlotHandle for $t {
            fn from_slot(slot: usize) -> Self {
                Self(slot as u32 + 1)
            }

            fn slot(self) -> Option<usize> {
                (self.0 as usize).checked_sub(1)
            }
        }
    };
}

pub(crate) trait SlotHandle: Copy {
    fn from_slot(slot: usize) -> Self;
    fn slot(self) -> Option<usize>;
}

handle_common!(TextureHandle);
handle_common!(FontHandle);

/// Table of at most `capacity` entries.
///
/// Inserting takes the lowest free slot, so a freed handle value is reissued
/// by the next load.
#[derive(Debug)]
pub(crate) struct SlotTable<T> {
    slots: Vec<Option<T>>,
    kind: &'static str,
}

impl<T> SlotTable<T> {
    pub fn new(kind: &'static str, capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            kind,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Index of the lowest free slot.
    pub fn free_slot(&self) -> Result<usize, ResourceError> {
        self.slots
            .iter()
            .position(Option::is_none)
            .ok_or(ResourceError::PoolFull {
                kind: self.kind,
                capacity: self.capacity(),
            })
    }

    /// Stores `value` in the lowest free slot.
    pub fn insert<H: SlotHandle>(&mut self, value: T) -> Result<H, ResourceError> {
        let slot = self.free_slot()?;
        Ok(self.fill(slot, value))
    }

    /// Stores `value` in `slot`, as returned by [`free_slot`](Self::free_slot).
    pub fn fill<H: SlotHandle>(&mut self, slot: usize, value: T) -> H {
        debug_assert!(self.slots[slot].is_none(), "slot {slot} is occupied");
        self.slots[slot] = Some(value);
        H::from_slot(slot)
    }

    pub fn get<H: SlotHandle>(&self, handle: H) -> Option<&T> {
        self.slots.get(handle.slot()?)?.as_ref()
    }

    pub fn remove<H: SlotHandle>(&mut self, handle: H) -> Option<T> {
        self.slots.get_mut(handle.slot()?)?.take()
    }

    /// Empties the table, yielding every live entry.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.slots.iter_mut().filter_map(Option::take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_start_at_one() {
        let mut t = SlotTable::new("test", 4);
        let a: TextureHandle = t.insert("a").unwrap();
        let b: TextureHandle = t.insert("b").unwrap();
        assert_eq!((a.raw(), b.raw()), (1, 2));
        assert!(a.is_valid());
        assert!(!TextureHandle::INVALID.is_valid());
    }

    #[test]
    fn lowest_freed_slot_is_reused() {
        let mut t = SlotTable::new("test", 4);
        let h: Vec<FontHandle> = (0..3).map(|i| t.insert(i).unwrap()).collect();

        assert_eq!(t.remove(h[1]), Some(1));
        assert_eq!(t.remove(h[0]), Some(0));

        let next: FontHandle = t.insert(9).unwrap();
        assert_eq!(next, h[0]);
        let after: FontHandle = t.insert(10).unwrap();
        assert_eq!(after, h[1]);
    }

    #[test]
    fn full_table_reports_capacity() {
        let mut t = SlotTable::new("font", 2);
        let _: FontHandle = t.insert(()).unwrap();
        let _: FontHandle = t.insert(()).unwrap();
        let err = t.insert::<FontHandle>(()).unwrap_err();
        assert!(matches!(err, ResourceError::PoolFull { kind: "font", capacity: 2 }));
    }

    #[test]
    fn invalid_and_stale_handles_are_ignored() {
        let mut t = SlotTable::<u8>::new("test", 2);
        assert!(t.get(TextureHandle::INVALID).is_none());
        assert!(t.remove(TextureHandle(99)).is_none());

        let h: TextureHandle = t.insert(5).unwrap();
        assert_eq!(t.remove(h), Some(5));
        assert_eq!(t.remove(h), None);
    }

    #[test]
    fn drain_empties_the_table() {
        let mut t = SlotTable::new("test", 3);
        let _: TextureHandle = t.insert(1).unwrap();
        let _: TextureHandle = t.insert(2).unwrap();
        let mut drained: Vec<_> = t.drain().collect();
        drained.sort();
        assert_eq!(drained, vec![1, 2]);
        assert_eq!(t.len(), 0);
    }
}
