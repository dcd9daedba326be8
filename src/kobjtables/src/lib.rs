//! This crate provides the kernel object table, the registry that maps the
//! 32-bit ids a guest holds onto host-side objects (open files, directory
//! listings, ...).
//!
//! A table is generic over the object type `K`, which is normally an enum
//! with one variant per kind of kernel object.  Callers ask for a concrete
//! variant through the [`ObjectVariant`] trait; asking for the wrong variant
//! fails with that variant's "missing" error code, the same code the guest
//! gets for an id that was never issued.  There are no unchecked downcasts.
//!
//! Ids are handed out lowest-free-first starting at a base value, so an id
//! is reused only after its object has been destroyed.  Destroying an entry
//! hands the object back to the caller, which is then responsible for its
//! teardown (for example, closing the backend file it wraps).  This keeps
//! release of host resources in exactly one place.
//!
//! There is no global table.  Whoever owns the subsystem owns the table and
//! passes it around by reference.

// *********************** CLIPPY DISCUSSION **************************** //
// Pedantic lints are warnings during development; CI is where they matter.
#![warn(clippy::all, missing_docs, clippy::pedantic)]
// ids are u32 on the guest side and usize for indexing
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
// ********************* END CLIPPY DISCUSSION ************************* //

use std::collections::BTreeMap;

use sysdefs::constants::{SceError, KERNEL_OBJECT_ID_BASE, KERNEL_OBJECT_MAX};

/// Diagnostics every kernel object provides.
pub trait KernelObject {
    /// Human readable name, usually the path the object was opened with.
    fn name(&self) -> &str;
    /// Short tag naming the kind of object (`"OpenFile"`, ...).
    fn type_name(&self) -> &'static str;
}

/// Safe "get as variant X" access into a table's object type `K`.
///
/// Implement this once per variant.  `from_object` and friends return
/// `None` / `Err` when `K` holds a different variant.
pub trait ObjectVariant<K>: Sized {
    /// Code returned to the guest when a lookup for this variant fails.
    fn missing_error_code() -> u32;

    /// Borrow the variant out of the stored object.
    fn from_object(obj: &K) -> Option<&Self>;

    /// Mutably borrow the variant out of the stored object.
    fn from_object_mut(obj: &mut K) -> Option<&mut Self>;

    /// Whether `obj` holds this variant.
    fn is_variant(obj: &K) -> bool {
        Self::from_object(obj).is_some()
    }
}

/// The kernel object table.
#[derive(Debug)]
pub struct HandleTable<K> {
    entries: BTreeMap<u32, K>,
    base: u32,
    max: u32,
}

impl<K> Default for HandleTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> HandleTable<K> {
    /// A table handing out ids from `KERNEL_OBJECT_ID_BASE` up to
    /// `KERNEL_OBJECT_MAX` live entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(KERNEL_OBJECT_ID_BASE, KERNEL_OBJECT_MAX)
    }

    /// A table with a custom id base and capacity.
    #[must_use]
    pub fn with_limits(base: u32, max: u32) -> Self {
        HandleTable {
            entries: BTreeMap::new(),
            base,
            max,
        }
    }

    /// Register `obj` under the lowest free id.
    ///
    /// # Errors
    ///
    /// `SCE_KERNEL_ERROR_MFILE` once `max` objects are live.
    pub fn create(&mut self, obj: K) -> Result<u32, u32> {
        // Check the ids in order.
        for candidate in self.base..self.base.saturating_add(self.max) {
            if let std::collections::btree_map::Entry::Vacant(e) = self.entries.entry(candidate) {
                e.insert(obj);
                return Ok(candidate);
            }
        }
        log::error!("kernel object table full ({} entries)", self.entries.len());
        Err(SceError::KernelMfile.code())
    }

    /// Look up `id` as variant `T`.
    ///
    /// # Errors
    ///
    /// `T::missing_error_code()` if `id` is not live or holds another variant.
    pub fn get<T: ObjectVariant<K>>(&self, id: u32) -> Result<&T, u32> {
        self.entries
            .get(&id)
            .and_then(T::from_object)
            .ok_or_else(T::missing_error_code)
    }

    /// Mutable form of [`HandleTable::get`].
    ///
    /// # Errors
    ///
    /// `T::missing_error_code()` if `id` is not live or holds another variant.
    pub fn get_mut<T: ObjectVariant<K>>(&mut self, id: u32) -> Result<&mut T, u32> {
        self.entries
            .get_mut(&id)
            .and_then(T::from_object_mut)
            .ok_or_else(T::missing_error_code)
    }

    /// Remove `id` and give its object back.  The id becomes free for reuse.
    ///
    /// # Errors
    ///
    /// `T::missing_error_code()` if `id` is not live or holds another variant;
    /// the entry is left untouched in that case.
    pub fn destroy<T: ObjectVariant<K>>(&mut self, id: u32) -> Result<K, u32> {
        match self.entries.get(&id) {
            Some(obj) if T::is_variant(obj) => {}
            _ => return Err(T::missing_error_code()),
        }
        self.entries.remove(&id).ok_or_else(T::missing_error_code)
    }

    /// Whether `id` is live (any variant).
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no objects are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live ids and objects in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &K)> {
        self.entries.iter().map(|(id, obj)| (*id, obj))
    }

    /// Remove every object, handing them back in id order for teardown.
    pub fn drain(&mut self) -> Vec<(u32, K)> {
        std::mem::take(&mut self.entries).into_iter().collect()
    }
}

impl<K: KernelObject> HandleTable<K> {
    /// One line per live object, for debug dumps.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.iter()
            .map(|(id, obj)| format!("{id:#06x} {} {}", obj.type_name(), obj.name()))
            .collect()
    }
}

/***************************** TESTS FOLLOW ******************************/

#[cfg(test)]
mod tests {
    use super::*;

    // A small two-variant object type so lookups can be tried against the
    // wrong variant.
    #[derive(Debug, PartialEq)]
    enum Obj {
        Apple(Apple),
        Pear(Pear),
    }

    #[derive(Debug, PartialEq)]
    struct Apple(u32);
    #[derive(Debug, PartialEq)]
    struct Pear(u32);

    const APPLE_MISSING: u32 = 0x8000_0001;
    const PEAR_MISSING: u32 = 0x8000_0002;

    impl KernelObject for Obj {
        fn name(&self) -> &str {
            "fruit"
        }
        fn type_name(&self) -> &'static str {
            match self {
                Obj::Apple(_) => "Apple",
                Obj::Pear(_) => "Pear",
            }
        }
    }

    impl ObjectVariant<Obj> for Apple {
        fn missing_error_code() -> u32 {
            APPLE_MISSING
        }
        fn from_object(obj: &Obj) -> Option<&Self> {
            match obj {
                Obj::Apple(a) => Some(a),
                Obj::Pear(_) => None,
            }
        }
        fn from_object_mut(obj: &mut Obj) -> Option<&mut Self> {
            match obj {
                Obj::Apple(a) => Some(a),
                Obj::Pear(_) => None,
            }
        }
    }

    impl ObjectVariant<Obj> for Pear {
        fn missing_error_code() -> u32 {
            PEAR_MISSING
        }
        fn from_object(obj: &Obj) -> Option<&Self> {
            match obj {
                Obj::Pear(p) => Some(p),
                Obj::Apple(_) => None,
            }
        }
        fn from_object_mut(obj: &mut Obj) -> Option<&mut Self> {
            match obj {
                Obj::Pear(p) => Some(p),
                Obj::Apple(_) => None,
            }
        }
    }

    #[test]
    fn ids_start_at_base() {
        let mut table = HandleTable::new();
        let first = table.create(Obj::Apple(Apple(1))).unwrap();
        let second = table.create(Obj::Apple(Apple(2))).unwrap();
        assert_eq!(first, KERNEL_OBJECT_ID_BASE);
        assert_eq!(second, KERNEL_OBJECT_ID_BASE + 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn get_and_get_mut() {
        let mut table = HandleTable::new();
        let id = table.create(Obj::Apple(Apple(7))).unwrap();
        assert_eq!(table.get::<Apple>(id).unwrap().0, 7);
        table.get_mut::<Apple>(id).unwrap().0 = 9;
        assert_eq!(table.get::<Apple>(id), Ok(&Apple(9)));
    }

    #[test]
    fn wrong_variant_uses_its_own_missing_code() {
        let mut table = HandleTable::new();
        let id = table.create(Obj::Apple(Apple(1))).unwrap();
        assert_eq!(table.get::<Pear>(id), Err(PEAR_MISSING));
        assert_eq!(table.get::<Apple>(id + 1), Err(APPLE_MISSING));
        // a failed destroy leaves the entry alone
        assert_eq!(table.destroy::<Pear>(id), Err(PEAR_MISSING));
        assert!(table.contains(id));
    }

    #[test]
    fn destroy_then_get_fails() {
        let mut table = HandleTable::new();
        let id = table.create(Obj::Pear(Pear(3))).unwrap();
        assert_eq!(table.destroy::<Pear>(id), Ok(Obj::Pear(Pear(3))));
        assert_eq!(table.get::<Pear>(id), Err(PEAR_MISSING));
        assert_eq!(table.destroy::<Pear>(id), Err(PEAR_MISSING));
        assert!(table.is_empty());
    }

    #[test]
    fn lowest_free_id_is_reused() {
        let mut table = HandleTable::new();
        let a = table.create(Obj::Apple(Apple(1))).unwrap();
        let b = table.create(Obj::Apple(Apple(2))).unwrap();
        let c = table.create(Obj::Apple(Apple(3))).unwrap();
        table.destroy::<Apple>(b).unwrap();
        assert_eq!(table.create(Obj::Pear(Pear(4))).unwrap(), b);
        assert!(table.contains(a) && table.contains(c));
    }

    #[test]
    fn full_table_reports_mfile() {
        let mut table = HandleTable::with_limits(0x10, 2);
        table.create(Obj::Apple(Apple(1))).unwrap();
        table.create(Obj::Apple(Apple(2))).unwrap();
        assert_eq!(
            table.create(Obj::Apple(Apple(3))),
            Err(SceError::KernelMfile.code())
        );
    }

    #[test]
    fn drain_empties_in_id_order() {
        let mut table = HandleTable::new();
        table.create(Obj::Apple(Apple(1))).unwrap();
        table.create(Obj::Pear(Pear(2))).unwrap();
        let drained = table.drain();
        assert_eq!(drained.len(), 2);
        assert!(drained[0].0 < drained[1].0);
        assert!(table.is_empty());
        assert_eq!(table.create(Obj::Apple(Apple(5))).unwrap(), KERNEL_OBJECT_ID_BASE);
    }

    #[test]
    fn describe_lists_live_objects() {
        let mut table = HandleTable::new();
        table.create(Obj::Pear(Pear(2))).unwrap();
        assert_eq!(table.describe(), vec!["0x0100 Pear fruit".to_string()]);
    }
}
