use alloc::collections::BTreeSet;
use core::any::TypeId;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type ItemIndexMap<K> = HashMap<K, BTreeSet<usize>>;
#[cfg(not(feature = "std"))]
pub(crate) type ItemIndexMap<K> = BTreeMap<K, BTreeSet<usize>>;

#[cfg(feature = "std")]
pub(crate) type TypeMap<V> = HashMap<TypeId, V>;
#[cfg(not(feature = "std"))]
pub(crate) type TypeMap<V> = BTreeMap<TypeId, V>;

/// Bound on values used as reverse-lookup keys (items in an [`crate::IndexBiMap`]).
///
/// With `std` this is `Hash + Eq`; without it, `Ord`.
#[cfg(feature = "std")]
pub trait ItemKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> ItemKey for K {}

#[cfg(not(feature = "std"))]
pub trait ItemKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> ItemKey for K {}
