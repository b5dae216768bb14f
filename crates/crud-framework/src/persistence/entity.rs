//! # Entity Trait
//!
//! Anything a [`StoreActor`](super::StoreActor) can keep. Entities are plain
//! serialisable values: the store assigns the id on first insert, and the
//! framework clones them out on every read.

use crate::validation::Errors;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};

pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Store key. Built from the store's `u32` counter.
    type Id: Ord + Copy + Send + Sync + Display + Debug + From<u32> + 'static;

    /// `None` until the entity has been inserted.
    fn id(&self) -> Option<Self::Id>;

    fn assign_id(&mut self, id: Self::Id);

    /// Structural checks on the entity's own fields (blank, length, format).
    ///
    /// Runs after deserialisation and binding, before any business validation.
    fn check_constraints(&self, _errors: &mut Errors) {}
}

/// Short type name for log fields, e.g. `"Shout"` rather than the full path.
pub fn entity_type<E>() -> &'static str {
    std::any::type_name::<E>()
        .split("::")
        .last()
        .unwrap_or("Unknown")
}
