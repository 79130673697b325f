// APE
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.


//! References from one entity to another.

use ape_core::model::{ModelError, ModelResult};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Common properties of all persisted entities.
pub trait Entity {
    /// Type of the identity of the entity.
    type Id: Copy + Eq + fmt::Debug + fmt::Display + Serialize;

    /// Name of the entity as exposed to clients.
    const NAME: &'static str;

    /// Properties that listings of this entity can be sorted by.
    const SORT_PROPERTIES: &'static [&'static str];

    /// Returns the identity of the entity, which is absent until the entity is first stored.
    fn id(&self) -> Option<Self::Id>;
}

/// A required reference to another entity of type `T`.
///
/// The reference always knows the identity of its target.  It may also carry the target itself
/// when the target was fetched eagerly together with the referencing entity, in which case the
/// reference is "resolved".
#[derive(Clone, Debug)]
pub struct Link<T: Entity> {
    /// Identity of the target entity.
    id: T::Id,

    /// The target entity, if it was fetched.
    target: Option<Box<T>>,
}

impl<T: Entity> Link<T> {
    /// Creates an unresolved reference to the entity identified by `id`.
    pub fn new(id: T::Id) -> Self {
        Self { id, target: None }
    }

    /// Creates a resolved reference to `target`, which must have been stored already.
    pub fn resolved(target: T) -> ModelResult<Self> {
        match target.id() {
            Some(id) => Ok(Self { id, target: Some(Box::new(target)) }),
            None => Err(ModelError(format!("Cannot reference a {} without an id", T::NAME))),
        }
    }

    /// Returns the identity of the target entity.
    pub fn id(&self) -> T::Id {
        self.id
    }

    /// Returns the target entity if the reference is resolved.
    pub fn get(&self) -> Option<&T> {
        self.target.as_deref()
    }

    /// Returns true if the reference carries its target.
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

impl<T: Entity> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: Entity + Serialize> Serialize for Link<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.target {
            Some(target) => target.serialize(serializer),
            None => serialize_id_ref(&self.id, serializer),
        }
    }
}

/// Serializes an entity identity `id` as a `{"id": <id>}` object.
fn serialize_id_ref<I: Serialize, S: Serializer>(id: &I, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Ref", 1)?;
    state.serialize_field("id", id)?;
    state.end()
}

/// Serializes an optional back-reference as a `{"id": <id>}` object or as null.
pub(crate) fn serialize_opt_id_ref<I: Serialize, S: Serializer>(
    id: &Option<I>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match id {
        Some(id) => serialize_id_ref(id, serializer),
        None => serializer.serialize_none(),
    }
}
