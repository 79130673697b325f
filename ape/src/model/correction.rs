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


//! The `Correction` entity.

use crate::model::{CorrectionId, Entity, Exercise, ExerciseId, Link};
use derive_getters::Getters;
use serde::Serialize;
use std::ptr;

/// The correction of an exercise.
///
/// A correction is the authoritative holder of the relationship with its exercise, and no two
/// corrections can refer to the same exercise.
#[derive(Clone, Debug, Getters, Serialize)]
pub struct Correction {
    /// Identity of the correction.
    #[getter(skip)]
    id: Option<CorrectionId>,

    /// Text of the correction.
    content: String,

    /// Exercise this correction solves.  Only unset while the correction is detached from its
    /// exercise in an `EntityGraph`.
    #[getter(skip)]
    exercise: Option<Link<Exercise>>,
}

impl Correction {
    /// Creates a new correction that has not been stored yet.
    pub fn new(content: String, exercise: Link<Exercise>) -> Self {
        Self { id: None, content, exercise: Some(exercise) }
    }

    /// Sets the identity of the correction.
    pub fn with_id(mut self, id: CorrectionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns the identity of the correction, if it has been stored.
    pub fn id(&self) -> Option<CorrectionId> {
        self.id
    }

    /// Returns the reference to the exercise this correction solves, if it has one.
    pub fn exercise(&self) -> Option<&Link<Exercise>> {
        self.exercise.as_ref()
    }

    /// Returns the identity of the exercise this correction solves, if it has one.
    pub fn exercise_id(&self) -> Option<ExerciseId> {
        self.exercise.as_ref().map(Link::id)
    }

    /// Replaces the exercise of the correction.
    pub fn set_exercise(&mut self, exercise: Option<Link<Exercise>>) {
        self.exercise = exercise;
    }

    /// Overwrites the scalar fields of this correction with those present in `patch`.
    ///
    /// The exercise is not subject to partial updates.
    pub fn merge(&mut self, patch: CorrectionPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
    }
}

impl Entity for Correction {
    type Id = CorrectionId;
    const NAME: &'static str = "correction";
    const SORT_PROPERTIES: &'static [&'static str] = &["id", "content", "exercise"];

    fn id(&self) -> Option<CorrectionId> {
        self.id
    }
}

/// Two corrections are the same if they are the same instance or if both are stored with equal
/// ids.
impl PartialEq for Correction {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other) || matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

/// Fields of a correction that can be modified by a partial update.
#[derive(Debug, Default)]
pub struct CorrectionPatch {
    /// New content, if any.
    pub content: Option<String>,
}
