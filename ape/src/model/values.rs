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


//! Identities and validated scalar values shared by the entities.

use ape_core::model::{ModelError, ModelResult};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Generates a newtype for the identity of an entity, which is assigned by the database.
macro_rules! entity_id [
    ( $name:ident, $entity:literal ) => {
        #[doc = concat!("Identity of a ", $entity, ", assigned once at its first insertion.")]
        #[derive(
            Clone, Copy, Debug, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd,
            Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Returns the raw value of the identity as stored in the database.
            pub fn as_i64(self) -> i64 {
                self.0
            }
        }
    }
];

entity_id!(CourseId, "course");
entity_id!(ExerciseId, "exercise");
entity_id!(CorrectionId, "correction");

/// Title of a course or an exercise.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    /// Maximum number of characters in a title.
    pub const MAX_LENGTH: usize = 255;

    /// Creates a new title after validating that it is not empty and that it fits in storage.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(ModelError("Title cannot be empty".to_owned()));
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(ModelError(format!(
                "Title cannot be longer than {} characters",
                Self::MAX_LENGTH
            )));
        }
        Ok(Self(s))
    }

    /// Returns a string view of the title.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Mark awarded by an exercise.  Never negative.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Mark(i32);

impl Mark {
    /// Creates a new mark after validating that it is not negative.
    pub fn new(mark: i32) -> ModelResult<Self> {
        if mark < 0 {
            return Err(ModelError(format!("Mark must be at least 0 but got {}", mark)));
        }
        Ok(Self(mark))
    }

    /// Returns the mark as an `i32`, which is how it is stored.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}
