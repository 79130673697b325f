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


//! The `Course` entity.

use crate::model::{CourseId, Entity, Title};
use derive_getters::Getters;
use serde::Serialize;
use std::ptr;

/// A course, which groups exercises.
///
/// The set of exercises of a course is never part of this type: it is a back-reference that the
/// `EntityGraph` maintains in memory and that the database derives from the exercises.
#[derive(Clone, Debug, Getters, Serialize)]
pub struct Course {
    /// Identity of the course.
    #[getter(skip)]
    id: Option<CourseId>,

    /// Title of the course.
    title: Title,

    /// Free-form description of the course.
    content: String,
}

impl Course {
    /// Creates a new course that has not been stored yet.
    pub fn new(title: Title, content: String) -> Self {
        Self { id: None, title, content }
    }

    /// Sets the identity of the course.
    pub fn with_id(mut self, id: CourseId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns the identity of the course, if it has been stored.
    pub fn id(&self) -> Option<CourseId> {
        self.id
    }

    /// Overwrites the fields of this course with those present in `patch`.
    pub fn merge(&mut self, patch: CoursePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
    }
}

impl Entity for Course {
    type Id = CourseId;
    const NAME: &'static str = "course";
    const SORT_PROPERTIES: &'static [&'static str] = &["id", "title", "content"];

    fn id(&self) -> Option<CourseId> {
        self.id
    }
}

/// Two courses are the same if they are the same instance or if both are stored with equal ids.
impl PartialEq for Course {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other) || matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

/// Fields of a course that can be modified by a partial update.
#[derive(Debug, Default)]
pub struct CoursePatch {
    /// New title, if any.
    pub title: Option<Title>,

    /// New content, if any.
    pub content: Option<String>,
}
