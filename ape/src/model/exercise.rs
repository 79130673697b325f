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


//! The `Exercise` entity.

use crate::model::link::serialize_opt_id_ref;
use crate::model::{CorrectionId, Course, CourseId, Entity, ExerciseId, Link, Mark, Title};
use derive_getters::Getters;
use serde::Serialize;
use std::ptr;

/// An exercise, which belongs to exactly one course and has at most one correction.
#[derive(Clone, Debug, Getters, Serialize)]
pub struct Exercise {
    /// Identity of the exercise.
    #[getter(skip)]
    id: Option<ExerciseId>,

    /// Title of the exercise.
    title: Title,

    /// Statement of the exercise.
    content: String,

    /// Mark awarded by the exercise.
    mark: Mark,

    /// Course the exercise belongs to.  Only unset while the exercise is detached from its course
    /// in an `EntityGraph`.
    #[getter(skip)]
    course: Option<Link<Course>>,

    /// Back-reference to the correction of the exercise, if any.  The correction holds the
    /// authoritative reference.
    #[getter(skip)]
    #[serde(serialize_with = "serialize_opt_id_ref")]
    correction: Option<CorrectionId>,
}

impl Exercise {
    /// Creates a new exercise that has not been stored yet.
    pub fn new(title: Title, content: String, mark: Mark, course: Link<Course>) -> Self {
        Self { id: None, title, content, mark, course: Some(course), correction: None }
    }

    /// Sets the identity of the exercise.
    pub fn with_id(mut self, id: ExerciseId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the back-reference to the correction of the exercise.
    pub fn with_correction(mut self, correction: Option<CorrectionId>) -> Self {
        self.correction = correction;
        self
    }

    /// Returns the identity of the exercise, if it has been stored.
    pub fn id(&self) -> Option<ExerciseId> {
        self.id
    }

    /// Returns the reference to the course of the exercise, if it has one.
    pub fn course(&self) -> Option<&Link<Course>> {
        self.course.as_ref()
    }

    /// Returns the identity of the course of the exercise, if it has one.
    pub fn course_id(&self) -> Option<CourseId> {
        self.course.as_ref().map(Link::id)
    }

    /// Returns the identity of the correction of the exercise, if any.
    pub fn correction(&self) -> Option<CorrectionId> {
        self.correction
    }

    /// Replaces the course of the exercise.
    pub fn set_course(&mut self, course: Option<Link<Course>>) {
        self.course = course;
    }

    /// Replaces the back-reference to the correction of the exercise.
    pub(crate) fn set_correction(&mut self, correction: Option<CorrectionId>) {
        self.correction = correction;
    }

    /// Overwrites the scalar fields of this exercise with those present in `patch`.
    ///
    /// The course is not subject to partial updates.
    pub fn merge(&mut self, patch: ExercisePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(mark) = patch.mark {
            self.mark = mark;
        }
    }
}

impl Entity for Exercise {
    type Id = ExerciseId;
    const NAME: &'static str = "exercise";
    const SORT_PROPERTIES: &'static [&'static str] =
        &["id", "title", "content", "mark", "course"];

    fn id(&self) -> Option<ExerciseId> {
        self.id
    }
}

/// Two exercises are the same if they are the same instance or if both are stored with equal ids.
impl PartialEq for Exercise {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other) || matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

/// Fields of an exercise that can be modified by a partial update.
#[derive(Debug, Default)]
pub struct ExercisePatch {
    /// New title, if any.
    pub title: Option<Title>,

    /// New content, if any.
    pub content: Option<String>,

    /// New mark, if any.
    pub mark: Option<Mark>,
}
