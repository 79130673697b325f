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


//! Payloads of the APIs that create and update entities.
//!
//! All fields are optional so that the handlers can tell apart missing identities from missing
//! values and report each problem with its own error key.  The shape of these types mirrors the
//! serialized entities, so they can also parse the responses of the APIs.

use crate::model::{
    Correction, CorrectionId, CorrectionPatch, Course, CourseId, CoursePatch, Entity, Exercise,
    ExerciseId, ExercisePatch, Link, Mark, Title,
};
use ape_core::model::ModelResult;
use ape_core::rest::{RestError, RestResult};
use serde::{Deserialize, Serialize};

/// Fetches the value of the required `field` of an entity `E`.
fn required<E: Entity, T>(field: &str, value: Option<T>) -> RestResult<T> {
    value.ok_or_else(|| {
        RestError::bad_request(E::NAME, "validation", format!("Field '{}' is required", field))
    })
}

/// Converts a validation failure for a field of an entity `E` into a request error.
fn valid<E: Entity, T>(result: ModelResult<T>) -> RestResult<T> {
    result.map_err(|e| RestError::bad_request(E::NAME, "validation", e.to_string()))
}

/// Payload describing a course.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct CourseBody {
    /// Identity of the course.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<CourseId>,

    /// Title of the course.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,

    /// Description of the course.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) content: Option<String>,
}

impl CourseBody {
    /// Converts the payload into a course, requiring all of its fields.
    pub(crate) fn into_course(self) -> RestResult<Course> {
        let title = valid::<Course, _>(Title::new(required::<Course, _>("title", self.title)?))?;
        let content = required::<Course, _>("content", self.content)?;
        let course = Course::new(title, content);
        Ok(match self.id {
            Some(id) => course.with_id(id),
            None => course,
        })
    }

    /// Converts the payload into the changes to apply to an existing course.
    pub(crate) fn into_patch(self) -> RestResult<CoursePatch> {
        Ok(CoursePatch {
            title: valid::<Course, _>(self.title.map(Title::new).transpose())?,
            content: self.content,
        })
    }
}

/// Payload describing an exercise.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct ExerciseBody {
    /// Identity of the exercise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<ExerciseId>,

    /// Title of the exercise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,

    /// Statement of the exercise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) content: Option<String>,

    /// Mark awarded by the exercise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) mark: Option<i32>,

    /// Course of the exercise.  Only its identity matters when creating or updating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) course: Option<CourseBody>,

    /// Correction of the exercise.  Ignored on input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) correction: Option<Box<CorrectionBody>>,
}

impl ExerciseBody {
    /// Converts the payload into an exercise, requiring all of its fields.
    pub(crate) fn into_exercise(self) -> RestResult<Exercise> {
        let title =
            valid::<Exercise, _>(Title::new(required::<Exercise, _>("title", self.title)?))?;
        let content = required::<Exercise, _>("content", self.content)?;
        let mark = valid::<Exercise, _>(Mark::new(required::<Exercise, _>("mark", self.mark)?))?;
        let course = required::<Exercise, _>("course", self.course.and_then(|c| c.id))?;
        let exercise = Exercise::new(title, content, mark, Link::new(course));
        Ok(match self.id {
            Some(id) => exercise.with_id(id),
            None => exercise,
        })
    }

    /// Converts the payload into the changes to apply to an existing exercise.  The course of
    /// the exercise is not part of the changes.
    pub(crate) fn into_patch(self) -> RestResult<ExercisePatch> {
        Ok(ExercisePatch {
            title: valid::<Exercise, _>(self.title.map(Title::new).transpose())?,
            content: self.content,
            mark: valid::<Exercise, _>(self.mark.map(Mark::new).transpose())?,
        })
    }
}

/// Payload describing a correction.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct CorrectionBody {
    /// Identity of the correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<CorrectionId>,

    /// Text of the correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) content: Option<String>,

    /// Exercise the correction solves.  Only its identity matters when creating or updating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) exercise: Option<Box<ExerciseBody>>,
}

impl CorrectionBody {
    /// Converts the payload into a correction, requiring all of its fields.
    pub(crate) fn into_correction(self) -> RestResult<Correction> {
        let content = required::<Correction, _>("content", self.content)?;
        let exercise = required::<Correction, _>("exercise", self.exercise.and_then(|e| e.id))?;
        let correction = Correction::new(content, Link::new(exercise));
        Ok(match self.id {
            Some(id) => correction.with_id(id),
            None => correction,
        })
    }

    /// Converts the payload into the changes to apply to an existing correction.  The exercise
    /// of the correction is not part of the changes.
    pub(crate) fn into_patch(self) -> CorrectionPatch {
        CorrectionPatch { content: self.content }
    }
}

#[cfg(test)]
impl CourseBody {
    /// Creates a payload for a new course.
    pub(crate) fn new(title: &str, content: &str) -> Self {
        Self { id: None, title: Some(title.to_owned()), content: Some(content.to_owned()) }
    }

    /// Creates a payload that only carries the identity of a course.
    pub(crate) fn reference(id: CourseId) -> Self {
        Self { id: Some(id), ..Default::default() }
    }
}

#[cfg(test)]
impl ExerciseBody {
    /// Creates a payload for a new exercise in `course`.
    pub(crate) fn new(title: &str, content: &str, mark: i32, course: CourseId) -> Self {
        Self {
            id: None,
            title: Some(title.to_owned()),
            content: Some(content.to_owned()),
            mark: Some(mark),
            course: Some(CourseBody::reference(course)),
            correction: None,
        }
    }

    /// Creates a payload that only carries the identity of an exercise.
    pub(crate) fn reference(id: ExerciseId) -> Self {
        Self { id: Some(id), ..Default::default() }
    }
}

#[cfg(test)]
impl CorrectionBody {
    /// Creates a payload for a new correction of `exercise`.
    pub(crate) fn new(content: &str, exercise: ExerciseId) -> Self {
        Self {
            id: None,
            content: Some(content.to_owned()),
            exercise: Some(Box::new(ExerciseBody::reference(exercise))),
        }
    }
}
