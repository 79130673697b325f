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


//! Operations on courses.

use crate::db;
use crate::driver::{Driver, found, ignore_not_found};
use crate::model::{Course, CourseId, CoursePatch, Entity};
use ape_core::driver::{DriverError, DriverResult};
use ape_core::model::{Page, PageRequest};
use log::debug;

impl Driver {
    /// Stores `course`, creating it if it has no identity or replacing it otherwise, and returns
    /// the stored version.
    pub(crate) async fn save_course(self, course: Course) -> DriverResult<Course> {
        debug!("Request to save course: {:?}", course);
        let mut tx = self.db.begin().await?;
        let id = db::save_course(tx.ex(), &course).await?;
        let course = db::get_course(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(course)
    }

    /// Replaces all fields of the existing `course`.
    pub(crate) async fn update_course(self, course: Course) -> DriverResult<Course> {
        debug!("Request to update course: {:?}", course);
        self.save_course(course).await
    }

    /// Overwrites the fields of the course identified by `id` with those present in `patch`.
    ///
    /// Returns `None` if the course does not exist.
    pub(crate) async fn partial_update_course(
        self,
        id: CourseId,
        patch: CoursePatch,
    ) -> DriverResult<Option<Course>> {
        debug!("Request to partially update course {}: {:?}", id, patch);
        let mut tx = self.db.begin().await?;
        let mut course = match found(db::get_course(tx.ex(), id).await)? {
            Some(course) => course,
            None => return Ok(None),
        };
        course.merge(patch);
        db::save_course(tx.ex(), &course).await?;
        tx.commit().await?;
        Ok(Some(course))
    }

    /// Gets the page of courses described by `request`.
    pub(crate) async fn find_all_courses(self, request: PageRequest) -> DriverResult<Page<Course>> {
        debug!("Request to get all courses: {:?}", request);
        request.check_sort(Course::SORT_PROPERTIES)?;
        let mut tx = self.db.begin_ro().await?;
        let page = db::list_courses(tx.ex(), request).await?;
        tx.commit().await?;
        Ok(page)
    }

    /// Gets the course identified by `id`, if it exists.
    pub(crate) async fn find_one_course(self, id: CourseId) -> DriverResult<Option<Course>> {
        debug!("Request to get course {}", id);
        let mut tx = self.db.begin_ro().await?;
        let course = found(db::get_course(tx.ex(), id).await)?;
        tx.commit().await?;
        Ok(course)
    }

    /// Checks whether the course identified by `id` exists.
    pub(crate) async fn course_exists(self, id: CourseId) -> DriverResult<bool> {
        let mut tx = self.db.begin_ro().await?;
        let exists = db::course_exists(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(exists)
    }

    /// Deletes the course identified by `id`.
    ///
    /// Courses that still have exercises cannot be deleted.  Deleting a course that does not
    /// exist succeeds.
    pub(crate) async fn delete_course(self, id: CourseId) -> DriverResult<()> {
        debug!("Request to delete course {}", id);
        let mut tx = self.db.begin().await?;
        let exercises = db::count_course_exercises(tx.ex(), id).await?;
        if exercises > 0 {
            return Err(DriverError::Conflict(format!(
                "Cannot delete course {} because it still has {} exercise(s)",
                id, exercises
            )));
        }
        ignore_not_found(db::delete_course(tx.ex(), id).await)?;
        tx.commit().await?;
        Ok(())
    }
}
