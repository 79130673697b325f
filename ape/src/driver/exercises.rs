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


//! Operations on exercises.

use crate::db::{self, Fetch};
use crate::driver::{Driver, found, ignore_not_found};
use crate::model::{Entity, EntityGraph, Exercise, ExerciseId, ExercisePatch};
use ape_core::driver::{DriverError, DriverResult};
use ape_core::model::{Page, PageRequest};
use log::debug;

impl Driver {
    /// Stores `exercise`, creating it if it has no identity or replacing it otherwise, and
    /// returns the stored version.
    ///
    /// Fails with a conflict if the course of the exercise does not exist.
    pub(crate) async fn save_exercise(self, exercise: Exercise) -> DriverResult<Exercise> {
        debug!("Request to save exercise: {:?}", exercise);
        let mut tx = self.db.begin().await?;
        let id = db::save_exercise(tx.ex(), &exercise).await?;
        let exercise = db::get_exercise(tx.ex(), id, Fetch::Lazy).await?;
        tx.commit().await?;
        Ok(exercise)
    }

    /// Replaces all fields of the existing `exercise`, including its course.
    pub(crate) async fn update_exercise(self, exercise: Exercise) -> DriverResult<Exercise> {
        debug!("Request to update exercise: {:?}", exercise);
        self.save_exercise(exercise).await
    }

    /// Overwrites the scalar fields of the exercise identified by `id` with those present in
    /// `patch`.  The course of the exercise is left untouched.
    ///
    /// Returns `None` if the exercise does not exist.
    pub(crate) async fn partial_update_exercise(
        self,
        id: ExerciseId,
        patch: ExercisePatch,
    ) -> DriverResult<Option<Exercise>> {
        debug!("Request to partially update exercise {}: {:?}", id, patch);
        let mut tx = self.db.begin().await?;
        let mut exercise = match found(db::get_exercise(tx.ex(), id, Fetch::Lazy).await)? {
            Some(exercise) => exercise,
            None => return Ok(None),
        };
        exercise.merge(patch);
        db::save_exercise(tx.ex(), &exercise).await?;
        tx.commit().await?;
        Ok(Some(exercise))
    }

    /// Gets the page of exercises described by `request`, loading their courses as requested by
    /// `fetch`.
    pub(crate) async fn find_all_exercises(
        self,
        request: PageRequest,
        fetch: Fetch,
    ) -> DriverResult<Page<Exercise>> {
        debug!("Request to get all exercises: {:?} ({:?})", request, fetch);
        request.check_sort(Exercise::SORT_PROPERTIES)?;
        let mut tx = self.db.begin_ro().await?;
        let page = db::list_exercises(tx.ex(), request, fetch).await?;
        tx.commit().await?;
        Ok(page)
    }

    /// Gets all exercises that do not have a correction yet, sorted by identity.
    pub(crate) async fn find_all_exercises_without_correction(
        self,
        fetch: Fetch,
    ) -> DriverResult<Vec<Exercise>> {
        debug!("Request to get all exercises where correction is null ({:?})", fetch);
        let mut tx = self.db.begin_ro().await?;
        let exercises = db::list_all_exercises(tx.ex(), fetch).await?;
        let corrections = db::list_all_corrections(tx.ex(), Fetch::Lazy).await?;
        tx.commit().await?;

        let graph = EntityGraph::from_persisted(vec![], exercises, corrections);
        Ok(graph
            .exercise_keys()
            .filter(|key| graph.correction_of(*key).is_none())
            .map(|key| graph.exercise(key).clone())
            .collect())
    }

    /// Gets the exercise identified by `id` together with its course, if it exists.
    pub(crate) async fn find_one_exercise(self, id: ExerciseId) -> DriverResult<Option<Exercise>> {
        debug!("Request to get exercise {}", id);
        let mut tx = self.db.begin_ro().await?;
        let exercise = found(db::get_exercise(tx.ex(), id, Fetch::Eager).await)?;
        tx.commit().await?;
        Ok(exercise)
    }

    /// Checks whether the exercise identified by `id` exists.
    pub(crate) async fn exercise_exists(self, id: ExerciseId) -> DriverResult<bool> {
        let mut tx = self.db.begin_ro().await?;
        let exists = db::exercise_exists(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(exists)
    }

    /// Deletes the exercise identified by `id`.
    ///
    /// Exercises that have a correction cannot be deleted.  Deleting an exercise that does not
    /// exist succeeds.
    pub(crate) async fn delete_exercise(self, id: ExerciseId) -> DriverResult<()> {
        debug!("Request to delete exercise {}", id);
        let mut tx = self.db.begin().await?;
        if db::count_exercise_corrections(tx.ex(), id).await? > 0 {
            return Err(DriverError::Conflict(format!(
                "Cannot delete exercise {} because it has a correction",
                id
            )));
        }
        ignore_not_found(db::delete_exercise(tx.ex(), id).await)?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::{CourseId, Link, Mark, Title};
    use ape_core::db::DbError;

    /// Creates a new exercise for `course` that has not been stored yet.
    fn new_exercise(course: CourseId, title: &str, mark: i32) -> Exercise {
        Exercise::new(
            Title::new(title).unwrap(),
            "Statement".to_owned(),
            Mark::new(mark).unwrap(),
            Link::new(course),
        )
    }

    #[tokio::test]
    async fn test_save_exercise_round_trip() {
        let context = TestContext::setup().await;
        let course = context.put_course("Algebra").await.id().unwrap();

        let saved =
            context.driver().save_exercise(new_exercise(course, "Sums", 3)).await.unwrap();
        let id = saved.id().unwrap();

        let found = context.driver().find_one_exercise(id).await.unwrap().unwrap();
        assert_eq!(saved, found);
        assert_eq!("Sums", found.title().as_str());
        assert_eq!("Statement", found.content());
        assert_eq!(3, found.mark().as_i32());
        assert_eq!(Some(course), found.course_id());
        assert!(found.course().unwrap().is_resolved());
        assert_eq!(None, found.correction());
    }

    #[tokio::test]
    async fn test_save_exercise_unknown_course() {
        let context = TestContext::setup().await;

        match context.driver().save_exercise(new_exercise(CourseId::from(8), "Sums", 3)).await {
            Err(DriverError::Conflict(_)) => (),
            e => panic!("Must have failed with a Conflict but got: {:?}", e),
        }
        assert_eq!(0, db::count_exercises(&mut context.ex().await).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_exercise_changes_course() {
        let context = TestContext::setup().await;
        let course1 = context.put_course("Algebra").await.id().unwrap();
        let course2 = context.put_course("Geometry").await.id().unwrap();
        let exercise = context.put_exercise(course1, "Sums", 3).await;

        let replacement = new_exercise(course2, "Angles", 4).with_id(exercise.id().unwrap());
        let saved = context.driver().update_exercise(replacement).await.unwrap();
        assert_eq!(Some(course2), saved.course_id());
        assert_eq!("Angles", saved.title().as_str());
        assert_eq!(4, saved.mark().as_i32());
    }

    #[tokio::test]
    async fn test_update_exercise_keeps_correction() {
        let context = TestContext::setup().await;
        let course = context.put_course("Algebra").await.id().unwrap();
        let exercise = context.put_exercise(course, "Sums", 3).await;
        let correction = context.put_correction(exercise.id().unwrap(), "It is 4").await;

        let replacement = new_exercise(course, "Sums", 5).with_id(exercise.id().unwrap());
        let saved = context.driver().update_exercise(replacement).await.unwrap();
        assert_eq!(correction.id(), saved.correction());
    }

    #[tokio::test]
    async fn test_partial_update_exercise_merges_present_fields() {
        let context = TestContext::setup().await;
        let course = context.put_course("Algebra").await.id().unwrap();
        let exercise = context
            .driver()
            .save_exercise(
                Exercise::new(
                    Title::new("A").unwrap(),
                    "B".to_owned(),
                    Mark::new(1).unwrap(),
                    Link::new(course),
                ),
            )
            .await
            .unwrap();

        let patch = ExercisePatch { mark: Some(Mark::new(2).unwrap()), ..Default::default() };
        let merged = context
            .driver()
            .partial_update_exercise(exercise.id().unwrap(), patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!("A", merged.title().as_str());
        assert_eq!("B", merged.content());
        assert_eq!(2, merged.mark().as_i32());
        assert_eq!(Some(course), merged.course_id());

        let stored =
            db::get_exercise(&mut context.ex().await, exercise.id().unwrap(), Fetch::Lazy)
                .await
                .unwrap();
        assert_eq!("A", stored.title().as_str());
        assert_eq!("B", stored.content());
        assert_eq!(2, stored.mark().as_i32());
    }

    #[tokio::test]
    async fn test_partial_update_exercise_not_found() {
        let context = TestContext::setup().await;

        let result = context
            .driver()
            .partial_update_exercise(ExerciseId::from(3), ExercisePatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_all_exercises_lazy_and_eager() {
        let context = TestContext::setup().await;
        let course = context.put_course("Algebra").await.id().unwrap();
        context.put_exercise(course, "Sums", 3).await;
        context.put_exercise(course, "Products", 4).await;

        let request = PageRequest::new(0, 1).unwrap();
        let lazy = context.driver().find_all_exercises(request.clone(), Fetch::Lazy).await.unwrap();
        let eager = context.driver().find_all_exercises(request, Fetch::Eager).await.unwrap();

        assert_eq!(2, lazy.total());
        assert_eq!(2, lazy.total_pages());
        assert_eq!(lazy.content(), eager.content());
        assert!(!lazy.content()[0].course().unwrap().is_resolved());
        assert!(eager.content()[0].course().unwrap().is_resolved());
    }

    #[tokio::test]
    async fn test_find_all_exercises_without_correction() {
        let context = TestContext::setup().await;
        let course = context.put_course("Algebra").await.id().unwrap();
        let e1 = context.put_exercise(course, "One", 1).await;
        let e2 = context.put_exercise(course, "Two", 1).await;
        let e3 = context.put_exercise(course, "Three", 1).await;
        context.put_correction(e2.id().unwrap(), "Solved").await;

        let exercises =
            context.driver().find_all_exercises_without_correction(Fetch::Lazy).await.unwrap();
        assert_eq!(vec![e1, e3], exercises);
        assert!(exercises.iter().all(|e| e.correction().is_none()));
    }

    #[tokio::test]
    async fn test_find_one_exercise_not_found() {
        let context = TestContext::setup().await;

        assert!(context.driver().find_one_exercise(ExerciseId::from(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exercise_exists() {
        let context = TestContext::setup().await;
        let course = context.put_course("Algebra").await.id().unwrap();
        let exercise = context.put_exercise(course, "Sums", 3).await;

        assert!(context.driver().exercise_exists(exercise.id().unwrap()).await.unwrap());
        assert!(!context.driver().exercise_exists(ExerciseId::from(99)).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_exercise_decreases_count() {
        let context = TestContext::setup().await;
        let course = context.put_course("Algebra").await.id().unwrap();
        let exercise = context.put_exercise(course, "Sums", 3).await;
        context.put_exercise(course, "Products", 3).await;

        context.driver().delete_exercise(exercise.id().unwrap()).await.unwrap();

        assert_eq!(1, db::count_exercises(&mut context.ex().await).await.unwrap());
        assert_eq!(
            DbError::NotFound,
            db::get_exercise(&mut context.ex().await, exercise.id().unwrap(), Fetch::Lazy)
                .await
                .unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_exercise_with_correction() {
        let context = TestContext::setup().await;
        let course = context.put_course("Algebra").await.id().unwrap();
        let exercise = context.put_exercise(course, "Sums", 3).await;
        context.put_correction(exercise.id().unwrap(), "It is 4").await;

        match context.driver().delete_exercise(exercise.id().unwrap()).await {
            Err(DriverError::Conflict(_)) => (),
            e => panic!("Must have failed with a Conflict but got: {:?}", e),
        }
        assert_eq!(1, db::count_exercises(&mut context.ex().await).await.unwrap());
    }
}
