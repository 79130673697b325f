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


//! Common tests for any database implementation.

use crate::db::*;
use crate::model::*;
use ape_core::db::{Db, DbError};
use ape_core::model::{Direction, PageRequest, SortOrder};
use std::sync::Arc;

/// Stores a new course with the given `title` and returns its identity.
async fn put_course(db: &Arc<dyn Db + Send + Sync>, title: &str) -> CourseId {
    let course = Course::new(Title::new(title).unwrap(), format!("About {}", title));
    save_course(&mut db.ex().await.unwrap(), &course).await.unwrap()
}

/// Stores a new exercise for `course` with the given `title` and `mark` and returns its identity.
async fn put_exercise(
    db: &Arc<dyn Db + Send + Sync>,
    course: CourseId,
    title: &str,
    mark: i32,
) -> ExerciseId {
    let exercise = Exercise::new(
        Title::new(title).unwrap(),
        format!("Solve {}", title),
        Mark::new(mark).unwrap(),
        Link::new(course),
    );
    save_exercise(&mut db.ex().await.unwrap(), &exercise).await.unwrap()
}

/// Stores a new correction for `exercise` and returns its identity.
async fn put_correction(
    db: &Arc<dyn Db + Send + Sync>,
    exercise: ExerciseId,
    content: &str,
) -> CorrectionId {
    let correction = Correction::new(content.to_owned(), Link::new(exercise));
    save_correction(&mut db.ex().await.unwrap(), &correction).await.unwrap()
}

async fn test_course_save_and_get(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let course = Course::new(Title::new("Algebra").unwrap(), "Lots of text".to_owned());
    let id = save_course(&mut ex, &course).await.unwrap();

    let stored = get_course(&mut ex, id).await.unwrap();
    assert_eq!(Some(id), stored.id());
    assert_eq!("Algebra", stored.title().as_str());
    assert_eq!("Lots of text", stored.content());

    let mut updated = stored.clone();
    updated.merge(CoursePatch {
        title: Some(Title::new("Geometry").unwrap()),
        content: None,
    });
    assert_eq!(id, save_course(&mut ex, &updated).await.unwrap());

    let stored = get_course(&mut ex, id).await.unwrap();
    assert_eq!("Geometry", stored.title().as_str());
    assert_eq!("Lots of text", stored.content());

    drop(ex);
    db.close().await;
}

async fn test_course_ids_are_unique(db: Arc<dyn Db + Send + Sync>) {
    let id1 = put_course(&db, "First").await;
    let id2 = put_course(&db, "Second").await;
    assert_ne!(id1, id2);
    db.close().await;
}

async fn test_course_update_not_found(db: Arc<dyn Db + Send + Sync>) {
    let course = Course::new(Title::new("Ghost").unwrap(), "".to_owned())
        .with_id(CourseId::from(1234));
    assert_eq!(
        DbError::NotFound,
        save_course(&mut db.ex().await.unwrap(), &course).await.unwrap_err()
    );
    assert_eq!(
        DbError::NotFound,
        get_course(&mut db.ex().await.unwrap(), CourseId::from(1234)).await.unwrap_err()
    );
    db.close().await;
}

async fn test_course_count_and_exists(db: Arc<dyn Db + Send + Sync>) {
    assert_eq!(0, count_courses(&mut db.ex().await.unwrap()).await.unwrap());

    let id = put_course(&db, "Algebra").await;
    put_course(&db, "Geometry").await;

    assert_eq!(2, count_courses(&mut db.ex().await.unwrap()).await.unwrap());
    assert!(course_exists(&mut db.ex().await.unwrap(), id).await.unwrap());
    assert!(!course_exists(&mut db.ex().await.unwrap(), CourseId::from(9999)).await.unwrap());
    db.close().await;
}

async fn test_course_list_pages_and_sorts(db: Arc<dyn Db + Send + Sync>) {
    let c = put_course(&db, "c").await;
    let a = put_course(&db, "a").await;
    let b = put_course(&db, "b").await;

    let ids = |page: &ape_core::model::Page<Course>| {
        page.content().iter().map(|c| c.id().unwrap()).collect::<Vec<CourseId>>()
    };

    let request = PageRequest::new(0, 2).unwrap();
    let page = list_courses(&mut db.ex().await.unwrap(), request).await.unwrap();
    assert_eq!(vec![c, a], ids(&page));
    assert_eq!(3, page.total());

    let request = PageRequest::new(1, 2).unwrap();
    let page = list_courses(&mut db.ex().await.unwrap(), request).await.unwrap();
    assert_eq!(vec![b], ids(&page));

    let request =
        PageRequest::new(0, 10).unwrap().with_sort(SortOrder::new("title", Direction::Desc));
    let page = list_courses(&mut db.ex().await.unwrap(), request).await.unwrap();
    assert_eq!(vec![c, b, a], ids(&page));

    let request = PageRequest::new(5, 10).unwrap();
    let page = list_courses(&mut db.ex().await.unwrap(), request).await.unwrap();
    assert!(page.content().is_empty());
    assert_eq!(3, page.total());

    db.close().await;
}

async fn test_course_delete(db: Arc<dyn Db + Send + Sync>) {
    let id = put_course(&db, "Algebra").await;
    put_course(&db, "Geometry").await;

    delete_course(&mut db.ex().await.unwrap(), id).await.unwrap();
    assert_eq!(1, count_courses(&mut db.ex().await.unwrap()).await.unwrap());
    assert_eq!(DbError::NotFound, get_course(&mut db.ex().await.unwrap(), id).await.unwrap_err());
    assert_eq!(
        DbError::NotFound,
        delete_course(&mut db.ex().await.unwrap(), id).await.unwrap_err()
    );
    db.close().await;
}

async fn test_course_delete_with_exercises(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    put_exercise(&db, course, "Sums", 3).await;

    match delete_course(&mut db.ex().await.unwrap(), course).await {
        Err(DbError::ConstraintViolation(_)) => (),
        e => panic!("Must have failed with a ConstraintViolation but got: {:?}", e),
    }
    assert!(course_exists(&mut db.ex().await.unwrap(), course).await.unwrap());
    db.close().await;
}

async fn test_exercise_lazy_and_eager(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    let id = put_exercise(&db, course, "Sums", 3).await;

    let lazy = get_exercise(&mut db.ex().await.unwrap(), id, Fetch::Lazy).await.unwrap();
    let eager = get_exercise(&mut db.ex().await.unwrap(), id, Fetch::Eager).await.unwrap();

    for exercise in [&lazy, &eager] {
        assert_eq!(Some(id), exercise.id());
        assert_eq!("Sums", exercise.title().as_str());
        assert_eq!("Solve Sums", exercise.content());
        assert_eq!(3, exercise.mark().as_i32());
        assert_eq!(Some(course), exercise.course_id());
        assert_eq!(None, exercise.correction());
    }

    assert!(!lazy.course().unwrap().is_resolved());
    let resolved = eager.course().unwrap().get().unwrap();
    assert_eq!(Some(course), resolved.id());
    assert_eq!("Algebra", resolved.title().as_str());
    assert_eq!("About Algebra", resolved.content());

    db.close().await;
}

async fn test_exercise_update_moves_course(db: Arc<dyn Db + Send + Sync>) {
    let course1 = put_course(&db, "Algebra").await;
    let course2 = put_course(&db, "Geometry").await;
    let id = put_exercise(&db, course1, "Sums", 3).await;

    let mut exercise = get_exercise(&mut db.ex().await.unwrap(), id, Fetch::Lazy).await.unwrap();
    exercise.set_course(Some(Link::new(course2)));
    exercise.merge(ExercisePatch { mark: Some(Mark::new(7).unwrap()), ..Default::default() });
    save_exercise(&mut db.ex().await.unwrap(), &exercise).await.unwrap();

    let stored = get_exercise(&mut db.ex().await.unwrap(), id, Fetch::Lazy).await.unwrap();
    assert_eq!(Some(course2), stored.course_id());
    assert_eq!(7, stored.mark().as_i32());
    assert_eq!("Sums", stored.title().as_str());

    let mut ex = db.ex().await.unwrap();
    assert_eq!(0, count_course_exercises(&mut ex, course1).await.unwrap());
    assert_eq!(1, count_course_exercises(&mut ex, course2).await.unwrap());
    drop(ex);
    db.close().await;
}

async fn test_exercise_requires_existing_course(db: Arc<dyn Db + Send + Sync>) {
    let exercise = Exercise::new(
        Title::new("Orphan").unwrap(),
        "".to_owned(),
        Mark::new(0).unwrap(),
        Link::new(CourseId::from(4321)),
    );
    match save_exercise(&mut db.ex().await.unwrap(), &exercise).await {
        Err(DbError::ConstraintViolation(_)) => (),
        e => panic!("Must have failed with a ConstraintViolation but got: {:?}", e),
    }
    assert_eq!(0, count_exercises(&mut db.ex().await.unwrap()).await.unwrap());
    db.close().await;
}

async fn test_exercise_without_course(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    let id = put_exercise(&db, course, "Sums", 3).await;

    let mut exercise = get_exercise(&mut db.ex().await.unwrap(), id, Fetch::Lazy).await.unwrap();
    exercise.set_course(None);
    match save_exercise(&mut db.ex().await.unwrap(), &exercise).await {
        Err(DbError::ConstraintViolation(_)) => (),
        e => panic!("Must have failed with a ConstraintViolation but got: {:?}", e),
    }

    let stored = get_exercise(&mut db.ex().await.unwrap(), id, Fetch::Lazy).await.unwrap();
    assert_eq!(Some(course), stored.course_id());
    db.close().await;
}

async fn test_exercise_correction_back_reference(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    let graded = put_exercise(&db, course, "Sums", 3).await;
    let ungraded = put_exercise(&db, course, "Products", 4).await;
    let correction = put_correction(&db, graded, "It is 4").await;

    let mut ex = db.ex().await.unwrap();
    let exercise = get_exercise(&mut ex, graded, Fetch::Lazy).await.unwrap();
    assert_eq!(Some(correction), exercise.correction());
    let exercise = get_exercise(&mut ex, ungraded, Fetch::Eager).await.unwrap();
    assert_eq!(None, exercise.correction());

    let all = list_all_exercises(&mut ex, Fetch::Lazy).await.unwrap();
    assert_eq!(
        vec![(graded, Some(correction)), (ungraded, None)],
        all.iter().map(|e| (e.id().unwrap(), e.correction())).collect::<Vec<_>>()
    );
    drop(ex);
    db.close().await;
}

async fn test_exercise_list_sorted_by_mark(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    let e1 = put_exercise(&db, course, "One", 5).await;
    let e2 = put_exercise(&db, course, "Two", 1).await;
    let e3 = put_exercise(&db, course, "Three", 5).await;

    let request =
        PageRequest::new(0, 10).unwrap().with_sort(SortOrder::new("mark", Direction::Asc));
    let page = list_exercises(&mut db.ex().await.unwrap(), request, Fetch::Eager).await.unwrap();
    assert_eq!(
        vec![e2, e1, e3],
        page.content().iter().map(|e| e.id().unwrap()).collect::<Vec<_>>()
    );
    assert!(page.content().iter().all(|e| e.course().unwrap().is_resolved()));
    assert_eq!(3, page.total());

    db.close().await;
}

async fn test_exercise_delete_with_correction(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    let exercise = put_exercise(&db, course, "Sums", 3).await;
    let correction = put_correction(&db, exercise, "It is 4").await;

    match delete_exercise(&mut db.ex().await.unwrap(), exercise).await {
        Err(DbError::ConstraintViolation(_)) => (),
        e => panic!("Must have failed with a ConstraintViolation but got: {:?}", e),
    }

    delete_correction(&mut db.ex().await.unwrap(), correction).await.unwrap();
    delete_exercise(&mut db.ex().await.unwrap(), exercise).await.unwrap();
    assert!(!exercise_exists(&mut db.ex().await.unwrap(), exercise).await.unwrap());
    db.close().await;
}

async fn test_correction_lazy_and_eager(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    let exercise = put_exercise(&db, course, "Sums", 3).await;
    let id = put_correction(&db, exercise, "It is 4").await;

    let lazy = get_correction(&mut db.ex().await.unwrap(), id, Fetch::Lazy).await.unwrap();
    let eager = get_correction(&mut db.ex().await.unwrap(), id, Fetch::Eager).await.unwrap();

    for correction in [&lazy, &eager] {
        assert_eq!(Some(id), correction.id());
        assert_eq!("It is 4", correction.content());
        assert_eq!(Some(exercise), correction.exercise_id());
    }

    assert!(!lazy.exercise().unwrap().is_resolved());
    let resolved = eager.exercise().unwrap().get().unwrap();
    assert_eq!(Some(exercise), resolved.id());
    assert_eq!("Sums", resolved.title().as_str());
    assert_eq!(3, resolved.mark().as_i32());
    assert_eq!(Some(course), resolved.course_id());
    assert!(!resolved.course().unwrap().is_resolved());
    assert_eq!(Some(id), resolved.correction());

    db.close().await;
}

async fn test_correction_one_per_exercise(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    let exercise = put_exercise(&db, course, "Sums", 3).await;
    put_correction(&db, exercise, "It is 4").await;

    let duplicate = Correction::new("It is 5".to_owned(), Link::new(exercise));
    assert_eq!(
        DbError::AlreadyExists,
        save_correction(&mut db.ex().await.unwrap(), &duplicate).await.unwrap_err()
    );

    let mut ex = db.ex().await.unwrap();
    assert_eq!(1, count_corrections(&mut ex).await.unwrap());
    assert_eq!(1, count_exercise_corrections(&mut ex, exercise).await.unwrap());
    drop(ex);
    db.close().await;
}

async fn test_correction_requires_existing_exercise(db: Arc<dyn Db + Send + Sync>) {
    let correction = Correction::new("Nothing to fix".to_owned(), Link::new(ExerciseId::from(77)));
    match save_correction(&mut db.ex().await.unwrap(), &correction).await {
        Err(DbError::ConstraintViolation(_)) => (),
        e => panic!("Must have failed with a ConstraintViolation but got: {:?}", e),
    }
    db.close().await;
}

async fn test_correction_without_exercise(db: Arc<dyn Db + Send + Sync>) {
    let mut correction = Correction::new("Unattached".to_owned(), Link::new(ExerciseId::from(1)));
    correction.set_exercise(None);
    match save_correction(&mut db.ex().await.unwrap(), &correction).await {
        Err(DbError::ConstraintViolation(_)) => (),
        e => panic!("Must have failed with a ConstraintViolation but got: {:?}", e),
    }
    assert_eq!(0, count_corrections(&mut db.ex().await.unwrap()).await.unwrap());
    db.close().await;
}

async fn test_correction_update_and_list(db: Arc<dyn Db + Send + Sync>) {
    let course = put_course(&db, "Algebra").await;
    let e1 = put_exercise(&db, course, "Sums", 3).await;
    let e2 = put_exercise(&db, course, "Products", 3).await;
    let r1 = put_correction(&db, e1, "b").await;
    let r2 = put_correction(&db, e2, "a").await;

    let mut correction =
        get_correction(&mut db.ex().await.unwrap(), r1, Fetch::Lazy).await.unwrap();
    correction.merge(CorrectionPatch { content: Some("c".to_owned()) });
    save_correction(&mut db.ex().await.unwrap(), &correction).await.unwrap();

    let request =
        PageRequest::new(0, 10).unwrap().with_sort(SortOrder::new("content", Direction::Asc));
    let page =
        list_corrections(&mut db.ex().await.unwrap(), request, Fetch::Lazy).await.unwrap();
    assert_eq!(
        vec![(r2, "a"), (r1, "c")],
        page.content()
            .iter()
            .map(|r| (r.id().unwrap(), r.content().as_str()))
            .collect::<Vec<_>>()
    );

    let all = list_all_corrections(&mut db.ex().await.unwrap(), Fetch::Eager).await.unwrap();
    assert_eq!(2, all.len());
    assert!(all.iter().all(|r| r.exercise().unwrap().is_resolved()));
    assert!(correction_exists(&mut db.ex().await.unwrap(), r2).await.unwrap());

    db.close().await;
}

async fn test_tx_rollback_discards_writes(db: Arc<dyn Db + Send + Sync>) {
    {
        let mut tx = db.begin().await.unwrap();
        let course = Course::new(Title::new("Algebra").unwrap(), "".to_owned());
        save_course(tx.ex(), &course).await.unwrap();
    }

    assert_eq!(0, count_courses(&mut db.ex().await.unwrap()).await.unwrap());
    db.close().await;
}

macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta] )? ) => {
        ape_core::db::testutils::generate_tests!(
            $(#[$extra],)?
            $setup,
            $crate::db::tests,
            test_course_save_and_get,
            test_course_ids_are_unique,
            test_course_update_not_found,
            test_course_count_and_exists,
            test_course_list_pages_and_sorts,
            test_course_delete,
            test_course_delete_with_exercises,
            test_exercise_lazy_and_eager,
            test_exercise_update_moves_course,
            test_exercise_requires_existing_course,
            test_exercise_without_course,
            test_exercise_correction_back_reference,
            test_exercise_list_sorted_by_mark,
            test_exercise_delete_with_correction,
            test_correction_lazy_and_eager,
            test_correction_one_per_exercise,
            test_correction_requires_existing_exercise,
            test_correction_without_exercise,
            test_correction_update_and_list,
            test_tx_rollback_discards_writes
        );
    }
];

#[cfg(feature = "postgres")]
mod postgres {
    use super::*;
    use ape_core::db::postgres::testutils::setup;

    /// Connects to the test PostgreSQL database and initializes the schema.
    async fn setup_db() -> Arc<dyn Db + Send + Sync> {
        let db = Arc::new(setup().await);
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        db
    }

    generate_db_tests!(
        setup_db().await,
        #[ignore = "Requires environment configuration and is expensive"]
    );
}

mod sqlite {
    use super::*;
    use ape_core::db::sqlite::testutils::setup;

    /// Connects to an in-memory SQLite database and initializes the schema.
    async fn setup_db() -> Arc<dyn Db + Send + Sync> {
        let db = Arc::new(setup().await);
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        db
    }

    generate_db_tests!(setup_db().await);
}
