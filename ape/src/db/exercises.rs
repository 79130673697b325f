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


//! Persistence of exercises.
//!
//! Exercises do not store their correction: the back-reference is computed by joining with the
//! `correction` table, which holds the authoritative foreign key.

use crate::db::courses::course_from_row;
use crate::db::{EntityRow, Fetch, check_update, count_rows, delete_row, order_by};
use crate::model::{CorrectionId, CourseId, Exercise, ExerciseId, Link, Mark, Title};
#[cfg(feature = "postgres")]
use ape_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use ape_core::db::sqlite;
use ape_core::db::{DbError, DbResult, Executor};
use ape_core::model::{Page, PageRequest};
use sqlx::Row;

/// Columns backing the sortable properties of an exercise.
const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "e.id"),
    ("title", "e.title"),
    ("content", "e.content"),
    ("mark", "e.mark"),
    ("course", "e.course_id"),
];

/// Query to fetch exercises with unresolved courses.
const SELECT_LAZY: &str = "
    SELECT e.id, e.title, e.content, e.mark, e.course_id, r.id AS correction_id
    FROM exercise e
    LEFT JOIN correction r ON r.exercise_id = e.id";

/// Query to fetch exercises together with their courses.
const SELECT_EAGER: &str = "
    SELECT
        e.id, e.title, e.content, e.mark, e.course_id, r.id AS correction_id,
        c.title AS course_title, c.content AS course_content
    FROM exercise e
    JOIN course c ON c.id = e.course_id
    LEFT JOIN correction r ON r.exercise_id = e.id";

/// Returns the query to fetch exercises according to `fetch`.
fn select(fetch: Fetch) -> &'static str {
    match fetch {
        Fetch::Lazy => SELECT_LAZY,
        Fetch::Eager => SELECT_EAGER,
    }
}

/// Decodes an exercise from the columns of `row` whose names start with `prefix`.
///
/// With `Fetch::Eager`, the row must also carry the columns of the course of the exercise
/// prefixed by `<prefix>course_`.
pub(super) fn exercise_from_row<R: EntityRow>(
    row: &R,
    prefix: &str,
    fetch: Fetch,
) -> DbResult<Exercise> {
    let id = row.get_i64(&format!("{}id", prefix))?;
    let title = row.get_string(&format!("{}title", prefix))?;
    let content = row.get_string(&format!("{}content", prefix))?;
    let mark = row.get_i32(&format!("{}mark", prefix))?;
    let course_id = row.get_i64(&format!("{}course_id", prefix))?;
    let correction_id = row.get_opt_i64(&format!("{}correction_id", prefix))?;

    let course = match fetch {
        Fetch::Lazy => Link::new(CourseId::from(course_id)),
        Fetch::Eager => Link::resolved(course_from_row(row, &format!("{}course_", prefix))?)?,
    };

    Ok(Exercise::new(Title::new(title)?, content, Mark::new(mark)?, course)
        .with_id(ExerciseId::from(id))
        .with_correction(correction_id.map(CorrectionId::from)))
}

/// Stores `exercise`, inserting it if it has no identity yet or replacing the existing row
/// otherwise, and returns its identity.
///
/// Fails with `ConstraintViolation` if the exercise has no course or if its course does not exist.
pub async fn save_exercise(ex: &mut Executor, exercise: &Exercise) -> DbResult<ExerciseId> {
    let course_id = match exercise.course_id() {
        Some(id) => id.as_i64(),
        None => {
            return Err(DbError::ConstraintViolation("Exercise must belong to a course".to_owned()));
        }
    };

    match exercise.id() {
        None => {
            let id: i64 = match ex {
                #[cfg(feature = "postgres")]
                Executor::Postgres(ex) => {
                    let query_str = "
                        INSERT INTO exercise (title, content, mark, course_id)
                        VALUES ($1, $2, $3, $4)
                        RETURNING id";
                    let row = sqlx::query(query_str)
                        .bind(exercise.title().as_str())
                        .bind(exercise.content().as_str())
                        .bind(exercise.mark().as_i32())
                        .bind(course_id)
                        .fetch_one(&mut **ex)
                        .await
                        .map_err(postgres::map_sqlx_error)?;
                    row.try_get("id").map_err(postgres::map_sqlx_error)?
                }

                #[cfg(any(feature = "sqlite", test))]
                Executor::Sqlite(ex) => {
                    let query_str = "
                        INSERT INTO exercise (title, content, mark, course_id)
                        VALUES (?, ?, ?, ?)";
                    let done = sqlx::query(query_str)
                        .bind(exercise.title().as_str())
                        .bind(exercise.content().as_str())
                        .bind(exercise.mark().as_i32())
                        .bind(course_id)
                        .execute(&mut **ex)
                        .await
                        .map_err(sqlite::map_sqlx_error)?;
                    done.last_insert_rowid()
                }

                #[allow(unused)]
                _ => unreachable!(),
            };
            Ok(ExerciseId::from(id))
        }

        Some(id) => {
            let rows_affected = match ex {
                #[cfg(feature = "postgres")]
                Executor::Postgres(ex) => {
                    let query_str = "
                        UPDATE exercise SET title = $1, content = $2, mark = $3, course_id = $4
                        WHERE id = $5";
                    let done = sqlx::query(query_str)
                        .bind(exercise.title().as_str())
                        .bind(exercise.content().as_str())
                        .bind(exercise.mark().as_i32())
                        .bind(course_id)
                        .bind(id.as_i64())
                        .execute(&mut **ex)
                        .await
                        .map_err(postgres::map_sqlx_error)?;
                    done.rows_affected()
                }

                #[cfg(any(feature = "sqlite", test))]
                Executor::Sqlite(ex) => {
                    let query_str = "
                        UPDATE exercise SET title = ?, content = ?, mark = ?, course_id = ?
                        WHERE id = ?";
                    let done = sqlx::query(query_str)
                        .bind(exercise.title().as_str())
                        .bind(exercise.content().as_str())
                        .bind(exercise.mark().as_i32())
                        .bind(course_id)
                        .bind(id.as_i64())
                        .execute(&mut **ex)
                        .await
                        .map_err(sqlite::map_sqlx_error)?;
                    done.rows_affected()
                }

                #[allow(unused)]
                _ => unreachable!(),
            };
            check_update(rows_affected)?;
            Ok(id)
        }
    }
}

/// Gets the exercise identified by `id`, loading its course as requested by `fetch`.
pub async fn get_exercise(ex: &mut Executor, id: ExerciseId, fetch: Fetch) -> DbResult<Exercise> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!("{} WHERE e.id = $1", select(fetch));
            let row = sqlx::query(&query_str)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            exercise_from_row(&row, "", fetch)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!("{} WHERE e.id = ?", select(fetch));
            let row = sqlx::query(&query_str)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            exercise_from_row(&row, "", fetch)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Counts all exercises.
pub async fn count_exercises(ex: &mut Executor) -> DbResult<u64> {
    count_rows(ex, "exercise", None).await
}

/// Counts the exercises that belong to the course identified by `course_id`.
pub async fn count_course_exercises(ex: &mut Executor, course_id: CourseId) -> DbResult<u64> {
    count_rows(ex, "exercise", Some(("course_id", course_id.as_i64()))).await
}

/// Checks whether the exercise identified by `id` exists.
pub async fn exercise_exists(ex: &mut Executor, id: ExerciseId) -> DbResult<bool> {
    Ok(count_rows(ex, "exercise", Some(("id", id.as_i64()))).await? > 0)
}

/// Gets the page of exercises described by `request`, loading their courses as requested by
/// `fetch`.
pub async fn list_exercises(
    ex: &mut Executor,
    request: PageRequest,
    fetch: Fetch,
) -> DbResult<Page<Exercise>> {
    let total = count_rows(ex, "exercise", None).await?;
    let order = order_by(request.sort(), SORT_COLUMNS)?;
    let limit = i64::from(request.size());
    let offset = i64::try_from(request.offset())
        .map_err(|e| DbError::BackendError(format!("Invalid page offset: {}", e)))?;

    let exercises = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str =
                format!("{} ORDER BY {} LIMIT $1 OFFSET $2", select(fetch), order);
            let rows = sqlx::query(&query_str)
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.iter()
                .map(|row| exercise_from_row(row, "", fetch))
                .collect::<DbResult<Vec<Exercise>>>()?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!("{} ORDER BY {} LIMIT ? OFFSET ?", select(fetch), order);
            let rows = sqlx::query(&query_str)
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.iter()
                .map(|row| exercise_from_row(row, "", fetch))
                .collect::<DbResult<Vec<Exercise>>>()?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Page::new(exercises, request, total))
}

/// Gets all exercises sorted by identity, loading their courses as requested by `fetch`.
pub async fn list_all_exercises(ex: &mut Executor, fetch: Fetch) -> DbResult<Vec<Exercise>> {
    let query_str = format!("{} ORDER BY e.id ASC", select(fetch));
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let rows = sqlx::query(&query_str)
                .fetch_all(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.iter().map(|row| exercise_from_row(row, "", fetch)).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let rows = sqlx::query(&query_str)
                .fetch_all(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.iter().map(|row| exercise_from_row(row, "", fetch)).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes the exercise identified by `id`.
///
/// Fails with `ConstraintViolation` if the exercise still has a correction.
pub async fn delete_exercise(ex: &mut Executor, id: ExerciseId) -> DbResult<()> {
    delete_row(ex, "exercise", id.as_i64()).await
}
