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


//! Persistence of corrections.

use crate::db::exercises::exercise_from_row;
use crate::db::{EntityRow, Fetch, check_update, count_rows, delete_row, order_by};
use crate::model::{Correction, CorrectionId, ExerciseId, Link};
#[cfg(feature = "postgres")]
use ape_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use ape_core::db::sqlite;
use ape_core::db::{DbError, DbResult, Executor};
use ape_core::model::{Page, PageRequest};
use sqlx::Row;

/// Columns backing the sortable properties of a correction.
const SORT_COLUMNS: &[(&str, &str)] =
    &[("id", "r.id"), ("content", "r.content"), ("exercise", "r.exercise_id")];

/// Query to fetch corrections with unresolved exercises.
const SELECT_LAZY: &str = "SELECT r.id, r.content, r.exercise_id FROM correction r";

/// Query to fetch corrections together with their exercises.  The courses of the exercises are
/// not resolved.
const SELECT_EAGER: &str = "
    SELECT
        r.id, r.content, r.exercise_id,
        e.title AS exercise_title, e.content AS exercise_content, e.mark AS exercise_mark,
        e.course_id AS exercise_course_id, r.id AS exercise_correction_id
    FROM correction r
    JOIN exercise e ON e.id = r.exercise_id";

/// Returns the query to fetch corrections according to `fetch`.
fn select(fetch: Fetch) -> &'static str {
    match fetch {
        Fetch::Lazy => SELECT_LAZY,
        Fetch::Eager => SELECT_EAGER,
    }
}

/// Decodes a correction from `row`, resolving its exercise if requested by `fetch`.
fn correction_from_row<R: EntityRow>(row: &R, fetch: Fetch) -> DbResult<Correction> {
    let id = row.get_i64("id")?;
    let content = row.get_string("content")?;
    let exercise_id = row.get_i64("exercise_id")?;

    let exercise = match fetch {
        Fetch::Lazy => Link::new(ExerciseId::from(exercise_id)),
        Fetch::Eager => Link::resolved(exercise_from_row(row, "exercise_", Fetch::Lazy)?)?,
    };

    Ok(Correction::new(content, exercise).with_id(CorrectionId::from(id)))
}

/// Stores `correction`, inserting it if it has no identity yet or replacing the existing row
/// otherwise, and returns its identity.
///
/// Fails with `ConstraintViolation` if the correction has no exercise or if its exercise does not
/// exist, and with `AlreadyExists` if another correction already refers to the same exercise.
pub async fn save_correction(ex: &mut Executor, correction: &Correction) -> DbResult<CorrectionId> {
    let exercise_id = match correction.exercise_id() {
        Some(id) => id.as_i64(),
        None => {
            return Err(DbError::ConstraintViolation(
                "Correction must refer to an exercise".to_owned(),
            ));
        }
    };

    match correction.id() {
        None => {
            let id: i64 = match ex {
                #[cfg(feature = "postgres")]
                Executor::Postgres(ex) => {
                    let query_str =
                        "INSERT INTO correction (content, exercise_id) VALUES ($1, $2) RETURNING id";
                    let row = sqlx::query(query_str)
                        .bind(correction.content().as_str())
                        .bind(exercise_id)
                        .fetch_one(&mut **ex)
                        .await
                        .map_err(postgres::map_sqlx_error)?;
                    row.try_get("id").map_err(postgres::map_sqlx_error)?
                }

                #[cfg(any(feature = "sqlite", test))]
                Executor::Sqlite(ex) => {
                    let query_str = "INSERT INTO correction (content, exercise_id) VALUES (?, ?)";
                    let done = sqlx::query(query_str)
                        .bind(correction.content().as_str())
                        .bind(exercise_id)
                        .execute(&mut **ex)
                        .await
                        .map_err(sqlite::map_sqlx_error)?;
                    done.last_insert_rowid()
                }

                #[allow(unused)]
                _ => unreachable!(),
            };
            Ok(CorrectionId::from(id))
        }

        Some(id) => {
            let rows_affected = match ex {
                #[cfg(feature = "postgres")]
                Executor::Postgres(ex) => {
                    let query_str =
                        "UPDATE correction SET content = $1, exercise_id = $2 WHERE id = $3";
                    let done = sqlx::query(query_str)
                        .bind(correction.content().as_str())
                        .bind(exercise_id)
                        .bind(id.as_i64())
                        .execute(&mut **ex)
                        .await
                        .map_err(postgres::map_sqlx_error)?;
                    done.rows_affected()
                }

                #[cfg(any(feature = "sqlite", test))]
                Executor::Sqlite(ex) => {
                    let query_str =
                        "UPDATE correction SET content = ?, exercise_id = ? WHERE id = ?";
                    let done = sqlx::query(query_str)
                        .bind(correction.content().as_str())
                        .bind(exercise_id)
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

/// Gets the correction identified by `id`, loading its exercise as requested by `fetch`.
pub async fn get_correction(
    ex: &mut Executor,
    id: CorrectionId,
    fetch: Fetch,
) -> DbResult<Correction> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!("{} WHERE r.id = $1", select(fetch));
            let row = sqlx::query(&query_str)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            correction_from_row(&row, fetch)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!("{} WHERE r.id = ?", select(fetch));
            let row = sqlx::query(&query_str)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            correction_from_row(&row, fetch)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Counts all corrections.
pub async fn count_corrections(ex: &mut Executor) -> DbResult<u64> {
    count_rows(ex, "correction", None).await
}

/// Counts the corrections of the exercise identified by `exercise_id`, which is at most one.
pub async fn count_exercise_corrections(
    ex: &mut Executor,
    exercise_id: ExerciseId,
) -> DbResult<u64> {
    count_rows(ex, "correction", Some(("exercise_id", exercise_id.as_i64()))).await
}

/// Checks whether the correction identified by `id` exists.
pub async fn correction_exists(ex: &mut Executor, id: CorrectionId) -> DbResult<bool> {
    Ok(count_rows(ex, "correction", Some(("id", id.as_i64()))).await? > 0)
}

/// Gets the page of corrections described by `request`, loading their exercises as requested by
/// `fetch`.
pub async fn list_corrections(
    ex: &mut Executor,
    request: PageRequest,
    fetch: Fetch,
) -> DbResult<Page<Correction>> {
    let total = count_rows(ex, "correction", None).await?;
    let order = order_by(request.sort(), SORT_COLUMNS)?;
    let limit = i64::from(request.size());
    let offset = i64::try_from(request.offset())
        .map_err(|e| DbError::BackendError(format!("Invalid page offset: {}", e)))?;

    let corrections = match ex {
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
                .map(|row| correction_from_row(row, fetch))
                .collect::<DbResult<Vec<Correction>>>()?
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
                .map(|row| correction_from_row(row, fetch))
                .collect::<DbResult<Vec<Correction>>>()?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Page::new(corrections, request, total))
}

/// Gets all corrections sorted by identity, loading their exercises as requested by `fetch`.
pub async fn list_all_corrections(ex: &mut Executor, fetch: Fetch) -> DbResult<Vec<Correction>> {
    let query_str = format!("{} ORDER BY r.id ASC", select(fetch));
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let rows = sqlx::query(&query_str)
                .fetch_all(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.iter().map(|row| correction_from_row(row, fetch)).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let rows = sqlx::query(&query_str)
                .fetch_all(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.iter().map(|row| correction_from_row(row, fetch)).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes the correction identified by `id`.
pub async fn delete_correction(ex: &mut Executor, id: CorrectionId) -> DbResult<()> {
    delete_row(ex, "correction", id.as_i64()).await
}
