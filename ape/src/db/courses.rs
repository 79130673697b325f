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


//! Persistence of courses.

use crate::db::{EntityRow, check_update, count_rows, delete_row, order_by};
use crate::model::{Course, CourseId, Title};
#[cfg(feature = "postgres")]
use ape_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use ape_core::db::sqlite;
use ape_core::db::{DbError, DbResult, Executor};
use ape_core::model::{Page, PageRequest};
use sqlx::Row;

/// Columns backing the sortable properties of a course.
const SORT_COLUMNS: &[(&str, &str)] = &[("id", "id"), ("title", "title"), ("content", "content")];

/// Decodes a course from the columns of `row` whose names start with `prefix`.
pub(super) fn course_from_row<R: EntityRow>(row: &R, prefix: &str) -> DbResult<Course> {
    let id = row.get_i64(&format!("{}id", prefix))?;
    let title = row.get_string(&format!("{}title", prefix))?;
    let content = row.get_string(&format!("{}content", prefix))?;

    Ok(Course::new(Title::new(title)?, content).with_id(CourseId::from(id)))
}

/// Stores `course`, inserting it if it has no identity yet or replacing the existing row
/// otherwise, and returns its identity.
pub async fn save_course(ex: &mut Executor, course: &Course) -> DbResult<CourseId> {
    match course.id() {
        None => {
            let id: i64 = match ex {
                #[cfg(feature = "postgres")]
                Executor::Postgres(ex) => {
                    let query_str =
                        "INSERT INTO course (title, content) VALUES ($1, $2) RETURNING id";
                    let row = sqlx::query(query_str)
                        .bind(course.title().as_str())
                        .bind(course.content().as_str())
                        .fetch_one(&mut **ex)
                        .await
                        .map_err(postgres::map_sqlx_error)?;
                    row.try_get("id").map_err(postgres::map_sqlx_error)?
                }

                #[cfg(any(feature = "sqlite", test))]
                Executor::Sqlite(ex) => {
                    let query_str = "INSERT INTO course (title, content) VALUES (?, ?)";
                    let done = sqlx::query(query_str)
                        .bind(course.title().as_str())
                        .bind(course.content().as_str())
                        .execute(&mut **ex)
                        .await
                        .map_err(sqlite::map_sqlx_error)?;
                    done.last_insert_rowid()
                }

                #[allow(unused)]
                _ => unreachable!(),
            };
            Ok(CourseId::from(id))
        }

        Some(id) => {
            let rows_affected = match ex {
                #[cfg(feature = "postgres")]
                Executor::Postgres(ex) => {
                    let query_str = "UPDATE course SET title = $1, content = $2 WHERE id = $3";
                    let done = sqlx::query(query_str)
                        .bind(course.title().as_str())
                        .bind(course.content().as_str())
                        .bind(id.as_i64())
                        .execute(&mut **ex)
                        .await
                        .map_err(postgres::map_sqlx_error)?;
                    done.rows_affected()
                }

                #[cfg(any(feature = "sqlite", test))]
                Executor::Sqlite(ex) => {
                    let query_str = "UPDATE course SET title = ?, content = ? WHERE id = ?";
                    let done = sqlx::query(query_str)
                        .bind(course.title().as_str())
                        .bind(course.content().as_str())
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

/// Gets the course identified by `id`.
pub async fn get_course(ex: &mut Executor, id: CourseId) -> DbResult<Course> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT id, title, content FROM course WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            course_from_row(&row, "")
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT id, title, content FROM course WHERE id = ?";
            let row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            course_from_row(&row, "")
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Counts all courses.
pub async fn count_courses(ex: &mut Executor) -> DbResult<u64> {
    count_rows(ex, "course", None).await
}

/// Checks whether the course identified by `id` exists.
pub async fn course_exists(ex: &mut Executor, id: CourseId) -> DbResult<bool> {
    Ok(count_rows(ex, "course", Some(("id", id.as_i64()))).await? > 0)
}

/// Gets the page of courses described by `request`.
pub async fn list_courses(ex: &mut Executor, request: PageRequest) -> DbResult<Page<Course>> {
    let total = count_rows(ex, "course", None).await?;
    let order = order_by(request.sort(), SORT_COLUMNS)?;
    let limit = i64::from(request.size());
    let offset = i64::try_from(request.offset())
        .map_err(|e| DbError::BackendError(format!("Invalid page offset: {}", e)))?;

    let courses = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "SELECT id, title, content FROM course ORDER BY {} LIMIT $1 OFFSET $2",
                order
            );
            let rows = sqlx::query(&query_str)
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.iter().map(|row| course_from_row(row, "")).collect::<DbResult<Vec<Course>>>()?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!(
                "SELECT id, title, content FROM course ORDER BY {} LIMIT ? OFFSET ?",
                order
            );
            let rows = sqlx::query(&query_str)
                .bind(limit)
                .bind(offset)
                .fetch_all(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.iter().map(|row| course_from_row(row, "")).collect::<DbResult<Vec<Course>>>()?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    Ok(Page::new(courses, request, total))
}

/// Deletes the course identified by `id`.
///
/// Fails with `ConstraintViolation` if the course still has exercises.
pub async fn delete_course(ex: &mut Executor, id: CourseId) -> DbResult<()> {
    delete_row(ex, "course", id.as_i64()).await
}
