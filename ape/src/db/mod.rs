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


//! Database abstraction in terms of the operations needed by the service.
//!
//! Every operation takes an `Executor` so that callers can decide whether to run it directly on
//! the pool or within a transaction.  The persisted layout is one table per entity, and
//! associations are only resolved by the queries that fetch them eagerly.

#[cfg(feature = "postgres")]
use ape_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use ape_core::db::sqlite;
use ape_core::db::{DbError, DbResult, Executor};
use ape_core::model::SortOrder;
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;

mod corrections;
pub use corrections::{
    correction_exists, count_corrections, count_exercise_corrections, delete_correction,
    get_correction, list_all_corrections, list_corrections, save_correction,
};
mod courses;
pub use courses::{
    count_courses, course_exists, delete_course, get_course, list_courses, save_course,
};
mod exercises;
pub use exercises::{
    count_course_exercises, count_exercises, delete_exercise, exercise_exists, get_exercise,
    list_all_exercises, list_exercises, save_exercise,
};
#[cfg(test)]
mod tests;

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// How to load the associations of the entities returned by a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fetch {
    /// Associations only carry the identity of their target.
    Lazy,

    /// Associations are resolved to their target within the same query.
    Eager,
}

/// Typed access to the columns of a row, regardless of the backend that produced it.
///
/// Entity decoders are written once against this trait instead of once per backend.
trait EntityRow {
    /// Gets the value of `column` as an `i32`.
    fn get_i32(&self, column: &str) -> DbResult<i32>;

    /// Gets the value of `column` as an `i64`.
    fn get_i64(&self, column: &str) -> DbResult<i64>;

    /// Gets the value of the nullable `column` as an `i64`.
    fn get_opt_i64(&self, column: &str) -> DbResult<Option<i64>>;

    /// Gets the value of `column` as a string.
    fn get_string(&self, column: &str) -> DbResult<String>;
}

/// Implements `EntityRow` for the row type of a backend, using `map_err` to classify errors.
macro_rules! impl_entity_row [
    ( $row:ty, $map_err:path ) => {
        impl EntityRow for $row {
            fn get_i32(&self, column: &str) -> DbResult<i32> {
                self.try_get(column).map_err($map_err)
            }

            fn get_i64(&self, column: &str) -> DbResult<i64> {
                self.try_get(column).map_err($map_err)
            }

            fn get_opt_i64(&self, column: &str) -> DbResult<Option<i64>> {
                self.try_get(column).map_err($map_err)
            }

            fn get_string(&self, column: &str) -> DbResult<String> {
                self.try_get(column).map_err($map_err)
            }
        }
    }
];

#[cfg(feature = "postgres")]
impl_entity_row!(PgRow, postgres::map_sqlx_error);

#[cfg(any(feature = "sqlite", test))]
impl_entity_row!(SqliteRow, sqlite::map_sqlx_error);

/// Builds the `ORDER BY` clause for a listing sorted by `sort`.
///
/// `columns` maps the sortable properties of the entity to their qualified columns and must
/// contain the `id` property, which is used as the default order and as the final tie breaker.
fn order_by(sort: &[SortOrder], columns: &[(&str, &str)]) -> DbResult<String> {
    let column = |property: &str| {
        columns.iter().find(|(name, _)| *name == property).map(|(_, column)| *column).ok_or_else(
            || DbError::BackendError(format!("No column for sort property '{}'", property)),
        )
    };

    let mut clauses = Vec::with_capacity(sort.len() + 1);
    for order in sort {
        clauses.push(format!("{} {}", column(order.property())?, order.direction().as_sql()));
    }
    if !sort.iter().any(|order| order.property() == "id") {
        clauses.push(format!("{} ASC", column("id")?));
    }
    Ok(clauses.join(", "))
}

/// Converts a row count returned by the database into an unsigned value.
fn to_count(count: i64) -> DbResult<u64> {
    u64::try_from(count).map_err(|e| DbError::DataIntegrityError(format!("Invalid count: {}", e)))
}

/// Counts the rows in `table`, optionally restricted to those whose `column` equals `value`.
async fn count_rows(
    ex: &mut Executor,
    table: &str,
    filter: Option<(&str, i64)>,
) -> DbResult<u64> {
    let count: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = match filter {
                Some((column, _)) => {
                    format!("SELECT COUNT(*) AS count FROM {} WHERE {} = $1", table, column)
                }
                None => format!("SELECT COUNT(*) AS count FROM {}", table),
            };
            let mut query = sqlx::query(&query_str);
            if let Some((_, value)) = filter {
                query = query.bind(value);
            }
            let row = query.fetch_one(&mut **ex).await.map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = match filter {
                Some((column, _)) => {
                    format!("SELECT COUNT(*) AS count FROM {} WHERE {} = ?", table, column)
                }
                None => format!("SELECT COUNT(*) AS count FROM {}", table),
            };
            let mut query = sqlx::query(&query_str);
            if let Some((_, value)) = filter {
                query = query.bind(value);
            }
            let row = query.fetch_one(&mut **ex).await.map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    to_count(count)
}

/// Deletes the row of `table` identified by `id`.
async fn delete_row(ex: &mut Executor, table: &str, id: i64) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!("DELETE FROM {} WHERE id = $1", table);
            let done = sqlx::query(&query_str)
                .bind(id)
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!("DELETE FROM {} WHERE id = ?", table);
            let done = sqlx::query(&query_str)
                .bind(id)
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Checks the number of rows affected by an `UPDATE` of a single row.
fn check_update(rows_affected: u64) -> DbResult<()> {
    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}
