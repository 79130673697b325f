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


//! Business logic for the service.
//!
//! The driver is the only caller of the database layer.  Every operation runs in its own
//! transaction: mutations in a read-write one and queries in a read-only one.

use ape_core::db::{Db, DbError, DbResult};
use ape_core::env::get_optional_var;
use std::sync::Arc;

mod corrections;
mod courses;
mod exercises;
#[cfg(test)]
pub(crate) mod testutils;

/// Default value for the `APPLICATION_NAME` setting when not specified.
const DEFAULT_APPLICATION_NAME: &str = "ape";

/// Default value for the `DEFAULT_PAGE_SIZE` setting when not specified.
const DEFAULT_DEFAULT_PAGE_SIZE: u32 = 20;

/// Default value for the `MAX_PAGE_SIZE` setting when not specified.
const DEFAULT_MAX_PAGE_SIZE: u32 = 2000;

/// Configuration options for the service.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ServiceOptions {
    /// Name of the application, used to label the alert headers of responses.
    pub application_name: String,

    /// Number of items to return per page when a listing does not specify one.
    pub default_page_size: u32,

    /// Maximum number of items to return per page, regardless of the requested size.
    pub max_page_size: u32,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            application_name: DEFAULT_APPLICATION_NAME.to_owned(),
            default_page_size: DEFAULT_DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl ServiceOptions {
    /// Creates a new set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_APPLICATION_NAME`, `<prefix>_DEFAULT_PAGE_SIZE`
    /// and `<prefix>_MAX_PAGE_SIZE`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let opts = Self {
            application_name: get_optional_var::<String>(prefix, "APPLICATION_NAME")?
                .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_owned()),
            default_page_size: get_optional_var::<u32>(prefix, "DEFAULT_PAGE_SIZE")?
                .unwrap_or(DEFAULT_DEFAULT_PAGE_SIZE),
            max_page_size: get_optional_var::<u32>(prefix, "MAX_PAGE_SIZE")?
                .unwrap_or(DEFAULT_MAX_PAGE_SIZE),
        };

        if opts.application_name.is_empty() {
            return Err(format!("{}_APPLICATION_NAME cannot be empty", prefix));
        }
        if opts.default_page_size == 0 || opts.default_page_size > opts.max_page_size {
            return Err(format!(
                "{}_DEFAULT_PAGE_SIZE must be between 1 and {}",
                prefix, opts.max_page_size
            ));
        }
        Ok(opts)
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Options for the service.
    opts: ServiceOptions,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, opts: ServiceOptions) -> Self {
        Self { db, opts }
    }

    /// Returns a reference to the options provided at creation time.
    pub(crate) fn opts(&self) -> &ServiceOptions {
        &self.opts
    }
}

/// Converts the result of a lookup into an optional value, mapping `NotFound` to `None`.
fn found<T>(result: DbResult<T>) -> DbResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DbError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Ignores `NotFound` errors from a deletion, whose outcome is the same as if the entity had
/// existed.
fn ignore_not_found(result: DbResult<()>) -> DbResult<()> {
    match result {
        Ok(()) | Err(DbError::NotFound) => Ok(()),
        Err(e) => Err(e),
    }
}
