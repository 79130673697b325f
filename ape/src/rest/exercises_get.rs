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


//! API to get a page of exercises, or all exercises that lack a correction.

use crate::db::Fetch;
use crate::driver::Driver;
use ape_core::rest::{EmptyBody, ListQuery, RestError, pagination_headers};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

/// Value of the `filter` parameter that selects the exercises without a correction.
const CORRECTION_IS_NULL: &str = "correction-is-null";

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<Vec<(String, String)>>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let query = ListQuery::from(query);
    let fetch = if query.get_bool("eagerload", true)? { Fetch::Eager } else { Fetch::Lazy };

    match query.get("filter") {
        None => (),
        Some(CORRECTION_IS_NULL) => {
            let exercises = driver.find_all_exercises_without_correction(fetch).await?;
            return Ok((HeaderMap::new(), Json(exercises)));
        }
        Some(filter) => {
            return Err(RestError::InvalidRequest(format!("Unknown filter '{}'", filter)));
        }
    }

    let request =
        query.page_request(driver.opts().default_page_size, driver.opts().max_page_size)?;
    let page = driver.find_all_exercises(request, fetch).await?;
    let headers = pagination_headers("/api/exercises", &query, &page)?;
    Ok((headers, Json(page.into_content())))
}
