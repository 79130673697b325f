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


//! API to get a page of corrections.

use crate::db::Fetch;
use crate::driver::Driver;
use ape_core::rest::{EmptyBody, ListQuery, RestError, pagination_headers};
use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Query(query): Query<Vec<(String, String)>>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let query = ListQuery::from(query);
    let fetch = if query.get_bool("eagerload", true)? { Fetch::Eager } else { Fetch::Lazy };
    let request =
        query.page_request(driver.opts().default_page_size, driver.opts().max_page_size)?;

    let page = driver.find_all_corrections(request, fetch).await?;
    let headers = pagination_headers("/api/corrections", &query, &page)?;
    Ok((headers, Json(page.into_content())))
}
