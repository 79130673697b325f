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


//! API to delete a correction.

use crate::driver::Driver;
use crate::model::{Correction, CorrectionId};
use crate::rest::alert_headers;
use ape_core::rest::{AlertAction, EmptyBody, RestError};
use axum::extract::{Path, State};
use axum::http;
use axum::response::IntoResponse;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<CorrectionId>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    log::debug!("REST request to delete correction {}", id);
    driver.clone().delete_correction(id).await?;

    let headers = alert_headers::<Correction>(&driver, AlertAction::Deleted, id)?;
    Ok((http::StatusCode::NO_CONTENT, headers))
}
