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


//! API to create a correction.

use crate::driver::Driver;
use crate::model::Correction;
use crate::rest::bodies::CorrectionBody;
use crate::rest::{alert_headers, check_new, location, stored_id};
use ape_core::rest::{AlertAction, RestError};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, http};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Json(body): Json<CorrectionBody>,
) -> Result<impl IntoResponse, RestError> {
    log::debug!("REST request to save correction: {:?}", body);
    check_new::<Correction>(body.id)?;
    let correction = body.into_correction()?;

    let correction = driver.clone().save_correction(correction).await?;
    let id = stored_id(&correction)?;
    let headers = alert_headers::<Correction>(&driver, AlertAction::Created, id)?;
    Ok((
        http::StatusCode::CREATED,
        headers,
        [(http::header::LOCATION, location::<Correction>(id))],
        Json(correction),
    ))
}
