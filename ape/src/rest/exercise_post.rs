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


//! API to create an exercise.

use crate::driver::Driver;
use crate::model::Exercise;
use crate::rest::bodies::ExerciseBody;
use crate::rest::{alert_headers, check_new, location, stored_id};
use ape_core::rest::{AlertAction, RestError};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, http};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Json(body): Json<ExerciseBody>,
) -> Result<impl IntoResponse, RestError> {
    log::debug!("REST request to save exercise: {:?}", body);
    check_new::<Exercise>(body.id)?;
    let exercise = body.into_exercise()?;

    let exercise = driver.clone().save_exercise(exercise).await?;
    let id = stored_id(&exercise)?;
    let headers = alert_headers::<Exercise>(&driver, AlertAction::Created, id)?;
    Ok((
        http::StatusCode::CREATED,
        headers,
        [(http::header::LOCATION, location::<Exercise>(id))],
        Json(exercise),
    ))
}
