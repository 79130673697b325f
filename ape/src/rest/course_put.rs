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


//! API to replace a course.

use crate::driver::Driver;
use crate::model::{Course, CourseId};
use crate::rest::bodies::CourseBody;
use crate::rest::{alert_headers, check_existing, id_not_found};
use ape_core::rest::{AlertAction, RestError};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<CourseId>,
    Json(body): Json<CourseBody>,
) -> Result<impl IntoResponse, RestError> {
    log::debug!("REST request to update course {}: {:?}", id, body);
    check_existing::<Course>(id, body.id)?;
    let course = body.into_course()?;
    if !driver.clone().course_exists(id).await? {
        return Err(id_not_found::<Course>());
    }

    let course = driver.clone().update_course(course).await?;
    let headers = alert_headers::<Course>(&driver, AlertAction::Updated, id)?;
    Ok((headers, Json(course)))
}
