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


//! API to partially update a correction.

use crate::driver::Driver;
use crate::model::{Correction, CorrectionId};
use crate::rest::bodies::CorrectionBody;
use crate::rest::{alert_headers, check_existing, not_found};
use ape_core::rest::{AlertAction, RestError};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<CorrectionId>,
    Json(body): Json<CorrectionBody>,
) -> Result<impl IntoResponse, RestError> {
    log::debug!("REST request to partially update correction {}: {:?}", id, body);
    check_existing::<Correction>(id, body.id)?;

    match driver.clone().partial_update_correction(id, body.into_patch()).await? {
        Some(correction) => {
            let headers = alert_headers::<Correction>(&driver, AlertAction::Updated, id)?;
            Ok((headers, Json(correction)))
        }
        None => Err(not_found::<Correction>(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::bodies::ExerciseBody;
    use crate::rest::testutils::*;
    use ape_core::rest::testutils::*;
    use axum::http;

    fn route(id: i64) -> (http::Method, String) {
        (http::Method::PATCH, format!("/api/corrections/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContextBuilder::new().build().await;
        let course = context.put_course("Algebra").await.id().unwrap();
        let exercise = context.put_exercise(course, "Sums", 1).await.id().unwrap();
        let other = context.put_exercise(course, "Products", 1).await.id().unwrap();
        let id = context.put_correction(exercise, "It is 3").await.id().unwrap();

        let request = CorrectionBody {
            id: Some(id),
            content: Some("It is 2".to_owned()),
            exercise: Some(Box::new(ExerciseBody::reference(other))),
        };
        let response = OneShotBuilder::new(context.app(), route(id.as_i64()))
            .send_merge_patch(request)
            .await
            .expect_header("x-ape-alert", "ape.correction.updated")
            .expect_json::<CorrectionBody>()
            .await;
        assert_eq!(Some("It is 2"), response.content.as_deref());
        assert_eq!(Some(exercise), response.exercise.unwrap().id);

        let correction = context.get_correction(id).await;
        assert_eq!("It is 2", correction.content());
        assert_eq!(Some(exercise), correction.exercise_id());
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContextBuilder::new().build().await;

        let request = CorrectionBody { id: Some(CorrectionId::from(7)), ..Default::default() };
        OneShotBuilder::new(context.app(), route(7))
            .send_merge_patch(request)
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Cannot find correction 7")
            .await;
    }

    #[tokio::test]
    async fn test_id_checks() {
        let context = TestContextBuilder::new().build().await;

        OneShotBuilder::new(context.app(), route(7))
            .send_merge_patch(CorrectionBody::default())
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error_key("correction", "idnull")
            .await;

        let request = CorrectionBody { id: Some(CorrectionId::from(8)), ..Default::default() };
        OneShotBuilder::new(context.app(), route(7))
            .send_merge_patch(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error_key("correction", "idinvalid")
            .await;
    }

    test_payload_must_be_json!(TestContextBuilder::new().build().await.into_app(), route(1));
}
