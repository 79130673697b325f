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


//! REST interface for the courses, exercises and corrections.

use crate::driver::Driver;
use crate::model::Entity;
use ape_core::rest::{AlertAction, RestError, RestResult, entity_alert_headers};
use axum::Router;
use axum::http::HeaderMap;
use tower_http::cors::CorsLayer;

mod bodies;
mod correction_delete;
mod correction_get;
mod correction_patch;
mod correction_post;
mod correction_put;
mod corrections_get;
mod course_delete;
mod course_get;
mod course_patch;
mod course_post;
mod course_put;
mod courses_get;
mod exercise_delete;
mod exercise_get;
mod exercise_patch;
mod exercise_post;
mod exercise_put;
mod exercises_get;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/api/courses", get(courses_get::handler).post(course_post::handler))
        .route(
            "/api/courses/:id",
            get(course_get::handler)
                .put(course_put::handler)
                .patch(course_patch::handler)
                .delete(course_delete::handler),
        )
        .route("/api/exercises", get(exercises_get::handler).post(exercise_post::handler))
        .route(
            "/api/exercises/:id",
            get(exercise_get::handler)
                .put(exercise_put::handler)
                .patch(exercise_patch::handler)
                .delete(exercise_delete::handler),
        )
        .route("/api/corrections", get(corrections_get::handler).post(correction_post::handler))
        .route(
            "/api/corrections/:id",
            get(correction_get::handler)
                .put(correction_put::handler)
                .patch(correction_patch::handler)
                .delete(correction_delete::handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(driver)
}

/// Returns the path under which the entity `E` identified by `id` is served.
fn location<E: Entity>(id: E::Id) -> String {
    format!("/api/{}s/{}", E::NAME, id)
}

/// Computes the headers that tell the client that `action` was applied to the entity `E`
/// identified by `id`.
fn alert_headers<E: Entity>(
    driver: &Driver,
    action: AlertAction,
    id: E::Id,
) -> RestResult<HeaderMap> {
    entity_alert_headers(&driver.opts().application_name, E::NAME, action, id)
}

/// Ensures that the identity `id` of an entity `E` to be created is not set.
fn check_new<E: Entity>(id: Option<E::Id>) -> RestResult<()> {
    match id {
        Some(_) => Err(RestError::bad_request(
            E::NAME,
            "idexists",
            format!("A new {} cannot already have an ID", E::NAME),
        )),
        None => Ok(()),
    }
}

/// Ensures that the identity `id` in the payload of an entity `E` is present and matches the
/// identity `path_id` given in the request path.
fn check_existing<E: Entity>(path_id: E::Id, id: Option<E::Id>) -> RestResult<()> {
    match id {
        None => Err(RestError::bad_request(E::NAME, "idnull", "Invalid id")),
        Some(id) if id != path_id => {
            Err(RestError::bad_request(E::NAME, "idinvalid", "Invalid ID"))
        }
        Some(_) => Ok(()),
    }
}

/// Error for a full update of the entity `E` that does not exist.
fn id_not_found<E: Entity>() -> RestError {
    RestError::bad_request(E::NAME, "idnotfound", "Entity not found")
}

/// Error for a request on the entity `E` identified by `id` that does not exist.
fn not_found<E: Entity>(id: E::Id) -> RestError {
    RestError::NotFound(format!("Cannot find {} {}", E::NAME, id))
}

/// Extracts the identity of an entity `E` that has just been stored.
fn stored_id<E: Entity>(entity: &E) -> RestResult<E::Id> {
    entity
        .id()
        .ok_or_else(|| RestError::InternalError(format!("Stored {} has no id", E::NAME)))
}
