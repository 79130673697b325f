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


//! Test utilities for the REST API.

use crate::db::{self, Fetch};
use crate::driver::ServiceOptions;
use crate::driver::testutils::TestContext as DriverContext;
use crate::model::*;
use crate::rest::app;
use axum::Router;

/// State of a running test.
pub(crate) struct TestContext {
    /// The driver-level context that owns the database.
    context: DriverContext,

    /// The router for the application under test.
    app: Router,
}

impl TestContext {
    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Stores a course with the given `title` directly in the database.
    pub(crate) async fn put_course(&self, title: &str) -> Course {
        self.context.put_course(title).await
    }

    /// Stores an exercise for `course` directly in the database.
    pub(crate) async fn put_exercise(&self, course: CourseId, title: &str, mark: i32) -> Exercise {
        self.context.put_exercise(course, title, mark).await
    }

    /// Stores a correction for `exercise` directly in the database.
    pub(crate) async fn put_correction(&self, exercise: ExerciseId, content: &str) -> Correction {
        self.context.put_correction(exercise, content).await
    }

    /// Gets the course identified by `id` directly from the database.
    pub(crate) async fn get_course(&self, id: CourseId) -> Course {
        db::get_course(&mut self.context.ex().await, id).await.unwrap()
    }

    /// Gets the exercise identified by `id` directly from the database.
    pub(crate) async fn get_exercise(&self, id: ExerciseId) -> Exercise {
        db::get_exercise(&mut self.context.ex().await, id, Fetch::Lazy).await.unwrap()
    }

    /// Gets the correction identified by `id` directly from the database.
    pub(crate) async fn get_correction(&self, id: CorrectionId) -> Correction {
        db::get_correction(&mut self.context.ex().await, id, Fetch::Lazy).await.unwrap()
    }

    /// Checks if the course identified by `id` exists in the database.
    pub(crate) async fn has_course(&self, id: CourseId) -> bool {
        db::course_exists(&mut self.context.ex().await, id).await.unwrap()
    }

    /// Checks if the exercise identified by `id` exists in the database.
    pub(crate) async fn has_exercise(&self, id: ExerciseId) -> bool {
        db::exercise_exists(&mut self.context.ex().await, id).await.unwrap()
    }

    /// Checks if the correction identified by `id` exists in the database.
    pub(crate) async fn has_correction(&self, id: CorrectionId) -> bool {
        db::correction_exists(&mut self.context.ex().await, id).await.unwrap()
    }

    /// Returns the number of courses, exercises and corrections in the database.
    pub(crate) async fn counts(&self) -> (u64, u64, u64) {
        let mut ex = self.context.ex().await;
        (
            db::count_courses(&mut ex).await.unwrap(),
            db::count_exercises(&mut ex).await.unwrap(),
            db::count_corrections(&mut ex).await.unwrap(),
        )
    }
}

/// Builder pattern for the test context.
#[must_use]
pub(crate) struct TestContextBuilder {
    /// Options to configure the driver with.
    opts: ServiceOptions,
}

impl TestContextBuilder {
    /// Initializes a new builder with the default test settings.
    pub(crate) fn new() -> Self {
        Self { opts: ServiceOptions::default() }
    }

    /// Sets the name of the application used in the alert headers.
    pub(crate) fn with_application_name(mut self, name: &str) -> Self {
        self.opts.application_name = name.to_owned();
        self
    }

    /// Sets the default and maximum page sizes of the listings.
    pub(crate) fn with_page_sizes(mut self, default_size: u32, max_size: u32) -> Self {
        self.opts.default_page_size = default_size;
        self.opts.max_page_size = max_size;
        self
    }

    /// Initializes the REST app using the configured settings.
    pub(crate) async fn build(self) -> TestContext {
        let context = DriverContext::setup_with(self.opts).await;
        let app = app(context.driver());
        TestContext { context, app }
    }
}
