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


//! Test utilities for the business layer.

use crate::db;
use crate::driver::{Driver, ServiceOptions};
use crate::model::*;
use ape_core::db::{Db, Executor};
use std::sync::Arc;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver with default options and an in-memory database.
    pub(crate) async fn setup() -> Self {
        Self::setup_with(ServiceOptions::default()).await
    }

    /// Initializes the driver with `opts` and an in-memory database.
    pub(crate) async fn setup_with(opts: ServiceOptions) -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(ape_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone(), opts);
        Self { db, driver }
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Stores a course with the given `title` directly in the database.
    pub(crate) async fn put_course(&self, title: &str) -> Course {
        let course = Course::new(Title::new(title).unwrap(), format!("About {}", title));
        let id = db::save_course(&mut self.ex().await, &course).await.unwrap();
        course.with_id(id)
    }

    /// Stores an exercise with the given `title` and `mark` for `course` directly in the
    /// database.
    pub(crate) async fn put_exercise(&self, course: CourseId, title: &str, mark: i32) -> Exercise {
        let exercise = Exercise::new(
            Title::new(title).unwrap(),
            format!("Solve {}", title),
            Mark::new(mark).unwrap(),
            Link::new(course),
        );
        let id = db::save_exercise(&mut self.ex().await, &exercise).await.unwrap();
        exercise.with_id(id)
    }

    /// Stores a correction with `content` for `exercise` directly in the database.
    pub(crate) async fn put_correction(&self, exercise: ExerciseId, content: &str) -> Correction {
        let correction = Correction::new(content.to_owned(), Link::new(exercise));
        let id = db::save_correction(&mut self.ex().await, &correction).await.unwrap();
        correction.with_id(id)
    }
}
