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


//! Entities of the course catalog and the relationships between them.

mod correction;
pub use correction::{Correction, CorrectionPatch};
mod course;
pub use course::{Course, CoursePatch};
mod exercise;
pub use exercise::{Exercise, ExercisePatch};
mod graph;
pub use graph::{CorrectionKey, CourseKey, EntityGraph, ExerciseKey};
mod link;
pub use link::{Entity, Link};
mod values;
pub use values::{CorrectionId, CourseId, ExerciseId, Mark, Title};
