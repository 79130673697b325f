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


//! In-memory arena that keeps the associations between entities consistent.
//!
//! Entities inserted into an `EntityGraph` are addressed by keys, and every association is stored
//! on both of its sides.  All mutators update both sides at once so that a course and its
//! exercises, or an exercise and its correction, never disagree.
//!
//! The keys are authoritative: the references held by the entities themselves are rewritten to
//! match them on every mutation.  An entity only references targets that have an identity, so
//! associating an exercise with a course that has not been stored yet leaves the exercise's own
//! course reference unset.

use crate::model::{Correction, Course, Exercise, Link};
use std::collections::{BTreeSet, HashMap};

/// Key of a course within an `EntityGraph`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CourseKey(usize);

/// Key of an exercise within an `EntityGraph`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExerciseKey(usize);

/// Key of a correction within an `EntityGraph`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CorrectionKey(usize);

/// A course and the exercises that belong to it.
#[derive(Debug)]
struct CourseNode {
    /// The course itself.
    course: Course,

    /// Exercises that belong to this course.
    exercises: BTreeSet<ExerciseKey>,
}

/// An exercise and its associations.
#[derive(Debug)]
struct ExerciseNode {
    /// The exercise itself.
    exercise: Exercise,

    /// Course the exercise belongs to, if it is in the graph.
    course: Option<CourseKey>,

    /// Correction of the exercise, if any.
    correction: Option<CorrectionKey>,
}

/// A correction and its association.
#[derive(Debug)]
struct CorrectionNode {
    /// The correction itself.
    correction: Correction,

    /// Exercise this correction solves, if it is in the graph.
    exercise: Option<ExerciseKey>,
}

/// Arena of courses, exercises and corrections with bidirectional associations.
///
/// Keys are only meaningful for the graph that returned them: using them with any other graph
/// causes a panic or refers to the wrong entity.
#[derive(Debug, Default)]
pub struct EntityGraph {
    /// All courses in the graph.
    courses: Vec<CourseNode>,

    /// All exercises in the graph.
    exercises: Vec<ExerciseNode>,

    /// All corrections in the graph.
    corrections: Vec<CorrectionNode>,
}

impl EntityGraph {
    /// Builds a graph from stored entities, linking them by the identities they reference.
    ///
    /// References to entities that are not part of the input are kept as they are but have no
    /// counterpart in the graph: an exercise whose course is not in `courses` still names that
    /// course while `course_of` returns `None`, for example.  References to entities in the input
    /// are kept too, including resolved ones.
    pub fn from_persisted(
        courses: Vec<Course>,
        exercises: Vec<Exercise>,
        corrections: Vec<Correction>,
    ) -> Self {
        let mut graph = EntityGraph::default();

        let mut course_keys = HashMap::with_capacity(courses.len());
        for course in courses {
            let id = course.id();
            let key = graph.insert_course(course);
            if let Some(id) = id {
                course_keys.insert(id, key);
            }
        }

        let mut exercise_keys = HashMap::with_capacity(exercises.len());
        for exercise in exercises {
            let id = exercise.id();
            let course = exercise.course_id().and_then(|id| course_keys.get(&id).copied());
            let key = graph.push_exercise(exercise);
            if let Some(course) = course {
                graph.set_course(key, Some(course));
            }
            if let Some(id) = id {
                exercise_keys.insert(id, key);
            }
        }

        for correction in corrections {
            let exercise =
                correction.exercise_id().and_then(|id| exercise_keys.get(&id).copied());
            let key = graph.push_correction(correction);
            if let Some(exercise) = exercise {
                graph.set_correction(exercise, Some(key));
            }
        }

        graph
    }

    /// Adds a `course` to the graph without any exercises.
    pub fn insert_course(&mut self, course: Course) -> CourseKey {
        self.courses.push(CourseNode { course, exercises: BTreeSet::new() });
        CourseKey(self.courses.len() - 1)
    }

    /// Adds an `exercise` to the graph without any associations.
    ///
    /// The course and correction references of the exercise are cleared: use `set_course`,
    /// `add_exercise` or `set_correction` to associate the exercise within the graph.
    pub fn insert_exercise(&mut self, mut exercise: Exercise) -> ExerciseKey {
        exercise.set_course(None);
        exercise.set_correction(None);
        self.push_exercise(exercise)
    }

    /// Adds an `exercise` to the graph without any associations, keeping its references.
    fn push_exercise(&mut self, exercise: Exercise) -> ExerciseKey {
        self.exercises.push(ExerciseNode { exercise, course: None, correction: None });
        ExerciseKey(self.exercises.len() - 1)
    }

    /// Adds a `correction` to the graph without any associations.
    ///
    /// The exercise reference of the correction is cleared: use `set_correction` to associate the
    /// correction within the graph.
    pub fn insert_correction(&mut self, mut correction: Correction) -> CorrectionKey {
        correction.set_exercise(None);
        self.push_correction(correction)
    }

    /// Adds a `correction` to the graph without any associations, keeping its reference.
    fn push_correction(&mut self, correction: Correction) -> CorrectionKey {
        self.corrections.push(CorrectionNode { correction, exercise: None });
        CorrectionKey(self.corrections.len() - 1)
    }

    /// Returns the course identified by `key`.
    pub fn course(&self, key: CourseKey) -> &Course {
        &self.courses[key.0].course
    }

    /// Returns the exercise identified by `key`.
    pub fn exercise(&self, key: ExerciseKey) -> &Exercise {
        &self.exercises[key.0].exercise
    }

    /// Returns the correction identified by `key`.
    pub fn correction(&self, key: CorrectionKey) -> &Correction {
        &self.corrections[key.0].correction
    }

    /// Returns the keys of all exercises in the graph, in insertion order.
    pub fn exercise_keys(&self) -> impl Iterator<Item = ExerciseKey> + '_ {
        (0..self.exercises.len()).map(ExerciseKey)
    }

    /// Returns the keys of the exercises that belong to `course`.
    pub fn exercises_of(&self, course: CourseKey) -> impl Iterator<Item = ExerciseKey> + '_ {
        self.courses[course.0].exercises.iter().copied()
    }

    /// Returns the course that `exercise` belongs to, if any.
    pub fn course_of(&self, exercise: ExerciseKey) -> Option<CourseKey> {
        self.exercises[exercise.0].course
    }

    /// Returns the correction of `exercise`, if any.
    pub fn correction_of(&self, exercise: ExerciseKey) -> Option<CorrectionKey> {
        self.exercises[exercise.0].correction
    }

    /// Returns the exercise that `correction` solves, if any.
    pub fn exercise_of(&self, correction: CorrectionKey) -> Option<ExerciseKey> {
        self.corrections[correction.0].exercise
    }

    /// Moves `exercise` to `course`, detaching it from its previous course.  A `None` course
    /// leaves the exercise without a course.
    pub fn set_course(&mut self, exercise: ExerciseKey, course: Option<CourseKey>) {
        if let Some(old) = self.exercises[exercise.0].course {
            self.courses[old.0].exercises.remove(&exercise);
        }

        match course {
            None => self.detach_from_course(exercise),
            Some(course) => {
                self.courses[course.0].exercises.insert(exercise);
                let id = self.courses[course.0].course.id();
                let node = &mut self.exercises[exercise.0];
                node.course = Some(course);
                if id.is_none() || node.exercise.course_id() != id {
                    node.exercise.set_course(id.map(Link::new));
                }
            }
        }
    }

    /// Clears both the key and the entity reference from `exercise` to its course.
    ///
    /// The caller is responsible for removing `exercise` from the course's side.
    fn detach_from_course(&mut self, exercise: ExerciseKey) {
        let node = &mut self.exercises[exercise.0];
        node.course = None;
        node.exercise.set_course(None);
    }

    /// Clears both the key and the entity reference from `correction` to its exercise.
    ///
    /// The caller is responsible for removing `correction` from the exercise's side.
    fn detach_from_exercise(&mut self, correction: CorrectionKey) {
        let node = &mut self.corrections[correction.0];
        node.exercise = None;
        node.correction.set_exercise(None);
    }

    /// Replaces the whole set of exercises of `course` with `exercises`.
    ///
    /// Exercises that were in the old set and are not in the new one end up without a course, and
    /// exercises in the new set are detached from any course they previously belonged to.
    pub fn set_exercises<I>(&mut self, course: CourseKey, exercises: I)
    where
        I: IntoIterator<Item = ExerciseKey>,
    {
        let old = std::mem::take(&mut self.courses[course.0].exercises);
        for exercise in old {
            self.detach_from_course(exercise);
        }

        for exercise in exercises {
            self.set_course(exercise, Some(course));
        }
    }

    /// Adds `exercise` to the set of exercises of `course`.
    pub fn add_exercise(&mut self, course: CourseKey, exercise: ExerciseKey) {
        self.set_course(exercise, Some(course));
    }

    /// Removes `exercise` from the set of exercises of `course`, if it was there.
    pub fn remove_exercise(&mut self, course: CourseKey, exercise: ExerciseKey) {
        if self.exercises[exercise.0].course == Some(course) {
            self.set_course(exercise, None);
        }
    }

    /// Makes `correction` the correction of `exercise`.
    ///
    /// Any previous correction of the exercise loses its exercise, and the new correction is
    /// detached from any other exercise it previously solved.  A `None` correction leaves the
    /// exercise without a correction.
    pub fn set_correction(&mut self, exercise: ExerciseKey, correction: Option<CorrectionKey>) {
        if let Some(old) = self.exercises[exercise.0].correction.take() {
            self.detach_from_exercise(old);
        }

        let mut correction_id = None;
        if let Some(correction) = correction {
            if let Some(previous) = self.corrections[correction.0].exercise {
                let node = &mut self.exercises[previous.0];
                node.correction = None;
                node.exercise.set_correction(None);
            }

            let id = self.exercises[exercise.0].exercise.id();
            let node = &mut self.corrections[correction.0];
            node.exercise = Some(exercise);
            if id.is_none() || node.correction.exercise_id() != id {
                node.correction.set_exercise(id.map(Link::new));
            }
            correction_id = node.correction.id();
        }

        let node = &mut self.exercises[exercise.0];
        node.correction = correction;
        node.exercise.set_correction(correction_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrectionId, CourseId, ExerciseId, Mark, Title};

    fn course(id: i64) -> Course {
        Course::new(Title::new(format!("Course {}", id)).unwrap(), "".to_owned())
            .with_id(CourseId::from(id))
    }

    fn exercise(id: i64, course: i64) -> Exercise {
        Exercise::new(
            Title::new(format!("Exercise {}", id)).unwrap(),
            "".to_owned(),
            Mark::new(1).unwrap(),
            Link::new(CourseId::from(course)),
        )
        .with_id(ExerciseId::from(id))
    }

    fn correction(id: i64, exercise: i64) -> Correction {
        Correction::new("".to_owned(), Link::new(ExerciseId::from(exercise)))
            .with_id(CorrectionId::from(id))
    }

    #[test]
    fn test_set_exercises_replaces_whole_set() {
        let mut graph = EntityGraph::default();
        let c = graph.insert_course(course(1));
        let e1 = graph.insert_exercise(exercise(1, 1));
        let e2 = graph.insert_exercise(exercise(2, 1));
        let e3 = graph.insert_exercise(exercise(3, 1));

        graph.set_exercises(c, [e1, e2]);
        assert_eq!(vec![e1, e2], graph.exercises_of(c).collect::<Vec<_>>());

        graph.set_exercises(c, [e2, e3]);
        assert_eq!(None, graph.course_of(e1));
        assert_eq!(Some(c), graph.course_of(e2));
        assert_eq!(Some(c), graph.course_of(e3));
        assert_eq!(vec![e2, e3], graph.exercises_of(c).collect::<Vec<_>>());
    }

    #[test]
    fn test_set_exercises_clears_course_of_dropped_exercises() {
        let mut graph = EntityGraph::default();
        let c = graph.insert_course(course(1));
        let e1 = graph.insert_exercise(exercise(1, 1));
        let e2 = graph.insert_exercise(exercise(2, 1));

        graph.set_exercises(c, [e1]);
        assert_eq!(Some(CourseId::from(1)), graph.exercise(e1).course_id());

        graph.set_exercises(c, [e2]);
        assert_eq!(None, graph.course_of(e1));
        assert!(graph.exercise(e1).course().is_none());
        assert_eq!(Some(CourseId::from(1)), graph.exercise(e2).course_id());
    }

    #[test]
    fn test_insert_clears_references() {
        let mut graph = EntityGraph::default();
        let e =
            graph.insert_exercise(exercise(1, 1).with_correction(Some(CorrectionId::from(4))));
        let c = graph.insert_correction(correction(4, 1));
        assert!(graph.exercise(e).course().is_none());
        assert!(graph.exercise(e).correction().is_none());
        assert!(graph.correction(c).exercise().is_none());
    }

    #[test]
    fn test_set_course_to_unsaved_course() {
        let mut graph = EntityGraph::default();
        let saved = graph.insert_course(course(1));
        let unsaved =
            graph.insert_course(Course::new(Title::new("Draft").unwrap(), "".to_owned()));
        let e = graph.insert_exercise(exercise(1, 1));

        graph.set_course(e, Some(saved));
        assert_eq!(Some(CourseId::from(1)), graph.exercise(e).course_id());

        graph.set_course(e, Some(unsaved));
        assert_eq!(Some(unsaved), graph.course_of(e));
        assert!(graph.exercise(e).course().is_none());
        assert_eq!(0, graph.exercises_of(saved).count());
    }

    #[test]
    fn test_set_exercises_steals_from_other_course() {
        let mut graph = EntityGraph::default();
        let c1 = graph.insert_course(course(1));
        let c2 = graph.insert_course(course(2));
        let e = graph.insert_exercise(exercise(1, 1));

        graph.add_exercise(c1, e);
        graph.set_exercises(c2, [e]);
        assert_eq!(Some(c2), graph.course_of(e));
        assert_eq!(0, graph.exercises_of(c1).count());
        assert_eq!(Some(CourseId::from(2)), graph.exercise(e).course_id());
    }

    #[test]
    fn test_add_and_remove_exercise() {
        let mut graph = EntityGraph::default();
        let c1 = graph.insert_course(course(1));
        let c2 = graph.insert_course(course(2));
        let e = graph.insert_exercise(exercise(1, 1));

        graph.add_exercise(c1, e);
        assert_eq!(Some(c1), graph.course_of(e));

        graph.remove_exercise(c2, e);
        assert_eq!(Some(c1), graph.course_of(e));

        graph.remove_exercise(c1, e);
        assert_eq!(None, graph.course_of(e));
        assert_eq!(0, graph.exercises_of(c1).count());
    }

    #[test]
    fn test_set_correction_transfers() {
        let mut graph = EntityGraph::default();
        let e = graph.insert_exercise(exercise(1, 1));
        let old = graph.insert_correction(correction(1, 1));
        let new = graph.insert_correction(correction(2, 5));

        graph.set_correction(e, Some(old));
        assert_eq!(Some(e), graph.exercise_of(old));
        assert_eq!(Some(CorrectionId::from(1)), graph.exercise(e).correction());

        graph.set_correction(e, Some(new));
        assert_eq!(None, graph.exercise_of(old));
        assert_eq!(Some(e), graph.exercise_of(new));
        assert_eq!(Some(new), graph.correction_of(e));
        assert_eq!(Some(CorrectionId::from(2)), graph.exercise(e).correction());
        assert_eq!(Some(ExerciseId::from(1)), graph.correction(new).exercise_id());

        let referencing = [old, new].into_iter().filter(|c| graph.exercise_of(*c) == Some(e));
        assert_eq!(1, referencing.count());
    }

    #[test]
    fn test_set_correction_unsets_exercise_of_replaced_correction() {
        let mut graph = EntityGraph::default();
        let e = graph.insert_exercise(exercise(2, 1));
        let old = graph.insert_correction(correction(1, 2));
        let new = graph.insert_correction(correction(2, 2));

        graph.set_correction(e, Some(old));
        assert_eq!(Some(ExerciseId::from(2)), graph.correction(old).exercise_id());

        graph.set_correction(e, Some(new));
        assert_eq!(None, graph.correction(old).exercise_id());
        assert_eq!(Some(ExerciseId::from(2)), graph.correction(new).exercise_id());

        let referencing = [old, new]
            .into_iter()
            .filter(|c| graph.correction(*c).exercise_id() == Some(ExerciseId::from(2)));
        assert_eq!(1, referencing.count());
    }

    #[test]
    fn test_set_correction_moves_between_exercises() {
        let mut graph = EntityGraph::default();
        let e1 = graph.insert_exercise(exercise(1, 1));
        let e2 = graph.insert_exercise(exercise(2, 1));
        let c = graph.insert_correction(correction(1, 1));

        graph.set_correction(e1, Some(c));
        graph.set_correction(e2, Some(c));
        assert_eq!(None, graph.correction_of(e1));
        assert_eq!(None, graph.exercise(e1).correction());
        assert_eq!(Some(c), graph.correction_of(e2));
        assert_eq!(Some(e2), graph.exercise_of(c));
    }

    #[test]
    fn test_set_correction_none() {
        let mut graph = EntityGraph::default();
        let e = graph.insert_exercise(exercise(1, 1));
        let c = graph.insert_correction(correction(1, 1));

        graph.set_correction(e, Some(c));
        graph.set_correction(e, None);
        assert_eq!(None, graph.correction_of(e));
        assert_eq!(None, graph.exercise_of(c));
        assert_eq!(None, graph.exercise(e).correction());
        assert!(graph.correction(c).exercise().is_none());
    }

    #[test]
    fn test_from_persisted_links_by_id() {
        let graph = EntityGraph::from_persisted(
            vec![course(1), course(2)],
            vec![exercise(10, 1), exercise(11, 2), exercise(12, 1), exercise(13, 99)],
            vec![correction(100, 11), correction(101, 77)],
        );

        let keys = graph.exercise_keys().collect::<Vec<_>>();
        assert_eq!(4, keys.len());
        assert_eq!(Some(CourseKey(0)), graph.course_of(keys[0]));
        assert_eq!(Some(CourseKey(1)), graph.course_of(keys[1]));
        assert_eq!(Some(CourseKey(0)), graph.course_of(keys[2]));
        assert_eq!(None, graph.course_of(keys[3]));
        assert_eq!(vec![keys[0], keys[2]], graph.exercises_of(CourseKey(0)).collect::<Vec<_>>());

        assert_eq!(Some(CorrectionKey(0)), graph.correction_of(keys[1]));
        assert_eq!(None, graph.exercise_of(CorrectionKey(1)));
        assert_eq!(Some(CourseId::from(99)), graph.exercise(keys[3]).course_id());
        assert_eq!(Some(ExerciseId::from(77)), graph.correction(CorrectionKey(1)).exercise_id());

        let ungraded = graph
            .exercise_keys()
            .filter(|k| graph.correction_of(*k).is_none())
            .map(|k| graph.exercise(k).id().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            vec![ExerciseId::from(10), ExerciseId::from(12), ExerciseId::from(13)],
            ungraded
        );
    }

    #[test]
    fn test_from_persisted_keeps_resolved_references() {
        let mut resolved = exercise(10, 1);
        resolved.set_course(Some(Link::resolved(course(1)).unwrap()));
        let graph = EntityGraph::from_persisted(vec![course(1)], vec![resolved], vec![]);

        let key = graph.exercise_keys().next().unwrap();
        assert_eq!(Some(CourseKey(0)), graph.course_of(key));
        assert!(graph.exercise(key).course().unwrap().is_resolved());
    }
}
