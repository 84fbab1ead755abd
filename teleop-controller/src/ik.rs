use crate::joints::JointVector;
use nalgebra as na;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the solver explores the redundant joint
///
/// Both modes return every redundancy branch found, not a single solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Discretization {
    #[default]
    AllDiscretized,
    AllRandomSampled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveOptions {
    pub discretization: Discretization,
}

/// Inverse kinematics for one arm
///
/// Returns zero or more joint configurations reaching `target`.
/// Implementations may keep mutable kinematic state, which is why `solve`
/// takes `&mut self`.
pub trait IkSolver: Send {
    fn solve(
        &mut self,
        target: &na::Isometry3<f64>,
        seed: &JointVector,
        options: &SolveOptions,
    ) -> Vec<JointVector>;
}

impl<S: IkSolver + ?Sized> IkSolver for Box<S> {
    fn solve(
        &mut self,
        target: &na::Isometry3<f64>,
        seed: &JointVector,
        options: &SolveOptions,
    ) -> Vec<JointVector> {
        (**self).solve(target, seed, options)
    }
}

/// One solver used by several arms
///
/// The lock is held only for the duration of a single solve.
pub struct SharedSolver<S> {
    solver: Arc<Mutex<S>>,
}

impl<S> SharedSolver<S> {
    pub fn new(solver: S) -> SharedSolver<S> {
        SharedSolver {
            solver: Arc::new(Mutex::new(solver)),
        }
    }
}

impl<S> Clone for SharedSolver<S> {
    fn clone(&self) -> Self {
        SharedSolver {
            solver: Arc::clone(&self.solver),
        }
    }
}

impl<S: IkSolver> IkSolver for SharedSolver<S> {
    fn solve(
        &mut self,
        target: &na::Isometry3<f64>,
        seed: &JointVector,
        options: &SolveOptions,
    ) -> Vec<JointVector> {
        self.solver.lock().solve(target, seed, options)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, Copy)]
    pub(crate) struct SolveCall {
        pub(crate) target: na::Isometry3<f64>,
        pub(crate) seed: JointVector,
        pub(crate) options: SolveOptions,
    }

    pub(crate) type SolveCalls = Arc<Mutex<Vec<SolveCall>>>;

    /// Answers solves from a script, records what it was asked
    pub(crate) struct ScriptedSolver {
        answers: VecDeque<Vec<JointVector>>,
        repeat: Option<Vec<JointVector>>,
        pub(crate) calls: SolveCalls,
    }

    impl ScriptedSolver {
        /// Same answer on every call
        pub(crate) fn repeating(candidates: Vec<JointVector>) -> ScriptedSolver {
            ScriptedSolver {
                answers: VecDeque::new(),
                repeat: Some(candidates),
                calls: Arc::new(Mutex::new(vec![])),
            }
        }

        /// One answer per call, empty once the script runs out
        pub(crate) fn sequence(answers: Vec<Vec<JointVector>>) -> ScriptedSolver {
            ScriptedSolver {
                answers: answers.into(),
                repeat: None,
                calls: Arc::new(Mutex::new(vec![])),
            }
        }
    }

    impl IkSolver for ScriptedSolver {
        fn solve(
            &mut self,
            target: &na::Isometry3<f64>,
            seed: &JointVector,
            options: &SolveOptions,
        ) -> Vec<JointVector> {
            self.calls.lock().push(SolveCall {
                target: *target,
                seed: *seed,
                options: *options,
            });
            match &self.repeat {
                Some(candidates) => candidates.clone(),
                None => self.answers.pop_front().unwrap_or_default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedSolver;
    use super::*;

    #[test]
    fn shared_solver_serves_every_clone() {
        let scripted = ScriptedSolver::sequence(vec![
            vec![JointVector::zeros()],
            vec![JointVector::repeat(1.0), JointVector::repeat(2.0)],
        ]);
        let calls = Arc::clone(&scripted.calls);
        let mut left = SharedSolver::new(scripted);
        let mut right = left.clone();
        let target = na::Isometry3::identity();
        let seed = JointVector::zeros();
        let options = SolveOptions::default();
        assert_eq!(left.solve(&target, &seed, &options).len(), 1);
        assert_eq!(right.solve(&target, &seed, &options).len(), 2);
        assert!(left.solve(&target, &seed, &options).is_empty());
        assert_eq!(calls.lock().len(), 3);
    }

    #[test]
    fn boxed_solver_forwards() {
        let mut solver: Box<dyn IkSolver> =
            Box::new(ScriptedSolver::repeating(vec![JointVector::repeat(0.5)]));
        let answer = solver.solve(
            &na::Isometry3::identity(),
            &JointVector::zeros(),
            &SolveOptions::default(),
        );
        assert_eq!(answer, vec![JointVector::repeat(0.5)]);
    }

    #[test]
    fn shared_solver_passes_options_through() {
        let scripted = ScriptedSolver::repeating(vec![]);
        let calls = Arc::clone(&scripted.calls);
        let mut shared = SharedSolver::new(scripted);
        let options = SolveOptions {
            discretization: Discretization::AllRandomSampled,
        };
        let seed = JointVector::repeat(0.2);
        shared.solve(&na::Isometry3::identity(), &seed, &options);
        let call = calls.lock()[0];
        assert_eq!(call.options, options);
        assert_eq!(call.seed, seed);
    }

    #[test]
    fn discretization_names() {
        let mode: Discretization = serde_json::from_str("\"all_random_sampled\"").unwrap();
        assert_eq!(mode, Discretization::AllRandomSampled);
        assert_eq!(Discretization::default(), Discretization::AllDiscretized);
    }
}
