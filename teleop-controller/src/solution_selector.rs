use crate::joints::{joint_distance, JointVector};

/// The candidate picked out of a solver answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Position in the solver's answer
    pub index: usize,
    pub joints: JointVector,
    /// Joint space distance to the reference configuration
    pub distance: f64,
}

/// Pick the candidate nearest to `reference` in joint space
///
/// Ties go to the earliest candidate. Candidates whose distance is not
/// finite are skipped. Returns `None` when nothing is left.
pub fn select_nearest(candidates: &[JointVector], reference: &JointVector) -> Option<Selection> {
    let mut best: Option<Selection> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let distance = joint_distance(candidate, reference);
        if !distance.is_finite() {
            continue;
        }
        let closer = match &best {
            Some(current) => distance < current.distance,
            None => true,
        };
        if closer {
            best = Some(Selection {
                index,
                joints: *candidate,
                distance,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn picks_nearest_to_seed() {
        let candidates = [JointVector::zeros(), JointVector::repeat(1.0)];
        let seed = JointVector::repeat(0.1);
        let selection = select_nearest(&candidates, &seed).unwrap();
        assert_eq!(selection.index, 0);
        assert_relative_eq!(selection.joints, JointVector::zeros());
        assert_relative_eq!(selection.distance, 0.2645751311, epsilon = 1e-9);
        assert_relative_eq!(
            crate::joints::joint_distance(&candidates[1], &seed),
            2.3811761799,
            epsilon = 1e-9
        );
    }

    #[test]
    fn order_does_not_matter_for_distinct_distances() {
        let candidates = [
            JointVector::repeat(1.0),
            JointVector::repeat(-0.5),
            JointVector::zeros(),
        ];
        let seed = JointVector::repeat(0.1);
        let selection = select_nearest(&candidates, &seed).unwrap();
        assert_eq!(selection.index, 2);
    }

    #[test]
    fn ties_keep_first_candidate() {
        let candidates = [
            JointVector::repeat(0.2),
            JointVector::repeat(-0.2),
            JointVector::repeat(0.2),
        ];
        let selection = select_nearest(&candidates, &JointVector::zeros()).unwrap();
        assert_eq!(selection.index, 0);
    }

    #[test]
    fn empty_answer_selects_nothing() {
        assert!(select_nearest(&[], &JointVector::zeros()).is_none());
    }

    #[test]
    fn nan_candidates_are_skipped() {
        let candidates = [JointVector::repeat(f64::NAN), JointVector::repeat(3.0)];
        let selection = select_nearest(&candidates, &JointVector::zeros()).unwrap();
        assert_eq!(selection.index, 1);
        let only_nan = &candidates[..1];
        assert!(select_nearest(only_nan, &JointVector::zeros()).is_none());
    }
}
