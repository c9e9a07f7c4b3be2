//! Per-digit orientation derived from one hand's landmarks.
//!
//! Each flag is a single strict y comparison: a tip exactly level with its
//! reference joint counts as folded (or, for the thumb, neither up nor down).

use crate::detection::domain::hand_landmarks::{
    HandObservation, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP,
    RING_PIP, RING_TIP, THUMB_MCP, THUMB_TIP,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandPose {
    pub thumb_up: bool,
    pub thumb_down: bool,
    pub index_extended: bool,
    pub middle_extended: bool,
    pub ring_extended: bool,
    pub pinky_extended: bool,
}

impl HandPose {
    pub fn from_observation(hand: &HandObservation) -> Self {
        let above = |tip: usize, joint: usize| hand.get(tip).y < hand.get(joint).y;
        let below = |tip: usize, joint: usize| hand.get(tip).y > hand.get(joint).y;

        Self {
            thumb_up: above(THUMB_TIP, THUMB_MCP),
            thumb_down: below(THUMB_TIP, THUMB_MCP),
            index_extended: above(INDEX_TIP, INDEX_PIP),
            middle_extended: above(MIDDLE_TIP, MIDDLE_PIP),
            ring_extended: above(RING_TIP, RING_PIP),
            pinky_extended: above(PINKY_TIP, PINKY_PIP),
        }
    }

    /// Index, middle, ring, pinky.
    pub fn fingers(&self) -> [bool; 4] {
        [
            self.index_extended,
            self.middle_extended,
            self.ring_extended,
            self.pinky_extended,
        ]
    }

    pub fn all_folded(&self) -> bool {
        self.fingers().iter().all(|&extended| !extended)
    }

    pub fn all_extended(&self) -> bool {
        self.fingers().iter().all(|&extended| extended)
    }

    pub fn extended_count(&self) -> usize {
        self.fingers().iter().filter(|&&extended| extended).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::hand_landmarks::Landmark;
    use crate::shared::constants::LANDMARK_COUNT;
    use rstest::rstest;

    fn hand_with(overrides: &[(usize, f64)]) -> HandObservation {
        let mut pts = [Landmark::new(100.0, 100.0); LANDMARK_COUNT];
        for &(i, y) in overrides {
            pts[i].y = y;
        }
        HandObservation::new(pts)
    }

    #[test]
    fn test_level_hand_has_nothing_raised() {
        let pose = HandPose::from_observation(&hand_with(&[]));
        assert_eq!(pose, HandPose::default());
        assert!(pose.all_folded());
        assert!(!pose.all_extended());
    }

    #[rstest]
    #[case::tip_above(50.0, true, false)]
    #[case::tip_below(150.0, false, true)]
    #[case::tip_level(100.0, false, false)]
    fn test_thumb_orientation(#[case] tip_y: f64, #[case] up: bool, #[case] down: bool) {
        let pose = HandPose::from_observation(&hand_with(&[(THUMB_TIP, tip_y)]));
        assert_eq!(pose.thumb_up, up);
        assert_eq!(pose.thumb_down, down);
    }

    #[rstest]
    #[case::index(INDEX_TIP, 0)]
    #[case::middle(MIDDLE_TIP, 1)]
    #[case::ring(RING_TIP, 2)]
    #[case::pinky(PINKY_TIP, 3)]
    fn test_each_finger_reads_its_own_tip(#[case] tip: usize, #[case] slot: usize) {
        let pose = HandPose::from_observation(&hand_with(&[(tip, 40.0)]));
        let fingers = pose.fingers();
        for (i, extended) in fingers.iter().enumerate() {
            assert_eq!(*extended, i == slot, "finger slot {i}");
        }
        assert_eq!(pose.extended_count(), 1);
    }

    #[test]
    fn test_finger_compared_against_pip_not_mcp() {
        // Tip above the MCP but below the PIP is still folded
        let pose = HandPose::from_observation(&hand_with(&[(INDEX_PIP, 50.0), (INDEX_TIP, 70.0)]));
        assert!(!pose.index_extended);
    }

    #[test]
    fn test_all_extended() {
        let pose = HandPose::from_observation(&hand_with(&[
            (INDEX_TIP, 10.0),
            (MIDDLE_TIP, 10.0),
            (RING_TIP, 10.0),
            (PINKY_TIP, 10.0),
        ]));
        assert!(pose.all_extended());
        assert!(!pose.all_folded());
        assert_eq!(pose.extended_count(), 4);
    }
}
