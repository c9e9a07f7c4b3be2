//! Rule-based static gesture classification.
//!
//! The rules form a decision table evaluated top to bottom. Several rows can
//! hold for the same pose (a folded hand with the thumb raised satisfies both
//! the thumbs-up and fist rows), so the order below is part of the contract.

use crate::detection::domain::hand_landmarks::HandObservation;

use super::gesture_label::GestureLabel;
use super::hand_pose::HandPose;

/// Classifies one hand. Pure: the result depends only on these 21 points.
pub fn classify(hand: &HandObservation) -> GestureLabel {
    classify_pose(&HandPose::from_observation(hand))
}

/// Applies the decision table to already-derived predicates.
pub fn classify_pose(pose: &HandPose) -> GestureLabel {
    if pose.thumb_up && pose.all_folded() {
        return GestureLabel::ThumbsUp;
    }
    if pose.thumb_down && pose.all_folded() {
        return GestureLabel::ThumbsDown;
    }
    if pose.index_extended
        && pose.middle_extended
        && !pose.ring_extended
        && !pose.pinky_extended
        && !pose.thumb_up
    {
        return GestureLabel::Victory;
    }
    if pose.thumb_up && pose.all_extended() {
        return GestureLabel::OpenPalm;
    }
    if !pose.thumb_up && pose.all_folded() {
        return GestureLabel::Fist;
    }
    GestureLabel::Unknown
}
