use super::gesture_label::GestureLabel;

/// Remembers the last announced label so an unchanged gesture is spoken once.
///
/// A single slot, always overwritten. Cleared whenever the hand leaves the
/// frame so the same gesture is announced again when it comes back.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpokenState {
    last: Option<GestureLabel>,
}

impl SpokenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<GestureLabel> {
        self.last
    }

    /// Records `label` and returns `true` if it differs from the last one,
    /// i.e. if it should be spoken now.
    pub fn observe(&mut self, label: GestureLabel) -> bool {
        if self.last == Some(label) {
            return false;
        }
        self.last = Some(label);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
