use std::time::Duration;

/// Options for [`super::ItemAnimator`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimatorOptions {
    /// Fade-in of inserted elements. Runs after every other category has finished.
    pub add_duration: Duration,

    /// Fade-out of removed elements. Runs first.
    pub remove_duration: Duration,

    /// Slide of moved elements into their new slot.
    pub move_duration: Duration,

    /// Cross-fade between the old and new element of a changed row.
    pub change_duration: Duration,

    /// When removals and moves land in the same pass and a removed element is still sitting in
    /// the slot a move targets (the list recycled it in place), complete that removal with zero
    /// duration instead of fading it over the incoming element.
    ///
    /// The removal is still bookkept: start and finish callbacks fire as usual.
    pub fake_removals_under_moves: bool,
}

impl Default for AnimatorOptions {
    fn default() -> Self {
        Self {
            add_duration: Duration::from_millis(120),
            remove_duration: Duration::from_millis(120),
            move_duration: Duration::from_millis(250),
            change_duration: Duration::from_millis(250),
            fake_removals_under_moves: true,
        }
    }
}
