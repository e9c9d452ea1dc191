use crate::animator::AnimatorOptions;
use crate::spring::SpringParams;

use super::autoscroll::AutoScrollOptions;

/// Options for [`super::DragBoard`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DragBoardOptions {
    /// Spring that carries a released card or column back into its slot.
    pub settle_spring: SpringParams,

    /// How many containers the hit test may descend into (board → column → ...).
    pub hit_test_max_depth: usize,

    /// Edge autoscroll while dragging.
    pub autoscroll: AutoScrollOptions,

    /// Durations and policies for the per-list animators the host creates.
    ///
    /// The board itself doesn't animate lists; read this when building each list's
    /// [`crate::ItemAnimator`].
    pub animator: AnimatorOptions,

    /// If true, keep a bounded in-memory log of drag events ([`crate::DebugLog`]) instead of
    /// forwarding them to the `log` facade.
    pub debug_event_log: bool,

    /// Capacity of the in-memory event log (clamped to `1..=10_000`).
    pub debug_event_log_capacity: usize,
}

impl Default for DragBoardOptions {
    fn default() -> Self {
        Self {
            settle_spring: SpringParams::default(),
            hit_test_max_depth: 8,
            autoscroll: AutoScrollOptions::default(),
            animator: AnimatorOptions::default(),
            debug_event_log: false,
            debug_event_log_capacity: 200,
        }
    }
}

#[cfg(feature = "persistence")]
fn pretty_ron_config() -> ron::ser::PrettyConfig {
    ron::ser::PrettyConfig::new()
        .depth_limit(8)
        .separate_tuple_members(true)
}

#[cfg(feature = "persistence")]
impl DragBoardOptions {
    /// Missing fields take their default value.
    pub fn from_ron_str(text: &str) -> Result<Self, crate::OptionsError> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron_string(&self) -> Result<String, crate::OptionsError> {
        Ok(ron::ser::to_string_pretty(self, pretty_ron_config())?)
    }
}
