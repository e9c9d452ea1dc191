use crate::scene::ElementId;

/// Precondition violations raised by [`crate::DragController`].
///
/// These are programmer errors: the caller asked for a drag that can't exist. Nothing is
/// mutated when one of these is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragError {
    /// The element handed to a shadow drag isn't inside the drag surface's parent.
    InvalidHierarchy {
        element: ElementId,
        ancestor: Option<ElementId>,
    },

    /// A drag was requested while another gesture is still being dragged.
    DoubleGrab { element: ElementId },

    /// The scene doesn't know this element (or it has no layout yet).
    UnknownElement(ElementId),
}

impl std::fmt::Display for DragError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHierarchy { element, ancestor } => write!(
                f,
                "element {element:?} is not a descendant of the drag surface parent {ancestor:?}"
            ),
            Self::DoubleGrab { element } => {
                write!(f, "drag already in progress on {element:?}")
            }
            Self::UnknownElement(element) => write!(f, "unknown element {element:?}"),
        }
    }
}

impl std::error::Error for DragError {}

/// A move request carried the NONE sentinel in one of its positions.
///
/// Never surfaced to the data owner: the move protocol swallows it and rejects the move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidPosition {
    pub field: &'static str,
}

impl std::fmt::Display for InvalidPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no position for `{}`", self.field)
    }
}

impl std::error::Error for InvalidPosition {}

#[cfg(feature = "persistence")]
#[derive(Debug)]
pub enum OptionsError {
    RonSerialize(ron::Error),
    RonDeserialize(ron::error::SpannedError),
}

#[cfg(feature = "persistence")]
impl std::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RonSerialize(err) => write!(f, "ron serialize error: {err}"),
            Self::RonDeserialize(err) => write!(f, "ron deserialize error: {err}"),
        }
    }
}

#[cfg(feature = "persistence")]
impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RonSerialize(err) => Some(err),
            Self::RonDeserialize(err) => Some(err),
        }
    }
}

#[cfg(feature = "persistence")]
impl From<ron::Error> for OptionsError {
    fn from(err: ron::Error) -> Self {
        Self::RonSerialize(err)
    }
}

#[cfg(feature = "persistence")]
impl From<ron::error::SpannedError> for OptionsError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonDeserialize(err)
    }
}
