//! Bubbles library exports for testing

pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

pub use crate::core::clearance::ClearanceSpec;
pub use crate::core::gesture::{
    GestureConfig, GestureListener, SwipeGestureEngine, SwipeKind, SwipeSnapshot, SwipeTarget,
};
pub use crate::core::grouping::{GroupPosition, resolve_avatar_visibility, resolve_group_positions};
pub use crate::core::message::{Attachment, AttachmentKind, Message, Service};
pub use crate::core::segment::{Segment, needs_segmentation, parse};
