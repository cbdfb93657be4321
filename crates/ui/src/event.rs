//! Input events delivered to the viewer surface.

use crate::geometry::{ClientRect, Point};
use serde::{Deserialize, Serialize};

/// `buttons` bitmask value for "only the primary button is pressed".
pub const PRIMARY_BUTTON: u32 = 1;

/// Identity of the element a pointer event or click was aimed at.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TargetId(pub u64);

fn default_pointer_id() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_buttons() -> u32 {
    PRIMARY_BUTTON
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    #[serde(default = "default_pointer_id")]
    pub pointer_id: u32,
    /// Position in viewport pixels.
    pub client: Point,
    #[serde(default = "default_true")]
    pub is_primary: bool,
    #[serde(default = "default_buttons")]
    pub buttons: u32,
    #[serde(default)]
    pub target: TargetId,
}

impl PointerEvent {
    /// Primary pointer with the primary button held.
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            pointer_id: default_pointer_id(),
            client: Point::new(x, y),
            is_primary: true,
            buttons: PRIMARY_BUTTON,
            target: TargetId::default(),
        }
    }

    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = target;
        self
    }

    pub fn with_buttons(mut self, buttons: u32) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_pointer_id(mut self, pointer_id: u32, is_primary: bool) -> Self {
        self.pointer_id = pointer_id;
        self.is_primary = is_primary;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    PointerEnter(PointerEvent),
    PointerMove(PointerEvent),
    PointerDown(PointerEvent),
    PointerUp(PointerEvent),
    PointerCancel(PointerEvent),
    PointerLeave(PointerEvent),
    /// Click reaching the document, native or synthetic.
    Click { target: TargetId },
    /// The tracked element moved or changed size.
    Resize(ClientRect),
}
