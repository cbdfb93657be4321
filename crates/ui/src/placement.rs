//! Popup placement collaborator
//!
//! The gesture engine and the probe only describe *where* a popup should go
//! (an anchor region plus a preferred side); a [`PopupPlacer`] turns that into
//! on-screen coordinates and keeps them current until the popup is destroyed.

use crate::geometry::{ClientRect, PercentRect, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Preferred popup side and alignment relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    TopStart,
    TopEnd,
    BottomStart,
    BottomEnd,
    RightStart,
    LeftStart,
}

impl Placement {
    /// Measurement popup side: above when dragging downwards, start-aligned
    /// when dragging rightwards.
    pub fn toward(origin: Point, current: Point) -> Self {
        match (origin.y < current.y, origin.x < current.x) {
            (true, true) => Placement::TopStart,
            (true, false) => Placement::TopEnd,
            (false, true) => Placement::BottomStart,
            (false, false) => Placement::BottomEnd,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::TopStart => "top-start",
            Placement::TopEnd => "top-end",
            Placement::BottomStart => "bottom-start",
            Placement::BottomEnd => "bottom-end",
            Placement::RightStart => "right-start",
            Placement::LeftStart => "left-start",
        }
    }

    fn flip_side(self) -> Self {
        match self {
            Placement::TopStart => Placement::BottomStart,
            Placement::TopEnd => Placement::BottomEnd,
            Placement::BottomStart => Placement::TopStart,
            Placement::BottomEnd => Placement::TopEnd,
            Placement::RightStart => Placement::LeftStart,
            Placement::LeftStart => Placement::RightStart,
        }
    }

    fn flip_alignment(self) -> Self {
        match self {
            Placement::TopStart => Placement::TopEnd,
            Placement::TopEnd => Placement::TopStart,
            Placement::BottomStart => Placement::BottomEnd,
            Placement::BottomEnd => Placement::BottomStart,
            other => other,
        }
    }

    fn is_vertical(self) -> bool {
        !matches!(self, Placement::RightStart | Placement::LeftStart)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PopupId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupOptions {
    pub placement: Placement,
    /// `x` slides along the anchor edge, `y` pushes away from it.
    pub offset: Point,
    /// Flip to the opposite side when the popup would leave the anchor's surface.
    pub flip: bool,
}

impl PopupOptions {
    pub fn new(placement: Placement) -> Self {
        Self { placement, offset: Point::default(), flip: false }
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }
}

/// Popup anchor: a percent-space region of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub surface: ClientRect,
    pub rect: PercentRect,
}

impl Anchor {
    pub fn new(surface: ClientRect, rect: PercentRect) -> Self {
        Self { surface, rect }
    }

    pub fn client_rect(&self) -> ClientRect {
        self.surface.project(self.rect)
    }
}

/// Computes and maintains popup positions.
///
/// Every created popup must be passed to [`PopupPlacer::destroy`] once it is
/// no longer shown.
pub trait PopupPlacer: fmt::Debug {
    fn create(&mut self, anchor: Anchor, options: PopupOptions) -> PopupId;

    fn set_placement(&mut self, id: PopupId, placement: Placement);

    /// Reposition after the anchor moved.
    fn update(&mut self, id: PopupId, anchor: Anchor);

    fn destroy(&mut self, id: PopupId);

    fn popup(&self, id: PopupId) -> Option<&PlacedPopup>;
}

/// A popup maintained by [`SimplePlacer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedPopup {
    #[serde(skip)]
    pub options: PopupOptions,
    #[serde(skip)]
    pub anchor: Anchor,
    /// Top-left corner in client pixels.
    pub position: Point,
    /// Placement actually used after flipping.
    pub placement: Placement,
}

/// Fixed-size popups, positioned next to the anchor rectangle.
#[derive(Debug)]
pub struct SimplePlacer {
    width: f64,
    height: f64,
    next_id: u64,
    popups: HashMap<PopupId, PlacedPopup>,
}

impl SimplePlacer {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, next_id: 0, popups: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }

    fn layout(&self, popup: &mut PlacedPopup) {
        let anchor = popup.anchor.client_rect();
        let boundary = popup.anchor.surface;
        let mut placement = popup.options.placement;
        let mut position = self.position(anchor, placement, popup.options.offset);

        if popup.options.flip {
            if self.overflows_side(position, placement, &boundary) {
                let flipped = placement.flip_side();
                let candidate = self.position(anchor, flipped, popup.options.offset);
                if !self.overflows_side(candidate, flipped, &boundary) {
                    placement = flipped;
                    position = candidate;
                }
            }

            if placement.is_vertical() && self.overflows_alignment(position, &boundary) {
                let flipped = placement.flip_alignment();
                let candidate = self.position(anchor, flipped, popup.options.offset);
                if !self.overflows_alignment(candidate, &boundary) {
                    placement = flipped;
                    position = candidate;
                }
            }
        }

        popup.position = position;
        popup.placement = placement;
    }

    fn position(&self, anchor: ClientRect, placement: Placement, offset: Point) -> Point {
        let (skid, distance) = (offset.x, offset.y);

        match placement {
            Placement::TopStart => Point::new(anchor.x + skid, anchor.y - self.height - distance),
            Placement::TopEnd => {
                Point::new(anchor.right() - self.width - skid, anchor.y - self.height - distance)
            }
            Placement::BottomStart => Point::new(anchor.x + skid, anchor.bottom() + distance),
            Placement::BottomEnd => {
                Point::new(anchor.right() - self.width - skid, anchor.bottom() + distance)
            }
            Placement::RightStart => Point::new(anchor.right() + distance, anchor.y + skid),
            Placement::LeftStart => {
                Point::new(anchor.x - self.width - distance, anchor.y + skid)
            }
        }
    }

    fn overflows_side(&self, position: Point, placement: Placement, boundary: &ClientRect) -> bool {
        match placement {
            Placement::TopStart | Placement::TopEnd => position.y < boundary.y,
            Placement::BottomStart | Placement::BottomEnd => {
                position.y + self.height > boundary.bottom()
            }
            Placement::RightStart => position.x + self.width > boundary.right(),
            Placement::LeftStart => position.x < boundary.x,
        }
    }

    fn overflows_alignment(&self, position: Point, boundary: &ClientRect) -> bool {
        position.x < boundary.x || position.x + self.width > boundary.right()
    }
}

impl PopupPlacer for SimplePlacer {
    fn create(&mut self, anchor: Anchor, options: PopupOptions) -> PopupId {
        self.next_id += 1;
        let id = PopupId(self.next_id);

        let mut popup =
            PlacedPopup { options, anchor, position: Point::default(), placement: options.placement };
        self.layout(&mut popup);
        self.popups.insert(id, popup);

        log::debug!("created popup {id:?} at {:?} ({})", popup.position, popup.placement);
        id
    }

    fn set_placement(&mut self, id: PopupId, placement: Placement) {
        let Some(mut popup) = self.popups.get(&id).copied() else {
            return;
        };

        popup.options.placement = placement;
        self.layout(&mut popup);
        self.popups.insert(id, popup);
    }

    fn update(&mut self, id: PopupId, anchor: Anchor) {
        let Some(mut popup) = self.popups.get(&id).copied() else {
            return;
        };

        popup.anchor = anchor;
        self.layout(&mut popup);
        log::trace!("popup {id:?} moved to {:?}", popup.position);
        self.popups.insert(id, popup);
    }

    fn destroy(&mut self, id: PopupId) {
        if self.popups.remove(&id).is_some() {
            log::debug!("destroyed popup {id:?}");
        }
    }

    fn popup(&self, id: PopupId) -> Option<&PlacedPopup> {
        self.popups.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> ClientRect {
        ClientRect::new(0.0, 0.0, 400.0, 400.0)
    }

    fn anchor(left: f64, top: f64, width: f64, height: f64) -> Anchor {
        Anchor::new(surface(), PercentRect { left, top, width, height })
    }

    #[test]
    fn toward_picks_side_from_drag_direction() {
        let origin = Point::new(50.0, 50.0);

        assert_eq!(Placement::toward(origin, Point::new(60.0, 60.0)), Placement::TopStart);
        assert_eq!(Placement::toward(origin, Point::new(40.0, 60.0)), Placement::TopEnd);
        assert_eq!(Placement::toward(origin, Point::new(60.0, 40.0)), Placement::BottomStart);
        assert_eq!(Placement::toward(origin, Point::new(40.0, 40.0)), Placement::BottomEnd);
        assert_eq!(Placement::toward(origin, origin), Placement::BottomEnd);
    }

    #[test]
    fn placement_names_are_kebab_case() {
        assert_eq!(Placement::RightStart.to_string(), "right-start");
        assert_eq!(
            serde_json::to_string(&Placement::BottomEnd).ok().as_deref(),
            Some("\"bottom-end\"")
        );
    }

    #[test]
    fn right_start_applies_offset() {
        let mut placer = SimplePlacer::new(100.0, 20.0);
        let id = placer.create(
            anchor(25.0, 25.0, 0.0, 0.0),
            PopupOptions::new(Placement::RightStart).with_offset(Point::new(10.0, 10.0)),
        );

        let popup = placer.popup(id).copied();
        assert_eq!(popup.map(|p| p.position), Some(Point::new(110.0, 110.0)));
    }

    #[test]
    fn flips_to_bottom_when_top_overflows() {
        let mut placer = SimplePlacer::new(100.0, 50.0);
        let id = placer.create(
            anchor(10.0, 5.0, 20.0, 20.0),
            PopupOptions::new(Placement::TopStart).with_flip(true),
        );

        let popup = placer.popup(id).copied();
        assert_eq!(popup.map(|p| p.placement), Some(Placement::BottomStart));
        assert_eq!(popup.map(|p| p.position), Some(Point::new(40.0, 100.0)));
    }

    #[test]
    fn flips_alignment_when_popup_leaves_surface() {
        let mut placer = SimplePlacer::new(100.0, 50.0);
        let id = placer.create(
            anchor(90.0, 50.0, 5.0, 5.0),
            PopupOptions::new(Placement::BottomStart).with_flip(true),
        );

        assert_eq!(placer.popup(id).map(|p| p.placement), Some(Placement::BottomEnd));
    }

    #[test]
    fn keeps_preferred_side_without_flip() {
        let mut placer = SimplePlacer::new(100.0, 50.0);
        let id = placer.create(anchor(10.0, 5.0, 20.0, 20.0), PopupOptions::new(Placement::TopStart));

        assert_eq!(placer.popup(id).map(|p| p.placement), Some(Placement::TopStart));
    }

    #[test]
    fn update_and_destroy() {
        let mut placer = SimplePlacer::new(10.0, 10.0);
        let id = placer.create(anchor(0.0, 0.0, 10.0, 10.0), PopupOptions::new(Placement::BottomStart));

        placer.update(id, anchor(50.0, 50.0, 10.0, 10.0));
        assert_eq!(placer.popup(id).map(|p| p.position), Some(Point::new(200.0, 240.0)));

        placer.set_placement(id, Placement::TopEnd);
        assert_eq!(placer.popup(id).map(|p| p.position), Some(Point::new(230.0, 190.0)));

        placer.destroy(id);
        assert!(placer.is_empty());
        placer.update(id, anchor(0.0, 0.0, 0.0, 0.0));
        assert!(placer.popup(id).is_none());
    }
}
