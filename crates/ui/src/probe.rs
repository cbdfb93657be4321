//! Hover position readout.

use crate::context::ViewerContext;
use crate::event::PointerEvent;
use crate::geometry::{ClientRect, EventSample, PercentRect, Point};
use crate::placement::{Anchor, Placement, PopupId, PopupOptions, PopupPlacer};
use crate::widgets::GeometryPoint;
use pageruler_core::Length;

/// Shows the physical position under the pointer while it hovers the page.
///
/// Active between pointer-enter and pointer-leave; each move re-anchors the
/// popup to an invisible marker at the pointer's percent position.
#[derive(Debug)]
pub struct PositionProbe {
    width: Length,
    height: Length,
    offset: Point,
    marker: Point,
    popup: Option<PopupId>,
    info: GeometryPoint,
}

impl PositionProbe {
    pub fn new(ctx: &ViewerContext, width: Length, height: Length, offset: Point) -> Self {
        let mut info = GeometryPoint::new();
        info.connect(ctx);

        Self { width, height, offset, marker: Point::default(), popup: None, info }
    }

    pub fn is_active(&self) -> bool {
        self.popup.is_some()
    }

    /// Marker position in percent of the page.
    pub fn marker(&self) -> Point {
        self.marker
    }

    pub fn popup(&self) -> Option<PopupId> {
        self.popup
    }

    pub fn info(&self) -> &GeometryPoint {
        &self.info
    }

    pub fn pointer_enter(&mut self, bounds: ClientRect, placer: &mut dyn PopupPlacer) {
        if self.popup.is_some() {
            return;
        }

        let options = PopupOptions::new(Placement::RightStart).with_offset(self.offset);
        self.popup = Some(placer.create(self.anchor(bounds), options));
    }

    pub fn pointer_move(
        &mut self,
        event: &PointerEvent,
        bounds: ClientRect,
        placer: &mut dyn PopupPlacer,
    ) {
        let Some(popup) = self.popup else {
            return;
        };

        let sample = EventSample::new(event, &bounds);

        self.info.set_position_pt(
            self.width.percent(sample.pct.x).pt(),
            self.height.percent(sample.pct.y).pt(),
        );
        self.marker = sample.pct;

        placer.update(popup, self.anchor(bounds));
    }

    pub fn pointer_leave(&mut self, placer: &mut dyn PopupPlacer) {
        if let Some(popup) = self.popup.take() {
            placer.destroy(popup);
        }
    }

    /// Leave and unmount the readout.
    pub fn detach(&mut self, placer: &mut dyn PopupPlacer) {
        self.pointer_leave(placer);
        self.info.disconnect();
    }

    fn anchor(&self, bounds: ClientRect) -> Anchor {
        Anchor::new(bounds, PercentRect::at(self.marker))
    }
}
