//! Pixel and percent-space coordinates.

use crate::event::{PointerEvent, TargetId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Largest per-axis distance.
    pub fn chebyshev_distance(self, other: Point) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Element bounds in viewport (client) pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Client position relative to the element's top-left corner.
    pub fn to_local(&self, client: Point) -> Point {
        Point::new(client.x - self.x, client.y - self.y)
    }

    /// Local pixel position as a percentage of the element size.
    pub fn to_percent(&self, local: Point) -> Point {
        Point::new(local.x * 100.0 / self.width, local.y * 100.0 / self.height)
    }

    /// Client-space rectangle covered by a percent-space rectangle.
    pub fn project(&self, rect: PercentRect) -> ClientRect {
        ClientRect::new(
            self.x + rect.left * self.width / 100.0,
            self.y + rect.top * self.height / 100.0,
            rect.width * self.width / 100.0,
            rect.height * self.height / 100.0,
        )
    }
}

/// Rectangle in percent of an element's size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    /// Zero-sized rectangle at `point`.
    pub fn at(point: Point) -> Self {
        Self { left: point.x, top: point.y, width: 0.0, height: 0.0 }
    }

    /// Normalized rectangle between two corners, clamped to `[0, 100]` per axis.
    pub fn spanning(a: Point, b: Point) -> Self {
        let left = clamp_percent(a.x.min(b.x));
        let top = clamp_percent(a.y.min(b.y));

        Self {
            left,
            top,
            width: clamp_percent(a.x.max(b.x)) - left,
            height: clamp_percent(a.y.max(b.y)) - top,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// One pointer sample resolved against the tracked element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventSample {
    pub target: TargetId,
    /// Pixels from the element's top-left corner.
    pub abs: Point,
    /// Percent of the element size.
    pub pct: Point,
}

impl EventSample {
    pub fn new(event: &PointerEvent, bounds: &ClientRect) -> Self {
        let abs = bounds.to_local(event.client);

        Self { target: event.target, abs, pct: bounds.to_percent(abs) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_distance_uses_largest_axis() {
        let a = Point::new(0.0, 0.0);
        assert_eq!(a.chebyshev_distance(Point::new(3.0, -4.0)), 4.0);
        assert_eq!(a.chebyshev_distance(Point::new(-7.0, 2.0)), 7.0);
        assert_eq!(a.chebyshev_distance(a), 0.0);
    }

    #[test]
    fn sample_is_relative_to_element() {
        let bounds = ClientRect::new(100.0, 50.0, 200.0, 400.0);
        let event = PointerEvent::primary(150.0, 150.0).with_target(TargetId(3));
        let sample = EventSample::new(&event, &bounds);

        assert_eq!(sample.target, TargetId(3));
        assert_eq!(sample.abs, Point::new(50.0, 100.0));
        assert_eq!(sample.pct, Point::new(25.0, 25.0));
    }

    #[test]
    fn spanning_normalizes_corners() {
        let rect = PercentRect::spanning(Point::new(60.0, 10.0), Point::new(20.0, 40.0));
        assert_eq!(rect, PercentRect { left: 20.0, top: 10.0, width: 40.0, height: 30.0 });
        assert_eq!(rect.right(), 60.0);
        assert_eq!(rect.bottom(), 40.0);
    }

    #[test]
    fn spanning_clamps_outside_points() {
        let rect = PercentRect::spanning(Point::new(50.0, 50.0), Point::new(130.0, -20.0));
        assert_eq!(rect, PercentRect { left: 50.0, top: 0.0, width: 50.0, height: 50.0 });

        let outside = PercentRect::spanning(Point::new(-10.0, 120.0), Point::new(-30.0, 150.0));
        assert_eq!(outside, PercentRect { left: 0.0, top: 100.0, width: 0.0, height: 0.0 });
    }

    #[test]
    fn project_maps_back_to_client_space() {
        let bounds = ClientRect::new(10.0, 20.0, 200.0, 100.0);
        let rect = PercentRect { left: 10.0, top: 50.0, width: 50.0, height: 25.0 };

        assert_eq!(bounds.project(rect), ClientRect::new(30.0, 70.0, 100.0, 25.0));
    }
}
