//! Length display widgets
//!
//! [`GeometryPoint`] shows an `(x, y)` position and [`GeometryRect`] a
//! rectangle with its size, both in the current default unit. Values are fed
//! in points through string attributes (`left-pt`, `top-pt`, ...) or the typed
//! setters; every change re-renders synchronously.

use crate::context::ViewerContext;
use pageruler_core::{
    FormatterCache, LengthBinding, LengthUnit, SignDisplay, Subscription, TextSink, TextSlot,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The set of length bindings behind one widget.
pub trait FieldGroup: Default + fmt::Debug + 'static {
    /// Accepted attribute names.
    const ATTRIBUTES: &'static [&'static str];
    /// Field titles, in the order [`FieldGroup::bindings`] yields them.
    const TITLES: &'static [&'static str];

    fn bindings(&mut self) -> Vec<&mut LengthBinding>;

    /// Store `pt` for `ATTRIBUTES[index]`.
    fn set_attribute_points(&mut self, index: usize, pt: f64);

    fn compose(fields: &[String], unit: &str) -> String;

    /// Called when the widget is unmounted.
    fn reset(&mut self) {}
}

#[derive(Debug)]
struct Mounted {
    slots: Vec<TextSlot>,
    unit: TextSlot,
    formatters: Rc<FormatterCache>,
}

#[derive(Debug, Default)]
struct WidgetState<G> {
    fields: G,
    unit: LengthUnit,
    mounted: Option<Mounted>,
}

impl<G: FieldGroup> WidgetState<G> {
    fn set_unit(&mut self, unit: LengthUnit) {
        self.unit = unit;
        for binding in self.fields.bindings() {
            binding.set_unit(unit);
        }
    }

    fn render(&mut self) {
        let Some(mounted) = &self.mounted else {
            return;
        };

        for binding in self.fields.bindings() {
            binding.render(&mounted.formatters);
        }
        mounted.unit.set_text(self.unit.name());
    }
}

/// A mountable widget rendering a [`FieldGroup`].
#[derive(Debug)]
pub struct DisplayWidget<G> {
    state: Rc<RefCell<WidgetState<G>>>,
    subscription: Option<Subscription>,
}

impl<G: FieldGroup> Default for DisplayWidget<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: FieldGroup> DisplayWidget<G> {
    pub fn new() -> Self {
        Self { state: Rc::default(), subscription: None }
    }

    /// Mount: create output slots, follow the default unit and render.
    pub fn connect(&mut self, ctx: &ViewerContext) {
        self.disconnect();

        let slots: Vec<TextSlot> = G::TITLES.iter().map(|_| TextSlot::new()).collect();

        {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;

            for (binding, slot) in state.fields.bindings().into_iter().zip(&slots) {
                let sink: Rc<dyn TextSink> = Rc::new(slot.clone());
                binding.set_target(Some(sink));
            }

            state.mounted = Some(Mounted {
                slots,
                unit: TextSlot::new(),
                formatters: Rc::clone(&ctx.formatters),
            });
            state.set_unit(ctx.default_unit.get());
            state.render();
        }

        let weak = Rc::downgrade(&self.state);
        self.subscription = Some(ctx.default_unit.observe(move |unit| {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                state.set_unit(unit);
                state.render();
            }
        }));
    }

    /// Unmount: stop following the default unit and detach every output.
    pub fn disconnect(&mut self) {
        self.subscription = None;

        let mut state = self.state.borrow_mut();
        if state.mounted.take().is_none() {
            return;
        }

        for binding in state.fields.bindings() {
            binding.set_target(None);
        }
        state.fields.reset();
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().mounted.is_some()
    }

    pub fn unit(&self) -> LengthUnit {
        self.state.borrow().unit
    }

    /// Parse and apply an attribute. Returns `false` for unknown names.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        let Some(index) = G::ATTRIBUTES.iter().position(|attr| *attr == name) else {
            return false;
        };

        self.update(|fields| fields.set_attribute_points(index, parse_float(value)));
        true
    }

    /// Rendered text, or `None` while unmounted.
    pub fn text(&self) -> Option<String> {
        let state = self.state.borrow();
        let mounted = state.mounted.as_ref()?;
        let fields: Vec<String> = mounted.slots.iter().map(TextSlot::text).collect();

        Some(G::compose(&fields, &mounted.unit.text()))
    }

    /// `(title, text)` pairs, or an empty list while unmounted.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let state = self.state.borrow();
        match &state.mounted {
            Some(mounted) => {
                G::TITLES.iter().copied().zip(mounted.slots.iter().map(TextSlot::text)).collect()
            }
            None => Vec::new(),
        }
    }

    fn update(&mut self, apply: impl FnOnce(&mut G)) {
        let mut state = self.state.borrow_mut();
        apply(&mut state.fields);
        state.render();
    }

    fn read<R>(&self, read: impl FnOnce(&G) -> R) -> R {
        read(&self.state.borrow().fields)
    }
}

#[derive(Debug, Default)]
pub struct PointFields {
    left: LengthBinding,
    top: LengthBinding,
}

impl FieldGroup for PointFields {
    const ATTRIBUTES: &'static [&'static str] = &["left-pt", "top-pt"];
    const TITLES: &'static [&'static str] = &["Left", "Top"];

    fn bindings(&mut self) -> Vec<&mut LengthBinding> {
        vec![&mut self.left, &mut self.top]
    }

    fn set_attribute_points(&mut self, index: usize, pt: f64) {
        match index {
            0 => self.left.set_points(pt),
            1 => self.top.set_points(pt),
            _ => {}
        }
    }

    fn compose(fields: &[String], unit: &str) -> String {
        format!("({}, {}) {unit}", fields[0], fields[1])
    }
}

pub type GeometryPoint = DisplayWidget<PointFields>;

impl DisplayWidget<PointFields> {
    pub fn set_position_pt(&mut self, left: f64, top: f64) {
        self.update(|fields| {
            fields.left.set_points(left);
            fields.top.set_points(top);
        });
    }

    pub fn left_pt(&self) -> f64 {
        self.read(|fields| fields.left.points())
    }

    pub fn top_pt(&self) -> f64 {
        self.read(|fields| fields.top.points())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];
}

#[derive(Debug)]
pub struct RectFields {
    left: LengthBinding,
    top: LengthBinding,
    right: LengthBinding,
    bottom: LengthBinding,
    width: LengthBinding,
    height: LengthBinding,
}

impl Default for RectFields {
    fn default() -> Self {
        Self {
            left: LengthBinding::new(),
            top: LengthBinding::new(),
            right: LengthBinding::new(),
            bottom: LengthBinding::new(),
            width: LengthBinding::new().with_sign_display(SignDisplay::ExceptZero),
            height: LengthBinding::new().with_sign_display(SignDisplay::ExceptZero),
        }
    }
}

impl RectFields {
    fn edge_mut(&mut self, edge: Edge) -> &mut LengthBinding {
        match edge {
            Edge::Left => &mut self.left,
            Edge::Top => &mut self.top,
            Edge::Right => &mut self.right,
            Edge::Bottom => &mut self.bottom,
        }
    }

    fn edge(&self, edge: Edge) -> &LengthBinding {
        match edge {
            Edge::Left => &self.left,
            Edge::Top => &self.top,
            Edge::Right => &self.right,
            Edge::Bottom => &self.bottom,
        }
    }

    /// Width follows left/right only, height follows top/bottom only.
    fn set_edge(&mut self, edge: Edge, pt: f64) {
        self.edge_mut(edge).set_points(pt);

        match edge {
            Edge::Left | Edge::Right => {
                self.width.set_points(self.right.points() - self.left.points());
            }
            Edge::Top | Edge::Bottom => {
                self.height.set_points(self.bottom.points() - self.top.points());
            }
        }
    }
}

impl FieldGroup for RectFields {
    const ATTRIBUTES: &'static [&'static str] = &["left-pt", "top-pt", "right-pt", "bottom-pt"];
    const TITLES: &'static [&'static str] = &["Left", "Top", "Right", "Bottom", "Width", "Height"];

    fn bindings(&mut self) -> Vec<&mut LengthBinding> {
        vec![
            &mut self.left,
            &mut self.top,
            &mut self.right,
            &mut self.bottom,
            &mut self.width,
            &mut self.height,
        ]
    }

    fn set_attribute_points(&mut self, index: usize, pt: f64) {
        if let Some(edge) = Edge::ALL.get(index) {
            self.set_edge(*edge, pt);
        }
    }

    fn compose(fields: &[String], unit: &str) -> String {
        format!(
            "({}, {})\u{2013}({}, {}) [{}\u{00D7}{}] {unit}",
            fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]
        )
    }

    fn reset(&mut self) {
        for binding in self.bindings() {
            binding.set_points(0.0);
        }
    }
}

pub type GeometryRect = DisplayWidget<RectFields>;

impl DisplayWidget<RectFields> {
    pub fn set_edge_pt(&mut self, edge: Edge, pt: f64) {
        self.update(|fields| fields.set_edge(edge, pt));
    }

    /// Set all four edges and render once.
    pub fn set_edges_pt(&mut self, left: f64, top: f64, right: f64, bottom: f64) {
        self.update(|fields| {
            fields.set_edge(Edge::Left, left);
            fields.set_edge(Edge::Top, top);
            fields.set_edge(Edge::Right, right);
            fields.set_edge(Edge::Bottom, bottom);
        });
    }

    pub fn edge_pt(&self, edge: Edge) -> f64 {
        self.read(|fields| fields.edge(edge).points())
    }

    pub fn width_pt(&self) -> f64 {
        self.read(|fields| fields.width.points())
    }

    pub fn height_pt(&self) -> f64 {
        self.read(|fields| fields.height.points())
    }
}

/// Lenient float parsing: the longest numeric prefix wins, anything else is NaN.
pub(crate) fn parse_float(value: &str) -> f64 {
    let trimmed = value.trim_start();

    for (prefix, parsed) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if trimmed.starts_with(prefix) {
            return parsed;
        }
    }

    let candidate_len = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(trimmed.len());

    (1..=candidate_len)
        .rev()
        .find_map(|len| trimmed[..len].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageruler_core::{CENTIMETER, INCH, MILLIMETER};

    #[test]
    fn parse_float_accepts_numeric_prefix() {
        assert_eq!(parse_float("12.5"), 12.5);
        assert_eq!(parse_float("  -3e2px"), -300.0);
        assert_eq!(parse_float("7pt"), 7.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("Infinity"), f64::INFINITY);
        assert!(parse_float("").is_nan());
        assert!(parse_float("abc").is_nan());
        assert!(parse_float("-").is_nan());
        assert!(parse_float("nan").is_nan());
        assert!(parse_float("inf").is_nan());
    }

    #[test]
    fn point_renders_in_default_unit() {
        let ctx = ViewerContext::in_memory();
        let mut point = GeometryPoint::new();
        point.connect(&ctx);

        point.set_attribute("left-pt", "72");
        point.set_attribute("top-pt", "144");
        insta::assert_snapshot!(point.text().unwrap_or_default(), @"(72, 144) pt");

        ctx.default_unit.set(INCH);
        insta::assert_snapshot!(point.text().unwrap_or_default(), @"(1.0, 2.0) in");
        assert_eq!(point.unit(), INCH);
    }

    #[test]
    fn point_fields_carry_titles() {
        let ctx = ViewerContext::in_memory();
        let mut point = GeometryPoint::new();
        point.connect(&ctx);
        point.set_position_pt(10.0, 20.0);

        assert_eq!(point.fields(), vec![("Left", "10".to_owned()), ("Top", "20".to_owned())]);
        assert_eq!(point.left_pt(), 10.0);
        assert_eq!(point.top_pt(), 20.0);
    }

    #[test]
    fn unknown_attribute_is_ignored() {
        let ctx = ViewerContext::in_memory();
        let mut point = GeometryPoint::new();
        point.connect(&ctx);

        assert!(!point.set_attribute("right-pt", "5"));
        assert!(point.set_attribute("left-pt", "5"));
    }

    #[test]
    fn invalid_attribute_renders_nan() {
        let ctx = ViewerContext::in_memory();
        let mut point = GeometryPoint::new();
        point.connect(&ctx);
        point.set_attribute("left-pt", "wide");

        assert!(point.left_pt().is_nan());
        insta::assert_snapshot!(point.text().unwrap_or_default(), @"(NaN, 0) pt");
    }

    #[test]
    fn rect_renders_edges_and_signed_size() {
        let ctx = ViewerContext::in_memory();
        let mut rect = GeometryRect::new();
        rect.connect(&ctx);

        rect.set_edges_pt(72.0, 36.0, 144.0, 36.0);
        insta::assert_snapshot!(rect.text().unwrap_or_default(), @"(72, 36)–(144, 36) [+72×0] pt");

        ctx.default_unit.set(INCH);
        insta::assert_snapshot!(rect.text().unwrap_or_default(), @"(1.0, 0.5)–(2.0, 0.5) [+1.0×0.0] in");
    }

    #[test]
    fn rect_size_follows_own_edges() {
        let ctx = ViewerContext::in_memory();
        let mut rect = GeometryRect::new();
        rect.connect(&ctx);

        rect.set_attribute("right-pt", "100");
        assert_eq!(rect.width_pt(), 100.0);
        assert_eq!(rect.height_pt(), 0.0);

        rect.set_attribute("bottom-pt", "50");
        rect.set_attribute("top-pt", "20");
        assert_eq!(rect.width_pt(), 100.0);
        assert_eq!(rect.height_pt(), 30.0);

        rect.set_edge_pt(Edge::Left, 110.0);
        assert_eq!(rect.width_pt(), -10.0);
        assert_eq!(rect.edge_pt(Edge::Left), 110.0);
        assert_eq!(rect.fields()[4], ("Width", "-10".to_owned()));
    }

    #[test]
    fn disconnect_unsubscribes_and_resets() {
        let ctx = ViewerContext::in_memory();
        let mut rect = GeometryRect::new();
        rect.connect(&ctx);
        rect.set_edges_pt(1.0, 2.0, 3.0, 4.0);
        assert_eq!(ctx.default_unit.subscriber_count(), 1);

        rect.disconnect();
        assert!(!rect.is_connected());
        assert_eq!(ctx.default_unit.subscriber_count(), 0);
        assert_eq!(rect.text(), None);
        assert!(rect.fields().is_empty());
        assert_eq!(rect.edge_pt(Edge::Right), 0.0);

        ctx.default_unit.set(MILLIMETER);
        assert_eq!(rect.unit(), pageruler_core::POINT);
    }

    #[test]
    fn reconnect_adopts_current_unit() {
        let ctx = ViewerContext::in_memory();
        let mut point = GeometryPoint::new();
        point.connect(&ctx);
        point.disconnect();

        ctx.default_unit.set(CENTIMETER);
        point.connect(&ctx);
        point.set_position_pt(72.0 / 2.54, 0.0);

        assert_eq!(point.text().as_deref(), Some("(1.0, 0.0) cm"));
        assert_eq!(ctx.default_unit.subscriber_count(), 1);
    }

    #[test]
    fn dropping_widget_unsubscribes() {
        let ctx = ViewerContext::in_memory();
        {
            let mut point = GeometryPoint::new();
            point.connect(&ctx);
            assert_eq!(ctx.default_unit.subscriber_count(), 1);
        }
        assert_eq!(ctx.default_unit.subscriber_count(), 0);
    }
}
