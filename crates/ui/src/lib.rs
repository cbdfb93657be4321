//! PageRuler UI Library
//!
//! Headless interaction layer of the page measurement overlay: the position
//! probe, the drag-to-measure gesture engine, the length display widgets and
//! the viewer surface that routes pointer events between them.

pub mod clicks;
pub mod context;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod listeners;
pub mod placement;
pub mod probe;
pub mod tasks;
pub mod unit_select;
pub mod viewer;
pub mod widgets;

pub use clicks::ClickGate;
pub use context::ViewerContext;
pub use event::{PointerEvent, TargetId, ViewerEvent, PRIMARY_BUTTON};
pub use geometry::{ClientRect, EventSample, PercentRect, Point};
pub use gesture::{
    transition, GestureEvent, GestureHost, GestureInput, GestureSession, GestureState,
    MeasurementTool, DRAG_THRESHOLD_PX,
};
pub use listeners::{ListenerGuard, ListenerRegistry, Listeners, PointerCapture};
pub use placement::{
    Anchor, PlacedPopup, Placement, PopupId, PopupOptions, PopupPlacer, SimplePlacer,
};
pub use probe::PositionProbe;
pub use tasks::{Task, TaskQueue};
pub use unit_select::{UnitOption, UnitSelector};
pub use viewer::{Dispatch, Viewer, ViewerConfig};
pub use widgets::{
    DisplayWidget, Edge, FieldGroup, GeometryPoint, GeometryRect, PointFields, RectFields,
};
