//! Viewer surface
//!
//! Owns the probe and the measurement tool of one page image together with
//! the surface services they share, and routes incoming events between them
//! the way the page's listeners would see them.

use crate::clicks::ClickGate;
use crate::context::ViewerContext;
use crate::event::{PointerEvent, TargetId, ViewerEvent};
use crate::geometry::{ClientRect, PercentRect, Point};
use crate::gesture::{GestureHost, GestureState, MeasurementTool, DRAG_THRESHOLD_PX};
use crate::listeners::{ListenerRegistry, Listeners, PointerCapture};
use crate::placement::{PopupPlacer, SimplePlacer};
use crate::probe::PositionProbe;
use crate::tasks::{Task, TaskQueue};
use pageruler_core::Length;
use serde::{Deserialize, Serialize};

const POPUP_WIDTH: f64 = 220.0;
const POPUP_HEIGHT: f64 = 28.0;

fn default_threshold() -> f64 {
    DRAG_THRESHOLD_PX
}

fn default_probe_offset() -> Point {
    Point::new(10.0, 10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Physical page width in points.
    pub width_pt: f64,
    /// Physical page height in points.
    pub height_pt: f64,
    /// Where the page image sits in the viewport.
    pub bounds: ClientRect,
    #[serde(default = "default_threshold")]
    pub drag_threshold_px: f64,
    #[serde(default = "default_probe_offset")]
    pub probe_offset: Point,
}

impl ViewerConfig {
    pub fn new(width_pt: f64, height_pt: f64, bounds: ClientRect) -> Self {
        Self {
            width_pt,
            height_pt,
            bounds,
            drag_threshold_px: default_threshold(),
            probe_offset: default_probe_offset(),
        }
    }
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Claimed by the measurement tool or swallowed; nothing underneath sees it.
    Consumed,
    /// Passed on to the page.
    Ignored,
}

#[derive(Debug)]
struct Surface {
    bounds: ClientRect,
    placer: Box<dyn PopupPlacer>,
    listeners: ListenerRegistry,
    capture: PointerCapture,
    clicks: ClickGate,
    tasks: TaskQueue<Task>,
}

impl Surface {
    fn host(&mut self) -> GestureHost<'_> {
        GestureHost {
            bounds: self.bounds,
            placer: &mut *self.placer,
            listeners: &self.listeners,
            capture: &mut self.capture,
            clicks: &mut self.clicks,
            tasks: &mut self.tasks,
        }
    }

    /// Whether a gesture listener of `kind` would hear `event`.
    fn routes(&self, kind: Listeners, event: &PointerEvent) -> bool {
        self.listeners.is_installed(kind) && self.capture.admits(event.pointer_id)
    }
}

/// One page image with its hover probe and measurement tool.
#[derive(Debug)]
pub struct Viewer {
    probe: PositionProbe,
    tool: MeasurementTool,
    surface: Surface,
    activations: Vec<TargetId>,
}

impl Viewer {
    pub fn new(ctx: &ViewerContext, config: ViewerConfig) -> Self {
        Self::with_placer(ctx, config, Box::new(SimplePlacer::new(POPUP_WIDTH, POPUP_HEIGHT)))
    }

    pub fn with_placer(
        ctx: &ViewerContext,
        config: ViewerConfig,
        placer: Box<dyn PopupPlacer>,
    ) -> Self {
        let width = Length::points(config.width_pt);
        let height = Length::points(config.height_pt);

        Self {
            probe: PositionProbe::new(ctx, width, height, config.probe_offset),
            tool: MeasurementTool::new(ctx, width, height).with_threshold(config.drag_threshold_px),
            surface: Surface {
                bounds: config.bounds,
                placer,
                listeners: ListenerRegistry::new(),
                capture: PointerCapture::default(),
                clicks: ClickGate::new(),
                tasks: TaskQueue::new(),
            },
            activations: Vec::new(),
        }
    }

    pub fn dispatch(&mut self, event: ViewerEvent) -> Dispatch {
        let surface = &mut self.surface;

        let consumed = match event {
            ViewerEvent::PointerEnter(_) => {
                self.probe.pointer_enter(surface.bounds, &mut *surface.placer);
                false
            }
            ViewerEvent::PointerMove(ev) => {
                self.probe.pointer_move(&ev, surface.bounds, &mut *surface.placer);
                surface.routes(Listeners::POINTER_MOVE, &ev)
                    && self.tool.pointer_move(&ev, &mut surface.host())
            }
            ViewerEvent::PointerDown(ev) => self.tool.pointer_down(&ev, &mut surface.host()),
            ViewerEvent::PointerUp(ev) => {
                surface.routes(Listeners::POINTER_UP, &ev)
                    && self.tool.pointer_up(&ev, &mut surface.host())
            }
            ViewerEvent::PointerCancel(ev) => {
                surface.routes(Listeners::POINTER_CANCEL, &ev)
                    && self.tool.pointer_cancel(&mut surface.host())
            }
            ViewerEvent::PointerLeave(_) => {
                self.probe.pointer_leave(&mut *surface.placer);
                false
            }
            ViewerEvent::Click { target } => {
                let admitted = surface.clicks.admit(target);
                if admitted {
                    self.activations.push(target);
                }
                !admitted
            }
            ViewerEvent::Resize(bounds) => {
                surface.bounds = bounds;
                false
            }
        };

        if consumed {
            Dispatch::Consumed
        } else {
            Dispatch::Ignored
        }
    }

    /// Run every queued follow-up task. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;

        while let Some(task) = self.surface.tasks.pop() {
            match task {
                Task::SyntheticClick(target) => {
                    self.dispatch(ViewerEvent::Click { target });
                }
            }
            ran += 1;
        }

        ran
    }

    /// Tear down both tools; the viewer stops following the default unit.
    pub fn detach(&mut self) {
        self.tool.detach(&mut self.surface.host());
        self.probe.detach(&mut *self.surface.placer);
    }

    pub fn state(&self) -> GestureState {
        self.tool.state()
    }

    pub fn frame(&self) -> Option<PercentRect> {
        self.tool.frame()
    }

    pub fn tool(&self) -> &MeasurementTool {
        &self.tool
    }

    pub fn probe(&self) -> &PositionProbe {
        &self.probe
    }

    pub fn placer(&self) -> &dyn PopupPlacer {
        &*self.surface.placer
    }

    pub fn bounds(&self) -> ClientRect {
        self.surface.bounds
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.surface.listeners
    }

    pub fn capture(&self) -> &PointerCapture {
        &self.surface.capture
    }

    pub fn pending_tasks(&self) -> usize {
        self.surface.tasks.len()
    }

    /// Clicks that reached the page, in order.
    pub fn activations(&self) -> &[TargetId] {
        &self.activations
    }

    pub fn swallowed_clicks(&self) -> &[TargetId] {
        self.surface.clicks.swallowed()
    }

    /// Drain the activations recorded so far, so a long-lived viewer does not
    /// accumulate every click it ever saw.
    pub fn take_activations(&mut self) -> Vec<TargetId> {
        std::mem::take(&mut self.activations)
    }

    pub fn take_swallowed_clicks(&mut self) -> Vec<TargetId> {
        self.surface.clicks.take_swallowed()
    }
}
