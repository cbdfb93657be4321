//! Drag-to-measure gesture engine
//!
//! A pointer-down starts a gesture session. Until the pointer has moved at
//! least [`DRAG_THRESHOLD_PX`] from where it went down the gesture may still
//! be a plain tap; a tap is handed back to the page as a synthetic click,
//! while a drag shows a measurement frame with a popup reporting its edges
//! and size. After a drag the frame stays visible until the next gesture and
//! the click the platform emits for the release is swallowed.
//!
//! ```text
//! Hidden | Visible  --down-------------------> DownPending
//! DownPending       --move (>= threshold)-----> Measuring
//! Measuring         --move--------------------> Measuring
//! DownPending       --up (synthetic click)----> Hidden
//! Measuring         --up (swallow click)------> Visible
//! DownPending | Measuring --cancel------------> Hidden
//! ```

use crate::clicks::ClickGate;
use crate::context::ViewerContext;
use crate::event::{PointerEvent, PRIMARY_BUTTON};
use crate::geometry::{ClientRect, EventSample, PercentRect};
use crate::listeners::{ListenerGuard, ListenerRegistry, Listeners, PointerCapture};
use crate::placement::{Anchor, Placement, PopupId, PopupOptions, PopupPlacer};
use crate::tasks::{Task, TaskQueue};
use crate::widgets::GeometryRect;
use pageruler_core::Length;
use serde::{Deserialize, Serialize};

/// Minimum Chebyshev distance, in pixels, that turns a press into a drag.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureState {
    /// Nothing shown, no pointer tracked.
    #[default]
    Hidden,
    /// Pointer is down but has not moved far enough to count as a drag.
    DownPending,
    /// Dragging; the frame follows the pointer.
    Measuring,
    /// Drag finished; the frame stays until the next gesture.
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureEvent {
    Down,
    Move,
    Up,
    Cancel,
}

/// Transition table. `None` means the event is not accepted in `from`.
///
/// A move out of [`GestureState::DownPending`] is additionally guarded by the
/// drag threshold, which [`MeasurementTool`] checks.
pub fn transition(from: GestureState, event: GestureEvent) -> Option<GestureState> {
    use GestureEvent::*;
    use GestureState::*;

    match (from, event) {
        (Hidden | Visible, Down) => Some(DownPending),
        (DownPending | Measuring, Move) => Some(Measuring),
        (DownPending, Up) => Some(Hidden),
        (Measuring, Up) => Some(Visible),
        (DownPending | Measuring, Cancel) => Some(Hidden),
        _ => None,
    }
}

/// A pointer event resolved against the surface, ready for the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    Down { pointer_id: u32, sample: EventSample },
    Move(EventSample),
    Up(EventSample),
    Cancel,
}

impl GestureInput {
    pub fn event(&self) -> GestureEvent {
        match self {
            GestureInput::Down { .. } => GestureEvent::Down,
            GestureInput::Move(_) => GestureEvent::Move,
            GestureInput::Up(_) => GestureEvent::Up,
            GestureInput::Cancel => GestureEvent::Cancel,
        }
    }
}

/// Surface services the engine drives while handling one event.
#[derive(Debug)]
pub struct GestureHost<'a> {
    pub bounds: ClientRect,
    pub placer: &'a mut dyn PopupPlacer,
    pub listeners: &'a ListenerRegistry,
    pub capture: &'a mut PointerCapture,
    pub clicks: &'a mut ClickGate,
    pub tasks: &'a mut TaskQueue<Task>,
}

/// Resources held from pointer-down until the gesture ends.
///
/// Holds the pointer capture and the move/up/cancel listeners; both are given
/// back by [`GestureSession::end`].
#[derive(Debug)]
pub struct GestureSession {
    origin: EventSample,
    pointer_id: u32,
    _listeners: ListenerGuard,
}

impl GestureSession {
    pub fn begin(
        pointer_id: u32,
        origin: EventSample,
        listeners: &ListenerRegistry,
        capture: &mut PointerCapture,
    ) -> Self {
        capture.capture(pointer_id);

        Self { origin, pointer_id, _listeners: listeners.install(Listeners::GESTURE) }
    }

    pub fn origin(&self) -> &EventSample {
        &self.origin
    }

    pub fn pointer_id(&self) -> u32 {
        self.pointer_id
    }

    pub fn end(self, capture: &mut PointerCapture) {
        capture.release(self.pointer_id);
    }
}

/// Measurement overlay of one viewer surface.
#[derive(Debug)]
pub struct MeasurementTool {
    state: GestureState,
    session: Option<GestureSession>,
    width: Length,
    height: Length,
    threshold: f64,
    frame: PercentRect,
    frame_visible: bool,
    popup: Option<PopupId>,
    placement: Option<Placement>,
    info: GeometryRect,
}

impl MeasurementTool {
    /// Tool for a page `width` by `height` in size.
    pub fn new(ctx: &ViewerContext, width: Length, height: Length) -> Self {
        let mut info = GeometryRect::new();
        info.connect(ctx);

        Self {
            state: GestureState::Hidden,
            session: None,
            width,
            height,
            threshold: DRAG_THRESHOLD_PX,
            frame: PercentRect::default(),
            frame_visible: false,
            popup: None,
            placement: None,
            info,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Whether `event` is accepted in the current state, ignoring the drag threshold.
    pub fn can(&self, event: GestureEvent) -> bool {
        transition(self.state, event).is_some()
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    /// The frame rectangle in percent, if it is shown.
    pub fn frame(&self) -> Option<PercentRect> {
        self.frame_visible.then_some(self.frame)
    }

    pub fn popup(&self) -> Option<PopupId> {
        self.popup
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn info(&self) -> &GeometryRect {
        &self.info
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, host: &mut GestureHost<'_>) -> bool {
        if !event.is_primary || event.buttons != PRIMARY_BUTTON {
            return false;
        }

        let sample = EventSample::new(event, &host.bounds);
        self.handle(GestureInput::Down { pointer_id: event.pointer_id, sample }, host)
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, host: &mut GestureHost<'_>) -> bool {
        let sample = EventSample::new(event, &host.bounds);
        self.handle(GestureInput::Move(sample), host)
    }

    pub fn pointer_up(&mut self, event: &PointerEvent, host: &mut GestureHost<'_>) -> bool {
        let sample = EventSample::new(event, &host.bounds);
        self.handle(GestureInput::Up(sample), host)
    }

    pub fn pointer_cancel(&mut self, host: &mut GestureHost<'_>) -> bool {
        self.handle(GestureInput::Cancel, host)
    }

    /// Run one input through the state machine.
    ///
    /// Returns `false`, without side effects, when the input is not accepted.
    pub fn handle(&mut self, input: GestureInput, host: &mut GestureHost<'_>) -> bool {
        let event = input.event();

        let Some(to) = transition(self.state, event) else {
            log::trace!("measurement ignores {event:?} in {:?}", self.state);
            return false;
        };

        if let GestureInput::Move(sample) = &input {
            if self.state == GestureState::DownPending && !self.beyond_threshold(sample) {
                return false;
            }
        }

        let from = std::mem::replace(&mut self.state, to);
        log::debug!("measurement {from:?} -> {to:?} on {event:?}");

        match input {
            GestureInput::Down { pointer_id, sample } => {
                self.session =
                    Some(GestureSession::begin(pointer_id, sample, host.listeners, host.capture));
            }
            GestureInput::Move(sample) => {
                if from == GestureState::DownPending {
                    self.show(host);
                }
                self.track(&sample, host);
            }
            GestureInput::Up(_) => {
                if let Some(session) = self.session.take() {
                    if from == GestureState::DownPending {
                        host.tasks.schedule(Task::SyntheticClick(session.origin().target));
                    } else {
                        host.clicks.swallow_next();
                    }
                    session.end(host.capture);
                }
            }
            GestureInput::Cancel => {
                if let Some(session) = self.session.take() {
                    session.end(host.capture);
                }
            }
        }

        if to == GestureState::Hidden {
            self.hide(host);
        }

        true
    }

    /// Abandon any gesture, hide the frame and unmount the readout.
    pub fn detach(&mut self, host: &mut GestureHost<'_>) {
        if let Some(session) = self.session.take() {
            session.end(host.capture);
        }

        self.state = GestureState::Hidden;
        self.hide(host);
        self.info.disconnect();
    }

    fn beyond_threshold(&self, sample: &EventSample) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.origin.abs.chebyshev_distance(sample.abs) >= self.threshold)
    }

    fn show(&mut self, host: &mut GestureHost<'_>) {
        self.frame_visible = true;

        if self.popup.is_none() {
            let options = PopupOptions::new(Placement::BottomStart).with_flip(true);
            self.popup = Some(host.placer.create(Anchor::new(host.bounds, self.frame), options));
            self.placement = None;
        }
    }

    fn hide(&mut self, host: &mut GestureHost<'_>) {
        if let Some(popup) = self.popup.take() {
            host.placer.destroy(popup);
        }

        self.placement = None;
        self.frame_visible = false;
    }

    fn track(&mut self, sample: &EventSample, host: &mut GestureHost<'_>) {
        let Some(origin) = self.session.as_ref().map(|session| session.origin.pct) else {
            return;
        };

        let rect = PercentRect::spanning(origin, sample.pct);
        self.frame = rect;

        let Some(popup) = self.popup else {
            return;
        };

        self.info.set_edges_pt(
            self.width.percent(rect.left).pt(),
            self.height.percent(rect.top).pt(),
            self.width.percent(rect.right()).pt(),
            self.height.percent(rect.bottom()).pt(),
        );

        let placement = Placement::toward(origin, sample.pct);
        if self.placement != Some(placement) {
            host.placer.set_placement(popup, placement);
            self.placement = Some(placement);
        }

        host.placer.update(popup, Anchor::new(host.bounds, rect));
        log::trace!("measurement frame {rect:?}");
    }
}
