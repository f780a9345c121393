//! Slider interaction: pointer position to percentage, and drag sessions.
//!
//! A drag starts on a track but is followed at page level so it keeps going when the
//! pointer leaves the track. Page-level listeners live in a [`PointerCapture`] hub; a
//! [`DragSession`] owns the handles it registered there and releases them on drop, so
//! ending (or replacing) a session can never leave a listener behind.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use super::model::MAX_PERCENT;

/// Horizontal extent of a track in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub left: f64,
    pub width: f64,
}

impl TrackGeometry {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn percent_at(&self, client_x: f64) -> u8 {
        percent_at(client_x, self.left, self.width)
    }
}

/// `round(100 * clamp((x - left) / width, 0, 1))`.
///
/// Degenerate geometry still lands inside `[0, 100]`: a NaN ratio maps to 0 and an
/// infinite one (zero width) clamps to the end the pointer is on.
pub fn percent_at(client_x: f64, track_left: f64, track_width: f64) -> u8 {
    let ratio = (client_x - track_left) / track_width;
    let ratio = if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    };
    (ratio * f64::from(MAX_PERCENT)).round() as u8
}

/// New value for a keyboard key pressed on a focused slider, if the key is handled.
pub fn keyboard_step(key: &str, current: u8) -> Option<u8> {
    let next = match key {
        "ArrowLeft" | "ArrowDown" => current.saturating_sub(1),
        "ArrowRight" | "ArrowUp" => current.saturating_add(1),
        "PageDown" => current.saturating_sub(10),
        "PageUp" => current.saturating_add(10),
        "Home" => 0,
        "End" => MAX_PERCENT,
        _ => return None,
    };
    Some(next.min(MAX_PERCENT))
}

type MoveListener = Rc<dyn Fn(f64)>;
type EndListener = Rc<dyn Fn()>;

#[derive(Default)]
struct CaptureState {
    next_id: u64,
    moves: Vec<(u64, MoveListener)>,
    ends: Vec<(u64, EndListener)>,
}

/// Page-level pointer listener registry.
///
/// The page root forwards its pointer move / up events here; tracks register while
/// they are being dragged.
#[derive(Clone, Default)]
pub struct PointerCapture {
    state: Rc<RefCell<CaptureState>>,
}

impl PartialEq for PointerCapture {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl PointerCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_move(&self, listener: impl Fn(f64) + 'static) -> ListenerHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.moves.push((id, Rc::new(listener)));
        ListenerHandle {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    pub fn on_end(&self, listener: impl Fn() + 'static) -> ListenerHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.ends.push((id, Rc::new(listener)));
        ListenerHandle {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    /// Deliver a move to every registered listener, in registration order.
    pub fn dispatch_move(&self, client_x: f64) {
        let listeners: Vec<MoveListener> = self
            .state
            .borrow()
            .moves
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(client_x);
        }
    }

    pub fn dispatch_end(&self) {
        let listeners: Vec<EndListener> = self
            .state
            .borrow()
            .ends
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Number of move + end listeners currently registered.
    pub fn listener_count(&self) -> usize {
        let state = self.state.borrow();
        state.moves.len() + state.ends.len()
    }

    pub fn is_capturing(&self) -> bool {
        self.listener_count() > 0
    }
}

/// Registration in a [`PointerCapture`]; unregisters on drop.
pub struct ListenerHandle {
    state: Weak<RefCell<CaptureState>>,
    id: u64,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = state.borrow_mut();
            state.moves.retain(|(id, _)| *id != self.id);
            state.ends.retain(|(id, _)| *id != self.id);
        }
    }
}

struct DragCore {
    geometry: Cell<TrackGeometry>,
    last_x: Cell<f64>,
    report: Rc<dyn Fn(u8)>,
}

impl DragCore {
    fn handle_move(&self, client_x: f64) -> u8 {
        self.last_x.set(client_x);
        let percent = self.geometry.get().percent_at(client_x);
        (self.report)(percent);
        percent
    }
}

/// An active drag over one track.
///
/// Holds the page-level listeners it registered. `end` (or dropping the session)
/// releases them.
pub struct DragSession {
    core: Rc<DragCore>,
    _move: ListenerHandle,
    _end: ListenerHandle,
}

impl DragSession {
    /// Register page-level listeners and report the starting position immediately.
    ///
    /// `on_release` runs when the page reports the pointer going up; it is expected to
    /// drop the session.
    pub fn begin(
        capture: &PointerCapture,
        geometry: TrackGeometry,
        client_x: f64,
        report: Rc<dyn Fn(u8)>,
        on_release: impl Fn() + 'static,
    ) -> Self {
        let core = Rc::new(DragCore {
            geometry: Cell::new(geometry),
            last_x: Cell::new(client_x),
            report,
        });

        let move_core = core.clone();
        let move_handle = capture.on_move(move |x| {
            move_core.handle_move(x);
        });
        let end_handle = capture.on_end(on_release);

        let percent = core.handle_move(client_x);
        debug!(percent, "slider drag started");

        Self {
            core,
            _move: move_handle,
            _end: end_handle,
        }
    }

    pub fn geometry(&self) -> TrackGeometry {
        self.core.geometry.get()
    }

    pub fn handle_move(&self, client_x: f64) -> u8 {
        self.core.handle_move(client_x)
    }

    pub fn end(self) {
        debug!("slider drag ended");
    }
}

/// Per-track drag state. Each track owns one; nothing is shared between tracks.
#[derive(Clone, Default)]
pub struct TrackDrag {
    session: Rc<RefCell<Option<DragSession>>>,
}

impl TrackDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Start a drag at `client_x`, replacing any session this track still holds.
    pub fn begin(
        &self,
        capture: &PointerCapture,
        geometry: TrackGeometry,
        client_x: f64,
        report: impl Fn(u8) + 'static,
    ) -> u8 {
        // Release the previous registration before adding new listeners.
        if let Some(previous) = self.session.borrow_mut().take() {
            previous.end();
        }

        let slot = Rc::downgrade(&self.session);
        let session = DragSession::begin(capture, geometry, client_x, Rc::new(report), move || {
            release(&slot);
        });
        let percent = geometry.percent_at(client_x);
        *self.session.borrow_mut() = Some(session);
        percent
    }

    /// Re-anchor the active drag, if any, to `geometry`.
    ///
    /// Tracks start dragging with the last known geometry and correct it once a fresh
    /// measurement arrives. Reports the last pointer position against the new geometry.
    pub fn remeasure(&self, geometry: TrackGeometry) -> Option<u8> {
        // Clone out the core so the report callback runs without the slot borrowed.
        let core = self.session.borrow().as_ref().map(|s| s.core.clone())?;
        core.geometry.set(geometry);
        Some(core.handle_move(core.last_x.get()))
    }

    /// Follow a move directly (without the page hub). Returns `None` when idle.
    pub fn handle_move(&self, client_x: f64) -> Option<u8> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.handle_move(client_x))
    }

    pub fn end(&self) {
        release(&Rc::downgrade(&self.session));
    }
}

fn release(slot: &Weak<RefCell<Option<DragSession>>>) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    // Take first so the listeners are dropped after the borrow is released.
    let session = slot.borrow_mut().take();
    if let Some(session) = session {
        session.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<u8>>>, impl Fn(u8) + Clone + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, move |pct| sink.borrow_mut().push(pct))
    }

    #[test]
    fn percent_is_bounded_and_monotonic() {
        let mut last = 0u8;
        let mut x = -50.0;
        while x <= 350.0 {
            let pct = percent_at(x, 20.0, 240.0);
            assert!(pct <= 100);
            assert!(pct >= last, "not monotonic at x={x}");
            last = pct;
            x += 0.75;
        }
        assert_eq!(percent_at(-1_000.0, 20.0, 240.0), 0);
        assert_eq!(percent_at(1_000.0, 20.0, 240.0), 100);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(percent_at(50.0, 0.0, 200.0), 25);
        assert_eq!(percent_at(1.0, 0.0, 200.0), 1); // 0.5 rounds away from zero
        assert_eq!(percent_at(0.9, 0.0, 200.0), 0);
    }

    #[test]
    fn zero_width_track_stays_in_range() {
        assert_eq!(percent_at(10.0, 10.0, 0.0), 0);
        assert_eq!(percent_at(12.0, 10.0, 0.0), 100);
        assert_eq!(percent_at(8.0, 10.0, 0.0), 0);
        assert_eq!(percent_at(f64::NAN, 10.0, 100.0), 0);
        assert_eq!(percent_at(f64::INFINITY, 10.0, 100.0), 100);
        assert_eq!(percent_at(f64::NEG_INFINITY, 10.0, 100.0), 0);
    }

    #[test]
    fn keyboard_steps_saturate() {
        assert_eq!(keyboard_step("ArrowRight", 100), Some(100));
        assert_eq!(keyboard_step("ArrowLeft", 0), Some(0));
        assert_eq!(keyboard_step("PageUp", 95), Some(100));
        assert_eq!(keyboard_step("Home", 42), Some(0));
        assert_eq!(keyboard_step("End", 42), Some(100));
        assert_eq!(keyboard_step("a", 42), None);
    }

    #[test]
    fn begin_reports_immediately_and_follows_page_moves() {
        let capture = PointerCapture::new();
        let track = TrackDrag::new();
        let (log, sink) = recorder();
        let geometry = TrackGeometry::new(100.0, 200.0);

        let first = track.begin(&capture, geometry, 150.0, sink);
        assert_eq!(first, 25);

        // Outside the track on both sides.
        capture.dispatch_move(50.0);
        capture.dispatch_move(900.0);
        capture.dispatch_end();

        assert_eq!(*log.borrow(), vec![25, 0, 100]);
        assert!(!track.is_active());
    }

    #[test]
    fn repeated_drags_leave_no_listeners() {
        let capture = PointerCapture::new();
        let track = TrackDrag::new();
        let (log, sink) = recorder();
        let geometry = TrackGeometry::new(0.0, 100.0);

        for cycle in 0..25 {
            track.begin(&capture, geometry, f64::from(cycle), sink.clone());
            assert_eq!(capture.listener_count(), 2);
            capture.dispatch_move(f64::from(cycle) + 1.0);
            capture.dispatch_end();
            assert_eq!(capture.listener_count(), 0);
        }

        let reported = log.borrow().len();
        capture.dispatch_move(42.0);
        capture.dispatch_end();
        assert_eq!(log.borrow().len(), reported, "moves after release leaked");
    }

    #[test]
    fn overlapping_begin_replaces_previous_session() {
        let capture = PointerCapture::new();
        let track = TrackDrag::new();
        let (log, sink) = recorder();
        let geometry = TrackGeometry::new(0.0, 100.0);

        track.begin(&capture, geometry, 10.0, sink.clone());
        track.begin(&capture, geometry, 20.0, sink);
        assert_eq!(capture.listener_count(), 2);

        capture.dispatch_move(30.0);
        assert_eq!(*log.borrow(), vec![10, 20, 30]);

        capture.dispatch_end();
        assert_eq!(capture.listener_count(), 0);
    }

    #[test]
    fn tracks_keep_their_own_state() {
        let capture = PointerCapture::new();
        let left = TrackDrag::new();
        let right = TrackDrag::new();
        let (left_log, left_sink) = recorder();
        let (right_log, right_sink) = recorder();

        left.begin(&capture, TrackGeometry::new(0.0, 100.0), 40.0, left_sink);
        assert!(left.is_active());
        assert!(!right.is_active());

        capture.dispatch_move(60.0);
        capture.dispatch_end();

        right.begin(&capture, TrackGeometry::new(200.0, 100.0), 250.0, right_sink);
        capture.dispatch_end();

        assert_eq!(*left_log.borrow(), vec![40, 60]);
        assert_eq!(*right_log.borrow(), vec![50]);
    }

    #[test]
    fn remeasure_corrects_a_drag_started_on_stale_geometry() {
        let capture = PointerCapture::new();
        let track = TrackDrag::new();
        let (log, sink) = recorder();

        // Measured at mount; the card has since been recentred further right.
        let stale = TrackGeometry::new(80.0, 480.0);
        let fresh = TrackGeometry::new(200.0, 480.0);

        assert_eq!(track.begin(&capture, stale, 300.0, sink), 46);
        assert_eq!(track.remeasure(fresh), Some(21));

        capture.dispatch_move(440.0);
        capture.dispatch_end();
        assert_eq!(*log.borrow(), vec![46, 21, 50]);

        assert_eq!(track.remeasure(fresh), None);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn explicit_end_releases_listeners() {
        let capture = PointerCapture::new();
        let track = TrackDrag::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();

        track.begin(&capture, TrackGeometry::new(0.0, 10.0), 5.0, move |_| {
            counter.set(counter.get() + 1)
        });
        assert_eq!(track.handle_move(10.0), Some(100));
        track.end();

        assert_eq!(capture.listener_count(), 0);
        assert_eq!(track.handle_move(3.0), None);
        assert_eq!(hits.get(), 2);
    }
}
