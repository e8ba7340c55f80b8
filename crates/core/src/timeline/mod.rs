use std::{cell::RefCell, fmt};

/// Callback invoked with the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;
/// Callback invoked once a timeout elapses.
pub type TimerCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Scheduling services a host provides to the frame loops: a "next repaint"
/// request, its cancellation, and one-shot delayed callbacks.
///
/// Everything runs on one thread. Callbacks are never invoked re-entrantly
/// from inside the request call itself.
pub trait FrameHost {
    /// Queues `callback` for the next frame and returns a cancellation handle.
    fn request_frame(&self, callback: FrameCallback) -> FrameId;

    fn cancel_frame(&self, id: FrameId);

    /// Queues `callback` to run once `delay_ms` has elapsed from [`FrameHost::now`].
    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> TimerId;

    fn clear_timeout(&self, id: TimerId);

    /// Timestamp of the most recent frame, in milliseconds.
    fn now(&self) -> f64;
}

/// Deterministic, manually advanced [`FrameHost`].
///
/// The owner decides when frames happen by calling [`FrameClock::advance_to`]
/// with a timestamp, which makes it suitable both as the application's
/// driver and for tests that need exact timestamps.
#[derive(Default)]
pub struct FrameClock {
    state: RefCell<ClockState>,
}

#[derive(Default)]
struct ClockState {
    now: f64,
    next_id: u64,
    frames: Vec<(FrameId, FrameCallback)>,
    timers: Vec<PendingTimer>,
}

struct PendingTimer {
    id: TimerId,
    due: f64,
    callback: TimerCallback,
}

/// What a call to [`FrameClock::advance_to`] ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub timers: usize,
    pub frames: usize,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock whose first timestamp is `start`.
    pub fn starting_at(start: f64) -> Self {
        let clock = Self::default();
        clock.state.borrow_mut().now = start;
        clock
    }

    /// Moves time to `timestamp` and runs one frame.
    ///
    /// Timeouts that fall due are fired first, ordered by due time and then
    /// by registration. Then every frame callback queued before this call
    /// runs with `timestamp`; callbacks requested while the frame is running
    /// wait for the next call.
    pub fn advance_to(&self, timestamp: f64) -> FrameReport {
        self.state.borrow_mut().now = timestamp;

        let mut report = FrameReport::default();
        for timer in self.take_due_timers(timestamp) {
            (timer.callback)();
            report.timers += 1;
        }

        let frames = std::mem::take(&mut self.state.borrow_mut().frames);
        for (_, callback) in frames {
            callback(timestamp);
            report.frames += 1;
        }

        report
    }

    /// Advances by `delta_ms` from the current timestamp.
    pub fn advance_by(&self, delta_ms: f64) -> FrameReport {
        let now = self.state.borrow().now;
        self.advance_to(now + delta_ms)
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    fn take_due_timers(&self, timestamp: f64) -> Vec<PendingTimer> {
        let mut state = self.state.borrow_mut();
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.timers)
            .into_iter()
            .partition(|timer| timer.due <= timestamp);
        state.timers = waiting;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due
    }

    fn next_id(state: &mut ClockState) -> u64 {
        state.next_id += 1;
        state.next_id
    }
}

impl FrameHost for FrameClock {
    fn request_frame(&self, callback: FrameCallback) -> FrameId {
        let mut state = self.state.borrow_mut();
        let id = FrameId(Self::next_id(&mut state));
        state.frames.push((id, callback));
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        self.state
            .borrow_mut()
            .frames
            .retain(|(pending, _)| *pending != id);
    }

    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(Self::next_id(&mut state));
        let due = state.now + delay_ms.max(0.0);
        state.timers.push(PendingTimer { id, due, callback });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.state
            .borrow_mut()
            .timers
            .retain(|timer| timer.id != id);
    }

    fn now(&self) -> f64 {
        self.state.borrow().now
    }
}

impl fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrameClock")
            .field("now", &state.now)
            .field("frames", &state.frames.len())
            .field("timers", &state.timers.len())
            .finish()
    }
}
