//! Frame-driven tween engine.
//!
//! ```
//! use std::rc::Rc;
//! use wavy_line_core::{Animation, Easing, FrameClock};
//!
//! let clock = Rc::new(FrameClock::new());
//! let anim = Animation::new(clock.clone());
//! anim.duration(200.0)
//!     .easing(Easing::QuadOut.into_fn())
//!     .on_tick(|progress| assert!((0.0..=1.0).contains(&progress)));
//! anim.play();
//! clock.advance_to(0.0);
//! ```

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use crate::timeline::{FrameHost, FrameId, TimerId};

const DEFAULT_DURATION_MS: f64 = 1200.0;

/// Direction a run travels through progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// A callback registered with [`Animation::on`].
pub enum Listener {
    /// Fired every frame with the eased progress.
    Tick(Box<dyn FnMut(f64)>),
    /// Fired once when a run completes.
    Finish(Box<dyn FnMut()>),
}

impl Listener {
    pub fn tick(callback: impl FnMut(f64) + 'static) -> Self {
        Self::Tick(Box::new(callback))
    }

    pub fn finish(callback: impl FnMut() + 'static) -> Self {
        Self::Finish(Box::new(callback))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Tick(_) => f.write_str("Listener::Tick"),
            Listener::Finish(_) => f.write_str("Listener::Finish"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Event {
    Tick(f64),
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RunPhase {
    Idle,
    /// `play` was called; the start timestamp is taken on the next frame.
    Pending { direction: Direction },
    Running { start: f64, direction: Direction },
}

struct AnimationState {
    duration_ms: f64,
    easing: Option<Rc<dyn Fn(f64) -> f64>>,
    phase: RunPhase,
    listeners: Vec<Listener>,
    frame: Option<FrameId>,
    /// Bumped whenever a run starts or stops; a scheduled frame carrying an
    /// older generation does nothing.
    generation: u64,
    /// Relaunch timers scheduled by `bounce` and not yet fired.
    bounce_timers: Vec<TimerId>,
    bounce_cycles: usize,
}

/// Chainable tween clock.
///
/// Cloning yields another handle to the same animation. Configuration calls
/// return `&Self` so they can be chained; `play`, `reverse` and `stop` do not.
#[derive(Clone)]
pub struct Animation {
    state: Rc<RefCell<AnimationState>>,
    host: Rc<dyn FrameHost>,
}

impl Animation {
    pub fn new(host: Rc<dyn FrameHost>) -> Self {
        Self {
            state: Rc::new(RefCell::new(AnimationState {
                duration_ms: DEFAULT_DURATION_MS,
                easing: None,
                phase: RunPhase::Idle,
                listeners: Vec::new(),
                frame: None,
                generation: 0,
                bounce_timers: Vec::new(),
                bounce_cycles: 0,
            })),
            host,
        }
    }

    /// Sets the run length in milliseconds.
    pub fn duration(&self, duration_ms: f64) -> &Self {
        self.state.borrow_mut().duration_ms = duration_ms;
        self
    }

    /// Sets the function applied to raw progress before it is emitted.
    pub fn easing(&self, easing: impl Fn(f64) -> f64 + 'static) -> &Self {
        self.state.borrow_mut().easing = Some(Rc::new(easing));
        self
    }

    /// Registers a listener. Listeners run in registration order.
    pub fn on(&self, listener: Listener) -> &Self {
        self.state.borrow_mut().listeners.push(listener);
        self
    }

    pub fn on_tick(&self, callback: impl FnMut(f64) + 'static) -> &Self {
        self.on(Listener::tick(callback))
    }

    pub fn on_finish(&self, callback: impl FnMut() + 'static) -> &Self {
        self.on(Listener::finish(callback))
    }

    /// Plays forwards. Does nothing while a run is pending or in progress.
    pub fn play(&self) {
        self.play_in(Direction::Forward);
    }

    /// Plays backwards, from progress 1 to 0.
    pub fn reverse(&self) {
        self.play_in(Direction::Reverse);
    }

    pub fn play_in(&self, direction: Direction) {
        let generation = {
            let mut state = self.state.borrow_mut();
            if state.phase != RunPhase::Idle {
                return;
            }
            state.generation += 1;
            state.phase = RunPhase::Pending { direction };
            state.generation
        };
        self.schedule(generation);
    }

    /// Cancels the pending frame and every pending bounce relaunch.
    ///
    /// Progress is discarded; the next `play` starts a fresh run.
    pub fn stop(&self) {
        let (frame, timers) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.phase = RunPhase::Idle;
            (state.frame.take(), std::mem::take(&mut state.bounce_timers))
        };
        if let Some(frame) = frame {
            self.host.cancel_frame(frame);
        }
        for timer in timers {
            self.host.clear_timeout(timer);
        }
    }

    /// Plays forwards, then after every finish waits `delay_ms` and plays in
    /// the opposite direction, indefinitely.
    ///
    /// Each call registers its own finish listener, so calling it twice on
    /// the same animation makes two relaunch attempts per finish.
    pub fn bounce(&self, delay_ms: f64) -> &Self {
        let cycles = {
            let mut state = self.state.borrow_mut();
            state.bounce_cycles += 1;
            state.bounce_cycles
        };
        if cycles > 1 {
            tracing::warn!(cycles, "bounce registered again; finish listeners accumulate");
        }

        self.play();

        let weak = Rc::downgrade(&self.state);
        let host = self.host.clone();
        let parity = Rc::new(Cell::new(0_u64));
        self.on_finish(move || {
            let timer_state = weak.clone();
            let timer_host = host.clone();
            let parity = parity.clone();
            let own_id = Rc::new(Cell::new(None::<TimerId>));
            let fired_id = own_id.clone();
            let timer = host.set_timeout(
                delay_ms,
                Box::new(move || {
                    let Some(anim) = Animation::upgrade(&timer_state, timer_host) else {
                        return;
                    };
                    if let Some(id) = fired_id.get() {
                        anim.state
                            .borrow_mut()
                            .bounce_timers
                            .retain(|pending| *pending != id);
                    }
                    if parity.get() % 2 == 0 {
                        anim.reverse();
                    } else {
                        anim.play();
                    }
                    parity.set(parity.get() + 1);
                }),
            );
            own_id.set(Some(timer));
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().bounce_timers.push(timer);
            }
        })
    }

    /// Whether a run is pending or in progress.
    pub fn is_running(&self) -> bool {
        self.state.borrow().phase != RunPhase::Idle
    }

    /// Direction of the current run, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self.state.borrow().phase {
            RunPhase::Idle => None,
            RunPhase::Pending { direction } | RunPhase::Running { direction, .. } => {
                Some(direction)
            }
        }
    }

    /// Dumps the animation state at debug level.
    pub fn log(&self) -> &Self {
        tracing::debug!(animation = ?self, "animation state");
        self
    }

    fn upgrade(state: &Weak<RefCell<AnimationState>>, host: Rc<dyn FrameHost>) -> Option<Self> {
        state.upgrade().map(|state| Self { state, host })
    }

    fn schedule(&self, generation: u64) {
        let handle = self.clone();
        let frame = self
            .host
            .request_frame(Box::new(move |timestamp| handle.run(generation, timestamp)));
        self.state.borrow_mut().frame = Some(frame);
    }

    fn run(&self, generation: u64, timestamp: f64) {
        let (start, direction, duration, easing) = {
            let mut state = self.state.borrow_mut();
            if state.generation != generation {
                return;
            }
            state.frame = None;
            let (start, direction) = match state.phase {
                RunPhase::Idle => return,
                RunPhase::Pending { direction } => {
                    state.phase = RunPhase::Running {
                        start: timestamp,
                        direction,
                    };
                    (timestamp, direction)
                }
                RunPhase::Running { start, direction } => (start, direction),
            };
            (start, direction, state.duration_ms, state.easing.clone())
        };

        let runtime = timestamp - start;
        let mut progress = (runtime / duration).min(1.0);
        if direction == Direction::Reverse {
            progress = 1.0 - progress;
        }
        if let Some(easing) = easing {
            progress = easing(progress);
        }

        self.emit(Event::Tick(progress));

        // A tick listener may have stopped or restarted the run.
        if self.state.borrow().generation != generation {
            return;
        }

        if runtime <= duration {
            self.schedule(generation);
        } else {
            self.state.borrow_mut().phase = RunPhase::Idle;
            self.emit(Event::Finish);
        }
    }

    fn emit(&self, event: Event) {
        // Listeners may call back into the animation, so none of the state
        // is borrowed while they run.
        let mut listeners = std::mem::take(&mut self.state.borrow_mut().listeners);
        for listener in &mut listeners {
            match (listener, event) {
                (Listener::Tick(callback), Event::Tick(progress)) => callback(progress),
                (Listener::Finish(callback), Event::Finish) => callback(),
                _ => {}
            }
        }

        let mut state = self.state.borrow_mut();
        listeners.append(&mut state.listeners);
        state.listeners = listeners;
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Animation")
            .field("duration_ms", &state.duration_ms)
            .field("eased", &state.easing.is_some())
            .field("phase", &state.phase)
            .field("listeners", &state.listeners.len())
            .field("generation", &state.generation)
            .finish()
    }
}
