//! Frame Loop - Idle-Aware Per-Frame Callback Scheduler
//!
//! Drives two ordered sets of callbacks from the host's redraw mechanism:
//! animation functions, which may deregister themselves, and base functions,
//! which run unconditionally after them (typically the render call). The
//! loop never schedules by itself; [`FrameLoop::tick`] reports whether the
//! caller must request another frame, and once nothing is registered no
//! frame is requested and an idle scene costs no CPU.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tracing::{debug, error};

/// Handle to a registered animation function, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationFnId(u64);

/// Handle to a registered base function, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaseFnId(u64);

/// Timing information handed to every callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Host timestamp of this frame (monotonic, arbitrary epoch).
    pub elapsed: Duration,
    /// Time since the previous frame this loop ran; zero on the first
    /// frame after [`FrameLoop::start`].
    pub delta: Duration,
}

/// An animation function's verdict for the frame it just ran.
///
/// `Finish` is the only self-deregistration signal; a function that merely
/// has nothing to do this frame returns `Continue` and stays registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameFlow {
    /// Keep the function registered.
    #[default]
    Continue,
    /// Remove the function after this invocation.
    Finish,
}

type AnimationFn<C> = Box<dyn FnMut(&mut C, FrameTick) -> FrameFlow>;
type BaseFn<C> = Box<dyn FnMut(&mut C, FrameTick)>;

/// Per-frame callback scheduler, generic over a caller-owned context `C`
/// that every callback receives as `&mut C`.
///
/// The loop is an explicit object owned by the component composing it;
/// create as many independent instances as needed. Callbacks never see the
/// loop itself, so the function sets cannot change in the middle of a
/// frame; all registration happens from the driving thread between ticks.
pub struct FrameLoop<C> {
    running: bool,
    last_tick: Option<Duration>,
    next_id: u64,
    animation_fns: Vec<(u64, AnimationFn<C>)>,
    base_fns: Vec<(u64, BaseFn<C>)>,
}

impl<C> FrameLoop<C> {
    /// Create a stopped loop with no registered functions.
    pub fn new() -> Self {
        Self {
            running: false,
            last_tick: None,
            next_id: 1,
            animation_fns: Vec::new(),
            base_fns: Vec::new(),
        }
    }

    /// Append an animation function.
    ///
    /// Registration has no immediate effect on scheduling; frames are only
    /// produced while the loop is running. The same closure may be added
    /// more than once; each registration gets its own handle.
    pub fn add_animation_fn(
        &mut self,
        f: impl FnMut(&mut C, FrameTick) -> FrameFlow + 'static,
    ) -> AnimationFnId {
        let id = self.next_id;
        self.next_id += 1;
        self.animation_fns.push((id, Box::new(f)));
        AnimationFnId(id)
    }

    /// Remove an animation function. No-op (returning `false`) when the
    /// handle is not registered, so double removal is harmless.
    pub fn remove_animation_fn(&mut self, id: AnimationFnId) -> bool {
        let before = self.animation_fns.len();
        self.animation_fns.retain(|(fid, _)| *fid != id.0);
        before != self.animation_fns.len()
    }

    /// Append a base function, invoked every ticked frame after all
    /// animation functions, whether or not any animation is registered.
    pub fn add_base_fn(&mut self, f: impl FnMut(&mut C, FrameTick) + 'static) -> BaseFnId {
        let id = self.next_id;
        self.next_id += 1;
        self.base_fns.push((id, Box::new(f)));
        BaseFnId(id)
    }

    /// Remove a base function. No-op (returning `false`) when absent.
    pub fn remove_base_fn(&mut self, id: BaseFnId) -> bool {
        let before = self.base_fns.len();
        self.base_fns.retain(|(fid, _)| *fid != id.0);
        before != self.base_fns.len()
    }

    /// Transition to running and reset the delta baseline. Idempotent.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.last_tick = None;
        }
    }

    /// Transition to not running. A redraw already in flight is dropped by
    /// the guard in [`FrameLoop::tick`]; there is no pre-emption of a
    /// callback that is currently executing.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the loop is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the caller should schedule a frame: running and at least
    /// one function (animation or base) registered.
    pub fn wants_frame(&self) -> bool {
        self.running && !(self.animation_fns.is_empty() && self.base_fns.is_empty())
    }

    /// Number of registered animation functions.
    pub fn animation_fn_count(&self) -> usize {
        self.animation_fns.len()
    }

    /// Number of registered base functions.
    pub fn base_fn_count(&self) -> usize {
        self.base_fns.len()
    }

    /// Run one frame at host timestamp `now`.
    ///
    /// Invokes all animation functions in insertion order, removing those
    /// that return [`FrameFlow::Finish`], then all base functions in
    /// insertion order. A panicking callback is caught and logged; the
    /// remaining callbacks of the frame still run and the offender stays
    /// registered. Returns whether the caller must schedule another frame.
    /// While stopped the frame is dropped: nothing runs and `false` is
    /// returned.
    pub fn tick(&mut self, ctx: &mut C, now: Duration) -> bool {
        if !self.running {
            return false;
        }

        let delta = match self.last_tick {
            Some(prev) => now.saturating_sub(prev),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);
        let tick = FrameTick {
            elapsed: now,
            delta,
        };

        let mut i = 0;
        while i < self.animation_fns.len() {
            let id = self.animation_fns[i].0;
            let outcome = {
                let f = &mut self.animation_fns[i].1;
                catch_unwind(AssertUnwindSafe(|| f(&mut *ctx, tick)))
            };
            match outcome {
                Ok(FrameFlow::Continue) => i += 1,
                Ok(FrameFlow::Finish) => {
                    debug!("Animation function {} finished", id);
                    self.animation_fns.remove(i);
                }
                Err(_) => {
                    error!("Animation function {} panicked; skipping it this frame", id);
                    i += 1;
                }
            }
        }

        for (id, f) in &mut self.base_fns {
            if catch_unwind(AssertUnwindSafe(|| f(&mut *ctx, tick))).is_err() {
                error!("Base function {} panicked; skipping it this frame", id);
            }
        }

        self.wants_frame()
    }
}

impl<C> Default for FrameLoop<C> {
    fn default() -> Self {
        Self::new()
    }
}
