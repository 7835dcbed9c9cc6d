use std::time::Duration;

use astroview_core::{FrameFlow, FrameLoop, FrameTick};
use proptest::prelude::*;

const FRAME: Duration = Duration::from_millis(16);

/// Drives the loop the way a windowing host drives redraws: keep ticking
/// while the loop asks for another frame, up to `budget` frames. Returns
/// the number of frames that actually ran.
fn run_host<C>(fl: &mut FrameLoop<C>, ctx: &mut C, budget: usize) -> usize {
    let mut frames = 0;
    let mut now = Duration::ZERO;
    while frames < budget && fl.wants_frame() {
        now += FRAME;
        fl.tick(ctx, now);
        frames += 1;
    }
    frames
}

#[test]
fn test_start_without_functions_requests_no_frames() {
    let mut fl: FrameLoop<u32> = FrameLoop::new();
    fl.start();
    let mut ctx = 0;
    assert_eq!(run_host(&mut fl, &mut ctx, 100), 0);
    assert_eq!(ctx, 0);
}

#[test]
fn test_animation_fn_runs_until_stopped() {
    let mut fl: FrameLoop<u32> = FrameLoop::new();
    fl.add_animation_fn(|count, _| {
        *count += 1;
        FrameFlow::Continue
    });
    fl.start();

    let mut ctx = 0;
    assert_eq!(run_host(&mut fl, &mut ctx, 10), 10, "still hungry for frames");
    assert_eq!(ctx, 10);

    fl.stop();
    assert_eq!(run_host(&mut fl, &mut ctx, 10), 0);
    assert_eq!(ctx, 10, "no callback may run after stop");
}

#[test]
fn test_animation_fn_runs_until_it_finishes() {
    let mut fl: FrameLoop<u32> = FrameLoop::new();
    fl.add_animation_fn(|count, _| {
        *count += 1;
        if *count == 5 {
            FrameFlow::Finish
        } else {
            FrameFlow::Continue
        }
    });
    fl.start();

    let mut ctx = 0;
    let frames = run_host(&mut fl, &mut ctx, 100);
    assert_eq!(frames, 5, "no frame may be requested once the set drained");
    assert_eq!(ctx, 5);
    assert!(fl.is_running(), "finishing a function does not stop the loop");
    assert!(!fl.wants_frame());
}

#[test]
fn test_base_fn_alone_schedules_indefinitely() {
    let mut fl: FrameLoop<u32> = FrameLoop::new();
    fl.add_base_fn(|count, _| *count += 1);
    fl.start();

    let mut ctx = 0;
    assert_eq!(run_host(&mut fl, &mut ctx, 50), 50);
    assert_eq!(ctx, 50);
    assert!(fl.wants_frame());
}

#[test]
fn test_removing_last_animation_fn_halts_frames() {
    let mut fl: FrameLoop<u32> = FrameLoop::new();
    let id = fl.add_animation_fn(|count, _| {
        *count += 1;
        FrameFlow::Continue
    });
    fl.start();

    let mut ctx = 0;
    assert_eq!(run_host(&mut fl, &mut ctx, 3), 3);

    assert!(fl.remove_animation_fn(id));
    assert_eq!(run_host(&mut fl, &mut ctx, 100), 0);
    assert_eq!(ctx, 3);
}

#[test]
fn test_invocation_order_animation_then_base() {
    let mut fl: FrameLoop<Vec<&'static str>> = FrameLoop::new();
    fl.add_animation_fn(|log, _| {
        log.push("anim-1");
        FrameFlow::Continue
    });
    fl.add_animation_fn(|log, _| {
        log.push("anim-2");
        FrameFlow::Continue
    });
    fl.add_base_fn(|log, _| log.push("base-1"));
    fl.add_base_fn(|log, _| log.push("base-2"));
    fl.start();

    let mut log = Vec::new();
    fl.tick(&mut log, FRAME);
    fl.tick(&mut log, FRAME * 2);

    assert_eq!(
        log,
        vec![
            "anim-1", "anim-2", "base-1", "base-2", //
            "anim-1", "anim-2", "base-1", "base-2",
        ]
    );
}

#[test]
fn test_removal_is_idempotent() {
    let mut fl: FrameLoop<()> = FrameLoop::new();
    let id = fl.add_animation_fn(|_, _| FrameFlow::Continue);

    assert!(fl.remove_animation_fn(id));
    assert!(!fl.remove_animation_fn(id));

    // A handle from a different loop was never added here.
    let mut other: FrameLoop<()> = FrameLoop::new();
    let foreign = other.add_base_fn(|_, _| {});
    assert!(!fl.remove_base_fn(foreign));
}

#[test]
fn test_duplicate_adds_get_distinct_handles() {
    let mut fl: FrameLoop<u32> = FrameLoop::new();
    fn bump(count: &mut u32, _tick: FrameTick) -> FrameFlow {
        *count += 1;
        FrameFlow::Continue
    }
    let first = fl.add_animation_fn(bump);
    let second = fl.add_animation_fn(bump);
    assert_ne!(first, second);
    fl.start();

    let mut ctx = 0;
    fl.tick(&mut ctx, FRAME);
    assert_eq!(ctx, 2);

    assert!(fl.remove_animation_fn(first));
    fl.tick(&mut ctx, FRAME * 2);
    assert_eq!(ctx, 3, "the second registration survives the first's removal");
}

#[test]
fn test_delta_resets_across_stop_start() {
    let mut fl: FrameLoop<Vec<Duration>> = FrameLoop::new();
    fl.add_animation_fn(|deltas, tick| {
        deltas.push(tick.delta);
        FrameFlow::Continue
    });
    fl.start();

    let mut deltas = Vec::new();
    fl.tick(&mut deltas, Duration::from_millis(100));
    fl.tick(&mut deltas, Duration::from_millis(116));

    fl.stop();
    fl.start();
    // A long pause while stopped must not bleed into the next delta.
    fl.tick(&mut deltas, Duration::from_millis(5000));
    fl.tick(&mut deltas, Duration::from_millis(5016));

    assert_eq!(
        deltas,
        vec![
            Duration::ZERO,
            Duration::from_millis(16),
            Duration::ZERO,
            Duration::from_millis(16),
        ]
    );
}

#[test]
fn test_panicking_callback_is_isolated() {
    // Silence the default panic hook for the expected panic below.
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));

    let mut fl: FrameLoop<Vec<&'static str>> = FrameLoop::new();
    fl.add_animation_fn(|_, _| -> FrameFlow { panic!("boom") });
    fl.add_animation_fn(|log, _| {
        log.push("anim");
        FrameFlow::Continue
    });
    fl.add_base_fn(|log, _| log.push("base"));
    fl.start();

    let mut log = Vec::new();
    let scheduled = fl.tick(&mut log, FRAME);

    std::panic::set_hook(previous);

    assert_eq!(log, vec!["anim", "base"]);
    assert!(scheduled, "the scheduler survives a panicking callback");
    assert_eq!(
        fl.animation_fn_count(),
        2,
        "a panicking function is not deregistered"
    );
}

#[test]
fn test_elapsed_is_the_host_timestamp() {
    let mut fl: FrameLoop<Vec<Duration>> = FrameLoop::new();
    fl.add_base_fn(|stamps, tick| stamps.push(tick.elapsed));
    fl.start();

    let mut stamps = Vec::new();
    fl.tick(&mut stamps, Duration::from_millis(250));
    fl.tick(&mut stamps, Duration::from_millis(600));
    assert_eq!(
        stamps,
        vec![Duration::from_millis(250), Duration::from_millis(600)]
    );
}

proptest! {
    /// Random add/remove/start/stop interleavings never break the
    /// scheduling invariant reported by `tick` and `wants_frame`.
    #[test]
    fn prop_scheduling_invariant(ops in proptest::collection::vec(0u8..6, 1..64)) {
        let mut fl: FrameLoop<u32> = FrameLoop::new();
        let mut ctx = 0u32;
        let mut anim_ids = Vec::new();
        let mut base_ids = Vec::new();
        let mut now = Duration::ZERO;

        for op in ops {
            match op {
                0 => anim_ids.push(fl.add_animation_fn(|c, _| {
                    *c += 1;
                    FrameFlow::Continue
                })),
                1 => {
                    if let Some(id) = anim_ids.pop() {
                        prop_assert!(fl.remove_animation_fn(id));
                    }
                }
                2 => base_ids.push(fl.add_base_fn(|c, _| *c += 1)),
                3 => {
                    if let Some(id) = base_ids.pop() {
                        prop_assert!(fl.remove_base_fn(id));
                    }
                }
                4 => fl.start(),
                _ => fl.stop(),
            }

            now += FRAME;
            let scheduled = fl.tick(&mut ctx, now);
            prop_assert_eq!(scheduled, fl.wants_frame());
            prop_assert_eq!(
                fl.wants_frame(),
                fl.is_running()
                    && fl.animation_fn_count() + fl.base_fn_count() > 0
            );
            prop_assert_eq!(fl.animation_fn_count(), anim_ids.len());
            prop_assert_eq!(fl.base_fn_count(), base_ids.len());
        }
    }
}
