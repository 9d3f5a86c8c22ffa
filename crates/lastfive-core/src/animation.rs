//! Risk score count-up animation
//!
//! The UI loop calls [`AnimationController::step`] on every frame event. Each call
//! recomputes progress from the monotonic clock, so dropped or late frames only
//! lower the frame rate, never the accuracy of the final value.

use std::time::{Duration, Instant};

/// Length of the count-up
pub const ANIMATION_WINDOW: Duration = Duration::from_millis(1500);

/// Cubic ease-out of `target` at `progress` (clamped to 0..=1).
pub fn eased_value(target: u8, progress: f64) -> u8 {
    let progress = progress.clamp(0.0, 1.0);
    let eased = 1.0 - (1.0 - progress).powi(3);
    (target as f64 * eased).round() as u8
}

pub fn progress(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() / ANIMATION_WINDOW.as_secs_f64()).clamp(0.0, 1.0)
}

/// The value a rendered report shows for its score.
///
/// Bound to the generation of the animation that created it; only that
/// animation may write to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDisplay {
    generation: u64,
    value: u8,
}

impl ScoreDisplay {
    pub fn value(&self) -> u8 {
        self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Running(u8),
    Finished(u8),
    /// The display belongs to an older animation and was left untouched
    Superseded,
}

#[derive(Debug, Clone, Copy)]
struct ActiveAnimation {
    generation: u64,
    target: u8,
    started: Instant,
}

#[derive(Debug, Default)]
pub struct AnimationController {
    generation: u64,
    active: Option<ActiveAnimation>,
}

impl AnimationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh animation towards `target`, superseding any running one.
    pub fn animate(&mut self, target: u8, now: Instant) -> ScoreDisplay {
        self.generation += 1;
        self.active = Some(ActiveAnimation {
            generation: self.generation,
            target,
            started: now,
        });

        ScoreDisplay {
            generation: self.generation,
            value: 0,
        }
    }

    /// Advance `display` to the value for `now`.
    pub fn step(&mut self, display: &mut ScoreDisplay, now: Instant) -> FrameOutcome {
        let Some(active) = self.active.filter(|a| a.generation == display.generation) else {
            return FrameOutcome::Superseded;
        };

        let progress = progress(now.saturating_duration_since(active.started));
        display.value = eased_value(active.target, progress);

        if progress >= 1.0 {
            self.active = None;
            FrameOutcome::Finished(display.value)
        } else {
            FrameOutcome::Running(display.value)
        }
    }

    /// Stop the running animation; its display will not be written again.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.active = None;
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Whether `display` belongs to the latest animation
    pub fn is_current(&self, display: &ScoreDisplay) -> bool {
        display.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        for target in [0u8, 1, 58, 99, 100] {
            assert_eq!(eased_value(target, 0.0), 0);
            assert_eq!(eased_value(target, 1.0), target);
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(progress(Duration::ZERO), 0.0);
        assert_eq!(progress(Duration::from_millis(750)), 0.5);
        assert_eq!(progress(Duration::from_secs(10)), 1.0);
        assert_eq!(eased_value(80, 3.0), 80);
        assert_eq!(eased_value(80, -1.0), 0);
    }

    #[test]
    fn test_ease_out_is_monotonic_and_front_loaded() {
        let mut last = 0;
        for step in 0..=100 {
            let value = eased_value(100, step as f64 / 100.0);
            assert!(value >= last);
            last = value;
        }
        // 1 - 0.5^3 = 0.875
        assert_eq!(eased_value(100, 0.5), 88);
    }

    #[test]
    fn test_animation_runs_to_target() {
        let start = Instant::now();
        let mut controller = AnimationController::new();
        let mut display = controller.animate(58, start);
        assert_eq!(display.value(), 0);

        assert_eq!(controller.step(&mut display, start), FrameOutcome::Running(0));
        let mid = controller.step(&mut display, start + Duration::from_millis(750));
        assert_eq!(mid, FrameOutcome::Running(51));
        assert_eq!(
            controller.step(&mut display, start + ANIMATION_WINDOW),
            FrameOutcome::Finished(58)
        );
        assert_eq!(display.value(), 58);
        assert!(!controller.is_running());
        assert!(controller.is_current(&display));
    }

    #[test]
    fn test_superseded_display_is_never_written() {
        let start = Instant::now();
        let mut controller = AnimationController::new();
        let mut old = controller.animate(90, start);
        controller.step(&mut old, start + Duration::from_millis(300));
        let frozen = old;

        let mut new = controller.animate(40, start + Duration::from_millis(400));
        assert_eq!(
            controller.step(&mut old, start + Duration::from_millis(1200)),
            FrameOutcome::Superseded
        );
        assert_eq!(old, frozen);
        assert!(!controller.is_current(&old));

        assert_eq!(
            controller.step(&mut new, start + Duration::from_secs(5)),
            FrameOutcome::Finished(40)
        );
    }

    #[test]
    fn test_cancel_stops_animation() {
        let start = Instant::now();
        let mut controller = AnimationController::new();
        let mut display = controller.animate(70, start);
        controller.cancel();
        assert_eq!(
            controller.step(&mut display, start + ANIMATION_WINDOW),
            FrameOutcome::Superseded
        );
        assert_eq!(display.value(), 0);
    }
}
