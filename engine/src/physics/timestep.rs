//! Frame-rate compensation for the simulation timestep.
//!
//! The physics core is agnostic to wall-clock time; it consumes whatever
//! `dt` it is given. Callers derive that `dt` from a measured-vs-target
//! frame rate ratio so the arena runs at the same apparent speed on slow
//! and fast machines: `dt = frame_rate.step_scale() * DEFAULT_STEP_SCALE`.

use std::time::Instant;

/// Tuning constant multiplied by the speed factor to produce the
/// per-frame simulation timestep.
pub const DEFAULT_STEP_SCALE: f32 = 0.1;

/// Ceiling on the speed factor, so a stalled frame cannot catapult the
/// simulation (and let bodies tunnel arbitrarily far).
pub const MAX_SPEED_FACTOR: f32 = 5.0;

/// Frame counter that resamples FPS about once per second and exposes a
/// clamped `target / measured` speed factor.
#[derive(Debug, Clone)]
pub struct FrameRate {
    /// Frames per second the game is tuned for.
    pub target_fps: f32,
    /// Most recently measured frames per second.
    pub fps: f32,
    /// `target_fps / fps`, clamped to [`MAX_SPEED_FACTOR`].
    pub speed_factor: f32,
    frame_count: u32,
    last_sample: Instant,
}

impl FrameRate {
    /// Start measuring against `target_fps`, assuming on-target speed
    /// until the first sample completes.
    pub fn new(target_fps: f32) -> Self {
        Self {
            target_fps,
            fps: target_fps,
            speed_factor: 1.0,
            frame_count: 0,
            last_sample: Instant::now(),
        }
    }

    /// Count one rendered frame; resamples the FPS estimate once at
    /// least a second has elapsed since the previous sample.
    pub fn tick(&mut self) {
        self.frame_count += 1;
        let elapsed = self.last_sample.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.resample(self.frame_count, elapsed);
            self.frame_count = 0;
            self.last_sample = Instant::now();
        }
    }

    /// Forget all measurements (after a pause or a level change, so the
    /// dead time is not read as a frame-rate collapse).
    pub fn reset(&mut self) {
        self.fps = self.target_fps;
        self.speed_factor = 1.0;
        self.frame_count = 0;
        self.last_sample = Instant::now();
    }

    /// Current frame-rate compensation factor.
    pub fn step_scale(&self) -> f32 {
        self.speed_factor
    }

    fn resample(&mut self, frames: u32, elapsed_secs: f32) {
        self.fps = frames as f32 / elapsed_secs;
        self.speed_factor = (self.target_fps / self.fps).min(MAX_SPEED_FACTOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_unity() {
        let frame_rate = FrameRate::new(30.0);
        assert_eq!(frame_rate.step_scale(), 1.0);
        assert_eq!(frame_rate.fps, 30.0);
    }

    #[test]
    fn test_slow_machine_speeds_simulation_up() {
        let mut frame_rate = FrameRate::new(30.0);
        // 15 frames over one second: half the target rate.
        frame_rate.resample(15, 1.0);
        assert!((frame_rate.fps - 15.0).abs() < 1e-6);
        assert!((frame_rate.speed_factor - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fast_machine_slows_simulation_down() {
        let mut frame_rate = FrameRate::new(30.0);
        frame_rate.resample(120, 1.0);
        assert!((frame_rate.speed_factor - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_speed_factor_is_capped() {
        let mut frame_rate = FrameRate::new(30.0);
        // 1 frame in 2 seconds: uncapped factor would be 60.
        frame_rate.resample(1, 2.0);
        assert_eq!(frame_rate.speed_factor, MAX_SPEED_FACTOR);
    }

    #[test]
    fn test_reset_restores_unity() {
        let mut frame_rate = FrameRate::new(30.0);
        frame_rate.resample(15, 1.0);
        frame_rate.reset();
        assert_eq!(frame_rate.step_scale(), 1.0);
    }
}
