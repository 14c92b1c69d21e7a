//! Flappy Combat - combat and entity simulation core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (player, bosses, weapons, projectiles, collisions)
//! - `audio`: Symbolic cue boundary between the simulation and a sound backend
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod audio;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Simulation frames per second
    pub const FPS: u32 = 30;
    /// Wall-clock length of one simulated frame
    pub const FRAME_DT: Duration = Duration::from_micros(1_000_000 / FPS as u64);

    /// Window dimensions
    pub const WINDOW_WIDTH: f32 = 350.0;
    pub const WINDOW_HEIGHT: f32 = 600.0;
    /// Playable height above the floor strip (floor line)
    pub const VIEWPORT_HEIGHT: f32 = 480.0;

    /// Bird sprite size before any size modifier
    pub const PLAYER_WIDTH: f32 = 34.0;
    pub const PLAYER_HEIGHT: f32 = 24.0;
    /// Horizontal anchor of the bird (fraction of window width)
    pub const PLAYER_X_FRACTION: f32 = 0.2;
}

/// Window the simulation culls against
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// y coordinate of the floor line
    pub floor_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: consts::WINDOW_WIDTH,
            height: consts::WINDOW_HEIGHT,
            floor_y: consts::VIEWPORT_HEIGHT,
        }
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Velocity vector for a heading (radians) at a fixed speed
#[inline]
pub fn heading_velocity(heading: f32, speed: f32) -> Vec2 {
    Vec2::new(speed * heading.cos(), speed * heading.sin())
}

/// Heading (radians) of a velocity vector
#[inline]
pub fn velocity_heading(vel: Vec2) -> f32 {
    vel.y.atan2(vel.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI + 0.5) - (-PI + 0.5)).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_angle_stays_in_range() {
        for i in -40..=40 {
            let wrapped = normalize_angle(i as f32 * 0.7);
            assert!((-PI..PI).contains(&wrapped), "{wrapped}");
        }
    }

    #[test]
    fn test_heading_round_trip() {
        let vel = heading_velocity(0.4, 7.0);
        assert!((vel.length() - 7.0).abs() < 1e-4);
        assert!((velocity_heading(vel) - 0.4).abs() < 1e-5);
    }
}
