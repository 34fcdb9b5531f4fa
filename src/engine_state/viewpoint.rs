//! # Viewpoint
//!
//! A scripted observer for driving the world without input handling: it flies
//! at a constant speed along its heading, turning at a constant rate.

use cgmath::{InnerSpace, Point3, Rad, Vector3};
use web_time::Duration;

/// A moving observer in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    /// Current position in world space
    pub position: Point3<f32>,
    /// Heading around the Y axis; zero points along +X
    pub yaw: Rad<f32>,
    /// Blocks per second along the heading
    pub speed: f32,
    /// Change of heading per second
    pub turn_rate: Rad<f32>,
}

impl Viewpoint {
    /// Creates a viewpoint flying in a straight line.
    ///
    /// # Arguments
    /// * `position` - Start position. Can be any type that converts to `Point3<f32>`.
    /// * `yaw` - Heading. Can be any type that converts to `Rad<f32>`.
    /// * `speed` - Blocks per second
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>>(position: V, yaw: Y, speed: f32) -> Self {
        Viewpoint {
            position: position.into(),
            yaw: yaw.into(),
            speed,
            turn_rate: Rad(0.0),
        }
    }

    /// A viewpoint that stays where it is.
    pub fn stationary<V: Into<Point3<f32>>>(position: V) -> Self {
        Viewpoint::new(position, Rad(0.0), 0.0)
    }

    /// Sets the turn rate.
    pub fn with_turn_rate<R: Into<Rad<f32>>>(mut self, turn_rate: R) -> Self {
        self.turn_rate = turn_rate.into();
        self
    }

    /// Unit vector of the horizontal heading.
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        Vector3::new(yaw_cos, 0.0, yaw_sin).normalize()
    }

    /// Moves the viewpoint by `dt` worth of travel and turning.
    pub fn advance(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();
        self.position += self.forward() * self.speed * dt;
        self.yaw += self.turn_rate * dt;
    }
}
