//! 2D trajectory knot: position and heading.

use nalgebra::Vector2;

/// Normalize an angle into `(-pi, pi]`.
///
/// Used wherever heading differences enter a residual, so that a full-circle
/// wrap never inflates the violation.
pub fn normalize_theta(theta: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if theta > -PI && theta <= PI {
        return theta;
    }
    let mut folded = theta % TAU;
    if folded <= -PI {
        folded += TAU;
    } else if folded > PI {
        folded -= TAU;
    }
    folded
}

/// A trajectory knot `(x, y, theta)`.
///
/// Poses are owned and mutated by the trajectory container (and, through it,
/// by the external solver). Kinematics terms reference poses only through
/// [`crate::core::PoseId`] handles and read them during evaluation; a term
/// never owns or mutates a pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    x: f64,
    y: f64,
    theta: f64,
}

impl Pose {
    /// Create a pose; the heading is normalized into `(-pi, pi]`.
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_theta(theta),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Heading angle in `(-pi, pi]`.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Position component as a 2-vector.
    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Unit vector along the heading axis.
    pub fn heading(&self) -> Vector2<f64> {
        Vector2::new(self.theta.cos(), self.theta.sin())
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_theta(&mut self, theta: f64) {
        self.theta = normalize_theta(theta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_normalize_theta_identity_in_range() {
        assert_eq!(normalize_theta(0.0), 0.0);
        assert_eq!(normalize_theta(1.5), 1.5);
        assert_eq!(normalize_theta(-1.5), -1.5);
        assert_eq!(normalize_theta(PI), PI);
    }

    #[test]
    fn test_normalize_theta_wraps() {
        assert!((normalize_theta(PI + 0.1) - (-PI + 0.1)).abs() < TOLERANCE);
        assert!((normalize_theta(-PI - 0.1) - (PI - 0.1)).abs() < TOLERANCE);
        assert!((normalize_theta(3.0 * PI) - PI).abs() < TOLERANCE);
        assert!((normalize_theta(-4.0 * PI)).abs() < TOLERANCE);
    }

    #[test]
    fn test_normalize_theta_half_open_interval() {
        // -pi maps to +pi: the interval is (-pi, pi]
        assert!((normalize_theta(-PI) - PI).abs() < TOLERANCE);
    }

    #[test]
    fn test_pose_accessors() {
        let pose = Pose::new(1.0, -2.0, 0.5);
        assert_eq!(pose.x(), 1.0);
        assert_eq!(pose.y(), -2.0);
        assert_eq!(pose.theta(), 0.5);
        assert_eq!(pose.position(), Vector2::new(1.0, -2.0));

        let heading = pose.heading();
        assert!((heading.x - 0.5f64.cos()).abs() < TOLERANCE);
        assert!((heading.y - 0.5f64.sin()).abs() < TOLERANCE);
    }

    #[test]
    fn test_pose_heading_normalized_on_construction() {
        let pose = Pose::new(0.0, 0.0, 2.0 * PI + 0.25);
        assert!((pose.theta() - 0.25).abs() < TOLERANCE);

        let mut pose = Pose::new(0.0, 0.0, 0.0);
        pose.set_theta(-3.0 * PI);
        assert!((pose.theta() - PI).abs() < TOLERANCE);
    }
}
