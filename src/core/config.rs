//! Kinematic parameters shared by all terms of a trajectory graph.

use crate::error::{KinematicsError, KinematicsResult};

/// Read-only kinematic parameters of the robot.
///
/// A configuration is created once, shared behind an `Arc`, and bound to
/// every kinematics term before the graph is first evaluated. Terms never
/// mutate it.
///
/// # Example
///
/// ```
/// use kinematic_factors::KinematicsConfig;
///
/// let config = KinematicsConfig::new(1.0).unwrap();
/// assert_eq!(config.min_turning_radius(), 1.0);
///
/// assert!(KinematicsConfig::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicsConfig {
    /// Minimum turning radius of a car-like robot (meters)
    min_turning_radius: f64,
}

impl KinematicsConfig {
    /// Create a configuration with the given minimum turning radius.
    ///
    /// # Returns
    ///
    /// `Ok(KinematicsConfig)` if `min_turning_radius > 0`, otherwise an error.
    /// Callers that need slack on the turning-radius bound inflate this value
    /// directly; the bound itself carries no margin.
    pub fn new(min_turning_radius: f64) -> KinematicsResult<Self> {
        if min_turning_radius.is_nan() || min_turning_radius <= 0.0 {
            return Err(KinematicsError::InvalidInput(format!(
                "min_turning_radius must be > 0, got {min_turning_radius}"
            )));
        }
        Ok(Self { min_turning_radius })
    }

    pub fn min_turning_radius(&self) -> f64 {
        self.min_turning_radius
    }
}
