//! Parameters structure for MotionPolicy

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the motion policy.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MotionPolicyParams {
    // ---- ACTION TEMPLATES ----
    /// Forward speed of the action templates.
    ///
    /// Units: meters/second
    pub forward_ms: f64,

    /// Turn rate of the action templates.
    ///
    /// Units: radians/second
    pub turn_rads: f64,

    // ---- LOOP OVERRIDES ----
    /// Forward speed used on the inner loop.
    ///
    /// Units: meters/second
    pub inner_forward_ms: f64,

    /// Outer loop forward speed while a plate is nearby.
    ///
    /// Units: meters/second
    pub outer_slow_linear_ms: f64,

    /// Outer loop turn rate while a plate is nearby.
    ///
    /// Units: radians/second
    pub outer_slow_angular_rads: f64,

    /// Inner loop forward speed while a plate is nearby.
    ///
    /// Units: meters/second
    pub inner_slow_linear_ms: f64,

    /// Inner loop turn rate while a plate is nearby.
    ///
    /// Units: radians/second
    pub inner_slow_angular_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MotionPolicyParams {
    fn default() -> Self {
        Self {
            forward_ms: 0.5,
            turn_rads: 1.0,
            inner_forward_ms: 0.5,
            outer_slow_linear_ms: 0.07,
            outer_slow_angular_rads: 0.55,
            inner_slow_linear_ms: 0.35,
            inner_slow_angular_rads: 0.8,
        }
    }
}
