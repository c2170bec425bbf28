//! Split-range actuator mapping
//!
//! One regulator output drives two actuators over disjoint portions of its
//! range: the damper tracks the full 0-100 %, the fan only assists above a
//! configurable threshold. A small fire is managed on airflow restriction
//! alone; forced air comes in when the damper is not enough.

/// Map a regulator output to (damper %, fan %)
///
/// `fan_on_threshold` must be in (0, 100). Output is clamped to 0-100
/// before mapping.
pub fn split_range(output: f32, fan_on_threshold: f32) -> (f32, f32) {
    let u = output.clamp(0.0, 100.0);

    let damper = u;
    let fan = if u <= fan_on_threshold {
        0.0
    } else {
        (u - fan_on_threshold) / (100.0 - fan_on_threshold) * 100.0
    };

    (damper, fan)
}
