//! Weight and volume capacity constraint.

/// Limits the cumulative weight and volume a vehicle may carry.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::CapacityConstraint;
///
/// let c = CapacityConstraint::new(100.0, 2.0);
/// assert!(c.validate(&[(50.0, 1.0), (50.0, 1.0)]));
/// assert!(!c.validate(&[(50.0, 1.0), (60.0, 0.5)]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityConstraint {
    max_weight_kg: f64,
    max_volume_m3: f64,
}

impl CapacityConstraint {
    /// Creates a capacity constraint.
    pub fn new(max_weight_kg: f64, max_volume_m3: f64) -> Self {
        Self {
            max_weight_kg,
            max_volume_m3,
        }
    }

    /// Maximum weight in kilograms.
    pub fn max_weight_kg(&self) -> f64 {
        self.max_weight_kg
    }

    /// Maximum volume in cubic meters.
    pub fn max_volume_m3(&self) -> f64 {
        self.max_volume_m3
    }

    /// Accumulates `(weight, volume)` loads in sequence and fails as soon as
    /// either running total exceeds its limit. An empty sequence passes.
    pub fn validate(&self, loads: &[(f64, f64)]) -> bool {
        let mut weight = 0.0;
        let mut volume = 0.0;
        for &(w, v) in loads {
            weight += w;
            volume += v;
            if weight > self.max_weight_kg || volume > self.max_volume_m3 {
                return false;
            }
        }
        true
    }

    /// Returns `true` if adding `(weight_kg, volume_m3)` to the current
    /// load stays within both limits.
    pub fn admits(
        &self,
        weight_used: f64,
        volume_used: f64,
        weight_kg: f64,
        volume_m3: f64,
    ) -> bool {
        weight_used + weight_kg <= self.max_weight_kg
            && volume_used + volume_m3 <= self.max_volume_m3
    }
}
