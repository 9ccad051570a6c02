//! Remaps values using a series of linear mappings.
//!
//! Used for the userspace : designspace mapping of an axis.

#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearMap {
    // these two mappings have identical lengths, by construction
    from: Vec<f64>, // sorted, ||'s to
    to: Vec<f64>,   // sorted, ||'s from
}

impl PiecewiseLinearMap {
    /// Create a new map from a series of (from, to) values.
    pub fn new(mut mappings: Vec<(f64, f64)>) -> PiecewiseLinearMap {
        mappings.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        let (from, to): (Vec<_>, Vec<_>) = mappings.into_iter().unzip();
        PiecewiseLinearMap { from, to }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    /// Values outside the mapped range are shifted by the offset of the
    /// nearest mapping; an empty map is the identity.
    pub fn map(&self, value: f64) -> f64 {
        if self.is_empty() {
            return value;
        }
        match self.from.binary_search_by(|probe| probe.total_cmp(&value)) {
            Ok(idx) => self.to[idx],
            Err(0) => value + self.to[0] - self.from[0],
            Err(idx) if idx == self.from.len() => value + self.to[idx - 1] - self.from[idx - 1],
            Err(idx) => {
                let from_lhs = self.from[idx - 1];
                let from_rhs = self.from[idx];
                lerp(
                    self.to[idx - 1],
                    self.to[idx],
                    (value - from_lhs) / (from_rhs - from_lhs),
                )
            }
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}
