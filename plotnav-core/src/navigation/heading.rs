use crate::geodesy::{normalize_degrees, normalize_signed_degrees};

/// Circular exponential moving average of a heading in degrees.
///
/// The difference to the current estimate is taken the short way round the
/// circle, so 350° followed by 10° moves the estimate forward through north.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadingFilter {
    value: Option<f64>,
}

impl HeadingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current estimate in `[0, 360)`, `None` before the first sample
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Blends `sample` into the estimate with weight `factor` and returns the
    /// new estimate. The first sample is taken as is; non-finite samples are
    /// ignored.
    pub fn update(&mut self, sample: f64, factor: f64) -> Option<f64> {
        if !sample.is_finite() {
            return self.value;
        }
        let next = match self.value {
            None => normalize_degrees(sample),
            Some(current) => {
                let delta = normalize_signed_degrees(sample - current);
                normalize_degrees(current + factor * delta)
            }
        };
        self.value = Some(next);
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}
