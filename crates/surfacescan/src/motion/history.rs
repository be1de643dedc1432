use std::collections::VecDeque;

/// Bounded rolling window of acceleration magnitudes.
#[derive(Debug, Clone)]
pub struct MagnitudeHistory {
    values: VecDeque<f64>,
    capacity: usize,
}

impl MagnitudeHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a magnitude, evicting the oldest once full.
    pub fn push(&mut self, magnitude: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(magnitude);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Population variance of the stored magnitudes (0 when empty).
    pub fn variance(&self) -> f64 {
        let n = self.values.len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.values.iter().sum::<f64>() / n as f64;
        self.values
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64
    }

    /// Stability score in [0, 100]; an empty window has no evidence and scores 0.
    pub fn stability_score(&self, variance_scale: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (100.0 - self.variance() * variance_scale).clamp(0.0, 100.0)
    }
}
