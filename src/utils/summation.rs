//! Compensated summation
//!
//! Neumaier's variant of Kahan summation: the running error term also
//! captures the low-order bits lost when the next addend is larger than the
//! running total.

/// Compensated accumulator
#[derive(Debug, Clone, Copy, Default)]
pub struct NeumaierSum {
    sum: f64,
    compensation: f64,
}

impl NeumaierSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Compensated sum of `values`
pub fn stable_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut acc = NeumaierSum::new();
    for v in values {
        acc.add(v);
    }
    acc.total()
}

/// Compensated mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    stable_sum(values.iter().copied()) / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_recovered() {
        // Naive left-to-right summation returns 0.0 here
        let values = [1.0, 1e100, 1.0, -1e100];
        assert_eq!(stable_sum(values), 2.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
    }
}
