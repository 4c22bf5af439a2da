//! Per-group accumulator for numeric aggregations.

/// Single-pass mean and variance (Welford) plus the values themselves for
/// the median.
#[derive(Debug, Clone)]
pub struct MeasureStats {
    count: usize,
    sum: f64,
    mean: f64,
    m2: f64, // Sum of squared differences from mean
    min: f64,
    max: f64,
    values: Vec<f64>,
}

impl MeasureStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            values: Vec::new(),
        }
    }

    /// Add a value using Welford's online algorithm.
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }

        self.values.push(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Sum divided by the number of contributing values.
    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.sum / self.count as f64 }
    }

    pub fn min(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.min }
    }

    pub fn max(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.max }
    }

    /// Sample variance (`n - 1`); zero below two values.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Sample standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Middle value; the mean of the two middle values for even counts.
    pub fn median(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        }
    }
}

impl Default for MeasureStats {
    fn default() -> Self {
        Self::new()
    }
}
