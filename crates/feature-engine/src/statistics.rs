//! Column Statistics

use dataset::CarFeatures;

/// Summary statistics for a numeric column
#[derive(Debug, Clone, Default)]
pub struct StatisticalFeatures {
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Number of values
    pub count: usize,
}

impl StatisticalFeatures {
    /// Compute statistical features from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;

        // Mean
        let mean = values.iter().sum::<f64>() / n;

        // Min/Max
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        // Population variance (ddof = 0)
        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        Self {
            mean,
            std_dev,
            min,
            max,
            count: values.len(),
        }
    }

    /// Extract model years
    pub fn extract_year(records: &[&CarFeatures]) -> Vec<f64> {
        records.iter().map(|f| f.year as f64).collect()
    }

    /// Extract odometer readings
    pub fn extract_mileage(records: &[&CarFeatures]) -> Vec<f64> {
        records.iter().map(|f| f.mileage as f64).collect()
    }

    /// Extract engine displacement
    pub fn extract_engine_size(records: &[&CarFeatures]) -> Vec<f64> {
        records.iter().map(|f| f.engine_size).collect()
    }

    /// Extract horsepower
    pub fn extract_horsepower(records: &[&CarFeatures]) -> Vec<f64> {
        records.iter().map(|f| f.horsepower as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.mean - 3.0).abs() < 0.001);
        assert_eq!(stats.count, 5);
    }

    #[test]
    fn test_std_dev_computation() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_constant_column() {
        let stats = StatisticalFeatures::compute(&[7.0, 7.0, 7.0]);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_empty_values() {
        let values: Vec<f64> = vec![];
        let stats = StatisticalFeatures::compute(&values);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.count, 0);
    }
}
