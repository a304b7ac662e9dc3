//! Accumulated statistics for ids and plates

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use ndarray::{Array1, Array2, Axis};
use ndarray_stats::QuantileExt;
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Statistics of a single id.
///
/// Before the loop is finalized `probs` holds the elementwise sum of every accepted reading,
/// afterwards it holds their mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdStats {
    pub count: u32,
    pub probs: Array1<f64>,
}

/// Statistics of a single plate string, `probs` has one row per character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateStats {
    pub count: u32,
    pub probs: Array2<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl IdStats {
    pub fn new(probs: Array1<f64>) -> Self {
        Self { count: 1, probs }
    }

    pub fn add(&mut self, probs: &Array1<f64>) {
        self.count += 1;
        self.probs += probs;
    }

    pub fn normalise(&mut self) {
        if self.count > 0 {
            self.probs /= self.count as f64;
        }
    }
}

impl PlateStats {
    pub fn new(probs: Array2<f64>) -> Self {
        Self { count: 1, probs }
    }

    pub fn add(&mut self, probs: &Array2<f64>) {
        self.count += 1;
        self.probs += probs;
    }

    pub fn normalise(&mut self) {
        if self.count > 0 {
            self.probs /= self.count as f64;
        }
    }

    /// The highest probability of each character.
    ///
    /// NaNs are skipped, a row with no valid values reads as zero.
    pub fn char_maxima(&self) -> Vec<f64> {
        self.probs
            .axis_iter(Axis(0))
            .map(|row| {
                let m = *row.max_skipnan();
                if m.is_nan() {
                    0.0
                } else {
                    m
                }
            })
            .collect()
    }

    /// Confidence energy of the plate, the sum of the squared per character maxima.
    pub fn energy(&self) -> f64 {
        self.char_maxima().iter().map(|m| m * m).sum()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_id_stats() {
        let mut s = IdStats::new(arr1(&[0.2, 0.8]));
        s.add(&arr1(&[0.6, 0.4]));
        assert_eq!(s.count, 2);

        s.normalise();
        assert!((s.probs[0] - 0.4).abs() < 1e-12);
        assert!((s.probs[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_plate_energy() {
        let mut s = PlateStats::new(arr2(&[[0.9, 0.1], [0.3, 0.7]]));
        assert_eq!(s.char_maxima(), vec![0.9, 0.7]);
        assert!((s.energy() - (0.81 + 0.49)).abs() < 1e-12);

        s.probs[[1, 0]] = std::f64::NAN;
        s.probs[[1, 1]] = std::f64::NAN;
        assert_eq!(s.char_maxima(), vec![0.9, 0.0]);
    }
}
