//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Replace the magnitude of a value while keeping its sign.
///
/// Zero stays zero whatever the requested magnitude, so a component which is not demanded is
/// never created by this function.
pub fn with_magnitude<T>(value: T, magnitude: T) -> T
where
    T: Float
{
    if value > T::zero() {
        magnitude.abs()
    }
    else if value < T::zero() {
        -magnitude.abs()
    }
    else {
        T::zero()
    }
}

/// Mean of the squared differences between two equal length sequences.
///
/// Returns `None` if the lengths differ or the sequences are empty.
pub fn mean_squared_diff<T>(a: &[T], b: &[T]) -> Option<f64>
where
    T: Copy + Into<f64>
{
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let sum: f64 = a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x.into() - y.into();
            d * d
        })
        .sum();

    Some(sum / a.len() as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_with_magnitude() {
        assert_eq!(with_magnitude(0.5f64, 0.07), 0.07);
        assert_eq!(with_magnitude(-1.0f64, 0.55), -0.55);
        assert_eq!(with_magnitude(-1.0f64, -0.55), -0.55);
        assert_eq!(with_magnitude(0.0f64, 0.35), 0.0);
        assert_eq!(with_magnitude(-0.0f64, 0.35), 0.0);
    }

    #[test]
    fn test_mean_squared_diff() {
        assert_eq!(mean_squared_diff::<u8>(&[10, 10], &[10, 10]), Some(0.0));
        assert_eq!(mean_squared_diff::<u8>(&[0, 10], &[4, 10]), Some(8.0));
        assert_eq!(mean_squared_diff::<u8>(&[0, 10], &[4]), None);
        assert_eq!(mean_squared_diff::<u8>(&[], &[]), None);
    }
}
