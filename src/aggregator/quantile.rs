//! Nearest-rank quantiles.
//!
//! `quantile(q) = sorted[floor(q * n)]`, no interpolation. An off-by-one
//! here shifts every reported percentile.

use crate::utils::error::QuantileError;

/// Compute nearest-rank quantiles of `samples`
///
/// **Public** - used by the statistics reporter
///
/// # Arguments
/// * `samples` - unordered sample set; copied, never reordered in place
/// * `fractions` - quantile fractions, each in `[0, 1)`
///
/// # Returns
/// One value per fraction, in the order of `fractions`
///
/// # Errors
/// * `QuantileError::EmptyInput` - no samples
/// * `QuantileError::InvalidFraction` - a fraction outside `[0, 1)` (or NaN)
///
/// # Example
/// ```ignore
/// let q = quantiles(&[40, 10, 30, 20], &[0.5])?;
/// assert_eq!(q, vec![30]);
/// ```
pub fn quantiles<T>(samples: &[T], fractions: &[f64]) -> Result<Vec<T>, QuantileError>
where
    T: Copy + Ord,
{
    if samples.is_empty() {
        return Err(QuantileError::EmptyInput);
    }

    if let Some(&q) = fractions.iter().find(|q| !(0.0..1.0).contains(*q)) {
        return Err(QuantileError::InvalidFraction(q));
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    Ok(fractions
        .iter()
        .map(|&q| {
            // float rounding can reach n for q just below 1
            let index = ((q * n as f64).floor() as usize).min(n - 1);
            sorted[index]
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_computed_median() {
        let result = quantiles(&[10u64, 20, 30, 40], &[0.5]).unwrap();
        assert_eq!(result, vec![30]);
    }

    #[test]
    fn test_default_fractions_on_unsorted_input() {
        // sorted: 1 2 3 4 5 6 7 8 9 10
        let samples = [7u64, 3, 10, 1, 9, 2, 8, 5, 4, 6];
        let result = quantiles(&samples, &[0.25, 0.5, 0.75, 0.9]).unwrap();
        // indices 2, 5, 7, 9
        assert_eq!(result, vec![3, 6, 8, 10]);
    }

    #[test]
    fn test_index_matches_floor_rule() {
        let sorted: Vec<u64> = (0..7).map(|x| x * 100).collect();
        for &q in &[0.0, 0.25, 0.5, 0.75, 0.9] {
            let expected = sorted[(q * sorted.len() as f64).floor() as usize];
            assert_eq!(quantiles(&sorted, &[q]).unwrap(), vec![expected]);
        }
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(quantiles(&[5u64], &[0.0, 0.9]).unwrap(), vec![5, 5]);
    }

    #[test]
    fn test_empty_input() {
        let empty: [u64; 0] = [];
        assert_eq!(quantiles(&empty, &[0.5]), Err(QuantileError::EmptyInput));
    }

    #[test]
    fn test_invalid_fraction() {
        assert_eq!(
            quantiles(&[1u64, 2], &[0.5, 1.0]),
            Err(QuantileError::InvalidFraction(1.0))
        );
        assert!(matches!(
            quantiles(&[1u64, 2], &[-0.1]),
            Err(QuantileError::InvalidFraction(_))
        ));
        assert!(quantiles(&[1u64, 2], &[f64::NAN]).is_err());
    }

    #[test]
    fn test_input_is_not_reordered() {
        let samples = vec![3u64, 1, 2];
        let _ = quantiles(&samples, &[0.5]).unwrap();
        assert_eq!(samples, vec![3, 1, 2]);
    }
}
