use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
///
/// Every statistic is checked. Empty slices, slices too short for the
/// requested degrees of freedom, and slices containing `NaN` or infinite
/// values all return an error rather than propagating garbage.
pub trait SliceExt<T> {
    /// Arithmetic mean of the values
    ///
    /// ```rust
    /// # use nkinetics_utils::SliceExt;
    /// # use nkinetics_utils::Error;
    /// assert_eq!([1.0, 2.0, 3.0, 4.0].try_mean(), Ok(2.5));
    ///
    /// // Error cases
    /// assert_eq!([1.0, f64::NAN].try_mean(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_mean(), Err(Error::SliceContainsNoValues));
    /// ```
    fn try_mean(&self) -> Result<T>;

    /// Variance with `ddof` delta degrees of freedom
    ///
    /// The divisor is `n - ddof`, so `ddof = 0` is the population variance and
    /// `ddof = 1` the unbiased sample variance. A two-pass algorithm is used
    /// for numerical stability.
    ///
    /// ```rust
    /// # use nkinetics_utils::SliceExt;
    /// # use nkinetics_utils::Error;
    /// let values = [1.0, 2.0, 3.0, 4.0];
    /// assert_eq!(values.try_variance(0), Ok(1.25));
    /// assert_eq!(values.try_variance(1), Ok(5.0 / 3.0));
    ///
    /// // Need at least ddof + 1 values
    /// assert_eq!(
    ///     [1.0].try_variance(1),
    ///     Err(Error::BelowMinimumSliceLength { length: 1, minimum_required: 2 })
    /// );
    /// ```
    fn try_variance(&self, ddof: usize) -> Result<T>;

    /// Covariance with another slice of identical length
    ///
    /// Uses the same `n - ddof` divisor as [SliceExt::try_variance()], so the
    /// covariance of a slice with itself is exactly its variance.
    ///
    /// ```rust
    /// # use nkinetics_utils::SliceExt;
    /// let a = [1.0, 2.0, 3.0, 4.0];
    /// assert_eq!(a.try_covariance(&a, 0), a.try_variance(0));
    /// assert_eq!(a.try_covariance(&[4.0, 3.0, 2.0, 1.0], 0), Ok(-1.25));
    /// assert!(a.try_covariance(&[1.0], 0).is_err());
    /// ```
    fn try_covariance(&self, other: &[T], ddof: usize) -> Result<T>;

    /// Standard error of the mean
    ///
    /// Calculated as the sample standard deviation (`ddof = 1`) divided by
    /// the square root of the number of values.
    ///
    /// ```rust
    /// # use nkinetics_utils::SliceExt;
    /// let values = [2.0, 4.0, 6.0];
    /// assert_eq!(values.try_std_error(), Ok(2.0 / 3.0_f64.sqrt()));
    /// ```
    fn try_std_error(&self) -> Result<T>;
}

impl SliceExt<f64> for [f64] {
    fn try_mean(&self) -> Result<f64> {
        check_values(self, 1)?;
        Ok(self.iter().sum::<f64>() / self.len() as f64)
    }

    fn try_variance(&self, ddof: usize) -> Result<f64> {
        check_values(self, ddof + 1)?;
        let mean = self.try_mean()?;
        let sum_sq = self.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
        Ok(sum_sq / (self.len() - ddof) as f64)
    }

    fn try_covariance(&self, other: &[f64], ddof: usize) -> Result<f64> {
        if self.len() != other.len() {
            return Err(Error::MismatchedSliceLengths {
                left: self.len(),
                right: other.len(),
            });
        }

        check_values(self, ddof + 1)?;
        check_values(other, ddof + 1)?;

        let mean_a = self.try_mean()?;
        let mean_b = other.try_mean()?;
        let sum_prod = self
            .iter()
            .zip(other)
            .map(|(a, b)| (a - mean_a) * (b - mean_b))
            .sum::<f64>();

        Ok(sum_prod / (self.len() - ddof) as f64)
    }

    fn try_std_error(&self) -> Result<f64> {
        let std = self.try_variance(1)?.sqrt();
        Ok(std / (self.len() as f64).sqrt())
    }
}

/// Common guard for every statistic
fn check_values(values: &[f64], minimum_required: usize) -> Result<()> {
    if values.is_empty() {
        return Err(Error::SliceContainsNoValues);
    }

    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::SliceContainsUndefinedValues);
    }

    if values.len() < minimum_required {
        return Err(Error::BelowMinimumSliceLength {
            length: values.len(),
            minimum_required,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_matches_hand_calculation() {
        // deviations from 5.0 are -3, -1, 1, 3
        let values = [2.0, 4.0, 6.0, 8.0];
        assert_eq!(values.try_variance(0), Ok(5.0));
        assert_eq!(values.try_variance(1), Ok(20.0 / 3.0));
    }

    #[test]
    fn constant_slice_has_zero_spread() {
        let values = [3.0; 10];
        assert_eq!(values.try_variance(0), Ok(0.0));
        assert_eq!(values.try_covariance(&values, 0), Ok(0.0));
        assert_eq!(values.try_std_error(), Ok(0.0));
    }

    #[test]
    fn undefined_values_are_rejected() {
        assert_eq!(
            [1.0, f64::INFINITY].try_variance(0),
            Err(Error::SliceContainsUndefinedValues)
        );
        assert_eq!(
            [1.0, 2.0].try_covariance(&[1.0, f64::NAN], 0),
            Err(Error::SliceContainsUndefinedValues)
        );
    }

    #[test]
    fn std_error_needs_two_values() {
        assert_eq!(
            [1.0].try_std_error(),
            Err(Error::BelowMinimumSliceLength {
                length: 1,
                minimum_required: 2
            })
        );
    }

    #[test]
    fn covariance_length_mismatch() {
        assert_eq!(
            [1.0, 2.0, 3.0].try_covariance(&[1.0, 2.0], 0),
            Err(Error::MismatchedSliceLengths { left: 3, right: 2 })
        );
    }
}
