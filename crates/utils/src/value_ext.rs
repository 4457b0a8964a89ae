use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Better scientific number formatting
    ///
    /// Rust's `{:e}` formatting drops the exponent sign and padding, which is
    /// awkward for column-aligned text outputs. This always writes a signed
    /// exponent padded to at least `exp_pad` digits.
    ///
    /// Works for anything implementing `LowerExp`. Non-finite values have no
    /// exponent and are returned as-is (`NaN`, `inf`, `-inf`).
    ///
    /// ```rust
    /// # use nkinetics_utils::ValueExt;
    /// assert_eq!((-1.0).sci(5, 2), "-1.00000e+00");
    /// assert_eq!((0.00125).sci(3, 2), "1.250e-03");
    /// assert_eq!((6.02e23).sci(2, 3), "6.02e+023");
    /// assert_eq!(f64::NAN.sci(5, 2), "NaN");
    /// ```
    ///
    /// With `precision = 16` an `f64` keeps 17 significant digits, which is
    /// enough for the text to parse back to the identical value.
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let formatted = f!("{:.precision$e}", &self, precision = precision);

        let Some((mantissa, exponent)) = formatted.split_once('e') else {
            return formatted;
        };

        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };

        f!("{mantissa}e{sign}{digits:0>exp_pad$}")
    }
}
