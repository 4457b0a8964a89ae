//! Library of parser functions

// nom parser combinators
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{char, space0};
use nom::combinator::{all_consuming, map, rest};
use nom::multi::many1;
use nom::number::complete::double;
use nom::sequence::{pair, preceded, separated_pair, terminated};
use nom::IResult;

// ! Boolean checks
/// Check for a comment line starting with `#`
pub fn is_header(i: &str) -> bool {
    i.trim_start().starts_with('#')
}

/// Check for a line with nothing but whitespace
pub fn is_blank(i: &str) -> bool {
    i.trim().is_empty()
}

// ! Parser combinators

/// Header entry of the form `# key : value`
///
/// The key runs up to the first ` : `, so values may contain colons.
///
/// ```rust
/// # use nkinetics_feynman::reader::parsers::header_entry;
/// let (_, (key, value)) = header_entry("# timestamp : 2024-01-01 12:00:00 UTC").unwrap();
/// assert_eq!(key, "timestamp");
/// assert_eq!(value, "2024-01-01 12:00:00 UTC");
/// ```
pub fn header_entry(i: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        pair(char('#'), space0),
        separated_pair(
            map(take_until(" : "), str::trim),
            tag(" : "),
            map(rest, str::trim),
        ),
    )(i)
}

/// Whitespace separated row of numbers, consuming the entire line
///
/// ```rust
/// # use nkinetics_feynman::reader::parsers::number_row;
/// let (_, row) = number_row(" 1 2.5e-03  -4.0e+00 ").unwrap();
/// assert_eq!(row, vec![1.0, 2.5e-3, -4.0]);
/// ```
pub fn number_row(i: &str) -> IResult<&str, Vec<f64>> {
    all_consuming(terminated(many1(preceded(space0, double)), space0))(i)
}

/// Count rate entry of the form `mean +/- std_error`
pub fn value_with_error(i: &str) -> IResult<&str, (f64, f64)> {
    all_consuming(separated_pair(
        preceded(space0, double),
        preceded(space0, tag("+/-")),
        terminated(preceded(space0, double), space0),
    ))(i)
}
