//! Decimal-safe arithmetic and numeric formatting helpers.
//!
//! Binary floating point cannot represent most decimal fractions exactly, so
//! naive `0.1 + 0.2` yields `0.30000000000000004`. [`add`] and [`subtract`]
//! avoid the artifact by scaling both operands to integers by a shared power
//! of ten, combining in the integer domain, and rescaling.

use rand::Rng;

/// Number of digits after the decimal separator in the value's shortest
/// decimal representation. Zero for integers and non-finite values.
fn fraction_digits(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    match format!("{}", value).split_once('.') {
        Some((_, frac)) => frac.len() as u32,
        None => 0,
    }
}

/// The scale factor shared by a pair of operands: ten to the larger of their
/// fraction digit counts.
fn scale_for(a: f64, b: f64) -> f64 {
    10f64.powi(fraction_digits(a).max(fraction_digits(b)) as i32)
}

/// Decimal-safe addition.
///
/// Both operands are shifted to integers by the shared scale factor, added,
/// and shifted back, so `add(0.1, 0.2)` is exactly `0.3`. Signs carry through
/// the scaling unchanged; non-finite operands propagate per IEEE rules
/// (`NaN` or infinite result, never a panic).
///
/// Operands whose scaled magnitude exceeds f64's exact-integer range can
/// still lose precision. That limitation is accepted, not corrected.
///
/// # Examples
/// ```
/// use satchel::calc::add;
/// assert_eq!(add(0.1, 0.2), 0.3);
/// assert_eq!(add(1.0, 2.0), 3.0);
/// ```
pub fn add(a: f64, b: f64) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return a + b;
    }
    let scale = scale_for(a, b);
    ((a * scale).round() + (b * scale).round()) / scale
}

/// Decimal-safe subtraction.
///
/// Same scaling scheme as [`add`].
///
/// # Examples
/// ```
/// use satchel::calc::subtract;
/// assert_eq!(subtract(1.5, 0.3), 1.2);
/// ```
pub fn subtract(a: f64, b: f64) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return a - b;
    }
    let scale = scale_for(a, b);
    ((a * scale).round() - (b * scale).round()) / scale
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let power = 10f64.powi(decimals as i32);
    (value * power).round() / power
}

/// Render a number with thousands separators and a fixed number of decimals.
///
/// # Examples
/// ```
/// use satchel::calc::format_thousands;
/// assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
/// ```
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Uniform random value in `[min, max)`, rounded to `decimals` places.
///
/// Takes the generator as a parameter so callers can seed for
/// reproducibility.
///
/// # Examples
/// ```
/// use rand::SeedableRng;
/// use satchel::calc::random_in_range;
/// let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
/// let v = random_in_range(1.0, 5.0, 2, &mut rng);
/// assert!((1.0..5.0).contains(&v));
/// ```
pub fn random_in_range<R: Rng>(min: f64, max: f64, decimals: u32, rng: &mut R) -> f64 {
    let raw = rng.random::<f64>() * (max - min) + min;
    round_to(raw, decimals)
}
