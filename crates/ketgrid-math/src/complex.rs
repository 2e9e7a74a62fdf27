//! Scalar helpers on top of `num_complex::Complex64`.

use num_complex::Complex64;

/// The additive identity.
pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// The multiplicative identity.
pub const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// The imaginary unit.
pub const I: Complex64 = Complex64::new(0.0, 1.0);

/// Check whether two complex numbers agree to within `tolerance`.
#[inline]
pub fn approx_eq(a: Complex64, b: Complex64, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}

/// The argument of `a` in `(-π, π]`, with zero mapped to zero.
///
/// `atan2` of a signed zero can report ±π, which would make empty amplitudes
/// render as half-turned and negative reals land on -π.
#[inline]
pub fn phase_angle(a: Complex64) -> f64 {
    if a.norm_sqr() == 0.0 {
        0.0
    } else {
        // `+ 0.0` turns a negative zero imaginary part positive.
        (a.im + 0.0).atan2(a.re)
    }
}
