//! Solar reference composition.
//!
//! Photospheric mass fractions of Asplund et al. (2009), ARA&A, 47, 481,
//! for hydrogen through zinc. They set the zero points of `[X/H]`.

/// Solar mass fractions, `(symbol, mass fraction)`, ordered by atomic number.
pub const ASPLUND09: [(&str, f64); 30] = [
    ("H", 7.374e-01),
    ("He", 2.492e-01),
    ("Li", 5.696e-11),
    ("Be", 1.582e-10),
    ("B", 3.963e-09),
    ("C", 2.365e-03),
    ("N", 6.928e-04),
    ("O", 5.732e-03),
    ("F", 5.046e-07),
    ("Ne", 1.257e-03),
    ("Na", 2.923e-05),
    ("Mg", 7.079e-04),
    ("Al", 5.563e-05),
    ("Si", 6.648e-04),
    ("P", 5.824e-06),
    ("S", 3.092e-04),
    ("Cl", 8.201e-06),
    ("Ar", 7.341e-05),
    ("K", 3.065e-06),
    ("Ca", 6.414e-05),
    ("Sc", 4.646e-08),
    ("Ti", 3.121e-06),
    ("V", 3.172e-07),
    ("Cr", 1.660e-05),
    ("Mn", 1.082e-05),
    ("Fe", 1.292e-03),
    ("Co", 4.213e-06),
    ("Ni", 7.126e-05),
    ("Cu", 7.200e-07),
    ("Zn", 1.737e-06),
];

/// Solar hydrogen mass fraction.
pub const HYDROGEN: f64 = ASPLUND09[0].1;

/// Looks up the solar mass fraction of an element by symbol.
///
/// The lookup ignores case, so `"fe"`, `"Fe"` and `"FE"` all match.
#[must_use]
pub fn mass_fraction(symbol: &str) -> Option<f64> {
    ASPLUND09
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(symbol))
        .map(|&(_, fraction)| fraction)
}
