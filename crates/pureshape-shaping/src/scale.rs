// this_file: crates/pureshape-shaping/src/scale.rs

//! Final font-units to output-units conversion.

use pureshape_core::Fixed;

/// Linear map `value * size / units_per_em`, rounded once to the nearest 1/1024.
///
/// Without a size, values are reported in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaler {
    factor: Option<f64>,
}

impl Scaler {
    pub fn new(units_per_em: u16, size: Option<f32>) -> Self {
        let factor = size
            .filter(|size| size.is_finite() && *size > 0.0)
            .map(|size| f64::from(size) / f64::from(units_per_em.max(1)));
        Self { factor }
    }

    /// Identity scaler (font units)
    pub fn font_units() -> Self {
        Self { factor: None }
    }

    pub fn scale(&self, units: i32) -> Fixed {
        match self.factor {
            Some(factor) => Fixed::from_f64(f64::from(units) * factor),
            None => Fixed::from_int(units),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_font_units_passthrough() {
        let scaler = Scaler::new(1000, None);
        assert_eq!(scaler.scale(-50), Fixed::from_int(-50));
        assert_eq!(Scaler::font_units(), scaler);
    }

    #[test]
    fn test_scaling() {
        let scaler = Scaler::new(1000, Some(96.0));
        assert_relative_eq!(scaler.scale(500).to_f64(), 48.0);
        assert_relative_eq!(scaler.scale(-50).to_f64(), -4.8, epsilon = 1.0 / 1024.0);
    }

    #[test]
    fn test_double_size_doubles_values() {
        let small = Scaler::new(2048, Some(13.0));
        let large = Scaler::new(2048, Some(26.0));
        for units in [1, 7, 333, 1229, -87] {
            let a = small.scale(units).to_bits();
            let b = large.scale(units).to_bits();
            assert!((b - 2 * a).abs() <= 1, "{units}: {a} vs {b}");
        }
    }

    #[test]
    fn test_invalid_size_falls_back_to_font_units() {
        assert_eq!(Scaler::new(1000, Some(0.0)), Scaler::font_units());
        assert_eq!(Scaler::new(1000, Some(f32::NAN)), Scaler::font_units());
    }
}
