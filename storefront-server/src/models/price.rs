//! Item price validation

use super::ValidationError;

/// Validated item price: finite, non-negative, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    /// # Example
    /// ```
    /// use storefront_server::models::Price;
    ///
    /// assert_eq!(Price::new(9.999).unwrap().value(), 10.0);
    /// assert!(Price::new(-0.01).is_err());
    /// ```
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "price",
                reason: "must be a finite number",
            });
        }

        if value < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "price",
                reason: "must not be negative",
            });
        }

        let rounded = (value * 100.0).round() / 100.0;
        if !rounded.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "price",
                reason: "is too large",
            });
        }

        Ok(Self(rounded))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(Price::new(15.994).unwrap().value(), 15.99);
        assert_eq!(Price::new(15.996).unwrap().value(), 16.0);
    }

    #[test]
    fn zero_is_allowed() {
        assert_eq!(Price::new(0.0).unwrap().value(), 0.0);
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(Price::new(-1.0).is_err());
        assert!(Price::new(f64::NAN).is_err());
        assert!(Price::new(f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_values_that_overflow_when_rounded() {
        let err = Price::new(1e307).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "price",
                reason: "is too large",
            }
        );
        assert!(Price::new(f64::MAX).is_err());
        assert!(Price::new(1e300).is_ok());
    }
}
