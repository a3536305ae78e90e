//! # Field Validation
//!
//! Constraint checks applied to submitted form fields, and the error
//! collection that carries their failures back to the view layer.
//!
//! Every field is checked against every rule that applies to it; validation
//! never stops at the first failure, so a blank telephone reports both
//! [`Violation::NotEmpty`] and [`Violation::Digits`].

use thiserror::Error;

/// A constraint a field value failed to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The value is the empty string.
    NotEmpty,
    /// The value is not a number with at most `integer` significant integer
    /// digits and at most `fraction` fraction digits.
    Digits { integer: usize, fraction: usize },
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name as submitted (e.g. `"firstName"`).
    pub field: &'static str,
    pub violation: Violation,
}

/// All field errors produced by one validation pass, in rejection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{count} invalid field(s)", count = .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create an empty error collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation against `field`.
    pub fn reject(&mut self, field: &'static str, violation: Violation) {
        self.errors.push(FieldError { field, violation });
    }

    /// Violations recorded against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = Violation> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.violation)
    }

    /// Whether `field` has at least one violation.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was rejected, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Reject `value` if it is the empty string.
///
/// Whitespace counts as content.
pub fn require_not_empty(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.is_empty() {
        errors.reject(field, Violation::NotEmpty);
    }
}

/// Reject `value` unless [`digits_within`] accepts it.
pub fn require_digits(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    integer: usize,
    fraction: usize,
) {
    if !digits_within(value, integer, fraction) {
        errors.reject(field, Violation::Digits { integer, fraction });
    }
}

/// Check that `value` is a decimal number with at most `integer` integer
/// digits and at most `fraction` fraction digits.
///
/// Accepted shape: optional `+`/`-`, ASCII digits, optionally `.` followed by
/// ASCII digits, optionally `e`/`E` and a signed exponent. At least one
/// mantissa digit must be present.
///
/// Digits are counted on the unscaled value and its scale, as a
/// `BigDecimal` would: integer digits are precision minus scale, fraction
/// digits are the scale (never negative). Leading zeros are not significant,
/// so `"0123"` has three integer digits. Trailing zeros are, so `"12.0"` has
/// one fraction digit, and `"1E3"` has four integer digits.
pub fn digits_within(value: &str, integer: usize, fraction: usize) -> bool {
    let unsigned = value
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(value);

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exp)) => match exp.parse::<i64>() {
            Ok(exp) => (mantissa, exp),
            Err(_) => return false,
        },
        None => (unsigned, 0),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }

    let leading_zeros = int_part
        .bytes()
        .chain(frac_part.bytes())
        .take_while(|&b| b == b'0')
        .count();
    let precision = (int_part.len() + frac_part.len() - leading_zeros).max(1);

    let Ok(frac_len) = i64::try_from(frac_part.len()) else {
        return false;
    };
    let Ok(precision) = i64::try_from(precision) else {
        return false;
    };
    let Some(scale) = frac_len.checked_sub(exponent) else {
        return false;
    };
    let Some(int_digits) = precision.checked_sub(scale) else {
        return false;
    };

    let integer = i64::try_from(integer).unwrap_or(i64::MAX);
    let fraction = i64::try_from(fraction).unwrap_or(i64::MAX);
    int_digits <= integer && scale.max(0) <= fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ten_digit_number_is_accepted() {
        assert!(digits_within("6085551023", 10, 0));
    }

    #[test]
    fn leading_zero_is_not_significant() {
        assert!(digits_within("01316761638", 10, 0));
    }

    #[test]
    fn eleven_significant_digits_are_rejected() {
        assert!(!digits_within("13167616381", 10, 0));
    }

    #[test]
    fn empty_string_is_not_a_number() {
        assert!(!digits_within("", 10, 0));
    }

    #[test]
    fn letters_are_rejected() {
        assert!(!digits_within("608-555-1023", 10, 0));
        assert!(!digits_within("phone", 10, 0));
    }

    #[test]
    fn fraction_digits_count_against_limit() {
        assert!(!digits_within("12.0", 10, 0));
        assert!(digits_within("12.", 10, 0));
        assert!(digits_within("12.25", 10, 2));
    }

    #[test]
    fn sign_is_allowed() {
        assert!(digits_within("-42", 10, 0));
        assert!(digits_within("+42", 10, 0));
        assert!(!digits_within("-", 10, 0));
    }

    #[test]
    fn exponent_shifts_digits_between_parts() {
        assert!(digits_within("1E3", 10, 0));
        assert!(digits_within("1e9", 10, 0));
        assert!(digits_within("12.5E2", 10, 0));
        assert!(digits_within("-6.085551023E+9", 10, 0));
        assert!(!digits_within("1E10", 10, 0));
        assert!(!digits_within("1E-1", 10, 0));
        assert!(digits_within("1E-1", 10, 1));
    }

    #[test]
    fn malformed_exponent_is_rejected() {
        assert!(!digits_within("1E", 10, 0));
        assert!(!digits_within("1E+", 10, 0));
        assert!(!digits_within("e3", 10, 0));
        assert!(!digits_within("1E3.0", 10, 0));
        assert!(!digits_within("1E99999999999999999999", 10, 0));
    }

    #[test]
    fn zero_has_one_integer_digit() {
        assert!(digits_within("0", 1, 0));
        assert!(digits_within("000", 1, 0));
        assert!(!digits_within("0.00", 10, 1));
    }

    #[test]
    fn whitespace_passes_not_empty() {
        let mut errors = ValidationErrors::new();
        require_not_empty(&mut errors, "city", "   ");
        assert!(errors.is_empty());
    }

    #[test]
    fn errors_are_grouped_by_field() {
        let mut errors = ValidationErrors::new();
        require_not_empty(&mut errors, "telephone", "");
        require_digits(&mut errors, "telephone", "", 10, 0);
        require_not_empty(&mut errors, "city", "");

        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("telephone"));
        assert!(!errors.has_field("address"));
        let telephone: Vec<_> = errors.for_field("telephone").collect();
        assert_eq!(
            telephone,
            vec![
                Violation::NotEmpty,
                Violation::Digits {
                    integer: 10,
                    fraction: 0
                }
            ]
        );
    }

    #[test]
    fn into_result_reflects_emptiness() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.reject("city", Violation::NotEmpty);
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.to_string(), "1 invalid field(s)");
    }

    proptest! {
        #[test]
        fn up_to_ten_digits_always_accepted(s in "[0-9]{1,10}") {
            prop_assert!(digits_within(&s, 10, 0));
        }

        #[test]
        fn eleven_digits_without_leading_zero_rejected(s in "[1-9][0-9]{10}") {
            prop_assert!(!digits_within(&s, 10, 0));
        }

        #[test]
        fn any_non_digit_character_rejected(prefix in "[0-9]{0,4}", bad in "[a-df-zA-DF-Z ()#]", suffix in "[0-9]{0,4}") {
            let value = format!("{prefix}{bad}{suffix}");
            prop_assert!(!digits_within(&value, 10, 0));
        }
    }
}
