//! Numeric coercion of spreadsheet cells

use crate::records::Cell;

/// Coerce a field to a number
///
/// Absent fields, empty or unparseable text, booleans and nulls all yield
/// `None`. Text is trimmed before parsing.
pub fn to_number(value: Option<&Cell>) -> Option<f64> {
    match value? {
        Cell::Number(n) => Some(*n).filter(|n| n.is_finite()),
        Cell::Text(s) => parse_decimal(s),
        Cell::Bool(_) | Cell::Null => None,
    }
}

/// Coerce a percentage field to its magnitude
///
/// The `%` marker is cosmetic: `"80%"`, `"80"` and `80` all give `80.0`.
pub fn to_percent(value: Option<&Cell>) -> Option<f64> {
    match value? {
        Cell::Text(s) if s.contains('%') => parse_decimal(&s.replacen('%', "", 1)),
        other => to_number(Some(other)),
    }
}

fn parse_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_marker_is_cosmetic() {
        assert_eq!(to_percent(Some(&Cell::from("80%"))), Some(80.0));
        assert_eq!(to_percent(Some(&Cell::from("80"))), Some(80.0));
        assert_eq!(to_percent(Some(&Cell::Number(80.0))), Some(80.0));
        assert_eq!(to_percent(Some(&Cell::from(" 72.5 % "))), Some(72.5));
    }

    #[test]
    fn test_percent_null_cases() {
        assert_eq!(to_percent(Some(&Cell::from(""))), None);
        assert_eq!(to_percent(Some(&Cell::Null)), None);
        assert_eq!(to_percent(Some(&Cell::from("abc%"))), None);
        assert_eq!(to_percent(Some(&Cell::from("%"))), None);
        assert_eq!(to_percent(None), None);
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(to_number(Some(&Cell::from("45"))), Some(45.0));
        assert_eq!(to_number(Some(&Cell::from(" 6.8 "))), Some(6.8));
        assert_eq!(to_number(Some(&Cell::from("-3"))), Some(-3.0));
        assert_eq!(to_number(Some(&Cell::Number(190.0))), Some(190.0));
    }

    #[test]
    fn test_number_rejects_garbage() {
        assert_eq!(to_number(Some(&Cell::from("n/a"))), None);
        assert_eq!(to_number(Some(&Cell::from("   "))), None);
        assert_eq!(to_number(Some(&Cell::from("80%"))), None);
        assert_eq!(to_number(Some(&Cell::from("inf"))), None);
        assert_eq!(to_number(Some(&Cell::Bool(true))), None);
        assert_eq!(to_number(None), None);
    }
}
