//! Submission validation.
//!
//! Every check runs; violations are collected in order rather than
//! stopping at the first one. A submission is accepted only when the
//! list comes back empty.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Field, Submission};
use crate::rules::{IntakeRules, QuantityParse, QTY_MAX, QTY_MIN};
use crate::sanitize::text_length;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,}$").expect("name pattern is valid"));

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations joined into one line for the error row.
    pub fn summary(&self) -> String {
        self.errors.join("; ")
    }
}

/// Check a submission against the intake rules.
pub fn validate(submission: &Submission, rules: &IntakeRules) -> ValidationResult {
    let mut errors = Vec::new();

    for field in &rules.required_fields {
        let blank = submission
            .get(*field)
            .map(|v| v.trim().is_empty())
            .unwrap_or(true);
        if blank {
            errors.push(format!("Required field {} cannot be empty", field));
        }
    }

    if let Some(name) = non_empty(submission.get(Field::Name)) {
        if !NAME_PATTERN.is_match(name.trim()) {
            errors.push("Name abbreviation must be 2 or more English letters".to_string());
        }
    }

    if let Some(qty) = non_empty(submission.get(Field::Qty)) {
        let in_range = parse_quantity(qty, rules.quantity_parse)
            .map(|n| (QTY_MIN..=QTY_MAX).contains(&n))
            .unwrap_or(false);
        if !in_range {
            errors.push(format!(
                "Quantity must be a number between {} and {}",
                QTY_MIN, QTY_MAX
            ));
        }
    }

    for field in rules.text_fields() {
        if let Some(text) = submission.get(*field) {
            if text_length(text) > rules.max_text_length {
                errors.push(format!(
                    "{} field length cannot exceed {} characters",
                    text_field_label(*field),
                    rules.max_text_length
                ));
            }
        }
    }

    // Compared verbatim: " borrow" is not a registration type.
    if let Some(kind) = non_empty(submission.get(Field::Type)) {
        if !rules.is_valid_type(kind) {
            errors.push("Invalid registration type".to_string());
        }
    }

    ValidationResult { errors }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn text_field_label(field: Field) -> &'static str {
    match field {
        Field::Other => "Other",
        _ => "Remark",
    }
}

/// Parse a quantity string according to `mode`.
///
/// In [`QuantityParse::Prefix`] mode the value is read the way a
/// browser-side `parseInt` reads it: leading whitespace skipped, optional
/// sign, `0x` hex prefix honoured, digits consumed until the first
/// non-digit. Values too large for `i64` saturate.
pub fn parse_quantity(raw: &str, mode: QuantityParse) -> Option<i64> {
    match mode {
        QuantityParse::Strict => raw.trim().parse::<i64>().ok(),
        QuantityParse::Prefix => parse_int_prefix(raw),
    }
}

fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(rest) => (16, rest),
        None => (10, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else { break };
        seen = true;
        value = value.saturating_mul(radix as i64).saturating_add(d as i64);
    }
    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaVariant;

    fn valid() -> Submission {
        Submission::from_pairs([
            ("name", "AB"),
            ("grade", "1A"),
            ("type", "borrow"),
            ("qty", "3"),
            ("remark", "test"),
        ])
    }

    fn rules() -> IntakeRules {
        IntakeRules::for_schema(SchemaVariant::WithoutOther)
    }

    #[test]
    fn test_valid_submission() {
        let result = validate(&valid(), &rules());
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn test_each_required_field() {
        for field in ["name", "grade", "type", "qty"] {
            let mut missing = valid();
            match field {
                "name" => missing.name = None,
                "grade" => missing.grade = None,
                "type" => missing.kind = None,
                _ => missing.qty = None,
            }
            let result = validate(&missing, &rules());
            assert!(!result.is_valid());
            assert!(result
                .errors
                .contains(&format!("Required field {} cannot be empty", field)));
        }
    }

    #[test]
    fn test_whitespace_only_is_missing() {
        let mut s = valid();
        s.grade = Some("   ".into());
        let result = validate(&s, &rules());
        assert_eq!(result.errors, vec!["Required field grade cannot be empty"]);
    }

    #[test]
    fn test_collects_every_violation() {
        let s = Submission::from_pairs([("name", "a1"), ("qty", "0"), ("type", "lend")]);
        let result = validate(&s, &rules());
        assert_eq!(result.errors.len(), 4);
        assert_eq!(result.errors[0], "Required field grade cannot be empty");
        assert!(result.summary().contains("Invalid registration type"));
    }

    #[test]
    fn test_name_format() {
        for (name, ok) in [("a", false), ("ab", true), ("a1", false), (" Ab ", true), ("王小明", false)] {
            let mut s = valid();
            s.name = Some(name.into());
            assert_eq!(validate(&s, &rules()).is_valid(), ok, "name {:?}", name);
        }
    }

    #[test]
    fn test_quantity_bounds() {
        for (qty, ok) in [("0", false), ("1", true), ("100", true), ("101", false), ("abc", false), ("-5", false)] {
            let mut s = valid();
            s.qty = Some(qty.into());
            assert_eq!(validate(&s, &rules()).is_valid(), ok, "qty {:?}", qty);
        }
    }

    #[test]
    fn test_quantity_prefix_vs_strict() {
        let mut s = valid();
        s.qty = Some("12abc".into());
        assert!(validate(&s, &rules()).is_valid());

        let mut strict = rules();
        strict.quantity_parse = QuantityParse::Strict;
        assert!(!validate(&s, &strict).is_valid());
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("  42"), Some(42));
        assert_eq!(parse_int_prefix("5xyz"), Some(5));
        assert_eq!(parse_int_prefix("1e3"), Some(1));
        assert_eq!(parse_int_prefix("0x1A"), Some(26));
        assert_eq!(parse_int_prefix("-7"), Some(-7));
        assert_eq!(parse_int_prefix("+7"), Some(7));
        assert_eq!(parse_int_prefix("x5"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_remark_length_boundary() {
        let mut s = valid();
        s.remark = Some("r".repeat(1000));
        assert!(validate(&s, &rules()).is_valid());

        s.remark = Some("r".repeat(1001));
        let result = validate(&s, &rules());
        assert_eq!(
            result.errors,
            vec!["Remark field length cannot exceed 1000 characters"]
        );
    }

    #[test]
    fn test_remark_length_counts_utf16_units() {
        let mut s = valid();
        s.remark = Some("😀".repeat(500));
        assert!(validate(&s, &rules()).is_valid());

        s.remark = Some("😀".repeat(600));
        assert!(!validate(&s, &rules()).is_valid());

        s.remark = Some("借".repeat(1000));
        assert!(validate(&s, &rules()).is_valid());
    }

    #[test]
    fn test_other_length_only_checked_with_other_schema() {
        let mut s = valid();
        s.other = Some("o".repeat(1001));
        assert!(validate(&s, &rules()).is_valid());

        let with_other = IntakeRules::for_schema(SchemaVariant::WithOther);
        let result = validate(&s, &with_other);
        assert_eq!(
            result.errors,
            vec!["Other field length cannot exceed 1000 characters"]
        );
    }

    #[test]
    fn test_type_enumeration() {
        for kind in SchemaVariant::WithoutOther.default_types() {
            let mut s = valid();
            s.kind = Some(kind.to_string());
            assert!(validate(&s, &rules()).is_valid(), "type {:?}", kind);
        }

        let mut s = valid();
        s.kind = Some("other".into());
        assert!(!validate(&s, &rules()).is_valid());
        assert!(validate(&s, &IntakeRules::for_schema(SchemaVariant::WithOther)).is_valid());

        s.kind = Some(" borrow".into());
        assert!(!validate(&s, &rules()).is_valid());
    }
}
