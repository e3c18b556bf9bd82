//! Interpreter for the formula language.
//!
//! Evaluates a parsed [`Expression`] to the text stored in a derived field.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::{Builtin, Expression};
use crate::schema::types::format_number;

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("static regex")
});

/// Interpreter for the formula language.
#[derive(Debug, Clone)]
pub struct Interpreter {
    /// Reference date for `AGE`.
    today: NaiveDate,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an interpreter that evaluates `AGE` relative to `today`.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn evaluate(&self, expr: &Expression) -> String {
        match expr {
            Expression::Literal(text) => text.clone(),
            Expression::Call {
                function,
                args,
                source,
            } => match function {
                Builtin::Sum => self.sum(args),
                Builtin::Concat => self.concat(args),
                Builtin::Age => self.age(args).unwrap_or_else(|| source.clone()),
            },
        }
    }

    fn sum(&self, args: &[String]) -> String {
        let total: f64 = args.iter().map(|arg| parse_leading_float(arg)).sum();
        format_number(total)
    }

    fn concat(&self, args: &[String]) -> String {
        args.iter()
            .map(|arg| arg.trim().replace('"', ""))
            .collect::<Vec<_>>()
            .join("")
    }

    /// Whole calendar years between the date argument and today, counted by
    /// year number only. `None` when the argument is not a date.
    fn age(&self, args: &[String]) -> Option<String> {
        let date = parse_date(args.join(",").trim())?;
        Some((self.today.year() - date.year()).to_string())
    }
}

/// Parses the longest numeric prefix of `text`; anything unparseable, and a
/// zero or NaN result, counts as 0.
pub fn parse_leading_float(text: &str) -> f64 {
    let text = text.trim();
    let value = LEADING_FLOAT
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Accepts ISO dates and date-times plus a few common written forms.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y-%m-%d %H:%M:%S"];
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    // Year-month and bare year forms.
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
        return Some(date);
    }
    if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
        let year = text.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformParser;

    fn eval(text: &str) -> String {
        let interpreter = Interpreter::with_today(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        interpreter.evaluate(&TransformParser::parse(text))
    }

    #[test]
    fn test_sum() {
        assert_eq!(eval("SUM(3, 4.5)"), "7.5");
        assert_eq!(eval("SUM(1, 2, 3)"), "6");
        assert_eq!(eval("SUM(, abc, 2)"), "2");
        assert_eq!(eval("SUM(3px, -1)"), "2");
        assert_eq!(eval("SUM()"), "0");
    }

    #[test]
    fn test_concat() {
        assert_eq!(eval(r#"CONCAT(Jane, " ", Doe)"#), "Jane Doe");
        assert_eq!(eval(r#"CONCAT("a", "b")"#), "ab");
        assert_eq!(eval("CONCAT()"), "");
    }

    #[test]
    fn test_age_counts_years_only() {
        assert_eq!(eval("AGE(2000-01-01)"), "25");
        assert_eq!(eval("AGE(2000-12-31)"), "25");
        assert_eq!(eval("AGE(2024-06-01T08:30:00Z)"), "1");
    }

    #[test]
    fn test_invalid_age_falls_through() {
        assert_eq!(eval("AGE(not a date)"), "AGE(not a date)");
        assert_eq!(eval("AGE()"), "AGE()");
    }

    #[test]
    fn test_literal_passthrough() {
        assert_eq!(eval("price * 2"), "price * 2");
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float(" 12.5kg"), 12.5);
        assert_eq!(parse_leading_float(".5"), 0.5);
        assert_eq!(parse_leading_float("1e3"), 1000.0);
        assert_eq!(parse_leading_float("1e"), 1.0);
        assert_eq!(parse_leading_float("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_leading_float("x1"), 0.0);
    }

    #[test]
    fn test_parse_date_forms() {
        let expected = NaiveDate::from_ymd_opt(1990, 4, 2);
        assert_eq!(parse_date("1990-04-02"), expected);
        assert_eq!(parse_date("1990/04/02"), expected);
        assert_eq!(parse_date("04/02/1990"), expected);
        assert_eq!(parse_date("1990"), NaiveDate::from_ymd_opt(1990, 1, 1));
        assert_eq!(parse_date("1990-13-01"), None);
        assert_eq!(parse_date(""), None);
    }
}
