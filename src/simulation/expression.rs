//! Parser for penalty expressions such as `2x^2 + 0.5x + 1`.
//!
//! An expression is a sum of terms. Each term is `c x^k`, `c x` or a bare
//! constant `c`, where the coefficient may be omitted (`x`, `-x^3`) or joined
//! with `*` (`3*x`). Whitespace is ignored.

use crate::simulation::penalty::{Penalty, Term};
use regex_lite::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("unrecognized term `{0}`")]
    UnrecognizedTerm(String),

    #[error("exponent out of range in term `{0}`")]
    ExponentOutOfRange(String),
}

struct Patterns {
    term: Regex,
    power: Regex,
    linear: Regex,
    constant: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        term: Regex::new(r"[+-]?[^+-]+").expect("term regex"),
        power: Regex::new(r"^([+-]?)(\d*\.?\d*)\*?x\^(\d+)$").expect("power regex"),
        linear: Regex::new(r"^([+-]?)(\d*\.?\d*)\*?x$").expect("linear regex"),
        constant: Regex::new(r"^[+-]?\d+\.?\d*$").expect("constant regex"),
    })
}

pub fn parse_expression(expr: &str) -> Result<Penalty, ExpressionError> {
    let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let terms = split_terms(&compact)?
        .into_iter()
        .map(parse_term)
        .collect::<Result<Vec<Term>, ExpressionError>>()?;

    Ok(Penalty::Polynomial(terms))
}

/// Sign-led terms. Anything the term pattern skips over (a dangling or
/// doubled sign) is reported as unrecognized.
fn split_terms(expr: &str) -> Result<Vec<&str>, ExpressionError> {
    let mut terms = Vec::new();
    let mut end = 0;
    for m in patterns().term.find_iter(expr) {
        if m.start() != end {
            return Err(ExpressionError::UnrecognizedTerm(expr[end..m.start()].to_string()));
        }
        terms.push(m.as_str());
        end = m.end();
    }
    if end != expr.len() {
        return Err(ExpressionError::UnrecognizedTerm(expr[end..].to_string()));
    }
    Ok(terms)
}

fn parse_term(term: &str) -> Result<Term, ExpressionError> {
    let unrecognized = || ExpressionError::UnrecognizedTerm(term.to_string());
    let p = patterns();

    if let Some(caps) = p.power.captures(term) {
        let coefficient = coefficient(&caps[1], &caps[2]).ok_or_else(unrecognized)?;
        let exponent = caps[3]
            .parse::<u32>()
            .ok()
            .filter(|k| *k <= i32::MAX as u32)
            .ok_or_else(|| ExpressionError::ExponentOutOfRange(term.to_string()))?;
        return Ok(Term::new(coefficient, exponent));
    }

    if let Some(caps) = p.linear.captures(term) {
        let coefficient = coefficient(&caps[1], &caps[2]).ok_or_else(unrecognized)?;
        return Ok(Term::new(coefficient, 1));
    }

    if p.constant.is_match(term) {
        let value = term.parse::<f64>().map_err(|_| unrecognized())?;
        return Ok(Term::constant(value));
    }

    Err(unrecognized())
}

/// An empty coefficient means 1.
fn coefficient(sign: &str, digits: &str) -> Option<f64> {
    let magnitude = if digits.is_empty() {
        1.0
    } else {
        digits.parse::<f64>().ok()?
    };
    Some(if sign == "-" { -magnitude } else { magnitude })
}
