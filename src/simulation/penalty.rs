use std::fmt;

/// One `coefficient * x^exponent` summand. Constants use exponent 0.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    coefficient: f64,
    exponent: u32,
}

impl Term {
    pub fn new(coefficient: f64, exponent: u32) -> Self {
        Self {
            coefficient,
            exponent,
        }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(value, 0)
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        match self.exponent {
            0 => self.coefficient,
            1 => self.coefficient * x,
            k => self.coefficient * x.powi(k as i32),
        }
    }
}

/// Cost of keeping a request waiting, as a function of elapsed seconds.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Penalty {
    #[default]
    Identity,
    Polynomial(Vec<Term>),
}

impl Penalty {
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Penalty::Identity => x,
            Penalty::Polynomial(terms) => terms.iter().map(|t| t.evaluate(x)).sum(),
        }
    }
}

impl fmt::Display for Penalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Penalty::Identity => write!(f, "x"),
            Penalty::Polynomial(terms) if terms.is_empty() => write!(f, "0"),
            Penalty::Polynomial(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    let c = term.coefficient();
                    if i > 0 {
                        write!(f, "{}", if c < 0.0 { "-" } else { "+" })?;
                    } else if c < 0.0 {
                        write!(f, "-")?;
                    }
                    match term.exponent() {
                        0 => write!(f, "{}", c.abs())?,
                        1 => write!(f, "{}x", c.abs())?,
                        k => write!(f, "{}x^{}", c.abs(), k)?,
                    }
                }
                Ok(())
            }
        }
    }
}
