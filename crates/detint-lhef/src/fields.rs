//! Whitespace-separated numeric fields of one line.

use std::str::{FromStr, SplitWhitespace};

use crate::error::LhefError;

/// Cursor over the fields of a single line.
pub struct Fields<'a> {
    line: u64,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    pub fn new(text: &'a str, line: u64) -> Self {
        Self {
            line,
            tokens: text.split_whitespace(),
        }
    }

    pub fn float(&mut self, field: &'static str) -> Result<f64, LhefError> {
        let token = self.token(field)?;
        parse_float(token).ok_or_else(|| self.invalid(field, token))
    }

    pub fn int<T: FromStr>(&mut self, field: &'static str) -> Result<T, LhefError> {
        let token = self.token(field)?;
        token.parse().ok().ok_or_else(|| self.invalid(field, token))
    }

    fn token(&mut self, field: &'static str) -> Result<&'a str, LhefError> {
        self.tokens.next().ok_or_else(|| LhefError::Malformed {
            line: self.line,
            reason: format!("missing {field}"),
        })
    }

    fn invalid(&self, field: &'static str, token: &str) -> LhefError {
        LhefError::InvalidField {
            line: self.line,
            field,
            value: token.to_owned(),
        }
    }
}

/// Parse a float, accepting Fortran `D` exponents.
pub fn parse_float(token: &str) -> Option<f64> {
    token
        .parse()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "E").parse().ok())
}
