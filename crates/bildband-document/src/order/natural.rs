// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Natural filename ordering — digit runs compare by value, everything else by
// codepoint, so `page9.jpg` sorts before `page10.jpg`.
//
// Only ASCII `0`..=`9` start or extend a numeric token. Other Unicode digits
// (Arabic-Indic, full-width, ...) are ordinary text.

use std::cmp::Ordering;

/// One run of a file name: either all ASCII digits or no ASCII digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileToken<'a> {
    Numeric(&'a str),
    Text(&'a str),
}

impl<'a> FileToken<'a> {
    /// The literal text of the token.
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Numeric(s) | Self::Text(s) => s,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

/// Iterator over the tokens of a name. See [`tokenize`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    pub fn new(name: &'a str) -> Self {
        Self { rest: name }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = FileToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let numeric = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != numeric)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if numeric {
            FileToken::Numeric(run)
        } else {
            FileToken::Text(run)
        })
    }
}

/// Split `name` into alternating digit / non-digit runs.
///
/// The runs cover the whole name with no gaps: joining their text gives
/// back `name`. An empty name has no tokens.
pub fn tokenize(name: &str) -> Vec<FileToken<'_>> {
    Tokens::new(name).collect()
}

/// Compare two file names in natural order.
///
/// Tokens are walked pairwise. Two numeric tokens compare by value (leading
/// zeros ignored, no overflow for long runs); any other pair compares by
/// codepoint. The first pair that is not equal decides. When one name runs
/// out of tokens first, it sorts first.
///
/// Numeric tokens that differ only in leading zeros (`007` and `7`) are equal
/// and the walk continues with the next pair, which keeps the relation a
/// strict weak ordering.
pub fn compare_natural(a: &str, b: &str) -> Ordering {
    let mut left = Tokens::new(a);
    let mut right = Tokens::new(b);
    loop {
        let (l, r) = match (left.next(), right.next()) {
            (Some(l), Some(r)) => (l, r),
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
        };
        if l.as_str() == r.as_str() {
            continue;
        }
        let ord = match (l, r) {
            (FileToken::Numeric(x), FileToken::Numeric(y)) => compare_digits(x, y),
            _ => l.as_str().cmp(r.as_str()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

/// Compare two ASCII digit runs by numeric value.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
