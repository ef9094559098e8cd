// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page ordering — natural or lexical sequencing of source file names.

pub mod natural;

use std::cmp::Ordering;

use bildband_core::SortOrder;

pub use natural::{FileToken, Tokens, compare_natural, tokenize};

/// Compare two names under the given ordering.
pub fn compare(a: &str, b: &str, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Natural => compare_natural(a, b),
        SortOrder::Lexical => a.cmp(b),
    }
}

/// Sort `items` ascending by the name `key` returns.
///
/// Names that the ordering treats as equal (`img09` and `img9`) fall back to
/// byte order, so the result never depends on the input order.
pub fn sort_by_name<T>(items: &mut [T], order: SortOrder, key: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| {
        let (a, b) = (key(a), key(b));
        compare(a, b, order).then_with(|| a.cmp(b))
    });
}
