//! Name ordering used by the hierarchy builder.
//!
//! Comparison is at base-letter strength: case and accents do not change the
//! order. The Spanish tailoring keeps `ñ` as its own letter sorted between
//! `n` and `o`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Sorts after every letter, so `n` + this marker lands between `n` and `o`.
const TAILORED_SUFFIX: char = char::MAX;

pub trait Collator: Send + Sync {
    fn compare(&self, left: &str, right: &str) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollationLocale {
    #[default]
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "root")]
    Root,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BaseCollator {
    locale: CollationLocale,
}

impl BaseCollator {
    pub fn new(locale: CollationLocale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> CollationLocale {
        self.locale
    }

    pub fn sort_key(&self, value: &str) -> String {
        let mut key = String::with_capacity(value.len());
        for c in value.nfc() {
            if self.locale == CollationLocale::Spanish && matches!(c, 'ñ' | 'Ñ') {
                key.push('n');
                key.push(TAILORED_SUFFIX);
                continue;
            }
            for base in std::iter::once(c).nfd().filter(|d| !is_combining_mark(*d)) {
                key.extend(base.to_lowercase());
            }
        }
        key
    }
}

impl Collator for BaseCollator {
    fn compare(&self, left: &str, right: &str) -> Ordering {
        self.sort_key(left).cmp(&self.sort_key(right))
    }
}
