//
// dialect.rs
// The Cuttle Compiler
//
// Created by the Cuttle Contributors
// on 07/03/2024
//

//! Named SQL dialects and the selection algorithm that binds a
//! generated repository to one of its declared dialects.
//!
//! A `Dialect` scores every other dialect it could borrow SQL from.
//! A score of 0 means "incompatible"; higher scores are preferred.
//! The predefined table is immutable and shared by the compiler
//! and by generated code.

use std::fmt::{ self, Debug, Formatter };
use crate::runtime::{ Error, Result };


/// Scores how well a dialect can run SQL written for `other`.
pub type CompatFn = fn(other: &Dialect) -> u32;

/// The score every non-generic dialect assigns to `generic`.
/// Kept low so that any more specific match is preferred.
pub const GENERIC_FALLBACK_SCORE: u32 = 1;

/// A named SQL flavor with a compatibility function.
#[derive(Clone, Copy)]
pub struct Dialect {
    /// Name of the dialect, compared case-insensitively.
    pub name: &'static str,
    compat: CompatFn,
}

impl Dialect {
    /// Makes a dialect with a custom compatibility function.
    pub const fn new(name: &'static str, compat: CompatFn) -> Self {
        Dialect { name, compat }
    }

    /// Makes a dialect outside the predefined table. It only
    /// accepts `generic` SQL, as a low-priority fallback.
    pub const fn custom(name: &'static str) -> Self {
        Dialect { name, compat: generic_fallback }
    }

    /// Case-insensitive name equality.
    pub fn is(&self, other: &Dialect) -> bool {
        self.name.eq_ignore_ascii_case(other.name)
    }

    /// The score `self` assigns to SQL written for `other`.
    pub fn compat(&self, other: &Dialect) -> u32 {
        (self.compat)(other)
    }

    /// Whether `self` can run SQL written for `other` at all.
    pub fn compatible_with(&self, other: &Dialect) -> bool {
        self.is(other) || self.compat(other) > 0
    }

    /// Picks the candidate whose SQL `self` should run.
    ///
    /// # Return value
    ///
    /// * The index of the first candidate with the same name as
    ///   `self`, if there is one, regardless of any scores.
    /// * Otherwise the index of the first candidate with the highest
    ///   positive score.
    /// * `Err(Error::NoCompatibleDialect)` if every score is 0.
    pub fn select(&self, candidates: &[Dialect]) -> Result<usize> {
        let mut best: Option<(usize, u32)> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            if self.is(candidate) {
                return Ok(index);
            }

            let score = self.compat(candidate);

            if score > best.map_or(0, |(_, s)| s) {
                best = Some((index, score));
            }
        }

        best.map(|(index, _)| index).ok_or_else(|| Error::NoCompatibleDialect {
            requested: self.name.to_owned(),
        })
    }
}

impl Debug for Dialect {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Dialect").field(&self.name).finish()
    }
}

fn no_fallback(_: &Dialect) -> u32 {
    0
}

fn generic_fallback(other: &Dialect) -> u32 {
    if other.is(&GENERIC) {
        GENERIC_FALLBACK_SCORE
    } else {
        0
    }
}

/// Portable SQL. Runs nothing but itself.
pub const GENERIC: Dialect = Dialect::new("generic", no_fallback);

/// SQLite 3.
pub const SQLITE: Dialect = Dialect::new("sqlite", generic_fallback);

/// PostgreSQL.
pub const POSTGRES: Dialect = Dialect::new("postgres", generic_fallback);

/// Every predefined dialect.
pub static PREDEFINED: [Dialect; 3] = [GENERIC, SQLITE, POSTGRES];

/// Finds a predefined dialect by case-insensitive name.
pub fn lookup(name: &str) -> Option<&'static Dialect> {
    PREDEFINED.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_only_repository_accepts_every_predefined_dialect() {
        for dialect in &PREDEFINED {
            assert_eq!(dialect.select(&[GENERIC]).unwrap(), 0);
        }
    }

    #[test]
    fn custom_dialect_falls_back_to_generic() {
        let mysql = Dialect::custom("mysql");

        assert_eq!(mysql.select(&[POSTGRES, GENERIC]).unwrap(), 1);
        assert!(mysql.select(&[POSTGRES, SQLITE]).is_err());
        assert!(lookup("MySQL").is_none());
        assert!(lookup("SQLite").map_or(false, |d| d.is(&SQLITE)));
    }
}
