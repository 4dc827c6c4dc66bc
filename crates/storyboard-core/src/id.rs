#![forbid(unsafe_code)]

//! Identifier minting for groups, items, and projects.
//!
//! Identifiers are short opaque strings. Each one is a random base-36 stem
//! followed by a base-36 sequence number, so a single [`IdGenerator`] never
//! hands out the same identifier twice, and independently seeded
//! generators are vanishingly unlikely to collide.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random stem of every minted identifier.
pub const STEM_LEN: usize = 6;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier string.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The raw identifier string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Group`](crate::model::Group).
    GroupId
);
string_id!(
    /// Identifier of an [`Item`](crate::model::Item).
    ItemId
);
string_id!(
    /// Identifier of a saved [`Project`](crate::project::Project).
    ProjectId
);

/// Source of fresh identifiers.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: SmallRng,
    sequence: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a generator seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
            sequence: 0,
        }
    }

    /// Create a deterministic generator (tests, replays).
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            sequence: 0,
        }
    }

    /// Number of identifiers minted so far.
    #[must_use]
    pub fn minted(&self) -> u64 {
        self.sequence
    }

    /// Mint a raw identifier string.
    pub fn next_raw(&mut self) -> String {
        let mut out = String::with_capacity(STEM_LEN + 4);
        for _ in 0..STEM_LEN {
            let idx = self.rng.random_range(0..ALPHABET.len());
            out.push(char::from(ALPHABET[idx]));
        }
        push_base36(&mut out, self.sequence);
        self.sequence += 1;
        out
    }

    /// Mint a group identifier.
    pub fn group_id(&mut self) -> GroupId {
        GroupId(self.next_raw())
    }

    /// Mint an item identifier.
    pub fn item_id(&mut self) -> ItemId {
        ItemId(self.next_raw())
    }

    /// Mint a project identifier.
    pub fn project_id(&mut self) -> ProjectId {
        ProjectId(self.next_raw())
    }
}

fn push_base36(out: &mut String, mut value: u64) {
    let start = out.len();
    loop {
        out.push(char::from(ALPHABET[(value % 36) as usize]));
        value /= 36;
        if value == 0 {
            break;
        }
    }
    // Digits were pushed least-significant first; all are ASCII.
    let digits: String = out[start..].chars().rev().collect();
    out.truncate(start);
    out.push_str(&digits);
}
