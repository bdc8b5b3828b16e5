//! Deterministic "luck": a pure function from a string key to a number in [0, 1).
//!
//! Cache placement and seeding are derived from these values, so the same key
//! must produce the same number on every device and every session.

use sha2::{Digest, Sha256};

use crate::grid::Cell;

pub trait Luck {
    /// A reproducible value in `[0, 1)` for `key`.
    fn luck(&self, key: &str) -> f64;
}

/// Key used for the "does this cell hold a cache" draw.
pub fn existence_key(cell: Cell) -> String {
    format!("{},{}", cell.i, cell.j)
}

/// Key used for the initial coin count draw.
pub fn initial_value_key(cell: Cell) -> String {
    format!("{},{},initialValue", cell.i, cell.j)
}

/// SHA-256 backed luck: the top 53 bits of the digest scaled into `[0, 1)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Luck;

impl Luck for Sha256Luck {
    fn luck(&self, key: &str) -> f64 {
        let digest = Sha256::digest(key.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let bits = u64::from_be_bytes(head) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

/// Adapts a plain closure into a [`Luck`] source, mostly for tests and tooling.
#[derive(Clone, Copy, Debug)]
pub struct LuckFn<F>(pub F);

impl<F> Luck for LuckFn<F>
where
    F: Fn(&str) -> f64,
{
    fn luck(&self, key: &str) -> f64 {
        (self.0)(key)
    }
}
