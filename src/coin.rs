//! Coins and the LIFO stack they live in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Cell;

/// A collectible with a permanent identity: the cell it was minted in plus a
/// serial unique within that cell. Moving a coin never changes either field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub origin: Cell,
    pub serial: u32,
}

impl Coin {
    pub const fn new(origin: Cell, serial: u32) -> Self {
        Self { origin, serial }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.origin.i, self.origin.j, self.serial)
    }
}

/// Ordered coin holder. The last element is the "top": pushes land there and
/// pops take from there.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoinStack {
    coins: Vec<Coin>,
}

impl CoinStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` fresh coins minted in `origin`, serial `count - 1` on top.
    pub fn minted(origin: Cell, count: u32) -> Self {
        Self {
            coins: (0..count).map(|serial| Coin::new(origin, serial)).collect(),
        }
    }

    pub fn push(&mut self, coin: Coin) {
        self.coins.push(coin);
    }

    pub fn pop(&mut self) -> Option<Coin> {
        self.coins.pop()
    }

    pub fn peek(&self) -> Option<&Coin> {
        self.coins.last()
    }

    /// Remove a specific coin wherever it sits, keeping the order of the rest.
    pub fn take(&mut self, coin: &Coin) -> Option<Coin> {
        let idx = self.coins.iter().position(|c| c == coin)?;
        Some(self.coins.remove(idx))
    }

    pub fn contains(&self, coin: &Coin) -> bool {
        self.coins.contains(coin)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn clear(&mut self) {
        self.coins.clear();
    }

    /// Bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.coins.iter()
    }

    pub fn as_slice(&self) -> &[Coin] {
        &self.coins
    }
}

impl From<Vec<Coin>> for CoinStack {
    fn from(coins: Vec<Coin>) -> Self {
        Self { coins }
    }
}

impl FromIterator<Coin> for CoinStack {
    fn from_iter<T: IntoIterator<Item = Coin>>(iter: T) -> Self {
        Self {
            coins: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CoinStack {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.coins.iter()
    }
}
