//! Fixed six-face tables for the black and green dice.

use serde::{Deserialize, Serialize};

pub const FACES_PER_DIE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Success,
    Tentacle,
    ElderSign,
    Blank,
}

impl Symbol {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Tentacle => "tentacle",
            Self::ElderSign => "elder_sign",
            Self::Blank => "blank",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Success => 0b001,
            Self::Tentacle => 0b010,
            Self::ElderSign => 0b100,
            Self::Blank => 0,
        }
    }
}

/// Immutable set of symbols printed on one face. The empty set is the blank face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DieFace {
    symbols: u8,
}

impl DieFace {
    pub const BLANK: Self = Self { symbols: 0 };
    pub const SUCCESS: Self = Self::of(Symbol::Success);
    pub const TENTACLE: Self = Self::of(Symbol::Tentacle);
    pub const ELDER_SIGN: Self = Self::of(Symbol::ElderSign);
    pub const SUCCESS_TENTACLE: Self = Self::SUCCESS.with(Symbol::Tentacle);
    pub const SUCCESS_ELDER_SIGN: Self = Self::SUCCESS.with(Symbol::ElderSign);

    pub const fn of(symbol: Symbol) -> Self {
        Self {
            symbols: symbol.bit(),
        }
    }

    pub const fn with(self, symbol: Symbol) -> Self {
        Self {
            symbols: self.symbols | symbol.bit(),
        }
    }

    pub const fn has(self, symbol: Symbol) -> bool {
        match symbol {
            Symbol::Blank => self.symbols == 0,
            other => self.symbols & other.bit() != 0,
        }
    }

    pub const fn is_blank(self) -> bool {
        self.symbols == 0
    }

    pub fn symbols(self) -> Vec<Symbol> {
        if self.is_blank() {
            return vec![Symbol::Blank];
        }
        [Symbol::Success, Symbol::Tentacle, Symbol::ElderSign]
            .into_iter()
            .filter(|symbol| self.has(*symbol))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieKind {
    Black,
    Green,
}

const BLACK_FACES: [DieFace; FACES_PER_DIE] = [
    DieFace::SUCCESS,
    DieFace::SUCCESS,
    DieFace::SUCCESS_TENTACLE,
    DieFace::TENTACLE,
    DieFace::ELDER_SIGN,
    DieFace::BLANK,
];

const GREEN_FACES: [DieFace; FACES_PER_DIE] = [
    DieFace::BLANK,
    DieFace::BLANK,
    DieFace::ELDER_SIGN,
    DieFace::SUCCESS,
    DieFace::SUCCESS,
    DieFace::SUCCESS_ELDER_SIGN,
];

impl DieKind {
    pub const ALL: [DieKind; 2] = [DieKind::Black, DieKind::Green];

    pub const fn faces(self) -> &'static [DieFace; FACES_PER_DIE] {
        match self {
            Self::Black => &BLACK_FACES,
            Self::Green => &GREEN_FACES,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Green => "green",
        }
    }

    /// Number of faces carrying `symbol`.
    pub fn count_faces_with(self, symbol: Symbol) -> usize {
        self.faces().iter().filter(|face| face.has(symbol)).count()
    }

    /// Probability of each face, in table order.
    pub fn face_probabilities(self) -> [f64; FACES_PER_DIE] {
        [1.0 / FACES_PER_DIE as f64; FACES_PER_DIE]
    }
}
