//! Tetromino geometry: fixed mino layouts per variant and rotation state.

use crate::canvas::Sprite;

/// One unit cell of a piece, relative to the piece's local origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mino {
    pub row: i32,
    pub column: i32,
}

const fn m(row: i32, column: i32) -> Mino {
    Mino { row, column }
}

type RotationTable = [[Mino; 4]; 4];

// Rows grow downwards. Index 0 is the spawn state, then clockwise.
const I_TABLE: RotationTable = [
    [m(0, 0), m(0, 1), m(0, 2), m(0, 3)],
    [m(-1, 2), m(0, 2), m(1, 2), m(2, 2)],
    [m(1, 0), m(1, 1), m(1, 2), m(1, 3)],
    [m(-1, 1), m(0, 1), m(1, 1), m(2, 1)],
];
const J_TABLE: RotationTable = [
    [m(0, 0), m(1, 0), m(1, 1), m(1, 2)],
    [m(0, 1), m(0, 2), m(1, 1), m(2, 1)],
    [m(1, 0), m(1, 1), m(1, 2), m(2, 2)],
    [m(0, 1), m(1, 1), m(2, 0), m(2, 1)],
];
const L_TABLE: RotationTable = [
    [m(0, 2), m(1, 0), m(1, 1), m(1, 2)],
    [m(0, 1), m(1, 1), m(2, 1), m(2, 2)],
    [m(1, 0), m(1, 1), m(1, 2), m(2, 0)],
    [m(0, 0), m(0, 1), m(1, 1), m(2, 1)],
];
const O_TABLE: RotationTable = [[m(0, 0), m(0, 1), m(1, 0), m(1, 1)]; 4];
const S_TABLE: RotationTable = [
    [m(0, 1), m(0, 2), m(1, 0), m(1, 1)],
    [m(0, 1), m(1, 1), m(1, 2), m(2, 2)],
    [m(1, 1), m(1, 2), m(2, 0), m(2, 1)],
    [m(0, 0), m(1, 0), m(1, 1), m(2, 1)],
];
const T_TABLE: RotationTable = [
    [m(0, 1), m(1, 0), m(1, 1), m(1, 2)],
    [m(0, 1), m(1, 1), m(1, 2), m(2, 1)],
    [m(1, 0), m(1, 1), m(1, 2), m(2, 1)],
    [m(0, 1), m(1, 0), m(1, 1), m(2, 1)],
];
const Z_TABLE: RotationTable = [
    [m(0, 0), m(0, 1), m(1, 1), m(1, 2)],
    [m(0, 2), m(1, 1), m(1, 2), m(2, 1)],
    [m(1, 0), m(1, 1), m(2, 1), m(2, 2)],
    [m(0, 1), m(1, 0), m(1, 1), m(2, 0)],
];

/// The seven standard variants, in key/generator order (I, J, L, O, S, T, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl TetrominoKind {
    /// Lookup table from generator index to variant.
    pub const ALL: [Self; 7] = [Self::I, Self::J, Self::L, Self::O, Self::S, Self::T, Self::Z];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn table(self) -> &'static RotationTable {
        match self {
            Self::I => &I_TABLE,
            Self::J => &J_TABLE,
            Self::L => &L_TABLE,
            Self::O => &O_TABLE,
            Self::S => &S_TABLE,
            Self::T => &T_TABLE,
            Self::Z => &Z_TABLE,
        }
    }

    /// Minoes occupied in the given rotation state.
    pub fn minoes(self, rotation: Rotation) -> &'static [Mino; 4] {
        &self.table()[rotation as usize]
    }

    /// Vertical shift at placement: puts the lowest spawn-state row on the spawn row.
    pub fn spawn_offset(self) -> i32 {
        match self {
            Self::I => 0,
            _ => -1,
        }
    }
}

/// Rotation state, clockwise from spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Spawn,
    Right,
    Half,
    Left,
}

impl Rotation {
    const ORDER: [Self; 4] = [Self::Spawn, Self::Right, Self::Half, Self::Left];

    pub fn cw(self) -> Self {
        Self::ORDER[(self as usize + 1) % 4]
    }

    pub fn ccw(self) -> Self {
        Self::ORDER[(self as usize + 3) % 4]
    }
}

/// A piece ready to be placed: variant, rotation and the sprite for its minoes.
#[derive(Debug, Clone)]
pub struct Tetromino {
    kind: TetrominoKind,
    rotation: Rotation,
    sprite: Sprite,
}

impl Tetromino {
    pub fn new(kind: TetrominoKind, sprite: Sprite) -> Self {
        Self {
            kind,
            rotation: Rotation::Spawn,
            sprite,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn kind(&self) -> TetrominoKind {
        self.kind
    }

    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn minoes(&self) -> &'static [Mino; 4] {
        self.kind.minoes(self.rotation)
    }

    pub fn spawn_offset(&self) -> i32 {
        self.kind.spawn_offset()
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}
