//! Glyph-grid sprites. A space is transparent; every other glyph is solid.

/// An immutable multi-line glyph grid.
///
/// Rows may have different lengths; missing cells at the end of a short row
/// are transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    rows: &'static [&'static str],
}

impl Sprite {
    pub const fn new(rows: &'static [&'static str]) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    pub fn width(&self) -> i32 {
        self.rows
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0) as i32
    }

    /// The solid glyph at (`col`, `row`), or `None` for transparent and
    /// out-of-bounds cells.
    pub fn glyph(&self, col: i32, row: i32) -> Option<char> {
        if col < 0 || row < 0 {
            return None;
        }
        self.rows
            .get(row as usize)
            .and_then(|line| line.chars().nth(col as usize))
            .filter(|&ch| ch != ' ')
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.glyph(col, row).is_some()
    }

    /// Every solid cell as `(col, row, glyph)`.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, char)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, line)| {
            line.chars()
                .enumerate()
                .filter(|&(_, ch)| ch != ' ')
                .map(move |(col, ch)| (col as i32, row as i32, ch))
        })
    }
}

// ── Player ──────────────────────────────────────────────────────────────────

pub const PLAYER_RUN: [Sprite; 2] = [
    Sprite::new(&[
        r"   .--.",
        r"   |o_|",
        r"\__/ |'",
        r"  / \  ",
    ]),
    Sprite::new(&[
        r"   .--.",
        r"   |o_|",
        r"\__/ |'",
        r"  |  \ ",
    ]),
];

pub const PLAYER_JUMP: Sprite = Sprite::new(&[
    r"   .--.",
    r"   |o_|",
    r"\__/ |'",
    r"  ^ ^  ",
]);

pub const PLAYER_DUCK: [Sprite; 2] = [
    Sprite::new(&[
        r"\__..--.  ",
        r"  /\ '--o>",
    ]),
    Sprite::new(&[
        r"\__..--.  ",
        r"  |\ '--o>",
    ]),
];

// ── Obstacles ───────────────────────────────────────────────────────────────

pub const CACTUS_SINGLE: [Sprite; 1] = [Sprite::new(&[
    r" | ",
    r"(|)",
    r" | ",
])];

pub const CACTUS_SHORT: [Sprite; 1] = [Sprite::new(&[
    r"\|/",
    r" | ",
])];

pub const CACTUS_GROUP: [Sprite; 1] = [Sprite::new(&[
    r" |   | ",
    r"(|)|(|)",
    r" | | | ",
])];

pub const SMALL_BIRD: [Sprite; 2] = [
    Sprite::new(&[
        r" \  ",
        r"=-o>",
    ]),
    Sprite::new(&[
        r"=-o>",
        r" /  ",
    ]),
];

pub const BIG_BIRD: [Sprite; 2] = [
    Sprite::new(&[
        r"  \\   ",
        r"<=(O)=>",
        r"       ",
    ]),
    Sprite::new(&[
        r"       ",
        r"<=(O)=>",
        r"  //   ",
    ]),
];

// ── Scenery ─────────────────────────────────────────────────────────────────

pub const CLOUDS: [Sprite; 3] = [
    Sprite::new(&[
        r"  .--.  ",
        r".(    ).",
        r"(___.__)",
    ]),
    Sprite::new(&[
        r" .-. ",
        r"(   )",
        r" `-' ",
    ]),
    Sprite::new(&[
        r"   .-~~-.   ",
        r".-(      )-.",
        r"(__________)",
    ]),
];
