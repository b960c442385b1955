//! Pixel-exact collision between sprites placed in cell coordinates.

use crate::sprite::Sprite;

/// A sprite placed on the playfield by its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub x: i32,
    pub y: i32,
    pub sprite: Sprite,
}

impl Hitbox {
    pub fn new(x: i32, y: i32, sprite: Sprite) -> Self {
        Self { x, y, sprite }
    }

    /// Place `sprite` so that its bottom row sits on `bottom_row`.
    pub fn standing_on(x: i32, bottom_row: i32, sprite: Sprite) -> Self {
        Self::new(x, bottom_row - (sprite.height() - 1), sprite)
    }

    /// Inclusive right column.
    pub fn right(&self) -> i32 {
        self.x + self.sprite.width() - 1
    }

    /// Inclusive bottom row.
    pub fn bottom(&self) -> i32 {
        self.y + self.sprite.height() - 1
    }

    fn is_solid_at(&self, x: i32, y: i32) -> bool {
        self.sprite.is_solid(x - self.x, y - self.y)
    }
}

/// True when both sprites have a solid glyph on the same absolute cell.
pub fn overlaps(a: &Hitbox, b: &Hitbox) -> bool {
    // Quick reject on bounding boxes
    if a.right() < b.x || b.right() < a.x || a.bottom() < b.y || b.bottom() < a.y {
        return false;
    }

    let (x_start, x_end) = (a.x.max(b.x), a.right().min(b.right()));
    let (y_start, y_end) = (a.y.max(b.y), a.bottom().min(b.bottom()));

    (y_start..=y_end).any(|y| (x_start..=x_end).any(|x| a.is_solid_at(x, y) && b.is_solid_at(x, y)))
}

/// Index of the first hitbox in `others` that `player` collides with.
pub fn first_hit<I>(player: &Hitbox, others: I) -> Option<usize>
where
    I: IntoIterator<Item = Hitbox>,
{
    others.into_iter().position(|other| overlaps(player, &other))
}
