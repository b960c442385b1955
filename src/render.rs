//! Terminal rendering: a cell buffer flushed with crossterm, and the scene
//! drawing on top of the [`Renderer`] trait.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::config::{GROUND_LINE_ROW, PLAYFIELD_HEIGHT, TEXTURE_ROW};
use crate::session::Session;
use crate::sprite::Sprite;

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    fn to_color(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const CACTUS: Rgb = Rgb(74, 122, 26);
const CACTUS_HI: Rgb = Rgb(100, 170, 40);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(120, 95, 50);
const BIRD: Rgb = Rgb(150, 60, 30);
const DINO: Rgb = Rgb(50, 50, 50);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Renderer ────────────────────────────────────────────────────────────────

/// A fixed-size grid of character cells.
pub trait Renderer {
    fn clear(&mut self);
    fn draw_cell(&mut self, x: i32, y: i32, glyph: char, fg: Rgb, bg: Rgb);
    fn flush(&mut self) -> io::Result<()>;
    fn measure(&self) -> (u16, u16);
    fn resize(&mut self, width: u16, height: u16);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    fg: SHADOW,
    bg: SKY_TOP,
};

// ── Cell buffer ─────────────────────────────────────────────────────────────

pub struct CellBuf {
    w: usize,
    h: usize,
    cells: Vec<Cell>,
}

impl CellBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            cells: vec![BLANK; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.cells.clear();
        self.cells.resize(w * h, BLANK);
    }

    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.cells[y as usize * self.w + x as usize] = cell;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.w && y < self.h {
            self.cells.get(y * self.w + x)
        } else {
            None
        }
    }

    /// Write the whole buffer, changing colours only where they change.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let mut prev_fg = None;
        let mut prev_bg = None;

        for row in 0..self.h {
            for cell in &self.cells[row * self.w..(row + 1) * self.w] {
                if prev_fg != Some(cell.fg) {
                    queue!(out, style::SetForegroundColor(cell.fg.to_color()))?;
                    prev_fg = Some(cell.fg);
                }
                if prev_bg != Some(cell.bg) {
                    queue!(out, style::SetBackgroundColor(cell.bg.to_color()))?;
                    prev_bg = Some(cell.bg);
                }
                queue!(out, style::Print(cell.glyph))?;
            }
            if row + 1 < self.h {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                prev_fg = None;
                prev_bg = None;
            }
        }

        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

/// A [`CellBuf`] bound to an output stream.
pub struct Screen<W: Write> {
    buf: CellBuf,
    out: W,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            buf: CellBuf::new(width as usize, height as usize),
            out,
        }
    }

    pub fn buffer(&self) -> &CellBuf {
        &self.buf
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Renderer for Screen<W> {
    fn clear(&mut self) {
        self.buf.fill(BLANK);
    }

    fn draw_cell(&mut self, x: i32, y: i32, glyph: char, fg: Rgb, bg: Rgb) {
        self.buf.set(x, y, Cell { glyph, fg, bg });
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buf.render(&mut self.out)
    }

    fn measure(&self) -> (u16, u16) {
        (self.buf.w as u16, self.buf.h as u16)
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.buf.resize(width as usize, height as usize);
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Maps playfield rows onto screen rows, centring the playfield vertically.
struct Layout {
    width: i32,
    height: i32,
    top: i32,
}

impl Layout {
    fn new(renderer: &impl Renderer) -> Self {
        let (width, height) = renderer.measure();
        let top = (height.saturating_sub(PLAYFIELD_HEIGHT) / 2) as i32;
        Self {
            width: width as i32,
            height: height as i32,
            top,
        }
    }

    fn screen_row(&self, row: i32) -> i32 {
        self.top + row
    }

    /// Background colour of a playfield row.
    fn background(&self, row: i32) -> Rgb {
        if row > GROUND_LINE_ROW {
            return DIRT;
        }
        let t = (row.clamp(0, GROUND_LINE_ROW) * 256 / GROUND_LINE_ROW.max(1)) as u16;
        Rgb::lerp(SKY_TOP, SKY_BOT, t)
    }
}

fn draw_sprite(r: &mut impl Renderer, layout: &Layout, x: i32, top: i32, sprite: Sprite, fg: Rgb) {
    for (col, row, glyph) in sprite.cells() {
        let y = top + row;
        r.draw_cell(x + col, layout.screen_row(y), glyph, fg, layout.background(y));
    }
}

fn draw_text(r: &mut impl Renderer, layout: &Layout, x: i32, row: i32, text: &str, fg: Rgb, bg: Option<Rgb>) {
    let bg = bg.unwrap_or_else(|| layout.background(row));
    for (i, glyph) in text.chars().enumerate() {
        r.draw_cell(x + i as i32, layout.screen_row(row), glyph, fg, bg);
    }
}

fn draw_text_centered(r: &mut impl Renderer, layout: &Layout, row: i32, text: &str, fg: Rgb, bg: Option<Rgb>) {
    let x = (layout.width - text.chars().count() as i32) / 2;
    draw_text(r, layout, x, row, text, fg, bg);
}

fn draw_background(r: &mut impl Renderer, layout: &Layout) {
    for y in 0..layout.height {
        let bg = layout.background(y - layout.top);
        for x in 0..layout.width {
            r.draw_cell(x, y, ' ', SHADOW, bg);
        }
    }
}

fn draw_ground(r: &mut impl Renderer, layout: &Layout, session: &Session) {
    let ground = &session.ground;
    let (start, end) = ground.revealed();
    let line = layout.screen_row(GROUND_LINE_ROW);
    let line_bg = layout.background(GROUND_LINE_ROW);

    for x in start..=end.min(layout.width - 1) {
        r.draw_cell(x, line, '_', DIRT_DARK, line_bg);
    }
    for mark in ground.marks() {
        let x = mark.x as i32;
        if ground.is_revealed(x) {
            r.draw_cell(x, line, mark.glyph, DIRT_DARK, line_bg);
        }
    }
    for pebble in ground.pebbles() {
        let x = pebble.x as i32;
        if ground.is_revealed(x) {
            r.draw_cell(x, layout.screen_row(TEXTURE_ROW), pebble.glyph, DIRT_DARK, DIRT);
        }
    }
}

fn draw_hud(r: &mut impl Renderer, layout: &Layout, session: &Session) {
    let hi = format!("HI {:05}", session.high_score);
    let text = if session.score_visible() {
        format!("{hi}  {:05}", session.score)
    } else {
        format!("{hi}  {:5}", "")
    };
    let x = layout.width - text.chars().count() as i32 - 1;
    draw_text(r, layout, x, 0, &text, SHADOW, None);
}

fn draw_game_over(r: &mut impl Renderer, layout: &Layout, session: &Session, muted: bool) {
    let mut lines = vec!["G A M E   O V E R".to_string()];
    if session.new_record {
        lines.push(format!("NEW HIGH SCORE {:05}", session.high_score));
    }
    lines.push("R restart   Q quit".to_string());
    lines.push(format!("sound {} (M)", if muted { "off" } else { "on" }));

    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
    let panel_w = inner + 4;
    let panel_x = (layout.width - panel_w) / 2;
    let first = 4;

    for row in first - 1..first + lines.len() as i32 + 1 {
        for dx in 0..panel_w {
            r.draw_cell(panel_x + dx, layout.screen_row(row), ' ', WHITE, SHADOW);
        }
    }
    for (i, line) in lines.iter().enumerate() {
        draw_text_centered(r, layout, first + i as i32, line, WHITE, Some(SHADOW));
    }
}

/// Compose one frame of `session` into `r`. Does not flush.
pub fn draw_session(r: &mut impl Renderer, session: &Session, muted: bool) {
    r.clear();
    let layout = Layout::new(&*r);
    draw_background(r, &layout);

    for cloud in session.clouds.iter() {
        draw_sprite(r, &layout, cloud.column(), cloud.row, cloud.sprite, WHITE);
    }

    draw_ground(r, &layout, session);

    for obstacle in session.obstacles.iter() {
        let hitbox = obstacle.hitbox();
        let fg = if obstacle.kind.is_bird() { BIRD } else { CACTUS };
        for (col, row, glyph) in hitbox.sprite.cells() {
            let x = hitbox.x + col;
            if !session.ground.is_revealed(x) {
                continue;
            }
            let y = hitbox.y + row;
            let fg = if glyph == '|' && !obstacle.kind.is_bird() { CACTUS_HI } else { fg };
            r.draw_cell(x, layout.screen_row(y), glyph, fg, layout.background(y));
        }
    }

    let player = session.player.hitbox();
    draw_sprite(r, &layout, player.x, player.y, player.sprite, DINO);

    draw_hud(r, &layout, session);

    if !session.started {
        draw_text_centered(r, &layout, 5, "Press SPACE to start", SHADOW, None);
        draw_text_centered(r, &layout, 7, "SPACE/UP jump   DOWN duck   P pause   M mute   Q quit", SHADOW, None);
    } else if session.collided {
        draw_game_over(r, &layout, session, muted);
    } else if session.paused {
        draw_text_centered(r, &layout, 5, "PAUSED", SHADOW, None);
    }
}
