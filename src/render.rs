use crate::model::PlantState;
use crate::rng::VineRng;
use crate::stages::{stage_name, LAST_STAGE, STAGES};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenderMode {
    Pixel,
    Text,
}

impl RenderMode {
    pub(crate) fn from_text_flag(text_mode: bool) -> Self {
        if text_mode {
            RenderMode::Text
        } else {
            RenderMode::Pixel
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb { r, g, b }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PixelGrid {
    pub(crate) w: u16,
    pub(crate) h: u16,
    /// Row-major; `None` is background.
    pub(crate) px: Vec<Option<Rgb>>,
}

impl PixelGrid {
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Rgb> {
        if x < self.w && y < self.h {
            self.px[(y as usize) * (self.w as usize) + (x as usize)]
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TextGrid {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) chars: Vec<char>,
}

impl TextGrid {
    pub(crate) fn get(&self, x: u16, y: u16) -> char {
        if x < self.w && y < self.h {
            self.chars[(y as usize) * (self.w as usize) + (x as usize)]
        } else {
            ' '
        }
    }

    pub(crate) fn row(&self, y: u16) -> String {
        (0..self.w).map(|x| self.get(x, y)).collect()
    }

    pub(crate) fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.h).map(|y| self.row(y))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Scene {
    Pixels(PixelGrid),
    Text(TextGrid),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HealthBand {
    Lush,
    Stressed,
    Wilting,
}

impl HealthBand {
    pub(crate) fn from_health(health: f64) -> Self {
        if health > 60.0 {
            HealthBand::Lush
        } else if health >= 35.0 {
            HealthBand::Stressed
        } else {
            HealthBand::Wilting
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn sign(self) -> i32 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drift {
    Still,
    Up,
    Sideways,
    Diagonal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tile {
    Soil,
    PotRim,
    Pot,
    Stem,
    Leaf(Side),
    Vine(Side, Drift),
    Blossom,
    BlossomCore,
    Sparkle,
}

/* -----------------------------
   Canvas geometry per mode
------------------------------ */

struct Geometry {
    w: i32,
    h: i32,
    /// First row the plant may occupy.
    top: i32,
    stem_x: i32,
    soil_y: i32,
    soil_half: i32,
    rim_half: i32,
    body_halves: &'static [i32],
    stem_base_len: i32,
    stem_step: i32,
    stem_cap: i32,
    /// Stem rows above the soil where leaves attach, one per leaf stage.
    leaf_rows: [i32; 3],
    leaf_shape: &'static [(i32, i32)],
    vine_start_row: i32,
    vine_steps: (u32, u32),
    vine_steps_max: (u32, u32),
    blossom_petals: &'static [(i32, i32)],
    sparkles: &'static [(i32, i32)],
}

const PIXEL_GEOMETRY: Geometry = Geometry {
    w: 32,
    h: 32,
    top: 0,
    stem_x: 16,
    soil_y: 24,
    soil_half: 5,
    rim_half: 7,
    body_halves: &[6, 6, 5, 5, 4, 4],
    stem_base_len: 4,
    stem_step: 2,
    stem_cap: 12,
    leaf_rows: [4, 6, 9],
    leaf_shape: &[(1, 0), (2, 0), (3, 0), (2, -1), (3, -1), (4, -1)],
    vine_start_row: 5,
    vine_steps: (8, 5),
    vine_steps_max: (12, 6),
    blossom_petals: &[
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (1, -1),
        (-1, 1),
        (1, 1),
        (-2, 0),
        (2, 0),
        (0, -2),
    ],
    sparkles: &[(5, 4), (26, 6), (8, 13), (24, 15), (12, 2), (29, 20)],
};

const TEXT_GEOMETRY: Geometry = Geometry {
    w: 40,
    h: 20,
    top: 1,
    stem_x: 20,
    soil_y: 15,
    soil_half: 5,
    rim_half: 7,
    body_halves: &[6, 5, 4],
    stem_base_len: 3,
    stem_step: 2,
    stem_cap: 8,
    leaf_rows: [3, 5, 7],
    leaf_shape: &[(1, 0)],
    vine_start_row: 4,
    vine_steps: (5, 3),
    vine_steps_max: (8, 4),
    blossom_petals: &[(-1, 0), (1, 0), (0, -1)],
    sparkles: &[(6, 3), (33, 4), (9, 9), (31, 10), (3, 13), (36, 13)],
};

// Leaves appear at these stages, alternating sides, never removed.
const LEAF_STAGES: [(usize, Side); 3] = [(2, Side::Left), (3, Side::Right), (4, Side::Left)];
const VINE_STAGE: usize = 4;

const VINE_SIDE_DRIFT: f32 = 0.55;
const VINE_UP_DRIFT: f32 = 0.35;
const VINE_LEAF_CHANCE: f32 = 0.12;
const VINE_BLOSSOM_CHANCE: f32 = 0.08;

struct Layer<'g> {
    geo: &'g Geometry,
    tiles: Vec<Option<Tile>>,
}

impl<'g> Layer<'g> {
    fn new(geo: &'g Geometry) -> Self {
        Self {
            geo,
            tiles: vec![None; (geo.w * geo.h) as usize],
        }
    }

    fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.clamp(0, self.geo.w - 1),
            y.clamp(self.geo.top, self.geo.h - 1),
        )
    }

    fn idx(&self, x: i32, y: i32) -> usize {
        let (x, y) = self.clamp(x, y);
        (y * self.geo.w + x) as usize
    }

    fn put(&mut self, x: i32, y: i32, tile: Tile) {
        let i = self.idx(x, y);
        self.tiles[i] = Some(tile);
    }

    fn put_if_empty(&mut self, x: i32, y: i32, tile: Tile) {
        let i = self.idx(x, y);
        if self.tiles[i].is_none() {
            self.tiles[i] = Some(tile);
        }
    }
}

/* -----------------------------
   Layout: state -> tiles
------------------------------ */

fn draw_pot(layer: &mut Layer) {
    let g = layer.geo;
    for dx in -g.soil_half..=g.soil_half {
        layer.put(g.stem_x + dx, g.soil_y, Tile::Soil);
    }
    for dx in -g.rim_half..=g.rim_half {
        layer.put(g.stem_x + dx, g.soil_y + 1, Tile::PotRim);
    }
    for (i, half) in g.body_halves.iter().enumerate() {
        let y = g.soil_y + 2 + i as i32;
        for dx in -half..=*half {
            layer.put(g.stem_x + dx, y, Tile::Pot);
        }
    }
}

fn stem_len(g: &Geometry, stage: usize) -> i32 {
    g.stem_base_len + (stage as i32 * g.stem_step).min(g.stem_cap)
}

/// Returns the topmost stem row.
fn draw_stem(layer: &mut Layer, stage: usize) -> i32 {
    let g = layer.geo;
    let base = g.soil_y - 1;
    let len = stem_len(g, stage);
    for i in 0..len {
        layer.put(g.stem_x, base - i, Tile::Stem);
    }
    (base - len + 1).max(g.top)
}

fn draw_leaves(layer: &mut Layer, stage: usize) {
    let g = layer.geo;
    let base = g.soil_y - 1;
    for (i, (min_stage, side)) in LEAF_STAGES.iter().enumerate() {
        if stage < *min_stage {
            continue;
        }
        let y = base - g.leaf_rows[i];
        for (dx, dy) in g.leaf_shape {
            layer.put(g.stem_x + dx * side.sign(), y + dy, Tile::Leaf(*side));
        }
    }
}

fn draw_vines(layer: &mut Layer, stage: usize, rng: &mut VineRng) {
    let g = layer.geo;
    let (base_steps, jitter) = if stage >= LAST_STAGE {
        g.vine_steps_max
    } else {
        g.vine_steps
    };
    let floor_y = g.soil_y - 1;

    for side in [Side::Left, Side::Right] {
        let steps = base_steps + rng.below(jitter);
        let mut x = g.stem_x + side.sign();
        let mut y = floor_y - g.vine_start_row;

        for _ in 0..steps {
            let sideways = rng.roll(VINE_SIDE_DRIFT);
            let up = rng.roll(VINE_UP_DRIFT);
            if sideways {
                x = (x + side.sign()).clamp(0, g.w - 1);
            }
            if up {
                y = (y - 1).clamp(g.top, floor_y);
            }
            let drift = match (sideways, up) {
                (true, true) => Drift::Diagonal,
                (true, false) => Drift::Sideways,
                (false, true) => Drift::Up,
                (false, false) => Drift::Still,
            };
            layer.put_if_empty(x, y, Tile::Vine(side, drift));

            // Both rolls are always drawn so the stream does not depend on stage.
            let leaf = rng.roll(VINE_LEAF_CHANCE);
            let blossom = rng.roll(VINE_BLOSSOM_CHANCE);
            if leaf {
                layer.put_if_empty(x, (y - 1).max(g.top), Tile::Leaf(side));
            }
            if blossom && stage >= LAST_STAGE {
                layer.put_if_empty(x + side.sign(), y, Tile::Blossom);
            }
        }
    }
}

fn draw_blossom_cluster(layer: &mut Layer, stem_top: i32) {
    let g = layer.geo;
    let cy = stem_top - 1;
    for (dx, dy) in g.blossom_petals {
        layer.put(g.stem_x + dx, cy + dy, Tile::Blossom);
    }
    layer.put(g.stem_x, cy, Tile::BlossomCore);
}

fn draw_sparkles(layer: &mut Layer) {
    let g = layer.geo;
    for (x, y) in g.sparkles {
        layer.put_if_empty(*x, *y, Tile::Sparkle);
    }
}

fn layout<'g>(geo: &'g Geometry, stage: usize, state: &PlantState) -> Layer<'g> {
    let mut layer = Layer::new(geo);
    draw_pot(&mut layer);
    let stem_top = draw_stem(&mut layer, stage);
    draw_leaves(&mut layer, stage);
    if stage >= VINE_STAGE {
        let mut rng = VineRng::from_created_secs(state.seed_secs());
        draw_vines(&mut layer, stage, &mut rng);
    }
    if stage >= LAST_STAGE {
        draw_blossom_cluster(&mut layer, stem_top);
    }
    if state.health > 90.0 && state.hydration > 70.0 {
        draw_sparkles(&mut layer);
    }
    layer
}

/* -----------------------------
   Projection: tiles -> pixels / glyphs
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Palette {
    pub(crate) stem: Rgb,
    pub(crate) leaf: Rgb,
    pub(crate) vine: Rgb,
}

pub(crate) const SOIL: Rgb = rgb(92, 60, 40);
pub(crate) const POT_RIM: Rgb = rgb(204, 112, 74);
pub(crate) const POT: Rgb = rgb(176, 92, 60);
pub(crate) const BLOSSOM: Rgb = rgb(240, 120, 170);
pub(crate) const BLOSSOM_CORE: Rgb = rgb(250, 220, 90);
pub(crate) const SPARKLE: Rgb = rgb(255, 255, 214);

pub(crate) fn palette(band: HealthBand) -> Palette {
    match band {
        HealthBand::Lush => Palette {
            stem: rgb(46, 139, 60),
            leaf: rgb(92, 204, 96),
            vine: rgb(60, 170, 120),
        },
        HealthBand::Stressed => Palette {
            stem: rgb(128, 128, 48),
            leaf: rgb(190, 182, 72),
            vine: rgb(150, 150, 90),
        },
        HealthBand::Wilting => Palette {
            stem: rgb(118, 88, 50),
            leaf: rgb(152, 112, 62),
            vine: rgb(120, 100, 80),
        },
    }
}

fn pixel_color(tile: Tile, pal: &Palette) -> Rgb {
    match tile {
        Tile::Soil => SOIL,
        Tile::PotRim => POT_RIM,
        Tile::Pot => POT,
        Tile::Stem => pal.stem,
        Tile::Leaf(_) => pal.leaf,
        Tile::Vine(..) => pal.vine,
        Tile::Blossom => BLOSSOM,
        Tile::BlossomCore => BLOSSOM_CORE,
        Tile::Sparkle => SPARKLE,
    }
}

fn glyph(tile: Tile, band: HealthBand, x: i32, geo: &Geometry) -> char {
    match tile {
        Tile::Soil => ',',
        Tile::PotRim => '=',
        Tile::Pot => {
            if x < geo.stem_x {
                '\\'
            } else if x > geo.stem_x {
                '/'
            } else {
                '_'
            }
        }
        Tile::Stem => match band {
            HealthBand::Lush => '|',
            HealthBand::Stressed => '!',
            HealthBand::Wilting => ':',
        },
        Tile::Leaf(Side::Left) => '<',
        Tile::Leaf(Side::Right) => '>',
        Tile::Vine(side, drift) => match (drift, side) {
            (Drift::Diagonal, Side::Left) => '\\',
            (Drift::Diagonal, Side::Right) => '/',
            (Drift::Up, _) => '|',
            (Drift::Sideways, _) | (Drift::Still, _) => '~',
        },
        Tile::Blossom => '*',
        Tile::BlossomCore => '@',
        Tile::Sparkle => '+',
    }
}

fn pot_glyph_row(layer: &Layer, x: i32, y: i32) -> bool {
    // Only the outermost pot cells get slanted edges; the inside is filled.
    let g = layer.geo;
    let row = y - g.soil_y - 2;
    match g.body_halves.get(row as usize) {
        Some(half) if row >= 0 => (x - g.stem_x).abs() == *half,
        _ => false,
    }
}

pub(crate) fn title_line(stage: usize) -> String {
    format!(
        "Sprout [stage {}/{}: {}]",
        stage + 1,
        STAGES.len(),
        stage_name(stage)
    )
}

pub(crate) fn render(stage: usize, state: &PlantState, mode: RenderMode) -> Scene {
    let stage = stage.min(LAST_STAGE);
    let band = HealthBand::from_health(state.health);
    match mode {
        RenderMode::Pixel => {
            let geo = &PIXEL_GEOMETRY;
            let layer = layout(geo, stage, state);
            let pal = palette(band);
            Scene::Pixels(PixelGrid {
                w: geo.w as u16,
                h: geo.h as u16,
                px: layer
                    .tiles
                    .iter()
                    .map(|t| t.map(|t| pixel_color(t, &pal)))
                    .collect(),
            })
        }
        RenderMode::Text => {
            let geo = &TEXT_GEOMETRY;
            let layer = layout(geo, stage, state);
            let mut chars: Vec<char> = layer
                .tiles
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let x = i as i32 % geo.w;
                    let y = i as i32 / geo.w;
                    match t {
                        Some(Tile::Pot) if !pot_glyph_row(&layer, x, y) => '#',
                        Some(t) => glyph(*t, band, x, geo),
                        None => ' ',
                    }
                })
                .collect();
            for (i, ch) in title_line(stage).chars().take(geo.w as usize - 1).enumerate() {
                chars[1 + i] = ch;
            }
            Scene::Text(TextGrid {
                w: geo.w as u16,
                h: geo.h as u16,
                chars,
            })
        }
    }
}
