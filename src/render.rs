use crate::model::{Rgb, Track, Vec2, World};
use crate::sim::ellipse_point;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::TAU;
use std::io::{self, Write};

const BG: Color = Color::Black;
// Cells are roughly twice as tall as wide; squash y to keep orbits round.
const Y_SQUASH: f32 = 0.5;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn scale_rgb(c: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    Rgb {
        r: (c.r as f32 * t) as u8,
        g: (c.g as f32 * t) as u8,
        b: (c.b as f32 * t) as u8,
    }
}

fn tint(enable_color: bool, c: Rgb) -> Color {
    if enable_color {
        Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    } else {
        Color::White
    }
}

// -------------------- Cell buffer --------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    pub(crate) fn blank() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg: BG,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::blank(); (w as usize) * (h as usize)],
        }
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::blank());
    }
}

fn plot(buf: &mut CellBuffer, x: f32, y: f32, ch: char, fg: Color) {
    let xi = x.round() as i32;
    let yi = y.round() as i32;
    if xi < 0 || yi < 0 || xi >= buf.w as i32 || yi >= buf.h as i32 {
        return;
    }
    buf.set(xi as u16, yi as u16, Cell { ch, fg, bg: BG });
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg: BG });
    }
}

fn draw_box(buf: &mut CellBuffer, x0: u16, y0: u16, bw: u16, bh: u16, fg: Color) {
    if bw < 2 || bh < 2 {
        return;
    }
    let x1 = x0.saturating_add(bw - 1);
    let y1 = y0.saturating_add(bh - 1);

    for x in x0 + 1..x1 {
        buf.set(x, y0, Cell { ch: '─', fg, bg: BG });
        buf.set(x, y1, Cell { ch: '─', fg, bg: BG });
    }
    for y in y0 + 1..y1 {
        buf.set(x0, y, Cell { ch: '│', fg, bg: BG });
        buf.set(x1, y, Cell { ch: '│', fg, bg: BG });
        for x in x0 + 1..x1 {
            buf.set(x, y, Cell::blank());
        }
    }
    buf.set(x0, y0, Cell { ch: '┌', fg, bg: BG });
    buf.set(x1, y0, Cell { ch: '┐', fg, bg: BG });
    buf.set(x0, y1, Cell { ch: '└', fg, bg: BG });
    buf.set(x1, y1, Cell { ch: '┘', fg, bg: BG });
}

// -------------------- Terminal --------------------

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        execute!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

// -------------------- Starfield --------------------

#[derive(Clone, Copy)]
pub(crate) struct Star {
    x: u16,
    y: u16,
    phase: f32,
    depth: f32,
}

pub(crate) fn build_stars(w: u16, h: u16, count: usize, seed: u64) -> Vec<Star> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stars = Vec::with_capacity(count);
    if w == 0 || h == 0 {
        return stars;
    }
    for _ in 0..count {
        stars.push(Star {
            x: rng.gen_range(0..w),
            y: rng.gen_range(0..h),
            phase: rng.gen_range(0.0..TAU),
            depth: rng.gen_range(0.3..1.0),
        });
    }
    stars
}

fn draw_stars(buf: &mut CellBuffer, stars: &[Star], t_real: f32) {
    for s in stars {
        let tw = (t_real * 0.7 + s.phase).sin() * 0.5 + 0.5;
        let glow = lerp(0.15, 1.0, tw * s.depth);
        let v = (50.0 + glow * 170.0).clamp(0.0, 255.0) as u8;
        let ch = if glow > 0.85 {
            '✦'
        } else if glow > 0.55 {
            '•'
        } else {
            '·'
        };
        buf.set(
            s.x,
            s.y,
            Cell {
                ch,
                fg: Color::Rgb {
                    r: v,
                    g: v,
                    b: (v as u16 + 20).min(255) as u8,
                },
                bg: BG,
            },
        );
    }
}

// -------------------- Scene --------------------

struct Proj {
    cx: f32,
    cy: f32,
    s: f32,
}

impl Proj {
    fn new(w: u16, h: u16, bounds: Vec2, zoom: f32) -> Self {
        let sx = (w as f32 * 0.5 - 2.0).max(1.0) / bounds.x;
        let sy = (h as f32 * 0.5 - 2.0).max(1.0) / (bounds.y * Y_SQUASH);
        Self {
            cx: w as f32 * 0.5,
            cy: h as f32 * 0.5,
            s: sx.min(sy) * zoom,
        }
    }

    fn apply(&self, p: Vec2) -> (f32, f32) {
        (
            self.cx + p.x * self.s,
            self.cy - p.y * self.s * Y_SQUASH,
        )
    }
}

pub(crate) fn draw_scene(
    buf: &mut CellBuffer,
    world: &World,
    stars: &[Star],
    zoom: f32,
    t_real: f32,
    enable_color: bool,
) {
    let proj = Proj::new(buf.w, buf.h, world.bounds, zoom);
    let ink = |c: Rgb| tint(enable_color, c);
    let guide = ink(Rgb { r: 85, g: 85, b: 95 });
    let dim = ink(Rgb { r: 170, g: 175, b: 185 });

    draw_stars(buf, stars, t_real);

    if world.params.show_orbits {
        draw_orbit_guides(buf, world, &proj, guide);
    }

    if world.params.show_trails {
        for b in &world.bodies {
            draw_trail(buf, b.trail.iter(), b.trail.len(), b.color, &proj, enable_color);
        }
    }
    draw_trail(
        buf,
        world.comet.trail.iter(),
        world.comet.trail.len(),
        Rgb { r: 190, g: 220, b: 235 },
        &proj,
        enable_color,
    );

    draw_sun(buf, &proj, enable_color);

    for (i, b) in world.bodies.iter().enumerate() {
        let (px, py) = proj.apply(b.pos);

        if b.ringed {
            let ring = ink(Rgb { r: 200, g: 170, b: 90 });
            for dx in [-2.0f32, -1.0, 1.0, 2.0] {
                plot(buf, px + dx, py, '─', ring);
            }
        }

        let selected = world.params.selected == Some(i);
        let ch = if selected {
            '◆'
        } else if b.size >= 0.5 {
            '●'
        } else {
            '•'
        };
        plot(buf, px, py, ch, ink(b.color));

        if world.params.show_labels {
            let fg = if selected { ink(b.color) } else { dim };
            let xi = (px + 2.0).round() as i32;
            let yi = py.round() as i32;
            if xi >= 0 && yi >= 0 {
                draw_text(buf, xi as u16, yi as u16, b.name, fg);
            }
        }
    }

    let (cx, cy) = proj.apply(world.comet.pos);
    plot(buf, cx, cy, '✦', ink(Rgb { r: 235, g: 245, b: 255 }));

    draw_hud(buf, world, zoom, dim);
    if let Some(i) = world.params.selected {
        draw_info_panel(buf, world, i, enable_color);
    }
    if world.params.show_help {
        draw_help_overlay(buf, world.params.speed_step, dim);
    }
}

fn draw_orbit_guides(buf: &mut CellBuffer, world: &World, proj: &Proj, guide: Color) {
    for b in &world.bodies {
        match b.track {
            Track::Ellipse(o) => {
                for deg in 0..360 {
                    let (px, py) = proj.apply(ellipse_point(o.a, o.b, o.tilt_deg, deg as f32));
                    plot(buf, px, py, '·', guide);
                }
            }
            Track::AroundBody { parent, radius } => {
                // Guide circle rides on the parent's current position.
                let base = world.bodies[parent].pos;
                for step in 0..120 {
                    let th = TAU * (step as f32 / 120.0);
                    let p = Vec2 {
                        x: base.x + radius * th.cos(),
                        y: base.y + radius * th.sin(),
                    };
                    let (px, py) = proj.apply(p);
                    plot(buf, px, py, '·', guide);
                }
            }
        }
    }
}

fn draw_trail<'a>(
    buf: &mut CellBuffer,
    points: impl Iterator<Item = &'a Vec2>,
    len: usize,
    color: Rgb,
    proj: &Proj,
    enable_color: bool,
) {
    for (ti, p) in points.enumerate() {
        let fade = lerp(0.15, 0.9, ti as f32 / len.max(1) as f32);
        let fg = tint(enable_color, scale_rgb(color, fade));
        let (px, py) = proj.apply(*p);
        plot(buf, px, py, '·', fg);
    }
}

fn draw_sun(buf: &mut CellBuffer, proj: &Proj, enable_color: bool) {
    let core = tint(enable_color, Rgb { r: 253, g: 184, b: 19 });
    let glow = tint(enable_color, Rgb { r: 200, g: 140, b: 30 });
    let halo = tint(enable_color, Rgb { r: 140, g: 95, b: 25 });

    // Core and glow radii in scene units.
    let (r_core, r_mid, r_halo) = (20.0, 34.0, 46.0);

    let span_x = (r_halo * proj.s).ceil() as i32 + 1;
    let span_y = (r_halo * proj.s * Y_SQUASH).ceil() as i32 + 1;
    for dy in -span_y..=span_y {
        for dx in -span_x..=span_x {
            let wx = dx as f32 / proj.s;
            let wy = dy as f32 / (proj.s * Y_SQUASH);
            let d = (wx * wx + wy * wy).sqrt();
            let x = proj.cx + dx as f32;
            let y = proj.cy + dy as f32;
            if d <= r_core {
                plot(buf, x, y, '●', core);
            } else if d <= r_mid {
                if (dx + dy) & 1 == 0 {
                    plot(buf, x, y, '•', glow);
                }
            } else if d <= r_halo {
                if (dx * 2 + dy).rem_euclid(3) == 0 {
                    plot(buf, x, y, '·', halo);
                }
            }
        }
    }
}

fn draw_hud(buf: &mut CellBuffer, world: &World, zoom: f32, dim: Color) {
    let p = &world.params;
    let status = format!(
        "solarium  |  {}  |  tick {}  |  speed x{:.2}  |  zoom {:.2}  |  trails {}  orbits {}  labels {}",
        if p.paused { "paused" } else { "running" },
        world.ticks,
        p.speed_scale,
        zoom,
        onoff(p.show_trails),
        onoff(p.show_orbits),
        onoff(p.show_labels),
    );
    draw_text(buf, 1, 0, &status, Color::White);

    let help = "[space] pause  [+/-] speed  [t] trails  [o] orbits  [l] labels  [1-9/0] info  [r] clear  [w/s] zoom  [i] help  [q] quit";
    draw_text(buf, 1, buf.h.saturating_sub(1), help, dim);
}

fn onoff(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}

fn draw_info_panel(buf: &mut CellBuffer, world: &World, idx: usize, enable_color: bool) {
    let b = &world.bodies[idx];
    let bw = 30u16;
    let bh = 9u16;
    if buf.w < bw + 2 || buf.h < bh + 2 {
        return;
    }
    let x0 = buf.w - bw - 1;
    let y0 = 1;

    draw_box(buf, x0, y0, bw, bh, tint(enable_color, Rgb { r: 90, g: 100, b: 120 }));

    let lines = [
        b.name.to_string(),
        format!("diameter: {:.0} km", b.facts.diameter_km),
        format!("mass: {:.2e} kg", b.facts.mass_kg),
        format!("density: {:.2} g/cm3", b.facts.density_g_cm3),
        format!("from Earth: {} Mkm", b.facts.distance_mkm),
        format!("angle: {:.1} deg", b.angle_deg),
        format!("speed: {:.2} deg/tick", b.speed_deg),
    ];
    for (i, line) in lines.iter().enumerate() {
        let fg = if i == 0 {
            tint(enable_color, b.color)
        } else {
            tint(enable_color, Rgb { r: 180, g: 185, b: 195 })
        };
        draw_text(buf, x0 + 2, y0 + 1 + i as u16, line, fg);
    }
}

fn draw_help_overlay(buf: &mut CellBuffer, speed_step: f32, dim: Color) {
    let bw = 46u16.min(buf.w.saturating_sub(2));
    let bh = 14u16.min(buf.h.saturating_sub(2));
    if bw < 20 || bh < 6 {
        return;
    }
    let x0 = (buf.w - bw) / 2;
    let y0 = (buf.h - bh) / 2;

    draw_box(buf, x0, y0, bw, bh, Color::White);
    draw_text(buf, x0 + 2, y0 + 1, "Controls", Color::White);

    let speed_line = format!("+ / -    speed up / slow down (x{:.2})", speed_step);
    let lines = [
        "space    pause / resume",
        speed_line.as_str(),
        "t        toggle trails",
        "o        toggle orbit guides",
        "l        toggle name labels",
        "1-9      planet info    0 clear",
        "w / s    zoom in / out",
        "r        clear trails",
        "i        close this help",
        "q        quit",
    ];
    for (i, line) in lines.iter().enumerate() {
        let y = y0 + 3 + i as u16;
        if y >= y0 + bh - 1 {
            break;
        }
        draw_text(buf, x0 + 2, y, line, dim);
    }
}
