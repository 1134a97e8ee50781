use crate::config::{self, Settings};
use crate::input;
use crate::model::World;
use crate::render::{build_stars, draw_scene, Star, Terminal};
use crate::sim::Action;
use anyhow::Result;
use std::time::{Duration, Instant};

pub(crate) struct App {
    settings: Settings,
    world: World,
    term: Terminal,
    stars: Vec<Star>,
    zoom: f32,
    should_quit: bool,
    started: Instant,
}

impl App {
    fn init(settings: Settings) -> Result<Self> {
        let world = World::new(settings.trail_len, settings.speed_step, settings.seed);
        let term = Terminal::begin()?;
        let stars = build_stars(term.cols, term.rows, settings.star_count, settings.seed);

        Ok(Self {
            settings,
            world,
            term,
            stars,
            zoom: 1.0,
            should_quit: false,
            started: Instant::now(),
        })
    }

    fn main_loop(&mut self) -> Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let sim_step = Duration::from_millis(self.settings.tick_ms.max(1));

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                self.stars = build_stars(
                    self.term.cols,
                    self.term.rows,
                    self.settings.star_count,
                    self.settings.seed,
                );
            }

            for code in input::collect_keys(frame_dt)? {
                match input::map_key(code) {
                    Some(Action::Quit) => {
                        self.should_quit = true;
                        break;
                    }
                    Some(Action::ZoomIn) => self.zoom = (self.zoom * 1.1).min(4.0),
                    Some(Action::ZoomOut) => self.zoom = (self.zoom / 1.1).max(0.4),
                    Some(action) => self.world.apply(action),
                    None => {}
                }
            }

            // Fixed-step simulation; cap the carried debt so a suspended
            // terminal does not replay a burst of ticks on wake.
            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            sim_accum = sim_accum
                .saturating_add(real_dt)
                .min(Duration::from_millis(250));

            while sim_accum >= sim_step {
                self.world.tick();
                sim_accum = sim_accum.saturating_sub(sim_step);
            }

            self.render_frame()?;

            spin_sleep(frame_dt, Instant::now());
        }

        Ok(())
    }

    fn render_frame(&mut self) -> Result<()> {
        self.term.cur.clear();
        draw_scene(
            &mut self.term.cur,
            &self.world,
            &self.stars,
            self.zoom,
            self.started.elapsed().as_secs_f32(),
            self.settings.enable_color,
        );
        self.term.present()
    }
}

pub(crate) fn run() -> Result<()> {
    let paths = config::project_paths()?;
    let settings = config::load_settings(&paths.settings_path);

    let mut app = App::init(settings)?;
    let res = app.main_loop();

    // Restore the terminal whatever happened to the loop; a dead drawing
    // surface must not leave raw mode behind.
    let restored = app.term.end();
    if res.is_ok() {
        config::save_settings_atomic(&paths.settings_path, &app.settings)?;
    }
    res.and(restored)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            return;
        }
        // Coarse sleep first, spin out the last millisecond.
        if end - t > Duration::from_millis(1) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
