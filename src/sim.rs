use crate::model::{spawn_comet, Track, Vec2, World};

// -------------------- Ellipse geometry --------------------

// Point on an ellipse with half-axes `a`/`b`, rotated by `tilt_deg` about
// its center. Angles are degrees; pure and total for all finite inputs.
pub(crate) fn ellipse_point(a: f32, b: f32, tilt_deg: f32, angle_deg: f32) -> Vec2 {
    let th = angle_deg.to_radians();
    let x0 = a * th.cos();
    let y0 = b * th.sin();
    let (ts, tc) = tilt_deg.to_radians().sin_cos();
    Vec2 {
        x: x0 * tc - y0 * ts,
        y: x0 * ts + y0 * tc,
    }
}

// Wrap into [0, 360). rem_euclid alone can round up to exactly 360.0 for
// tiny negative inputs.
pub(crate) fn wrap_deg(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 {
        a - 360.0
    } else {
        a
    }
}

// -------------------- Control surface --------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    TogglePause,
    SpeedUp,
    SlowDown,
    ToggleTrails,
    ToggleOrbits,
    ToggleLabels,
    ToggleHelp,
    ClearTrails,
    Select(usize),
    SelectNone,
    // Handled by the app, not the world.
    ZoomIn,
    ZoomOut,
    Quit,
}

impl World {
    pub(crate) fn apply(&mut self, action: Action) {
        match action {
            Action::TogglePause => self.params.paused = !self.params.paused,
            // Repeated presses compound; no clamp.
            Action::SpeedUp => self.params.speed_scale *= self.params.speed_step,
            Action::SlowDown => self.params.speed_scale /= self.params.speed_step,
            Action::ToggleTrails => {
                self.params.show_trails = !self.params.show_trails;
                if !self.params.show_trails {
                    self.clear_trails();
                }
            }
            Action::ToggleOrbits => self.params.show_orbits = !self.params.show_orbits,
            Action::ToggleLabels => self.params.show_labels = !self.params.show_labels,
            Action::ToggleHelp => self.params.show_help = !self.params.show_help,
            Action::ClearTrails => self.clear_trails(),
            Action::Select(i) => {
                if i < self.bodies.len() {
                    self.params.selected = Some(i);
                }
            }
            Action::SelectNone => self.params.selected = None,
            Action::ZoomIn | Action::ZoomOut | Action::Quit => {}
        }
    }

    fn clear_trails(&mut self) {
        for b in &mut self.bodies {
            b.trail.clear();
        }
        self.comet.trail.clear();
    }

    // -------------------- Per-tick update --------------------

    // Advance every body one step. A no-op while paused; the frame loop
    // keeps running either way.
    pub(crate) fn tick(&mut self) {
        if self.params.paused {
            return;
        }

        let scale = self.params.speed_scale;
        for i in 0..self.bodies.len() {
            let step = self.bodies[i].speed_deg * scale;
            let angle = wrap_deg(self.bodies[i].angle_deg + step);
            let pos = match self.bodies[i].track {
                Track::Ellipse(o) => ellipse_point(o.a, o.b, o.tilt_deg, angle),
                Track::AroundBody { parent, radius } => {
                    // The parent sits earlier in the list, so its position
                    // has already been advanced this tick.
                    let th = angle.to_radians();
                    self.bodies[parent].pos.add(Vec2 {
                        x: radius * th.cos(),
                        y: radius * th.sin(),
                    })
                }
            };

            let body = &mut self.bodies[i];
            body.angle_deg = angle;
            body.pos = pos;
            if self.params.show_trails {
                body.trail.push(pos);
            }
        }

        self.tick_comet();
        self.ticks += 1;
    }

    fn tick_comet(&mut self) {
        let scale = self.params.speed_scale;
        self.comet.pos.x += self.comet.vel.x * scale;
        self.comet.pos.y += self.comet.vel.y * scale;
        self.comet.trail.push(self.comet.pos);

        let margin = 30.0;
        if self.comet.pos.x > self.bounds.x + margin
            || self.comet.pos.y.abs() > self.bounds.y + margin
        {
            self.comet = spawn_comet(self.bounds, &mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Body, Facts, Orbit, Trail};

    const EPS: f32 = 1e-4;

    fn test_world() -> World {
        World::new(50, 1.25, 7)
    }

    fn circular_body(name: &'static str, r: f32, speed_deg: f32) -> Body {
        Body {
            name,
            color: crate::model::Rgb { r: 255, g: 255, b: 255 },
            size: 0.5,
            track: Track::Ellipse(Orbit {
                a: r,
                b: r,
                tilt_deg: 0.0,
            }),
            speed_deg,
            angle_deg: 0.0,
            pos: Vec2::ZERO,
            trail: Trail::new(50),
            facts: Facts {
                diameter_km: 0.0,
                mass_kg: 0.0,
                density_g_cm3: 0.0,
                distance_mkm: 0.0,
            },
            ringed: false,
        }
    }

    #[test]
    fn untilted_point_lies_on_the_ellipse() {
        let (a, b) = (200.0, 120.0);
        for deg in 0..360 {
            let p = ellipse_point(a, b, 0.0, deg as f32);
            let e = (p.x / a).powi(2) + (p.y / b).powi(2);
            assert!((e - 1.0).abs() < EPS, "angle {deg}: {e}");
        }
    }

    #[test]
    fn tilt_rotates_the_major_axis() {
        // A quarter-turn tilt sends the major-axis point to the y axis.
        let p = ellipse_point(100.0, 50.0, 90.0, 0.0);
        assert!(p.x.abs() < 1e-3, "x = {}", p.x);
        assert!((p.y - 100.0).abs() < 1e-3, "y = {}", p.y);
    }

    #[test]
    fn wrap_stays_in_range_for_any_step() {
        for step in [0.0, 1.2, 359.9, 360.0, 720.5, 12345.6, -0.1, -719.9, -1e-9] {
            let w = wrap_deg(350.0 + step);
            assert!((0.0..360.0).contains(&w), "step {step} gave {w}");
        }
    }

    #[test]
    fn wrap_handles_the_rounding_edge_below_zero() {
        // -1e-7 rem 360 rounds to exactly 360.0 in f32.
        let w = wrap_deg(-1e-7);
        assert!((0.0..360.0).contains(&w), "{w}");
    }

    #[test]
    fn circular_orbit_closes_after_a_full_revolution() {
        // 1.2°/tick closes the loop in exactly 300 ticks.
        let mut w = test_world();
        w.bodies = vec![circular_body("probe", 150.0, 1.2)];
        for _ in 0..300 {
            w.tick();
        }
        assert!(w.bodies[0].angle_deg.abs() < 1e-2, "{}", w.bodies[0].angle_deg);
        assert!((w.bodies[0].pos.x - 150.0).abs() < 0.05);
        assert!(w.bodies[0].pos.y.abs() < 0.05);
    }

    #[test]
    fn pause_freezes_angles_and_resumes_cleanly() {
        let mut w = test_world();
        w.tick();
        let angles: Vec<f32> = w.bodies.iter().map(|b| b.angle_deg).collect();

        w.apply(Action::TogglePause);
        assert!(w.params.paused);
        for _ in 0..25 {
            w.tick();
        }
        assert_eq!(w.ticks, 1, "tick counter advanced while paused");
        for (b, a) in w.bodies.iter().zip(&angles) {
            assert_eq!(b.angle_deg, *a, "{} moved while paused", b.name);
        }

        w.apply(Action::TogglePause);
        assert!(!w.params.paused);
        w.tick();
        assert_ne!(w.bodies[0].angle_deg, angles[0]);
    }

    #[test]
    fn satellite_shifts_exactly_with_its_parent() {
        // Both angles held at zero: moving the parent's orbit out by delta
        // must shift the satellite's absolute position by exactly delta.
        let mut w = test_world();
        let anchor = circular_body("anchor", 100.0, 0.0);
        let mut sat = circular_body("sat", 0.0, 0.0);
        sat.track = Track::AroundBody {
            parent: 0,
            radius: 10.0,
        };
        w.bodies = vec![anchor, sat];

        w.tick();
        let before = w.bodies[1].pos;

        w.bodies[0].track = Track::Ellipse(Orbit {
            a: 137.5,
            b: 137.5,
            tilt_deg: 0.0,
        });
        w.tick();
        let after = w.bodies[1].pos;

        assert_eq!(after.sub(before), Vec2 { x: 37.5, y: 0.0 });
    }

    #[test]
    fn moon_stays_at_orbit_radius_from_earth() {
        let mut w = test_world();
        for _ in 0..97 {
            w.tick();
        }
        let moon_idx = w
            .bodies
            .iter()
            .position(|b| matches!(b.track, Track::AroundBody { .. }))
            .unwrap();
        let Track::AroundBody { parent, radius } = w.bodies[moon_idx].track else {
            unreachable!()
        };
        let d = w.bodies[moon_idx].pos.sub(w.bodies[parent].pos);
        let dist = (d.x * d.x + d.y * d.y).sqrt();
        assert!((dist - radius).abs() < 1e-2, "dist = {dist}");
    }

    #[test]
    fn reciprocal_speed_changes_cancel() {
        let mut w = test_world();
        let before = w.params.speed_scale;
        w.apply(Action::SpeedUp);
        w.apply(Action::SlowDown);
        assert_eq!(w.params.speed_scale, before);
    }

    #[test]
    fn speed_scale_is_unclamped() {
        let mut w = test_world();
        for _ in 0..40 {
            w.apply(Action::SpeedUp);
        }
        assert!(w.params.speed_scale > 1000.0);
        for _ in 0..80 {
            w.apply(Action::SlowDown);
        }
        assert!(w.params.speed_scale < 1.0);
    }

    #[test]
    fn trails_fill_only_while_enabled_and_clear_on_toggle_off() {
        let mut w = test_world();
        w.tick();
        assert_eq!(w.bodies[0].trail.len(), 0);

        w.apply(Action::ToggleTrails);
        for _ in 0..5 {
            w.tick();
        }
        assert_eq!(w.bodies[0].trail.len(), 5);

        w.apply(Action::ToggleTrails);
        assert_eq!(w.bodies[0].trail.len(), 0);
        assert_eq!(w.comet.trail.len(), 0);
    }

    #[test]
    fn trail_never_exceeds_capacity_under_long_runs() {
        let mut w = test_world();
        w.apply(Action::ToggleTrails);
        for _ in 0..300 {
            w.tick();
        }
        for b in &w.bodies {
            assert!(b.trail.len() <= 50, "{} trail overflowed", b.name);
        }
    }

    #[test]
    fn selection_ignores_out_of_range_indices() {
        let mut w = test_world();
        let n = w.bodies.len();
        w.apply(Action::Select(n));
        assert_eq!(w.params.selected, None);
        w.apply(Action::Select(2));
        assert_eq!(w.params.selected, Some(2));
        w.apply(Action::SelectNone);
        assert_eq!(w.params.selected, None);
    }

    #[test]
    fn comet_respawns_inside_the_field() {
        let mut w = test_world();
        // Run long enough to cross the field several times.
        for _ in 0..5000 {
            w.tick();
            assert!(w.comet.pos.x <= w.bounds.x + 35.0);
            assert!(w.comet.pos.y.abs() <= w.bounds.y + 35.0);
        }
    }

    #[test]
    fn paused_world_still_presents_but_never_mutates_trails() {
        let mut w = test_world();
        w.apply(Action::ToggleTrails);
        w.tick();
        let len = w.bodies[0].trail.len();
        w.apply(Action::TogglePause);
        for _ in 0..10 {
            w.tick();
        }
        assert_eq!(w.bodies[0].trail.len(), len);
    }
}
