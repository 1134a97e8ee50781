use std::collections::VecDeque;

// -------------------- Shared math --------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Vec2 {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Vec2 {
    pub(crate) const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub(crate) fn add(self, o: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + o.x,
            y: self.y + o.y,
        }
    }

    pub(crate) fn sub(self, o: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - o.x,
            y: self.y - o.y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

// -------------------- Orbits and bodies --------------------

#[derive(Clone, Copy, Debug)]
pub(crate) struct Orbit {
    pub(crate) a: f32,
    pub(crate) b: f32,
    pub(crate) tilt_deg: f32,
}

// How a body moves: on its own ellipse around the origin, or on a circle
// around another body's current position.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Track {
    Ellipse(Orbit),
    AroundBody { parent: usize, radius: f32 },
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Facts {
    pub(crate) diameter_km: f64,
    pub(crate) mass_kg: f64,
    pub(crate) density_g_cm3: f64,
    pub(crate) distance_mkm: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct Body {
    pub(crate) name: &'static str,
    pub(crate) color: Rgb,
    pub(crate) size: f32,
    pub(crate) track: Track,
    // Degrees advanced per tick at speed scale 1.0.
    pub(crate) speed_deg: f32,
    // Always kept in [0, 360).
    pub(crate) angle_deg: f32,
    pub(crate) pos: Vec2,
    pub(crate) trail: Trail,
    pub(crate) facts: Facts,
    pub(crate) ringed: bool,
}

// -------------------- Trails --------------------

// Bounded position history. Oldest entries are evicted first.
#[derive(Clone, Debug)]
pub(crate) struct Trail {
    points: VecDeque<Vec2>,
    cap: usize,
}

impl Trail {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub(crate) fn push(&mut self, p: Vec2) {
        if self.cap == 0 {
            return;
        }
        if self.points.len() == self.cap {
            self.points.pop_front();
        }
        self.points.push_back(p);
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }
}

// -------------------- Comet --------------------

#[derive(Clone, Debug)]
pub(crate) struct Comet {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) trail: Trail,
}

// -------------------- Simulation parameters --------------------

#[derive(Clone, Copy, Debug)]
pub(crate) struct SimParams {
    pub(crate) paused: bool,
    pub(crate) speed_scale: f32,
    pub(crate) speed_step: f32,
    pub(crate) show_trails: bool,
    pub(crate) show_orbits: bool,
    pub(crate) show_labels: bool,
    pub(crate) show_help: bool,
    pub(crate) selected: Option<usize>,
}

impl SimParams {
    pub(crate) fn new(speed_step: f32) -> Self {
        Self {
            paused: false,
            speed_scale: 1.0,
            speed_step,
            show_trails: false,
            show_orbits: true,
            show_labels: true,
            show_help: true,
            selected: None,
        }
    }
}

// -------------------- Deterministic rolls --------------------

// Counter-based SplitMix64: deterministic and cheap, so the headless core
// never owns an OS-seeded generator.
#[derive(Clone, Debug)]
pub(crate) struct SimRng {
    seed: u64,
    counter: u64,
}

impl SimRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    fn next_u64(&mut self) -> u64 {
        let mut z = self
            .seed
            .wrapping_add(self.counter.wrapping_mul(0x9E3779B97F4A7C15));
        self.counter = self.counter.wrapping_add(1);

        z = z.wrapping_add(0x9E3779B97F4A7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn next_f32(&mut self) -> f32 {
        // [0, 1)
        let v = self.next_u64() >> 40; // 24 bits
        (v as f32) / ((1u64 << 24) as f32)
    }

    pub(crate) fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

// -------------------- World --------------------

#[derive(Clone, Debug)]
pub(crate) struct World {
    pub(crate) bodies: Vec<Body>,
    pub(crate) comet: Comet,
    pub(crate) params: SimParams,
    // Half extents of the field, in scene units.
    pub(crate) bounds: Vec2,
    pub(crate) rng: SimRng,
    pub(crate) ticks: u64,
}

impl World {
    pub(crate) fn new(trail_len: usize, speed_step: f32, seed: u64) -> Self {
        let bodies = default_bodies(trail_len);
        // A satellite reads its parent's position mid-tick, so every parent
        // must sit earlier in the list than the satellite that orbits it.
        for (i, b) in bodies.iter().enumerate() {
            if let Track::AroundBody { parent, .. } = b.track {
                debug_assert!(parent < i, "{} listed before its parent", b.name);
            }
        }

        let bounds = Vec2 { x: 650.0, y: 470.0 };
        let mut rng = SimRng::new(seed);
        let comet = spawn_comet(bounds, &mut rng);

        Self {
            bodies,
            comet,
            params: SimParams::new(speed_step),
            bounds,
            rng,
            ticks: 0,
        }
    }
}

pub(crate) fn spawn_comet(bounds: Vec2, rng: &mut SimRng) -> Comet {
    Comet {
        pos: Vec2 {
            x: -bounds.x - 20.0,
            y: rng.range(-0.45 * bounds.y, 0.45 * bounds.y),
        },
        vel: Vec2 {
            x: rng.range(2.4, 4.0),
            y: rng.range(-0.8, 0.8),
        },
        trail: Trail::new(40),
    }
}

// -------------------- Scene table --------------------

fn planet(
    name: &'static str,
    color: Rgb,
    size: f32,
    a: f32,
    b: f32,
    tilt_deg: f32,
    speed_deg: f32,
    start_deg: f32,
    facts: Facts,
    trail_len: usize,
) -> Body {
    Body {
        name,
        color,
        size,
        track: Track::Ellipse(Orbit { a, b, tilt_deg }),
        speed_deg,
        angle_deg: start_deg,
        pos: Vec2::ZERO,
        trail: Trail::new(trail_len),
        facts,
        ringed: false,
    }
}

fn default_bodies(trail_len: usize) -> Vec<Body> {
    let mut bodies = vec![
        planet(
            "Mercury",
            Rgb { r: 163, g: 163, b: 163 },
            0.4,
            120.0,
            75.0,
            10.0,
            9.4,
            0.0,
            Facts {
                diameter_km: 4880.0,
                mass_kg: 3.3e23,
                density_g_cm3: 5.43,
                distance_mkm: 91.0,
            },
            trail_len,
        ),
        planet(
            "Venus",
            Rgb { r: 227, g: 159, b: 58 },
            0.6,
            180.0,
            120.0,
            -5.0,
            7.0,
            40.0,
            Facts {
                diameter_km: 12104.0,
                mass_kg: 4.87e24,
                density_g_cm3: 5.24,
                distance_mkm: 41.0,
            },
            trail_len,
        ),
        planet(
            "Earth",
            Rgb { r: 30, g: 144, b: 255 },
            0.7,
            240.0,
            165.0,
            0.0,
            6.0,
            80.0,
            Facts {
                diameter_km: 12742.0,
                mass_kg: 5.97e24,
                density_g_cm3: 5.52,
                distance_mkm: 0.0,
            },
            trail_len,
        ),
        planet(
            "Mars",
            Rgb { r: 209, g: 75, b: 61 },
            0.5,
            300.0,
            210.0,
            15.0,
            4.8,
            140.0,
            Facts {
                diameter_km: 6779.0,
                mass_kg: 6.42e23,
                density_g_cm3: 3.93,
                distance_mkm: 78.0,
            },
            trail_len,
        ),
        planet(
            "Jupiter",
            Rgb { r: 172, g: 120, b: 70 },
            1.5,
            375.0,
            255.0,
            4.0,
            2.6,
            200.0,
            Facts {
                diameter_km: 139_820.0,
                mass_kg: 1.898e27,
                density_g_cm3: 1.33,
                distance_mkm: 628.0,
            },
            trail_len,
        ),
        planet(
            "Saturn",
            Rgb { r: 230, g: 195, b: 80 },
            1.2,
            450.0,
            315.0,
            -8.0,
            2.0,
            250.0,
            Facts {
                diameter_km: 116_460.0,
                mass_kg: 5.68e26,
                density_g_cm3: 0.69,
                distance_mkm: 1275.0,
            },
            trail_len,
        ),
        planet(
            "Uranus",
            Rgb { r: 173, g: 216, b: 230 },
            1.0,
            525.0,
            375.0,
            6.0,
            1.4,
            300.0,
            Facts {
                diameter_km: 50_724.0,
                mass_kg: 8.68e25,
                density_g_cm3: 1.27,
                distance_mkm: 2720.0,
            },
            trail_len,
        ),
        planet(
            "Neptune",
            Rgb { r: 147, g: 112, b: 219 },
            1.0,
            615.0,
            435.0,
            -3.0,
            1.0,
            330.0,
            Facts {
                diameter_km: 49_244.0,
                mass_kg: 1.02e26,
                density_g_cm3: 1.64,
                distance_mkm: 4350.0,
            },
            trail_len,
        ),
    ];

    bodies[5].ringed = true; // Saturn

    // Earth's moon rides on index 2.
    bodies.push(Body {
        name: "Moon",
        color: Rgb { r: 192, g: 192, b: 192 },
        size: 0.3,
        track: Track::AroundBody {
            parent: 2,
            radius: 24.0,
        },
        speed_deg: 5.0,
        angle_deg: 0.0,
        pos: Vec2::ZERO,
        trail: Trail::new(trail_len),
        facts: Facts {
            diameter_km: 3474.0,
            mass_kg: 7.35e22,
            density_g_cm3: 3.34,
            distance_mkm: 0.384,
        },
        ringed: false,
    });

    bodies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_is_bounded_fifo() {
        let mut t = Trail::new(3);
        for i in 0..5 {
            t.push(Vec2 {
                x: i as f32,
                y: 0.0,
            });
        }
        assert_eq!(t.len(), 3);
        let xs: Vec<f32> = t.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn trail_with_zero_capacity_stays_empty() {
        let mut t = Trail::new(0);
        t.push(Vec2 { x: 1.0, y: 2.0 });
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn satellites_follow_their_parents_in_the_list() {
        let bodies = default_bodies(10);
        for (i, b) in bodies.iter().enumerate() {
            if let Track::AroundBody { parent, .. } = b.track {
                assert!(parent < i, "{} must come after its parent", b.name);
            }
        }
    }

    #[test]
    fn scene_has_eight_planets_and_a_moon() {
        let bodies = default_bodies(10);
        let planets = bodies
            .iter()
            .filter(|b| matches!(b.track, Track::Ellipse(_)))
            .count();
        let moons = bodies
            .iter()
            .filter(|b| matches!(b.track, Track::AroundBody { .. }))
            .count();
        assert_eq!(planets, 8);
        assert_eq!(moons, 1);
        assert!(bodies.iter().any(|b| b.ringed));
    }

    #[test]
    fn sim_rng_is_deterministic_per_seed() {
        let mut a = SimRng::new(9);
        let mut b = SimRng::new(9);
        for _ in 0..16 {
            assert_eq!(a.range(0.0, 1.0), b.range(0.0, 1.0));
        }
    }

    #[test]
    fn sim_rng_range_stays_in_bounds() {
        let mut rng = SimRng::new(1);
        for _ in 0..256 {
            let v = rng.range(-2.5, 7.5);
            assert!((-2.5..7.5).contains(&v));
        }
    }
}
