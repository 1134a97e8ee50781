use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    // Fixed simulation step in milliseconds.
    pub(crate) tick_ms: u64,
    // Multiplier applied per speed-up / slow-down key press.
    pub(crate) speed_step: f32,
    pub(crate) trail_len: usize,
    pub(crate) star_count: usize,
    pub(crate) enable_color: bool,
    pub(crate) seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            tick_ms: 30,
            speed_step: 1.25,
            trail_len: 50,
            star_count: 160,
            enable_color: true,
            seed: 42,
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "solarium", "Solarium")
        .context("could not resolve project directories")?;
    let dir = proj.config_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    // Best-effort atomic replace on the same filesystem.
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = Settings::default();
        assert!(s.fps_cap >= 10);
        assert!(s.tick_ms > 0);
        assert!(s.speed_step > 1.0);
        assert!(s.trail_len > 0);
    }

    #[test]
    fn settings_json_round_trip() {
        let s = Settings {
            fps_cap: 60,
            tick_ms: 20,
            speed_step: 1.2,
            trail_len: 40,
            star_count: 99,
            enable_color: false,
            seed: 7,
        };
        let text = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&text).unwrap();
        assert_eq!(back.fps_cap, 60);
        assert_eq!(back.tick_ms, 20);
        assert_eq!(back.trail_len, 40);
        assert_eq!(back.star_count, 99);
        assert!(!back.enable_color);
        assert_eq!(back.seed, 7);
    }
}
