use crate::render::RenderMode;
use crate::sim::effective_scale;
use crate::storage::StoreError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Display-mode toggle: ASCII scene instead of pixel art.
    pub(crate) text_mode: bool,
    pub(crate) fast_mode: bool,
    pub(crate) fast_scale: f64,
    pub(crate) tick_interval_secs: u64,
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text_mode: false,
            fast_mode: false,
            fast_scale: 60.0,
            tick_interval_secs: 10,
            fps_cap: 30,
            enable_color: true,
        }
    }
}

impl Settings {
    pub(crate) fn time_scale(&self) -> f64 {
        if self.fast_mode {
            effective_scale(self.fast_scale)
        } else {
            1.0
        }
    }

    pub(crate) fn render_mode(&self) -> RenderMode {
        RenderMode::from_text_flag(self.text_mode)
    }

    pub(crate) fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_interval_secs.clamp(1, 3600))
    }
}

pub(crate) struct Paths {
    pub(crate) data_dir: PathBuf,
    pub(crate) save_path: PathBuf,
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

impl Paths {
    pub(crate) fn in_dir(dir: &Path) -> Self {
        Self {
            data_dir: dir.to_path_buf(),
            save_path: dir.join("plant.json"),
            settings_path: dir.join("settings.json"),
            log_path: dir.join("sprout.log"),
        }
    }
}

pub(crate) fn project_paths(data_dir: Option<&Path>) -> Result<Paths> {
    let dir = match data_dir {
        Some(d) => d.to_path_buf(),
        None => ProjectDirs::from("com", "sprout", "Sprout")
            .context("could not resolve project directories")?
            .data_local_dir()
            .to_path_buf(),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create data dir {}", dir.display()))?;
    Ok(Paths::in_dir(&dir))
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
        tracing::warn!(path = %path.display(), "ignoring malformed settings file");
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(s)?;
    write_atomic(path, &data)
}

/// Writes to a sibling tmp file, then renames over `path`.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).map_err(|source| StoreError::Io {
        path: tmp.clone(),
        source,
    })?;
    atomic_rename(&tmp, path)
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<(), StoreError> {
    // rename-over-existing fails on Windows
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).map_err(|source| StoreError::Io {
        path: to.to_path_buf(),
        source,
    })
}
