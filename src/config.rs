//! Runtime configuration: names, volume, log destination and gameplay tuning.
//!
//! Sources, later ones winning: built-in defaults, an optional TOML file,
//! `DUEL_*` environment variables, then command-line flags (applied by the
//! binary).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DuelError, Result};
use crate::session::NameInputs;
use crate::tuning::Tuning;

pub const DEFAULT_LOG_FILE: &str = "duel.log";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    pub player1_name: String,
    pub player2_name: String,
    /// Master volume in `[0, 1]` for every cue.
    pub volume: f32,
    pub log_file: PathBuf,
    pub tuning: Tuning,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            player1_name: String::new(),
            player2_name: String::new(),
            volume: 0.5,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            tuning: Tuning::default(),
        }
    }
}

impl DuelConfig {
    pub fn name_inputs(&self) -> NameInputs {
        NameInputs {
            player1: self.player1_name.clone(),
            player2: self.player2_name.clone(),
        }
    }

    /// Reject values the game cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(DuelError::Config(format!(
                "volume must be within 0..=1, got {}",
                self.volume
            )));
        }
        let t = &self.tuning;
        let lengths = [
            t.field_width,
            t.field_height,
            t.player_size,
            t.player1_start_x,
            t.player2_start_x,
            t.move_speed,
            t.collision_margin,
            t.projectile_speed,
            t.drop_speed,
            t.rest_offset,
            t.landing_inset,
        ];
        if lengths.iter().any(|v| !v.is_finite()) {
            return Err(DuelError::Config(
                "tuning values must be finite numbers".to_string(),
            ));
        }
        if t.collision_margin < 0.0 || t.rest_offset < 0.0 || t.landing_inset < 0.0 {
            return Err(DuelError::Config(
                "margins and offsets must not be negative".to_string(),
            ));
        }
        if !(t.field_width > 0.0 && t.field_height > 0.0 && t.player_size > 0.0) {
            return Err(DuelError::Config(
                "field and player sizes must be positive".to_string(),
            ));
        }
        if t.player_size * 2.0 + t.landing_inset * 2.0 + t.collision_margin > t.field_width
            || t.rest_y() < 0.0
        {
            return Err(DuelError::Config(
                "both fighters must fit side by side in the field".to_string(),
            ));
        }
        if t.move_speed < 0.0 || t.projectile_speed <= 0.0 || t.drop_speed <= 0.0 {
            return Err(DuelError::Config(
                "speeds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a TOML document into a config. Missing keys keep their defaults.
pub fn from_toml(text: &str) -> Result<DuelConfig> {
    toml::from_str::<DuelConfig>(text).map_err(|err| DuelError::Config(err.to_string()))
}

/// Read `path` if given (it must exist), apply environment overrides and
/// validate the result.
pub fn load(path: Option<&Path>) -> Result<DuelConfig> {
    let mut cfg = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|err| {
                DuelError::Config(format!("read {}: {err}", path.display()))
            })?;
            from_toml(&text)?
        }
        None => DuelConfig::default(),
    };
    apply_env(&mut cfg, |key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

/// Environment overrides for quick tuning. `lookup` stands in for
/// `std::env::var` so tests need not touch the process environment.
pub fn apply_env(cfg: &mut DuelConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(name) = lookup("DUEL_P1_NAME") {
        cfg.player1_name = name;
    }
    if let Some(name) = lookup("DUEL_P2_NAME") {
        cfg.player2_name = name;
    }
    if let Some(raw) = lookup("DUEL_VOLUME") {
        let volume: f32 = raw
            .trim()
            .parse()
            .map_err(|_| DuelError::Config(format!("DUEL_VOLUME is not a number: {raw}")))?;
        cfg.volume = volume;
    }
    if let Some(path) = lookup("DUEL_LOG_FILE") {
        cfg.log_file = PathBuf::from(path);
    }
    Ok(())
}
