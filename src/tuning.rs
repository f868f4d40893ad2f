//! Gameplay tuning for the duel.
//!
//! Keep this separate from runtime configuration (log file, names, volume).
//! Every field can be overridden from the `[tuning]` table of the config file;
//! missing keys keep their defaults.
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Field size in pixels.
    pub field_width: f32,
    pub field_height: f32,

    /// Side length of each (square) fighter in pixels.
    pub player_size: f32,

    /// Horizontal spawn positions before the first drop.
    pub player1_start_x: f32,
    pub player2_start_x: f32,

    /// Pixels moved per frame while a direction key is held.
    pub move_speed: f32,

    /// Extra gap kept between the two fighters on every side.
    pub collision_margin: f32,

    /// Pixels a projectile travels per frame.
    pub projectile_speed: f32,

    /// Health or shield removed by one hit.
    pub damage: u8,

    pub shield_duration_ms: u64,

    /// Pixels per tick while fighters drop into the field.
    pub drop_speed: f32,

    /// Gap between a landed fighter's bottom edge and the field bottom.
    pub rest_offset: f32,

    /// Distance from the side walls once the drop has finished.
    pub landing_inset: f32,

    /// How long the instruction overlay stays up after the drop.
    pub briefing_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 600.0,
            player_size: 60.0,
            player1_start_x: 100.0,
            player2_start_x: 600.0,
            move_speed: 7.0,
            collision_margin: 5.0,
            projectile_speed: 10.0,
            damage: 10,
            shield_duration_ms: 3000,
            drop_speed: 5.0,
            rest_offset: 50.0,
            landing_inset: 50.0,
            briefing_ms: 2000,
        }
    }
}

impl Tuning {
    /// Resting y-position at the end of the drop animation.
    pub fn rest_y(&self) -> f32 {
        self.field_height - self.player_size - self.rest_offset
    }
}
