//! All game entity types — pure data, no logic.

use crate::tuning::Tuning;

// ── Tags ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerId {
    Player1,
    Player2,
}

impl PlayerId {
    pub fn opponent(self) -> Self {
        match self {
            PlayerId::Player1 => PlayerId::Player2,
            PlayerId::Player2 => PlayerId::Player1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step along this direction in field coordinates (y grows downward).
    pub fn unit(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerColor {
    Blue,
    Red,
}

// ── Player ────────────────────────────────────────────────────────────────────

pub const MAX_HEALTH: u8 = 100;
pub const MAX_SHIELD: u8 = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: PlayerColor,
    /// 0..=100
    pub health: u8,
    /// 0..=100
    pub shield: u8,
    pub shield_active: bool,
    /// Session-clock millisecond at which an active shield switches off.
    pub shield_expires_at: Option<u64>,
    /// Cleared on fire, re-armed when the fire key is released.
    pub can_shoot: bool,
    pub facing: Direction,
}

impl Player {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Back to full bars, shield off, parked just above the field.
    pub fn reset_for_round(&mut self) {
        self.health = MAX_HEALTH;
        self.shield = MAX_SHIELD;
        self.shield_active = false;
        self.shield_expires_at = None;
        self.can_shoot = true;
        self.y = -self.height;
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub direction: Direction,
    pub owner: PlayerId,
}

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Both fighters plus every projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Arena {
    pub player1: Player,
    pub player2: Player,
    pub projectiles: Vec<Projectile>,
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(tuning: &Tuning) -> Self {
        let make = |x: f32, color, facing| Player {
            x,
            y: 0.0,
            width: tuning.player_size,
            height: tuning.player_size,
            color,
            health: MAX_HEALTH,
            shield: MAX_SHIELD,
            shield_active: false,
            shield_expires_at: None,
            can_shoot: true,
            facing,
        };
        Arena {
            player1: make(tuning.player1_start_x, PlayerColor::Blue, Direction::Right),
            player2: make(tuning.player2_start_x, PlayerColor::Red, Direction::Left),
            projectiles: Vec::new(),
            width: tuning.field_width,
            height: tuning.field_height,
        }
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        match id {
            PlayerId::Player1 => &self.player1,
            PlayerId::Player2 => &self.player2,
        }
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        match id {
            PlayerId::Player1 => &mut self.player1,
            PlayerId::Player2 => &mut self.player2,
        }
    }
}
