//! Per-frame game logic.
//!
//! Every resolver takes the `Arena` it mutates plus read-only input and
//! tuning. Sound cues are pushed onto the caller's queue; nothing here
//! touches the terminal or the clock.

use crate::audio::SoundCue;
use crate::collision::{in_field, players_overlap, projectile_hits};
use crate::entities::{Arena, Direction, Player, PlayerId, Projectile};
use crate::input::InputState;
use crate::tuning::Tuning;

// ── Firing ───────────────────────────────────────────────────────────────────

/// Spawn a projectile from the fighter's centre along its facing.
/// Returns `false` when the fire key has not been released since the last shot.
pub fn fire(
    arena: &mut Arena,
    id: PlayerId,
    tuning: &Tuning,
    cues: &mut Vec<SoundCue>,
) -> bool {
    let shooter = arena.player_mut(id);
    if !shooter.can_shoot {
        return false;
    }
    shooter.can_shoot = false;
    let (x, y) = shooter.center();
    let direction = shooter.facing;
    arena.projectiles.push(Projectile {
        x,
        y,
        speed: tuning.projectile_speed,
        direction,
        owner: id,
    });
    cues.push(SoundCue::Shoot);
    true
}

/// Fire key released: the fighter may shoot again.
pub fn rearm(arena: &mut Arena, id: PlayerId) {
    arena.player_mut(id).can_shoot = true;
}

// ── Shield ───────────────────────────────────────────────────────────────────

/// Switch the shield on until `now_ms + duration`. Refused while it is
/// already up or out of charge.
pub fn activate_shield(player: &mut Player, now_ms: u64, tuning: &Tuning) -> bool {
    if player.shield_active || player.shield == 0 {
        return false;
    }
    player.shield_active = true;
    player.shield_expires_at = Some(now_ms + tuning.shield_duration_ms);
    true
}

/// Drop any shield whose expiry has been reached.
pub fn expire_shields(arena: &mut Arena, now_ms: u64) {
    for player in [&mut arena.player1, &mut arena.player2] {
        if player.shield_expires_at.is_some_and(|at| now_ms >= at) {
            player.shield_active = false;
            player.shield_expires_at = None;
        }
    }
}

// ── Movement ─────────────────────────────────────────────────────────────────

/// Candidate displacement for one fighter, clamped to keep its box in the field.
/// Right wins over left and down over up when both are held.
fn candidate_delta(
    player: &Player,
    input: &InputState,
    id: PlayerId,
    arena_w: f32,
    arena_h: f32,
    speed: f32,
) -> (f32, f32) {
    let mut dx = 0.0;
    if input.is_held(id, Direction::Left) {
        dx = -speed;
    }
    if input.is_held(id, Direction::Right) {
        dx = speed;
    }
    let mut dy = 0.0;
    if input.is_held(id, Direction::Up) {
        dy = -speed;
    }
    if input.is_held(id, Direction::Down) {
        dy = speed;
    }

    // A fighter already outside the field (mid-drop) is never pushed further out.
    let max_x = (arena_w - player.width).max(0.0);
    let max_y = (arena_h - player.height).max(0.0);
    let dx = (player.x + dx).clamp(0.0_f32.min(player.x), max_x.max(player.x)) - player.x;
    let dy = (player.y + dy).clamp(0.0_f32.min(player.y), max_y.max(player.y)) - player.y;
    (dx, dy)
}

/// Move both fighters one frame. X is applied and checked first, then Y; an
/// axis that would bring the fighters within the margin is rolled back for
/// both of them.
pub fn move_players(arena: &mut Arena, input: &InputState, tuning: &Tuning) {
    let (w, h, speed) = (arena.width, arena.height, tuning.move_speed);
    let (dx1, dy1) = candidate_delta(&arena.player1, input, PlayerId::Player1, w, h, speed);
    let (dx2, dy2) = candidate_delta(&arena.player2, input, PlayerId::Player2, w, h, speed);

    let (old_x1, old_x2) = (arena.player1.x, arena.player2.x);
    arena.player1.x += dx1;
    arena.player2.x += dx2;
    if players_overlap(&arena.player1, &arena.player2, tuning.collision_margin) {
        arena.player1.x = old_x1;
        arena.player2.x = old_x2;
    }

    let (old_y1, old_y2) = (arena.player1.y, arena.player2.y);
    arena.player1.y += dy1;
    arena.player2.y += dy2;
    if players_overlap(&arena.player1, &arena.player2, tuning.collision_margin) {
        arena.player1.y = old_y1;
        arena.player2.y = old_y2;
    }

    input.apply_facing(arena);
}

// ── Combat ───────────────────────────────────────────────────────────────────

/// Apply one hit to `target`: the shield soaks it while up and charged,
/// otherwise health pays.
pub fn apply_hit(target: &mut Player, damage: u8, cues: &mut Vec<SoundCue>) {
    if target.shield_active && target.shield > 0 {
        target.shield = target.shield.saturating_sub(damage);
        if target.shield == 0 {
            target.shield_active = false;
            target.shield_expires_at = None;
            cues.push(SoundCue::ShieldBreak);
        }
    } else {
        target.health = target.health.saturating_sub(damage);
        cues.push(SoundCue::Hit);
    }
}

/// Advance every projectile, newest first, and resolve it against the fighter
/// it can hurt. Walking the list backwards keeps removal by index from
/// skipping or revisiting a projectile.
pub fn resolve_projectiles(arena: &mut Arena, tuning: &Tuning, cues: &mut Vec<SoundCue>) {
    for i in (0..arena.projectiles.len()).rev() {
        let shot = &mut arena.projectiles[i];
        let (ux, uy) = shot.direction.unit();
        shot.x += ux * shot.speed;
        shot.y += uy * shot.speed;

        if !in_field(shot.x, shot.y, arena.width, arena.height) {
            arena.projectiles.remove(i);
            continue;
        }

        let shot = arena.projectiles[i].clone();
        let target_id = shot.owner.opponent();
        if projectile_hits(&shot, arena.player(target_id)) {
            apply_hit(arena.player_mut(target_id), tuning.damage, cues);
            tracing::debug!(
                target = ?target_id,
                health = arena.player(target_id).health,
                shield = arena.player(target_id).shield,
                "projectile hit"
            );
            arena.projectiles.remove(i);
        }
    }
}

// ── Win condition ────────────────────────────────────────────────────────────

/// The winner, if a fighter has run out of health. Player 1 is checked
/// first, so a double knock-out goes to player 2.
pub fn winner(arena: &Arena) -> Option<PlayerId> {
    if arena.player1.health == 0 {
        Some(PlayerId::Player2)
    } else if arena.player2.health == 0 {
        Some(PlayerId::Player1)
    } else {
        None
    }
}

// ── Drop animation ───────────────────────────────────────────────────────────

/// Lower both fighters one step toward `rest_y`. Returns `true` once both
/// have landed.
pub fn drop_step(arena: &mut Arena, tuning: &Tuning) -> bool {
    let rest_y = tuning.rest_y();
    let mut landed = true;
    for player in [&mut arena.player1, &mut arena.player2] {
        if player.y < rest_y {
            player.y = (player.y + tuning.drop_speed).min(rest_y);
            landed = false;
        }
    }
    landed
}

/// Spread the fighters to their starting columns after landing.
pub fn place_for_round(arena: &mut Arena, tuning: &Tuning) {
    arena.player1.x = tuning.landing_inset;
    arena.player2.x = arena.width - arena.player2.width - tuning.landing_inset;
}
