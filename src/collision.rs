//! Overlap tests used by the movement and combat resolvers.
use crate::entities::{Player, Projectile};

/// Axis-aligned overlap between two fighters, with `margin` pixels of
/// padding around the second box. Touching edges at exactly the margin do
/// not count.
pub fn players_overlap(a: &Player, b: &Player, margin: f32) -> bool {
    a.x < b.x + b.width + margin
        && a.x + a.width > b.x - margin
        && a.y < b.y + b.height + margin
        && a.y + a.height > b.y - margin
}

/// Point containment of a projectile in a fighter's box, edges inclusive.
pub fn projectile_hits(projectile: &Projectile, player: &Player) -> bool {
    projectile.x >= player.x
        && projectile.x <= player.x + player.width
        && projectile.y >= player.y
        && projectile.y <= player.y + player.height
}

/// Whether a point lies inside the closed field rectangle `[0, w] × [0, h]`.
pub fn in_field(x: f32, y: f32, width: f32, height: f32) -> bool {
    (0.0..=width).contains(&x) && (0.0..=height).contains(&y)
}
