use duel_shooter::entities::*;
use duel_shooter::tuning::Tuning;

#[test]
fn tags_compare_and_flip() {
    assert_eq!(PlayerId::Player1.opponent(), PlayerId::Player2);
    assert_eq!(PlayerId::Player2.opponent(), PlayerId::Player1);
    assert_ne!(Direction::Up, Direction::Down);

    // y grows downward
    assert_eq!(Direction::Up.unit(), (0.0, -1.0));
    assert_eq!(Direction::Right.unit(), (1.0, 0.0));
}

#[test]
fn new_arena_matches_tuning() {
    let t = Tuning::default();
    let arena = Arena::new(&t);
    assert_eq!((arena.width, arena.height), (800.0, 600.0));
    assert!(arena.projectiles.is_empty());

    let p1 = &arena.player1;
    assert_eq!((p1.x, p1.width, p1.height), (100.0, 60.0, 60.0));
    assert_eq!(p1.color, PlayerColor::Blue);
    assert_eq!(p1.facing, Direction::Right);
    assert_eq!((p1.health, p1.shield), (MAX_HEALTH, MAX_SHIELD));
    assert!(p1.can_shoot && !p1.shield_active);

    let p2 = arena.player(PlayerId::Player2);
    assert_eq!(p2.x, 600.0);
    assert_eq!(p2.color, PlayerColor::Red);
    assert_eq!(p2.facing, Direction::Left);
}

#[test]
fn reset_for_round_restores_bars_and_lifts_player() {
    let mut arena = Arena::new(&Tuning::default());
    let p = arena.player_mut(PlayerId::Player1);
    p.health = 20;
    p.shield = 0;
    p.shield_active = true;
    p.shield_expires_at = Some(10);
    p.can_shoot = false;
    p.y = 490.0;

    p.reset_for_round();
    assert_eq!((p.health, p.shield), (100, 100));
    assert!(!p.shield_active);
    assert_eq!(p.shield_expires_at, None);
    assert!(p.can_shoot);
    assert_eq!(p.y, -60.0);
}

#[test]
fn arena_clone_is_independent() {
    let base = Arena::new(&Tuning::default());
    let mut cloned = base.clone();

    cloned.player1.x = 99.0;
    cloned.projectiles.push(Projectile {
        x: 1.0,
        y: 1.0,
        speed: 10.0,
        direction: Direction::Up,
        owner: PlayerId::Player2,
    });

    assert_eq!(base.player1.x, 100.0);
    assert!(base.projectiles.is_empty());
}
