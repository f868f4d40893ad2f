//! Held movement keys for both fighters.
//!
//! Only key-down / key-up handlers write here; the resolvers just read.
//! Fire, shield and pause keys are one-shot actions and never live in this map.
use crate::entities::{Arena, Direction, PlayerId};

/// Logical keys the session understands. The binary maps terminal key codes
/// onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Move(PlayerId, Direction),
    Fire(PlayerId),
    Shield(PlayerId),
    Pause,
}

/// Facing is resolved in this order: the first held flag wins.
const FACING_PRIORITY: [Direction; 4] =
    [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    held: [[bool; 4]; 2],
}

fn slot(id: PlayerId) -> usize {
    match id {
        PlayerId::Player1 => 0,
        PlayerId::Player2 => 1,
    }
}

fn dir_slot(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

impl InputState {
    pub fn press(&mut self, id: PlayerId, dir: Direction) {
        self.held[slot(id)][dir_slot(dir)] = true;
    }

    pub fn release(&mut self, id: PlayerId, dir: Direction) {
        self.held[slot(id)][dir_slot(dir)] = false;
    }

    pub fn is_held(&self, id: PlayerId, dir: Direction) -> bool {
        self.held[slot(id)][dir_slot(dir)]
    }

    pub fn clear(&mut self) {
        self.held = [[false; 4]; 2];
    }

    /// Direction this player should face given the keys held right now.
    pub fn facing(&self, id: PlayerId) -> Option<Direction> {
        FACING_PRIORITY
            .into_iter()
            .find(|&dir| self.is_held(id, dir))
    }

    /// Recompute both fighters' facing. A fighter with nothing held keeps
    /// whatever it faced last.
    pub fn apply_facing(&self, arena: &mut Arena) {
        for id in [PlayerId::Player1, PlayerId::Player2] {
            if let Some(dir) = self.facing(id) {
                arena.player_mut(id).facing = dir;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn up_beats_everything() {
        let mut input = InputState::default();
        input.press(PlayerId::Player1, Direction::Right);
        input.press(PlayerId::Player1, Direction::Left);
        input.press(PlayerId::Player1, Direction::Up);
        assert_eq!(input.facing(PlayerId::Player1), Some(Direction::Up));

        input.release(PlayerId::Player1, Direction::Up);
        assert_eq!(input.facing(PlayerId::Player1), Some(Direction::Left));
    }

    #[test]
    fn players_are_independent() {
        let mut input = InputState::default();
        input.press(PlayerId::Player2, Direction::Down);
        assert_eq!(input.facing(PlayerId::Player1), None);
        assert_eq!(input.facing(PlayerId::Player2), Some(Direction::Down));
    }

    #[test]
    fn facing_survives_release() {
        let mut arena = Arena::new(&Tuning::default());
        let mut input = InputState::default();
        input.press(PlayerId::Player1, Direction::Down);
        input.apply_facing(&mut arena);
        input.release(PlayerId::Player1, Direction::Down);
        input.apply_facing(&mut arena);
        assert_eq!(arena.player1.facing, Direction::Down);
        assert_eq!(arena.player2.facing, Direction::Left);
    }
}
