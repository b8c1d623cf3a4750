//! Insanity track: positions 1..=20 are alive, 21 is death.
//!
//! A single call to [`InsanityTrack::apply_tentacles`] crosses at most one red
//! swirl. Tentacles past the first swirl in range are discarded for that call.

use serde::Serialize;
use tracing::debug;

use crate::build::PowerSlot;
use crate::error::{EngineError, Result};

pub const START_POSITION: u8 = 1;
pub const DEATH_POSITION: u8 = 21;
/// Red swirl slots, swirl index 1..=6 in order.
pub const RED_SWIRL_SLOTS: [u8; 6] = [5, 9, 13, 16, 19, 20];
/// Swirls (by slot) that also grant a permanent green die.
pub const GREEN_BONUS_SWIRLS: [u8; 4] = [9, 16, 19, 20];
pub const MAX_LEVEL_UPS: u8 = RED_SWIRL_SLOTS.len() as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionResult {
    pub position: u8,
    pub crossed_swirl: Option<u8>,
    pub died: bool,
}

/// Cheap `Copy` snapshot: exploratory callers clone it instead of sharing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsanityTrack {
    position: u8,
    /// Bit `i` set when swirl `RED_SWIRL_SLOTS[i]` has been reached.
    reached: u8,
    spent: [u8; PowerSlot::COUNT],
}

impl Default for InsanityTrack {
    fn default() -> Self {
        Self::new()
    }
}

fn swirl_bit(slot: u8) -> u8 {
    RED_SWIRL_SLOTS
        .iter()
        .position(|candidate| *candidate == slot)
        .map_or(0, |index| 1 << index)
}

impl InsanityTrack {
    pub const fn new() -> Self {
        Self {
            position: START_POSITION,
            reached: 0,
            spent: [0; PowerSlot::COUNT],
        }
    }

    /// A track already at `position` with every swirl up to it reached and no level-ups spent.
    pub fn at_position(position: u8) -> Result<Self> {
        if !(START_POSITION..=DEATH_POSITION).contains(&position) {
            return Err(EngineError::configuration(format!(
                "insanity position {position} outside {START_POSITION}..={DEATH_POSITION}"
            )));
        }
        let reached = RED_SWIRL_SLOTS
            .iter()
            .filter(|slot| **slot <= position)
            .fold(0, |mask, slot| mask | swirl_bit(*slot));
        Ok(Self {
            position,
            reached,
            spent: [0; PowerSlot::COUNT],
        })
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn is_dead(&self) -> bool {
        self.position >= DEATH_POSITION
    }

    pub fn apply_tentacles(&mut self, tentacles: u32) -> Result<TransitionResult> {
        if self.is_dead() {
            return Err(EngineError::InvalidTransition {
                position: self.position,
            });
        }
        let target = (u32::from(self.position) + tentacles).min(u32::from(DEATH_POSITION)) as u8;

        let crossed_swirl = match self.next_red_swirl() {
            Some(slot) if target >= slot => {
                self.position = slot;
                self.reached |= swirl_bit(slot);
                debug!(slot, tentacles, "red swirl reached");
                Some(slot)
            }
            _ => {
                self.position = target;
                None
            }
        };

        let died = self.is_dead();
        if died {
            debug!("insanity track reached death");
        }
        Ok(TransitionResult {
            position: self.position,
            crossed_swirl,
            died,
        })
    }

    /// Applies each count in order from the current state.
    pub fn replay(&mut self, tentacle_counts: &[u32]) -> Result<Vec<TransitionResult>> {
        tentacle_counts
            .iter()
            .map(|count| self.apply_tentacles(*count))
            .collect()
    }

    pub fn is_swirl_reached(&self, slot: u8) -> bool {
        let bit = swirl_bit(slot);
        bit != 0 && self.reached & bit != 0
    }

    pub fn red_swirls_reached(&self) -> Vec<u8> {
        RED_SWIRL_SLOTS
            .into_iter()
            .filter(|slot| self.is_swirl_reached(*slot))
            .collect()
    }

    pub fn swirls_reached_count(&self) -> u8 {
        self.reached.count_ones() as u8
    }

    /// Smallest swirl slot strictly above the current position.
    pub fn next_red_swirl(&self) -> Option<u8> {
        RED_SWIRL_SLOTS
            .into_iter()
            .find(|slot| *slot > self.position && !self.is_swirl_reached(*slot))
    }

    /// Tentacles needed to stop on the next swirl, or on death when no swirl remains.
    pub fn tentacles_until_next_threshold(&self) -> u8 {
        self.next_red_swirl().unwrap_or(DEATH_POSITION) - self.position.min(DEATH_POSITION)
    }

    pub fn tentacles_until_death(&self) -> u8 {
        DEATH_POSITION - self.position.min(DEATH_POSITION)
    }

    pub fn green_dice_bonus(&self) -> u8 {
        GREEN_BONUS_SWIRLS
            .into_iter()
            .filter(|slot| self.is_swirl_reached(*slot))
            .count() as u8
    }

    pub fn level_ups_spent(&self) -> u8 {
        self.spent.iter().sum()
    }

    pub fn level_ups_spent_on(&self, slot: PowerSlot) -> u8 {
        self.spent[slot.index()]
    }

    pub fn level_ups_available(&self) -> u8 {
        self.swirls_reached_count().saturating_sub(self.level_ups_spent())
    }

    pub fn spend_level_up(&mut self, slot: PowerSlot) -> Result<()> {
        if self.level_ups_available() == 0 {
            return Err(EngineError::NoLevelUpAvailable { slot });
        }
        self.spent[slot.index()] += 1;
        debug!(%slot, remaining = self.level_ups_available(), "level-up spent");
        Ok(())
    }
}

/// Replays `tentacle_counts` from a fresh track.
pub fn simulate_roll_sequence(tentacle_counts: &[u32]) -> Result<Vec<TransitionResult>> {
    InsanityTrack::new().replay(tentacle_counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_track_starts_at_one_with_nothing_reached() {
        let track = InsanityTrack::new();
        assert_eq!(track.position(), 1);
        assert!(track.red_swirls_reached().is_empty());
        assert_eq!(track.level_ups_available(), 0);
        assert_eq!(track.next_red_swirl(), Some(5));
        assert_eq!(track.tentacles_until_next_threshold(), 4);
        assert_eq!(track.tentacles_until_death(), 20);
    }

    #[test]
    fn zero_tentacles_change_nothing() {
        let mut track = InsanityTrack::at_position(7).unwrap();
        let before = track;
        let result = track.apply_tentacles(0).unwrap();
        assert_eq!(track, before);
        assert_eq!(result.position, 7);
        assert_eq!(result.crossed_swirl, None);
        assert!(!result.died);
    }

    #[test]
    fn large_roll_stops_at_first_swirl() {
        let mut track = InsanityTrack::new();
        let result = track.apply_tentacles(30).unwrap();
        assert_eq!(result.position, 5);
        assert_eq!(result.crossed_swirl, Some(5));
        assert!(!result.died);
    }

    #[test]
    fn at_position_marks_earlier_swirls() {
        let track = InsanityTrack::at_position(16).unwrap();
        assert_eq!(track.red_swirls_reached(), vec![5, 9, 13, 16]);
        assert_eq!(track.green_dice_bonus(), 2);
        assert_eq!(track.level_ups_available(), 4);
        assert!(InsanityTrack::at_position(0).is_err());
        assert!(InsanityTrack::at_position(22).is_err());
    }

    #[test]
    fn spending_consumes_available_level_ups() {
        let mut track = InsanityTrack::at_position(5).unwrap();
        track.spend_level_up(PowerSlot::Common1).unwrap();
        assert_eq!(track.level_ups_spent_on(PowerSlot::Common1), 1);
        assert_eq!(
            track.spend_level_up(PowerSlot::Special),
            Err(EngineError::NoLevelUpAvailable {
                slot: PowerSlot::Special
            })
        );
    }

    #[test]
    fn dead_track_threshold_queries_are_zero() {
        let track = InsanityTrack::at_position(21).unwrap();
        assert!(track.is_dead());
        assert_eq!(track.tentacles_until_death(), 0);
        assert_eq!(track.tentacles_until_next_threshold(), 0);
    }
}
