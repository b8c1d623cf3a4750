//! Enumeration of level-up allocations across the three power slots.

use serde::Serialize;

use crate::build::PowerSlot;
use crate::data::power::{MAX_POWER_LEVEL, MIN_POWER_LEVEL};
use crate::insanity::MAX_LEVEL_UPS;

/// Most level-ups one slot can absorb (level 1 to level 4).
pub const MAX_UPS_PER_SLOT: u8 = MAX_POWER_LEVEL - MIN_POWER_LEVEL;

/// Level-ups spent per slot, indexed by [`PowerSlot::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Allocation {
    pub special: u8,
    pub common_1: u8,
    pub common_2: u8,
}

impl Allocation {
    pub const fn new(special: u8, common_1: u8, common_2: u8) -> Self {
        Self {
            special,
            common_1,
            common_2,
        }
    }

    pub const fn get(&self, slot: PowerSlot) -> u8 {
        match slot {
            PowerSlot::Special => self.special,
            PowerSlot::Common1 => self.common_1,
            PowerSlot::Common2 => self.common_2,
        }
    }

    pub const fn total(&self) -> u8 {
        self.special + self.common_1 + self.common_2
    }

    /// Slots in spending order: special first, then the common powers.
    pub fn sequence(&self) -> Vec<PowerSlot> {
        PowerSlot::ALL
            .into_iter()
            .flat_map(|slot| std::iter::repeat(slot).take(usize::from(self.get(slot))))
            .collect()
    }

    pub fn label(&self) -> String {
        format!("S+{} C1+{} C2+{}", self.special, self.common_1, self.common_2)
    }
}

/// Every way to spend exactly `level_ups` across the slots, at most
/// [`MAX_UPS_PER_SLOT`] each. Requests above [`MAX_LEVEL_UPS`] are clamped.
pub fn enumerate_allocations(level_ups: u8) -> Vec<Allocation> {
    let level_ups = level_ups.min(MAX_LEVEL_UPS);
    let mut allocations = Vec::new();
    for special in 0..=MAX_UPS_PER_SLOT.min(level_ups) {
        for common_1 in 0..=MAX_UPS_PER_SLOT.min(level_ups - special) {
            let common_2 = level_ups - special - common_1;
            if common_2 <= MAX_UPS_PER_SLOT {
                allocations.push(Allocation::new(special, common_1, common_2));
            }
        }
    }
    allocations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_level_ups_yield_the_empty_allocation() {
        assert_eq!(enumerate_allocations(0), vec![Allocation::new(0, 0, 0)]);
    }

    #[test]
    fn two_level_ups_have_six_allocations() {
        let allocations = enumerate_allocations(2);
        assert_eq!(allocations.len(), 6);
        assert!(allocations.iter().all(|a| a.total() == 2));
    }

    #[test]
    fn six_level_ups_respect_per_slot_cap() {
        let allocations = enumerate_allocations(6);
        assert!(allocations.iter().all(|a| a.total() == 6));
        assert!(allocations
            .iter()
            .all(|a| PowerSlot::ALL.iter().all(|slot| a.get(*slot) <= MAX_UPS_PER_SLOT)));
        // (3,3,0) permutations: 3, (3,2,1): 6, (2,2,2): 1.
        assert_eq!(allocations.len(), 10);
        assert_eq!(enumerate_allocations(9), allocations);
    }

    #[test]
    fn sequence_spends_special_first() {
        assert_eq!(
            Allocation::new(1, 0, 2).sequence(),
            vec![PowerSlot::Special, PowerSlot::Common2, PowerSlot::Common2]
        );
    }
}
