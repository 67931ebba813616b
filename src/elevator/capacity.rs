use crate::shared::ConfigError;

/**
 * Occupancy of one elevator car.
 *
 * The only place that changes `capacity`. Holds `0 <= capacity <= max_capacity` at all times:
 * boarding that would overflow is refused without side effects, and disembarking saturates at 0.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityTracker {
    capacity: u32,
    max_capacity: u32,
}

impl CapacityTracker {
    pub fn new(max_capacity: u32) -> Result<CapacityTracker, ConfigError> {
        if max_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(CapacityTracker {
            capacity: 0,
            max_capacity,
        })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    pub fn remaining(&self) -> u32 {
        self.max_capacity - self.capacity
    }

    pub fn can_board(&self, amount: u32) -> bool {
        amount <= self.remaining()
    }

    /// Adds `amount` passengers if they fit. Returns false, unchanged, if they do not.
    pub fn try_board(&mut self, amount: u32) -> bool {
        if !self.can_board(amount) {
            return false;
        }
        self.capacity += amount;
        true
    }

    pub fn disembark(&mut self, amount: u32) {
        self.capacity = self.capacity.saturating_sub(amount);
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
