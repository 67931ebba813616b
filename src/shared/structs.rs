/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroU64;

/***************************************/
/*       Public data structures        */
/***************************************/
pub type ElevatorId = usize;
pub type RequestId = u64;

/**
 * The floors an elevator can serve.
 *
 * The discriminant is the floor's ordinal, so ordering and distance follow the integer value.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[repr(i8)]
pub enum Floor {
    Basement = -1,
    Ground = 0,
    FirstFloor = 1,
    SecondFloor = 2,
    ThirdFloor = 3,
}

impl Floor {
    pub const ALL: [Floor; 5] = [
        Floor::Basement,
        Floor::Ground,
        Floor::FirstFloor,
        Floor::SecondFloor,
        Floor::ThirdFloor,
    ];

    pub fn value(self) -> i8 {
        self as i8
    }

    pub fn distance(self, other: Floor) -> u8 {
        self.value().abs_diff(other.value())
    }

    /// The neighbouring floor one unit closer to `target`, or `self` when already there.
    pub fn step_towards(self, target: Floor) -> Floor {
        let next = match self.value().cmp(&target.value()) {
            std::cmp::Ordering::Less => self.value() + 1,
            std::cmp::Ordering::Greater => self.value() - 1,
            std::cmp::Ordering::Equal => return self,
        };
        Floor::try_from(next).unwrap_or(target)
    }
}

impl TryFrom<i8> for Floor {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Floor::ALL
            .iter()
            .copied()
            .find(|floor| floor.value() == value)
            .ok_or(value)
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Floor::Basement => "Basement",
            Floor::Ground => "Ground",
            Floor::FirstFloor => "FirstFloor",
            Floor::SecondFloor => "SecondFloor",
            Floor::ThirdFloor => "ThirdFloor",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    Moving,
    Stationary,
    Offline,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    Closed,
    Opened,
}

/**
 * A group of passengers travelling together from one floor to another.
 *
 * `on_board` flips to true when the group boards; the request is dropped from its elevator
 * once it disembarks.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub passenger_count: u32,
    pub departure_floor: Floor,
    pub destination_floor: Floor,
    pub on_board: bool,
}

impl Request {
    pub fn new(passenger_count: u32, departure_floor: Floor, destination_floor: Floor) -> Request {
        Request {
            passenger_count,
            departure_floor,
            destination_floor,
            on_board: false,
        }
    }
}

/// A request held in an elevator's active set, tagged with the id the elevator gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRequest {
    pub id: RequestId,
    pub request: Request,
}

/**
 * Read-only snapshot of one elevator, copied out for display.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorStatus {
    pub id: ElevatorId,
    #[serde(rename = "currentFloor")]
    pub current_floor: Floor,
    #[serde(rename = "motionState")]
    pub motion_state: MotionState,
    #[serde(rename = "doorState")]
    pub door_state: DoorState,
    pub capacity: u32,
    #[serde(rename = "maxCapacity")]
    pub max_capacity: u32,
    #[serde(rename = "movementDelayMs")]
    pub movement_delay_ms: u64,
    #[serde(rename = "movementSpeed")]
    pub movement_speed: String,
    #[serde(rename = "waitingRequests")]
    pub waiting_requests: usize,
    #[serde(rename = "onboardRequests")]
    pub onboard_requests: usize,
}

impl ElevatorStatus {
    pub fn remaining_capacity(&self) -> u32 {
        self.max_capacity.saturating_sub(self.capacity)
    }
}

impl fmt::Display for ElevatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Floor: {}", self.current_floor)?;
        writeln!(f, "State: {:?}", self.motion_state)?;
        writeln!(f, "Door State: {:?}", self.door_state)?;
        writeln!(f, "Movement Speed: {}", self.movement_speed)?;
        writeln!(f, "Passenger Information: Capacity - {}", self.capacity)?;
        write!(f, "Passenger Information: Max Capacity - {}", self.max_capacity)
    }
}

/***************************************/
/*             Public API              */
/***************************************/

/// Renders a per-floor delay as a speed in metres per second, with at most three decimals.
pub fn format_movement_speed(movement_delay_ms: NonZeroU64) -> String {
    let speed = 1000.0 / movement_delay_ms.get() as f64;
    let fixed = format!("{:.3}", speed);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} m/s", trimmed)
}

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod structs_tests {
    use super::*;

    fn delay(ms: u64) -> NonZeroU64 {
        NonZeroU64::new(ms).unwrap()
    }

    #[test]
    fn test_format_movement_speed() {
        assert_eq!(format_movement_speed(delay(1000)), "1 m/s");
        assert_eq!(format_movement_speed(delay(500)), "2 m/s");
        assert_eq!(format_movement_speed(delay(2000)), "0.5 m/s");
        assert_eq!(format_movement_speed(delay(333)), "3.003 m/s");
        assert_eq!(format_movement_speed(delay(250)), "4 m/s");
        assert_eq!(format_movement_speed(delay(1500)), "0.667 m/s");
    }

    #[test]
    fn test_floor_distance_and_ordering() {
        assert_eq!(Floor::Basement.distance(Floor::ThirdFloor), 4);
        assert_eq!(Floor::SecondFloor.distance(Floor::Ground), 2);
        assert_eq!(Floor::Ground.distance(Floor::Ground), 0);
        assert!(Floor::Basement < Floor::Ground);
    }

    #[test]
    fn test_floor_step_towards() {
        assert_eq!(Floor::Ground.step_towards(Floor::ThirdFloor), Floor::FirstFloor);
        assert_eq!(Floor::Ground.step_towards(Floor::Basement), Floor::Basement);
        assert_eq!(Floor::SecondFloor.step_towards(Floor::SecondFloor), Floor::SecondFloor);
    }

    #[test]
    fn test_floor_try_from() {
        assert_eq!(Floor::try_from(-1), Ok(Floor::Basement));
        assert_eq!(Floor::try_from(3), Ok(Floor::ThirdFloor));
        assert_eq!(Floor::try_from(4), Err(4));
        assert_eq!(Floor::try_from(-2), Err(-2));
    }

    #[test]
    fn test_request_starts_waiting() {
        let request = Request::new(3, Floor::Ground, Floor::FirstFloor);
        assert!(!request.on_board);
    }
}
