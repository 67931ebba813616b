pub mod capacity;
pub mod fsm;

pub use capacity::CapacityTracker;
pub use fsm::BoardOutcome;
pub use fsm::Elevator;
pub use fsm::ElevatorEvent;
pub use fsm::EventKind;
pub use fsm::StopReason;
pub use fsm::Target;
pub use fsm::TargetKind;
