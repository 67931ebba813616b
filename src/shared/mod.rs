pub mod cancel;
pub mod errors;
pub mod macros;
pub mod structs;

pub use cancel::{CancelSource, CancelToken};
pub use errors::{Cancelled, ConfigError, DispatchError, RequestError};
pub use structs::format_movement_speed;
pub use structs::ActiveRequest;
pub use structs::DoorState;
pub use structs::ElevatorId;
pub use structs::ElevatorStatus;
pub use structs::Floor;
pub use structs::MotionState;
pub use structs::Request;
pub use structs::RequestId;
