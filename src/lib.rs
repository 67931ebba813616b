/***************************************/
/*              Modules                */
/***************************************/
pub mod config;
pub mod dispatch;
pub mod elevator;
pub mod menu;
pub mod shared;
pub mod traffic;

pub use config::{load_config, Config, ElevatorConfig, ElevatorKind};
pub use dispatch::Dispatch;
pub use elevator::{Elevator, ElevatorEvent, EventKind, StopReason};
pub use menu::Menu;
pub use shared::{CancelSource, CancelToken, Floor, Request};
pub use traffic::TrafficGenerator;
