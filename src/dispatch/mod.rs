pub mod dispatch;
mod dispatch_tests;

pub use dispatch::Dispatch;
