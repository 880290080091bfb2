//! Type definitions

pub mod appointment;
pub mod messages;
pub mod settings;
pub mod slot;
pub mod task;

pub use appointment::*;
pub use messages::*;
pub use settings::*;
pub use slot::*;
pub use task::*;
