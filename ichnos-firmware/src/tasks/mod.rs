//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! `channels`.

pub mod estop;
pub mod heartbeat;
pub mod sensor;
pub mod steering;

pub use estop::estop_task;
pub use heartbeat::heartbeat_task;
pub use sensor::{sensor_task, LineSensor};
pub use steering::steering_task;
