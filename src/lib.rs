//! Digipot motor current control
//!
//! Configures a digipot from key/value settings and serves the M907 and
//! M500/M503 commands through a small command dispatcher.

pub mod config;
pub mod current_control;
pub mod digipot;
pub mod gcode;
pub mod kernel;
pub mod stream;

pub use config::{ConfigError, ConfigSource, ConfigStore};
pub use current_control::CurrentControl;
pub use digipot::{Digipot, DigipotChip};
pub use gcode::{Gcode, GcodeError};
pub use kernel::{Kernel, Module};
pub use stream::{NullStream, StreamOutput};
