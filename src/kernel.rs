// Command dispatch: modules register for received commands and are called
// in registration order for every line.

use tracing::{debug, info};

use crate::config::ConfigSource;
use crate::current_control::CurrentControl;
use crate::gcode::{Gcode, GcodeError};
use crate::stream::StreamOutput;

/// A unit that reacts to received commands
pub trait Module {
    fn on_gcode_received(&mut self, gcode: &Gcode, stream: &mut dyn StreamOutput);
}

/// Owns the registered modules and routes commands to them
#[derive(Default)]
pub struct Kernel {
    gcode_listeners: Vec<Box<dyn Module>>,
}

impl Kernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a kernel with every module the configuration enables
    ///
    /// Disabled modules are never constructed.
    pub fn load_modules(config: &dyn ConfigSource) -> Self {
        let mut kernel = Self::new();

        if let Some(control) = CurrentControl::from_config(config) {
            kernel.register_for_gcode(Box::new(control));
        }

        info!("Kernel loaded with {} command listeners", kernel.gcode_listener_count());
        kernel
    }

    /// Subscribe a module to received commands
    pub fn register_for_gcode(&mut self, module: Box<dyn Module>) {
        self.gcode_listeners.push(module);
    }

    pub fn gcode_listener_count(&self) -> usize {
        self.gcode_listeners.len()
    }

    /// Deliver a parsed command to every listener
    pub fn dispatch(&mut self, gcode: &Gcode, stream: &mut dyn StreamOutput) {
        for module in self.gcode_listeners.iter_mut() {
            module.on_gcode_received(gcode, stream);
        }
    }

    /// Parse a command line and deliver it
    ///
    /// # Returns
    /// * `Ok(())` once every listener has handled the command
    /// * `Err(GcodeError)` if the line does not parse; nothing is delivered
    pub fn dispatch_line(&mut self, line: &str, stream: &mut dyn StreamOutput) -> Result<(), GcodeError> {
        let gcode = Gcode::parse(line)?;
        debug!("Dispatching {:?}", gcode.command());
        self.dispatch(&gcode, stream);
        Ok(())
    }
}
