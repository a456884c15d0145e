//! MCP4451 quad digipot pair
//!
//! Two chips on the I2C bus give eight wipers; channels 0-3 are on the
//! first chip and 4-7 on the second. Wipers have 257 positions.

use tracing::debug;

use super::{current_to_wiper, ChannelBank, Digipot};
use crate::config::params::{DEFAULT_FACTOR, DEFAULT_MAX_CURRENT};

/// Channels across both chips
pub const CHANNELS: usize = 8;

/// Highest wiper position (full scale)
pub const MAX_WIPER: u16 = 256;

pub struct Mcp4451 {
    bank: ChannelBank<CHANNELS>,
    max_current: f32,
    factor: f32,
}

impl Mcp4451 {
    pub const fn new() -> Self {
        Self {
            bank: ChannelBank::new(),
            max_current: DEFAULT_MAX_CURRENT,
            factor: DEFAULT_FACTOR,
        }
    }
}

impl Default for Mcp4451 {
    fn default() -> Self {
        Self::new()
    }
}

impl Digipot for Mcp4451 {
    fn set_max_current(&mut self, max_current: f32) {
        self.max_current = max_current;
    }

    fn set_factor(&mut self, factor: f32) {
        self.factor = factor;
    }

    fn set_current(&mut self, channel: usize, current: f32) {
        let (max_current, factor) = (self.max_current, self.factor);
        let wiper = self.bank.store(channel, current, |c| {
            current_to_wiper(c, max_current, factor, MAX_WIPER)
        });
        if let Some(wiper) = wiper {
            debug!(
                "MCP4451 chip {} wiper {}: {} A -> {}",
                channel / 4,
                channel % 4,
                current,
                wiper
            );
        }
    }

    fn get_current(&self, channel: usize) -> f32 {
        self.bank.current(channel)
    }

    fn max_current(&self) -> f32 {
        self.max_current
    }

    fn factor(&self) -> f32 {
        self.factor
    }

    fn channel_count(&self) -> usize {
        CHANNELS
    }

    fn wiper(&self, channel: usize) -> Option<u16> {
        self.bank.wiper(channel)
    }
}
