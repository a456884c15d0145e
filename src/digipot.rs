//! Digipot current-setting devices
//!
//! Stepper driver reference currents are set through digital
//! potentiometers. Every chip stores the commanded current per channel and
//! derives the wiper position from it; a negative current marks a channel
//! as not configured.

pub mod ad5206;
pub mod mcp4451;

use std::fmt;
use std::str::FromStr;

use tracing::warn;

pub use ad5206::Ad5206;
pub use mcp4451::Mcp4451;

use crate::config::params::UNCONFIGURED;

/// Current-setting device addressed by channel index
pub trait Digipot {
    /// Full-scale current [A]; wiper positions are computed up to this value
    fn set_max_current(&mut self, max_current: f32);

    /// Wiper steps per ampere
    fn set_factor(&mut self, factor: f32);

    /// Set the current of one channel
    ///
    /// A negative current leaves the channel unconfigured. Writes to a
    /// channel the chip does not have are ignored.
    fn set_current(&mut self, channel: usize, current: f32);

    /// Current of one channel, or a negative value if not configured
    fn get_current(&self, channel: usize) -> f32;

    fn max_current(&self) -> f32;

    fn factor(&self) -> f32;

    /// Number of channels the chip provides
    fn channel_count(&self) -> usize;

    /// Wiper position last programmed for a channel
    fn wiper(&self, channel: usize) -> Option<u16>;
}

/// Supported digipot chips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigipotChip {
    /// Two MCP4451 quad digipots (Smoothieboard)
    #[default]
    Mcp4451,
    /// One AD5206 six-channel digipot
    Ad5206,
}

impl DigipotChip {
    /// Resolve a configured chip name
    ///
    /// Names are matched case-insensitively. Anything unknown falls back to
    /// the default chip.
    pub fn from_selector(selector: &str) -> Self {
        selector.parse().unwrap_or_else(|_| {
            warn!("Unknown digipot chip `{}`, using {}", selector, Self::default());
            Self::default()
        })
    }

    /// Configuration name of the chip
    pub fn name(self) -> &'static str {
        match self {
            Self::Mcp4451 => "mcp4451",
            Self::Ad5206 => "ad5206",
        }
    }

    /// Construct a device for this chip with no channel configured
    pub fn build(self) -> Box<dyn Digipot> {
        match self {
            Self::Mcp4451 => Box::new(Mcp4451::new()),
            Self::Ad5206 => Box::new(Ad5206::new()),
        }
    }
}

impl fmt::Display for DigipotChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigipotChip {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mcp4451" => Ok(Self::Mcp4451),
            "ad5206" => Ok(Self::Ad5206),
            _ => Err(()),
        }
    }
}

/// Per-channel state shared by the chip models
#[derive(Debug, Clone)]
pub(crate) struct ChannelBank<const N: usize> {
    currents: [f32; N],
    wipers: [Option<u16>; N],
}

impl<const N: usize> ChannelBank<N> {
    pub(crate) const fn new() -> Self {
        Self {
            currents: [UNCONFIGURED; N],
            wipers: [None; N],
        }
    }

    /// Store a current and its wiper position
    ///
    /// # Returns
    /// The wiper position written, `None` if the channel is out of range or
    /// the current marks it unconfigured
    pub(crate) fn store(&mut self, channel: usize, current: f32, wiper: impl FnOnce(f32) -> u16) -> Option<u16> {
        if channel >= N {
            return None;
        }

        if current < 0.0 {
            self.currents[channel] = UNCONFIGURED;
            self.wipers[channel] = None;
            return None;
        }

        let position = wiper(current);
        self.currents[channel] = current;
        self.wipers[channel] = Some(position);
        Some(position)
    }

    pub(crate) fn current(&self, channel: usize) -> f32 {
        self.currents.get(channel).copied().unwrap_or(UNCONFIGURED)
    }

    pub(crate) fn wiper(&self, channel: usize) -> Option<u16> {
        self.wipers.get(channel).copied().flatten()
    }
}

/// Convert a current to a wiper position
///
/// The current is limited to `max_current` before scaling, and the result
/// saturates at `max_wiper`.
pub(crate) fn current_to_wiper(current: f32, max_current: f32, factor: f32, max_wiper: u16) -> u16 {
    let limited = current.clamp(0.0, max_current.max(0.0));
    let steps = (factor * limited).ceil();
    if steps <= 0.0 {
        0
    } else if steps >= max_wiper as f32 {
        max_wiper
    } else {
        steps as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_resolution() {
        assert_eq!(DigipotChip::from_selector("mcp4451"), DigipotChip::Mcp4451);
        assert_eq!(DigipotChip::from_selector("AD5206"), DigipotChip::Ad5206);
        assert_eq!(DigipotChip::from_selector(" ad5206 "), DigipotChip::Ad5206);
    }

    #[test]
    fn test_unknown_selector_falls_back() {
        assert_eq!(DigipotChip::from_selector("tmc2209"), DigipotChip::Mcp4451);
        assert_eq!(DigipotChip::from_selector(""), DigipotChip::Mcp4451);
    }

    #[test]
    fn test_build_matches_chip() {
        assert_eq!(DigipotChip::Mcp4451.build().channel_count(), 8);
        assert_eq!(DigipotChip::Ad5206.build().channel_count(), 6);
    }

    #[test]
    fn test_current_to_wiper() {
        // 0.8 A * 113.33 = 90.66 -> rounded up
        assert_eq!(current_to_wiper(0.8, 2.0, 113.33, 256), 91);
        assert_eq!(current_to_wiper(0.0, 2.0, 113.33, 256), 0);
        // Limited to max current, then saturated at the chip range
        assert_eq!(current_to_wiper(5.0, 2.0, 113.33, 256), 227);
        assert_eq!(current_to_wiper(5.0, 5.0, 113.33, 255), 255);
    }

    #[test]
    fn test_channel_bank() {
        let mut bank = ChannelBank::<2>::new();
        assert_eq!(bank.current(0), UNCONFIGURED);

        assert_eq!(bank.store(0, 1.0, |_| 42), Some(42));
        assert_eq!(bank.current(0), 1.0);
        assert_eq!(bank.wiper(0), Some(42));

        // Negative resets to unconfigured
        assert_eq!(bank.store(0, -3.0, |_| 1), None);
        assert_eq!(bank.current(0), UNCONFIGURED);
        assert_eq!(bank.wiper(0), None);

        // Out of range is ignored
        assert_eq!(bank.store(2, 1.0, |_| 1), None);
        assert_eq!(bank.current(2), UNCONFIGURED);
    }
}
