//! Motor current control
//!
//! Maps the seven logical current channels onto a digipot and handles the
//! M907 (set currents) and M500/M503 (save/report settings) commands.
//!
//! Channel letters:
//!
//! | channel | 0 | 1 | 2 | 3 | 4 | 5 | 6 |
//! |---------|---|---|---|---|---|---|---|
//! | current | X | Y | Z | A | B | C | D |
//! | legacy  | X | Y | Z | E | A | B | C |
//!
//! The legacy layout is selected when the command carries `E`. Reports are
//! always written with the current layout.

use tracing::{debug, info, warn};

use crate::config::params::{
    CHANNEL_COUNT, CHANNEL_CURRENT_KEYS, CHIP_KEY, DEFAULT_CHANNEL_CURRENTS, DEFAULT_CHIP,
    DEFAULT_ENABLE, DEFAULT_FACTOR, DEFAULT_MAX_CURRENT, ENABLE_KEY, FACTOR_KEY, MAX_CURRENT_KEY,
};
use crate::config::ConfigSource;
use crate::digipot::{Digipot, DigipotChip};
use crate::gcode::Gcode;
use crate::kernel::Module;
use crate::stream::StreamOutput;

/// M code: set motor currents
pub const SET_CURRENTS_M: u32 = 907;

/// M code: save settings
pub const SAVE_SETTINGS_M: u32 = 500;

/// M code: report settings
pub const REPORT_SETTINGS_M: u32 = 503;

/// Letter whose presence selects the legacy layout
pub const LEGACY_MARKER: char = 'E';

/// Channel letters of the current layout
pub const CHANNEL_LETTERS: [char; CHANNEL_COUNT] = ['X', 'Y', 'Z', 'A', 'B', 'C', 'D'];

/// Channel letters of the legacy layout; the marker doubles as channel 3
pub const LEGACY_CHANNEL_LETTERS: [char; CHANNEL_COUNT] = ['X', 'Y', 'Z', LEGACY_MARKER, 'A', 'B', 'C'];

pub const DEPRECATION_WARNING: &str = "WARNING: Using E is deprecated, use A and B for channels 3 and 4\n";

pub const REPORT_HEADER: &str = ";Digipot Motor currents:\n";

/// Letter table for an M907 command
///
/// # Returns
/// * `(&LEGACY_CHANNEL_LETTERS, true)` if the legacy marker is present
/// * `(&CHANNEL_LETTERS, false)` otherwise
pub fn channel_letters(gcode: &Gcode) -> (&'static [char; CHANNEL_COUNT], bool) {
    if gcode.has_letter(LEGACY_MARKER) {
        (&LEGACY_CHANNEL_LETTERS, true)
    } else {
        (&CHANNEL_LETTERS, false)
    }
}

/// Current controller owning the digipot
pub struct CurrentControl {
    digipot: Box<dyn Digipot>,
}

impl CurrentControl {
    /// Build a controller from configuration
    ///
    /// # Returns
    /// * `Some(CurrentControl)` with a configured digipot if the module is enabled
    /// * `None` if the module is disabled; no device is constructed
    pub fn from_config(config: &dyn ConfigSource) -> Option<Self> {
        if !config.bool_or(ENABLE_KEY, DEFAULT_ENABLE) {
            info!("Current control disabled");
            return None;
        }

        Some(Self {
            digipot: build_digipot(config),
        })
    }

    /// Wrap an already configured digipot
    pub fn with_digipot(digipot: Box<dyn Digipot>) -> Self {
        Self { digipot }
    }

    /// Rebuild the digipot from configuration
    ///
    /// The previous device and all its channel currents are discarded. The
    /// enable flag is not consulted again.
    pub fn reconfigure(&mut self, config: &dyn ConfigSource) {
        self.digipot = build_digipot(config);
    }

    pub fn digipot(&self) -> &dyn Digipot {
        self.digipot.as_ref()
    }

    /// Read back every channel current
    pub fn currents(&self) -> [f32; CHANNEL_COUNT] {
        std::array::from_fn(|channel| self.digipot.get_current(channel))
    }

    /// Handle M907: write every channel whose letter is present
    pub fn set_currents(&mut self, gcode: &Gcode, stream: &mut dyn StreamOutput) {
        let (letters, legacy) = channel_letters(gcode);
        if legacy {
            warn!("Legacy M907 channel layout used: {}", gcode.line().trim());
            stream.puts(DEPRECATION_WARNING);
        }

        for (channel, &letter) in letters.iter().enumerate() {
            if gcode.has_letter(letter) {
                let current = gcode.get_value(letter);
                debug!("Channel {} ({}) current set to {}", channel, letter, current);
                self.digipot.set_current(channel, current);
            }
        }
    }

    /// Handle M500/M503: report configured channels as an M907 line
    ///
    /// Writes nothing when no channel is configured.
    pub fn report_currents(&self, stream: &mut dyn StreamOutput) {
        let currents = self.currents();
        if currents.iter().all(|&current| current < 0.0) {
            return;
        }

        stream.puts(REPORT_HEADER);
        stream.puts("M907 ");
        for (&letter, &current) in CHANNEL_LETTERS.iter().zip(currents.iter()) {
            if current >= 0.0 {
                stream.printf(format_args!("{}{:.5} ", letter, current));
            }
        }
        stream.puts("\n");
    }
}

impl Module for CurrentControl {
    fn on_gcode_received(&mut self, gcode: &Gcode, stream: &mut dyn StreamOutput) {
        match gcode.m() {
            Some(SET_CURRENTS_M) => self.set_currents(gcode, stream),
            Some(SAVE_SETTINGS_M) | Some(REPORT_SETTINGS_M) => self.report_currents(stream),
            _ => {}
        }
    }
}

/// Construct the configured chip and load its settings and channel currents
fn build_digipot(config: &dyn ConfigSource) -> Box<dyn Digipot> {
    let chip = DigipotChip::from_selector(&config.string_or(CHIP_KEY, DEFAULT_CHIP));
    let mut digipot = chip.build();

    digipot.set_max_current(config.number_or(MAX_CURRENT_KEY, DEFAULT_MAX_CURRENT));
    digipot.set_factor(config.number_or(FACTOR_KEY, DEFAULT_FACTOR));

    for (channel, (key, default)) in CHANNEL_CURRENT_KEYS
        .iter()
        .zip(DEFAULT_CHANNEL_CURRENTS)
        .enumerate()
    {
        digipot.set_current(channel, config.number_or(key, default));
    }

    info!(
        "Digipot {} ready: max current {} A, factor {}",
        chip,
        digipot.max_current(),
        digipot.factor()
    );
    digipot
}
