//! Configuration keys and default values for current control

/// Number of logical current channels handled by the controller
pub const CHANNEL_COUNT: usize = 7;

/// Current value marking a channel as not configured
pub const UNCONFIGURED: f32 = -1.0;

/// Module enable flag (default: disabled)
pub const ENABLE_KEY: &str = "currentcontrol_module_enable";
pub const DEFAULT_ENABLE: bool = false;

/// Digipot chip selector
pub const CHIP_KEY: &str = "digipotchip";
pub const DEFAULT_CHIP: &str = "mcp4451";

/// Full-scale current of the digipot [A]
pub const MAX_CURRENT_KEY: &str = "digipot_max_current";
pub const DEFAULT_MAX_CURRENT: f32 = 2.0;

/// Wiper steps per ampere
pub const FACTOR_KEY: &str = "digipot_factor";
pub const DEFAULT_FACTOR: f32 = 113.33;

/// Per-channel current keys, in channel order
pub const CHANNEL_CURRENT_KEYS: [&str; CHANNEL_COUNT] = [
    "alpha_current",
    "beta_current",
    "gamma_current",
    "delta_current",
    "epsilon_current",
    "zeta_current",
    "eta_current",
];

/// Per-channel default currents [A]
///
/// The three primary axes and the first extruder start at 0.8 A,
/// the remaining auxiliary channels start unconfigured.
pub const DEFAULT_CHANNEL_CURRENTS: [f32; CHANNEL_COUNT] = [
    0.8,
    0.8,
    0.8,
    0.8,
    UNCONFIGURED,
    UNCONFIGURED,
    UNCONFIGURED,
];
