// End-to-end command sessions through the kernel

use digipot_control::{ConfigStore, Kernel};

const CONFIG: &str = "\
# Smoothieboard digipot
currentcontrol_module_enable  true
digipotchip                   mcp4451
digipot_max_current           2.4
alpha_current                 1.0
beta_current                  1.0
gamma_current                 0.5
delta_current                 1.5
";

fn session(config: &str, lines: &[&str]) -> Vec<String> {
    let config = ConfigStore::parse(config).unwrap();
    let mut kernel = Kernel::load_modules(&config);

    lines
        .iter()
        .map(|line| {
            let mut out = String::new();
            kernel.dispatch_line(line, &mut out).unwrap();
            out
        })
        .collect()
}

#[test]
fn test_report_after_load() {
    let replies = session(CONFIG, &["M503"]);
    assert_eq!(
        replies[0],
        ";Digipot Motor currents:\nM907 X1.00000 Y1.00000 Z0.50000 A1.50000 \n"
    );
}

#[test]
fn test_set_then_save() {
    let replies = session(CONFIG, &["M907 X1.2 A3.4", "M500"]);
    assert!(replies[0].is_empty());
    assert_eq!(
        replies[1],
        ";Digipot Motor currents:\nM907 X1.20000 Y1.00000 Z0.50000 A3.40000 \n"
    );
}

#[test]
fn test_legacy_set_is_saved_in_current_layout() {
    let replies = session(CONFIG, &["M907 E2.5 A1.0 B2.0 C3.0", "M500"]);
    assert_eq!(
        replies[0],
        "WARNING: Using E is deprecated, use A and B for channels 3 and 4\n"
    );
    assert_eq!(
        replies[1],
        ";Digipot Motor currents:\nM907 X1.00000 Y1.00000 Z0.50000 A2.50000 B1.00000 C2.00000 D3.00000 \n"
    );
}

#[test]
fn test_saved_line_reloads_to_same_state() {
    let mut config = ConfigStore::parse(CONFIG).unwrap();
    config.set("eta_current", "0.3");
    let mut kernel = Kernel::load_modules(&config);

    let mut saved = String::new();
    kernel.dispatch_line("M500", &mut saved).unwrap();
    let m907 = saved.lines().nth(1).unwrap().to_string();

    // Replay the saved command on a controller with nothing configured
    let mut blank = ConfigStore::new();
    blank.set("currentcontrol_module_enable", "true");
    for key in ["alpha_current", "beta_current", "gamma_current", "delta_current"] {
        blank.set(key, "-1");
    }
    let mut fresh = Kernel::load_modules(&blank);

    let mut out = String::new();
    fresh.dispatch_line("M503", &mut out).unwrap();
    assert!(out.is_empty());

    fresh.dispatch_line(&m907, &mut out).unwrap();
    fresh.dispatch_line("M503", &mut out).unwrap();
    assert_eq!(out, saved);
}

#[test]
fn test_disabled_module_is_silent() {
    let replies = session("digipotchip ad5206\n", &["M907 X1.0", "M503"]);
    assert!(replies.iter().all(String::is_empty));
}

#[test]
fn test_exponent_value_is_not_a_legacy_marker() {
    let replies = session(CONFIG, &["M907 X1e-3 (hold current)", "M503"]);
    assert!(replies[0].is_empty());
    assert_eq!(
        replies[1],
        ";Digipot Motor currents:\nM907 X0.00100 Y1.00000 Z0.50000 A1.50000 \n"
    );
}
