//! Build script for marquee-core
//!
//! Validates the embedded panel.toml at compile time so a broken default
//! never reaches a device.

use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=panel.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let path = Path::new("panel.toml");
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail(&format!("Failed to read panel.toml: {}", e)),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(&format!("Invalid TOML syntax in panel.toml: {}", e)),
    };

    let mut errors = Vec::new();
    validate_panel(&config, &mut errors);
    validate_defaults(&config, &mut errors);

    if !errors.is_empty() {
        fail(&errors.join("\n"));
    }
}

fn fail(msg: &str) -> ! {
    let body = msg
        .lines()
        .map(|line| format!("║  {:<64} ║", line))
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: panel.toml                                               ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        body
    );
}

fn int_in(section: &toml::Value, key: &str, min: i64, max: i64, errors: &mut Vec<String>) -> i64 {
    match section.get(key).and_then(toml::Value::as_integer) {
        Some(v) if (min..=max).contains(&v) => v,
        Some(v) => {
            errors.push(format!("• {} = {} is outside {}..={}", key, v, min, max));
            0
        }
        None => {
            errors.push(format!("• missing integer '{}'", key));
            0
        }
    }
}

fn validate_panel(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(panel) = config.get("panel") else {
        errors.push("• missing [panel] section".to_string());
        return;
    };
    int_in(panel, "tile_width", 1, 1024, errors);
    int_in(panel, "tile_height", 1, 1024, errors);
    let rows = int_in(panel, "rows", 1, 8, errors);
    let cols = int_in(panel, "cols", 1, 8, errors);
    if rows * cols > 8 {
        errors.push(format!("• {}x{} layout has more than 8 tiles", rows, cols));
    }
}

fn validate_defaults(config: &toml::Value, errors: &mut Vec<String>) {
    // Every key in [defaults] is optional
    let Some(defaults) = config.get("defaults") else {
        return;
    };
    let ranges = [("brightness", 0, 100), ("speed", 1, 100), ("gap", 1, 300)];
    for (key, min, max) in ranges {
        if defaults.get(key).is_some() {
            int_in(defaults, key, min, max, errors);
        }
    }
    for key in ["background", "text_color"] {
        if let Some(value) = defaults.get(key) {
            let ok = value
                .as_str()
                .map(|s| s.trim_start_matches('#'))
                .is_some_and(|s| s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit()));
            if !ok {
                errors.push(format!("• {} must be a #RRGGBB string", key));
            }
        }
    }
}
