//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use hidhaptic::Haptic;
use serde_json::{Value, json};

use crate::wheels::WheelInfo;

fn print_json(value: &Value, what: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format {} as JSON: {}", what, e),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    print_json(&error_json, "error");
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print the wheel list in the requested format
pub fn print_wheel_list(wheels: &[WheelInfo], json: bool) {
    if json {
        print_json(
            &json!({
                "success": true,
                "wheels": wheels
            }),
            "wheel list",
        );
        return;
    }

    if wheels.is_empty() {
        println!("{}", "No supported wheels found".yellow());
        return;
    }

    println!("{}", "Connected Wheels:".bold());
    for wheel in wheels {
        println!("  {} {}", wheel.id.cyan(), wheel.name.bold());
        println!("    Model: {}", wheel.model);
        println!("    Version: {:#06x}", wheel.version);
        if wheel.ffex {
            println!("    {}", "Formula Force EX protocol".yellow());
        }
        println!("    Path: {}", wheel.path.dimmed());
    }
}

/// Print what an open wheel supports
pub fn print_haptic_info(haptic: &Haptic, json: bool) {
    let features: Vec<&str> = haptic.features().iter_names().map(|(name, _)| name).collect();
    let id = haptic.joystick().info().id_string();

    if json {
        print_json(
            &json!({
                "success": true,
                "device": {
                    "id": id,
                    "name": haptic.name(),
                    "driver": haptic.driver_name(),
                    "effects": haptic.num_effects(),
                    "playing": haptic.num_effects_playing(),
                    "axes": haptic.num_axes(),
                    "features": features,
                }
            }),
            "device info",
        );
        return;
    }

    println!("{} {}", id.cyan(), haptic.name().bold());
    println!("  Driver: {}", haptic.driver_name());
    println!("  Effects: {}", haptic.num_effects());
    println!("  Playing at once: {}", haptic.num_effects_playing());
    println!("  Axes: {}", haptic.num_axes());
    println!("  Supported:");
    for feature in features {
        println!("    {} {}", "•".green(), feature.to_lowercase());
    }
}

/// Print progress of a long-running command. JSON output stays quiet.
pub fn print_progress(message: &str, json: bool) {
    if !json {
        println!("{} {}", "→".blue(), message);
    }
}

/// Print success message
pub fn print_success(message: &str, json: bool) {
    if json {
        print_json(
            &json!({
                "success": true,
                "message": message
            }),
            "success message",
        );
    } else {
        println!("{} {}", "✓".green(), message);
    }
}

fn error_type_name(error: &Error) -> String {
    format!("{:?}", error)
        .split('(')
        .next()
        .unwrap_or("Unknown")
        .to_string()
}
