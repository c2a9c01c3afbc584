use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "RPG_HOST",
        "RPG_PORT",
        "RPG_DATABASE_URL",
        "RPG_DB_MAX_CONNECTIONS",
        "RPG_CURRENCY",
        "RPG_RAZORPAY_KEY_ID",
        "RPG_RAZORPAY_API_URL",
        "RPG_RAZORPAY_TIMEOUT_SECS",
        "RPG_USE_X_FORWARDED_FOR",
        "RPG_USE_FORWARDED",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    });
    for secret in ["RPG_RAZORPAY_KEY_SECRET", "RPG_RAZORPAY_WEBHOOK_SECRET"] {
        let state = if env::var(secret).map(|s| !s.trim().is_empty()).unwrap_or(false) { "Set" } else { "Not set" };
        println!("  {secret:<35} {state:<15}");
    }
}
