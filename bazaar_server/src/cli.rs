use std::{env, env::VarError};

use crate::config::{
    DEFAULT_BZR_HOST,
    DEFAULT_BZR_PORT,
    DEFAULT_CORS_ORIGIN,
    DEFAULT_DATABASE_URL,
    DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_DB_TIMEOUT_SECS,
    DEFAULT_TOKEN_VALIDITY_HOURS,
};

/// The server is configured through the environment. The command line only offers help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run,
    Help,
    ShowEnv,
    Version,
    Unknown(String),
}

impl CliCommand {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        match args.into_iter().nth(1).as_deref() {
            None => Self::Run,
            Some("-h" | "--help" | "help") => Self::Help,
            Some("--env" | "env") => Self::ShowEnv,
            Some("-V" | "--version" | "version") => Self::Version,
            Some(other) => Self::Unknown(other.to_string()),
        }
    }
}

/// Returns true if the command line was handled and the server should not start.
pub fn handle_command_line_args() -> bool {
    match CliCommand::parse(env::args()) {
        CliCommand::Run => return false,
        CliCommand::Help => {
            display_readme();
            display_envs();
        },
        CliCommand::ShowEnv => display_envs(),
        CliCommand::Version => println!("bazaar_server {}", env!("CARGO_PKG_VERSION")),
        CliCommand::Unknown(arg) => {
            eprintln!("Unknown argument: {arg}");
            display_readme();
        },
    }
    true
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

/// `(name, default, is_secret)`. Secret values are never printed, only whether they are set.
fn known_envs() -> Vec<(&'static str, String, bool)> {
    vec![
        ("RUST_LOG", "error".into(), false),
        ("BZR_HOST", DEFAULT_BZR_HOST.into(), false),
        ("BZR_PORT", DEFAULT_BZR_PORT.to_string(), false),
        ("BZR_DATABASE_URL", DEFAULT_DATABASE_URL.into(), false),
        ("BZR_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS.to_string(), false),
        ("BZR_DB_TIMEOUT_SECS", DEFAULT_DB_TIMEOUT_SECS.to_string(), false),
        ("BZR_RUN_MIGRATIONS", "true".into(), false),
        ("BZR_JWT_SECRET", "random".into(), true),
        ("BZR_TOKEN_VALIDITY_HOURS", DEFAULT_TOKEN_VALIDITY_HOURS.to_string(), false),
        ("BZR_CORS_ORIGIN", DEFAULT_CORS_ORIGIN.into(), false),
        ("BZR_ADMIN_EMAIL", "-".into(), false),
        ("BZR_ADMIN_PASSWORD", "-".into(), true),
        ("BZR_ADMIN_NAME", "Administrator".into(), false),
    ]
}

fn describe_env(value: Result<String, VarError>, default: &str, is_secret: bool) -> String {
    match value {
        Ok(_) if is_secret => "(set, hidden)".into(),
        Ok(s) => s,
        Err(VarError::NotPresent) => format!("Not set (default: {default})"),
        Err(VarError::NotUnicode(_)) if is_secret => "Invalid value".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}

fn display_envs() {
    println!("Current environment values:");
    for (name, default, is_secret) in known_envs() {
        let val = describe_env(env::var(name), &default, is_secret);
        println!("  {name:<28} {val}");
    }
}
