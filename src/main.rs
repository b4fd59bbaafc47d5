use anyhow::Result;
use clap::Parser;
use env_logger::Builder;
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;

mod animate;
mod banner;
mod config;
mod scene;
mod terminal;
mod toolkit;
mod typer;

use config::{parse_flag, sanitize_speed, Config};
use scene::build_scene;
use terminal::{CursorGuard, TerminalProfile};
use toolkit::Toolkit;
use typer::Typewriter;

#[derive(Parser, Debug)]
#[command(name = "fanfare")]
#[command(about = "Animated terminal announcement for celebrating a job offer")]
#[command(version)]
struct Cli {
    /// Your name, as typed after the whoami prompt
    #[arg(long)]
    name: Option<String>,

    /// The company making the offer
    #[arg(long)]
    company: Option<String>,

    /// The role you accepted
    #[arg(long)]
    role: Option<String>,

    /// Start date shown in the offer text
    #[arg(long)]
    start: Option<String>,

    /// Logo file: text or escape art printed verbatim, or an image handed to
    /// chafa/jp2a when one of them is installed
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Typing speed in characters per second; bad values fall back to the
    /// default rate instead of erroring
    #[arg(long)]
    speed: Option<String>,

    /// Type command results too (yes/no)
    #[arg(long, value_name = "YES/NO")]
    type_results: Option<String>,

    /// Skip the decorative border rules (yes/no)
    #[arg(long, value_name = "YES/NO")]
    quiet_border: Option<String>,

    /// Disable the trailing faux cursor while typing
    #[arg(long)]
    no_cursor: bool,

    /// Glyph drawn as the faux cursor
    #[arg(long)]
    cursor_glyph: Option<String>,

    /// Pause between scene beats, in milliseconds
    #[arg(long)]
    pause: Option<u64>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Write the resolved settings back to the config file and exit
    #[arg(long)]
    save_config: bool,
}

/// Applies command-line overrides on top of the loaded configuration.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }
    if let Some(company) = &cli.company {
        config.company = company.clone();
    }
    if let Some(role) = &cli.role {
        config.role = role.clone();
    }
    if let Some(start) = &cli.start {
        config.start_date = start.clone();
    }
    if let Some(logo) = &cli.logo {
        config.logo = Some(logo.clone());
    }
    if let Some(speed) = &cli.speed {
        config.speed = sanitize_speed(speed.parse().unwrap_or(-1.0));
    }
    if let Some(v) = &cli.type_results {
        if let Some(flag) = parse_flag(v) {
            config.type_results = flag;
        }
    }
    if let Some(v) = &cli.quiet_border {
        if let Some(flag) = parse_flag(v) {
            config.quiet_border = flag;
        }
    }
    if cli.no_cursor {
        config.use_cursor = false;
    }
    if let Some(glyph) = &cli.cursor_glyph {
        config.cursor_glyph = glyph.clone();
    }
    if let Some(pause) = cli.pause {
        config.pause_ms = pause;
    }
}

fn main() -> Result<()> {
    Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli);
    info!(
        "Announcing {} @ {} at {} cps",
        config.name, config.company, config.speed
    );

    if cli.save_config {
        let path = cli
            .config
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_config_path);
        config.save(cli.config.as_deref())?;
        println!("Saved configuration to {}", path.display());
        return Ok(());
    }

    let profile = TerminalProfile::probe();
    let toolkit = Toolkit::probe();
    let typewriter = Typewriter::new(&config, &toolkit);

    if let Some(hint) = toolkit.missing_tool_hint() {
        eprintln!("{}", hint);
    }

    let beats = build_scene(&config);

    // Cursor stays hidden for the whole show and reappears on any exit path
    let _guard = profile.cursor_control.then(CursorGuard::hide);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    scene::play(&beats, &mut out, &config, &typewriter, &toolkit, &profile);
    out.flush().ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_flag_is_rejected() {
        let result = Cli::try_parse_from(["fanfare", "--bogus"]);
        let err = result.expect_err("unknown flag must fail parsing");
        assert!(err.to_string().contains("--bogus"));
    }

    #[test]
    fn test_cli_overrides_win_over_defaults() {
        let cli = Cli::try_parse_from([
            "fanfare",
            "--name",
            "Ada",
            "--company",
            "Acme",
            "--speed",
            "120",
            "--type-results",
            "yes",
            "--no-cursor",
        ])
        .unwrap();

        let mut config = Config::default();
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.name, "Ada");
        assert_eq!(config.company, "Acme");
        assert_eq!(config.speed, 120.0);
        assert!(config.type_results);
        assert!(!config.use_cursor);
    }

    #[test]
    fn test_bad_speed_flag_falls_back() {
        let cli = Cli::try_parse_from(["fanfare", "--speed", "fast"]).unwrap();
        let mut config = Config::default();
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.speed, config::DEFAULT_SPEED);

        let cli = Cli::try_parse_from(["fanfare", "--speed=-10"]).unwrap();
        let mut config = Config::default();
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.speed, config::DEFAULT_SPEED);
    }
}
