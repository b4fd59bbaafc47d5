use crate::animate;
use crate::banner;
use crate::config::Config;
use crate::terminal::TerminalProfile;
use crate::toolkit::Toolkit;
use crate::typer::Typewriter;
use colored::*;
use std::io::Write;
use std::thread;
use std::time::Duration;

const BAR_STEPS: usize = 20;

/// One discrete visual step of the announcement.
#[derive(Debug, Clone)]
pub enum Beat {
    /// User-supplied logo art, when configured.
    Logo,
    /// Big gradient banner text.
    Banner(String),
    /// Horizontal rule, skipped in quiet-border mode.
    Rule,
    /// A line typed out character by character.
    Typed(String),
    /// A fake shell interaction: typed prompt, then its result.
    Command { prompt: String, result: String },
    /// A filling progress bar.
    Bar { label: String },
    /// Spinner over a background placeholder task.
    Spinner { message: String, busy_ms: u64 },
    /// Silence between beats.
    Pause(u64),
}

/// The whole announcement as data: an ordered list of beats derived from the
/// configuration, played back linearly.
pub fn build_scene(config: &Config) -> Vec<Beat> {
    let pause = config.pause_ms;
    let mut beats = Vec::new();

    if config.logo.is_some() {
        beats.push(Beat::Logo);
        beats.push(Beat::Pause(pause));
    }

    beats.push(Beat::Rule);
    beats.push(Beat::Typed(format!(
        "{}",
        "★ BREAKING NEWS ★".yellow().bold()
    )));
    beats.push(Beat::Rule);
    beats.push(Beat::Pause(pause));

    beats.push(Beat::Command {
        prompt: "$ whoami".to_string(),
        result: config.name.clone(),
    });
    beats.push(Beat::Pause(pause));

    beats.push(Beat::Command {
        prompt: "$ cat offer.txt".to_string(),
        result: format!(
            "{} @ {}\nstart date: {}",
            config.role, config.company, config.start_date
        ),
    });
    beats.push(Beat::Pause(pause));

    beats.push(Beat::Bar {
        label: "Signing contract".to_string(),
    });
    beats.push(Beat::Bar {
        label: "Uploading celebration".to_string(),
    });
    beats.push(Beat::Spinner {
        message: "Notifying the team".to_string(),
        // Placeholder work, scaled off the beat pause so a fast run stays fast
        busy_ms: pause * 2,
    });
    beats.push(Beat::Pause(pause));

    beats.push(Beat::Banner(config.company.clone()));
    beats.push(Beat::Typed(format!(
        "{} {} {}",
        "🎉".normal(),
        "I GOT THE JOB!".green().bold(),
        "🎉".normal()
    )));
    beats.push(Beat::Typed(format!(
        "See you on day one, {}!",
        config.name
    )));
    beats.push(Beat::Rule);

    if config.quiet_border {
        beats.retain(|beat| !matches!(beat, Beat::Rule));
    }
    beats
}

/// Plays the scene against a writer. Animations that inherently own the
/// terminal (the live spinner) draw on stderr and stay out of `w`.
pub fn play<W: Write>(
    beats: &[Beat],
    w: &mut W,
    config: &Config,
    typewriter: &Typewriter,
    toolkit: &Toolkit,
    profile: &TerminalProfile,
) {
    let bar_width = (profile.width.saturating_sub(30) as usize).clamp(10, 34);

    for beat in beats {
        match beat {
            Beat::Logo => {
                if let Some(path) = &config.logo {
                    banner::render_logo(w, path, toolkit, profile);
                }
            }
            Beat::Banner(text) => {
                banner::render_banner(w, text, toolkit, profile);
            }
            Beat::Rule => {
                let rule = "═".repeat(profile.width.min(60) as usize);
                writeln!(w, "{}", rule.dimmed()).ok();
            }
            Beat::Typed(text) => {
                typewriter.type_out(w, text);
                writeln!(w).ok();
            }
            Beat::Command { prompt, result } => {
                typewriter.type_out(w, &format!("{}", prompt.green()));
                writeln!(w).ok();
                if config.type_results {
                    typewriter.type_out(w, result);
                    writeln!(w).ok();
                } else {
                    writeln!(w, "{}", result).ok();
                }
            }
            Beat::Bar { label } => {
                animate::progress_bar(
                    w,
                    label,
                    BAR_STEPS,
                    bar_width,
                    config.speed,
                    profile.color_tier,
                );
            }
            Beat::Spinner { message, busy_ms } => {
                animate::spinner_while(w, message, Duration::from_millis(*busy_ms));
            }
            Beat::Pause(ms) => {
                thread::sleep(Duration::from_millis(*ms));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::ColorTier;
    use crate::typer::strip_escapes;
    use std::time::Instant;

    fn fast_config() -> Config {
        Config {
            name: "Ada".to_string(),
            company: "Acme".to_string(),
            speed: 1_000_000.0,
            pause_ms: 0,
            type_results: true,
            use_cursor: false,
            ..Config::default()
        }
    }

    fn test_profile() -> TerminalProfile {
        TerminalProfile {
            width: 80,
            color_tier: ColorTier::Basic,
            cursor_control: false,
        }
    }

    #[test]
    fn test_quiet_border_drops_rules() {
        let mut config = fast_config();
        config.quiet_border = true;
        let beats = build_scene(&config);
        assert!(!beats.iter().any(|b| matches!(b, Beat::Rule)));

        config.quiet_border = false;
        let beats = build_scene(&config);
        assert!(beats.iter().any(|b| matches!(b, Beat::Rule)));
    }

    #[test]
    fn test_no_logo_beat_without_logo() {
        let beats = build_scene(&fast_config());
        assert!(!beats.iter().any(|b| matches!(b, Beat::Logo)));
    }

    #[test]
    fn test_scene_end_to_end() {
        let config = fast_config();
        let toolkit = Toolkit::default();
        let typewriter = Typewriter::new(&config, &toolkit);
        let beats = build_scene(&config);

        let started = Instant::now();
        let mut buf = Vec::new();
        play(&beats, &mut buf, &config, &typewriter, &toolkit, &test_profile());
        let elapsed = started.elapsed();

        // At a million cps the typing itself is effectively instant; only the
        // clamped bar ticks take real time
        assert!(elapsed.as_secs_f64() < 3.0, "scene took {:?}", elapsed);

        let plain = strip_escapes(&String::from_utf8(buf).unwrap());
        assert!(
            plain.contains("$ whoami\nAda"),
            "whoami result missing from:\n{}",
            plain
        );
        assert!(plain.contains("Acme"));
        assert!(plain.contains("100%"));
        assert!(plain.contains("I GOT THE JOB!"));
    }

    #[test]
    fn test_scene_respects_type_results_off() {
        let mut config = fast_config();
        config.type_results = false;
        let toolkit = Toolkit::default();
        let typewriter = Typewriter::new(&config, &toolkit);
        let beats = build_scene(&config);

        let mut buf = Vec::new();
        play(&beats, &mut buf, &config, &typewriter, &toolkit, &test_profile());
        let plain = strip_escapes(&String::from_utf8(buf).unwrap());
        assert!(plain.contains("$ whoami\nAda"));
    }
}
