use crossterm::{cursor, execute};
use log::debug;
use std::io::stdout;

/// How much color the terminal can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTier {
    TrueColor,
    Palette256,
    Basic,
}

/// Terminal capabilities, probed once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct TerminalProfile {
    pub width: u16,
    pub color_tier: ColorTier,
    /// Whether we can hide/show the text cursor (i.e. stdout is a tty).
    pub cursor_control: bool,
}

impl TerminalProfile {
    pub fn probe() -> Self {
        let width = match crossterm::terminal::size() {
            Ok((w, _)) if w > 0 => w,
            _ => 80,
        };

        let interactive = atty::is(atty::Stream::Stdout);
        let color_tier = if !interactive {
            ColorTier::Basic
        } else {
            detect_color_tier(
                std::env::var("COLORTERM").ok().as_deref(),
                std::env::var("TERM").ok().as_deref(),
            )
        };

        let profile = Self {
            width,
            color_tier,
            cursor_control: interactive,
        };
        debug!("Terminal profile: {:?}", profile);
        profile
    }
}

fn detect_color_tier(colorterm: Option<&str>, term: Option<&str>) -> ColorTier {
    match colorterm {
        Some("truecolor") | Some("24bit") => return ColorTier::TrueColor,
        _ => {}
    }
    match term {
        Some(t) if t.contains("256color") => ColorTier::Palette256,
        Some("dumb") | None => ColorTier::Basic,
        Some(_) => ColorTier::Basic,
    }
}

/// Hides the text cursor for the lifetime of the guard and shows it again on
/// drop, whether the scene finished, returned early, or panicked.
pub struct CursorGuard {
    active: bool,
}

impl CursorGuard {
    pub fn hide() -> Self {
        let active = execute!(stdout(), cursor::Hide).is_ok();
        Self { active }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = execute!(stdout(), cursor::Show);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_color_tier() {
        assert_eq!(
            detect_color_tier(Some("truecolor"), Some("xterm")),
            ColorTier::TrueColor
        );
        assert_eq!(
            detect_color_tier(Some("24bit"), None),
            ColorTier::TrueColor
        );
        assert_eq!(
            detect_color_tier(None, Some("xterm-256color")),
            ColorTier::Palette256
        );
        assert_eq!(detect_color_tier(None, Some("vt100")), ColorTier::Basic);
        assert_eq!(detect_color_tier(None, Some("dumb")), ColorTier::Basic);
        assert_eq!(detect_color_tier(None, None), ColorTier::Basic);
    }
}
