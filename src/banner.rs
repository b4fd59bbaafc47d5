use crate::terminal::{ColorTier, TerminalProfile};
use crate::toolkit::Toolkit;
use colored::*;
use log::debug;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Fire palette sampled at `progress` in 0..1: deep red through orange to
/// yellow, same ramp across banners and the progress bar.
pub fn fire_gradient(progress: f32) -> (u8, u8, u8) {
    let p = progress.clamp(0.0, 1.0);
    if p < 0.33 {
        let t = p / 0.33;
        ((139.0 + 116.0 * t) as u8, 0, 0)
    } else if p < 0.67 {
        let t = (p - 0.33) / 0.34;
        (255, (165.0 * t) as u8, 0)
    } else {
        let t = (p - 0.67) / 0.33;
        (255, (165.0 + 90.0 * t) as u8, 0)
    }
}

/// Colors one line of plain text with a horizontal gradient. `row_frac`
/// shifts the ramp per row so multi-line art shimmers diagonally.
pub fn gradient_line(line: &str, row_frac: f32, tier: ColorTier) -> String {
    if line.trim().is_empty() {
        return line.to_string();
    }
    if tier == ColorTier::Basic {
        return line.yellow().bold().to_string();
    }

    let chars: Vec<char> = line.chars().collect();
    let mut out = String::new();
    for (i, ch) in chars.iter().enumerate() {
        if *ch == ' ' {
            out.push(' ');
            continue;
        }
        let horizontal = i as f32 / chars.len() as f32;
        let (r, g, b) = fire_gradient((horizontal + row_frac * 0.3) % 1.0);
        out.push_str(&ch.to_string().truecolor(r, g, b).to_string());
    }
    out
}

/// Renders `text` as a large banner: figlet when available (optionally piped
/// through the gradient filter), otherwise a boxed-text fallback. Always
/// succeeds; every missing tool degrades to the next simpler path.
pub fn render_banner<W: Write>(w: &mut W, text: &str, toolkit: &Toolkit, profile: &TerminalProfile) {
    if let Some(figlet) = &toolkit.figlet {
        let output = Command::new(figlet)
            .arg("-w")
            .arg(profile.width.to_string())
            .arg(text)
            .output();

        if let Ok(output) = output {
            if output.status.success() {
                let art = String::from_utf8_lossy(&output.stdout).into_owned();
                let art = match &toolkit.lolcat {
                    Some(lolcat) => rainbow_filter(lolcat, &art).unwrap_or(art),
                    None => apply_gradient(&art, profile.color_tier),
                };
                w.write_all(art.as_bytes()).ok();
                w.flush().ok();
                return;
            }
        }
        debug!("figlet run failed, using boxed banner");
    }

    boxed_banner(w, text, profile.color_tier);
}

fn apply_gradient(art: &str, tier: ColorTier) -> String {
    let total = art.lines().count().max(1);
    let mut out = String::new();
    for (row, line) in art.lines().enumerate() {
        out.push_str(&gradient_line(line, row as f32 / total as f32, tier));
        out.push('\n');
    }
    out
}

fn rainbow_filter(lolcat: &Path, art: &str) -> Option<String> {
    let mut child = Command::new(lolcat)
        .arg("-f")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .ok()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(art.as_bytes()).ok()?;
    }
    let output = child.wait_with_output().ok()?;
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        None
    }
}

/// Built-in fallback banner: the text in a rounded box.
pub fn boxed_banner<W: Write>(w: &mut W, text: &str, tier: ColorTier) {
    let width = console::measure_text_width(text);
    let top = format!("╭{}╮", "─".repeat(width + 2));
    let mid = format!("│ {} │", text);
    let bottom = format!("╰{}╯", "─".repeat(width + 2));

    for (row, line) in [top, mid, bottom].iter().enumerate() {
        let colored_line = gradient_line(line, row as f32 / 3.0, tier);
        w.write_all(colored_line.as_bytes()).ok();
        w.write_all(b"\n").ok();
    }
    w.flush().ok();
}

/// Prints a user-supplied logo. Text and pre-rendered escape art pass through
/// verbatim; images go to the probed terminal-art renderer. A missing or
/// unreadable logo is only worth a hint, never an error.
pub fn render_logo<W: Write>(w: &mut W, path: &Path, toolkit: &Toolkit, profile: &TerminalProfile) {
    if looks_like_image(path) {
        match toolkit.image_renderer() {
            Some(renderer) => {
                let output = Command::new(renderer)
                    .arg(format!("--width={}", profile.width.min(60)))
                    .arg(path)
                    .output();
                if let Ok(output) = output {
                    if output.status.success() {
                        w.write_all(&output.stdout).ok();
                        w.flush().ok();
                        return;
                    }
                }
                writeln!(w, "{}", "(logo skipped: image renderer failed)".dimmed()).ok();
            }
            None => {
                writeln!(
                    w,
                    "{}",
                    "(logo skipped: install chafa or jp2a for image logos)".dimmed()
                )
                .ok();
            }
        }
        return;
    }

    match std::fs::read_to_string(path) {
        Ok(art) => {
            w.write_all(art.as_bytes()).ok();
            if !art.ends_with('\n') {
                w.write_all(b"\n").ok();
            }
            w.flush().ok();
        }
        Err(e) => {
            debug!("Could not read logo {}: {}", path.display(), e);
            writeln!(w, "{}", "(logo skipped: file not readable)".dimmed()).ok();
        }
    }
}

fn looks_like_image(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("png") | Some("jpg") | Some("jpeg") | Some("gif") | Some("webp") | Some("bmp")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typer::strip_escapes;
    use std::io::Write as _;
    use std::path::PathBuf;

    #[test]
    fn test_fire_gradient_endpoints() {
        assert_eq!(fire_gradient(0.0), (139, 0, 0));
        let (r, g, b) = fire_gradient(1.0);
        assert_eq!((r, b), (255, 0));
        assert!(g > 200);
        // Out-of-range input clamps instead of wrapping
        assert_eq!(fire_gradient(-1.0), fire_gradient(0.0));
        assert_eq!(fire_gradient(2.0), fire_gradient(1.0));
    }

    #[test]
    fn test_gradient_line_preserves_text() {
        let line = "WELCOME ABOARD";
        let colored_line = gradient_line(line, 0.0, ColorTier::TrueColor);
        assert_eq!(strip_escapes(&colored_line), line);
    }

    #[test]
    fn test_boxed_banner_contains_text() {
        let mut buf = Vec::new();
        boxed_banner(&mut buf, "Acme", ColorTier::Basic);
        let out = strip_escapes(&String::from_utf8(buf).unwrap());
        assert!(out.contains("Acme"));
        assert!(out.contains('╭'));
        assert!(out.contains('╯'));
    }

    #[test]
    fn test_render_banner_without_figlet_falls_back() {
        let mut buf = Vec::new();
        let profile = TerminalProfile {
            width: 80,
            color_tier: ColorTier::Basic,
            cursor_control: false,
        };
        render_banner(&mut buf, "Acme", &Toolkit::default(), &profile);
        let out = strip_escapes(&String::from_utf8(buf).unwrap());
        assert!(out.contains("Acme"));
    }

    #[test]
    fn test_render_logo_text_file_verbatim() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "  /\\_/\\\n ( o.o )\n").unwrap();

        let mut buf = Vec::new();
        let profile = TerminalProfile {
            width: 80,
            color_tier: ColorTier::Basic,
            cursor_control: false,
        };
        render_logo(&mut buf, file.path(), &Toolkit::default(), &profile);
        assert_eq!(String::from_utf8(buf).unwrap(), "  /\\_/\\\n ( o.o )\n");
    }

    #[test]
    fn test_render_logo_missing_file_is_nonfatal() {
        let mut buf = Vec::new();
        let profile = TerminalProfile {
            width: 80,
            color_tier: ColorTier::Basic,
            cursor_control: false,
        };
        render_logo(
            &mut buf,
            &PathBuf::from("/nonexistent/logo.txt"),
            &Toolkit::default(),
            &profile,
        );
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("logo skipped"));
    }

    #[test]
    fn test_render_logo_image_without_renderer_hints() {
        let mut buf = Vec::new();
        let profile = TerminalProfile {
            width: 80,
            color_tier: ColorTier::Basic,
            cursor_control: false,
        };
        render_logo(
            &mut buf,
            &PathBuf::from("logo.png"),
            &Toolkit::default(),
            &profile,
        );
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("chafa or jp2a"));
    }

    #[test]
    fn test_looks_like_image() {
        assert!(looks_like_image(&PathBuf::from("a.PNG")));
        assert!(looks_like_image(&PathBuf::from("b.jpeg")));
        assert!(!looks_like_image(&PathBuf::from("c.txt")));
        assert!(!looks_like_image(&PathBuf::from("noext")));
    }
}
