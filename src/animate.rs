use crate::banner::fire_gradient;
use crate::terminal::ColorTier;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::thread;
use std::time::Duration;

/// Per-step tick for the bar animation, derived from the typing speed but
/// clamped so extreme rates can neither freeze the bar nor make it invisible.
pub fn tick_delay(speed: f64) -> Duration {
    let seconds = (1.0 / crate::config::sanitize_speed(speed)).clamp(0.010, 0.060);
    Duration::from_secs_f64(seconds)
}

/// Filled cell count at step `i` of `steps` for a bar of `bar_width` cells.
pub fn filled_width(bar_width: usize, i: usize, steps: usize) -> usize {
    if steps == 0 {
        bar_width
    } else {
        bar_width * i.min(steps) / steps
    }
}

/// One full redraw of the progress line, starting with carriage return and
/// clear-to-end-of-line so it can be drawn over its previous frame.
pub fn render_bar_frame(
    label: &str,
    i: usize,
    steps: usize,
    bar_width: usize,
    tier: ColorTier,
) -> String {
    let filled = filled_width(bar_width, i, steps);
    let percent = if steps == 0 { 100 } else { 100 * i.min(steps) / steps };

    let mut bar = String::new();
    for cell in 0..bar_width {
        if cell < filled {
            let progress = cell as f32 / bar_width.max(1) as f32;
            let block = match tier {
                ColorTier::Basic => "█".normal(),
                _ => {
                    let (r, g, b) = fire_gradient(progress);
                    "█".truecolor(r, g, b)
                }
            };
            bar.push_str(&block.to_string());
        } else {
            bar.push('░');
        }
    }

    format!("\r\u{1b}[K  {} [{}] {:>3}%", label.bold(), bar, percent)
}

/// Draws a filling progress bar over `steps` fixed iterations.
pub fn progress_bar<W: Write>(
    w: &mut W,
    label: &str,
    steps: usize,
    bar_width: usize,
    speed: f64,
    tier: ColorTier,
) {
    let tick = tick_delay(speed);
    for i in 0..=steps {
        let frame = render_bar_frame(label, i, steps, bar_width, tier);
        w.write_all(frame.as_bytes()).ok();
        w.flush().ok();
        if i < steps {
            thread::sleep(tick);
        }
    }
    w.write_all(b"\n").ok();
    w.flush().ok();
}

/// Spins a glyph while a background placeholder task runs, polling its
/// liveness every ~80ms. The task is a timed no-op; the spinner stops shortly
/// after it elapses and the completion line goes to `w`.
pub fn spinner_while<W: Write>(w: &mut W, message: &str, busy_for: Duration) {
    let worker = thread::spawn(move || thread::sleep(busy_for));

    // The live spinner draws on stderr; without a terminal just wait it out
    if atty::is(atty::Stream::Stdout) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠁⠁⠉⠙⠚⠒⠂⠂⠒⠲⠴⠤⠄⠄⠤⠠⠠⠤⠦⠖⠒⠐⠐⠒⠓⠋⠉⠈⠈ ")
                .template("  {spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());

        while !worker.is_finished() {
            pb.tick();
            thread::sleep(Duration::from_millis(80));
        }
        pb.finish_and_clear();
    }

    let _ = worker.join();
    writeln!(w, "  {} {}", "✓".green(), message).ok();
    w.flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_delay_clamped() {
        assert_eq!(tick_delay(1_000_000.0), Duration::from_millis(10));
        assert_eq!(tick_delay(1.0), Duration::from_millis(60));
        // 30 cps sits inside the clamp window
        let mid = tick_delay(30.0).as_secs_f64();
        assert!(mid > 0.010 && mid < 0.060);
        // Bad rates use the default speed, still inside the window
        let fallback = tick_delay(0.0).as_secs_f64();
        assert!(fallback >= 0.010 && fallback <= 0.060);
    }

    #[test]
    fn test_filled_width_endpoints_and_monotonicity() {
        let steps = 20;
        let width = 34;
        assert_eq!(filled_width(width, 0, steps), 0);
        assert_eq!(filled_width(width, steps, steps), width);

        let mut previous = 0;
        for i in 0..=steps {
            let filled = filled_width(width, i, steps);
            assert!(filled >= previous, "bar shrank at step {}", i);
            assert!(filled <= width);
            previous = filled;
        }
    }

    #[test]
    fn test_final_frame_shows_one_hundred_percent() {
        let frame = render_bar_frame("Signing", 20, 20, 30, ColorTier::Basic);
        assert!(frame.contains("100%"));
        assert!(frame.starts_with("\r\u{1b}[K"));
        assert!(!frame.contains('░'));
    }

    #[test]
    fn test_first_frame_is_empty_bar() {
        let frame = render_bar_frame("Signing", 0, 20, 30, ColorTier::Basic);
        assert!(frame.contains("  0%"));
        assert!(!frame.contains('█'));
    }
}
