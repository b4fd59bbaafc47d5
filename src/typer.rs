use crate::config::{sanitize_speed, Config};
use crate::toolkit::Toolkit;
use log::debug;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// One unit of typed output: either a single visible character or an atomic
/// run of bytes (an escape sequence) that is written in one burst and never
/// paced.
#[derive(Debug, PartialEq, Eq)]
pub enum Unit<'a> {
    Visible(&'a str),
    Atomic(&'a str),
}

/// Splits a string into typing units.
///
/// A CSI sequence starts at `ESC [` and runs through the first byte in the
/// `@`..=`~` final-byte range. A truncated sequence at end of input is flushed
/// verbatim as a single unit; a lone ESC is its own atomic unit. Visible
/// characters are split on UTF-8 char boundaries.
pub fn scan_units(s: &str) -> Vec<Unit<'_>> {
    let bytes = s.as_bytes();
    let mut units = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == 0x1b {
            if i + 1 < bytes.len() && bytes[i + 1] == b'[' {
                let mut j = i + 2;
                while j < bytes.len() && !(0x40..=0x7e).contains(&bytes[j]) {
                    j += 1;
                }
                if j < bytes.len() {
                    units.push(Unit::Atomic(&s[i..=j]));
                    i = j + 1;
                } else {
                    // Truncated sequence: flush the rest and stop scanning
                    units.push(Unit::Atomic(&s[i..]));
                    break;
                }
            } else {
                units.push(Unit::Atomic(&s[i..i + 1]));
                i += 1;
            }
        } else {
            // Continuation bytes never fall in the final-byte range, so `i`
            // is always on a char boundary here
            let ch_len = s[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            units.push(Unit::Visible(&s[i..i + ch_len]));
            i += ch_len;
        }
    }

    units
}

/// Removes escape sequences, keeping only the visible characters.
#[cfg(test)]
pub fn strip_escapes(s: &str) -> String {
    scan_units(s)
        .into_iter()
        .filter_map(|u| match u {
            Unit::Visible(c) => Some(c),
            Unit::Atomic(_) => None,
        })
        .collect()
}

/// The per-character pacing delay for a given speed, falling back to the
/// default rate when the speed is unusable.
pub fn per_char_delay(speed: f64) -> Duration {
    Duration::from_secs_f64(1.0 / sanitize_speed(speed))
}

/// Streams strings to a writer one visible character at a time, as if typed.
///
/// Escape sequences embedded in the text pass through atomically with no
/// delay. Typing never fails: I/O errors on cosmetic output are swallowed the
/// same way a broken pipe would end the show anyway.
pub struct Typewriter {
    speed: f64,
    delay: Duration,
    cursor_glyph: Option<String>,
    pacer: Option<PathBuf>,
}

impl Typewriter {
    pub fn new(config: &Config, toolkit: &Toolkit) -> Self {
        let speed = sanitize_speed(config.speed);
        Self {
            speed,
            delay: per_char_delay(speed),
            cursor_glyph: config
                .use_cursor
                .then(|| config.cursor_glyph.clone())
                .filter(|g| !g.is_empty()),
            // The external pacer streams through the process stdout, so it is
            // only eligible when stdout is the terminal being painted
            pacer: toolkit
                .pv
                .clone()
                .filter(|_| atty::is(atty::Stream::Stdout)),
        }
    }

    /// Plain typewriter with no faux cursor and no external pacer.
    #[cfg(test)]
    pub fn bare(speed: f64) -> Self {
        let speed = sanitize_speed(speed);
        Self {
            speed,
            delay: per_char_delay(speed),
            cursor_glyph: None,
            pacer: None,
        }
    }

    /// Types `text` into `w`. The byte sequence written equals `text` exactly
    /// when no faux cursor is configured; with a faux cursor the glyph and its
    /// erasure are interleaved but fully cleaned up by the end.
    ///
    /// When an external byte-rate pacer is configured, plain strings without
    /// embedded escapes delegate to it: the pacer cannot draw the faux cursor
    /// and is not trusted to keep escape sequences atomic, so anything else
    /// stays on the built-in path.
    pub fn type_out<W: Write>(&self, w: &mut W, text: &str) {
        if text.is_empty() {
            return;
        }

        if self.cursor_glyph.is_none() && !text.contains('\u{1b}') {
            if let Some(pacer) = &self.pacer {
                w.flush().ok();
                if self.delegate_to_pacer(pacer, text) {
                    return;
                }
            }
        }

        match &self.cursor_glyph {
            Some(glyph) => self.type_with_cursor(w, text, glyph),
            None => self.type_plain(w, text),
        }
    }

    fn type_plain<W: Write>(&self, w: &mut W, text: &str) {
        let mut first = true;
        for unit in scan_units(text) {
            match unit {
                Unit::Visible(ch) => {
                    if !first {
                        thread::sleep(self.delay);
                    }
                    first = false;
                    w.write_all(ch.as_bytes()).ok();
                    w.flush().ok();
                }
                Unit::Atomic(seq) => {
                    w.write_all(seq.as_bytes()).ok();
                }
            }
        }
        w.flush().ok();
    }

    fn type_with_cursor<W: Write>(&self, w: &mut W, text: &str, glyph: &str) {
        let glyph_cols = console::measure_text_width(glyph).max(1);
        let back = "\u{8}".repeat(glyph_cols);
        let mut typed_any = false;

        for unit in scan_units(text) {
            match unit {
                Unit::Visible(ch) => {
                    w.write_all(ch.as_bytes()).ok();
                    w.write_all(glyph.as_bytes()).ok();
                    w.flush().ok();
                    thread::sleep(self.delay);
                    // Step back over the glyph; the next character overwrites it
                    w.write_all(back.as_bytes()).ok();
                    typed_any = true;
                }
                Unit::Atomic(seq) => {
                    w.write_all(seq.as_bytes()).ok();
                }
            }
        }

        if typed_any {
            // Blank the trailing glyph so nothing stray remains on the line
            w.write_all(" ".repeat(glyph_cols).as_bytes()).ok();
            w.write_all(back.as_bytes()).ok();
        }
        w.flush().ok();
    }

    fn delegate_to_pacer(&self, pacer: &PathBuf, text: &str) -> bool {
        let rate = self.speed.round().max(1.0) as u64;
        let child = Command::new(pacer)
            .arg("-qL")
            .arg(rate.to_string())
            .stdin(Stdio::piped())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!("Pacer failed to start ({}), using built-in pacing", e);
                return false;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).ok();
        }
        child.wait().map(|status| status.success()).unwrap_or(false)
    }
}
