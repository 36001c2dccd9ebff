//! Line-oriented terminal front-end used by the binary.

use std::io::{self, Write};

use crate::log_warn;
use crate::timer::{Display, Frame};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Marker(String),
    Quit,
    Unknown(String),
}

impl Command {
    /// Empty line or `t` toggles, `q` quits, `1..=n` picks the n-th marker
    /// note, and a note typed verbatim is used as-is.
    pub fn parse(line: &str, notes: &[String]) -> Self {
        let input = line.trim();
        match input {
            "" | "t" => return Command::Toggle,
            "q" => return Command::Quit,
            _ => {}
        }

        if let Ok(index) = input.parse::<usize>() {
            if let Some(note) = index.checked_sub(1).and_then(|i| notes.get(i)) {
                return Command::Marker(note.clone());
            }
        }

        match notes.iter().find(|note| note.as_str() == input) {
            Some(note) => Command::Marker(note.clone()),
            None => Command::Unknown(input.to_owned()),
        }
    }
}

pub fn help_text(notes: &[String]) -> String {
    let markers: Vec<String> = notes
        .iter()
        .enumerate()
        .map(|(i, note)| format!("{}={}", i + 1, note))
        .collect();
    format!("[enter] start/stop  [{}] marker  [q] quit", markers.join(" "))
}

/// Redraws a single status line in place. Unchanged lines are not rewritten.
///
/// The first write failure is logged; later ones are dropped silently.
pub struct TerminalDisplay<W: Write + Send> {
    out: W,
    glyph: String,
    last_line: Option<String>,
    write_failed: bool,
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            glyph: String::new(),
            last_line: None,
            write_failed: false,
        }
    }

    pub fn write_failed(&self) -> bool {
        self.write_failed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, line: String) {
        if self.last_line.as_deref() == Some(line.as_str()) {
            return;
        }
        let result = write!(self.out, "\r{line}   ").and_then(|()| self.out.flush());
        if let Err(err) = result {
            self.report_failure(&err);
        }
        self.last_line = Some(line);
    }

    fn report_failure(&mut self, err: &io::Error) {
        if !self.write_failed {
            log_warn!("Terminal output failed: {}", err);
            self.write_failed = true;
        }
    }
}

impl<W: Write + Send> Display for TerminalDisplay<W> {
    fn render(&mut self, frame: &Frame) {
        let line = format!("{} {}", self.glyph, frame);
        self.draw(line);
    }

    fn set_toggle_glyph(&mut self, glyph: &str) {
        self.glyph = glyph.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_MARKER_NOTES;

    fn notes() -> Vec<String> {
        DEFAULT_MARKER_NOTES.iter().map(|note| note.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        let notes = notes();
        assert_eq!(Command::parse("", &notes), Command::Toggle);
        assert_eq!(Command::parse(" t ", &notes), Command::Toggle);
        assert_eq!(Command::parse("q", &notes), Command::Quit);
        assert_eq!(Command::parse("1", &notes), Command::Marker("✨".into()));
        assert_eq!(Command::parse("✂", &notes), Command::Marker("✂".into()));
        assert_eq!(Command::parse("0", &notes), Command::Unknown("0".into()));
        assert_eq!(Command::parse("9", &notes), Command::Unknown("9".into()));
        assert_eq!(Command::parse("hello", &notes), Command::Unknown("hello".into()));
    }

    #[test]
    fn redraws_only_on_change() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.set_toggle_glyph("⏯");
        display.render(&Frame::Idle);
        display.render(&Frame::Idle);
        display.render(&Frame::Recording {
            elapsed: "0:00:01".into(),
        });

        let written = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(written, "\r⏯ 0:00:00   \r⏯ 0:00:01   ");
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_recorded_not_fatal() {
        let mut display = TerminalDisplay::new(ClosedPipe);
        assert!(!display.write_failed());

        display.render(&Frame::Idle);
        display.render(&Frame::Recording {
            elapsed: "0:00:01".into(),
        });

        assert!(display.write_failed());
    }

    #[test]
    fn help_lists_numbered_notes() {
        let help = help_text(&notes()[..2]);
        assert_eq!(help, "[enter] start/stop  [1=✨ 2=✂] marker  [q] quit");
    }
}
