//! Diagnostic output on the error channel
//!
//! A [`Diagnostics`] handle is created once by the binary and passed by
//! reference to everything that reports problems. Messages below the
//! threshold are dropped. Nothing here ever writes to stdout.

use std::error::Error as StdError;
use std::fmt::Display;
use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::error::Error;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    fn color(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Level::Debug => spec.set_fg(Some(Color::Black)).set_intense(true),
            Level::Info => spec.set_fg(Some(Color::Cyan)),
            Level::Warning => spec.set_fg(Some(Color::Yellow)),
            Level::Error => spec.set_fg(Some(Color::Red)),
            Level::Fatal => spec.set_fg(Some(Color::Red)).set_bold(true),
        };
        spec
    }
}

/// Levelled message sink.
pub struct Diagnostics<W: WriteColor> {
    out: W,
    threshold: Level,
}

impl Diagnostics<StandardStream> {
    /// Diagnostics on stderr.
    pub fn stderr(color: ColorChoice, threshold: Level) -> Self {
        Self::new(StandardStream::stderr(color), threshold)
    }
}

impl<W: WriteColor> Diagnostics<W> {
    pub fn new(out: W, threshold: Level) -> Self {
        Self { out, threshold }
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: Level) {
        self.threshold = threshold;
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.threshold
    }

    /// Write one `[ level ] message` line.
    ///
    /// Failures to write diagnostics are ignored; there is nowhere left
    /// to report them.
    pub fn log(&mut self, level: Level, message: impl Display) {
        if !self.enabled(level) {
            return;
        }
        let _ = self.write_line(level, &message);
    }

    fn write_line(&mut self, level: Level, message: &dyn Display) -> std::io::Result<()> {
        write!(self.out, "[ ")?;
        self.out.set_color(&level.color())?;
        write!(self.out, "{}", level.name())?;
        self.out.reset()?;
        writeln!(self.out, " ] {}", message)?;
        self.out.flush()
    }

    pub fn debug(&mut self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&mut self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warning(&mut self, message: impl Display) {
        self.log(Level::Warning, message);
    }

    pub fn error(&mut self, message: impl Display) {
        self.log(Level::Error, message);
    }

    pub fn fatal(&mut self, message: impl Display) {
        self.log(Level::Fatal, message);
    }

    /// Report a recoverable per-entry error.
    pub fn entry_error(&mut self, err: &Error) {
        match err.path() {
            Some(path) => self.error(format_args!("{}: {}", path.display(), chain(err))),
            None => self.error(chain(err)),
        }
    }

    /// Report an error that ends the run.
    ///
    /// Configuration errors are shown as-is. Anything else gets the generic
    /// `Internal Error` line, the offending path, and the full cause chain
    /// at debug level.
    pub fn report(&mut self, err: &Error) {
        if err.is_config() {
            self.error(chain(err));
            return;
        }
        self.fatal("Internal Error");
        if let Some(path) = err.path() {
            self.fatal(format_args!("Path: {}", path.display()));
        }
        self.debug(chain(err));
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render an error and its sources as `outer: inner: ...`.
pub fn chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use termcolor::Buffer;

    fn output(diag: Diagnostics<Buffer>) -> String {
        String::from_utf8(diag.into_inner().into_inner()).unwrap()
    }

    #[test]
    fn test_threshold_filters_messages() {
        let mut diag = Diagnostics::new(Buffer::no_color(), Level::Warning);
        diag.debug("hidden");
        diag.info("hidden too");
        diag.warning("shown");
        diag.error("also shown");
        assert_eq!(output(diag), "[ warning ] shown\n[ error ] also shown\n");
    }

    #[test]
    fn test_debug_threshold_shows_everything() {
        let mut diag = Diagnostics::new(Buffer::no_color(), Level::Warning);
        diag.set_threshold(Level::Debug);
        assert!(diag.enabled(Level::Debug));
        diag.debug("details");
        assert_eq!(output(diag), "[ debug ] details\n");
    }

    #[test]
    fn test_report_fatal_with_path() {
        let err = Error::ReadDir {
            path: PathBuf::from("/srv/locked"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        let mut diag = Diagnostics::new(Buffer::no_color(), Level::Warning);
        diag.report(&err);
        assert_eq!(
            output(diag),
            "[ fatal ] Internal Error\n[ fatal ] Path: /srv/locked\n"
        );

        let mut diag = Diagnostics::new(Buffer::no_color(), Level::Debug);
        diag.report(&err);
        assert!(output(diag).ends_with("[ debug ] cannot read directory: denied\n"));
    }

    #[test]
    fn test_report_config_error() {
        let mut diag = Diagnostics::new(Buffer::no_color(), Level::Warning);
        diag.report(&Error::InvalidTypeMask('z'));
        assert_eq!(output(diag), "[ error ] invalid type mask character 'z'\n");
    }

    #[test]
    fn test_entry_error_includes_path() {
        let err = Error::MetadataUnavailable {
            path: PathBuf::from("x.txt"),
            field: "last access",
            source: io::Error::new(io::ErrorKind::Unsupported, "unsupported"),
        };
        let mut diag = Diagnostics::new(Buffer::no_color(), Level::Warning);
        diag.entry_error(&err);
        assert_eq!(
            output(diag),
            "[ error ] x.txt: last access is unavailable: unsupported\n"
        );
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }
}
