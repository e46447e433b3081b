//! Scan configuration assembled by the command line front end

use crate::entry::TypeMask;

/// Separator written after every emitted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineTerminator {
    #[default]
    Space,
    Newline,
}

impl LineTerminator {
    pub fn as_byte(self) -> u8 {
        match self {
            LineTerminator::Space => b' ',
            LineTerminator::Newline => b'\n',
        }
    }
}

/// How a pattern has to match the path string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Any fragment of the path may match
    #[default]
    Search,
    /// The whole path must match
    Exact,
}

/// Regular expression dialect of the path pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternSyntax {
    /// Basic POSIX with newline-separated alternatives
    Grep,
    /// Extended POSIX with newline-separated alternatives
    Egrep,
    #[default]
    Ecma,
    BasicPosix,
    ExtendedPosix,
}

impl PatternSyntax {
    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            PatternSyntax::Grep => "grep",
            PatternSyntax::Egrep => "egrep",
            PatternSyntax::Ecma => "ecma",
            PatternSyntax::BasicPosix => "posix",
            PatternSyntax::ExtendedPosix => "eposix",
        }
    }
}

/// Path pattern as given by the user, compiled later by [`crate::pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternConfig {
    pub source: String,
    pub mode: MatchMode,
    pub syntax: PatternSyntax,
}

impl PatternConfig {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            mode: MatchMode::default(),
            syntax: PatternSyntax::default(),
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_syntax(mut self, syntax: PatternSyntax) -> Self {
        self.syntax = syntax;
        self
    }
}

/// Read-only configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// `None` means unbounded depth
    pub max_depth: Option<usize>,
    pub type_mask: TypeMask,
    /// Resolve each root to an absolute, symlink-free path before scanning
    pub canonicalize: bool,
    pub line_terminator: LineTerminator,
    pub pattern: Option<PatternConfig>,
    /// Interpolation template; `None` prints the bare path
    pub template: Option<String>,
}
