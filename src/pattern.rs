//! Path pattern compilation
//!
//! Patterns are compiled once, before any traversal starts, with the `regex`
//! crate, and matched against the raw bytes of each path. The POSIX and grep dialects are first rewritten into `regex` syntax:
//!
//! - `ecma` is used as-is
//! - `eposix` only needs bracket expressions normalised
//! - `posix` (basic) swaps the meaning of escaped and bare `( ) { } | + ?`
//! - `grep` / `egrep` are `posix` / `eposix` with one alternative per line

use regex::bytes::Regex;

use crate::config::{MatchMode, PatternConfig, PatternSyntax};
use crate::error::Result;

/// A compiled path pattern with its match mode.
#[derive(Debug, Clone)]
pub struct PathPattern {
    regex: Regex,
    mode: MatchMode,
}

impl PathPattern {
    pub fn compile(config: &PatternConfig) -> Result<Self> {
        let translated = translate(&config.source, config.syntax);
        // Validate on its own first: an unbalanced pattern must not be able
        // to close the anchoring group
        let search = Regex::new(&translated)?;
        let regex = match config.mode {
            MatchMode::Search => search,
            MatchMode::Exact => Regex::new(&format!(r"\A(?:{translated})\z"))?,
        };
        Ok(Self {
            regex,
            mode: config.mode,
        })
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Test a path string. Exact mode anchoring is baked into the regex.
    pub fn is_match(&self, path: &[u8]) -> bool {
        self.regex.is_match(path)
    }
}

/// Rewrite `source` from `syntax` into `regex` crate syntax.
pub fn translate(source: &str, syntax: PatternSyntax) -> String {
    match syntax {
        PatternSyntax::Ecma => source.to_string(),
        PatternSyntax::ExtendedPosix => translate_extended(source),
        PatternSyntax::BasicPosix => translate_basic(source),
        PatternSyntax::Grep => alternatives(source, translate_basic),
        PatternSyntax::Egrep => alternatives(source, translate_extended),
    }
}

fn alternatives(source: &str, translate_one: fn(&str) -> String) -> String {
    if !source.contains('\n') {
        return translate_one(source);
    }
    source
        .split('\n')
        .map(|alt| format!("(?:{})", translate_one(alt)))
        .collect::<Vec<_>>()
        .join("|")
}

fn translate_extended(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                out.push('\\');
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                }
                i += 2;
            }
            '[' => i = copy_bracket(&chars, i, &mut out),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn translate_basic(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() + 8);
    // True where `*` is literal and `^` is an anchor
    let mut at_start = true;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let mut next_at_start = false;
        match c {
            '\\' => {
                match chars.get(i + 1).copied() {
                    Some(op @ ('(' | '|')) => {
                        out.push(op);
                        next_at_start = true;
                    }
                    Some(op @ (')' | '{' | '}' | '+' | '?')) => out.push(op),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                }
                i += 2;
            }
            '[' => {
                i = copy_bracket(&chars, i, &mut out);
            }
            '*' if at_start => {
                out.push_str(r"\*");
                i += 1;
            }
            '^' if at_start => {
                out.push('^');
                next_at_start = true;
                i += 1;
            }
            '^' => {
                out.push_str(r"\^");
                i += 1;
            }
            '$' => {
                let at_end = match chars.get(i + 1) {
                    None => true,
                    Some('\\') => matches!(chars.get(i + 2), Some(')' | '|')),
                    Some(_) => false,
                };
                out.push_str(if at_end { "$" } else { r"\$" });
                i += 1;
            }
            '(' | ')' | '{' | '}' | '|' | '+' | '?' => {
                out.push('\\');
                out.push(c);
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
        at_start = next_at_start;
    }
    out
}

/// Copy a POSIX bracket expression starting at `chars[start] == '['`,
/// escaping characters that `regex` treats specially inside classes.
/// Returns the index after the closing `]`.
fn copy_bracket(chars: &[char], start: usize, out: &mut String) -> usize {
    let mut i = start + 1;
    out.push('[');
    if chars.get(i) == Some(&'^') {
        out.push('^');
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        out.push_str(r"\]");
        i += 1;
    }
    while i < chars.len() {
        match chars[i] {
            ']' => {
                out.push(']');
                return i + 1;
            }
            '[' if matches!(chars.get(i + 1), Some(':' | '=' | '.')) => {
                let delim = chars[i + 1];
                let close = (i + 2..chars.len().saturating_sub(1))
                    .find(|&j| chars[j] == delim && chars[j + 1] == ']');
                match close {
                    Some(j) => {
                        out.extend(&chars[i..=j + 1]);
                        i = j + 2;
                    }
                    None => {
                        out.push_str(r"\[");
                        i += 1;
                    }
                }
            }
            c @ ('[' | '\\' | '&' | '~') => {
                out.push('\\');
                out.push(c);
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    // Unterminated; let the regex compiler report it
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn compile(source: &str, syntax: PatternSyntax, mode: MatchMode) -> PathPattern {
        PathPattern::compile(
            &PatternConfig::new(source)
                .with_syntax(syntax)
                .with_mode(mode),
        )
        .unwrap()
    }

    #[test]
    fn test_ecma_search() {
        let p = compile(r"b\.", PatternSyntax::Ecma, MatchMode::Search);
        assert!(p.is_match(b"/root/sub/b.txt"));
        assert!(!p.is_match(b"/root/a.txt"));
        assert!(!p.is_match(b"/root/sub/bxtxt"));
    }

    #[test]
    fn test_exact_requires_whole_path() {
        let p = compile(r"b\.txt", PatternSyntax::Ecma, MatchMode::Exact);
        assert!(!p.is_match(b"/root/sub/b.txt"));
        assert!(p.is_match(b"b.txt"));

        let p = compile(r".*/b\.txt", PatternSyntax::Ecma, MatchMode::Exact);
        assert!(p.is_match(b"/root/sub/b.txt"));
    }

    #[test]
    fn test_exact_anchors_every_alternative() {
        let p = compile("a|b", PatternSyntax::Ecma, MatchMode::Exact);
        assert!(p.is_match(b"a"));
        assert!(p.is_match(b"b"));
        assert!(!p.is_match(b"ab"));
    }

    #[test]
    fn test_exact_match_implies_search_match() {
        let paths = ["./a.txt", "./sub/b.txt", "x", ""];
        for source in [r".*\.txt", "x", ".*"] {
            let exact = compile(source, PatternSyntax::Ecma, MatchMode::Exact);
            let search = compile(source, PatternSyntax::Ecma, MatchMode::Search);
            for path in paths {
                if exact.is_match(path.as_bytes()) {
                    assert!(search.is_match(path.as_bytes()), "{source} on {path}");
                }
            }
        }
    }

    #[test]
    fn test_basic_posix_translation() {
        assert_eq!(translate_basic(r"\(ab\)*"), "(ab)*");
        assert_eq!(translate_basic("a+b?"), r"a\+b\?");
        assert_eq!(translate_basic(r"a\{2\}"), "a{2}");
        assert_eq!(translate_basic("*a"), r"\*a");
        assert_eq!(translate_basic(r"\(*a\)"), r"(\*a)");
        assert_eq!(translate_basic("^a^b$c$"), r"^a\^b\$c$");
        assert_eq!(translate_basic(r"a\|b"), "a|b");
        assert_eq!(translate_basic("(x)"), r"\(x\)");
    }

    #[test]
    fn test_basic_posix_matching() {
        let p = compile(r"\(sub/\)\{1\}b", PatternSyntax::BasicPosix, MatchMode::Search);
        assert!(p.is_match(b"./sub/b.txt"));
        let p = compile("a+", PatternSyntax::BasicPosix, MatchMode::Search);
        assert!(p.is_match(b"x/a+"));
        assert!(!p.is_match(b"x/aa"));
    }

    #[test]
    fn test_bracket_expressions() {
        assert_eq!(translate_extended("[]a]"), r"[\]a]");
        assert_eq!(translate_extended("[^]a]"), r"[^\]a]");
        assert_eq!(translate_extended(r"[\]"), r"[\\]");
        assert_eq!(translate_extended("[[:digit:]x]"), "[[:digit:]x]");
        assert_eq!(translate_basic("[(+]"), "[(+]");

        let p = compile("[[:digit:]]+", PatternSyntax::ExtendedPosix, MatchMode::Exact);
        assert!(p.is_match(b"2016"));
        assert!(!p.is_match(b"20a6"));
    }

    #[test]
    fn test_grep_newline_alternatives() {
        assert_eq!(translate("a\nb+", PatternSyntax::Grep), r"(?:a)|(?:b\+)");
        assert_eq!(translate("a\nb+", PatternSyntax::Egrep), "(?:a)|(?:b+)");

        let p = compile("\\.rs$\n\\.toml$", PatternSyntax::Egrep, MatchMode::Search);
        assert!(p.is_match(b"src/lib.rs"));
        assert!(p.is_match(b"Cargo.toml"));
        assert!(!p.is_match(b"README.md"));
    }

    #[test]
    fn test_unbalanced_group_rejected_in_both_modes() {
        for mode in [MatchMode::Search, MatchMode::Exact] {
            let result = PathPattern::compile(&PatternConfig::new("x)|(?:y").with_mode(mode));
            match result {
                Err(err) => assert!(err.is_config()),
                Ok(p) => panic!("{mode:?} accepted an unbalanced pattern: {p:?}"),
            }
        }
    }

    #[test]
    fn test_matches_non_utf8_paths() {
        let p = compile(r"\.txt$", PatternSyntax::Ecma, MatchMode::Search);
        assert!(p.is_match(b"./\xff.txt"));

        let p = compile(r"\./.*\.txt", PatternSyntax::Ecma, MatchMode::Exact);
        assert!(p.is_match(b"./a.txt"));
        assert!(!p.is_match(b"./a.txt.bak"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = PathPattern::compile(&PatternConfig::new("(unclosed")).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern(_)));
        assert!(err.is_config());

        // Back-references are not supported by the engine
        let err = PathPattern::compile(
            &PatternConfig::new(r"\(a\)\1").with_syntax(PatternSyntax::BasicPosix),
        )
        .unwrap_err();
        assert!(err.is_config());
    }
}
