//! CLI entry point for recurse

use std::ffi::OsString;
use std::io::{self, BufWriter, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use recurse::{
    Diagnostics, Level, LineTerminator, MatchMode, PatternConfig, PatternSyntax, ScanConfig,
    TypeMask,
};
use termcolor::ColorChoice;

const LICENSE: &str = "\
Copyright (c) the recurse developers

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
";

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether diagnostics on stderr should be colored.
fn color_choice(mode: ColorMode) -> ColorChoice {
    let use_color = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                false
            } else if std::env::var_os("FORCE_COLOR").is_some() {
                true
            } else if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                false
            } else {
                io::stderr().is_terminal()
            }
        }
    };
    if use_color {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    }
}

/// Find `--color` in raw arguments, for errors raised before parsing succeeds.
fn requested_color(args: &[OsString]) -> ColorMode {
    let mut mode = ColorMode::Auto;
    let mut iter = args.iter().skip(1).filter_map(|a| a.to_str());
    while let Some(arg) = iter.next() {
        let value = match arg {
            "--" => break,
            "--color" => iter.next(),
            _ => arg.strip_prefix("--color="),
        };
        if let Some(parsed) = value.and_then(|v| ColorMode::from_str(v, true).ok()) {
            mode = parsed;
        }
    }
    mode
}

/// Regular expression dialect names accepted on the command line
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum RegexType {
    Grep,
    Egrep,
    #[default]
    Ecma,
    /// Basic POSIX
    Posix,
    /// Extended POSIX
    Eposix,
}

impl From<RegexType> for PatternSyntax {
    fn from(value: RegexType) -> Self {
        match value {
            RegexType::Grep => PatternSyntax::Grep,
            RegexType::Egrep => PatternSyntax::Egrep,
            RegexType::Ecma => PatternSyntax::Ecma,
            RegexType::Posix => PatternSyntax::BasicPosix,
            RegexType::Eposix => PatternSyntax::ExtendedPosix,
        }
    }
}

fn parse_type_mask(s: &str) -> Result<TypeMask, String> {
    s.parse().map_err(|e: recurse::Error| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "recurse")]
#[command(about = "Recursive Filesystem Scanner")]
#[command(version)]
#[command(after_help = "Example: recurse /bin . -c -n -i 'File %0% is %2% bytes big.'")]
struct Args {
    /// Files or directories to scan (default: current directory)
    paths: Vec<PathBuf>,

    /// Verbose error messages intended for debugging
    #[arg(short, long)]
    verbose: bool,

    /// Maximum search depth [default: infinite]
    #[arg(short, long, value_name = "N")]
    depth: Option<usize>,

    /// The types of files to scan for, e.g. "sf" for regular files and symlinks
    ///
    /// f regular, s symlink, d directory, b block device, i fifo,
    /// k socket, c character device, a all
    #[arg(
        short = 't',
        long = "type",
        value_name = "MASK",
        default_value = "f",
        value_parser = parse_type_mask
    )]
    type_mask: TypeMask,

    /// Make all root paths absolute (canonical)
    #[arg(short, long)]
    canonical: bool,

    /// Append a newline after each output instead of a space
    #[arg(short, long)]
    newline: bool,

    /// A regular expression to filter paths
    #[arg(short, long, value_name = "RE")]
    regex: Option<String>,

    /// The regular expression dialect
    #[arg(long = "regex-type", visible_alias = "rt", value_name = "TYPE", default_value = "ecma")]
    regex_type: RegexType,

    /// Match the whole path instead of searching for a matching fragment
    #[arg(short = 'm', long = "regex-match", visible_alias = "rm")]
    regex_match: bool,

    /// Format the output using string interpolation
    ///
    /// %% percent sign, %0% path, %1% file type, %2% size in bytes,
    /// %3% last access, %4% last modification, %5% last status change,
    /// %6% permissions, %7% depth
    #[arg(short, long, value_name = "TEMPLATE")]
    interpolate: Option<String>,

    /// Control color of diagnostics: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Show the license
    #[arg(long)]
    license: bool,
}

impl Args {
    fn scan_config(&self) -> ScanConfig {
        let mode = if self.regex_match {
            MatchMode::Exact
        } else {
            MatchMode::Search
        };
        ScanConfig {
            max_depth: self.depth,
            type_mask: self.type_mask,
            canonicalize: self.canonical,
            line_terminator: if self.newline {
                LineTerminator::Newline
            } else {
                LineTerminator::Space
            },
            pattern: self.regex.as_ref().map(|source| {
                PatternConfig::new(source.clone())
                    .with_mode(mode)
                    .with_syntax(self.regex_type.into())
            }),
            template: self.interpolate.clone(),
        }
    }
}

fn main() {
    let raw_args: Vec<OsString> = std::env::args_os().collect();
    let args = Args::command()
        .try_get_matches_from(&raw_args)
        .and_then(|matches| Args::from_arg_matches(&matches));
    let args = match args {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let color = color_choice(requested_color(&raw_args));
            let mut diag = Diagnostics::stderr(color, Level::Warning);
            diag.error(format_args!("argument parsing error: {}", e.to_string().trim_end()));
            process::exit(1);
        }
    };

    if args.license {
        print!("{LICENSE}");
        return;
    }

    let threshold = if args.verbose {
        Level::Debug
    } else {
        Level::Warning
    };
    let mut diag = Diagnostics::stderr(color_choice(args.color), threshold);
    let config = args.scan_config();
    diag.debug(format_args!("{config:?}"));

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    match recurse::run(&config, &args.paths, out, &mut diag) {
        Ok(summary) => diag.debug(format_args!(
            "done: {} roots, {} visited, {} emitted",
            summary.roots, summary.visited, summary.emitted
        )),
        Err(e) => {
            diag.report(&e);
            process::exit(1);
        }
    }
}
