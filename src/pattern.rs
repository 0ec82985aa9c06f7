use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};

use crate::error::SiftError;

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A compiled name, path or content pattern.
///
/// Input delimited as `~body~flags` or `/body/flags` compiles as a regular
/// expression (flags: `i`, `m`, `s`, `x`); anything else compiles as a shell
/// glob for names and paths, or as a literal substring for file contents.
#[derive(Debug, Clone)]
pub struct Pattern(Matcher);

#[derive(Debug, Clone)]
enum Matcher {
    Glob(GlobMatcher),
    Regex(Regex),
}

impl Pattern {
    /// Compile a pattern matched against an entry's base file name.
    pub fn name(input: &str) -> Result<Self, SiftError> {
        match split_delimited(input) {
            Some((body, flags)) => build_regex(input, body, flags).map(Self::from_regex),
            None => build_glob(input).map(Self::from_glob),
        }
    }

    /// Compile a pattern matched against an entry's `/`-normalized path
    /// relative to its scan root.
    pub fn path(input: &str) -> Result<Self, SiftError> {
        Self::name(input)
    }

    /// Compile a pattern matched against a file's textual content. Plain
    /// input is a literal substring.
    pub fn content(input: &str) -> Result<Self, SiftError> {
        match split_delimited(input) {
            Some((body, flags)) => build_regex(input, body, flags).map(Self::from_regex),
            None => Regex::new(&regex::escape(input))
                .map(Self::from_regex)
                .map_err(|e| SiftError::parse(input, e.to_string())),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.0 {
            Matcher::Glob(g) => g.is_match(text),
            Matcher::Regex(r) => r.is_match(text),
        }
    }

    fn from_glob(glob: GlobMatcher) -> Self {
        Self(Matcher::Glob(glob))
    }

    fn from_regex(regex: Regex) -> Self {
        Self(Matcher::Regex(regex))
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Split `~body~flags` / `/body/flags` into body and flags, or return `None`
/// when the input is not delimited (a leading `/` with no valid trailing
/// flags reads as a plain glob, so absolute-looking paths stay globs).
fn split_delimited(input: &str) -> Option<(&str, &str)> {
    let delim = input.chars().next().filter(|c| *c == '~' || *c == '/')?;
    let close = input.rfind(delim)?;
    if close == 0 {
        return None;
    }
    let flags = &input[close + 1..];
    if !flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'u')) {
        return None;
    }
    Some((&input[1..close], flags))
}

fn build_regex(input: &str, body: &str, flags: &str) -> Result<Regex, SiftError> {
    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            // Unicode is the regex crate's default.
            'u' => &mut builder,
            // `split_delimited` only admits the flags handled above.
            _ => unreachable!(),
        };
    }
    builder
        .build()
        .map_err(|e| SiftError::parse(input, e.to_string()))
}

fn build_glob(input: &str) -> Result<GlobMatcher, SiftError> {
    GlobBuilder::new(input)
        .literal_separator(false)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| SiftError::parse(input, e.to_string()))
}
