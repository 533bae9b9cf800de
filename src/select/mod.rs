//! File selection by include/exclude glob patterns.
//!
//! A file is selected when it matches the include pattern and, if one is
//! configured, does not match the exclude pattern. Order is preserved and
//! duplicates are kept.
//!
//! Patterns follow shell-style glob rules: `*` and `?` stay inside one path
//! segment, `**` spans directories and `{a,b}` alternates. A pattern with no
//! `/` is tested against the file's base name as well as the full relative
//! path, so `*.js` selects `assets/app.js`.
//!
//! Wildcards never match a path segment that starts with `.`. A pattern
//! reaches dotfiles only when one of its own segments starts with a literal
//! `.`, e.g. `**/.well-known/*.json`.

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{CompressError, Result};

/// A compiled glob with base-name matching
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    matcher: GlobMatcher,
    match_base: bool,
    dot: bool,
}

impl GlobPattern {
    /// Compile a pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|source| CompressError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            source: pattern.to_string(),
            matcher: glob.compile_matcher(),
            match_base: !pattern.contains('/'),
            dot: pattern.split('/').any(|segment| segment.starts_with('.')),
        })
    }

    /// Pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check a relative path against the pattern
    pub fn is_match(&self, path: &str) -> bool {
        if (self.dot || !path.split('/').any(is_hidden)) && self.matcher.is_match(path) {
            return true;
        }
        if !self.match_base {
            return false;
        }
        Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| (self.dot || !is_hidden(name)) && self.matcher.is_match(name))
    }
}

fn is_hidden(segment: &str) -> bool {
    segment.starts_with('.') && segment != "."
}

/// Include/exclude filter over candidate paths
#[derive(Debug, Clone)]
pub struct FileSelector {
    include: GlobPattern,
    exclude: Option<GlobPattern>,
}

impl FileSelector {
    /// Compile include and optional exclude patterns
    pub fn new(include: &str, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: GlobPattern::new(include)?,
            exclude: exclude.map(GlobPattern::new).transpose()?,
        })
    }

    /// Include pattern
    pub fn include(&self) -> &GlobPattern {
        &self.include
    }

    /// Exclude pattern, if any
    pub fn exclude(&self) -> Option<&GlobPattern> {
        self.exclude.as_ref()
    }

    /// Check a single path
    pub fn is_selected(&self, path: &str) -> bool {
        self.include.is_match(path) && !self.exclude.as_ref().is_some_and(|ex| ex.is_match(path))
    }

    /// Filter `files`, keeping their order
    pub fn select<S: AsRef<str>>(&self, files: &[S]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| self.is_selected(f))
            .map(str::to_string)
            .collect()
    }
}
