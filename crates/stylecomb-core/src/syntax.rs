//! Stylesheet dialects

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a dialect name is not recognized
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown syntax '{0}'. Valid options: css, less, sass, scss")]
pub struct UnknownSyntax(pub String);

/// A supported stylesheet dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Syntax {
    Css,
    Less,
    /// Indentation-based dialect: no braces, newlines end declarations
    Sass,
    Scss,
}

impl Syntax {
    /// All dialects, in alphabetical order
    pub const ALL: &'static [Syntax] = &[Syntax::Css, Syntax::Less, Syntax::Sass, Syntax::Scss];

    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Css => "css",
            Syntax::Less => "less",
            Syntax::Sass => "sass",
            Syntax::Scss => "scss",
        }
    }

    /// Detect the dialect from a file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    /// Whether blocks are delimited by `{` and `}`
    pub fn uses_braces(&self) -> bool {
        !matches!(self, Syntax::Sass)
    }

    /// Whether `//` starts a comment running to the end of the line
    pub fn has_line_comments(&self) -> bool {
        !matches!(self, Syntax::Css)
    }
}

impl FromStr for Syntax {
    type Err = UnknownSyntax;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Syntax::Css),
            "less" => Ok(Syntax::Less),
            "sass" => Ok(Syntax::Sass),
            "scss" => Ok(Syntax::Scss),
            _ => Err(UnknownSyntax(s.to_string())),
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("css".parse::<Syntax>(), Ok(Syntax::Css));
        assert_eq!("SCSS".parse::<Syntax>(), Ok(Syntax::Scss));
        assert_eq!("Less".parse::<Syntax>(), Ok(Syntax::Less));
        assert!("stylus".parse::<Syntax>().is_err());
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Syntax::from_extension(Path::new("a/b.sass")), Some(Syntax::Sass));
        assert_eq!(Syntax::from_extension(Path::new("theme.min.css")), Some(Syntax::Css));
        assert_eq!(Syntax::from_extension(Path::new("index.html")), None);
        assert_eq!(Syntax::from_extension(Path::new("Makefile")), None);
    }

    #[test]
    fn test_dialect_traits() {
        assert!(Syntax::Scss.uses_braces());
        assert!(!Syntax::Sass.uses_braces());
        assert!(!Syntax::Css.has_line_comments());
        assert!(Syntax::Less.has_line_comments());
    }
}
