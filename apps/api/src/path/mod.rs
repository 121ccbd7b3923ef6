//! Path resolver: string addresses into a resume document.
//!
//! # Grammar
//! `segment ('.' segment)*`, where a segment is either
//! - a field name followed by zero or more `[index]` suffixes (`items[0]`), or
//! - a bare run of ASCII digits, read as an index (`languages.0.proficiency`).
//!
//! A leading root alias (`resumeData.`) is stripped before parsing, so
//! `resumeData.personalInfo.fullName` and `personalInfo.fullName` are the same path.
//!
//! Paths are parsed once into an immutable [`Path`] and then walked against the
//! typed document through the [`Node`] accessor trait. Reading never fails:
//! anything that does not exist resolves to `None`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod node;

pub use node::{Edit, Node, NodeFault};

/// Prefixes some callers put in front of document paths.
pub const ROOT_ALIASES: &[&str] = &["resumeData"];

/// One step of a path walk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Field(Arc<str>),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Parse failures. Paths are built by trusted code, so every one of these is a bug
/// at the call site rather than bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("empty segment at position {position} in '{path}'")]
    EmptySegment { path: String, position: usize },

    #[error("unclosed '[' in '{path}'")]
    UnclosedBracket { path: String },

    #[error("invalid index '{index}' in '{path}'")]
    InvalidIndex { path: String, index: String },

    #[error("unexpected '{found}' after an index in '{path}'")]
    TrailingCharacters { path: String, found: char },

    #[error("stray ']' in field name '{name}' of '{path}'")]
    StrayBracket { path: String, name: String },

    #[error("root alias '{alias}' is not followed by a path")]
    BareAlias { alias: String },
}

/// A parsed document address. Cheap to clone; child paths share nothing mutable.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Arc<[Segment]>,
}

impl Path {
    /// The document root. Never produced by [`Path::parse`]; used as the base of
    /// editing scopes.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = strip_alias(raw.trim())?;
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, part) in trimmed.split('.').enumerate() {
            parse_segment(raw, position, part, &mut segments)?;
        }

        Ok(Self {
            segments: segments.into(),
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns `self` extended by a field segment.
    pub fn field(&self, name: &str) -> Self {
        self.push(Segment::Field(Arc::from(name)))
    }

    /// Returns `self` extended by an index segment.
    pub fn index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    /// Returns `self` extended by every segment of `tail`.
    pub fn join(&self, tail: &Path) -> Self {
        let mut segments = self.segments.to_vec();
        segments.extend(tail.segments.iter().cloned());
        Self {
            segments: segments.into(),
        }
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self {
            segments: segments.into(),
        }
    }
}

fn strip_alias(raw: &str) -> Result<&str, PathError> {
    for alias in ROOT_ALIASES {
        if raw == *alias {
            return Err(PathError::BareAlias {
                alias: (*alias).to_string(),
            });
        }
        if let Some(rest) = raw.strip_prefix(alias).and_then(|r| r.strip_prefix('.')) {
            return Ok(rest);
        }
    }
    Ok(raw)
}

fn parse_segment(
    raw: &str,
    position: usize,
    part: &str,
    out: &mut Vec<Segment>,
) -> Result<(), PathError> {
    if part.is_empty() {
        return Err(PathError::EmptySegment {
            path: raw.to_string(),
            position,
        });
    }

    if part.bytes().all(|b| b.is_ascii_digit()) {
        out.push(Segment::Index(parse_index(raw, part)?));
        return Ok(());
    }

    let (name, mut rest) = match part.find('[') {
        Some(open) => part.split_at(open),
        None => (part, ""),
    };
    if name.is_empty() {
        return Err(PathError::EmptySegment {
            path: raw.to_string(),
            position,
        });
    }
    if name.contains(']') {
        return Err(PathError::StrayBracket {
            path: raw.to_string(),
            name: name.to_string(),
        });
    }
    out.push(Segment::Field(Arc::from(name)));

    while let Some(found) = rest.chars().next() {
        if found != '[' {
            return Err(PathError::TrailingCharacters {
                path: raw.to_string(),
                found,
            });
        }
        let close = rest.find(']').ok_or_else(|| PathError::UnclosedBracket {
            path: raw.to_string(),
        })?;
        out.push(Segment::Index(parse_index(raw, &rest[1..close])?));
        rest = &rest[close + 1..];
    }

    Ok(())
}

fn parse_index(raw: &str, text: &str) -> Result<usize, PathError> {
    let invalid = || PathError::InvalidIndex {
        path: raw.to_string(),
        index: text.to_string(),
    };
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    text.parse::<usize>().map_err(|_| invalid())
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i > 0 => write!(f, ".{name}")?,
                other => write!(f, "{other}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Path::parse(&value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

impl Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Path::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Reads the value at `path`. `None` means "render nothing / use a placeholder".
pub fn resolve<N: Node>(root: &N, path: &Path) -> Option<Value> {
    root.lookup(path.segments())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Segment {
        Segment::Field(Arc::from(name))
    }

    #[test]
    fn test_parse_dotted_fields() {
        let path = Path::parse("personalInfo.fullName").unwrap();
        assert_eq!(path.segments(), &[field("personalInfo"), field("fullName")]);
    }

    #[test]
    fn test_parse_bracket_indices() {
        let path = Path::parse("dynamicSections[2].data.items[0].name").unwrap();
        assert_eq!(
            path.segments(),
            &[
                field("dynamicSections"),
                Segment::Index(2),
                field("data"),
                field("items"),
                Segment::Index(0),
                field("name"),
            ]
        );
    }

    #[test]
    fn test_parse_numeric_dot_segment_is_index() {
        let path = Path::parse("languages.0.proficiency").unwrap();
        assert_eq!(
            path.segments(),
            &[field("languages"), Segment::Index(0), field("proficiency")]
        );
    }

    #[test]
    fn test_parse_repeated_brackets() {
        let path = Path::parse("grid[1][3]").unwrap();
        assert_eq!(
            path.segments(),
            &[field("grid"), Segment::Index(1), Segment::Index(3)]
        );
    }

    #[test]
    fn test_root_alias_is_stripped() {
        let aliased = Path::parse("resumeData.personalInfo.email").unwrap();
        let plain = Path::parse("personalInfo.email").unwrap();
        assert_eq!(aliased, plain);
    }

    #[test]
    fn test_bare_alias_rejected() {
        assert_eq!(
            Path::parse("resumeData"),
            Err(PathError::BareAlias {
                alias: "resumeData".to_string()
            })
        );
    }

    #[test]
    fn test_alias_prefix_must_end_at_dot() {
        let path = Path::parse("resumeDataExtra.title").unwrap();
        assert_eq!(path.segments()[0], field("resumeDataExtra"));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
        assert_eq!(Path::parse("   "), Err(PathError::Empty));
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(matches!(
            Path::parse("personalInfo..fullName"),
            Err(PathError::EmptySegment { position: 1, .. })
        ));
        assert!(matches!(
            Path::parse("skills.[0]"),
            Err(PathError::EmptySegment { position: 1, .. })
        ));
    }

    #[test]
    fn test_unclosed_bracket_rejected() {
        assert!(matches!(
            Path::parse("skills[0"),
            Err(PathError::UnclosedBracket { .. })
        ));
    }

    #[test]
    fn test_non_integer_index_rejected() {
        assert!(matches!(
            Path::parse("skills[-1]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            Path::parse("skills[]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            Path::parse("skills[one]"),
            Err(PathError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_trailing_characters_rejected() {
        assert!(matches!(
            Path::parse("skills[0]name"),
            Err(PathError::TrailingCharacters { found: 'n', .. })
        ));
    }

    #[test]
    fn test_stray_close_bracket_rejected() {
        assert!(matches!(
            Path::parse("skills]0"),
            Err(PathError::StrayBracket { .. })
        ));
    }

    #[test]
    fn test_display_is_canonical() {
        let path = Path::parse("resumeData.experience.1.bulletPoints[0]").unwrap();
        assert_eq!(path.to_string(), "experience[1].bulletPoints[0]");
    }

    #[test]
    fn test_builders_extend_without_touching_base() {
        let base = Path::parse("dynamicSections[0]").unwrap();
        let child = base.field("data").field("items").index(3);
        assert_eq!(child.to_string(), "dynamicSections[0].data.items[3]");
        assert_eq!(base.to_string(), "dynamicSections[0]");
        assert!(Path::root().is_root());
        assert_eq!(Path::root().join(&base), base);
    }

    #[test]
    fn test_serde_uses_string_form() {
        let path: Path = serde_json::from_str("\"skills[2].name\"").unwrap();
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"skills[2].name\"");
        assert!(serde_json::from_str::<Path>("\"skills[\"").is_err());
    }
}
