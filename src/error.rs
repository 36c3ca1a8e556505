use thiserror::Error;

pub type Result<T> = std::result::Result<T, WzError>;

#[derive(Debug, Error)]
pub enum WzError {
    #[error("Malformed header: expected magic {expected:X?}, found {found:X?}")]
    MalformedHeader { expected: [u8; 4], found: [u8; 4] },
    #[error(
        "Version mismatch: version {version} expects header {expected:#06X}, \
         found {found:#06X}"
    )]
    VersionMismatch {
        version: u32,
        expected: u16,
        found: u16,
    },
    #[error(
        "Out of bounds read of {size} bytes at {offset:#X} \
         (buffer length {len:#X})"
    )]
    OutOfBounds {
        offset: usize,
        size: usize,
        len: usize,
    },
    #[error("Unknown {kind} tag: {tag}")]
    UnknownTag { kind: TagKind, tag: String },
    #[error("Unsupported {kind} variant: {value}")]
    UnsupportedVariant { kind: &'static str, value: i64 },
    #[error("Structural violation at {offset:#X}: {message}")]
    StructuralViolation { offset: usize, message: String },
}

/// Which tagged field an [`WzError::UnknownTag`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    DirectoryEntry,
    StringBlock,
    ListItem,
    PropertyType,
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DirectoryEntry => "directory entry",
            Self::StringBlock => "string block",
            Self::ListItem => "list item",
            Self::PropertyType => "property type",
        })
    }
}

impl WzError {
    pub(crate) fn unknown_tag(kind: TagKind, tag: impl ToString) -> Self {
        Self::UnknownTag {
            kind,
            tag: tag.to_string(),
        }
    }

    pub(crate) fn structural(
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::StructuralViolation {
            offset,
            message: message.into(),
        }
    }
}
