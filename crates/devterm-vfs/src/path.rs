//! Absolute paths and path resolution.

use std::fmt;

use devterm_types::error::FsError;

/// A normalized, `/`-rooted path: non-empty segments with no `.` or `..`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbsolutePath {
    segments: Vec<String>,
}

impl AbsolutePath {
    /// The root directory `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an absolute path string (relative input is taken from root).
    pub fn parse(input: &str) -> Self {
        resolve(input, &Self::root())
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent directory; root is its own parent.
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Append a single validated name.
    pub fn join(&self, name: &str) -> Result<Self, FsError> {
        validate_name(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

/// Resolve `input` against `cwd`.
///
/// Absolute input ignores `cwd`. Empty segments and `.` are dropped, `..`
/// pops one segment and is a no-op at root. Never fails: existence is the
/// tree's concern.
pub fn resolve(input: &str, cwd: &AbsolutePath) -> AbsolutePath {
    let mut segments: Vec<String> = if input.starts_with('/') {
        Vec::new()
    } else {
        cwd.segments.clone()
    };
    for part in input.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other.to_string()),
        }
    }
    AbsolutePath { segments }
}

/// Check that `name` can be used as a single directory entry name.
pub fn validate_name(name: &str) -> Result<(), FsError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(FsError::InvalidName(name.to_string()));
    }
    Ok(())
}
