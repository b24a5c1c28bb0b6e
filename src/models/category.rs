use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Bucket an unwanted file is counted under.
///
/// Either a literal lowercase extension such as `.rar`, or one of the two
/// synthetic buckets that group split-archive pieces regardless of their
/// trailing digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(CompactString);

impl CategoryKey {
    pub const NUMBERED: &'static str = "numbered";
    pub const RAR_PART: &'static str = "rar-part";

    pub fn numbered() -> Self {
        Self(CompactString::const_new(Self::NUMBERED))
    }

    pub fn rar_part() -> Self {
        Self(CompactString::const_new(Self::RAR_PART))
    }

    /// Key for a plain extension match. The input is lowercased and given a
    /// leading dot if it lacks one.
    pub fn extension(ext: &str) -> Self {
        let lower = ext.to_lowercase();
        if lower.starts_with('.') {
            Self(CompactString::from(lower))
        } else {
            let mut key = CompactString::with_capacity(lower.len() + 1);
            key.push('.');
            key.push_str(&lower);
            Self(key)
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Label shown in reports and the category table.
    pub fn display_name(&self) -> String {
        match self.as_str() {
            Self::NUMBERED => "Numbered files (.001, .002, etc.)".to_string(),
            Self::RAR_PART => "RAR parts (-.r08, -.r09, etc.)".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: u64,
    pub total_size_bytes: u64,
}

impl CategoryStats {
    pub fn add(&mut self, size: u64) {
        self.count += 1;
        self.total_size_bytes += size;
    }
}

/// Decision for a single file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Keep,
    Unwanted(CategoryKey),
}

impl Classification {
    pub fn is_unwanted(&self) -> bool {
        matches!(self, Classification::Unwanted(_))
    }

    pub fn category(&self) -> Option<&CategoryKey> {
        match self {
            Classification::Unwanted(key) => Some(key),
            Classification::Keep => None,
        }
    }
}
