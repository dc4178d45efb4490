//! Course categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The category a course belongs to. Selects the intro page layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseCategory {
    /// Delivery pipelines, containers and infrastructure.
    DevOps,
    /// Linux administration and the shell.
    Linux,
    /// Version control with Git.
    Git,
    /// Anything else.
    General,
}

impl CourseCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 4] = [Self::DevOps, Self::Linux, Self::Git, Self::General];

    /// Classify a course by keywords in its slug.
    ///
    /// Used for catalog entries that predate explicit categories.
    #[must_use]
    pub fn infer(slug: &str) -> Self {
        let words: Vec<&str> = slug.split('-').collect();
        if words.contains(&"devops") {
            Self::DevOps
        } else if words.contains(&"linux") {
            Self::Linux
        } else if words.contains(&"git") {
            Self::Git
        } else {
            Self::General
        }
    }

    /// Stable identifier used in storage and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DevOps => "dev_ops",
            Self::Linux => "linux",
            Self::Git => "git",
            Self::General => "general",
        }
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CourseCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev_ops" | "devops" => Ok(Self::DevOps),
            "linux" => Ok(Self::Linux),
            "git" => Ok(Self::Git),
            "general" => Ok(Self::General),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}
