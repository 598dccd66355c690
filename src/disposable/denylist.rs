use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use super::DenylistError;
use crate::validator::is_valid_domain;

const EMBEDDED_LIST: &str = include_str!("domains.txt");

/// Process-local list of disposable domains, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticDenylist {
    domains: HashSet<String>,
}

impl StaticDenylist {
    /// The list shipped with the crate.
    pub fn embedded() -> Self {
        Self::from_list_txt(EMBEDDED_LIST)
    }

    /// Parses a `list.txt` document: one domain per line, `#` comments and blank
    /// lines ignored, malformed entries skipped with a warning.
    pub fn from_list_txt(content: &str) -> Self {
        let mut domains = HashSet::new();
        let mut invalid = 0usize;

        for (index, line) in content.lines().enumerate() {
            let domain = line.trim();
            if domain.is_empty() || domain.starts_with('#') {
                continue;
            }
            let domain = domain.to_ascii_lowercase();
            if is_valid_domain(&domain) {
                domains.insert(domain);
            } else {
                invalid += 1;
                if invalid <= 10 {
                    warn!(line = index + 1, entry = %domain, "skipping malformed static list entry");
                }
            }
        }

        if invalid > 10 {
            warn!(skipped = invalid - 10, "more malformed static list entries");
        }

        Self { domains }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DenylistError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DenylistError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let list = Self::from_list_txt(&content);
        if list.is_empty() {
            return Err(DenylistError::Empty(path.display().to_string()));
        }
        info!(path = %path.display(), count = list.len(), "static disposable list loaded");
        Ok(list)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for StaticDenylist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            domains: iter
                .into_iter()
                .map(|d| d.into().to_ascii_lowercase())
                .collect(),
        }
    }
}
