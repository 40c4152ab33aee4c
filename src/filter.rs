//! Eligibility checks for discovered files.

use crate::candidate::FileCandidate;
use crate::job::SortJob;
use glob::Pattern;
use std::collections::HashSet;

/// Returns true when `candidate` passes the extension allow-list.
///
/// An empty set admits every file. Otherwise the candidate's lowercase
/// extension (with the dot) must be a member.
pub fn should_process(candidate: &FileCandidate, extensions: &HashSet<String>) -> bool {
    extensions.is_empty() || extensions.contains(&candidate.extension)
}

/// Allow-list plus optional exclude globs, compiled once per run.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
}

impl PathFilter {
    pub fn new(extensions: HashSet<String>, exclude_patterns: Vec<Pattern>) -> Self {
        Self {
            extensions,
            exclude_patterns,
        }
    }

    pub fn from_job(job: &SortJob) -> Self {
        Self::new(job.extensions.clone(), job.exclude_patterns.clone())
    }

    /// Checks exclude patterns first, then the extension allow-list.
    pub fn should_process(&self, candidate: &FileCandidate) -> bool {
        !self.is_excluded(candidate) && should_process(candidate, &self.extensions)
    }

    /// Patterns are matched against the base name and against the full path.
    fn is_excluded(&self, candidate: &FileCandidate) -> bool {
        self.exclude_patterns.iter().any(|pattern| {
            pattern.matches(&candidate.name) || pattern.matches_path(&candidate.path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn candidate(path: &str) -> FileCandidate {
        let path = PathBuf::from(path);
        FileCandidate {
            name: path.file_name().unwrap().to_string_lossy().to_string(),
            extension: crate::candidate::extension_of(&path),
            path,
            size: 0,
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_set_admits_everything() {
        let empty = HashSet::new();
        assert!(should_process(&candidate("/s/a.pdf"), &empty));
        assert!(should_process(&candidate("/s/README"), &empty));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let extensions = set(&[".pdf", ".png"]);
        assert!(should_process(&candidate("/s/a.pdf"), &extensions));
        assert!(should_process(&candidate("/s/b.PNG"), &extensions));
        assert!(!should_process(&candidate("/s/c.txt"), &extensions));
        assert!(!should_process(&candidate("/s/README"), &extensions));
    }

    #[test]
    fn test_exclude_pattern_overrides_allow_list() {
        let filter = PathFilter::new(
            set(&[".pdf"]),
            vec![Pattern::new("draft_*").unwrap()],
        );
        assert!(filter.should_process(&candidate("/s/final.pdf")));
        assert!(!filter.should_process(&candidate("/s/draft_1.pdf")));
    }

    #[test]
    fn test_exclude_pattern_matches_full_path() {
        let filter = PathFilter::new(HashSet::new(), vec![Pattern::new("/s/cache/*").unwrap()]);
        assert!(!filter.should_process(&candidate("/s/cache/blob.bin")));
        assert!(filter.should_process(&candidate("/s/keep/blob.bin")));
    }
}
