// ABOUTME: Directory walking with .gitignore semantics for copy_dir.
// ABOUTME: Nested ignore files, negation, anchored and directory-only patterns.

use globset::{GlobBuilder, GlobMatcher};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const GITIGNORE: &str = ".gitignore";

#[derive(Debug, Clone)]
struct Rule {
    matcher: GlobMatcher,
    negated: bool,
    dir_only: bool,
}

/// Rules from one `.gitignore`, relative to the directory holding it.
#[derive(Debug, Clone)]
struct IgnoreFile {
    base: PathBuf,
    rules: Vec<Rule>,
}

/// Accumulated ignore rules for a walk. Later (deeper) files take precedence.
#[derive(Debug, Clone, Default)]
pub struct GitIgnore {
    files: Vec<IgnoreFile>,
}

impl GitIgnore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the rules of a `.gitignore` located in `base` (relative to the walk root).
    pub fn add(&mut self, base: impl Into<PathBuf>, content: &str) {
        let rules: Vec<Rule> = content.lines().filter_map(parse_line).collect();
        if !rules.is_empty() {
            self.files.push(IgnoreFile {
                base: base.into(),
                rules,
            });
        }
    }

    /// Whether `path` (relative to the walk root) is excluded.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let mut ignored = false;
        for file in &self.files {
            let Ok(rel) = path.strip_prefix(&file.base) else {
                continue;
            };
            if rel.as_os_str().is_empty() {
                continue;
            }
            for rule in &file.rules {
                if rule.dir_only && !is_dir {
                    continue;
                }
                if rule.matcher.is_match(rel) {
                    ignored = !rule.negated;
                }
            }
        }
        ignored
    }
}

fn parse_line(line: &str) -> Option<Rule> {
    let line = line.trim_end_matches(['\r', ' ', '\t']);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negated, pattern) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line.strip_prefix('\\').unwrap_or(line)),
    };

    let (dir_only, pattern) = match pattern.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, pattern),
    };
    if pattern.is_empty() {
        return None;
    }

    let glob = if pattern.contains('/') {
        pattern.trim_start_matches('/').to_string()
    } else {
        format!("**/{}", pattern)
    };

    let matcher = GlobBuilder::new(&glob)
        .literal_separator(true)
        .build()
        .map_err(|e| tracing::debug!(pattern = line, "skipping invalid ignore pattern: {}", e))
        .ok()?
        .compile_matcher();

    Some(Rule {
        matcher,
        negated,
        dir_only,
    })
}

/// List the files under `src` to copy, as paths relative to `src`.
///
/// `.git` is always skipped. With `use_gitignore`, every `.gitignore` met
/// during the walk applies to its directory and below.
pub fn collect_files(src: &Path, use_gitignore: bool) -> io::Result<Vec<PathBuf>> {
    let mut ignore = GitIgnore::new();
    let mut files = Vec::new();
    let mut walker = WalkDir::new(src).follow_links(false).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(io::Error::other)?;
        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        let is_dir = entry.file_type().is_dir();

        if !rel.as_os_str().is_empty() {
            if entry.file_name() == ".git" {
                if is_dir {
                    walker.skip_current_dir();
                }
                continue;
            }
            if use_gitignore && ignore.is_ignored(&rel, is_dir) {
                if is_dir {
                    walker.skip_current_dir();
                }
                continue;
            }
        }

        if is_dir {
            if use_gitignore {
                let path = entry.path().join(GITIGNORE);
                if path.is_file() {
                    ignore.add(rel, &std::fs::read_to_string(&path)?);
                }
            }
            continue;
        }

        files.push(rel);
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn names(files: Vec<PathBuf>) -> Vec<String> {
        files
            .into_iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn unanchored_patterns_match_at_any_depth() {
        let mut ignore = GitIgnore::new();
        ignore.add("", "*.log\nbuild/\n");
        assert!(ignore.is_ignored(Path::new("a.log"), false));
        assert!(ignore.is_ignored(Path::new("deep/dir/a.log"), false));
        assert!(ignore.is_ignored(Path::new("src/build"), true));
        assert!(!ignore.is_ignored(Path::new("src/build"), false));
        assert!(!ignore.is_ignored(Path::new("main.rs"), false));
    }

    #[test]
    fn anchored_patterns_match_from_base() {
        let mut ignore = GitIgnore::new();
        ignore.add("", "/target\ndocs/*.html\n");
        assert!(ignore.is_ignored(Path::new("target"), true));
        assert!(!ignore.is_ignored(Path::new("sub/target"), true));
        assert!(ignore.is_ignored(Path::new("docs/index.html"), false));
        assert!(!ignore.is_ignored(Path::new("docs/api/index.html"), false));
    }

    #[test]
    fn negation_reincludes() {
        let mut ignore = GitIgnore::new();
        ignore.add("", "*.txt\n!keep.txt\n# comment\n\n");
        assert!(ignore.is_ignored(Path::new("drop.txt"), false));
        assert!(!ignore.is_ignored(Path::new("keep.txt"), false));
    }

    #[test]
    fn nested_files_apply_below_their_directory() {
        let mut ignore = GitIgnore::new();
        ignore.add("", "*.tmp\n");
        ignore.add("pkg", "!important.tmp\ngenerated.rs\n");
        assert!(ignore.is_ignored(Path::new("important.tmp"), false));
        assert!(!ignore.is_ignored(Path::new("pkg/important.tmp"), false));
        assert!(ignore.is_ignored(Path::new("pkg/generated.rs"), false));
        assert!(!ignore.is_ignored(Path::new("generated.rs"), false));
    }

    #[test]
    fn collect_skips_git_and_ignored_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, ".git/HEAD", "ref: refs/heads/main");
        write(root, ".gitignore", "target/\n*.log\n");
        write(root, "src/main.rs", "fn main() {}");
        write(root, "target/debug/app", "bin");
        write(root, "run.log", "log");
        write(root, "sub/.gitignore", "secret.txt\n");
        write(root, "sub/secret.txt", "x");
        write(root, "sub/public.txt", "y");

        let files = names(collect_files(root, true).unwrap());
        assert_eq!(
            files,
            vec![".gitignore", "src/main.rs", "sub/.gitignore", "sub/public.txt"]
        );
    }

    #[test]
    fn collect_without_gitignore_still_skips_git() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, ".git/config", "");
        write(root, ".gitignore", "*.log\n");
        write(root, "run.log", "log");

        let files = names(collect_files(root, false).unwrap());
        assert_eq!(files, vec![".gitignore", "run.log"]);
    }
}
