use globset::{Glob, GlobMatcher};

/// One parsed gitignore-style pattern.
struct IgnorePattern {
    negated: bool,
    dir_only: bool,
    /// Matchers tried in order; first hit counts.
    matchers: Vec<GlobMatcher>,
    /// Bare basename patterns match the file name anywhere in the tree.
    basename: bool,
}

/// Ordered gitignore-style exclusion rules.
///
/// Matching follows the subset of gitignore semantics the scan relies on:
/// patterns are evaluated in file order, a trailing `/` restricts to
/// directories, a pattern without `/` matches by basename anywhere, other
/// patterns are tried both as written and with a `**/` prefix, and a `!`
/// pattern re-includes a previously ignored path and stops evaluation.
pub struct IgnoreRules {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreRules {
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Parse `.gitignore`-like text; comments and blanks are stripped,
    /// unparsable pattern lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut patterns = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(pattern) = Self::compile_line(line) {
                patterns.push(pattern);
            }
        }
        Self { patterns }
    }

    fn compile_line(line: &str) -> Option<IgnorePattern> {
        let (negated, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (dir_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let body = body.trim_start_matches('/');
        if body.is_empty() {
            return None;
        }

        let basename = !body.contains('/');
        let mut matchers = Vec::new();
        if basename {
            matchers.push(Glob::new(body).ok()?.compile_matcher());
        } else {
            matchers.push(Glob::new(body).ok()?.compile_matcher());
            if !body.starts_with("**/") {
                matchers.push(Glob::new(&format!("**/{body}")).ok()?.compile_matcher());
            }
        }

        Some(IgnorePattern {
            negated,
            dir_only,
            matchers,
            basename,
        })
    }

    /// Decide whether a workspace-relative path (with `/` separators) is
    /// ignored. The last matching pattern wins; a matching negation
    /// short-circuits as an explicit re-include.
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        let rel_path = rel_path.trim_matches('/');
        if rel_path.is_empty() {
            return false;
        }
        let basename = rel_path.rsplit('/').next().unwrap_or(rel_path);

        let mut ignored = false;
        for pattern in &self.patterns {
            if pattern.dir_only && !is_dir {
                continue;
            }
            let candidate = if pattern.basename { basename } else { rel_path };
            let hit = pattern.matchers.iter().any(|m| m.is_match(candidate));
            if !hit {
                continue;
            }
            if pattern.negated {
                if ignored {
                    return false;
                }
            } else {
                ignored = true;
            }
        }
        ignored
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::IgnoreRules;

    #[test]
    fn basename_patterns_match_anywhere() {
        let rules = IgnoreRules::parse("*.log\n");
        assert!(rules.is_ignored("debug.log", false));
        assert!(rules.is_ignored("deep/nested/trace.log", false));
        assert!(!rules.is_ignored("deep/nested/trace.ts", false));
    }

    #[test]
    fn pathful_patterns_also_match_with_tree_prefix() {
        let rules = IgnoreRules::parse("build/output\n");
        assert!(rules.is_ignored("build/output", false));
        assert!(rules.is_ignored("packages/app/build/output", false));
    }

    #[test]
    fn trailing_slash_restricts_to_directories() {
        let rules = IgnoreRules::parse("cache/\n");
        assert!(rules.is_ignored("cache", true));
        assert!(!rules.is_ignored("cache", false));
    }

    #[test]
    fn negation_reincludes_and_short_circuits() {
        let rules = IgnoreRules::parse("*.log\n!keep.log\n*.log\n");
        assert!(rules.is_ignored("debug.log", false));
        // The negation wins for keep.log even though a later pattern
        // would match again.
        assert!(!rules.is_ignored("logs/keep.log", false));
    }

    #[test]
    fn comments_and_blanks_are_stripped() {
        let rules = IgnoreRules::parse("# build junk\n\n  \ndist\n");
        assert!(rules.is_ignored("dist", true));
        assert!(!rules.is_ignored("src", true));
    }

    #[test]
    fn last_match_wins() {
        let rules = IgnoreRules::parse("!special.txt\nspecial.txt\n");
        // No prior ignore existed when the negation ran, so the later
        // ignore pattern decides.
        assert!(rules.is_ignored("special.txt", false));
    }
}
