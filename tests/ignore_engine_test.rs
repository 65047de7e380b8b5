/// Behavioural tests for the pattern compiler and match evaluator
#[cfg(test)]
mod precedence_tests {
    use filecollector::ignore::{compile_all, is_ignored, should_ignore};

    #[test]
    fn test_plain_name_matches_at_any_depth() {
        let rules = compile_all(["node_modules"]);

        assert!(is_ignored(&rules, "node_modules"));
        assert!(is_ignored(&rules, "src/node_modules"));
        assert!(is_ignored(&rules, "src/node_modules/index.js"));
        assert!(!is_ignored(&rules, "node_modules_backup"));
    }

    #[test]
    fn test_trailing_slash_is_directory_only() {
        let rules = compile_all(["build/"]);

        assert!(is_ignored(&rules, "build/"));
        assert!(is_ignored(&rules, "build/app.js"));
        assert!(is_ignored(&rules, "build/nested/deep.o"));
        // A flat file called `build` has no trailing directory marker.
        assert!(!is_ignored(&rules, "build"));
    }

    #[test]
    fn test_later_negation_reincludes_file() {
        let rules = compile_all(["*.log", "!important.log"]);

        assert!(!is_ignored(&rules, "important.log"));
        assert!(is_ignored(&rules, "debug.log"));
        assert!(is_ignored(&rules, "var/debug.log"));
    }

    #[test]
    fn test_excluded_directory_blocks_inner_negation() {
        let rules = compile_all(["logs/", "!logs/keep.txt"]);

        assert!(is_ignored(&rules, "logs/keep.txt"));
        assert!(is_ignored(&rules, "logs/other.txt"));
    }

    #[test]
    fn test_leading_double_star() {
        let rules = compile_all(["**/*.tmp"]);

        for path in ["a.tmp", "x/a.tmp", "x/y/a.tmp"] {
            assert!(is_ignored(&rules, path), "{path} should be ignored");
        }
        assert!(!is_ignored(&rules, "x/a.tmpl"));
    }

    #[test]
    fn test_rooted_double_star_spans_any_depth() {
        let rules = compile_all(["/**/generated", "!/**/generated/keep.rs"]);

        for path in ["generated", "src/generated", "a/b/generated/out.rs"] {
            assert!(is_ignored(&rules, path), "{path} should be ignored");
        }
        assert!(!is_ignored(&rules, "src/generated_code.rs"));
        // The directory itself stays excluded, so its negation cannot re-include.
        assert!(is_ignored(&rules, "src/generated/keep.rs"));
    }

    #[test]
    fn test_middle_double_star() {
        let rules = compile_all(["a/**/b"]);

        for path in ["a/b", "a/x/b", "a/x/y/b"] {
            assert!(is_ignored(&rules, path), "{path} should be ignored");
        }
        assert!(!is_ignored(&rules, "ab"));
        assert!(!is_ignored(&rules, "c/a/b"));
    }

    #[test]
    fn test_trailing_double_star_includes_directory_itself() {
        let rules = compile_all(["abc/**"]);

        assert!(is_ignored(&rules, "abc"));
        assert!(is_ignored(&rules, "abc/x/y"));
        assert!(!is_ignored(&rules, "abcd"));
    }

    #[test]
    fn test_blank_and_comment_lines_have_no_effect() {
        let base = ["*.log", "!important.log"];
        let padded = ["", "# header", "*.log", "   ", "#!important.log", "!important.log", "#"];
        let paths = ["important.log", "debug.log", "src/main.rs", "logs/"];

        assert_eq!(compile_all(padded).len(), compile_all(base).len());
        for path in paths {
            assert_eq!(should_ignore(&base, path), should_ignore(&padded, path));
        }
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let raw = ["target/", "**/*.bak", "!keep.bak", "docs/**/draft?", "\\#literal"];
        let first = compile_all(raw);
        let second = compile_all(raw);

        for path in [
            "target/",
            "target/debug/app",
            "x/y.bak",
            "keep.bak",
            "docs/a/b/draft1",
            "#literal",
            "src/lib.rs",
        ] {
            assert_eq!(is_ignored(&first, path), is_ignored(&second, path), "{path}");
        }
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.matcher().as_str(), b.matcher().as_str());
        }
    }
}

#[cfg(test)]
mod rule_set_tests {
    use filecollector::IgnoreRules;
    use std::path::Path;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_gitignore_file_content() {
        let rules = IgnoreRules::parse(
            "# Rust\n/target\n**/*.rs.bk\n\n# Editors\n.idea/\n*.sw?\n\n# Keep docs build\ndocs/_build/\n",
        );

        assert!(rules.is_ignored("target/debug/app"));
        assert!(!rules.is_ignored("crates/core/target/debug/app"));
        assert!(rules.is_ignored("src/lib.rs.bk"));
        assert!(rules.is_ignored_path(Path::new(".idea"), true));
        assert!(rules.is_ignored("notes.swp"));
        assert!(rules.is_ignored_path(Path::new("docs/_build"), true));
        assert!(!rules.is_ignored("docs/index.md"));
    }

    #[test]
    fn test_shared_rules_answer_identically_across_threads() {
        let rules = Arc::new(IgnoreRules::parse("*.log\n!important.log\nlogs/"));
        let paths = ["debug.log", "important.log", "logs/important.log", "src/a.rs"];
        let expected: Vec<bool> = paths.iter().map(|p| rules.is_ignored(p)).collect();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rules = Arc::clone(&rules);
                thread::spawn(move || paths.iter().map(|p| rules.is_ignored(p)).collect::<Vec<_>>())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert_eq!(expected, vec![true, false, true, false]);
    }
}
