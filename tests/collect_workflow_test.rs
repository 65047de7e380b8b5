/// End-to-end tests: stored patterns drive a scan, selected files are composed
#[cfg(test)]
mod workflow_tests {
    use filecollector::composer::{compose, read_files};
    use filecollector::store::{PatternStore, PromptStore};
    use filecollector::walker::{flatten_files, scan_tree, search_files};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("Failed to create dir");
        fs::write(path, content).expect("Failed to write file");
    }

    fn project() -> tempfile::TempDir {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        write(root, "src/main.rs", "fn main() {}");
        write(root, "src/util.rs", "pub fn helper() {}");
        write(root, "target/debug/app", "binary");
        write(root, "node_modules/left-pad/index.js", "module.exports = 1;");
        write(root, "logs/keep.txt", "keep me?");
        write(root, "app.log", "noise");
        write(root, "important.log", "signal");
        dir
    }

    #[test]
    fn test_stored_patterns_filter_scan() {
        let project = project();
        let config = tempdir().expect("Failed to create temp dir");
        let mut store = PatternStore::open(config.path().join("gitignores.json")).unwrap();
        let added = store
            .import_gitignore("target/\nnode_modules\n*.log\n!important.log\nlogs/\n!logs/keep.txt\n")
            .unwrap();
        assert_eq!(added, 6);

        let tree = scan_tree(project.path(), &store.rules()).unwrap();
        let files: Vec<String> = flatten_files(&tree).into_iter().map(|f| f.relative).collect();

        assert_eq!(files, vec!["important.log", "src/main.rs", "src/util.rs"]);
    }

    #[test]
    fn test_compose_selected_files() {
        let project = project();
        let config = tempdir().expect("Failed to create temp dir");
        let mut store = PatternStore::open(config.path().join("gitignores.json")).unwrap();
        store.add("*.log").unwrap();
        store.add("target/").unwrap();
        store.add("node_modules").unwrap();
        store.add("logs/").unwrap();

        let tree = scan_tree(project.path(), &store.rules()).unwrap();
        let paths: Vec<_> = flatten_files(&tree).into_iter().map(|f| f.path).collect();
        let files = read_files(&paths);
        let prompt = compose(&files, "You are a reviewer.", "Find bugs.");

        assert!(prompt.starts_with("SYSTEM PROMPT:\n\nYou are a reviewer."));
        assert!(prompt.contains("```rs\nfn main() {}\n```"));
        assert!(prompt.contains("```rs\npub fn helper() {}\n```"));
        assert!(prompt.ends_with("USER PROMPT:\n\nFind bugs."));
        assert!(!prompt.contains("noise"));
        assert!(!prompt.contains("binary"));
        assert!(!prompt.contains("keep me?"));
    }

    #[test]
    fn test_edits_take_effect_on_next_scan() {
        let project = project();
        let config = tempdir().expect("Failed to create temp dir");
        let mut store = PatternStore::open(config.path().join("gitignores.json")).unwrap();
        store.add("src/").unwrap();

        let before = flatten_files(&scan_tree(project.path(), &store.rules()).unwrap());
        assert!(before.iter().all(|f| !f.relative.starts_with("src/")));

        store.remove(0).unwrap();
        let after = flatten_files(&scan_tree(project.path(), &store.rules()).unwrap());
        assert!(after.iter().any(|f| f.relative == "src/main.rs"));
    }

    #[test]
    fn test_saved_prompt_drives_composition() {
        let project = project();
        let config = tempdir().expect("Failed to create temp dir");
        let prompts_path = config.path().join("system_prompts.json");
        let mut prompts = PromptStore::open(&prompts_path).unwrap();
        let saved = prompts.add("reviewer", "You are a strict reviewer.").unwrap().unwrap();

        // A second handle sees what the first one persisted.
        let reopened = PromptStore::open(&prompts_path).unwrap();
        let by_name = reopened.find("reviewer").unwrap();
        assert_eq!(by_name.id, saved.id);

        let mut store = PatternStore::open(config.path().join("gitignores.json")).unwrap();
        store.import_gitignore("target/\nnode_modules\n*.log\nlogs/\n").unwrap();
        let files = flatten_files(&scan_tree(project.path(), &store.rules()).unwrap());
        let selected: Vec<_> = search_files(&files, "UTIL")
            .into_iter()
            .map(|f| f.path.clone())
            .collect();
        assert_eq!(selected.len(), 1);

        let prompt = compose(&read_files(&selected), &by_name.content, "");
        assert!(prompt.starts_with("SYSTEM PROMPT:\n\nYou are a strict reviewer."));
        assert!(prompt.contains("pub fn helper() {}"));
        assert!(!prompt.contains("fn main() {}"));
    }
}
