use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filecollector::composer::{compose, estimate_tokens, read_files};
use filecollector::config::{Config, LOG_ENV, PATTERNS_ENV, PROMPTS_ENV};
use filecollector::ignore::normalize_path;
use filecollector::store::{PatternStore, PromptStore};
use filecollector::walker::{flatten_files, scan_tree, search_files, TreeNode};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Browse a directory through ignore rules and assemble file contents into a prompt
#[derive(Parser, Debug)]
#[command(name = "filecollector", version, about)]
struct Cli {
    /// Pattern store (JSON list of { "pattern": ... } records)
    #[arg(long, global = true, env = PATTERNS_ENV)]
    patterns: Option<PathBuf>,

    /// System prompt store (JSON list of { "id", "name", "content" } records)
    #[arg(long, global = true, env = PROMPTS_ENV)]
    prompts: Option<PathBuf>,

    /// Tracing filter directive
    #[arg(long, global = true, env = LOG_ENV)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether each path is ignored
    Check {
        /// Paths relative to the scan root
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Treat the paths as directories
        #[arg(long)]
        dir: bool,
    },
    /// Print the filtered directory tree
    Tree { root: PathBuf },
    /// List kept files whose path contains the query (case-insensitive)
    Search { root: PathBuf, query: String },
    /// Compose kept files into a single prompt on stdout
    Collect {
        root: PathBuf,
        /// File whose content becomes the system prompt
        #[arg(long, conflicts_with = "prompt")]
        system_prompt: Option<PathBuf>,
        /// Saved system prompt to use, by id or name
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long, default_value = "")]
        user_prompt: String,
        /// Restrict to these paths (relative to root)
        #[arg(long)]
        only: Vec<PathBuf>,
    },
    /// Manage the stored pattern list
    Patterns {
        #[command(subcommand)]
        action: PatternAction,
    },
    /// Manage saved system prompts
    Prompts {
        #[command(subcommand)]
        action: PromptAction,
    },
}

#[derive(Subcommand, Debug)]
enum PatternAction {
    List,
    Add { pattern: String },
    Edit { index: usize, pattern: String },
    Remove { index: usize },
    /// Append the patterns of a .gitignore file
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum PromptAction {
    List,
    Add { name: String, content: String },
    /// Change a prompt's name and/or content (by id or name)
    Edit {
        key: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Remove { key: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.patterns, cli.prompts, cli.log)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut store = PatternStore::open(&config.patterns_path).with_context(|| {
        format!("Cannot open pattern store {}", config.patterns_path.display())
    })?;

    match cli.command {
        Command::Check { paths, dir } => {
            let rules = store.rules();
            for path in paths {
                let verdict = if rules.is_ignored_path(&path, dir) { "ignored" } else { "kept" };
                println!("{verdict}\t{}", normalize_path(&path));
            }
        }
        Command::Tree { root } => {
            let tree = scan_tree(&root, &store.rules())
                .with_context(|| format!("Failed to scan {}", root.display()))?;
            print_tree(&tree, 0);
        }
        Command::Search { root, query } => {
            let tree = scan_tree(&root, &store.rules())
                .with_context(|| format!("Failed to scan {}", root.display()))?;
            let files = flatten_files(&tree);
            for file in search_files(&files, &query) {
                println!("{}", file.relative);
            }
        }
        Command::Collect {
            root,
            system_prompt,
            prompt,
            user_prompt,
            only,
        } => {
            let system = match (system_prompt, prompt) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Cannot read system prompt {}", path.display()))?,
                (None, Some(key)) => {
                    let prompts = open_prompts(&config)?;
                    let saved = prompts.find(&key).with_context(|| {
                        format!("No system prompt with id or name \"{key}\"")
                    })?;
                    saved.content.clone()
                }
                (None, None) => String::new(),
            };
            collect(&store, &root, &system, &user_prompt, &only)?
        }
        Command::Patterns { action } => run_pattern_action(&mut store, action)?,
        Command::Prompts { action } => run_prompt_action(&mut open_prompts(&config)?, action)?,
    }

    Ok(())
}

fn collect(
    store: &PatternStore,
    root: &Path,
    system_prompt: &str,
    user_prompt: &str,
    only: &[PathBuf],
) -> Result<()> {
    let tree = scan_tree(root, &store.rules())
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    let wanted: HashSet<String> = only.iter().map(|p| normalize_path(p)).collect();
    let paths: Vec<PathBuf> = flatten_files(&tree)
        .into_iter()
        .filter(|f| wanted.is_empty() || wanted.contains(&f.relative))
        .map(|f| f.path)
        .collect();

    let files = read_files(&paths);
    let output = compose(&files, system_prompt, user_prompt);
    tracing::info!(
        files = files.len(),
        tokens = estimate_tokens(&output),
        "composed prompt"
    );
    println!("{output}");
    Ok(())
}

fn run_pattern_action(store: &mut PatternStore, action: PatternAction) -> Result<()> {
    match action {
        PatternAction::List => {
            for (i, item) in store.items().iter().enumerate() {
                println!("{i}\t{}", item.pattern);
            }
        }
        PatternAction::Add { pattern } => {
            if store.add(&pattern)? {
                println!("added \"{}\"", pattern.trim());
            } else {
                println!("\"{}\" is already in the list", pattern.trim());
            }
        }
        PatternAction::Edit { index, pattern } => {
            store.update(index, &pattern)?;
            println!("updated pattern {index}");
        }
        PatternAction::Remove { index } => {
            let removed = store.remove(index)?;
            println!("removed \"{}\"", removed.pattern);
        }
        PatternAction::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Cannot read {}", file.display()))?;
            let added = store.import_gitignore(&content)?;
            println!("imported {added} pattern(s) from {}", file.display());
        }
    }
    Ok(())
}

fn open_prompts(config: &Config) -> Result<PromptStore> {
    PromptStore::open(&config.prompts_path).with_context(|| {
        format!("Cannot open prompt store {}", config.prompts_path.display())
    })
}

fn run_prompt_action(store: &mut PromptStore, action: PromptAction) -> Result<()> {
    match action {
        PromptAction::List => {
            for prompt in store.items() {
                println!("{}\t{}", prompt.id, prompt.name);
            }
        }
        PromptAction::Add { name, content } => match store.add(&name, &content)? {
            Some(prompt) => println!("added \"{}\" ({})", prompt.name, prompt.id),
            None => anyhow::bail!("Prompt name and content must not be blank"),
        },
        PromptAction::Edit { key, name, content } => {
            let current = store
                .find(&key)
                .cloned()
                .with_context(|| format!("No system prompt with id or name \"{key}\""))?;
            let name = name.unwrap_or(current.name);
            let content = content.unwrap_or(current.content);
            if !store.update(&current.id, &name, &content)? {
                anyhow::bail!("Prompt name and content must not be blank");
            }
            println!("updated \"{}\"", name.trim());
        }
        PromptAction::Remove { key } => {
            let removed = store.remove(&key)?;
            println!("removed \"{}\"", removed.name);
        }
    }
    Ok(())
}

fn print_tree(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match &node.children {
            Some(children) => {
                println!("{indent}{}/", node.label);
                print_tree(children, depth + 1);
            }
            None => println!("{indent}{}", node.label),
        }
    }
}
