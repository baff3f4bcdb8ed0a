//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::backends::walk::walk;
use crate::core::error::SearchError;
use crate::core::model::{Schedule, SearchRequest};
use crate::core::paths::resolve_search_path;
use crate::core::render::{OutputFormat, WriterSink};

/// dirseek - find files by exact name, one worker per directory.
#[derive(Parser, Debug)]
#[command(name = "dirseek")]
#[command(
    author,
    version,
    about,
    long_about = r#"dirseek lists the entries of a directory and prints every entry whose name
equals one of the target names. With -R each subdirectory is searched by its
own worker thread.

Each match is printed as soon as it is found:

    <worker> : <name> : <full path>

The search path is the last positional argument, unless --path is given, in
which case every positional argument is a target name.

Examples:
    dirseek Cargo.toml .
    dirseek -Ri readme.md license ~/src
    dirseek -R --path /etc hosts resolv.conf
"#
)]
pub struct Cli {
    /// Target names, followed by the directory to search.
    #[arg(value_name = "NAME", num_args = 0..)]
    pub args: Vec<String>,

    /// Directory to search; makes every positional argument a target name.
    #[arg(
        short,
        long,
        value_name = "PATH",
        long_help = "Directory to search. Relative paths resolve against the current directory.\n\n\
When given, every positional argument is treated as a target name."
    )]
    pub path: Option<PathBuf>,

    /// Descend into subdirectories.
    #[arg(
        short = 'R',
        long,
        long_help = "Descend into subdirectories. Each directory is searched by its own worker\n\
thread. Directories that are descended into are not compared by name."
    )]
    pub recursive: bool,

    /// Compare names ignoring case.
    #[arg(
        short,
        long,
        long_help = "Compare names ignoring case: equal length, and every character equal once\n\
both are uppercased. No locale rules apply."
    )]
    pub ignore_case: bool,

    /// Descend through symbolic links to directories.
    #[arg(
        short = 'L',
        long,
        long_help = "Treat symbolic links to directories as directories and descend into them.\n\n\
There is no cycle detection beyond what the directory iterator reports."
    )]
    pub follow_links: bool,

    /// Search sibling directories concurrently.
    #[arg(
        long,
        long_help = "By default a directory waits for each subdirectory's worker before moving\n\
on. With --fanout all subdirectories of a directory are searched at once and joined\n\
together. The set of matches is the same; only their order differs."
    )]
    pub fanout: bool,

    /// Output format (line/jsonl).
    #[arg(
        long,
        default_value = "line",
        value_parser = ["line", "jsonl"],
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- line (default): `<worker> : <name> : <path>`\n\
- jsonl: one JSON object per match"
    )]
    pub format: String,

    /// Report diagnostics on stderr (repeat for more).
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        long_help = "Report diagnostics on stderr: skipped subtrees and a final summary.\n\
Repeat (-vv) to also trace every worker."
    )]
    pub verbose: u8,
}

impl Cli {
    /// Split positionals into targets and path, and resolve the path
    pub fn search_request(&self) -> Result<SearchRequest, SearchError> {
        let (targets, path) = match &self.path {
            Some(path) => (self.args.clone(), path.clone()),
            None => {
                let (path, targets) = self.args.split_last().ok_or(SearchError::MissingPath)?;
                (targets.to_vec(), PathBuf::from(path))
            }
        };

        let root = resolve_search_path(&path)?;
        let schedule = if self.fanout {
            Schedule::Fanout
        } else {
            Schedule::Sequential
        };

        Ok(SearchRequest::new(root, targets)
            .recursive(self.recursive)
            .ignore_case(self.ignore_case)
            .follow_links(self.follow_links)
            .schedule(schedule))
    }
}

/// Drop options the CLI does not know, returning the kept arguments and the
/// dropped options.
///
/// Short flag clusters are split so `-Rx` keeps `-R` and drops `-x`. The
/// first argument (the program name) and everything after `--` pass through.
pub fn screen_unknown_options(args: Vec<OsString>) -> (Vec<OsString>, Vec<String>) {
    let mut cmd = Cli::command();
    cmd.build();

    // flag -> whether it takes a value
    let mut shorts: HashMap<char, bool> = HashMap::new();
    let mut longs: HashMap<String, bool> = HashMap::new();
    for arg in cmd.get_arguments() {
        let takes_value = arg.get_action().takes_values();
        if let Some(short) = arg.get_short() {
            shorts.insert(short, takes_value);
        }
        if let Some(long) = arg.get_long() {
            longs.insert(long.to_string(), takes_value);
        }
    }

    let mut kept = Vec::with_capacity(args.len());
    let mut unknown = Vec::new();
    let mut iter = args.into_iter();
    kept.extend(iter.next());

    let mut expect_value = false;
    while let Some(arg) = iter.next() {
        if expect_value {
            expect_value = false;
            kept.push(arg);
            continue;
        }

        let Some(s) = arg.to_str() else {
            kept.push(arg);
            continue;
        };

        if s == "--" {
            kept.push(arg);
            kept.extend(iter.by_ref());
            break;
        }

        if let Some(long) = s.strip_prefix("--") {
            let (name, inline_value) = match long.split_once('=') {
                Some((name, _)) => (name, true),
                None => (long, false),
            };
            match longs.get(name) {
                Some(&takes_value) => {
                    expect_value = takes_value && !inline_value;
                    kept.push(arg);
                }
                None => unknown.push(s.to_string()),
            }
            continue;
        }

        if let Some(cluster) = s.strip_prefix('-').filter(|c| !c.is_empty()) {
            let mut keep = String::from("-");
            for (i, c) in cluster.char_indices() {
                match shorts.get(&c).copied() {
                    // The rest of the cluster (or the next argument) is the value
                    Some(true) => {
                        keep.push_str(&cluster[i..]);
                        expect_value = i + c.len_utf8() == cluster.len();
                        break;
                    }
                    Some(false) => keep.push(c),
                    None => unknown.push(format!("-{}", c)),
                }
            }
            if keep.len() > 1 {
                kept.push(keep.into());
            }
            continue;
        }

        kept.push(arg);
    }

    (kept, unknown)
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let request = cli
        .search_request()
        .context("Invalid search request")?;

    if request.targets.is_empty() {
        debug!("no target names given");
    }
    debug!(
        root = %request.root.display(),
        targets = ?request.targets,
        recursive = request.recursive,
        ignore_case = request.ignore_case,
        schedule = ?request.schedule,
        "starting search"
    );

    let sink = WriterSink::new(std::io::stdout(), format);
    let summary = walk(&request, &sink);

    info!(
        workers = summary.workers,
        matches = summary.matches,
        skipped = summary.skipped_subtrees,
        elapsed_ms = summary.duration.as_millis() as u64,
        "search finished"
    );

    Ok(())
}
