//! Directory walker
//!
//! Every directory is walked by its own worker, a dedicated OS thread. A
//! worker lists its directory one level deep with walkdir, compares entry
//! names against the targets, and hands each subdirectory to a new worker.
//!
//! With [`Schedule::Sequential`] the parent joins each child right after
//! spawning it, so only one chain of workers (root to current directory) is
//! alive at a time. With [`Schedule::Fanout`] siblings run side by side and
//! the parent joins them all once its own entries are done.
//!
//! A worker that cannot read its directory, or panics, loses that subtree
//! only. The parent logs it and moves on to its next entry.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Instant;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::core::error::SubtreeError;
use crate::core::model::{MatchRecord, Schedule, SearchRequest, WalkSummary, WorkerId};
use crate::core::names::NameMatcher;
use crate::core::paths::base_name;
use crate::core::render::MatchSink;

/// Workers hold one directory iterator and little else.
///
/// A subdirectory that cannot get a thread at all is walked inline on its
/// parent's stack, one `walk_dir` frame per level. If thread creation keeps
/// failing, a few hundred nested levels exhaust this size.
const WORKER_STACK_SIZE: usize = 512 * 1024;

/// Walk `request.root`, emitting every match into `sink` as it is found
pub fn walk(request: &SearchRequest, sink: &dyn MatchSink) -> WalkSummary {
    walk_with_stack_size(request, sink, WORKER_STACK_SIZE)
}

fn walk_with_stack_size(
    request: &SearchRequest,
    sink: &dyn MatchSink,
    stack_size: usize,
) -> WalkSummary {
    let started = Instant::now();
    let ctx = WalkContext::new(request, sink, stack_size);

    if ctx.matcher.is_empty() {
        debug!("no target names, nothing to search for");
        return WalkSummary {
            duration: started.elapsed(),
            ..WalkSummary::default()
        };
    }

    thread::scope(|scope| {
        let worker = ctx.next_worker_id();
        ctx.walk_dir(scope, &request.root, worker);
    });

    WalkSummary {
        workers: ctx.next_worker.load(Ordering::Relaxed) - 1,
        matches: ctx.matches.load(Ordering::Relaxed),
        skipped_subtrees: ctx.skipped.load(Ordering::Relaxed),
        duration: started.elapsed(),
    }
}

/// State shared by every worker of one walk
struct WalkContext<'a> {
    request: &'a SearchRequest,
    matcher: NameMatcher<'a>,
    sink: &'a dyn MatchSink,
    stack_size: usize,
    next_worker: AtomicU64,
    matches: AtomicU64,
    skipped: AtomicU64,
}

impl<'a> WalkContext<'a> {
    fn new(request: &'a SearchRequest, sink: &'a dyn MatchSink, stack_size: usize) -> Self {
        Self {
            request,
            matcher: NameMatcher::new(&request.targets, request.ignore_case),
            sink,
            stack_size,
            next_worker: AtomicU64::new(1),
            matches: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    fn next_worker_id(&self) -> WorkerId {
        WorkerId(self.next_worker.fetch_add(1, Ordering::Relaxed))
    }

    /// Body of one worker: process every entry of `dir`
    fn walk_dir<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        dir: &Path,
        worker: WorkerId,
    ) {
        trace!(worker = %worker, dir = %dir.display(), "worker started");

        let mut children: Vec<(PathBuf, ScopedJoinHandle<'scope, ()>)> = Vec::new();

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.request.follow_links);

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // An entry that exists but whose target cannot be resolved
                    // (dangling link, link loop) is still compared by name.
                    // Anything else means the listing itself failed.
                    let unresolved = err
                        .path()
                        .filter(|path| err.depth() > 0 && *path != dir)
                        .map(Path::to_path_buf);
                    match unresolved {
                        Some(path) => {
                            debug!(worker = %worker, error = %err, "unresolved entry");
                            self.compare(worker, &path);
                            continue;
                        }
                        None => {
                            self.skip(SubtreeError::listing(dir, err));
                            break;
                        }
                    }
                }
            };

            if self.request.recursive && entry.file_type().is_dir() {
                let child = entry.into_path();
                match self.request.schedule {
                    Schedule::Sequential => {
                        if let Some(handle) = self.spawn(scope, &child) {
                            self.join(child, handle);
                        }
                    }
                    Schedule::Fanout => {
                        if let Some(handle) = self.spawn(scope, &child) {
                            children.push((child, handle));
                        }
                    }
                }
                continue;
            }

            self.compare(worker, entry.path());
        }

        for (child, handle) in children {
            self.join(child, handle);
        }

        trace!(worker = %worker, dir = %dir.display(), "worker finished");
    }

    /// Start a worker for `dir`.
    ///
    /// A thread refused with the worker stack size is retried once with the
    /// platform default. When the OS refuses that too, the directory is
    /// walked inline and `None` is returned.
    fn spawn<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        dir: &Path,
    ) -> Option<ScopedJoinHandle<'scope, ()>> {
        let worker = self.next_worker_id();

        let spawned = self
            .spawn_thread(scope, dir, worker, Some(self.stack_size))
            .or_else(|e| {
                debug!(dir = %dir.display(), error = %e, "retrying worker with the default stack size");
                self.spawn_thread(scope, dir, worker, None)
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot spawn worker, walking inline");
                self.walk_dir(scope, dir, worker);
                None
            }
        }
    }

    fn spawn_thread<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        dir: &Path,
        worker: WorkerId,
        stack_size: Option<usize>,
    ) -> io::Result<ScopedJoinHandle<'scope, ()>> {
        let owned = dir.to_path_buf();
        let mut builder = thread::Builder::new().name(format!("walk-{}", worker));
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }
        builder.spawn_scoped(scope, move || self.walk_dir(scope, &owned, worker))
    }

    fn join(&self, dir: PathBuf, handle: ScopedJoinHandle<'_, ()>) {
        if handle.join().is_err() {
            self.skip(SubtreeError::WorkerPanicked { path: dir });
        }
    }

    fn skip(&self, err: SubtreeError) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        warn!(dir = %err.path().display(), "skipping subtree: {}", err);
    }

    /// Compare one entry's base name against every target
    fn compare(&self, worker: WorkerId, path: &Path) {
        let name = base_name(path);
        for target in self.matcher.matches(name) {
            self.matches.fetch_add(1, Ordering::Relaxed);
            self.sink.emit(MatchRecord {
                worker_id: worker,
                name: name.to_string_lossy().into_owned(),
                target: target.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
}
