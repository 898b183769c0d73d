//! Leader-based coordination between the workers of a run.
//!
//! Workers share nothing but the channels behind [`ChannelCoordinator`]. The
//! only collective operation is [`Coordinator::gather`], which every worker
//! calls at the same point of the pipeline.

use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use haz_core::errors::{ErrorInfo, HazError};
use haz_table::Table;
use tracing::debug;

/// Rank and size of the current worker plus the gather collective.
pub trait Coordinator {
    /// Zero-based identity of this worker; rank 0 leads.
    fn rank(&self) -> usize;

    /// Number of workers in the run.
    fn size(&self) -> usize;

    /// True on the worker responsible for singleton actions.
    fn is_leader(&self) -> bool {
        self.rank() == 0
    }

    /// Contributes `local` and, on the leader, returns the rank-ordered
    /// concatenation of every worker's table. Non-leaders receive `None`.
    fn gather(&self, local: Table) -> Result<Option<Table>, HazError>;
}

/// Coordinator for a run with a single worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl Coordinator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn gather(&self, local: Table) -> Result<Option<Table>, HazError> {
        Ok(Some(local))
    }
}

/// Coordinator of one worker inside a [`LocalCluster`].
///
/// Every non-leader owns a dedicated channel to the leader, so consecutive
/// gathers stay in step without any round bookkeeping.
#[derive(Debug)]
pub struct ChannelCoordinator {
    rank: usize,
    size: usize,
    outbox: Option<Sender<Table>>,
    inboxes: Vec<Receiver<Table>>,
}

impl Coordinator for ChannelCoordinator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn gather(&self, local: Table) -> Result<Option<Table>, HazError> {
        if let Some(outbox) = &self.outbox {
            outbox.send(local).map_err(|_| {
                HazError::DataIntegrity(
                    ErrorInfo::new("parallel.leader_lost", "leader stopped before gathering")
                        .with_context("rank", self.rank.to_string()),
                )
            })?;
            return Ok(None);
        }

        let mut parts = Vec::with_capacity(self.size);
        parts.push(local);
        for (offset, inbox) in self.inboxes.iter().enumerate() {
            let rank = offset + 1;
            let part = inbox.recv().map_err(|_| {
                HazError::DataIntegrity(
                    ErrorInfo::new("parallel.worker_lost", "worker stopped before gathering")
                        .with_context("rank", rank.to_string())
                        .with_hint("the worker's own error explains why it stopped"),
                )
            })?;
            parts.push(part);
        }
        let merged = Table::concat(parts)?;
        debug!(workers = self.size, entities = merged.row_count()?, "gathered tables");
        Ok(Some(merged))
    }
}

/// A fixed set of in-process workers joined by channels.
#[derive(Debug, Clone, Copy)]
pub struct LocalCluster {
    size: usize,
}

impl LocalCluster {
    /// Creates a cluster of `size` workers; `size` must be at least one.
    pub fn new(size: usize) -> Result<Self, HazError> {
        if size == 0 {
            return Err(HazError::Configuration(
                ErrorInfo::new("parallel.no_workers", "a run needs at least one worker")
                    .with_context("workers", "0"),
            ));
        }
        Ok(Self { size })
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Builds the coordinators of every rank, wired to each other.
    pub fn coordinators(&self) -> Vec<ChannelCoordinator> {
        let mut senders = Vec::with_capacity(self.size - 1);
        let mut inboxes = Vec::with_capacity(self.size - 1);
        for _ in 1..self.size {
            let (tx, rx) = mpsc::channel();
            senders.push(tx);
            inboxes.push(rx);
        }
        let mut out = Vec::with_capacity(self.size);
        out.push(ChannelCoordinator {
            rank: 0,
            size: self.size,
            outbox: None,
            inboxes,
        });
        for (offset, tx) in senders.into_iter().enumerate() {
            out.push(ChannelCoordinator {
                rank: offset + 1,
                size: self.size,
                outbox: Some(tx),
                inboxes: Vec::new(),
            });
        }
        out
    }

    /// Runs `worker` once per rank on scoped threads.
    ///
    /// Returns the results in rank order. When workers fail, the error of the
    /// lowest rank that failed on its own is returned; failures that only
    /// report a lost peer are returned only if nothing else failed.
    pub fn run<T, F>(&self, worker: F) -> Result<Vec<T>, HazError>
    where
        T: Send,
        F: Fn(&ChannelCoordinator) -> Result<T, HazError> + Sync,
    {
        let worker = &worker;
        let results: Vec<Result<T, HazError>> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .coordinators()
                .into_iter()
                .map(|coordinator| {
                    scope.spawn(move || {
                        let rank = coordinator.rank();
                        worker(&coordinator).map_err(|err| err.with_context("rank", rank.to_string()))
                    })
                })
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(HazError::DataIntegrity(
                            ErrorInfo::new("parallel.worker_panicked", "worker thread panicked")
                                .with_context("rank", rank.to_string()),
                        ))
                    })
                })
                .collect()
        });

        let mut values = Vec::with_capacity(results.len());
        let mut lost_peer = None;
        let mut root_cause = None;
        for result in results {
            match result {
                Ok(value) => values.push(value),
                Err(err) if is_lost_peer(&err) => {
                    lost_peer.get_or_insert(err);
                }
                Err(err) => {
                    root_cause.get_or_insert(err);
                }
            }
        }
        match root_cause.or(lost_peer) {
            Some(err) => Err(err),
            None => Ok(values),
        }
    }
}

fn is_lost_peer(err: &HazError) -> bool {
    matches!(err.code(), "parallel.worker_lost" | "parallel.leader_lost")
}

/// Entity range owned by worker `rank` out of `size` when splitting `n`
/// entities into contiguous, balanced blocks. Lower ranks take the remainder.
pub fn partition_range(n: usize, rank: usize, size: usize) -> Range<usize> {
    let size = size.max(1);
    let base = n / size;
    let extra = n % size;
    let start = rank * base + rank.min(extra);
    let len = base + usize::from(rank < extra);
    start.min(n)..(start + len).min(n)
}
