//! Fixed-size pool of evaluation threads.
//!
//! Every worker pulls jobs from one shared queue and keeps a private
//! [`EpisodeRunner`] between jobs, rebuilding it only when a job asks for a
//! different board size. Jobs carry plain data (board size, trial count and a
//! [`NetworkModel`]); the worker builds its own [`Network`] from it, so no
//! mutable state is shared across threads.
//!
//! [`EvaluationPool::evaluate_batch`] fans a batch of jobs out, waits for
//! every one of them, and returns the results in submission order regardless
//! of which worker finished first.

use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, mpsc},
    thread,
};

use neurosnake_engine::Grid;
use neurosnake_evaluator::{
    network::{Network, NetworkError, NetworkModel},
    session::{EpisodeRunner, PlayError, TrialResult},
};
use tracing::{debug, warn};

/// One individual's evaluation request.
#[derive(Debug, Clone)]
pub struct EvaluationTask {
    pub grid: Grid,
    pub trials: usize,
    pub network: NetworkModel,
}

/// Why a single task produced no results.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TaskError {
    #[display("invalid network: {_0}")]
    InvalidNetwork(NetworkError),
    #[display("{_0}")]
    Play(PlayError),
    #[display("worker panicked: {message}")]
    Panicked { message: String },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PoolError {
    #[display("failed to spawn evaluation worker: {_0}")]
    Spawn(io::Error),
    #[display("task {task} failed: {error}")]
    TaskFailed { task: usize, error: TaskError },
    #[display("evaluation workers are gone")]
    Disconnected,
}

type TaskOutcome = Result<Vec<TrialResult>, TaskError>;

struct Job {
    id: usize,
    task: EvaluationTask,
    reply: mpsc::Sender<(usize, TaskOutcome)>,
}

#[derive(Debug)]
pub struct EvaluationPool {
    sender: Option<mpsc::Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl EvaluationPool {
    /// Spawns `threads` named worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `threads` is zero.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        assert!(threads > 0, "pool needs at least one worker");
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut pool = Self {
            sender: Some(sender),
            workers: Vec::with_capacity(threads),
        };
        for index in 0..threads {
            let receiver = Arc::clone(&receiver);
            let handle = thread::Builder::new()
                .name(format!("neurosnake-eval-{index}"))
                .spawn(move || worker_loop(index, &receiver))
                .map_err(PoolError::Spawn)?;
            pool.workers.push(handle);
        }
        Ok(pool)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Runs every task and returns their trials in submission order.
    ///
    /// Waits for all tasks even when one fails, then reports the first
    /// failure. No partial results are returned.
    pub fn evaluate_batch(
        &self,
        tasks: Vec<EvaluationTask>,
    ) -> Result<Vec<Vec<TrialResult>>, PoolError> {
        let sender = self.sender.as_ref().ok_or(PoolError::Disconnected)?;
        let count = tasks.len();
        let (reply, replies) = mpsc::channel();
        for (id, task) in tasks.into_iter().enumerate() {
            let job = Job {
                id,
                task,
                reply: reply.clone(),
            };
            sender.send(job).map_err(|_| PoolError::Disconnected)?;
        }
        drop(reply);

        let mut results = (0..count).map(|_| None).collect::<Vec<_>>();
        let mut failure = None;
        for _ in 0..count {
            let (id, outcome) = replies.recv().map_err(|_| PoolError::Disconnected)?;
            match outcome {
                Ok(trials) => results[id] = Some(trials),
                Err(error) => {
                    warn!(task = id, %error, "evaluation task failed");
                    failure.get_or_insert(PoolError::TaskFailed { task: id, error });
                }
            }
        }
        if let Some(failure) = failure {
            return Err(failure);
        }
        results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(PoolError::Disconnected)
    }

    /// Closes the queue and waits for every worker to finish its current
    /// task and exit.
    pub fn shutdown(&mut self) {
        self.sender.take();
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or_default().to_owned();
            if let Err(err) = handle.join() {
                warn!(worker = %name, "worker exited by panic: {}", panic_message(&*err));
            }
        }
    }
}

impl Drop for EvaluationPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(index: usize, receiver: &Mutex<mpsc::Receiver<Job>>) {
    debug!(worker = index, "evaluation worker started");
    let mut arena = None;
    loop {
        // The lock is only held while waiting for the next job.
        let job = match receiver.lock() {
            Ok(rx) => rx.recv(),
            Err(poisoned) => poisoned.into_inner().recv(),
        };
        let Ok(Job { id, task, reply }) = job else {
            break;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_task(&mut arena, task)))
            .unwrap_or_else(|payload| {
                // The runner may be half-way through an episode.
                arena = None;
                Err(TaskError::Panicked {
                    message: panic_message(&*payload),
                })
            });
        let _ = reply.send((id, outcome));
    }
    debug!(worker = index, "evaluation worker stopped");
}

fn run_task(arena: &mut Option<EpisodeRunner>, task: EvaluationTask) -> TaskOutcome {
    let network = Network::from_model(task.network).map_err(TaskError::InvalidNetwork)?;
    let runner = arena.get_or_insert_with(|| EpisodeRunner::new(task.grid));
    runner.ensure_grid(task.grid);
    runner
        .play_trials(&network, task.trials)
        .map_err(TaskError::Play)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
