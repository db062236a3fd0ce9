//! # Task Management System
//!
//! Executes terrain generation and remesh tasks on a pool of worker threads
//! and applies their results on the thread that owns the world.
//!
//! ## Architecture Overview
//! - `TaskManager`: central coordinator for task distribution and workers
//! - `Task`: a unit of work executed on a worker
//! - `TaskResult`: the result of a task, applied with mutable world access
//! - `TaskChannel`: the sending side of one worker's task queue
//!
//! Each worker has a dedicated task channel; all workers report back through
//! one shared result channel tagged with the worker index, so the owner can
//! block on a single receiver while waiting for any result.
//!
//! With zero workers the manager runs every task inline during
//! `process_queued_tasks`, which gives a fully deterministic single-threaded
//! pipeline.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels round-robin
//! 3. Workers process tasks and send results back
//! 4. Results are applied on the owning thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks
//!
//! ## Example Usage
//! ```
//! use voxel_world::engine::rendering::NullMeshConsumer;
//! use voxel_world::engine::task_management::{task::TaskContext, TaskManager};
//! use voxel_world::engine::voxels::world::World;
//!
//! let mut world = World::new(16, 1.0);
//! let mut consumer = NullMeshConsumer;
//! let mut task_manager = TaskManager::new(2);
//!
//! // In the main loop:
//! let mut context = TaskContext { world: &mut world, consumer: &mut consumer };
//! task_manager.process_completed_tasks(&mut context);
//! task_manager.process_queued_tasks();
//! assert!(task_manager.is_idle());
//! ```

pub mod task;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};
use task::{Task, TaskContext, TaskResult};

/// Message from a worker: its channel index and the result, or `None` if the
/// task panicked.
type WorkerMessage = (usize, Option<Box<dyn TaskResult + Send>>);

/// Sending side of one worker's task queue.
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    num_tasks_in_flight: usize,
    worker: Option<JoinHandle<()>>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Implementation Notes
/// - Not `Sync`: owned and driven by one thread
/// - Drop-safe: closing the task channels stops the workers, which are joined
/// - Panic-safe: a panicking task is logged and does not take its worker down
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    result_receiver: Receiver<WorkerMessage>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    inline_results: VecDeque<Box<dyn TaskResult + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a long task on one worker never delays tasks queued behind
/// it while other workers are idle.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a manager with `num_workers` worker threads. Zero runs every
    /// task inline.
    ///
    /// Workers that fail to spawn are logged and skipped.
    pub fn new(num_workers: usize) -> Self {
        let (result_tx, result_rx) = channel::<WorkerMessage>();
        let mut channels = Vec::with_capacity(num_workers);

        if num_workers > 0 {
            info!(
                "Starting {} workers (available parallelism: {:?})",
                num_workers,
                thread::available_parallelism()
            );
        }

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let result_tx = result_tx.clone();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| task.process())).ok();
                    if result.is_none() {
                        error!("Task panicked on worker {}", worker_index);
                    }
                    if result_tx.send((worker_index, result)).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("voxel-worker-{}", worker_index))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    num_tasks_in_flight: 0,
                    worker: Some(worker),
                }),
                Err(err) => error!("Failed to spawn worker {}: {}", worker_index, err),
            }
        }

        TaskManager {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            inline_results: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads. Zero means inline execution.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks sent to workers whose results have not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.channels.iter().map(|c| c.num_tasks_in_flight).sum()
    }

    /// Tasks waiting for a free worker.
    pub fn queued(&self) -> usize {
        self.queued_tasks.len()
    }

    /// No task is queued, running or waiting to be applied.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.inline_results.is_empty() && self.in_flight() == 0
    }

    /// Attempts to send a task to a specific worker channel, returning the
    /// task if the worker has hung up.
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds a channel below `MAX_TASKS_IN_FLIGHT`, round-robin from the last
    /// used one.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        let start_channel = self.current_channel;
        let mut current = start_channel;
        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a task.
    ///
    /// # Returns
    /// - `true` if the task was sent to a worker immediately
    /// - `false` if it was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if !self.queued_tasks.is_empty() {
            self.queued_tasks.push_back(task);
            return false;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Publishes every task in order.
    pub fn publish_all(&mut self, tasks: impl IntoIterator<Item = Box<dyn Task + Send>>) {
        for task in tasks {
            self.publish_task(task);
        }
    }

    /// Moves queued tasks to free workers in FIFO order, or runs them all
    /// inline when there are no workers.
    pub fn process_queued_tasks(&mut self) {
        if self.channels.is_empty() {
            while let Some(task) = self.queued_tasks.pop_front() {
                self.inline_results.push_back(task.process());
            }
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Worker disconnected; keep the task and stop.
                    error!("Worker {} disconnected", channel_idx);
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Applies every result that is ready without blocking.
    ///
    /// # Returns
    /// The number of results applied.
    pub fn process_completed_tasks(&mut self, context: &mut TaskContext<'_>) -> usize {
        let mut tasks_to_queue = Vec::new();
        let mut handled = 0;

        while let Some(result) = self.inline_results.pop_front() {
            tasks_to_queue.extend(result.handle_result(context));
            handled += 1;
        }

        while let Ok(message) = self.result_receiver.try_recv() {
            if let Some(result) = self.finish(message) {
                tasks_to_queue.extend(result.handle_result(context));
                handled += 1;
            }
        }

        self.publish_all(tasks_to_queue);
        handled
    }

    /// Blocks until a worker result arrives or `timeout` elapses, then applies
    /// everything that is ready.
    pub fn wait_for_results(&mut self, context: &mut TaskContext<'_>, timeout: Duration) -> usize {
        if self.inline_results.is_empty() && self.in_flight() > 0 {
            match self.result_receiver.recv_timeout(timeout) {
                Ok(message) => {
                    let mut handled = 0;
                    if let Some(result) = self.finish(message) {
                        let tasks = result.handle_result(context);
                        self.publish_all(tasks);
                        handled = 1;
                    }
                    return handled + self.process_completed_tasks(context);
                }
                Err(RecvTimeoutError::Timeout) => {
                    debug!("No task result within {:?}", timeout);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    error!("All workers have disconnected");
                }
            }
        }
        self.process_completed_tasks(context)
    }

    fn finish(&mut self, (channel_idx, result): WorkerMessage) -> Option<Box<dyn TaskResult + Send>> {
        let channel = &mut self.channels[channel_idx];
        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
        result
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        let workers: Vec<_> = self
            .channels
            .drain(..)
            .filter_map(|mut channel| channel.worker.take())
            .collect();
        // The task senders were dropped with the channels, so workers exit
        // once their current task is done.
        for worker in workers {
            if worker.join().is_err() {
                error!("Worker thread panicked during shutdown");
            }
        }
    }
}
