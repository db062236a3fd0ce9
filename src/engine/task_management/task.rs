//! # Task System Core Traits
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread, or inline
//!    when the manager has no workers
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the owning thread with
//!    mutable access to the world
//! 5. The result can spawn new tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the owning thread
//! - Tasks only read shared chunks; every write happens in `handle_result`

use crate::engine::{rendering::MeshConsumer, voxels::world::World};

/// What a task result may touch when it is applied.
pub struct TaskContext<'a> {
    pub world: &'a mut World,
    pub consumer: &'a mut dyn MeshConsumer,
}

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should own all the data they need. Chunk data is reached through
/// shared handles and only ever read-locked, one chunk at a time.
pub trait Task: Send {
    /// Performs the work and returns a result to apply on the owning thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
pub trait TaskResult: Send {
    /// Applies the result on the owning thread.
    ///
    /// # Returns
    /// Follow-up tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>>;
}
