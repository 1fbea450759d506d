use uuid::Uuid;

pub type TaskId = Uuid;

/// Lifecycle state of a single submitted task (`worker_pool::Task`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed,
}
