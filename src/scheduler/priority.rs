use crate::executor::Task;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Per-level bounded FIFO queues, index 0 most urgent.
///
/// There is no heap: a pop walks the levels in ascending order and takes the
/// head of the first non-empty one. The walk is O(levels), which stays cheap
/// because the level count is a small constant fixed at construction.
pub struct PriorityLevels<T> {
    queues: Vec<(Sender<Task<T>>, Receiver<Task<T>>)>,
    max_priority: usize,
}

impl<T> PriorityLevels<T> {
    /// `max_priority + 1` queues, each holding up to `capacity` tasks.
    pub fn new(max_priority: usize, capacity: usize) -> Self {
        let queues = (0..=max_priority)
            .map(|_| bounded(capacity.max(1)))
            .collect();

        Self {
            queues,
            max_priority,
        }
    }

    /// Clamp an arbitrary priority into `[0, max_priority]`.
    pub fn clamp(&self, priority: isize) -> usize {
        if priority <= 0 {
            0
        } else {
            (priority as usize).min(self.max_priority)
        }
    }

    /// Enqueue onto `task.level`, blocking while that queue is full.
    pub(crate) fn push(&self, task: Task<T>) {
        let (tx, _) = &self.queues[task.level];
        // both ends live in `self`, so the send cannot fail
        let _ = tx.send(task);
    }

    /// Non-blocking dequeue from the most urgent non-empty level.
    pub(crate) fn pop(&self) -> Option<Task<T>> {
        self.queues
            .iter()
            .find_map(|(_, rx)| rx.try_recv().ok())
    }

    /// Resident tasks per level.
    pub fn lengths(&self) -> Vec<usize> {
        self.queues.iter().map(|(_, rx)| rx.len()).collect()
    }
}

impl<T> std::fmt::Debug for PriorityLevels<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityLevels")
            .field("max_priority", &self.max_priority)
            .field("lengths", &self.lengths())
            .finish()
    }
}
