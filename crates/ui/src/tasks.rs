//! Zero-delay follow-up work.
//!
//! Handlers run to completion; anything they schedule runs afterwards, in
//! FIFO order, when the host drains the queue.

use crate::event::TargetId;
use std::collections::VecDeque;

/// Work a tool can defer to the next scheduling turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Dispatch a click on the given target.
    SyntheticClick(TargetId),
}

#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    pending: VecDeque<T>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self { pending: VecDeque::new() }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: T) {
        self.pending.push_back(task);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
