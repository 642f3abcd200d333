use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateState {
    Pending,
    Replaying,
    Open,
}

/// Holds actions back until a fixed set of bootstrap tasks has completed.
///
/// Actions admitted before readiness are queued. Once the last task reports in,
/// the owner drains them with [`ReadinessGate::next_deferred`]; anything admitted
/// while that drain is running joins the back of the same queue, so actions always
/// run in the order they were submitted.
#[derive(Debug)]
pub struct ReadinessGate<A> {
    tasks: Vec<bool>,
    deferred: VecDeque<A>,
    state: GateState,
}

impl<A> ReadinessGate<A> {
    /// A gate waiting on `task_count` tasks. With no tasks it starts open.
    pub fn new(task_count: usize) -> Self {
        Self {
            tasks: vec![false; task_count],
            deferred: VecDeque::new(),
            state: if task_count == 0 {
                GateState::Open
            } else {
                GateState::Pending
            },
        }
    }

    /// True once every task has completed.
    pub fn is_ready(&self) -> bool {
        self.state != GateState::Pending
    }

    /// Hand `action` back if it may run now, otherwise queue it.
    pub fn admit(&mut self, action: A) -> Option<A> {
        if self.state == GateState::Open {
            Some(action)
        } else {
            self.deferred.push_back(action);
            None
        }
    }

    /// Mark a task complete. Returns `true` only for the call that made the gate ready.
    pub fn complete(&mut self, task: usize) -> bool {
        if self.state != GateState::Pending {
            return false;
        }
        let Some(flag) = self.tasks.get_mut(task) else {
            return false;
        };
        *flag = true;
        if self.tasks.iter().all(|&done| done) {
            self.state = GateState::Replaying;
            true
        } else {
            false
        }
    }

    /// Next queued action to replay. Returns `None` and opens the gate when the queue is empty.
    pub fn next_deferred(&mut self) -> Option<A> {
        if self.state == GateState::Pending {
            return None;
        }
        let action = self.deferred.pop_front();
        if action.is_none() {
            self.state = GateState::Open;
        }
        action
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Number of tasks still outstanding.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.iter().filter(|&&done| !done).count()
    }
}
