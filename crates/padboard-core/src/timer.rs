//! Cancellable one-shot and periodic tasks on simulated or wall-clock time.
//!
//! Nothing here runs callbacks on its own. The owner polls the queue with
//! [`TimerQueue::pop_due`] and routes every fired [`TaskId`] back to whoever
//! scheduled it, which keeps all timer work on the caller's thread.

use web_time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

pub trait Scheduler {
    fn now(&self) -> Instant;
    /// Fires once, `delay` after now.
    fn schedule_once(&mut self, delay: Duration) -> TaskId;
    /// Fires every `period`, first one period after now.
    fn schedule_every(&mut self, period: Duration) -> TaskId;
    /// Returns false if the task already fired (one-shot) or was never known.
    fn cancel(&mut self, task: TaskId) -> bool;
}

#[derive(Debug)]
struct Task {
    id: TaskId,
    deadline: Instant,
    period: Option<Duration>,
}

/// Deterministic timer queue. Tasks fire in deadline order, ties by creation
/// order. While a task is being fired `now()` reports its deadline, so work
/// scheduled from the handler is anchored to the tick rather than to the
/// moment the queue happened to be polled.
#[derive(Debug)]
pub struct TimerQueue {
    now: Instant,
    next_id: u64,
    tasks: Vec<Task>,
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

impl TimerQueue {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_id: 1,
            tasks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_pending(&self, task: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == task)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|t| t.deadline).min()
    }

    /// Pops the earliest task due at or before `until`. Periodic tasks are
    /// re-armed one period after the deadline that just fired.
    pub fn pop_due(&mut self, until: Instant) -> Option<TaskId> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(_, t)| (t.deadline, t.id))
            .map(|(i, _)| i)?;

        let task = &mut self.tasks[idx];
        let id = task.id;
        if task.deadline > self.now {
            self.now = task.deadline;
        }
        match task.period {
            Some(period) => task.deadline += period,
            None => {
                self.tasks.remove(idx);
            }
        }
        Some(id)
    }

    /// Moves `now` forward once nothing else is due.
    pub fn settle(&mut self, until: Instant) {
        if until > self.now {
            self.now = until;
        }
    }

    fn push(&mut self, deadline: Instant, period: Option<Duration>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            deadline,
            period,
        });
        id
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Instant {
        self.now
    }

    fn schedule_once(&mut self, delay: Duration) -> TaskId {
        self.push(self.now + delay, None)
    }

    fn schedule_every(&mut self, period: Duration) -> TaskId {
        let period = period.max(MIN_PERIOD);
        self.push(self.now + period, Some(period))
    }

    fn cancel(&mut self, task: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task);
        self.tasks.len() != before
    }
}
