use std::fmt;

use crate::error::{Error, Result};
use crate::page::Page;

pub(crate) type TimerCallback = Box<dyn FnOnce(&mut Page) -> Result<()>>;

pub(crate) struct ScheduledTask {
    id: i64,
    due_at: i64,
    order: i64,
    callback: TimerCallback,
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("id", &self.id)
            .field("due_at", &self.due_at)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}

#[derive(Debug)]
pub(crate) struct TimerQueue {
    tasks: Vec<ScheduledTask>,
    next_id: i64,
    next_order: i64,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            next_order: 0,
        }
    }
}

impl TimerQueue {
    fn next_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }
}

impl Page {
    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    /// Schedules `callback` to run once the clock reaches `now + delay_ms`.
    /// Negative delays are treated as zero.
    pub fn set_timeout<F>(&mut self, delay_ms: i64, callback: F) -> i64
    where
        F: FnOnce(&mut Page) -> Result<()> + 'static,
    {
        let delay_ms = delay_ms.max(0);
        let due_at = self.now_ms.saturating_add(delay_ms);
        let id = self.timers.next_id;
        self.timers.next_id += 1;
        let order = self.timers.next_order;
        self.timers.next_order += 1;
        self.timers.tasks.push(ScheduledTask {
            id,
            due_at,
            order,
            callback: Box::new(callback),
        });
        self.trace_timer_line(format!(
            "[timer] schedule timeout id={id} due_at={due_at} delay_ms={delay_ms}"
        ));
        id
    }

    /// Cancels a pending timer. Returns whether a timer was removed.
    pub fn clear_timeout(&mut self, timer_id: i64) -> bool {
        let before = self.timers.tasks.len();
        self.timers.tasks.retain(|task| task.id != timer_id);
        let removed = before - self.timers.tasks.len();
        self.trace_timer_line(format!("[timer] clear id={timer_id} removed={removed}"));
        removed > 0
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.timers.tasks.len();
        self.timers.tasks.clear();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .timers
            .tasks
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::runtime(
                "advance_time requires non-negative milliseconds",
            ));
        }
        let from = self.now_ms;
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        let ran = self.run_timer_queue(Some(self.now_ms), false)?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={delta_ms} from={from} to={} ran_due={ran}",
            self.now_ms
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        let from = self.now_ms;
        self.now_ms = target_ms;
        let ran = self.run_timer_queue(Some(self.now_ms), false)?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={from} to={} ran_due={ran}",
            self.now_ms
        ));
        Ok(())
    }

    /// Runs every pending timer, moving the clock forward to each due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        self.trace_timer_line(format!(
            "[timer] flush from={from} to={} ran={ran}",
            self.now_ms
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(next_idx) = self.timers.next_index(None) else {
            self.trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        };

        let task = self.timers.tasks.remove(next_idx);
        if task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_timer_queue(Some(self.now_ms), false)?;
        self.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={ran}",
            self.now_ms
        ));
        Ok(ran)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.timers.next_index(due_limit) {
            steps += 1;
            if steps > self.config.timer_step_limit {
                return Err(self.timer_step_limit_error(steps, due_limit));
            }
            let task = self.timers.tasks.remove(next_idx);
            if advance_clock && task.due_at > self.now_ms {
                self.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn timer_step_limit_error(&self, steps: usize, due_limit: Option<i64>) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());
        let next_task_desc = self
            .timers
            .next_index(due_limit)
            .and_then(|idx| self.timers.tasks.get(idx))
            .map(|task| format!("id={},due_at={},order={}", task.id, task.due_at, task.order))
            .unwrap_or_else(|| "none".into());

        Error::Runtime(format!(
            "timer queue exceeded max steps (a callback keeps rescheduling itself): limit={}, steps={steps}, now_ms={}, due_limit={due_limit_desc}, pending_tasks={}, next_task={next_task_desc}",
            self.config.timer_step_limit,
            self.now_ms,
            self.timers.tasks.len(),
        ))
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!(
            "[timer] run id={} due_at={} now_ms={}",
            task.id, task.due_at, self.now_ms
        ));
        (task.callback)(self)
    }
}
