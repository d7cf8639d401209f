//! Real-time pacing of discrete simulation ticks.
//!
//! Input arrives every frame; ticks must not. The [`Scheduler`] queues tick
//! requests and tasks, and [`Scheduler::update`] (polled every frame) only acts
//! once the configured delay has passed since it last acted. Acting processes
//! exactly one tick request:
//!
//! - a request of `0` refreshes the world without running tasks or advancing time
//! - a request of `n > 0` runs `n` ticks; each tick takes the whole task queue
//!   as it stands, executes it in submission order, then updates the world by one
use std::collections::VecDeque;
use std::time::Duration;

use game_core::{EntityId, GridVector, MoveTask, Task, TaskOutcome, World};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;

/// What one processed tick request did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateReport {
    /// The request as queued.
    pub request: u32,
    /// Ticks the world advanced (0 for a refresh request).
    pub ticks: u32,
    pub tasks_executed: usize,
    /// Outcomes in execution order.
    pub outcomes: Vec<TaskOutcome>,
}

/// FIFO queues of tick requests and tasks behind a real-time gate.
#[derive(Debug)]
pub struct Scheduler<C = SystemClock> {
    clock: C,
    delay: Duration,
    last_action: Option<Duration>,
    requests: VecDeque<u32>,
    tasks: VecDeque<Task>,
}

impl Scheduler<SystemClock> {
    /// Scheduler on the wall clock.
    pub fn with_delay(delay: Duration) -> Self {
        Self::new(SystemClock::new(), delay)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C, delay: Duration) -> Self {
        Self {
            clock,
            delay,
            last_action: None,
            requests: VecDeque::new(),
            tasks: VecDeque::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Queues a request to advance `ticks` ticks (0 refreshes only).
    pub fn request_update_tick(&mut self, ticks: u32) {
        self.requests.push_back(ticks);
    }

    /// Queues a move intent for the next processed tick.
    pub fn send_actor_move_request(&mut self, actor: EntityId, direction: GridVector) {
        self.push_task(MoveTask::new(actor, direction).into());
    }

    pub fn push_task(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// True when a request is queued and the gate is open.
    pub fn is_ready(&self) -> bool {
        !self.requests.is_empty() && self.gate_open(self.clock.now())
    }

    fn gate_open(&self, now: Duration) -> bool {
        match self.last_action {
            None => true,
            Some(last) => now.saturating_sub(last) > self.delay,
        }
    }

    /// Processes at most one tick request if the gate is open.
    ///
    /// Returns `Ok(None)` when nothing was due. A world update failure ends
    /// the request early; it is not retried.
    pub fn update(&mut self, world: &mut World) -> Result<Option<UpdateReport>> {
        if !self.is_ready() {
            return Ok(None);
        }
        let Some(request) = self.requests.pop_front() else {
            return Ok(None);
        };

        let mut report = UpdateReport {
            request,
            ticks: 0,
            tasks_executed: 0,
            outcomes: Vec::new(),
        };
        let result = self.process(request, world, &mut report);
        self.last_action = Some(self.clock.now());
        result?;

        debug!(
            request,
            ticks = report.ticks,
            tasks = report.tasks_executed,
            tick = %world.tick(),
            "tick request processed"
        );
        Ok(Some(report))
    }

    fn process(&mut self, request: u32, world: &mut World, report: &mut UpdateReport) -> Result<()> {
        if request == 0 {
            world.update(0)?;
            return Ok(());
        }

        for _ in 0..request {
            let batch: Vec<Task> = self.tasks.drain(..).collect();
            for task in batch {
                let outcome = task.execute(world);
                report.outcomes.push(outcome);
                report.tasks_executed += 1;
            }
            world.update(1)?;
            report.ticks += 1;
        }
        Ok(())
    }
}
