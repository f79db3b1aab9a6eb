//! Deferred work on a tokio clock: visibility passes and the template swap.
//!
//! Nothing here spawns. The host pumps the queue through
//! `Builder::run_pending`, which keeps the controller single-threaded.

use std::time::Duration;

use tokio::time::Instant;

use crate::templates::TemplateDefinition;

/// Delay between a preview mutation and the visibility pass.
pub const VISIBILITY_DELAY: Duration = Duration::from_millis(10);
/// Fade-out time before a new template document is swapped in.
pub const TEMPLATE_FADE_DELAY: Duration = Duration::from_millis(260);
/// Delay after the swap before fading back in and replaying state.
pub const REPLAY_DELAY: Duration = Duration::from_millis(80);

#[derive(Debug)]
pub enum DeferredTask {
    Visibility,
    /// Unloads the faded-out document and starts loading this template.
    SwapDocument(Box<TemplateDefinition>),
    /// Installs the loaded template, fades in and replays the form state.
    Reveal(Box<TemplateDefinition>),
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    seq: u64,
    task: DeferredTask,
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    tasks: Vec<Scheduled>,
    seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Queues `task` to run `delay` from now. A visibility pass already
    /// waiting absorbs any further visibility requests.
    pub fn schedule(&mut self, delay: Duration, task: DeferredTask) {
        if matches!(task, DeferredTask::Visibility)
            && self
                .tasks
                .iter()
                .any(|s| matches!(s.task, DeferredTask::Visibility))
        {
            return;
        }
        self.seq += 1;
        self.tasks.push(Scheduled {
            due: Instant::now() + delay,
            seq: self.seq,
            task,
        });
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.iter().map(|s| s.due).min()
    }

    /// Removes and returns every task due at `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<DeferredTask> {
        let (mut due, pending): (Vec<Scheduled>, Vec<Scheduled>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|s| s.due <= now);
        self.tasks = pending;
        due.sort_by_key(|s| (s.due, s.seq));
        due.into_iter().map(|s| s.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_visibility_requests_coalesce() {
        let mut queue = DeferredQueue::new();
        queue.schedule(VISIBILITY_DELAY, DeferredTask::Visibility);
        tokio::time::advance(Duration::from_millis(5)).await;
        queue.schedule(VISIBILITY_DELAY, DeferredTask::Visibility);
        assert_eq!(queue.len(), 1);

        tokio::time::advance(Duration::from_millis(5)).await;
        let ran = queue.pop_due(Instant::now());
        assert_eq!(ran.len(), 1);
        assert!(queue.is_empty());

        queue.schedule(VISIBILITY_DELAY, DeferredTask::Visibility);
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tasks_run_in_due_order() {
        let def = crate::templates::TemplateLoader::builtin().prepare("1").unwrap();
        let mut queue = DeferredQueue::new();
        queue.schedule(REPLAY_DELAY, DeferredTask::Reveal(Box::new(def)));
        queue.schedule(VISIBILITY_DELAY, DeferredTask::Visibility);
        assert_eq!(queue.next_due(), Some(Instant::now() + VISIBILITY_DELAY));

        assert!(queue.pop_due(Instant::now()).is_empty());
        tokio::time::advance(REPLAY_DELAY).await;
        let ran = queue.pop_due(Instant::now());
        assert!(matches!(ran.as_slice(), [DeferredTask::Visibility, DeferredTask::Reveal(_)]));
    }
}
