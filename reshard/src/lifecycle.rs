use tracing::info;

/// The monitor's belief about where the migration stands.
///
/// Transitions are one-directional and driven solely by the number of
/// workers seen in the latest poll. There is no explicit completion signal
/// from the cluster: all workers disappearing after having appeared at least
/// once is read as the migration having completed or been aborted, and the
/// two cannot be told apart from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// No worker has ever been observed.
    NotStarted,
    /// At least one worker has been observed.
    Running,
    /// Workers were observed at some point and have all disappeared since.
    /// Terminal.
    Finished,
}

/// Tiny state machine inferring migration start and completion from polled
/// worker counts.
#[derive(Debug)]
pub struct Lifecycle {
    phase: LifecyclePhase,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: LifecyclePhase::NotStarted,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Returns `true` once the terminal phase has been reached.
    pub fn is_finished(&self) -> bool {
        self.phase == LifecyclePhase::Finished
    }

    /// Advances the state machine with the worker count returned by the
    /// latest poll and returns the resulting phase.
    pub fn observe_worker_count(&mut self, workers: usize) -> LifecyclePhase {
        match (self.phase, workers) {
            (LifecyclePhase::NotStarted, n) if n > 0 => {
                info!(workers = n, "migration started");
                self.phase = LifecyclePhase::Running;
            }
            (LifecyclePhase::Running, 0) => {
                info!("all workers disappeared, migration finished");
                self.phase = LifecyclePhase::Finished;
            }
            _ => {}
        }

        self.phase
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stays_not_started_while_no_workers_appear() {
        let mut lifecycle = Lifecycle::new();

        assert_eq!(
            lifecycle.observe_worker_count(0),
            LifecyclePhase::NotStarted
        );
        assert_eq!(
            lifecycle.observe_worker_count(0),
            LifecyclePhase::NotStarted
        );
        assert!(!lifecycle.is_finished());
    }

    #[test]
    fn test_first_worker_starts_the_run() {
        let mut lifecycle = Lifecycle::new();

        assert_eq!(lifecycle.observe_worker_count(3), LifecyclePhase::Running);
        assert_eq!(lifecycle.observe_worker_count(1), LifecyclePhase::Running);
    }

    #[test]
    fn test_empty_poll_after_running_finishes_the_run() {
        let mut lifecycle = Lifecycle::new();

        lifecycle.observe_worker_count(2);
        assert_eq!(lifecycle.observe_worker_count(0), LifecyclePhase::Finished);
        assert!(lifecycle.is_finished());
    }

    #[test]
    fn test_finished_is_terminal() {
        let mut lifecycle = Lifecycle::new();

        lifecycle.observe_worker_count(1);
        lifecycle.observe_worker_count(0);

        // Workers reappearing after completion must not resurrect the run.
        assert_eq!(lifecycle.observe_worker_count(5), LifecyclePhase::Finished);
        assert_eq!(lifecycle.observe_worker_count(0), LifecyclePhase::Finished);
    }
}
