//! Worker lifecycle tracking.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Lifecycle states of a worker version.
///
/// `Installing → Waiting → Activating → Active → Redundant`. Any state may
/// jump to `Redundant` when the version is discarded or superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Precaching static assets.
    Installing,
    /// Installed, waiting to take control.
    Waiting,
    /// Purging stale generations.
    Activating,
    /// Controlling clients and serving fetches.
    Active,
    /// Discarded or superseded.
    Redundant,
}

impl WorkerState {
    /// Check whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        use WorkerState::*;

        matches!(
            (*self, next),
            (Installing, Waiting)
                | (Waiting, Activating)
                | (Activating, Active)
                | (Installing | Waiting | Activating | Active, Redundant)
        )
    }

    /// Whether the worker serves fetches in this state.
    pub fn is_serving(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Error for an out-of-order lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid lifecycle transition from {from} to {to}")]
pub struct LifecycleError {
    pub from: WorkerState,
    pub to: WorkerState,
}

/// Observer trait for lifecycle events.
pub trait LifecycleObserver: Send + Sync {
    /// Called after a transition has been applied.
    fn on_transition(&self, from: WorkerState, to: WorkerState, elapsed: Duration);
}

/// State machine for one worker version.
pub struct Lifecycle {
    state: WorkerState,
    started: Instant,
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl Lifecycle {
    /// Create a lifecycle in the `Installing` state.
    pub fn new() -> Self {
        Self {
            state: WorkerState::Installing,
            started: Instant::now(),
            observers: Vec::new(),
        }
    }

    /// Register an observer.
    pub fn observe(&mut self, observer: Arc<dyn LifecycleObserver>) {
        self.observers.push(observer);
    }

    /// Current state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Move to `next`, notifying observers.
    pub fn transition(&mut self, next: WorkerState) -> Result<(), LifecycleError> {
        let from = self.state;
        if !from.can_transition_to(next) {
            return Err(LifecycleError { from, to: next });
        }

        self.state = next;
        let elapsed = self.started.elapsed();
        for observer in &self.observers {
            observer.on_transition(from, next, elapsed);
        }
        Ok(())
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(WorkerState, WorkerState)>>);

    impl LifecycleObserver for Recorder {
        fn on_transition(&self, from: WorkerState, to: WorkerState, _elapsed: Duration) {
            self.0.lock().unwrap().push((from, to));
        }
    }

    #[test]
    fn test_happy_path() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), WorkerState::Installing);

        lifecycle.transition(WorkerState::Waiting).unwrap();
        lifecycle.transition(WorkerState::Activating).unwrap();
        lifecycle.transition(WorkerState::Active).unwrap();
        assert!(lifecycle.state().is_serving());

        lifecycle.transition(WorkerState::Redundant).unwrap();
        assert_eq!(lifecycle.state(), WorkerState::Redundant);
    }

    #[test]
    fn test_rejects_skipping_install() {
        let mut lifecycle = Lifecycle::new();
        let err = lifecycle.transition(WorkerState::Activating).unwrap_err();
        assert_eq!(err.from, WorkerState::Installing);
        assert_eq!(err.to, WorkerState::Activating);
        assert_eq!(lifecycle.state(), WorkerState::Installing);
    }

    #[test]
    fn test_redundant_is_terminal() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(WorkerState::Redundant).unwrap();
        assert!(lifecycle.transition(WorkerState::Waiting).is_err());
        assert!(lifecycle.transition(WorkerState::Redundant).is_err());
    }

    #[test]
    fn test_observers_see_transitions() {
        let recorder = Arc::new(Recorder::default());
        let mut lifecycle = Lifecycle::new();
        lifecycle.observe(recorder.clone());

        lifecycle.transition(WorkerState::Waiting).unwrap();
        let _ = lifecycle.transition(WorkerState::Active);

        let seen = recorder.0.lock().unwrap();
        assert_eq!(*seen, vec![(WorkerState::Installing, WorkerState::Waiting)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkerState::Active.to_string(), "active");
        assert_eq!(
            LifecycleError {
                from: WorkerState::Installing,
                to: WorkerState::Active
            }
            .to_string(),
            "invalid lifecycle transition from installing to active"
        );
    }
}
