use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread,
};

use log::{debug, error, info};

use crate::{BatchError, item::random_generator::RandomProfileGenerator};

use super::{
    build_name,
    item::{ContactSink, ProfileGenerator},
    job::{CancellationToken, GenerationRequest, JobBuilder, MAX_COUNT},
    state::{GenerationProgress, GenerationState, StateHolder, StateListener},
};

/// Caller-facing batch generation workflow.
///
/// Every call to [`start_generation`](Self::start_generation) validates the
/// request, then runs it on a background thread while the current
/// [`GenerationState`] stays readable from any thread. At most one run is
/// active: starting a new one cancels the previous run and drops whatever it
/// would still publish.
///
/// Runs never overlap on the sink. A new run waits until the run it
/// superseded has finished its unit in progress and closed the sink.
///
/// # State machine
///
/// ```text
/// Idle --start(valid)--> Loading --> Success | Warning | Error --reset--> Idle
/// Idle | Loading --start--> Loading        (supersedes the previous run)
/// Loading --cancel--> Idle
/// ```
pub struct BatchGenerationWorkflow {
    name: String,
    max_count: i64,
    generator: Arc<dyn ProfileGenerator>,
    sink: Arc<dyn ContactSink>,
    state: Arc<StateHolder>,
    active: Mutex<Option<CancellationToken>>,
    /// Held by a run thread for its whole run.
    run_lock: Arc<Mutex<()>>,
}

/// Marks the run thread as finished however it exits.
struct RunGuard {
    state: Arc<StateHolder>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.end_run();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl BatchGenerationWorkflow {
    fn active(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Current state snapshot.
    pub fn state(&self) -> GenerationState {
        self.state.current()
    }

    /// Registers a listener for state changes. It receives the current state
    /// right away. Listeners may read [`state`](Self::state) but must not
    /// start or cancel runs.
    pub fn subscribe(&self, listener: StateListener) {
        self.state.subscribe(listener);
    }

    /// Starts a run generating `requested_count` contacts.
    ///
    /// Any active run is cancelled first. An invalid count publishes
    /// `Error` and no unit runs; otherwise `Loading(0, requested_count)` is
    /// current when this returns.
    ///
    /// # Errors
    ///
    /// Returns the validation error, or a fault when the run thread could not
    /// be spawned. Both are also published as `Error`.
    pub fn start_generation(&self, requested_count: i64) -> Result<(), BatchError> {
        let mut active = self.active();
        if let Some(previous) = active.take() {
            info!("Cancelling previous run of {}", self.name);
            previous.cancel();
        }

        let request = match GenerationRequest::with_max(requested_count, self.max_count) {
            Ok(request) => request,
            Err(err) => {
                error!("Rejected request for {} contacts: {}", requested_count, err);
                self.state.supersede(GenerationState::Error(err.to_string()));
                return Err(err);
            }
        };

        let total = request.requested_count();
        let run = self
            .state
            .begin_run(GenerationState::Loading(GenerationProgress::new(0, total)));

        let token = CancellationToken::new();
        *active = Some(token.clone());

        let name = self.name.clone();
        let generator = Arc::clone(&self.generator);
        let sink = Arc::clone(&self.sink);
        let state = Arc::clone(&self.state);
        let run_lock = Arc::clone(&self.run_lock);

        let spawned = thread::Builder::new()
            .name(format!("{}-run-{}", self.name, run))
            .spawn(move || {
                let _settle = RunGuard {
                    state: Arc::clone(&state),
                };
                let _serial = run_lock.lock().unwrap_or_else(PoisonError::into_inner);
                if token.is_cancelled() {
                    debug!("Run {} of {} superseded before it started", run, name);
                    return;
                }

                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    JobBuilder::new()
                        .name(name.clone())
                        .generator(generator.as_ref())
                        .sink(sink.as_ref())
                        .build()
                        .and_then(|job| {
                            job.run(&request, &token, &mut |loading| {
                                state.publish(run, loading);
                            })
                        })
                }));

                let terminal = match outcome {
                    Ok(Ok(execution)) => execution.terminal_state(),
                    Ok(Err(err)) => Some(GenerationState::Error(err.to_string())),
                    Err(payload) => {
                        let fault = BatchError::UnexpectedFault(format!(
                            "run panicked: {}",
                            panic_message(&*payload)
                        ));
                        error!("Run {} of {} aborted: {}", run, name, fault);
                        Some(GenerationState::Error(fault.to_string()))
                    }
                };

                if let Some(terminal) = terminal {
                    state.publish(run, terminal);
                }
            });

        if let Err(err) = spawned {
            let fault = BatchError::UnexpectedFault(err.to_string());
            error!("Unable to start run of {}: {}", self.name, fault);
            *active = None;
            self.state.publish(run, GenerationState::Error(fault.to_string()));
            self.state.end_run();
            return Err(fault);
        }

        Ok(())
    }

    /// Cancels the active run, if any, and goes back to `Idle`.
    ///
    /// The run stops after the unit in progress; nothing it publishes
    /// afterwards is delivered.
    pub fn cancel_generation(&self) {
        let mut active = self.active();
        if let Some(token) = active.take() {
            info!("Cancelling run of {}", self.name);
            token.cancel();
        }
        self.state.supersede(GenerationState::Idle);
    }

    /// Goes back to `Idle` without touching an active run.
    pub fn reset_state(&self) {
        self.state.set(GenerationState::Idle);
    }

    /// Blocks until every run thread started by this workflow has finished,
    /// superseded ones included.
    pub fn wait_until_settled(&self) {
        self.state.wait_until_settled();
    }
}

impl Drop for BatchGenerationWorkflow {
    fn drop(&mut self) {
        if let Some(token) = self.active().take() {
            token.cancel();
        }
    }
}

/// Builder for [`BatchGenerationWorkflow`].
pub struct WorkflowBuilder {
    name: Option<String>,
    max_count: i64,
    generator: Option<Arc<dyn ProfileGenerator>>,
    sink: Option<Arc<dyn ContactSink>>,
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            max_count: MAX_COUNT,
            generator: None,
            sink: None,
        }
    }

    /// Name used in logs and for run thread names. Random if not set.
    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Largest accepted count, [`MAX_COUNT`] by default.
    pub fn max_count(mut self, max_count: i64) -> Self {
        self.max_count = max_count;
        self
    }

    /// Profile source, a default [`RandomProfileGenerator`] if not set.
    pub fn generator(mut self, generator: Arc<dyn ProfileGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ContactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds the workflow in the `Idle` state.
    ///
    /// # Errors
    ///
    /// Fails when no sink was given or the maximum is not positive.
    pub fn build(self) -> Result<BatchGenerationWorkflow, BatchError> {
        let sink = self
            .sink
            .ok_or_else(|| BatchError::UnexpectedFault("a contact sink is required".to_string()))?;

        if self.max_count <= 0 {
            return Err(BatchError::InvalidCount(self.max_count));
        }

        Ok(BatchGenerationWorkflow {
            name: self.name.unwrap_or_else(build_name),
            max_count: self.max_count,
            generator: self
                .generator
                .unwrap_or_else(|| Arc::new(RandomProfileGenerator::default())),
            sink,
            state: Arc::new(StateHolder::new()),
            active: Mutex::new(None),
            run_lock: Arc::new(Mutex::new(())),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        BatchError,
        core::state::{GenerationProgress, GenerationState},
        item::memory::InMemoryContactSink,
    };

    use super::WorkflowBuilder;

    #[test]
    fn initial_state_should_be_idle() -> anyhow::Result<()> {
        let workflow = WorkflowBuilder::new()
            .sink(Arc::new(InMemoryContactSink::new()))
            .build()?;

        assert_eq!(workflow.state(), GenerationState::Idle);
        Ok(())
    }

    #[test]
    fn build_should_require_a_sink() {
        assert!(matches!(
            WorkflowBuilder::new().build(),
            Err(BatchError::UnexpectedFault(_))
        ));
    }

    #[test]
    fn custom_maximum_should_be_enforced() -> anyhow::Result<()> {
        let workflow = WorkflowBuilder::new()
            .name("small".to_string())
            .max_count(5)
            .sink(Arc::new(InMemoryContactSink::new()))
            .build()?;

        let result = workflow.start_generation(6);

        assert_eq!(
            result,
            Err(BatchError::CountExceedsMaximum {
                requested: 6,
                max: 5
            })
        );
        assert_eq!(
            workflow.state(),
            GenerationState::Error("Count 6 exceeds the maximum of 5 contacts".to_string())
        );
        Ok(())
    }

    #[test]
    fn valid_start_should_be_loading_on_return() -> anyhow::Result<()> {
        let sink = Arc::new(InMemoryContactSink::new());
        let workflow = WorkflowBuilder::new().sink(sink.clone()).build()?;

        let recorded = Arc::new(std::sync::Mutex::new(Vec::new()));
        let listener = Arc::clone(&recorded);
        workflow.subscribe(Box::new(move |state| {
            listener.lock().unwrap().push(state.clone());
        }));

        workflow.start_generation(4)?;
        assert!(workflow.state().is_loading() || workflow.state().is_terminal());
        workflow.wait_until_settled();

        let history = recorded.lock().unwrap();
        assert_eq!(history[0], GenerationState::Idle);
        assert_eq!(
            history[1],
            GenerationState::Loading(GenerationProgress::new(0, 4))
        );
        assert_eq!(history.last(), Some(&GenerationState::Success(4)));
        assert_eq!(sink.len(), 4);
        Ok(())
    }

    #[test]
    fn reset_should_return_to_idle() -> anyhow::Result<()> {
        let workflow = WorkflowBuilder::new()
            .sink(Arc::new(InMemoryContactSink::new()))
            .build()?;

        let _ = workflow.start_generation(0);
        assert!(matches!(workflow.state(), GenerationState::Error(_)));

        workflow.reset_state();
        assert_eq!(workflow.state(), GenerationState::Idle);
        Ok(())
    }

    #[test]
    fn cancel_while_idle_should_stay_idle() -> anyhow::Result<()> {
        let workflow = WorkflowBuilder::new()
            .sink(Arc::new(InMemoryContactSink::new()))
            .build()?;

        workflow.cancel_generation();
        assert_eq!(workflow.state(), GenerationState::Idle);
        Ok(())
    }
}
