use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    item::{ContactSink, ProfileGenerator},
    state::{GenerationOutcome, GenerationProgress, GenerationState},
};

/// Largest number of contacts a single run may generate.
pub const MAX_COUNT: i64 = 10_000;

/// Type alias for job execution results.
///
/// A `JobResult` is a `Result` that contains either:
/// - A `JobExecution` describing a run that completed or was cancelled
/// - A `BatchError` for a fault that aborted the run
pub type JobResult<T> = Result<T, BatchError>;

/// A validated request for a run.
///
/// Holding a `GenerationRequest` guarantees `1 <= requested_count <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    requested_count: usize,
}

impl GenerationRequest {
    /// Validates `requested_count` against [`MAX_COUNT`].
    pub fn new(requested_count: i64) -> Result<Self, BatchError> {
        Self::with_max(requested_count, MAX_COUNT)
    }

    /// Validates `requested_count` against a custom maximum.
    ///
    /// Rules are checked in order and the first failing one wins:
    /// 1. `requested_count <= 0` fails with [`BatchError::InvalidCount`]
    /// 2. `requested_count > max_count` fails with [`BatchError::CountExceedsMaximum`]
    pub fn with_max(requested_count: i64, max_count: i64) -> Result<Self, BatchError> {
        if requested_count <= 0 {
            return Err(BatchError::InvalidCount(requested_count));
        }

        if requested_count > max_count {
            return Err(BatchError::CountExceedsMaximum {
                requested: requested_count,
                max: max_count,
            });
        }

        let requested_count = usize::try_from(requested_count)
            .map_err(|err| BatchError::UnexpectedFault(err.to_string()))?;

        Ok(Self { requested_count })
    }

    pub fn requested_count(&self) -> usize {
        self.requested_count
    }
}

/// Cooperative cancellation flag shared between a run and its owner.
///
/// Clones observe the same flag. A run checks it once per unit, after the
/// unit's progress has been published.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// How a run ended when no fault aborted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every unit was attempted.
    Completed(GenerationOutcome),
    /// The token was set; `processed` units had been attempted.
    Cancelled { processed: usize },
}

/// Represents the execution of a run.
///
/// Contains timing information and how the run ended. Useful for monitoring
/// and reporting.
#[derive(Debug)]
pub struct JobExecution {
    /// Identifier of the job that ran
    pub id: Uuid,
    /// Name of the job that ran
    pub name: String,
    /// The time when the run started
    pub start: Instant,
    /// The time when the run finished
    pub end: Instant,
    /// The total duration of the run
    pub duration: Duration,
    /// How the run ended
    pub status: RunStatus,
}

impl JobExecution {
    /// The terminal state to report for this run, `None` when it was
    /// cancelled.
    pub fn terminal_state(&self) -> Option<GenerationState> {
        match self.status {
            RunStatus::Completed(outcome) => Some(outcome.to_state()),
            RunStatus::Cancelled { .. } => None,
        }
    }
}

/// One batch-generation run over a generator and a sink.
///
/// The job drives the units strictly one after the other:
///
/// 1. publish `Loading(0, total)`
/// 2. for each unit, generate a profile, commit it, count the success,
///    publish `Loading(i, total)`, then stop if the token was cancelled
///
/// A sink answering `Ok(false)` only lowers the success tally. An `Err` from
/// the generator or the sink aborts the remaining units and is returned.
///
/// # Example
///
/// ```
/// use contact_avalanche::core::job::{CancellationToken, GenerationRequest, JobBuilder, RunStatus};
/// use contact_avalanche::core::state::GenerationOutcome;
/// use contact_avalanche::item::memory::InMemoryContactSink;
/// use contact_avalanche::item::random_generator::RandomProfileGenerator;
///
/// let generator = RandomProfileGenerator::default();
/// let sink = InMemoryContactSink::new();
///
/// let job = JobBuilder::new()
///     .name("seed-contacts".to_string())
///     .generator(&generator)
///     .sink(&sink)
///     .build()
///     .unwrap();
///
/// let request = GenerationRequest::new(3).unwrap();
/// let execution = job
///     .run(&request, &CancellationToken::new(), &mut |_state| {})
///     .unwrap();
///
/// assert_eq!(execution.status, RunStatus::Completed(GenerationOutcome::new(3, 3)));
/// assert_eq!(sink.len(), 3);
/// ```
pub struct GenerationJob<'a> {
    /// Unique identifier for this job
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    generator: &'a dyn ProfileGenerator,
    sink: &'a dyn ContactSink,
}

impl GenerationJob<'_> {
    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Runs the job on the caller's thread.
    ///
    /// `publish` receives every `Loading` state in order. Terminal states are
    /// left to the caller, see [`JobExecution::terminal_state`].
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when the run completed or was cancelled
    /// - `Err(BatchError)` when a fault aborted it
    pub fn run(
        &self,
        request: &GenerationRequest,
        token: &CancellationToken,
        publish: &mut dyn FnMut(GenerationState),
    ) -> JobResult<JobExecution> {
        let start = Instant::now();
        let total = request.requested_count();

        info!(
            "Start of job: {}, id: {}, contacts: {}",
            self.name, self.id, total
        );

        self.sink.open()?;

        let result = self.execute_units(total, token, publish);
        let close_result = self.sink.close();

        let status = match result {
            Ok(status) => {
                close_result?;
                status
            }
            Err(err) => {
                if let Err(close_err) = close_result {
                    warn!("Unable to close sink after fault: {}", close_err);
                }
                error!("Job {} aborted: {}", self.name, err);
                return Err(err);
            }
        };

        match status {
            RunStatus::Completed(outcome) => info!(
                "End of job: {}, id: {}, created {} of {} contacts",
                self.name, self.id, outcome.success_count, outcome.total_count
            ),
            RunStatus::Cancelled { processed } => info!(
                "Job {} cancelled after {} of {} contacts",
                self.name, processed, total
            ),
        }

        Ok(JobExecution {
            id: self.id,
            name: self.name.clone(),
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            status,
        })
    }

    fn execute_units(
        &self,
        total: usize,
        token: &CancellationToken,
        publish: &mut dyn FnMut(GenerationState),
    ) -> JobResult<RunStatus> {
        publish(GenerationState::Loading(GenerationProgress::new(0, total)));

        let mut success_count = 0;

        for current in 1..=total {
            if self.execute_unit(current)? {
                success_count += 1;
            }

            publish(GenerationState::Loading(GenerationProgress::new(
                current, total,
            )));

            if token.is_cancelled() {
                return Ok(RunStatus::Cancelled { processed: current });
            }
        }

        Ok(RunStatus::Completed(GenerationOutcome::new(
            success_count,
            total,
        )))
    }

    fn execute_unit(&self, current: usize) -> Result<bool, BatchError> {
        let profile = self.generator.next_profile()?;
        debug!("Creating contact {}: {}", current, profile);

        let committed = self.sink.commit(&profile)?;
        if !committed {
            warn!("Contact {} could not be stored: {}", current, profile);
        }

        Ok(committed)
    }
}

/// Builder for creating a generation job.
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    generator: Option<&'a dyn ProfileGenerator>,
    sink: Option<&'a dyn ContactSink>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            generator: None,
            sink: None,
        }
    }

    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    pub fn generator(mut self, generator: &'a dyn ProfileGenerator) -> JobBuilder<'a> {
        self.generator = Some(generator);
        self
    }

    pub fn sink(mut self, sink: &'a dyn ContactSink) -> JobBuilder<'a> {
        self.sink = Some(sink);
        self
    }

    /// Builds the job.
    ///
    /// # Errors
    ///
    /// Fails when the generator or the sink is missing.
    pub fn build(self) -> Result<GenerationJob<'a>, BatchError> {
        let generator = self.generator.ok_or_else(|| {
            BatchError::UnexpectedFault("a profile generator is required".to_string())
        })?;
        let sink = self
            .sink
            .ok_or_else(|| BatchError::UnexpectedFault("a contact sink is required".to_string()))?;

        Ok(GenerationJob {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            generator,
            sink,
        })
    }
}
