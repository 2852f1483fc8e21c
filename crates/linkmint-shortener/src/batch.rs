use crate::error::{BatchError, CreateError};
use crate::retry::{insert_with_retry, RetryPolicy};
use linkmint_core::{ShortCode, UrlStore};
use linkmint_synth::Generator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

/// What `submit` does when the job queue has no free slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FullQueuePolicy {
    /// Fail at once with [`BatchError::QueueFull`].
    #[default]
    Reject,
    /// Wait for the worker to free a slot.
    Wait,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct BatchSettings {
    /// Jobs that may wait in the queue behind the one being processed.
    #[builder(default = 1000)]
    pub queue_capacity: usize,
    /// Largest number of urls accepted in a single job.
    #[builder(default = 1000)]
    pub max_batch_len: usize,
    #[builder(default)]
    pub full_queue: FullQueuePolicy,
    #[builder(default = 5)]
    pub max_attempts: u32,
    #[builder(default = Duration::from_millis(1))]
    pub backoff_step: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Outcome for one url of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub url: String,
    pub outcome: Result<ShortCode, CreateError>,
}

struct BatchJob {
    urls: Vec<String>,
    results: mpsc::Sender<BatchResult>,
}

/// Receives the results of one submitted job, in input order.
///
/// The handle must be drained to learn about per-url failures. Dropping it
/// early does not stall the worker: the job still runs to completion and the
/// undelivered results are discarded.
#[derive(Debug)]
pub struct BatchHandle {
    results: mpsc::Receiver<BatchResult>,
    len: usize,
}

impl BatchHandle {
    /// Number of urls in the job, and so the number of results to expect.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Waits for the next result. `None` once the job is finished.
    pub async fn recv(&mut self) -> Option<BatchResult> {
        self.results.recv().await
    }

    /// Waits for the whole job and returns every result.
    pub async fn collect(mut self) -> Vec<BatchResult> {
        let mut out = Vec::with_capacity(self.len);
        while let Some(result) = self.results.recv().await {
            out.push(result);
        }
        out
    }
}

/// Cloneable entry point for queueing jobs on a [`BatchPipeline`].
#[derive(Debug, Clone)]
pub struct BatchSubmitter {
    jobs: mpsc::Sender<BatchJob>,
    stop: watch::Receiver<bool>,
    max_batch_len: usize,
    full_queue: FullQueuePolicy,
}

impl BatchSubmitter {
    /// Queues `urls` for background shortening.
    ///
    /// An empty job is accepted and its handle yields nothing.
    pub async fn submit(&self, urls: Vec<String>) -> Result<BatchHandle, BatchError> {
        if urls.len() > self.max_batch_len {
            return Err(BatchError::TooLarge {
                len: urls.len(),
                max: self.max_batch_len,
            });
        }
        if *self.stop.borrow() {
            return Err(BatchError::Closed);
        }

        let len = urls.len();
        // one slot per url, so the worker never waits on a slow reader
        let (tx, rx) = mpsc::channel(len.max(1));
        let job = BatchJob { urls, results: tx };

        match self.full_queue {
            FullQueuePolicy::Reject => self.jobs.try_send(job).map_err(|e| match e {
                TrySendError::Full(_) => BatchError::QueueFull,
                TrySendError::Closed(_) => BatchError::Closed,
            })?,
            FullQueuePolicy::Wait => self
                .jobs
                .send(job)
                .await
                .map_err(|_| BatchError::Closed)?,
        }

        debug!(len, "batch job queued");
        Ok(BatchHandle { results: rx, len })
    }
}

/// A single background worker that bulk-loads urls into the store.
///
/// Jobs are processed one at a time, urls within a job sequentially, each
/// with the same collision retry as the request path. The cache tier is not
/// involved. Dropping the pipeline without calling [`shutdown`] still stops
/// the worker once the queue drains, but nothing waits for it.
///
/// [`shutdown`]: BatchPipeline::shutdown
pub struct BatchPipeline {
    submitter: BatchSubmitter,
    stop: watch::Sender<bool>,
    worker: JoinHandle<()>,
}

impl BatchPipeline {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn<S: UrlStore, G: Generator>(
        store: Arc<S>,
        generator: Arc<G>,
        settings: BatchSettings,
    ) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel(settings.queue_capacity.max(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        let policy = RetryPolicy::new(settings.max_attempts, settings.backoff_step);

        let worker = tokio::spawn(run_worker(
            jobs_rx,
            stop_rx.clone(),
            store,
            generator,
            policy,
        ));

        Self {
            submitter: BatchSubmitter {
                jobs: jobs_tx,
                stop: stop_rx,
                max_batch_len: settings.max_batch_len,
                full_queue: settings.full_queue,
            },
            stop: stop_tx,
            worker,
        }
    }

    pub fn submitter(&self) -> BatchSubmitter {
        self.submitter.clone()
    }

    /// See [`BatchSubmitter::submit`].
    pub async fn submit(&self, urls: Vec<String>) -> Result<BatchHandle, BatchError> {
        self.submitter.submit(urls).await
    }

    /// Stops accepting jobs and waits for the worker to finish.
    ///
    /// The job in progress runs to completion and jobs already queued are
    /// drained before the worker exits.
    pub async fn shutdown(self) -> Result<(), BatchError> {
        info!("stopping batch pipeline");
        self.stop.send_replace(true);
        self.worker
            .await
            .map_err(|e| BatchError::Worker(e.to_string()))
    }
}

impl std::fmt::Debug for BatchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPipeline")
            .field("submitter", &self.submitter)
            .field("finished", &self.worker.is_finished())
            .finish()
    }
}

async fn run_worker<S: UrlStore, G: Generator>(
    mut jobs: mpsc::Receiver<BatchJob>,
    mut stop: watch::Receiver<bool>,
    store: Arc<S>,
    generator: Arc<G>,
    policy: RetryPolicy,
) {
    info!(max_attempts = policy.max_attempts, "batch worker started");

    loop {
        tokio::select! {
            biased;

            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }

            job = jobs.recv() => match job {
                Some(job) => process_job(job, store.as_ref(), generator.as_ref(), policy).await,
                None => {
                    info!("batch queue closed, worker exiting");
                    return;
                }
            }
        }
    }

    jobs.close();
    let mut drained = 0usize;
    while let Some(job) = jobs.recv().await {
        process_job(job, store.as_ref(), generator.as_ref(), policy).await;
        drained += 1;
    }

    info!(drained, "batch worker stopped");
}

async fn process_job<S: UrlStore, G: Generator>(
    job: BatchJob,
    store: &S,
    generator: &G,
    policy: RetryPolicy,
) {
    let BatchJob { urls, results } = job;
    let total = urls.len();
    let mut failed = 0usize;

    for url in urls {
        let outcome = insert_with_retry(store, generator, &url, policy).await;
        if let Err(e) = &outcome {
            failed += 1;
            warn!(url = %url, error = %e, "batch url failed");
        }

        if let Err(e) = results.try_send(BatchResult { url, outcome }) {
            debug!(url = %e.into_inner().url, "batch handle dropped, discarding result");
        }
    }

    debug!(total, failed, "batch job finished");
}
