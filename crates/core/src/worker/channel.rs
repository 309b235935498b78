//! Background vectorization worker.
//!
//! A [`WorkerChannel`] owns one engine on a dedicated thread. Requests are
//! queued in FIFO order and handled one at a time; each reply arrives through
//! a [`PendingConversion`] future, so the caller never blocks or polls.
//! A panicking engine fails only the request that triggered it.

use std::future::Future;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::task::{Context, Poll};
use std::thread::{self, JoinHandle};

use futures_channel::oneshot;
use serde::{Deserialize, Serialize};

use super::convert::{Conversion, ConversionError, ConversionRequest, convert_raster};
use super::engine::{EngineError, VectorizationEngine};

/// Where the worker is in its current conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelState {
    Idle,
    /// Engine buffer allocated, pixels being copied in.
    Marshalling,
    /// Engine entry point running.
    Invoking,
    /// Result ready, being handed back.
    Returning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            thread_name: "autosvg-worker".to_string(),
        }
    }
}

type Reply = Result<Conversion, ConversionError>;

struct Job {
    id: u64,
    request: ConversionRequest,
    reply: oneshot::Sender<Reply>,
}

/// Handle to a worker thread that owns a [`VectorizationEngine`].
///
/// Dropping the channel closes the queue without waiting: the worker finishes
/// the requests already queued (skipping those whose futures were dropped) and
/// exits on its own. Use [`WorkerChannel::shutdown`] to wait for it.
pub struct WorkerChannel {
    jobs: Option<mpsc::Sender<Job>>,
    state: Arc<Mutex<ChannelState>>,
    worker: Option<JoinHandle<()>>,
    next_id: AtomicU64,
}

impl WorkerChannel {
    /// Move `engine` onto a new worker thread with the default config.
    pub fn spawn<E>(engine: E) -> io::Result<Self>
    where
        E: VectorizationEngine + Send + 'static,
    {
        Self::with_config(engine, ChannelConfig::default())
    }

    pub fn with_config<E>(engine: E, config: ChannelConfig) -> io::Result<Self>
    where
        E: VectorizationEngine + Send + 'static,
    {
        let (jobs, queue) = mpsc::channel();
        let state = Arc::new(Mutex::new(ChannelState::Idle));
        let worker_state = Arc::clone(&state);
        let worker = thread::Builder::new()
            .name(config.thread_name)
            .spawn(move || run_worker(engine, &queue, &worker_state))?;

        Ok(Self {
            jobs: Some(jobs),
            state,
            worker: Some(worker),
            next_id: AtomicU64::new(0),
        })
    }

    /// Queue a conversion. Resolves once the worker has handled every
    /// earlier request and this one.
    pub fn convert(&self, request: ConversionRequest) -> PendingConversion {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, receiver) = oneshot::channel();
        let job = Job { id, request, reply };

        let undelivered = match &self.jobs {
            Some(jobs) => jobs.send(job).err().map(|mpsc::SendError(job)| job),
            None => Some(job),
        };
        if let Some(job) = undelivered {
            tracing::warn!(id, "vectorization worker is gone, rejecting request");
            let _ = job.reply.send(Err(ConversionError::WorkerGone));
        }

        PendingConversion { id, receiver }
    }

    pub fn state(&self) -> ChannelState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close the queue and block until the worker has drained it and exited.
    pub fn shutdown(mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("vectorization worker panicked");
        }
    }
}

impl Drop for WorkerChannel {
    fn drop(&mut self) {
        // Closing the sender is enough for the worker to stop; its
        // `JoinHandle` is detached.
        self.jobs.take();
        self.worker.take();
    }
}

/// The eventual outcome of one [`WorkerChannel::convert`] call.
#[must_use = "a conversion result is only observed by awaiting it"]
pub struct PendingConversion {
    id: u64,
    receiver: oneshot::Receiver<Reply>,
}

impl PendingConversion {
    /// Position of the request in the channel's queue.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Future for PendingConversion {
    type Output = Reply;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Reply> {
        Pin::new(&mut self.receiver).poll(cx).map(|reply| {
            reply.unwrap_or_else(|oneshot::Canceled| Err(ConversionError::WorkerGone))
        })
    }
}

fn set_state(state: &Mutex<ChannelState>, next: ChannelState) {
    let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
    tracing::trace!(from = ?*current, to = ?next, "worker state");
    *current = next;
}

/// Puts the channel back to `Idle` however the conversion ends.
struct IdleOnDrop<'a>(&'a Mutex<ChannelState>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        set_state(self.0, ChannelState::Idle);
    }
}

fn engine_panicked(payload: &(dyn Any + Send)) -> ConversionError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ConversionError::Engine(EngineError::new(format!("engine panicked: {message}")))
}

fn run_worker<E: VectorizationEngine>(
    mut engine: E,
    queue: &mpsc::Receiver<Job>,
    state: &Mutex<ChannelState>,
) {
    for job in queue {
        let span = tracing::debug_span!(
            "conversion",
            id = job.id,
            rows = job.request.raster.rows(),
            cols = job.request.raster.cols(),
        );
        let _entered = span.enter();

        if job.reply.is_canceled() {
            tracing::debug!("caller went away, skipping");
            continue;
        }

        let idle = IdleOnDrop(state);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            convert_raster(&mut engine, &job.request, |stage| set_state(state, stage))
        }))
        .unwrap_or_else(|payload| Err(engine_panicked(payload.as_ref())));
        drop(idle);

        match &result {
            Ok(conversion) => tracing::debug!(bytes = conversion.svg.len(), "conversion finished"),
            Err(err) => tracing::warn!(%err, "conversion failed"),
        }
        if job.reply.send(result).is_err() {
            tracing::debug!("caller dropped the pending conversion");
        }
    }
    tracing::debug!("request queue closed, worker exiting");
}
