use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::resource::{ResourceId, ResourceStore};
use super::state::{PlaybackEvent, PlaybackSnapshot, PlaybackState, Ticket};
use crate::tts::{
    validate, Catalog, SynthesisBackend, SynthesisError, SynthesisRequest, SynthesizedAudio,
    ValidationError,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// What to do with a submission that arrives while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InFlightPolicy {
    /// Refuse it with [`SubmitError::Busy`]
    #[default]
    Reject,
    /// Cancel the in-flight request and start the new one
    Supersede,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("A synthesis request is already in progress")]
    Busy,
}

/// Handle to an accepted submission.
#[derive(Debug)]
pub struct Submission {
    pub ticket: Ticket,
    /// Resolves once the request has completed, failed, or been cancelled
    pub task: JoinHandle<()>,
}

struct Inner {
    state: PlaybackState,
    last_ticket: Ticket,
    in_flight: Option<CancellationToken>,
}

/// Owns the playback state and every audio resource derived from it.
///
/// All transitions go through [`PlaybackState::apply`] under one lock, so
/// they are applied in the order completions arrive. Each request carries a
/// ticket; completions for anything but the current ticket are dropped.
pub struct PlaybackController {
    catalog: Arc<Catalog>,
    backend: Arc<dyn SynthesisBackend>,
    resources: ResourceStore,
    timeout: Duration,
    policy: InFlightPolicy,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<PlaybackSnapshot>,
}

impl PlaybackController {
    pub fn new(catalog: Arc<Catalog>, backend: Arc<dyn SynthesisBackend>) -> Self {
        let state = PlaybackState::Idle;
        let (snapshots, _) = watch::channel(state.snapshot());

        Self {
            catalog,
            backend,
            resources: ResourceStore::new(),
            timeout: DEFAULT_TIMEOUT,
            policy: InFlightPolicy::default(),
            inner: Mutex::new(Inner {
                state,
                last_ticket: 0,
                in_flight: None,
            }),
            snapshots,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: InFlightPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    /// Validate a submission and, if accepted, start synthesizing it.
    pub async fn submit(
        self: &Arc<Self>,
        model_endpoint: &str,
        text: &str,
    ) -> Result<Submission, SubmitError> {
        let request = validate(&self.catalog, model_endpoint, text)?;

        let mut inner = self.inner.lock().await;
        if let Some(current) = inner.state.current_ticket() {
            match self.policy {
                InFlightPolicy::Reject => {
                    debug!("Rejecting submission while request {} is in flight", current);
                    return Err(SubmitError::Busy);
                }
                InFlightPolicy::Supersede => {
                    if let Some(token) = inner.in_flight.take() {
                        info!("Cancelling request {} in favour of a new submission", current);
                        token.cancel();
                    }
                }
            }
        }

        inner.last_ticket += 1;
        let ticket = inner.last_ticket;
        let token = CancellationToken::new();
        inner.in_flight = Some(token.clone());
        self.apply(&mut inner, PlaybackEvent::Submit { ticket });
        drop(inner);

        info!(
            "Request {}: synthesizing {} chars with {}",
            ticket,
            request.text.chars().count(),
            request.model_endpoint
        );

        let controller = Arc::clone(self);
        let task = tokio::spawn(async move { controller.run(ticket, request, token).await });

        Ok(Submission { ticket, task })
    }

    async fn run(&self, ticket: Ticket, request: SynthesisRequest, token: CancellationToken) {
        // The backend runs on its own task so a panic in it still settles the request
        let backend = Arc::clone(&self.backend);
        let call = tokio::spawn(async move { backend.synthesize(&request).await });
        let abort = call.abort_handle();

        let outcome = tokio::select! {
            _ = token.cancelled() => {
                debug!("Request {} cancelled", ticket);
                abort.abort();
                return;
            }
            result = tokio::time::timeout(self.timeout, call) => match result {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    error!("Request {}: synthesis task died: {}", ticket, e);
                    Err(SynthesisError::Transport("synthesis task panicked".to_string()))
                }
                Err(_) => {
                    abort.abort();
                    Err(SynthesisError::Timeout(self.timeout))
                }
            }
        };

        self.complete(ticket, outcome).await;
    }

    async fn complete(&self, ticket: Ticket, outcome: Result<SynthesizedAudio, SynthesisError>) {
        let mut inner = self.inner.lock().await;
        if inner.state.current_ticket() != Some(ticket) {
            warn!("Discarding stale completion for request {}", ticket);
            return;
        }
        inner.in_flight = None;

        let event = match outcome {
            Ok(audio) => {
                let resource = self.resources.create(audio);
                info!(
                    "Request {}: ready, {} bytes of {}",
                    ticket,
                    resource.byte_len(),
                    resource.media_type()
                );
                PlaybackEvent::Succeeded { ticket, resource }
            }
            Err(e) => {
                error!("Request {} failed: {}", ticket, e);
                PlaybackEvent::Failed {
                    ticket,
                    reason: e.to_string(),
                }
            }
        };

        self.apply(&mut inner, event);
    }

    /// Drop the current result and go back to idle. No effect while loading.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        self.apply(&mut inner, PlaybackEvent::Clear);
    }

    fn apply(&self, inner: &mut Inner, event: PlaybackEvent) {
        let state = std::mem::take(&mut inner.state);
        let transition = state.apply(event);

        if transition.stale {
            warn!("Ignored an event that does not match the current request");
        }
        for resource in transition.released {
            self.resources.release(resource);
        }

        inner.state = transition.state;
        self.snapshots.send_replace(self.render(&inner.state));
    }

    fn render(&self, state: &PlaybackState) -> PlaybackSnapshot {
        let mut snapshot = state.snapshot();
        if self.policy == InFlightPolicy::Supersede {
            snapshot.can_submit = true;
        }
        snapshot
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.subscribe()
    }

    /// Bytes behind a live resource handle.
    pub fn audio(&self, id: ResourceId) -> Option<SynthesizedAudio> {
        self.resources.get(id)
    }

    /// Bytes of the result currently shown, if it is ready.
    pub async fn current_audio(&self) -> Option<SynthesizedAudio> {
        let inner = self.inner.lock().await;
        let id = inner.state.ready_resource()?.id();
        self.resources.get(id)
    }
}
