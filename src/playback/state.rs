use serde::Serialize;

use super::resource::{AudioResource, ResourceId};

/// Sequence number identifying one submission. Strictly increasing.
pub type Ticket = u64;

#[derive(Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// A request is in flight. `previous` keeps the last ready resource
    /// alive until a completion replaces it; it is never rendered.
    Loading {
        ticket: Ticket,
        previous: Option<AudioResource>,
    },
    Ready(AudioResource),
    Error {
        reason: String,
    },
}

#[derive(Debug)]
pub enum PlaybackEvent {
    Submit { ticket: Ticket },
    Succeeded { ticket: Ticket, resource: AudioResource },
    Failed { ticket: Ticket, reason: String },
    Clear,
}

/// Outcome of applying one event.
#[derive(Debug)]
pub struct Transition {
    pub state: PlaybackState,
    /// Handles the owner must release now
    pub released: Vec<AudioResource>,
    /// The event did not belong to the current request and was ignored
    pub stale: bool,
}

impl Transition {
    fn to(state: PlaybackState) -> Self {
        Self {
            state,
            released: Vec::new(),
            stale: false,
        }
    }

    fn releasing(state: PlaybackState, released: Option<AudioResource>) -> Self {
        Self {
            state,
            released: released.into_iter().collect(),
            stale: false,
        }
    }

    fn ignored(state: PlaybackState, released: Option<AudioResource>) -> Self {
        Self {
            state,
            released: released.into_iter().collect(),
            stale: true,
        }
    }
}

impl PlaybackState {
    pub fn apply(self, event: PlaybackEvent) -> Transition {
        use PlaybackEvent as E;
        use PlaybackState as S;

        match (self, event) {
            (S::Loading { previous, .. }, E::Submit { ticket }) => {
                Transition::to(S::Loading { ticket, previous })
            }
            (S::Ready(resource), E::Submit { ticket }) => Transition::to(S::Loading {
                ticket,
                previous: Some(resource),
            }),
            (S::Idle | S::Error { .. }, E::Submit { ticket }) => Transition::to(S::Loading {
                ticket,
                previous: None,
            }),

            (S::Loading { ticket: current, previous }, E::Succeeded { ticket, resource })
                if ticket == current =>
            {
                Transition::releasing(S::Ready(resource), previous)
            }
            (S::Loading { ticket: current, previous }, E::Failed { ticket, reason })
                if ticket == current =>
            {
                Transition::releasing(S::Error { reason }, previous)
            }
            (state, E::Succeeded { resource, .. }) => Transition::ignored(state, Some(resource)),
            (state, E::Failed { .. }) => Transition::ignored(state, None),

            (S::Ready(resource), E::Clear) => Transition::releasing(S::Idle, Some(resource)),
            (S::Error { .. }, E::Clear) => Transition::to(S::Idle),
            (state @ (S::Idle | S::Loading { .. }), E::Clear) => Transition::to(state),
        }
    }

    pub fn kind(&self) -> StateKind {
        match self {
            PlaybackState::Idle => StateKind::Idle,
            PlaybackState::Loading { .. } => StateKind::Loading,
            PlaybackState::Ready(_) => StateKind::Ready,
            PlaybackState::Error { .. } => StateKind::Error,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PlaybackState::Loading { .. })
    }

    /// Ticket of the request in flight, if any.
    pub fn current_ticket(&self) -> Option<Ticket> {
        match self {
            PlaybackState::Loading { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    pub fn ready_resource(&self) -> Option<&AudioResource> {
        match self {
            PlaybackState::Ready(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            kind: self.kind(),
            ticket: self.current_ticket(),
            resource: self.ready_resource().map(ResourceView::from),
            reason: match self {
                PlaybackState::Error { reason } => Some(reason.clone()),
                _ => None,
            },
            can_submit: !self.is_loading(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    Idle,
    Loading,
    Ready,
    Error,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub kind: StateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub can_submit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub id: ResourceId,
    pub url: String,
    pub media_type: String,
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl From<&AudioResource> for ResourceView {
    fn from(resource: &AudioResource) -> Self {
        Self {
            id: resource.id(),
            url: resource.url(),
            media_type: resource.media_type().to_string(),
            bytes: resource.byte_len(),
            duration_ms: resource.duration().map(|d| d.as_millis() as u64),
        }
    }
}
