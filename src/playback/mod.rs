pub mod controller;
pub mod resource;
pub mod state;

pub use controller::{InFlightPolicy, PlaybackController, Submission, SubmitError, DEFAULT_TIMEOUT};
pub use resource::{AudioResource, ResourceId, ResourceStore};
pub use state::{PlaybackEvent, PlaybackSnapshot, PlaybackState, StateKind, Ticket, Transition};
