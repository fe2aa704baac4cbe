//! Parameter form controller.
//!
//! Holds the user's current generation options and enforces the active
//! profile's bounds at the point of mutation.
//!
//! # Validation policy
//!
//! Setters never fail. An out-of-range candidate is discarded and the previous
//! value kept; the setter's `bool` return says whether the value was applied.
//!
//! # Submission lifecycle
//!
//! ```text
//!            submit()                      complete(ticket, Ok)
//!   [Idle] ──────────> [Submitting] ─────────────────────────> [Idle + story]
//!     ^                    │   │
//!     │                    │   │ complete(ticket, Err)
//!     │                    │   └─────────────────────────────> [Idle + error]
//!     │     submit()       │
//!     │   (no-op, None)  <─┘
//!     │
//!  dispose(): invalidates every outstanding ticket
//! ```
//!
//! A ticket that is dropped without being completed (for example when the
//! caller wraps the submission in `tokio::time::timeout`) abandons its
//! submission, and the next `submit()` starts a fresh one.

use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use crate::error::{PlaygroundError, Result, USER_FACING_ERROR};
use crate::models::{ModelProfile, ModelRegistry};
use crate::story::{GenerationRequest, StoryLength, StoryResponse, CHARACTER_RANGE};
use crate::transport::StoryTransport;

/// Current values of the form's fields
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// Story theme (unset = chosen by the service)
    pub theme: Option<String>,
    /// Story genre (unset = chosen by the service)
    pub genre: Option<String>,
    /// Number of main characters, 1-10
    pub characters: u8,
    /// Target length
    pub length: StoryLength,
    /// Sampling temperature, inside the active profile's range
    pub temperature: f64,
    /// Maximum output tokens, inside the active profile's range
    pub max_tokens: u32,
}

impl FormState {
    /// Initial state for `profile`
    pub fn for_profile(profile: &ModelProfile) -> Self {
        Self {
            theme: None,
            genre: None,
            characters: CHARACTER_RANGE.default,
            length: StoryLength::default(),
            temperature: profile.temperature_range.default,
            max_tokens: profile.max_token_range.default,
        }
    }

    /// Copy the fields into a request
    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            theme: self.theme.clone(),
            genre: self.genre.clone(),
            characters: self.characters,
            length: self.length,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            model_id: None,
        }
    }
}

/// Handle for one in-flight submission.
///
/// Returned by [`ParameterForm::submit`] and handed back to
/// [`ParameterForm::complete`] with the outcome.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    generation: u64,
    request: GenerationRequest,
    /// Keeps the submission alive; the form holds the weak side
    _alive: Arc<()>,
}

impl SubmitTicket {
    /// The snapshot to send
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Submission counter value this ticket was issued under
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Story parameter form bound to a model registry.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use playground::{ModelRegistry, ParameterForm};
///
/// let mut form = ParameterForm::new(Arc::new(ModelRegistry::new()));
/// assert_eq!(form.state().temperature, 0.5);
///
/// assert!(!form.set_temperature(1.5));
/// assert_eq!(form.state().temperature, 0.5);
///
/// assert!(form.set_temperature(0.8));
/// assert_eq!(form.state().temperature, 0.8);
/// ```
#[derive(Debug)]
pub struct ParameterForm {
    registry: Arc<ModelRegistry>,
    profile: ModelProfile,
    state: FormState,
    /// Set while a submission is outstanding; dead once every ticket clone is dropped
    in_flight: Option<Weak<()>>,
    last_error: Option<String>,
    last_story: Option<StoryResponse>,
    /// Bumped on every submit and on dispose; stale tickets never match
    generation: u64,
    disposed: bool,
}

impl ParameterForm {
    /// Create a form using the registry's default profile
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        let profile = registry.default_profile().clone();
        let state = FormState::for_profile(&profile);
        Self {
            registry,
            profile,
            state,
            in_flight: None,
            last_error: None,
            last_story: None,
            generation: 0,
            disposed: false,
        }
    }

    /// Create a form with `model_id` active from the start
    pub fn with_profile(registry: Arc<ModelRegistry>, model_id: &str) -> Result<Self> {
        let profile = registry.lookup(model_id)?.clone();
        let mut form = Self::new(registry);
        form.state = FormState::for_profile(&profile);
        form.profile = profile;
        Ok(form)
    }

    /// Active profile
    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    /// Registry the form selects profiles from
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Current field values
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Whether a submission is in flight
    pub fn is_submitting(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|ticket| ticket.strong_count() > 0)
    }

    /// User-facing message from the last failed submission
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Story from the last successful submission
    pub fn last_story(&self) -> Option<&StoryResponse> {
        self.last_story.as_ref()
    }

    /// Whether the form has been torn down
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Set the temperature if it lies inside the active profile's range.
    pub fn set_temperature(&mut self, candidate: f64) -> bool {
        if !self.profile.temperature_range.contains(candidate) {
            tracing::debug!(
                candidate,
                min = self.profile.temperature_range.min,
                max = self.profile.temperature_range.max,
                "Rejected temperature"
            );
            return false;
        }
        self.state.temperature = candidate;
        true
    }

    /// Set max tokens if it lies inside the active profile's range.
    pub fn set_max_tokens(&mut self, candidate: u32) -> bool {
        if !self.profile.max_token_range.contains(candidate) {
            tracing::debug!(
                candidate,
                min = self.profile.max_token_range.min,
                max = self.profile.max_token_range.max,
                "Rejected max tokens"
            );
            return false;
        }
        self.state.max_tokens = candidate;
        true
    }

    /// Set the character count if it lies in `[1, 10]`.
    pub fn set_characters(&mut self, candidate: u8) -> bool {
        if !CHARACTER_RANGE.contains(candidate) {
            tracing::debug!(candidate, "Rejected character count");
            return false;
        }
        self.state.characters = candidate;
        true
    }

    /// Set the theme; a blank value clears it
    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.state.theme = non_blank(theme.into());
    }

    /// Set the genre; a blank value clears it
    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.state.genre = non_blank(genre.into());
    }

    /// Set the target length
    pub fn set_length(&mut self, length: StoryLength) {
        self.state.length = length;
    }

    /// Make `model_id` the active profile.
    ///
    /// Temperature and max tokens that fall outside the new profile's ranges
    /// are reset to its defaults; values still in range are kept.
    pub fn select_profile(&mut self, model_id: &str) -> Result<()> {
        let profile = self.registry.lookup(model_id)?.clone();

        if !profile.temperature_range.contains(self.state.temperature) {
            tracing::info!(
                model = %profile.model_id,
                from = self.state.temperature,
                to = profile.temperature_range.default,
                "Temperature reset for new profile"
            );
            self.state.temperature = profile.temperature_range.default;
        }
        if !profile.max_token_range.contains(self.state.max_tokens) {
            tracing::info!(
                model = %profile.model_id,
                from = self.state.max_tokens,
                to = profile.max_token_range.default,
                "Max tokens reset for new profile"
            );
            self.state.max_tokens = profile.max_token_range.default;
        }

        self.profile = profile;
        Ok(())
    }

    /// Snapshot the current fields.
    ///
    /// Names the active profile when it is not the registry default.
    pub fn snapshot(&self) -> GenerationRequest {
        let mut request = self.state.to_request();
        if self.profile.model_id != self.registry.default_profile().model_id {
            request.model_id = Some(self.profile.model_id.clone());
        }
        request
    }

    /// Start a submission.
    ///
    /// Returns `Ok(None)` without doing anything while another submission is
    /// in flight. Fails with `InvalidState` when the snapshot does not fit the
    /// active profile or the form has been disposed.
    pub fn submit(&mut self) -> Result<Option<SubmitTicket>> {
        if self.disposed {
            return Err(PlaygroundError::InvalidState(
                "form has been disposed".to_string(),
            ));
        }
        if self.is_submitting() {
            tracing::debug!("Submission already in flight; ignoring submit");
            return Ok(None);
        }
        if self.in_flight.take().is_some() {
            tracing::warn!(
                generation = self.generation,
                "Previous submission was abandoned before completing"
            );
        }

        let request = self.snapshot();
        request
            .validate(&self.profile)
            .map_err(|e| PlaygroundError::InvalidState(format!("snapshot rejected: {e}")))?;

        let alive = Arc::new(());
        self.generation += 1;
        self.in_flight = Some(Arc::downgrade(&alive));
        self.last_error = None;

        Ok(Some(SubmitTicket {
            generation: self.generation,
            request,
            _alive: alive,
        }))
    }

    /// Apply the outcome of the submission `ticket` was issued for.
    ///
    /// Returns `false` (and changes nothing) when the ticket is stale or the
    /// form has been disposed. Field values are never touched.
    pub fn complete(&mut self, ticket: SubmitTicket, outcome: Result<StoryResponse>) -> bool {
        if self.disposed || !self.is_submitting() || ticket.generation != self.generation {
            tracing::warn!(
                ticket = ticket.generation,
                current = self.generation,
                disposed = self.disposed,
                "Discarding response for stale submission"
            );
            return false;
        }

        self.in_flight = None;
        match outcome {
            Ok(story) => {
                tracing::info!(title = %story.title, "Story generated");
                self.last_error = None;
                self.last_story = Some(story);
            },
            Err(e) => {
                tracing::error!(error = %e, "Story generation failed");
                self.last_error = Some(USER_FACING_ERROR.to_string());
            },
        }
        true
    }

    /// Tear the form down; any response still in flight is discarded.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.in_flight = None;
        self.generation += 1;
    }

    /// Submit and wait for the transport in one step.
    ///
    /// Returns `Ok(false)` when a submission was already in flight.
    pub async fn submit_with<T>(&mut self, transport: &T) -> Result<bool>
    where
        T: StoryTransport + ?Sized,
    {
        let Some(ticket) = self.submit()? else {
            return Ok(false);
        };
        let outcome = transport.send(ticket.request()).await;
        Ok(self.complete(ticket, outcome))
    }
}

/// Submit a shared form without holding its lock across the network call.
///
/// Concurrent callers see the in-flight flag and return `Ok(false)` without
/// reaching the transport.
pub async fn run_submission<T>(form: &Mutex<ParameterForm>, transport: &T) -> Result<bool>
where
    T: StoryTransport + ?Sized,
{
    let Some(ticket) = form.lock().await.submit()? else {
        return Ok(false);
    };

    tracing::debug!(
        generation = ticket.generation(),
        transport = transport.name(),
        "Submitting"
    );
    let outcome = transport.send(ticket.request()).await;

    Ok(form.lock().await.complete(ticket, outcome))
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
