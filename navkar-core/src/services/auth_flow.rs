//! Auth flow controller - the sign-in modal's view and form state
//!
//! Drives the three-way view (login, signup, closed), the per-form
//! transient state and the events the hosting UI reacts to. All session
//! changes go through the [`SessionStore`].
//!
//! ```text
//!   Closed --open--> Login <--switch--> Signup
//!     ^                |                  |
//!     +---- close / authenticated (after confirmation delay) ----+
//! ```

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::forms::{validate_login, validate_signup};
use crate::domain::result::AuthError;
use crate::domain::{AuthSuccess, FormErrors, FormField, LoginRequest, SignupRequest};
use crate::services::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthView {
    Closed,
    Login,
    Signup,
}

/// Events for the hosting UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthEvent {
    SwitchedToSignup,
    SwitchedToLogin,
    Closed,
    Authenticated,
}

/// Transient state of one form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub submitting: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    #[serde(skip)]
    touched: BTreeSet<FormField>,
    #[serde(skip)]
    errors: FormErrors,
}

impl FormState {
    fn clear_messages(&mut self) {
        self.error_message = None;
        self.success_message = None;
    }

    fn mark_all_touched(&mut self, fields: &[FormField]) {
        self.touched.extend(fields.iter().copied());
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    /// Inline error for `field`, shown only once the field was touched
    pub fn field_error(&self, field: FormField) -> Option<String> {
        if !self.is_touched(field) {
            return None;
        }
        self.errors.get(field).map(|e| e.message(field))
    }

    /// Form-level mismatch text, shown once the confirmation was touched
    pub fn password_mismatch_error(&self) -> Option<String> {
        (self.errors.password_mismatch && self.is_touched(FormField::ConfirmPassword))
            .then(|| "Passwords do not match".to_string())
    }
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent
    Invalid(FormErrors),
    /// The session store refused the request
    Rejected(AuthError),
    /// Signed in; `Authenticated` and `Closed` follow after the confirmation delay
    Accepted(AuthSuccess),
}

#[derive(Debug)]
struct FlowState {
    view: AuthView,
    login: FormState,
    signup: FormState,
}

pub struct AuthFlowController {
    store: Arc<SessionStore>,
    events: mpsc::UnboundedSender<AuthEvent>,
    state: Arc<Mutex<FlowState>>,
    confirmation_delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AuthFlowController {
    /// Create a controller in the `Closed` view, with its event receiver
    pub fn new(
        store: Arc<SessionStore>,
        confirmation_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<AuthEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            store,
            events,
            state: Arc::new(Mutex::new(FlowState {
                view: AuthView::Closed,
                login: FormState::default(),
                signup: FormState::default(),
            })),
            confirmation_delay,
            pending: Mutex::new(None),
        };
        (controller, receiver)
    }

    fn emit(&self, event: AuthEvent) {
        // A host that dropped its receiver just stops listening
        let _ = self.events.send(event);
    }

    pub fn view(&self) -> AuthView {
        lock(&self.state).view
    }

    pub fn login_form(&self) -> FormState {
        lock(&self.state).login.clone()
    }

    pub fn signup_form(&self) -> FormState {
        lock(&self.state).signup.clone()
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// External trigger that shows the modal
    pub fn open(&self, view: AuthView) {
        lock(&self.state).view = view;
    }

    pub fn switch_to_signup(&self) {
        {
            let mut state = lock(&self.state);
            state.view = AuthView::Signup;
            state.signup.clear_messages();
        }
        self.emit(AuthEvent::SwitchedToSignup);
    }

    pub fn switch_to_login(&self) {
        {
            let mut state = lock(&self.state);
            state.view = AuthView::Login;
            state.login.clear_messages();
        }
        self.emit(AuthEvent::SwitchedToLogin);
    }

    /// Mark a field of the visible form as touched (e.g. on blur)
    pub fn touch(&self, field: FormField) {
        let mut state = lock(&self.state);
        match state.view {
            AuthView::Login => {
                state.login.touched.insert(field);
            }
            AuthView::Signup => {
                state.signup.touched.insert(field);
            }
            AuthView::Closed => {}
        }
    }

    /// Demo account fields for the "use demo credentials" shortcut
    pub fn fill_demo_credentials(&self) -> LoginRequest {
        LoginRequest::demo()
    }

    /// Hide the modal. The session is left as it is.
    pub fn close(&self) {
        lock(&self.state).view = AuthView::Closed;
        self.emit(AuthEvent::Closed);
    }

    pub async fn submit_login(&self, fields: LoginRequest) -> SubmitOutcome {
        let errors = validate_login(&fields);
        {
            let mut state = lock(&self.state);
            state.login.errors = errors.clone();
            if !errors.is_valid() {
                state.login.mark_all_touched(FormField::LOGIN);
                return SubmitOutcome::Invalid(errors);
            }
            state.login.submitting = true;
            state.login.clear_messages();
        }

        let result = self.store.login(&fields.email, &fields.password).await;
        self.finish(result, |state| &mut state.login)
    }

    pub async fn submit_signup(&self, fields: SignupRequest) -> SubmitOutcome {
        let errors = validate_signup(&fields);
        {
            let mut state = lock(&self.state);
            state.signup.errors = errors.clone();
            if !errors.is_valid() {
                state.signup.mark_all_touched(FormField::SIGNUP);
                return SubmitOutcome::Invalid(errors);
            }
            state.signup.submitting = true;
            state.signup.clear_messages();
        }

        let result = self.store.signup(&fields).await;
        self.finish(result, |state| &mut state.signup)
    }

    fn finish(
        &self,
        result: Result<AuthSuccess, AuthError>,
        form: fn(&mut FlowState) -> &mut FormState,
    ) -> SubmitOutcome {
        let mut state = lock(&self.state);
        let form = form(&mut state);
        form.submitting = false;

        match result {
            Ok(success) => {
                form.success_message = Some(success.message.clone());
                drop(state);
                self.schedule_completion();
                SubmitOutcome::Accepted(success)
            }
            Err(e) => {
                form.error_message = Some(e.to_string());
                SubmitOutcome::Rejected(e)
            }
        }
    }

    /// Let the success message show, then emit `Authenticated` and `Closed`
    fn schedule_completion(&self) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let delay = self.confirmation_delay;

        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let was_open = {
                let mut state = lock(&state);
                let was_open = state.view != AuthView::Closed;
                state.view = AuthView::Closed;
                was_open
            };
            let _ = events.send(AuthEvent::Authenticated);
            if was_open {
                let _ = events.send(AuthEvent::Closed);
            }
        });

        if let Some(previous) = lock(&self.pending).replace(handle) {
            previous.abort();
        }
    }

    /// Wait until a scheduled completion has emitted its events
    pub async fn settled(&self) {
        let pending = lock(&self.pending).take();
        if let Some(handle) = pending {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStorage;
    use crate::adapters::mock_verifier::{MockCredentialVerifier, MockLatency};

    fn controller() -> (AuthFlowController, mpsc::UnboundedReceiver<AuthEvent>) {
        let store = SessionStore::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(MockCredentialVerifier::new(MockLatency::default())),
            None,
        );
        AuthFlowController::new(Arc::new(store), Duration::from_millis(1500))
    }

    #[test]
    fn test_untouched_fields_show_no_errors() {
        let form = FormState {
            errors: validate_login(&LoginRequest::new("", "")),
            ..FormState::default()
        };
        assert_eq!(form.field_error(FormField::Email), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_clears_target_form_messages() {
        let (flow, mut events) = controller();
        flow.open(AuthView::Login);

        let outcome = flow
            .submit_login(LoginRequest::new("demo@navkarbesan.com", "wrongpass"))
            .await;
        assert_eq!(outcome, SubmitOutcome::Rejected(AuthError::InvalidCredentials));
        assert!(flow.login_form().error_message.is_some());

        flow.switch_to_signup();
        flow.switch_to_login();
        assert_eq!(flow.view(), AuthView::Login);
        assert_eq!(flow.login_form().error_message, None);

        assert_eq!(events.recv().await, Some(AuthEvent::SwitchedToSignup));
        assert_eq!(events.recv().await, Some(AuthEvent::SwitchedToLogin));
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_reveals_single_field_error() {
        let (flow, _events) = controller();
        let outcome = flow
            .submit_signup(SignupRequest::new("Asha", "asha@x.com", "123", "secret1", "secret1"))
            .await;
        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));

        let form = flow.signup_form();
        assert_eq!(
            form.field_error(FormField::Phone),
            Some("Please enter a valid phone number".to_string())
        );
        assert_eq!(form.field_error(FormField::Name), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_before_confirmation_emits_closed_once() {
        let (flow, mut events) = controller();
        flow.open(AuthView::Login);

        let outcome = flow.submit_login(flow.fill_demo_credentials()).await;
        assert!(matches!(outcome, SubmitOutcome::Accepted(_)));

        flow.close();
        flow.settled().await;

        assert_eq!(events.recv().await, Some(AuthEvent::Closed));
        assert_eq!(events.recv().await, Some(AuthEvent::Authenticated));
        assert!(events.try_recv().is_err());
    }
}
