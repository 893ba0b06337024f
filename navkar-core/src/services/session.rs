//! Session store - the authenticated identity and its persisted record
//!
//! Holds the current Session State, fans changes out to subscribers and
//! keeps the persisted record (`currentUser` + `authToken`) in step with it.
//! The persisted record is always either a complete, readable pair or
//! absent.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::result::AuthError;
use crate::domain::{
    registered_user_key, AuthSuccess, Identity, LoginRequest, RestoreOutcome, SessionState,
    SignupRequest, AUTH_TOKEN_KEY, CURRENT_USER_KEY, MIN_PASSWORD_LEN,
};
use crate::ports::{CredentialVerifier, KeyValueStore};
use crate::services::logging::{record, LogEvent, LogFlow, LoggingService};
use crate::services::observable::{Observable, SubscriptionId};

const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";
const SIGNUP_SUCCESS_MESSAGE: &str = "Account created successfully!";

/// Opaque session token, unique per call
fn generate_token() -> String {
    format!("mock-jwt-token-{}", Uuid::new_v4().simple())
}

/// Clears the in-flight flag when a login/signup finishes or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AuthError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| AuthError::RequestInFlight)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// State changes waiting to reach observers, delivered in order by
/// whichever caller is currently dispatching
#[derive(Default)]
struct Deliveries {
    pending: VecDeque<SessionState>,
    dispatching: bool,
}

/// Hands dispatching back if an observer panics mid-delivery
struct DispatchGuard<'a>(&'a Mutex<Deliveries>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let mut deliveries = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        deliveries.dispatching = false;
    }
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    verifier: Arc<dyn CredentialVerifier>,
    logger: Option<Arc<LoggingService>>,
    state: Mutex<SessionState>,
    deliveries: Mutex<Deliveries>,
    identity: Observable<Option<Identity>>,
    logged_in: Observable<bool>,
    in_flight: AtomicBool,
}

impl SessionStore {
    /// Create a store and restore any persisted session
    pub fn open(
        storage: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn CredentialVerifier>,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        let store = Self {
            storage,
            verifier,
            logger,
            state: Mutex::new(SessionState::signed_out()),
            deliveries: Mutex::new(Deliveries::default()),
            identity: Observable::new(None),
            logged_in: Observable::new(false),
            in_flight: AtomicBool::new(false),
        };
        store.restore();
        store
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log(&self, event: LogEvent) {
        record(self.logger.as_deref(), event);
    }

    fn lock_deliveries(&self) -> MutexGuard<'_, Deliveries> {
        self.deliveries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the state, then notify identity observers followed by
    /// login-flag observers. No lock is held while observers run.
    ///
    /// Changes are queued in the order they were applied. A change made
    /// while observers are running (from an observer or another thread) is
    /// delivered after the current one has reached both streams, so the
    /// last values observers see always match the store.
    fn set_state(&self, state: SessionState) {
        let dispatch = {
            let mut current = self.lock_state();
            *current = state.clone();
            let mut deliveries = self.lock_deliveries();
            deliveries.pending.push_back(state);
            !std::mem::replace(&mut deliveries.dispatching, true)
        };
        if !dispatch {
            return;
        }

        let guard = DispatchGuard(&self.deliveries);
        loop {
            let next = {
                let mut deliveries = self.lock_deliveries();
                match deliveries.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        // Emptied and released under one lock, so no change is stranded
                        deliveries.dispatching = false;
                        break;
                    }
                }
            };
            self.identity.publish(next.identity().cloned());
            self.logged_in.publish(next.is_logged_in());
        }
        std::mem::forget(guard);
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.lock_state().identity().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock_state().is_logged_in()
    }

    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    /// Name of the credential backend in use
    pub fn verifier_name(&self) -> &str {
        self.verifier.name()
    }

    pub fn subscribe_identity<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Option<Identity>) + Send + Sync + 'static,
    {
        self.identity.subscribe(observer)
    }

    pub fn subscribe_logged_in<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.logged_in.subscribe(observer)
    }

    pub fn unsubscribe_identity(&self, id: SubscriptionId) -> bool {
        self.identity.unsubscribe(id)
    }

    pub fn unsubscribe_logged_in(&self, id: SubscriptionId) -> bool {
        self.logged_in.unsubscribe(id)
    }

    /// Read the persisted record into the Session State
    ///
    /// A readable pair is restored (observers notified once). A corrupt or
    /// incomplete record is cleared through `logout`.
    pub fn restore(&self) -> RestoreOutcome {
        let user = self.storage.get(CURRENT_USER_KEY);
        let token = self.storage.get(AUTH_TOKEN_KEY);

        let (user, token) = match (user, token) {
            (Ok(user), Ok(token)) => (user, token),
            (Err(e), _) | (_, Err(e)) => {
                // Unreadable storage: stay signed out, leave the record alone
                self.log(
                    LogEvent::new(LogFlow::Session, "session_restore_failed")
                        .with_error("storage", e.to_string()),
                );
                return RestoreOutcome {
                    identity: None,
                    corruption_error: None,
                };
            }
        };

        let corruption = match (user, token) {
            (None, None) => return RestoreOutcome::default(),
            (Some(user), Some(_token)) => match serde_json::from_str::<Identity>(&user) {
                Ok(identity) => {
                    self.set_state(SessionState::signed_in(identity.clone()));
                    self.log(LogEvent::new(LogFlow::Session, "session_restored"));
                    return RestoreOutcome {
                        identity: Some(identity),
                        corruption_error: None,
                    };
                }
                Err(e) => e.to_string(),
            },
            (Some(_), None) => "session token missing".to_string(),
            (None, Some(_)) => "session identity missing".to_string(),
        };

        self.log(
            LogEvent::new(LogFlow::Session, "session_corrupt_cleared")
                .with_error("storage_corruption", corruption.clone()),
        );
        self.logout();
        RestoreOutcome {
            identity: None,
            corruption_error: Some(corruption),
        }
    }

    /// Write `entries` in order; on failure remove whatever was written
    fn persist(&self, entries: &[(&str, &str)]) -> Result<(), AuthError> {
        for (i, (key, value)) in entries.iter().enumerate() {
            if let Err(e) = self.storage.set(key, value) {
                for (written, _) in &entries[..i] {
                    let _ = self.storage.remove(written);
                }
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Log in against the credential verifier
    ///
    /// On failure nothing is persisted and the Session State is unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let request = LoginRequest::new(email, password);

        let result = self.complete_login(&request).await;
        match &result {
            Ok(_) => self.log(LogEvent::new(LogFlow::Login, "login_succeeded")),
            Err(e) => self.log(
                LogEvent::new(LogFlow::Login, "login_failed")
                    .with_error(e.code(), e.to_string()),
            ),
        }
        result
    }

    async fn complete_login(&self, request: &LoginRequest) -> Result<AuthSuccess, AuthError> {
        let identity = self.verifier.authenticate(request).await?;
        let token = generate_token();

        let user_json = serde_json::to_string(&identity)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.persist(&[(CURRENT_USER_KEY, user_json.as_str()), (AUTH_TOKEN_KEY, token.as_str())])?;

        self.set_state(SessionState::signed_in(identity.clone()));
        Ok(AuthSuccess {
            message: LOGIN_SUCCESS_MESSAGE.to_string(),
            identity,
            token,
        })
    }

    /// Create an account and sign it in
    ///
    /// Checked in order after the verifier's delay: password confirmation,
    /// password length, then e-mail uniqueness. Nothing is written unless
    /// all three pass.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthSuccess, AuthError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let result = self.complete_signup(request).await;
        match &result {
            Ok(_) => self.log(LogEvent::new(LogFlow::Signup, "signup_succeeded")),
            Err(e) => self.log(
                LogEvent::new(LogFlow::Signup, "signup_failed")
                    .with_error(e.code(), e.to_string()),
            ),
        }
        result
    }

    async fn complete_signup(&self, request: &SignupRequest) -> Result<AuthSuccess, AuthError> {
        let id = self.verifier.register(request).await?;

        if !request.passwords_match() {
            return Err(AuthError::PasswordMismatch);
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        let user_key = registered_user_key(&request.email);
        if self.storage.contains(&user_key)? {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let identity = Identity::new(id, &request.name, &request.email, &request.phone)
            .with_address(request.address.as_deref());
        let token = generate_token();

        let user_json = serde_json::to_string(&identity)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.persist(&[
            (CURRENT_USER_KEY, user_json.as_str()),
            (AUTH_TOKEN_KEY, token.as_str()),
            (user_key.as_str(), user_json.as_str()),
        ])?;

        self.set_state(SessionState::signed_in(identity.clone()));
        Ok(AuthSuccess {
            message: SIGNUP_SUCCESS_MESSAGE.to_string(),
            identity,
            token,
        })
    }

    /// Drop the session record and sign out. Never fails.
    ///
    /// Registration records (`user_<email>`) are kept.
    pub fn logout(&self) {
        for key in [CURRENT_USER_KEY, AUTH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                self.log(
                    LogEvent::new(LogFlow::Session, "logout_storage_failed")
                        .with_error("storage", e.to_string()),
                );
            }
        }
        self.set_state(SessionState::signed_out());
        self.log(LogEvent::new(LogFlow::Session, "logout"));
    }
}
