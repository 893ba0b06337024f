//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external
//! dependencies.

mod credentials;
pub mod forms;
mod identity;
mod location;
pub mod result;
mod session;

pub use credentials::{
    LoginRequest, SignupRequest, DEMO_ADDRESS, DEMO_EMAIL, DEMO_ID, DEMO_NAME, DEMO_PASSWORD,
    DEMO_PHONE, MIN_PASSWORD_LEN,
};
pub use forms::{FieldError, FormErrors, FormField};
pub use identity::{generate_identity_id, Identity};
pub use location::{GeolocationError, Position, PositionOptions};
pub use session::{
    registered_user_key, AuthSuccess, RestoreOutcome, SessionState, AUTH_TOKEN_KEY,
    CURRENT_USER_KEY,
};
