//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod auth_flow;
pub mod location;
pub mod logging;
pub mod migration;
pub mod observable;
mod session;

pub use auth_flow::{AuthEvent, AuthFlowController, AuthView, FormState, SubmitOutcome};
pub use location::{LocationService, LocationStatus};
pub use logging::{
    now_ms, FailureCount, LogEntry, LogEvent, LogFlow, LogQuery, LogSource, LoggingService,
};
pub use migration::MigrationResult;
pub use observable::{Observable, SubscriptionId};
pub use session::SessionStore;
