pub mod bulk;
pub mod campaign;
pub mod credential_resolver;
pub mod dispatcher;
pub mod session_window;

pub use bulk::{BulkOutcome, BulkSendCoordinator, NoopObserver, SendObserver};
pub use campaign::CampaignOrchestrator;
pub use credential_resolver::CredentialResolver;
pub use dispatcher::{DispatchResult, MessageDispatcher, SendKind, SendRequest};
pub use session_window::SessionWindowTracker;
