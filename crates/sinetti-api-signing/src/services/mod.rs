//! Signing flow services.

pub mod authorize;
pub mod cosign;
pub mod finalize;
pub mod notify;
pub mod stamp;
pub mod storage;
pub mod token;

pub use authorize::{AuthorizeService, InitiatedAuth, ProviderConfig};
pub use cosign::{CosignOutcome, CosignService};
pub use finalize::FinalizeService;
pub use notify::{HttpNotifier, Notifier, RecordingNotifier};
pub use stamp::{AuditStamp, DocumentStamper, TextBlockStamper};
pub use storage::{InMemoryStorage, ObjectStorage};
pub use token::{TokenService, VerifiedIdentity, UNKNOWN_SIGNER};
