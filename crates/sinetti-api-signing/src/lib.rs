//! sinetti-api-signing: the co-signing protocol engine and HTTP surface.
//!
//! Two parties each authenticate against a strong electronic identity
//! provider (bank-grade OIDC with pushed authorization requests, signed
//! request objects, and private-key client authentication). Their
//! verified names converge on a shared document record; whichever
//! identity callback completes the pair finalizes the document exactly
//! once: stamp, persist, link, notify.
//!
//! # Modules
//!
//! - [`services`] - authorization initiation, token exchange, the
//!   convergence state machine, and the finalizer with its collaborator
//!   seams (storage, stamper, notifier)
//! - [`handlers`] - axum handlers
//! - [`router`] - state wiring and route table
//! - [`models`] - request/response bodies and provider wire formats
//! - [`error`] - `SigningError` and its HTTP mapping

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{SigningError, SigningResult};
pub use router::{create_signing_router, SigningConfig, SigningState};
