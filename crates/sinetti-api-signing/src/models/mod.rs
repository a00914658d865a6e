//! Request, response, and provider wire types.

mod requests;
mod responses;
mod wire;

pub use requests::{CallbackRequest, CreateDocumentRequest, InitAuthRequest};
pub use responses::{
    CallbackResponse, CallbackStatus, CreateDocumentResponse, DocumentStatusResponse,
    InitAuthResponse,
};
pub use wire::{PaymentEvent, PaymentEventData, PaymentIntent, PaymentMetadata, ParResponse, TokenResponse};
