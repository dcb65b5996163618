//! Canonical request and response types.
//!
//! The single cross-family shape the dispatcher operates on, independent
//! of any one Bedrock model family's wire format.

mod message;
mod request;
mod response;

pub use message::{Message, Role};
pub use request::GenerateRequest;
pub use response::{FinishReason, GenerateResponse, Usage};
