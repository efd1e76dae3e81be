//! Wire protocol types for the docferry backend API.
//!
//! The backend speaks JSON with camelCase field names. Chunk bytes travel
//! base64-encoded inside the JSON body, and every response is wrapped in the
//! [`ApiResponse`] envelope.

mod envelope;
mod error_body;
mod messages;
mod types;

pub use envelope::ApiResponse;
pub use error_body::{extract_message, message_from_body};
pub use messages::{ChunkUploadRequest, FinalizeRequest};
pub use types::{DocumentMetadata, FinalizeData};
