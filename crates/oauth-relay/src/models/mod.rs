//! Data models exchanged with the OAuth provider and served to callers.

mod token;

pub use token::{Token, TokenErrorResponse, TokenResponse};
