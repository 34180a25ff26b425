//! Session domain module.
//!
//! - `token`: the backend bearer token and its claims
//! - `model`: the committed `Session`

mod model;
mod token;

pub use model::Session;
pub use token::{AuthToken, TokenClaims, TokenStatus};
