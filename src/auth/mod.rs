//! Bearer credential verification and the claim set it yields.

pub mod identity;
pub mod verifier;

pub use identity::Identity;
pub use verifier::{JwtVerifier, TokenVerifier};
