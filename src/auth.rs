//! Auth-domain identifiers, identities, secrets, and request nonces.

pub mod id;
pub mod identity;
pub mod nonce;
pub mod secret;

pub use id::*;
pub use identity::*;
pub use nonce::*;
pub use secret::*;
