pub mod extract;
pub mod password;
pub mod token;

pub use extract::{AuthFailure, AuthUser, resolve_bearer};
