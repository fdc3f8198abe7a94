// Public API - what other modules can use
pub use access::{ensure_patient_access, require_fono};
pub use middleware::jwt_auth;
pub use token::TokenConfig;
pub use types::{AuthContext, Role};

// Internal modules
mod access;
mod middleware;
mod token;
mod types;
