//! Authentication: password hashing, JWT issuance and verification, the
//! bearer-token middleware and the `CurrentUser` extractor.

pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

pub use extractors::{get_current_user, CurrentUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};
