pub mod cookie;
pub mod datetime;
pub mod jwt;
pub mod password;
pub mod validation;

pub use jwt::{encode_access_token, encode_refresh_token};
pub use password::{hash_password, verify_password};
