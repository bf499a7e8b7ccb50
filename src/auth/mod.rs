pub mod password;
pub mod policy;
pub mod principal;
pub mod token;

pub use password::{hash_password, verify_dummy_password, verify_password};
pub use policy::{Action, Scope};
pub use principal::Principal;
pub use token::TokenIssuer;
