//! Request middleware: admin authentication and the registration gate

pub mod admin_token;
pub mod registration_gate;

pub use admin_token::{admin_token_middleware, ADMIN_TOKEN_HEADER};
pub use registration_gate::registration_gate_middleware;
