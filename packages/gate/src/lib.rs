// ABOUTME: Registration gate for single-use registration links
// ABOUTME: Classifies requests, validates or consumes tokens, and returns an admit/reject outcome

pub mod errors;
pub mod gate;
pub mod hooks;
pub mod links;
pub mod request;

pub use errors::{GateError, GateErrorEntry, GateErrorKind, GateErrors};
pub use gate::{classify, Admission, GateOutcome, GateState, IssuedLink, RegistrationGate};
pub use hooks::{GateHooks, NoHooks};
pub use links::RegistrationUrl;
pub use request::{GateRequest, PageRequest, RequestMethod, REGISTER_ACTION};
