//! Handlers for the three kinds of lpac message
//!
//! Each handler decodes its envelope's payload and performs the one side effect
//! that kind calls for. Any error returned here ends the session.

pub mod apdu;
pub mod lpa;
pub mod progress;

pub use apdu::handle_apdu;
pub use lpa::handle_lpa;
pub use progress::handle_progress;
