pub mod identity;
pub mod logging;

pub use identity::{require_identity, CurrentUser};
pub use logging::log_requests;
