pub mod ext;
pub mod response;
pub mod status_code;

// Publicly re-export all error types and functions from the submodules to
// simplify access from external code.
pub use ext::*;
pub use response::*;
pub use status_code::*;
