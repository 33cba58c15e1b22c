//! chat-core
//!
//! Pure chat session logic:
//! - color palette for telling users apart
//! - session records (name, color, outbound channel)
//! - the concurrency-safe session registry

pub mod color;
pub mod error;
pub mod registry;
pub mod session;

pub use color::{ColorCode, PALETTE};
pub use error::RegistryError;
pub use registry::SessionRegistry;
pub use session::{Session, SessionRx, SessionTx, MAX_USERNAME_LEN};
