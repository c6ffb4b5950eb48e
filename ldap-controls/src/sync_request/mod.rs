//! SyncRequestValue control (RFC 4533)
//!
//! ```text
//! syncRequestValue ::= SEQUENCE {
//!     mode ENUMERATED {
//!         -- 0 unused
//!         refreshOnly       (1),
//!         -- 2 reserved
//!         refreshAndPersist (3)
//!     },
//!     cookie     syncCookie OPTIONAL,
//!     reloadHint BOOLEAN DEFAULT FALSE
//! }
//! ```

mod control;
mod grammar;

pub use control::{SyncRequestValueControl, SynchronizationModes};
pub use grammar::SyncRequestValueState;
