//! SyncInfoValue intermediate response (RFC 4533)
//!
//! ```text
//! syncInfoValue ::= CHOICE {
//!     newcookie      [0] syncCookie,
//!     refreshDelete  [1] SEQUENCE {
//!         cookie         syncCookie OPTIONAL,
//!         refreshDone    BOOLEAN DEFAULT TRUE
//!     },
//!     refreshPresent [2] SEQUENCE {
//!         cookie         syncCookie OPTIONAL,
//!         refreshDone    BOOLEAN DEFAULT TRUE
//!     },
//!     syncIdSet      [3] SEQUENCE {
//!         cookie         syncCookie OPTIONAL,
//!         refreshDeletes BOOLEAN DEFAULT FALSE,
//!         syncUUIDs      SET OF syncUUID
//!     }
//! }
//! ```

mod control;
mod grammar;

pub use control::{SyncInfoValueControl, SynchronizationInfo, UUID_LENGTH};
pub use grammar::SyncInfoValueState;
