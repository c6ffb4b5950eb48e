//! EntryChangeNotification control (persistent search)
//!
//! ```text
//! EntryChangeNotification ::= SEQUENCE {
//!     changeType ENUMERATED {
//!         add    (1),
//!         delete (2),
//!         modify (4),
//!         modDN  (8)
//!     },
//!     previousDN   LDAPDN OPTIONAL,  -- modifyDN ops. only
//!     changeNumber INTEGER OPTIONAL
//! }
//! ```

mod control;
mod grammar;

pub use control::{ChangeType, EntryChangeControl};
pub use grammar::EntryChangeState;
