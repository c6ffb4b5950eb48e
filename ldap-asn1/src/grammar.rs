//! Grammar state tables
//!
//! A grammar lists every legal (state, tag) pair of one ASN.1 structure and
//! what happens when it is seen: the next state, an optional action storing
//! the decoded value into the control, and whether the message may end
//! there. A grammar is built once, stored in a `static`, and shared read-only
//! by every container decoding that control.
//!
//! ```text
//! (state, tag) --lookup--> Transition { to, action, end_allowed }
//! ```

use ldap_core::error::DecodeResult;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::ber::tlv::Tlv;

/// State identifier of a grammar
///
/// Implemented by a small fieldless enum per control. `START` is the state a
/// fresh container begins in.
pub trait GrammarState: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Initial state
    const START: Self;
}

/// Semantic action run when a transition fires
///
/// Receives the control under construction and the TLV that triggered the
/// transition. Constructed TLVs carry no value bytes.
pub type GrammarAction<T> = fn(&mut T, &Tlv) -> DecodeResult<()>;

/// One legal step of a grammar
pub struct Transition<S, T> {
    from: S,
    tag: u8,
    to: S,
    description: &'static str,
    action: Option<GrammarAction<T>>,
    end_allowed: bool,
}

impl<S: GrammarState, T> Transition<S, T> {
    /// Create a transition with no action, after which the grammar may not end
    pub fn new(from: S, tag: u8, to: S, description: &'static str) -> Self {
        Self {
            from,
            tag,
            to,
            description,
            action: None,
            end_allowed: false,
        }
    }

    /// Attach the action run when the transition fires
    pub fn with_action(mut self, action: GrammarAction<T>) -> Self {
        self.action = Some(action);
        self
    }

    /// Allow the message to end right after this transition
    pub fn end_allowed(mut self) -> Self {
        self.end_allowed = true;
        self
    }

    /// Run the action, if any, against the control
    pub fn apply(&self, control: &mut T, tlv: &Tlv) -> DecodeResult<()> {
        match self.action {
            Some(action) => action(control, tlv),
            None => Ok(()),
        }
    }

    /// Source state
    pub fn from(&self) -> S {
        self.from
    }

    /// Tag byte triggering the transition
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Target state
    pub fn to(&self) -> S {
        self.to
    }

    /// Human readable description used in logs
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Whether the message may end after this transition
    pub fn is_end_allowed(&self) -> bool {
        self.end_allowed
    }
}

impl<S: GrammarState, T> fmt::Debug for Transition<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("tag", &format_args!("0x{:02X}", self.tag))
            .field("to", &self.to)
            .field("description", &self.description)
            .field("end_allowed", &self.end_allowed)
            .finish()
    }
}

/// Immutable transition table of one control
pub struct Grammar<S, T> {
    name: &'static str,
    transitions: HashMap<(S, u8), Transition<S, T>>,
}

impl<S: GrammarState, T> Grammar<S, T> {
    /// Start building a grammar
    pub fn builder(name: &'static str) -> GrammarBuilder<S, T> {
        GrammarBuilder {
            name,
            transitions: HashMap::new(),
        }
    }

    /// Look up the transition for `tag` in `state`
    ///
    /// `None` means the tag is illegal in that state.
    pub fn transition(&self, state: S, tag: u8) -> Option<&Transition<S, T>> {
        self.transitions.get(&(state, tag))
    }

    /// Grammar name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of transitions
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if the grammar has no transitions
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

impl<S: GrammarState, T> fmt::Debug for Grammar<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}

/// Builder collecting the transitions of a grammar
pub struct GrammarBuilder<S, T> {
    name: &'static str,
    transitions: HashMap<(S, u8), Transition<S, T>>,
}

impl<S: GrammarState, T> GrammarBuilder<S, T> {
    /// Add a transition
    ///
    /// A (state, tag) pair has at most one transition; adding a second one
    /// for the same pair replaces the first.
    pub fn add(mut self, transition: Transition<S, T>) -> Self {
        let key = (transition.from, transition.tag);
        let previous = self.transitions.insert(key, transition);
        debug_assert!(
            previous.is_none(),
            "duplicate transition in {} for {:?}",
            self.name,
            key
        );
        self
    }

    /// Freeze the table
    pub fn build(self) -> Grammar<S, T> {
        Grammar {
            name: self.name,
            transitions: self.transitions,
        }
    }
}

/// A control decodable by a grammar
///
/// Implementors provide the shared grammar; the container starts from
/// `Default::default()` and lets the grammar actions fill the fields in.
pub trait Decodable: Default + Sized + 'static {
    /// State identifier of the grammar
    type State: GrammarState;

    /// The shared grammar instance
    fn grammar() -> &'static Grammar<Self::State, Self>;
}
