//! Per-message decode context

use ldap_core::error::{DecodeError, DecodeResult};

use crate::ber::tlv::Tlv;
use crate::config::DecoderConfig;
use crate::grammar::{Decodable, Grammar, GrammarState};

/// Result of feeding bytes to a container
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// All bytes were consumed and the control is not finished yet
    NeedMoreData,
    /// The control is complete
    Complete(T),
    /// Decoding failed; the message must be discarded
    Failed(DecodeError),
}

impl<T> ParseOutcome<T> {
    /// Check if the control is complete
    pub fn is_complete(&self) -> bool {
        matches!(self, ParseOutcome::Complete(_))
    }

    /// Check if decoding failed
    pub fn is_failed(&self) -> bool {
        matches!(self, ParseOutcome::Failed(_))
    }
}

/// Which part of the current TLV the next byte belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TlvPhase {
    Tag,
    Length,
    Value,
    /// The message completed or failed; `clean()` is required before reuse
    End,
}

/// Remaining length budgets of the open TLVs, outermost first
///
/// Every byte read is charged to every open level. A level whose budget
/// reaches zero is closed by `pop_exhausted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStack {
    remaining: Vec<usize>,
}

impl ParseStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a level of `length` bytes
    ///
    /// # Error Handling
    /// Returns `LengthOverflow` if `length` exceeds the budget left in the
    /// enclosing level.
    pub fn push(&mut self, length: usize) -> DecodeResult<()> {
        if let Some(&available) = self.remaining.last() {
            if length > available {
                return Err(DecodeError::LengthOverflow { length, available });
            }
        }
        self.remaining.push(length);
        Ok(())
    }

    /// Charge `n` bytes to every open level
    ///
    /// # Error Handling
    /// Returns `LengthOverflow` if any level has less than `n` bytes left.
    pub fn consume(&mut self, n: usize) -> DecodeResult<()> {
        if let Some(&available) = self.remaining.iter().min() {
            if n > available {
                return Err(DecodeError::LengthOverflow { length: n, available });
            }
        }
        for level in self.remaining.iter_mut() {
            *level -= n;
        }
        Ok(())
    }

    /// Close every exhausted level, innermost first
    ///
    /// # Returns
    /// The number of levels closed
    pub fn pop_exhausted(&mut self) -> usize {
        let mut popped = 0;
        while self.remaining.last() == Some(&0) {
            self.remaining.pop();
            popped += 1;
        }
        popped
    }

    /// Budget left in the innermost level
    pub fn top(&self) -> Option<usize> {
        self.remaining.last().copied()
    }

    /// Number of open levels
    pub fn depth(&self) -> usize {
        self.remaining.len()
    }

    /// Check if no level is open
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Close all levels
    pub fn clear(&mut self) {
        self.remaining.clear();
    }
}

/// Mutable parse context for one control value
///
/// Owns the control under construction, the TLV being assembled and the
/// parse stack; borrows the shared grammar of `T`. Bytes are fed with
/// `feed` (see the `decoder` module) in as many pieces as the transport
/// delivers them.
///
/// # Example
///
/// ```rust,ignore
/// let mut container = Asn1Container::<SyncRequestValueControl>::new();
/// match container.feed(&bytes) {
///     ParseOutcome::Complete(control) => println!("{}", control),
///     ParseOutcome::NeedMoreData => { /* wait for more bytes */ }
///     ParseOutcome::Failed(e) => eprintln!("{}", e),
/// }
/// ```
pub struct Asn1Container<T: Decodable> {
    pub(crate) grammar: &'static Grammar<T::State, T>,
    pub(crate) config: DecoderConfig,
    pub(crate) state: T::State,
    pub(crate) phase: TlvPhase,
    pub(crate) tlv: Tlv,
    pub(crate) stack: ParseStack,
    pub(crate) control: T,
    pub(crate) end_allowed: bool,
    pub(crate) consumed: usize,
}

impl<T: Decodable> Asn1Container<T> {
    /// Create a container with the default configuration
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a container with an explicit configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            grammar: T::grammar(),
            config,
            state: T::State::START,
            phase: TlvPhase::Tag,
            tlv: Tlv::default(),
            stack: ParseStack::new(),
            control: T::default(),
            end_allowed: false,
            consumed: 0,
        }
    }

    /// Reset all parse state so the container can decode another message
    pub fn clean(&mut self) {
        self.state = T::State::START;
        self.phase = TlvPhase::Tag;
        self.tlv = Tlv::default();
        self.stack.clear();
        self.control = T::default();
        self.end_allowed = false;
        self.consumed = 0;
    }

    /// Current grammar state
    pub fn state(&self) -> T::State {
        self.state
    }

    /// Whether the grammar may legally end in the current state
    pub fn is_end_allowed(&self) -> bool {
        self.end_allowed
    }

    /// The control built so far
    pub fn control(&self) -> &T {
        &self.control
    }

    /// The TLV being assembled (or the last one fired)
    pub fn current_tlv(&self) -> &Tlv {
        &self.tlv
    }

    /// Length budgets of the open TLVs
    pub fn stack(&self) -> &ParseStack {
        &self.stack
    }

    /// Total number of bytes consumed
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// The configuration in use
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Name of the grammar driving this container
    pub fn grammar_name(&self) -> &'static str {
        self.grammar.name()
    }

    /// Check whether the last message completed or failed
    pub fn is_finished(&self) -> bool {
        self.phase == TlvPhase::End
    }
}

impl<T: Decodable> Default for Asn1Container<T> {
    fn default() -> Self {
        Self::new()
    }
}
