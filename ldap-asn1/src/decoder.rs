//! Driver loop: feeds bytes through a container, TLV by TLV
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use ldap_asn1::decode;
//!
//! let control: SyncRequestValueControl = decode(&[0x30, 0x03, 0x0A, 0x01, 0x01])?;
//! ```

use ldap_core::error::{DecodeError, DecodeResult, LdapResult};
use std::io::{ErrorKind, Read};

use crate::ber::tlv::{LengthProgress, Tlv};
use crate::ber::types::BerTag;
use crate::config::DecoderConfig;
use crate::container::{Asn1Container, ParseOutcome, TlvPhase};
use crate::grammar::Decodable;

impl<T: Decodable> Asn1Container<T> {
    /// Feed the next piece of the control value
    ///
    /// Any prefix of the message may be fed; the container keeps its state
    /// between calls. Once `Complete` or `Failed` is returned the container
    /// is finished and must be `clean()`ed before decoding another message.
    pub fn feed(&mut self, bytes: &[u8]) -> ParseOutcome<T> {
        if self.phase == TlvPhase::End {
            let err = if bytes.is_empty() {
                DecodeError::ContainerFinished
            } else {
                DecodeError::TrailingData(bytes.len())
            };
            return ParseOutcome::Failed(err);
        }

        match self.run(bytes) {
            Ok(Some(control)) => ParseOutcome::Complete(control),
            Ok(None) => ParseOutcome::NeedMoreData,
            Err(e) => {
                log::error!(
                    "{}: decoding failed in state {:?} after {} bytes ({}): {}",
                    self.grammar.name(),
                    self.state,
                    self.consumed,
                    self.tlv,
                    e
                );
                self.phase = TlvPhase::End;
                ParseOutcome::Failed(e)
            }
        }
    }

    /// Signal that no more bytes will arrive
    ///
    /// Completion is detected from the lengths alone, so a control still
    /// pending at end of input is always incomplete.
    pub fn finish(&mut self) -> ParseOutcome<T> {
        if self.phase == TlvPhase::End {
            return ParseOutcome::Failed(DecodeError::ContainerFinished);
        }

        let err = if self.consumed == 0 {
            DecodeError::IncompleteGrammar("no data".to_string())
        } else {
            DecodeError::IncompleteGrammar(format!(
                "stream ended after {} bytes in state {:?}",
                self.consumed, self.state
            ))
        };
        log::error!("{}: {}", self.grammar.name(), err);
        self.phase = TlvPhase::End;
        ParseOutcome::Failed(err)
    }

    fn run(&mut self, bytes: &[u8]) -> DecodeResult<Option<T>> {
        let mut pos = 0;

        while pos < bytes.len() {
            match self.phase {
                TlvPhase::Tag => {
                    let tag = bytes[pos];
                    pos += 1;
                    self.charge(1)?;
                    self.tlv = Tlv::read_tag(tag);
                    if BerTag::is_high_tag_number(tag) {
                        return Err(self.unexpected_tag());
                    }
                    self.phase = TlvPhase::Length;
                }
                TlvPhase::Length => {
                    let byte = bytes[pos];
                    pos += 1;
                    self.charge(1)?;
                    if let LengthProgress::Done(length) = self.tlv.read_length(byte)? {
                        if let Some(control) = self.length_complete(length)? {
                            return self.trailing(control, bytes.len() - pos);
                        }
                    }
                }
                TlvPhase::Value => {
                    let n = self.tlv.remaining_value().min(bytes.len() - pos);
                    self.charge(n)?;
                    self.tlv.read_value_bytes(&bytes[pos..pos + n]);
                    pos += n;
                    if self.tlv.is_complete() {
                        self.fire_transition()?;
                        if let Some(control) = self.close_levels()? {
                            return self.trailing(control, bytes.len() - pos);
                        }
                    }
                }
                TlvPhase::End => return Err(DecodeError::TrailingData(bytes.len() - pos)),
            }
        }

        Ok(None)
    }

    fn trailing(&mut self, control: T, left: usize) -> DecodeResult<Option<T>> {
        if left > 0 {
            return Err(DecodeError::TrailingData(left));
        }
        Ok(Some(control))
    }

    fn charge(&mut self, n: usize) -> DecodeResult<()> {
        self.stack.consume(n)?;
        self.consumed += n;
        Ok(())
    }

    fn length_complete(&mut self, length: usize) -> DecodeResult<Option<T>> {
        if self.stack.is_empty() && length > self.config.max_pdu_size() {
            return Err(DecodeError::LengthOverflow {
                length,
                available: self.config.max_pdu_size(),
            });
        }
        if self.stack.depth() >= self.config.max_depth() {
            return Err(DecodeError::NestingTooDeep(self.config.max_depth()));
        }
        self.stack.push(length)?;

        if self.tlv.is_constructed() || length == 0 {
            self.fire_transition()?;
            self.close_levels()
        } else {
            self.phase = TlvPhase::Value;
            Ok(None)
        }
    }

    fn fire_transition(&mut self) -> DecodeResult<()> {
        let tag = self.tlv.tag();
        let grammar = self.grammar;
        let transition = grammar
            .transition(self.state, tag)
            .ok_or_else(|| self.unexpected_tag())?;

        log::debug!(
            "{}: {:?} --0x{:02X}--> {:?} ({})",
            grammar.name(),
            transition.from(),
            tag,
            transition.to(),
            transition.description()
        );

        transition.apply(&mut self.control, &self.tlv)?;
        self.state = transition.to();
        self.end_allowed = transition.is_end_allowed();
        Ok(())
    }

    /// Close exhausted levels; the message ends when none is left open
    fn close_levels(&mut self) -> DecodeResult<Option<T>> {
        self.stack.pop_exhausted();
        if !self.stack.is_empty() {
            self.phase = TlvPhase::Tag;
            return Ok(None);
        }

        self.phase = TlvPhase::End;
        if !self.end_allowed {
            return Err(DecodeError::IncompleteGrammar(format!(
                "{} cannot end in state {:?}",
                self.grammar.name(),
                self.state
            )));
        }
        Ok(Some(std::mem::take(&mut self.control)))
    }

    fn unexpected_tag(&self) -> DecodeError {
        DecodeError::UnexpectedTag {
            tag: self.tlv.tag(),
            state: format!("{:?}", self.state),
        }
    }
}

/// Decode a complete control value with the default configuration
pub fn decode<T: Decodable>(bytes: &[u8]) -> DecodeResult<T> {
    decode_with_config(bytes, DecoderConfig::default())
}

/// Decode a complete control value
///
/// # Error Handling
/// Besides grammar errors, fails with `IncompleteGrammar` if `bytes` ends
/// before the control and with `TrailingData` if bytes follow it.
pub fn decode_with_config<T: Decodable>(bytes: &[u8], config: DecoderConfig) -> DecodeResult<T> {
    let mut container = Asn1Container::<T>::with_config(config);
    let outcome = match container.feed(bytes) {
        ParseOutcome::NeedMoreData => container.finish(),
        outcome => outcome,
    };
    match outcome {
        ParseOutcome::Complete(control) => Ok(control),
        ParseOutcome::Failed(e) => Err(e),
        ParseOutcome::NeedMoreData => Err(DecodeError::IncompleteGrammar(
            "stream ended".to_string(),
        )),
    }
}

/// Decode one control value from a blocking reader
///
/// Reads chunks of `read_buffer_size` bytes until the control completes.
/// The reader must not hold bytes past the control value: they would be
/// reported as `TrailingData`.
pub fn decode_from_read<T, R>(reader: &mut R, container: &mut Asn1Container<T>) -> LdapResult<T>
where
    T: Decodable,
    R: Read,
{
    let mut buf = vec![0u8; container.config().read_buffer_size()];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        let outcome = if n == 0 {
            container.finish()
        } else {
            container.feed(&buf[..n])
        };
        match outcome {
            ParseOutcome::Complete(control) => return Ok(control),
            ParseOutcome::Failed(e) => return Err(e.into()),
            ParseOutcome::NeedMoreData => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::types::{BOOLEAN_TAG, INTEGER_TAG, OCTET_STRING_TAG, SEQUENCE_TAG};
    use crate::ber::value::{decode_boolean, decode_long};
    use crate::grammar::{Grammar, GrammarState, Transition};
    use ldap_core::error::LdapError;
    use once_cell::sync::Lazy;

    // Pair ::= SEQUENCE { name OCTET STRING, flag BOOLEAN OPTIONAL }
    // Outer ::= SEQUENCE { id INTEGER, pair Pair }
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestState {
        Start,
        Outer,
        Id,
        Pair,
        Name,
        Flag,
    }

    impl GrammarState for TestState {
        const START: Self = TestState::Start;
    }

    #[derive(Debug, Default, PartialEq)]
    struct TestValue {
        id: i64,
        name: Vec<u8>,
        flag: bool,
    }

    fn store_id(value: &mut TestValue, tlv: &Tlv) -> DecodeResult<()> {
        value.id = decode_long(tlv.value())?;
        Ok(())
    }

    fn store_name(value: &mut TestValue, tlv: &Tlv) -> DecodeResult<()> {
        value.name = tlv.value().to_vec();
        Ok(())
    }

    fn store_flag(value: &mut TestValue, tlv: &Tlv) -> DecodeResult<()> {
        value.flag = decode_boolean(tlv.value())?;
        Ok(())
    }

    static GRAMMAR: Lazy<Grammar<TestState, TestValue>> = Lazy::new(|| {
        Grammar::builder("TestGrammar")
            .add(Transition::new(TestState::Start, SEQUENCE_TAG, TestState::Outer, "outer"))
            .add(
                Transition::new(TestState::Outer, INTEGER_TAG, TestState::Id, "id")
                    .with_action(store_id),
            )
            .add(Transition::new(TestState::Id, SEQUENCE_TAG, TestState::Pair, "pair"))
            .add(
                Transition::new(TestState::Pair, OCTET_STRING_TAG, TestState::Name, "name")
                    .with_action(store_name)
                    .end_allowed(),
            )
            .add(
                Transition::new(TestState::Name, BOOLEAN_TAG, TestState::Flag, "flag")
                    .with_action(store_flag)
                    .end_allowed(),
            )
            .build()
    });

    impl Decodable for TestValue {
        type State = TestState;

        fn grammar() -> &'static Grammar<TestState, TestValue> {
            &GRAMMAR
        }
    }

    const MESSAGE: [u8; 15] = [
        0x30, 0x0D, // Outer
        0x02, 0x01, 0x07, // id = 7
        0x30, 0x08, // Pair
        0x04, 0x03, b'a', b'b', b'c', // name
        0x01, 0x01, 0xFF, // flag
    ];

    fn expected() -> TestValue {
        TestValue {
            id: 7,
            name: b"abc".to_vec(),
            flag: true,
        }
    }

    #[test]
    fn test_decode_nested_sequences() {
        assert_eq!(decode::<TestValue>(&MESSAGE).unwrap(), expected());
    }

    #[test]
    fn test_feed_every_split_point() {
        for split in 0..=MESSAGE.len() {
            let mut container = Asn1Container::<TestValue>::new();
            let first = container.feed(&MESSAGE[..split]);
            if split < MESSAGE.len() {
                assert_eq!(first, ParseOutcome::NeedMoreData, "split at {}", split);
                assert_eq!(
                    container.feed(&MESSAGE[split..]),
                    ParseOutcome::Complete(expected()),
                    "split at {}",
                    split
                );
            } else {
                assert_eq!(first, ParseOutcome::Complete(expected()));
            }
        }
    }

    #[test]
    fn test_feed_byte_by_byte() {
        let mut container = Asn1Container::<TestValue>::new();
        let mut outcome = ParseOutcome::NeedMoreData;
        for b in MESSAGE.iter() {
            assert_eq!(outcome, ParseOutcome::NeedMoreData);
            outcome = container.feed(std::slice::from_ref(b));
        }
        assert_eq!(outcome, ParseOutcome::Complete(expected()));
        assert!(container.is_finished());
    }

    #[test]
    fn test_optional_trailing_field() {
        let bytes = [0x30, 0x0A, 0x02, 0x01, 0x07, 0x30, 0x05, 0x04, 0x03, b'a', b'b', b'c'];
        let value = decode::<TestValue>(&bytes).unwrap();
        assert_eq!(value.name, b"abc");
        assert!(!value.flag);
    }

    #[test]
    fn test_missing_mandatory_field() {
        let bytes = [0x30, 0x03, 0x02, 0x01, 0x07];
        assert!(matches!(
            decode::<TestValue>(&bytes),
            Err(DecodeError::IncompleteGrammar(_))
        ));
    }

    #[test]
    fn test_unexpected_tag() {
        let bytes = [0x30, 0x03, 0x04, 0x01, 0x07];
        assert_eq!(
            decode::<TestValue>(&bytes),
            Err(DecodeError::UnexpectedTag {
                tag: 0x04,
                state: "Outer".to_string()
            })
        );
    }

    #[test]
    fn test_high_tag_number_rejected() {
        let bytes = [0x1F, 0x81, 0x00];
        assert!(matches!(
            decode::<TestValue>(&bytes),
            Err(DecodeError::UnexpectedTag { tag: 0x1F, .. })
        ));
    }

    #[test]
    fn test_child_longer_than_parent() {
        let bytes = [0x30, 0x03, 0x02, 0x05, 0x07, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(
            decode::<TestValue>(&bytes),
            Err(DecodeError::LengthOverflow { length: 5, available: 1 })
        );
    }

    #[test]
    fn test_malformed_length() {
        let bytes = [0x30, 0xFF];
        assert!(matches!(
            decode::<TestValue>(&bytes),
            Err(DecodeError::MalformedLength(_))
        ));
    }

    #[test]
    fn test_trailing_data() {
        let mut bytes = MESSAGE.to_vec();
        bytes.extend_from_slice(&[0x00, 0x00]);
        assert_eq!(decode::<TestValue>(&bytes), Err(DecodeError::TrailingData(2)));

        let mut container = Asn1Container::<TestValue>::new();
        assert!(container.feed(&MESSAGE).is_complete());
        assert_eq!(
            container.feed(&[0x30]),
            ParseOutcome::Failed(DecodeError::TrailingData(1))
        );
    }

    #[test]
    fn test_finished_container_refuses_input() {
        let mut container = Asn1Container::<TestValue>::new();
        assert!(container.feed(&MESSAGE).is_complete());
        assert_eq!(
            container.feed(&[]),
            ParseOutcome::Failed(DecodeError::ContainerFinished)
        );
        assert_eq!(
            container.finish(),
            ParseOutcome::Failed(DecodeError::ContainerFinished)
        );

        container.clean();
        assert!(matches!(
            container.finish(),
            ParseOutcome::Failed(DecodeError::IncompleteGrammar(_))
        ));
        assert_eq!(
            container.finish(),
            ParseOutcome::Failed(DecodeError::ContainerFinished)
        );
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(
            decode::<TestValue>(&MESSAGE[..10]),
            Err(DecodeError::IncompleteGrammar(_))
        ));
        assert_eq!(
            decode::<TestValue>(&[]),
            Err(DecodeError::IncompleteGrammar("no data".to_string()))
        );
    }

    #[test]
    fn test_max_pdu_size() {
        let config = DecoderConfig::default().with_max_pdu_size(8);
        assert_eq!(
            decode_with_config::<TestValue>(&MESSAGE, config),
            Err(DecodeError::LengthOverflow { length: 13, available: 8 })
        );
    }

    #[test]
    fn test_max_depth() {
        let config = DecoderConfig::default().with_max_depth(2);
        assert_eq!(
            decode_with_config::<TestValue>(&MESSAGE, config),
            Err(DecodeError::NestingTooDeep(2))
        );
    }

    #[test]
    fn test_clean_allows_reuse() {
        let mut container = Asn1Container::<TestValue>::new();
        assert!(container.feed(&[0x30, 0x03, 0x04, 0x01, 0x07]).is_failed());
        assert!(container.feed(&MESSAGE).is_failed());

        container.clean();
        assert_eq!(container.consumed(), 0);
        assert_eq!(container.state(), TestState::Start);
        assert_eq!(container.feed(&MESSAGE), ParseOutcome::Complete(expected()));
    }

    #[test]
    fn test_container_progress() {
        let mut container = Asn1Container::<TestValue>::new();
        assert_eq!(container.feed(&MESSAGE[..5]), ParseOutcome::NeedMoreData);
        assert_eq!(container.state(), TestState::Id);
        assert_eq!(container.control().id, 7);
        assert_eq!(container.consumed(), 5);
        assert_eq!(container.stack().top(), Some(10));
        assert!(!container.is_end_allowed());
        assert_eq!(container.grammar_name(), "TestGrammar");
    }

    struct Chunked<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Chunked<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_decode_from_read_in_chunks() {
        let mut reader = Chunked { data: &MESSAGE, chunk: 3 };
        let mut container = Asn1Container::<TestValue>::new();
        let value = decode_from_read(&mut reader, &mut container).unwrap();
        assert_eq!(value, expected());
    }

    #[test]
    fn test_decode_from_read_truncated() {
        let mut reader = Chunked { data: &MESSAGE[..9], chunk: 4 };
        let mut container = Asn1Container::<TestValue>::new();
        let err = decode_from_read(&mut reader, &mut container).unwrap_err();
        assert!(matches!(
            err,
            LdapError::Decode(DecodeError::IncompleteGrammar(_))
        ));
    }
}
