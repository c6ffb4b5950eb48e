use ldap_asn1::ber::types::{BOOLEAN_TAG, ENUMERATED_TAG, OCTET_STRING_TAG, SEQUENCE_TAG};
use ldap_asn1::ber::value::{decode_boolean, decode_integer};
use ldap_asn1::{Decodable, Grammar, GrammarState, Tlv, Transition};
use ldap_core::error::{DecodeError, DecodeResult};
use ldap_core::hex::dump_bytes;
use once_cell::sync::Lazy;

use super::control::{SyncRequestValueControl, SynchronizationModes};
use SyncRequestValueState::*;

/// States of the SyncRequestValue grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncRequestValueState {
    Start,
    SyncRequestValueSequence,
    Mode,
    Cookie,
    ReloadHint,
}

impl GrammarState for SyncRequestValueState {
    const START: Self = SyncRequestValueState::Start;
}

fn store_mode(control: &mut SyncRequestValueControl, tlv: &Tlv) -> DecodeResult<()> {
    let value = decode_integer(tlv.value(), 0, 3)?;
    let mode = SynchronizationModes::from_value(value)
        .ok_or_else(|| DecodeError::SemanticViolation(format!("Unknown mode {}", value)))?;
    log::debug!("Mode = {:?}", mode);
    control.set_mode(mode);
    Ok(())
}

fn store_cookie(control: &mut SyncRequestValueControl, tlv: &Tlv) -> DecodeResult<()> {
    log::debug!("Cookie = {}", dump_bytes(tlv.value()));
    control.set_cookie(Some(tlv.value().to_vec()));
    Ok(())
}

fn store_reload_hint(control: &mut SyncRequestValueControl, tlv: &Tlv) -> DecodeResult<()> {
    let reload_hint = decode_boolean(tlv.value())?;
    log::debug!("ReloadHint = {}", reload_hint);
    control.set_reload_hint(reload_hint);
    Ok(())
}

static GRAMMAR: Lazy<Grammar<SyncRequestValueState, SyncRequestValueControl>> = Lazy::new(|| {
    Grammar::builder("SyncRequestValueGrammar")
        .add(Transition::new(
            Start,
            SEQUENCE_TAG,
            SyncRequestValueSequence,
            "syncRequestValue SEQUENCE",
        ))
        .add(
            Transition::new(SyncRequestValueSequence, ENUMERATED_TAG, Mode, "mode")
                .with_action(store_mode)
                .end_allowed(),
        )
        .add(
            Transition::new(Mode, OCTET_STRING_TAG, Cookie, "cookie")
                .with_action(store_cookie)
                .end_allowed(),
        )
        .add(
            Transition::new(Mode, BOOLEAN_TAG, ReloadHint, "reloadHint")
                .with_action(store_reload_hint)
                .end_allowed(),
        )
        .add(
            Transition::new(Cookie, BOOLEAN_TAG, ReloadHint, "reloadHint")
                .with_action(store_reload_hint)
                .end_allowed(),
        )
        .build()
});

impl Decodable for SyncRequestValueControl {
    type State = SyncRequestValueState;

    fn grammar() -> &'static Grammar<SyncRequestValueState, SyncRequestValueControl> {
        &GRAMMAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Control;
    use ldap_asn1::{decode, Asn1Container, ParseOutcome};

    #[test]
    fn test_decode_mode_and_reload_hint() {
        let bytes = [0x30, 0x06, 0x0A, 0x01, 0x01, 0x01, 0x01, 0x01];
        let control: SyncRequestValueControl = decode(&bytes).unwrap();
        assert_eq!(control.mode(), SynchronizationModes::RefreshOnly);
        assert_eq!(control.cookie(), None);
        assert!(control.reload_hint());
    }

    #[test]
    fn test_decode_mode_and_cookie() {
        let bytes = [0x30, 0x08, 0x0A, 0x01, 0x03, 0x04, 0x03, 0x61, 0x62, 0x63];
        let control: SyncRequestValueControl = decode(&bytes).unwrap();
        assert_eq!(control.mode(), SynchronizationModes::RefreshAndPersist);
        assert_eq!(control.cookie(), Some(&[0x61, 0x62, 0x63][..]));
        assert!(!control.reload_hint());
    }

    #[test]
    fn test_sequence_shorter_than_content() {
        // Declared SEQUENCE length 5 with six content bytes
        let bytes = [0x30, 0x05, 0x0A, 0x01, 0x01, 0x01, 0x01, 0x01];
        assert!(matches!(
            decode::<SyncRequestValueControl>(&bytes),
            Err(DecodeError::LengthOverflow { .. })
        ));
    }

    #[test]
    fn test_sequence_longer_than_content() {
        // Declared SEQUENCE length 10 with eight content bytes
        let bytes = [0x30, 0x0A, 0x0A, 0x01, 0x03, 0x04, 0x03, 0x61, 0x62, 0x63];
        let mut container = Asn1Container::<SyncRequestValueControl>::new();
        assert_eq!(container.feed(&bytes), ParseOutcome::NeedMoreData);
        assert!(matches!(
            container.finish(),
            ParseOutcome::Failed(DecodeError::IncompleteGrammar(_))
        ));
    }

    #[test]
    fn test_mode_alone_is_complete() {
        let control: SyncRequestValueControl = decode(&[0x30, 0x03, 0x0A, 0x01, 0x01]).unwrap();
        assert_eq!(control, SyncRequestValueControl::new(SynchronizationModes::RefreshOnly));
    }

    #[test]
    fn test_empty_sequence_is_incomplete() {
        assert!(matches!(
            decode::<SyncRequestValueControl>(&[0x30, 0x00]),
            Err(DecodeError::IncompleteGrammar(_))
        ));
    }

    #[test]
    fn test_integer_after_mode_rejected() {
        let bytes = [0x30, 0x06, 0x0A, 0x01, 0x01, 0x02, 0x01, 0x05];
        assert_eq!(
            decode::<SyncRequestValueControl>(&bytes),
            Err(DecodeError::UnexpectedTag {
                tag: 0x02,
                state: "Mode".to_string()
            })
        );
    }

    #[test]
    fn test_cookie_after_reload_hint_rejected() {
        let bytes = [0x30, 0x09, 0x0A, 0x01, 0x01, 0x01, 0x01, 0xFF, 0x04, 0x01, 0x61];
        assert!(matches!(
            decode::<SyncRequestValueControl>(&bytes),
            Err(DecodeError::UnexpectedTag { tag: 0x04, .. })
        ));
    }

    #[test]
    fn test_mode_out_of_range() {
        let bytes = [0x30, 0x03, 0x0A, 0x01, 0x04];
        assert_eq!(
            decode::<SyncRequestValueControl>(&bytes),
            Err(DecodeError::IntegerOutOfRange { value: 4, min: 0, max: 3 })
        );
    }

    #[test]
    fn test_empty_mode_rejected() {
        let bytes = [0x30, 0x02, 0x0A, 0x00];
        assert!(matches!(
            decode::<SyncRequestValueControl>(&bytes),
            Err(DecodeError::InvalidIntegerEncoding(_))
        ));
    }

    #[test]
    fn test_bad_boolean_length() {
        let bytes = [0x30, 0x07, 0x0A, 0x01, 0x01, 0x01, 0x02, 0xFF, 0xFF];
        assert_eq!(
            decode::<SyncRequestValueControl>(&bytes),
            Err(DecodeError::InvalidBooleanLength(2))
        );
    }

    #[test]
    fn test_permissive_boolean() {
        let bytes = [0x30, 0x06, 0x0A, 0x01, 0x01, 0x01, 0x01, 0x01];
        let mut control: SyncRequestValueControl = decode(&bytes).unwrap();
        assert!(control.reload_hint());
        // Re-encoded in canonical form
        let value = control.get_value().unwrap();
        assert_eq!(value[7], 0xFF);
    }

    #[test]
    fn test_round_trip_cookie_lengths() {
        for mode in [SynchronizationModes::RefreshOnly, SynchronizationModes::RefreshAndPersist] {
            for reload_hint in [false, true] {
                let mut control = SyncRequestValueControl::new(mode);
                control.set_reload_hint(reload_hint);
                let value = control.get_value().unwrap();
                assert_eq!(decode::<SyncRequestValueControl>(&value).unwrap(), control);

                for len in 0..=300usize {
                    let cookie: Vec<u8> = (0..len).map(|i| i as u8).collect();
                    control.set_cookie(Some(cookie));
                    let value = control.get_value().unwrap();
                    assert_eq!(value.len(), control.compute_length());
                    let decoded: SyncRequestValueControl = decode(&value).unwrap();
                    assert_eq!(decoded, control, "mode {:?}, cookie length {}", mode, len);
                }
            }
        }
    }

    #[test]
    fn test_round_trip_split_feed() {
        let mut control = SyncRequestValueControl::new(SynchronizationModes::RefreshAndPersist);
        control.set_cookie(Some(vec![0x5A; 150]));
        control.set_reload_hint(true);
        let value = control.get_value().unwrap();

        let mut container = Asn1Container::<SyncRequestValueControl>::new();
        let mut outcome = ParseOutcome::NeedMoreData;
        for chunk in value.chunks(7) {
            assert_eq!(outcome, ParseOutcome::NeedMoreData);
            outcome = container.feed(chunk);
        }
        assert_eq!(outcome, ParseOutcome::Complete(control));
    }

    #[test]
    fn test_grammar_is_shared() {
        let a = SyncRequestValueControl::grammar() as *const _;
        let b = SyncRequestValueControl::grammar() as *const _;
        assert_eq!(a, b);
        assert_eq!(SyncRequestValueControl::grammar().len(), 5);
    }
}
