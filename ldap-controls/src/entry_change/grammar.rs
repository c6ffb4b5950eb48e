use ldap_asn1::ber::types::{ENUMERATED_TAG, INTEGER_TAG, OCTET_STRING_TAG, SEQUENCE_TAG};
use ldap_asn1::ber::value::{decode_integer, decode_long};
use ldap_asn1::{Decodable, Grammar, GrammarState, Tlv, Transition};
use ldap_core::dn::Dn;
use ldap_core::error::{DecodeError, DecodeResult};
use once_cell::sync::Lazy;

use super::control::{ChangeType, EntryChangeControl};

/// States of the EntryChangeNotification grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryChangeState {
    Start,
    EntryChangeSequence,
    ChangeType,
    PreviousDn,
    ChangeNumber,
}

impl GrammarState for EntryChangeState {
    const START: Self = EntryChangeState::Start;
}

fn store_change_type(control: &mut EntryChangeControl, tlv: &Tlv) -> DecodeResult<()> {
    let value = decode_integer(tlv.value(), 1, 8)?;
    let change_type = ChangeType::from_value(value).ok_or_else(|| {
        DecodeError::SemanticViolation(format!("Undefined changeType {}", value))
    })?;
    log::debug!("Change type = {:?}", change_type);
    control.set_change_type(change_type);
    Ok(())
}

// The table dispatches on the tag only, the changeType dependency is checked here
fn store_previous_dn(control: &mut EntryChangeControl, tlv: &Tlv) -> DecodeResult<()> {
    if control.change_type() != ChangeType::ModDn {
        return Err(DecodeError::SemanticViolation(format!(
            "previousDN is only allowed with changeType ModDn, got {:?}",
            control.change_type()
        )));
    }

    let text = std::str::from_utf8(tlv.value())
        .map_err(|e| DecodeError::InvalidDnSyntax(format!("previousDN is not UTF-8: {}", e)))?;
    let dn = Dn::parse(text)?;
    log::debug!("Previous DN = {}", dn);
    control.set_previous_dn(Some(dn));
    Ok(())
}

fn store_change_number(control: &mut EntryChangeControl, tlv: &Tlv) -> DecodeResult<()> {
    let change_number = decode_long(tlv.value())?;
    log::debug!("Change number = {}", change_number);
    control.set_change_number(Some(change_number));
    Ok(())
}

static GRAMMAR: Lazy<Grammar<EntryChangeState, EntryChangeControl>> = Lazy::new(|| {
    Grammar::builder("EntryChangeGrammar")
        .add(Transition::new(
            EntryChangeState::Start,
            SEQUENCE_TAG,
            EntryChangeState::EntryChangeSequence,
            "EntryChangeNotification SEQUENCE",
        ))
        .add(
            Transition::new(
                EntryChangeState::EntryChangeSequence,
                ENUMERATED_TAG,
                EntryChangeState::ChangeType,
                "changeType",
            )
            .with_action(store_change_type)
            .end_allowed(),
        )
        .add(
            Transition::new(
                EntryChangeState::ChangeType,
                OCTET_STRING_TAG,
                EntryChangeState::PreviousDn,
                "previousDN",
            )
            .with_action(store_previous_dn)
            .end_allowed(),
        )
        .add(
            Transition::new(
                EntryChangeState::ChangeType,
                INTEGER_TAG,
                EntryChangeState::ChangeNumber,
                "changeNumber",
            )
            .with_action(store_change_number)
            .end_allowed(),
        )
        .add(
            Transition::new(
                EntryChangeState::PreviousDn,
                INTEGER_TAG,
                EntryChangeState::ChangeNumber,
                "changeNumber",
            )
            .with_action(store_change_number)
            .end_allowed(),
        )
        .build()
});

impl Decodable for EntryChangeControl {
    type State = EntryChangeState;

    fn grammar() -> &'static Grammar<EntryChangeState, EntryChangeControl> {
        &GRAMMAR
    }
}
