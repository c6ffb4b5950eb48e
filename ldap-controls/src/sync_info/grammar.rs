use ldap_asn1::ber::types::{BOOLEAN_TAG, OCTET_STRING_TAG, SET_TAG};
use ldap_asn1::ber::value::decode_boolean;
use ldap_asn1::{Decodable, Grammar, GrammarState, Tlv, Transition};
use ldap_core::error::{DecodeError, DecodeResult};
use ldap_core::hex::dump_bytes;
use once_cell::sync::Lazy;

use super::control::{SyncInfoValueControl, SynchronizationInfo, UUID_LENGTH};

/// States of the SyncInfoValue grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncInfoValueState {
    Start,
    NewCookie,
    RefreshDelete,
    RefreshDeleteCookie,
    RefreshDeleteRefreshDone,
    RefreshPresent,
    RefreshPresentCookie,
    RefreshPresentRefreshDone,
    SyncIdSet,
    SyncIdSetCookie,
    SyncIdSetRefreshDeletes,
    SyncIdSetUuids,
    SyncIdSetUuid,
}

impl GrammarState for SyncInfoValueState {
    const START: Self = SyncInfoValueState::Start;
}

fn store_new_cookie(control: &mut SyncInfoValueControl, tlv: &Tlv) -> DecodeResult<()> {
    log::debug!("newcookie = {}", dump_bytes(tlv.value()));
    control.set_info_type(SynchronizationInfo::NewCookie);
    control.set_cookie(Some(tlv.value().to_vec()));
    Ok(())
}

fn start_refresh_delete(control: &mut SyncInfoValueControl, _tlv: &Tlv) -> DecodeResult<()> {
    control.set_info_type(SynchronizationInfo::RefreshDelete);
    Ok(())
}

fn start_refresh_present(control: &mut SyncInfoValueControl, _tlv: &Tlv) -> DecodeResult<()> {
    control.set_info_type(SynchronizationInfo::RefreshPresent);
    Ok(())
}

fn start_sync_id_set(control: &mut SyncInfoValueControl, _tlv: &Tlv) -> DecodeResult<()> {
    control.set_info_type(SynchronizationInfo::SyncIdSet);
    Ok(())
}

fn store_cookie(control: &mut SyncInfoValueControl, tlv: &Tlv) -> DecodeResult<()> {
    log::debug!("cookie = {}", dump_bytes(tlv.value()));
    control.set_cookie(Some(tlv.value().to_vec()));
    Ok(())
}

fn store_refresh_done(control: &mut SyncInfoValueControl, tlv: &Tlv) -> DecodeResult<()> {
    let refresh_done = decode_boolean(tlv.value())?;
    log::debug!("refreshDone = {}", refresh_done);
    control.set_refresh_done(refresh_done);
    Ok(())
}

fn store_refresh_deletes(control: &mut SyncInfoValueControl, tlv: &Tlv) -> DecodeResult<()> {
    let refresh_deletes = decode_boolean(tlv.value())?;
    log::debug!("refreshDeletes = {}", refresh_deletes);
    control.set_refresh_deletes(refresh_deletes);
    Ok(())
}

fn store_sync_uuid(control: &mut SyncInfoValueControl, tlv: &Tlv) -> DecodeResult<()> {
    let uuid: [u8; UUID_LENGTH] = tlv.value().try_into().map_err(|_| {
        DecodeError::SemanticViolation(format!(
            "syncUUID must be {} bytes, got {}",
            UUID_LENGTH,
            tlv.value().len()
        ))
    })?;
    log::debug!("syncUUID = {}", dump_bytes(&uuid));
    control.add_sync_uuid(uuid);
    Ok(())
}

static GRAMMAR: Lazy<Grammar<SyncInfoValueState, SyncInfoValueControl>> = Lazy::new(|| {
    use SyncInfoValueState::*;

    let mut builder = Grammar::builder("SyncInfoValueGrammar")
        .add(
            Transition::new(Start, SynchronizationInfo::NewCookie.tag(), NewCookie, "newcookie")
                .with_action(store_new_cookie)
                .end_allowed(),
        )
        .add(
            Transition::new(
                Start,
                SynchronizationInfo::RefreshDelete.tag(),
                RefreshDelete,
                "refreshDelete",
            )
            .with_action(start_refresh_delete)
            .end_allowed(),
        )
        .add(
            Transition::new(
                Start,
                SynchronizationInfo::RefreshPresent.tag(),
                RefreshPresent,
                "refreshPresent",
            )
            .with_action(start_refresh_present)
            .end_allowed(),
        )
        .add(
            Transition::new(Start, SynchronizationInfo::SyncIdSet.tag(), SyncIdSet, "syncIdSet")
                .with_action(start_sync_id_set),
        );

    // refreshDelete and refreshPresent share the same content
    for (arm, cookie, refresh_done) in [
        (RefreshDelete, RefreshDeleteCookie, RefreshDeleteRefreshDone),
        (RefreshPresent, RefreshPresentCookie, RefreshPresentRefreshDone),
    ] {
        builder = builder
            .add(
                Transition::new(arm, OCTET_STRING_TAG, cookie, "cookie")
                    .with_action(store_cookie)
                    .end_allowed(),
            )
            .add(
                Transition::new(cookie, BOOLEAN_TAG, refresh_done, "refreshDone")
                    .with_action(store_refresh_done)
                    .end_allowed(),
            )
            .add(
                Transition::new(arm, BOOLEAN_TAG, refresh_done, "refreshDone")
                    .with_action(store_refresh_done)
                    .end_allowed(),
            );
    }

    builder
        .add(
            Transition::new(SyncIdSet, OCTET_STRING_TAG, SyncIdSetCookie, "cookie")
                .with_action(store_cookie),
        )
        .add(
            Transition::new(SyncIdSet, BOOLEAN_TAG, SyncIdSetRefreshDeletes, "refreshDeletes")
                .with_action(store_refresh_deletes),
        )
        .add(
            Transition::new(
                SyncIdSetCookie,
                BOOLEAN_TAG,
                SyncIdSetRefreshDeletes,
                "refreshDeletes",
            )
            .with_action(store_refresh_deletes),
        )
        .add(Transition::new(SyncIdSet, SET_TAG, SyncIdSetUuids, "syncUUIDs").end_allowed())
        .add(Transition::new(SyncIdSetCookie, SET_TAG, SyncIdSetUuids, "syncUUIDs").end_allowed())
        .add(
            Transition::new(SyncIdSetRefreshDeletes, SET_TAG, SyncIdSetUuids, "syncUUIDs")
                .end_allowed(),
        )
        .add(
            Transition::new(SyncIdSetUuids, OCTET_STRING_TAG, SyncIdSetUuid, "syncUUID")
                .with_action(store_sync_uuid)
                .end_allowed(),
        )
        .add(
            Transition::new(SyncIdSetUuid, OCTET_STRING_TAG, SyncIdSetUuid, "syncUUID")
                .with_action(store_sync_uuid)
                .end_allowed(),
        )
        .build()
});

impl Decodable for SyncInfoValueControl {
    type State = SyncInfoValueState;

    fn grammar() -> &'static Grammar<SyncInfoValueState, SyncInfoValueControl> {
        &GRAMMAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Control;
    use ldap_asn1::decode;

    fn uuid_tlv(byte: u8) -> Vec<u8> {
        let mut tlv = vec![0x04, 0x10];
        tlv.extend_from_slice(&[byte; UUID_LENGTH]);
        tlv
    }

    #[test]
    fn test_decode_new_cookie() {
        let control: SyncInfoValueControl = decode(&[0x80, 0x03, 0x61, 0x62, 0x63]).unwrap();
        assert_eq!(control.info_type(), SynchronizationInfo::NewCookie);
        assert_eq!(control.cookie(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_decode_refresh_delete_defaults() {
        let control: SyncInfoValueControl = decode(&[0xA1, 0x00]).unwrap();
        assert_eq!(control.info_type(), SynchronizationInfo::RefreshDelete);
        assert_eq!(control.cookie(), None);
        assert!(control.refresh_done());
    }

    #[test]
    fn test_decode_refresh_present_all_fields() {
        let bytes = [0xA2, 0x07, 0x04, 0x02, 0x63, 0x6B, 0x01, 0x01, 0x00];
        let control: SyncInfoValueControl = decode(&bytes).unwrap();
        assert_eq!(control.info_type(), SynchronizationInfo::RefreshPresent);
        assert_eq!(control.cookie(), Some(&b"ck"[..]));
        assert!(!control.refresh_done());
    }

    #[test]
    fn test_decode_sync_id_set() {
        let mut bytes = vec![0xA3, 0x29, 0x01, 0x01, 0xFF, 0x31, 0x24];
        bytes.extend(uuid_tlv(0x11));
        bytes.extend(uuid_tlv(0x22));
        let control: SyncInfoValueControl = decode(&bytes).unwrap();
        assert_eq!(control.info_type(), SynchronizationInfo::SyncIdSet);
        assert!(control.refresh_deletes());
        assert_eq!(control.sync_uuids(), &[[0x11; UUID_LENGTH], [0x22; UUID_LENGTH]]);
    }

    #[test]
    fn test_sync_id_set_requires_uuid_set() {
        let bytes = [0xA3, 0x03, 0x04, 0x01, 0x61];
        assert!(matches!(
            decode::<SyncInfoValueControl>(&bytes),
            Err(DecodeError::IncompleteGrammar(_))
        ));
        assert!(matches!(
            decode::<SyncInfoValueControl>(&[0xA3, 0x00]),
            Err(DecodeError::IncompleteGrammar(_))
        ));
    }

    #[test]
    fn test_bad_uuid_length() {
        let bytes = [0xA3, 0x05, 0x31, 0x03, 0x04, 0x01, 0x00];
        assert!(matches!(
            decode::<SyncInfoValueControl>(&bytes),
            Err(DecodeError::SemanticViolation(_))
        ));
    }

    #[test]
    fn test_second_boolean_rejected() {
        // refreshDone comes last, a second boolean is illegal
        let bytes = [0xA1, 0x06, 0x01, 0x01, 0x00, 0x01, 0x01, 0x00];
        assert!(matches!(
            decode::<SyncInfoValueControl>(&bytes),
            Err(DecodeError::UnexpectedTag { tag: 0x01, .. })
        ));
    }

    #[test]
    fn test_unknown_arm() {
        assert_eq!(
            decode::<SyncInfoValueControl>(&[0xA4, 0x00]),
            Err(DecodeError::UnexpectedTag {
                tag: 0xA4,
                state: "Start".to_string()
            })
        );
    }

    #[test]
    fn test_round_trip_every_arm() {
        let mut new_cookie = SyncInfoValueControl::new(SynchronizationInfo::NewCookie);
        new_cookie.set_cookie(Some(vec![0x7F; 130]));

        let mut refresh_present = SyncInfoValueControl::new(SynchronizationInfo::RefreshPresent);
        refresh_present.set_cookie(Some(Vec::new()));
        refresh_present.set_refresh_done(false);

        let mut sync_id_set = SyncInfoValueControl::new(SynchronizationInfo::SyncIdSet);
        sync_id_set.set_cookie(Some(b"state".to_vec()));
        sync_id_set.set_sync_uuids((0..10u8).map(|i| [i; UUID_LENGTH]).collect());

        for mut control in [
            new_cookie,
            SyncInfoValueControl::new(SynchronizationInfo::RefreshDelete),
            refresh_present,
            SyncInfoValueControl::new(SynchronizationInfo::SyncIdSet),
            sync_id_set,
        ] {
            let value = control.get_value().unwrap();
            let decoded: SyncInfoValueControl = decode(&value).unwrap();
            assert_eq!(decoded, control);
        }
    }
}
