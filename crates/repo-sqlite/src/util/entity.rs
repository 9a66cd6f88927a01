// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use cuebox_core::{EntityHeader, EntityRevision, EntityRevisionNumber, EntityUid};

pub(crate) fn decode_entity_uid(uid: &str) -> EntityUid {
    uid.parse().expect("valid entity UID")
}

pub(crate) fn encode_entity_uid(uid: &EntityUid) -> String {
    uid.to_string()
}

pub(crate) fn decode_entity_revision(rev: i64) -> EntityRevision {
    EntityRevision::from_inner(rev as EntityRevisionNumber)
}

pub(crate) const fn encode_entity_revision(rev: EntityRevision) -> i64 {
    rev.to_inner() as _
}

pub(crate) fn decode_entity_header(uid: &str, rev: i64) -> EntityHeader {
    let uid = decode_entity_uid(uid);
    let rev = decode_entity_revision(rev);
    EntityHeader { uid, rev }
}
