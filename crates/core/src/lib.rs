// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

//! Core domain model of cuebox: collections, their members, and the
//! positioning algorithm that keeps members in a dense, zero-based order.

pub mod util;

mod entity;
pub use self::entity::{DecodeError, EntityHeader, EntityRevision, EntityRevisionNumber, EntityUid};

pub mod collection;
pub use self::collection::{
    Collection, CollectionKind, Entity as CollectionEntity, EntityWithMembers,
    Uid as CollectionUid,
};

pub mod member;
pub use self::member::{
    InsertOutcome, Item, ItemKind, ItemUid, Member, PatchOperation, UnsupportedItemKind,
};

pub mod ordering;
