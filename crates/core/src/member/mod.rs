// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::{
    collection::CollectionKind,
    ordering::Position,
    util::clock::UtcDateTimeMs,
};

pub type ItemUid = crate::EntityUid;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ItemKind {
    File,
    Macro,
}

/// The item a member refers to.
///
/// File items and macro items are stored in distinct tables and therefore
/// have independent UID spaces. The pair of kind and UID identifies a
/// member unambiguously within its collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Item {
    File { uid: ItemUid },
    Macro { uid: ItemUid },
}

impl Item {
    #[must_use]
    pub const fn kind(self) -> ItemKind {
        match self {
            Self::File { .. } => ItemKind::File,
            Self::Macro { .. } => ItemKind::Macro,
        }
    }

    #[must_use]
    pub const fn uid(self) -> ItemUid {
        match self {
            Self::File { uid } | Self::Macro { uid } => uid,
        }
    }

    #[must_use]
    pub fn is_file(self) -> bool {
        matches!(self, Self::File { .. })
    }

    #[must_use]
    pub fn is_macro(self) -> bool {
        matches!(self, Self::Macro { .. })
    }
}

/// One (item, position) association inside a collection.
///
/// The position is not stored explicitly. Within a loaded sequence the
/// index of a member equals its position, which keeps the density
/// invariant trivially intact for in-memory representations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    /// Time stamp when this member has been added to the collection.
    pub added_at: UtcDateTimeMs,

    /// Optional title for display, overriding the item's own title.
    pub title: Option<String>,

    pub item: Item,
}

/// Per-item outcome of a batch insert.
///
/// Items that are already members are excluded from the batch and reported
/// here instead of failing the whole operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub duplicates: Vec<Item>,
}

#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("{item_kind} members are not allowed in a {collection_kind} collection")]
pub struct UnsupportedItemKind {
    pub collection_kind: CollectionKind,
    pub item_kind: ItemKind,
}

/// Reject items that the collection kind does not admit.
pub fn validate_item_kinds<'a>(
    collection_kind: CollectionKind,
    items: impl IntoIterator<Item = &'a Item>,
) -> Result<(), UnsupportedItemKind> {
    for item in items {
        let item_kind = item.kind();
        if !collection_kind.allows_item_kind(item_kind) {
            return Err(UnsupportedItemKind {
                collection_kind,
                item_kind,
            });
        }
    }
    Ok(())
}

/// One logical mutation of a collection's member sequence.
///
/// The same operation vocabulary is applied speculatively to cached
/// sequences and durably to stored rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOperation {
    Insert {
        /// Position to insert before, appends when absent.
        before: Option<Position>,
        members: Vec<Member>,
    },
    Remove {
        items: Vec<Item>,
    },
    Move {
        item: Item,
        target: Position,
    },
    MoveRange {
        /// First position of the moved block.
        start: Position,
        /// Last position of the moved block (inclusive).
        end: Position,
        target: Position,
    },
    RemoveAll,
}
