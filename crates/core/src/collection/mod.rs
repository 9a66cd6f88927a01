// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    EntityHeader,
    member::{ItemKind, Member},
};

pub type Uid = crate::EntityUid;

/// The closed set of collection kinds.
///
/// Macro containers are special: they hold both plain file members and
/// macro group members in a single, shared position space.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum CollectionKind {
    Playlist,
    SfxSet,
    AmbienceSet,
    MacroContainer,
}

impl CollectionKind {
    /// Whether members of the given item kind may be added to a
    /// collection of this kind.
    #[must_use]
    pub fn allows_item_kind(self, item_kind: ItemKind) -> bool {
        match self {
            Self::MacroContainer => true,
            Self::Playlist | Self::SfxSet | Self::AmbienceSet => {
                matches!(item_kind, ItemKind::File)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub title: String,

    pub kind: CollectionKind,

    /// Optional personal notes.
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub hdr: EntityHeader,
    pub body: Collection,
}

impl Entity {
    #[must_use]
    pub const fn new(hdr: EntityHeader, body: Collection) -> Self {
        Self { hdr, body }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityWithMembers {
    pub entity: Entity,
    pub members: Vec<Member>,
}

impl From<(Entity, Vec<Member>)> for EntityWithMembers {
    fn from((entity, members): (Entity, Vec<Member>)) -> Self {
        Self { entity, members }
    }
}

impl From<EntityWithMembers> for (Entity, Vec<Member>) {
    fn from(from: EntityWithMembers) -> Self {
        let EntityWithMembers { entity, members } = from;
        (entity, members)
    }
}
