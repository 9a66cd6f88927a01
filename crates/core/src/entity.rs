// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use std::{fmt, str::FromStr};

use ulid::Ulid;

/// Globally unique identifier of an entity.
///
/// Encoded as a ULID string for storage and transport.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EntityUid(Ulid);

pub type DecodeError = ulid::DecodeError;

impl EntityUid {
    #[must_use]
    pub fn random() -> Self {
        Self(Ulid::new())
    }

    #[must_use]
    pub const fn from_inner(inner: Ulid) -> Self {
        Self(inner)
    }

    #[must_use]
    pub const fn to_inner(self) -> Ulid {
        let Self(inner) = self;
        inner
    }

    #[must_use]
    pub fn is_nil(self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for EntityUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(inner) = self;
        inner.fmt(f)
    }
}

impl FromStr for EntityUid {
    type Err = DecodeError;

    fn from_str(encoded: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(encoded).map(Self)
    }
}

/// A 1-based, monotonically increasing revision number.
pub type EntityRevisionNumber = u64;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct EntityRevision(EntityRevisionNumber);

impl EntityRevision {
    pub const INITIAL: Self = Self(1);

    #[must_use]
    pub fn is_initial(self) -> bool {
        self == Self::INITIAL
    }

    #[must_use]
    pub fn prev(self) -> Option<Self> {
        let Self(number) = self;
        number.checked_sub(1).filter(|prev| *prev > 0).map(Self)
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        let Self(number) = self;
        number.checked_add(1).map(Self)
    }

    #[must_use]
    pub const fn from_inner(inner: EntityRevisionNumber) -> Self {
        Self(inner)
    }

    #[must_use]
    pub const fn to_inner(self) -> EntityRevisionNumber {
        let Self(inner) = self;
        inner
    }
}

impl fmt::Display for EntityRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(number) = self;
        number.fmt(f)
    }
}

/// Identity and revision of an entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EntityHeader {
    pub uid: EntityUid,
    pub rev: EntityRevision,
}

impl EntityHeader {
    /// Header of a newly created entity with a random UID.
    #[must_use]
    pub fn initial_random() -> Self {
        Self {
            uid: EntityUid::random(),
            rev: EntityRevision::INITIAL,
        }
    }

    #[must_use]
    pub fn next_rev(self) -> Option<Self> {
        let Self { uid, rev } = self;
        rev.next().map(|rev| Self { uid, rev })
    }
}
