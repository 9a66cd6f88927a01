// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

macro_rules! record_id_newtype {
    ($type_name:ident) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $type_name($crate::RecordId);

        impl $type_name {
            #[must_use]
            pub const fn new(inner: $crate::RecordId) -> Self {
                Self(inner)
            }

            #[must_use]
            pub const fn to_inner(self) -> $crate::RecordId {
                let Self(inner) = self;
                inner
            }
        }

        impl From<$crate::RecordId> for $type_name {
            fn from(from: $crate::RecordId) -> Self {
                Self::new(from)
            }
        }

        impl From<$type_name> for $crate::RecordId {
            fn from(from: $type_name) -> Self {
                from.to_inner()
            }
        }
    };
}
