// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use cuebox_core::util::clock::UtcDateTimeMs;

#[macro_use]
mod macros;

pub mod collection;
pub mod member;

pub type RecordId = i64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordHeader<Id> {
    pub id: Id,
    pub created_at: UtcDateTimeMs,
    pub updated_at: UtcDateTimeMs,
}

pub mod prelude {
    use thiserror::Error;

    use cuebox_core::ordering::OrderingError;

    pub type PaginationOffset = u64;
    pub type PaginationLimit = u64;

    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Pagination {
        pub limit: Option<PaginationLimit>,
        pub offset: Option<PaginationOffset>,
    }

    impl Pagination {
        #[must_use]
        pub const fn has_offset(&self) -> bool {
            self.offset.is_some()
        }

        #[must_use]
        pub const fn is_paginated(&self) -> bool {
            self.limit.is_some() || self.has_offset()
        }
    }

    pub trait RecordCollector {
        type Header;
        type Record;

        /// Collect a new element
        fn collect(&mut self, header: Self::Header, record: Self::Record);
    }

    impl<H, R> RecordCollector for Vec<(H, R)> {
        type Header = H;
        type Record = R;

        fn collect(&mut self, header: Self::Header, record: Self::Record) {
            self.push((header, record));
        }
    }

    pub trait ReservableRecordCollector: RecordCollector {
        /// Reserve additional capacity for new elements
        fn reserve(&mut self, additional: usize);
    }

    impl<H, R> ReservableRecordCollector for Vec<(H, R)> {
        fn reserve(&mut self, additional: usize) {
            Vec::reserve(self, additional);
        }
    }

    #[derive(Error, Debug)]
    pub enum RepoError {
        #[error("not found")]
        NotFound,

        #[error("conflict")]
        Conflict,

        #[error("aborted")]
        Aborted,

        /// Validation failed before any row was touched.
        #[error(transparent)]
        Ordering(#[from] OrderingError),

        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }

    pub type RepoResult<T> = Result<T, RepoError>;

    pub trait OptionalRepoResult<T> {
        fn optional(self) -> RepoResult<Option<T>>;
    }

    impl<T> OptionalRepoResult<T> for Result<T, RepoError> {
        fn optional(self) -> RepoResult<Option<T>> {
            self.map_or_else(
                |err| {
                    if matches!(err, RepoError::NotFound) {
                        Ok(None)
                    } else {
                        Err(err)
                    }
                },
                |val| Ok(Some(val)),
            )
        }
    }
}
