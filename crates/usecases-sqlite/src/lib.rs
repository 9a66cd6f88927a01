// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

//! Transaction-wrapped entry points for the repository operations.
//!
//! Every mutation runs as a single transaction: open, bump the owning
//! collection's entity revision, apply the operation, commit. On any
//! error the whole transaction rolls back and the durable state remains
//! exactly as before the operation.

use thiserror::Error;

use cuebox_core::member::UnsupportedItemKind;
use cuebox_repo::prelude::RepoError;
use cuebox_repo_sqlite::prelude::{Connection as RepoConnection, DieselTransactionError};

pub mod collection;
pub mod member;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Input(anyhow::Error),

    #[error(transparent)]
    UnsupportedItemKind(#[from] UnsupportedItemKind),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl<E> From<DieselTransactionError<E>> for Error
where
    E: Into<Error>,
{
    fn from(err: DieselTransactionError<E>) -> Self {
        err.into_inner().into()
    }
}

pub type TransactionError = DieselTransactionError<Error>;

impl From<Error> for TransactionError {
    fn from(err: Error) -> Self {
        Self::new(err)
    }
}

fn transaction_error<E>(err: E) -> TransactionError
where
    E: Into<Error>,
{
    TransactionError::from(err.into())
}

pub type Result<T> = std::result::Result<T, Error>;
