// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

// Suppress warnings for diesel AsChangeset
#![allow(clippy::ref_option_ref)]
// recursion_limit was required for diesel
#![recursion_limit = "256"]

use diesel::{
    connection::SimpleConnection as _,
    migration::{MigrationVersion, Result as MigrationResult},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness as _, embed_migrations};

pub type DbBackend = diesel::sqlite::Sqlite;
pub type DbConnection = diesel::sqlite::SqliteConnection;

pub mod prelude {
    pub(crate) use std::ops::Deref;
    use std::ops::DerefMut;

    pub(crate) use cuebox_repo::prelude::*;
    pub(crate) use diesel::{prelude::*, result::Error as DieselError};

    pub(crate) use crate::util::{clock::*, entity::*, *};
    pub use crate::{DbBackend, DbConnection};

    pub use diesel::Connection as _;

    #[allow(missing_debug_implementations)]
    pub struct Connection<'db>(&'db mut DbConnection);

    impl<'db> Connection<'db> {
        pub fn new(inner: &'db mut DbConnection) -> Self {
            Self(inner)
        }
    }

    impl<'db> From<&'db mut DbConnection> for Connection<'db> {
        fn from(inner: &'db mut DbConnection) -> Self {
            Self::new(inner)
        }
    }

    impl AsRef<DbConnection> for Connection<'_> {
        fn as_ref(&self) -> &DbConnection {
            self.0
        }
    }

    impl AsMut<DbConnection> for Connection<'_> {
        fn as_mut(&mut self) -> &mut DbConnection {
            self.0
        }
    }

    impl Deref for Connection<'_> {
        type Target = DbConnection;

        fn deref(&self) -> &Self::Target {
            self.as_ref()
        }
    }

    impl DerefMut for Connection<'_> {
        fn deref_mut(&mut self) -> &mut Self::Target {
            self.as_mut()
        }
    }

    pub(crate) fn repo_error(err: DieselError) -> RepoError {
        use DieselError::*;
        match err {
            NotFound => RepoError::NotFound,
            err => anyhow::Error::from(err).into(),
        }
    }

    #[derive(Debug)]
    pub struct DieselTransactionError<E>(E);

    impl<E> DieselTransactionError<E> {
        pub const fn new(inner: E) -> Self {
            Self(inner)
        }

        pub fn into_inner(self) -> E {
            let Self(inner) = self;
            inner
        }
    }

    impl<E> From<DieselError> for DieselTransactionError<E>
    where
        E: From<RepoError>,
    {
        fn from(err: DieselError) -> Self {
            Self(repo_error(err).into())
        }
    }

    impl<E> From<RepoError> for DieselTransactionError<E>
    where
        E: From<RepoError>,
    {
        fn from(err: RepoError) -> Self {
            Self(err.into())
        }
    }

    pub type RepoTransactionError = DieselTransactionError<RepoError>;

    pub(crate) use cuebox_repo::RecordId as RowId;

    #[cfg(test)]
    pub mod tests {
        use diesel::Connection as _;

        use super::DbConnection;

        pub type TestResult<T> = anyhow::Result<T>;

        pub fn establish_connection() -> TestResult<DbConnection> {
            let mut connection =
                DbConnection::establish(":memory:").expect("in-memory database connection");
            crate::initialize_database(&mut connection)?;
            crate::run_migrations(&mut connection)
                .map_err(|err| anyhow::anyhow!(err.to_string()))?;
            Ok(connection)
        }
    }
}

pub mod repo;

mod db;
mod util;

use prelude::Connection;

/// Configure the database engine
///
/// The implementation of the repositories relies on a proper
/// configuration of the database engine like the behavior, e.g.
/// recursive cascading deletes.
///
/// Some values like the text encoding can only be changed once after the
/// database has initially been created.
pub fn initialize_database(connection: &mut DbConnection) -> diesel::QueryResult<()> {
    connection.batch_execute(
        r"
PRAGMA journal_mode = WAL;        -- better write-concurrency
PRAGMA synchronous = NORMAL;      -- fsync only in critical moments, safe for journal_mode = WAL
PRAGMA secure_delete = 0;         -- avoid some disk I/O
PRAGMA foreign_keys = 1;          -- check foreign key constraints
PRAGMA defer_foreign_keys = 1;    -- delay enforcement of foreign key constraints until commit
PRAGMA recursive_triggers = 1;    -- for recursive ON CASCADE DELETE actions
PRAGMA encoding = 'UTF-8';
",
    )
}

const EMBEDDED_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn run_migrations(connection: &mut DbConnection) -> MigrationResult<Vec<MigrationVersion<'_>>> {
    connection.run_pending_migrations(EMBEDDED_MIGRATIONS)
}
