// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use diesel::Connection as _;
use test_log::test;

use cuebox_core::{
    CollectionKind, EntityHeader,
    collection::Collection,
    member::{Item, ItemUid, Member},
    ordering::OrderingError,
    util::clock::UtcDateTimeMs,
};
use cuebox_repo::{member::MemberRepo as _, prelude::RepoError};
use cuebox_repo_sqlite::DbConnection;

use super::*;
use crate::{Error, RepoConnection, TransactionError, transaction_error};

type TestResult<T> = anyhow::Result<T>;

fn establish_connection() -> TestResult<DbConnection> {
    let mut connection =
        DbConnection::establish(":memory:").expect("in-memory database connection");
    cuebox_repo_sqlite::initialize_database(&mut connection)?;
    cuebox_repo_sqlite::run_migrations(&mut connection)
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(connection)
}

struct Fixture {
    db: DbConnection,
    entity_header: EntityHeader,
}

impl Fixture {
    fn new(kind: CollectionKind) -> TestResult<Self> {
        let mut db = establish_connection()?;
        let collection = Collection {
            title: "Collection".into(),
            kind,
            notes: None,
        };
        let entity = crate::collection::create(&mut db, collection)?;
        Ok(Self {
            db,
            entity_header: entity.hdr,
        })
    }

    fn refresh_entity_header(&mut self) -> TestResult<()> {
        let mut repo = RepoConnection::new(&mut self.db);
        use cuebox_repo::collection::EntityRepo as _;
        let (_, rev) = repo.resolve_collection_entity_revision(&self.entity_header.uid)?;
        self.entity_header.rev = rev;
        Ok(())
    }

    fn loaded_members(&mut self) -> TestResult<Vec<Member>> {
        let (_, members) = load_members(&mut self.db, &self.entity_header)?;
        Ok(members)
    }
}

fn new_file_member() -> Member {
    Member {
        added_at: UtcDateTimeMs::now(),
        title: None,
        item: Item::File {
            uid: ItemUid::random(),
        },
    }
}

fn new_macro_member() -> Member {
    Member {
        added_at: UtcDateTimeMs::now(),
        title: None,
        item: Item::Macro {
            uid: ItemUid::random(),
        },
    }
}

#[test]
fn insert_members_commits_and_bumps_revision() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let rev_before = fixture.entity_header.rev;

    let new_members = vec![new_file_member(), new_file_member()];
    let (_, outcome) = insert_members(
        &mut fixture.db,
        &fixture.entity_header,
        None,
        new_members.clone(),
    )?;
    assert_eq!(2, outcome.inserted);
    assert!(outcome.duplicates.is_empty());

    fixture.refresh_entity_header()?;
    assert_eq!(rev_before.next(), Some(fixture.entity_header.rev));
    assert_eq!(new_members, fixture.loaded_members()?);
    Ok(())
}

#[test]
fn insert_members_with_stale_revision_is_a_conflict() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    insert_members(
        &mut fixture.db,
        &fixture.entity_header,
        None,
        vec![new_file_member()],
    )?;

    // The header still carries the initial revision.
    let err = insert_members(
        &mut fixture.db,
        &fixture.entity_header,
        None,
        vec![new_file_member()],
    )
    .unwrap_err();
    assert!(matches!(err, Error::Repository(RepoError::Conflict)));

    // The rejected insert must not have left any rows behind.
    fixture.refresh_entity_header()?;
    assert_eq!(1, fixture.loaded_members()?.len());
    Ok(())
}

#[test]
fn mid_transaction_failure_rolls_back_all_shifts_and_inserts() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let members = vec![new_file_member(), new_file_member(), new_file_member()];
    insert_members(
        &mut fixture.db,
        &fixture.entity_header,
        None,
        members.clone(),
    )?;
    fixture.refresh_entity_header()?;
    let entity_header = fixture.entity_header;

    // Simulate a failure after the rows have already been shifted and
    // inserted within the open transaction.
    let result = fixture
        .db
        .transaction::<(), TransactionError, _>(|connection| {
            let mut repo = RepoConnection::new(connection);
            use cuebox_repo::collection::EntityRepo as _;
            let (record_header, _) = repo
                .touch_collection_entity_revision(&entity_header, UtcDateTimeMs::now())
                .map_err(transaction_error)?;
            let outcome = repo
                .insert_members(record_header.id, Some(0), &[new_file_member()])
                .map_err(transaction_error)?;
            assert_eq!(1, outcome.inserted);
            Err(transaction_error(RepoError::Aborted))
        });
    assert!(result.is_err());

    // Durable state is exactly as before the operation.
    fixture.refresh_entity_header()?;
    assert_eq!(entity_header.rev, fixture.entity_header.rev);
    assert_eq!(members, fixture.loaded_members()?);
    Ok(())
}

#[test]
fn invalid_move_target_is_rejected_without_mutation() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::SfxSet)?;
    let members = vec![new_file_member(), new_file_member()];
    insert_members(
        &mut fixture.db,
        &fixture.entity_header,
        None,
        members.clone(),
    )?;
    fixture.refresh_entity_header()?;
    let rev_before = fixture.entity_header.rev;

    let err = move_member(
        &mut fixture.db,
        &fixture.entity_header,
        &members[0].item,
        3,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Repository(RepoError::Ordering(OrderingError::PositionOutOfBounds {
            position: 3,
            count: 2
        }))
    ));

    // The revision bump has been rolled back together with the rest.
    fixture.refresh_entity_header()?;
    assert_eq!(rev_before, fixture.entity_header.rev);
    assert_eq!(members, fixture.loaded_members()?);
    Ok(())
}

#[test]
fn macro_members_are_rejected_outside_macro_containers() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let err = insert_members(
        &mut fixture.db,
        &fixture.entity_header,
        None,
        vec![new_macro_member()],
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedItemKind(_)));

    fixture.refresh_entity_header()?;
    assert!(fixture.loaded_members()?.is_empty());
    Ok(())
}

#[test]
fn macro_container_accepts_both_member_kinds() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::MacroContainer)?;
    let file = new_file_member();
    let group = new_macro_member();
    let (_, outcome) = insert_members(
        &mut fixture.db,
        &fixture.entity_header,
        None,
        vec![file.clone(), group.clone()],
    )?;
    assert_eq!(2, outcome.inserted);

    fixture.refresh_entity_header()?;
    assert_eq!(vec![file, group], fixture.loaded_members()?);
    Ok(())
}

#[test]
fn move_member_range_repositions_contiguous_block() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::AmbienceSet)?;
    let members = vec![
        new_file_member(),
        new_file_member(),
        new_file_member(),
        new_file_member(),
    ];
    insert_members(
        &mut fixture.db,
        &fixture.entity_header,
        None,
        members.clone(),
    )?;
    fixture.refresh_entity_header()?;

    // Members [A@0, B@1, C@2, D@3]: moving [B, C] to the front yields
    // [B@0, C@1, A@2, D@3].
    move_member_range(&mut fixture.db, &fixture.entity_header, 1, 2, 0)?;

    fixture.refresh_entity_header()?;
    let expected = vec![
        members[1].clone(),
        members[2].clone(),
        members[0].clone(),
        members[3].clone(),
    ];
    assert_eq!(expected, fixture.loaded_members()?);
    Ok(())
}
