// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use test_log::test;

use cuebox_core::{
    CollectionKind, EntityHeader,
    collection::{Collection, Entity as CollectionEntity},
    member::{Item, ItemUid, Member},
    ordering::OrderingError,
};
use cuebox_repo::collection::{EntityRepo as _, RecordId as CollectionId};

use super::*;
use crate::prelude::tests::*;

struct Fixture {
    db: DbConnection,
    collection_id: CollectionId,
}

impl Fixture {
    fn new(kind: CollectionKind) -> TestResult<Self> {
        let mut db = establish_connection()?;
        let collection = Collection {
            title: "Collection".into(),
            kind,
            notes: None,
        };
        let collection_entity =
            CollectionEntity::new(EntityHeader::initial_random(), collection);
        let collection_id = crate::Connection::new(&mut db)
            .insert_collection_entity(UtcDateTimeMs::now(), &collection_entity)?;
        Ok(Self { db, collection_id })
    }

    fn loaded_members(&mut self) -> TestResult<Vec<Member>> {
        let mut db = crate::Connection::new(&mut self.db);
        Ok(db.load_all_members(self.collection_id)?)
    }

    fn assert_dense_positions(&mut self) -> TestResult<()> {
        let mut db = crate::Connection::new(&mut self.db);
        let ledger = db.load_position_ledger(self.collection_id)?;
        for (index, entry) in ledger.entries().iter().enumerate() {
            assert_eq!(index, entry.position);
        }
        Ok(())
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

fn new_file_member_with_title(title: String) -> Member {
    Member {
        added_at: UtcDateTimeMs::now(),
        title: Some(title),
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

fn new_file_members(count: usize) -> Vec<Member> {
    (0..count).map(|_| new_file_member()).collect()
}

#[test]
fn prepend_append_members() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let collection_id = fixture.collection_id;

    let members = new_file_members(10);
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        let outcome = db.append_members(collection_id, &members)?;
        assert_eq!(members.len(), outcome.inserted);
    }

    // Prepend member
    let first = new_file_member_with_title("First".to_string());
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.prepend_members(collection_id, std::slice::from_ref(&first))?;
    }
    let loaded = fixture.loaded_members()?;
    assert_eq!(members.len() + 1, loaded.len());
    assert_eq!(Some(&first), loaded.first());
    assert_eq!(&members, &loaded[1..]);

    // Append member
    let last = new_file_member_with_title("Last".to_string());
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.append_members(collection_id, std::slice::from_ref(&last))?;
    }
    let loaded = fixture.loaded_members()?;
    assert_eq!(members.len() + 2, loaded.len());
    assert_eq!(Some(&first), loaded.first());
    assert_eq!(Some(&last), loaded.last());
    assert_eq!(&members, &loaded[1..loaded.len() - 1]);

    fixture.assert_dense_positions()?;
    Ok(())
}

#[test]
fn insert_members_shifts_the_tail() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let collection_id = fixture.collection_id;

    let members = new_file_members(4);
    let inserted = new_file_members(2);
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.append_members(collection_id, &members)?;
        db.insert_members(collection_id, Some(1), &inserted)?;
    }

    let mut expected = members.clone();
    expected.splice(1..1, inserted);
    assert_eq!(expected, fixture.loaded_members()?);
    fixture.assert_dense_positions()?;
    Ok(())
}

#[test]
fn insert_members_skips_duplicates() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let collection_id = fixture.collection_id;

    let members = new_file_members(3);
    let fresh = new_file_member();
    let mut db = crate::Connection::new(&mut fixture.db);
    db.append_members(collection_id, &members)?;

    let outcome =
        db.insert_members(collection_id, Some(0), &[members[1].clone(), fresh.clone()])?;
    assert_eq!(1, outcome.inserted);
    assert_eq!(vec![members[1].item], outcome.duplicates);

    let loaded = db.load_all_members(collection_id)?;
    assert_eq!(members.len() + 1, loaded.len());
    assert_eq!(Some(&fresh), loaded.first());
    assert_eq!(&members, &loaded[1..]);
    Ok(())
}

#[test]
fn insert_members_beyond_count_is_rejected() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let collection_id = fixture.collection_id;

    let mut db = crate::Connection::new(&mut fixture.db);
    db.append_members(collection_id, &new_file_members(2))?;
    let err = db
        .insert_members(collection_id, Some(3), &[new_file_member()])
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Ordering(OrderingError::PositionOutOfBounds {
            position: 3,
            count: 2
        })
    ));
    assert_eq!(2, db.count_members(collection_id)?);
    Ok(())
}

#[test]
fn remove_members_closes_gaps() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::SfxSet)?;
    let collection_id = fixture.collection_id;

    let members = new_file_members(6);
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.append_members(collection_id, &members)?;
        let removed = db.remove_members(
            collection_id,
            &[members[1].item, members[4].item, Item::File {
                uid: ItemUid::random(),
            }],
        )?;
        // Unknown items are ignored.
        assert_eq!(2, removed);
    }

    let expected = vec![
        members[0].clone(),
        members[2].clone(),
        members[3].clone(),
        members[5].clone(),
    ];
    assert_eq!(expected, fixture.loaded_members()?);
    fixture.assert_dense_positions()?;
    Ok(())
}

#[test]
fn move_member_forward_and_backward() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let collection_id = fixture.collection_id;

    let members = new_file_members(4);
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.append_members(collection_id, &members)?;
        // Members [A@0, B@1, C@2, D@3]: moving A to the end slot.
        db.move_member(collection_id, &members[0].item, 4)?;
    }
    let expected = vec![
        members[1].clone(),
        members[2].clone(),
        members[3].clone(),
        members[0].clone(),
    ];
    assert_eq!(expected, fixture.loaded_members()?);

    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.move_member(collection_id, &members[0].item, 0)?;
    }
    assert_eq!(members, fixture.loaded_members()?);
    fixture.assert_dense_positions()?;
    Ok(())
}

#[test]
fn move_member_to_current_position_is_a_no_op() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let collection_id = fixture.collection_id;

    let members = new_file_members(3);
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.append_members(collection_id, &members)?;
        db.move_member(collection_id, &members[1].item, 1)?;
        db.move_member(collection_id, &members[1].item, 2)?;
    }
    assert_eq!(members, fixture.loaded_members()?);
    Ok(())
}

#[test]
fn move_member_range_forward_and_backward() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::AmbienceSet)?;
    let collection_id = fixture.collection_id;

    let members = new_file_members(5);
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.append_members(collection_id, &members)?;
        // Moving [1, 2] before position 5 lands the block at [3, 5).
        db.move_member_range(collection_id, 1, 2, 5)?;
    }
    let expected = vec![
        members[0].clone(),
        members[3].clone(),
        members[4].clone(),
        members[1].clone(),
        members[2].clone(),
    ];
    assert_eq!(expected, fixture.loaded_members()?);

    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.move_member_range(collection_id, 3, 4, 1)?;
    }
    assert_eq!(members, fixture.loaded_members()?);
    fixture.assert_dense_positions()?;
    Ok(())
}

#[test]
fn macro_container_shifts_span_both_member_kinds() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::MacroContainer)?;
    let collection_id = fixture.collection_id;

    // Two files at positions 0 and 1, one macro group at position 2.
    let files = new_file_members(2);
    let group = new_macro_member();
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.append_members(collection_id, &files)?;
        db.append_members(collection_id, std::slice::from_ref(&group))?;
    }

    // Inserting a file at position 1 shifts the macro group to 3.
    let inserted = new_file_member();
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.insert_members(collection_id, Some(1), std::slice::from_ref(&inserted))?;
    }
    let expected = vec![
        files[0].clone(),
        inserted,
        files[1].clone(),
        group.clone(),
    ];
    assert_eq!(expected, fixture.loaded_members()?);
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        let ledger = db.load_position_ledger(collection_id)?;
        assert_eq!(Some(3), ledger.position_of(&group.item));
    }

    // Moving the macro group to the front shifts the files up.
    {
        let mut db = crate::Connection::new(&mut fixture.db);
        db.move_member(collection_id, &group.item, 0)?;
    }
    let loaded = fixture.loaded_members()?;
    assert_eq!(Some(&group), loaded.first());
    assert_eq!(4, loaded.len());
    fixture.assert_dense_positions()?;
    Ok(())
}

#[test]
fn remove_all_members_empties_the_collection() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::MacroContainer)?;
    let collection_id = fixture.collection_id;

    let mut db = crate::Connection::new(&mut fixture.db);
    db.append_members(collection_id, &new_file_members(3))?;
    db.append_members(collection_id, std::slice::from_ref(&new_macro_member()))?;
    assert_eq!(4, db.count_members(collection_id)?);

    assert_eq!(4, db.remove_all_members(collection_id)?);
    assert_eq!(0, db.count_members(collection_id)?);
    assert!(db.load_all_members(collection_id)?.is_empty());
    Ok(())
}

#[test]
fn members_summary_counts_both_kinds() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::MacroContainer)?;
    let collection_id = fixture.collection_id;

    let mut db = crate::Connection::new(&mut fixture.db);
    let summary = db.load_members_summary(collection_id)?;
    assert_eq!(MembersSummary::default(), summary);

    db.append_members(collection_id, &new_file_members(3))?;
    db.append_members(collection_id, std::slice::from_ref(&new_macro_member()))?;

    let summary = db.load_members_summary(collection_id)?;
    assert_eq!(4, summary.total_count);
    assert_eq!(3, summary.file_count);
    assert_eq!(1, summary.macro_count);
    assert!(summary.added_at_minmax.is_some());
    Ok(())
}

#[test]
fn purging_the_collection_cascades_to_members() -> TestResult<()> {
    let mut fixture = Fixture::new(CollectionKind::Playlist)?;
    let collection_id = fixture.collection_id;

    let mut db = crate::Connection::new(&mut fixture.db);
    db.append_members(collection_id, &new_file_members(3))?;
    db.purge_collection_entity(collection_id)?;
    assert_eq!(0, db.count_members(collection_id)?);
    Ok(())
}
