// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use test_log::test;

use cuebox_core::{
    CollectionKind, EntityHeader,
    collection::{Collection, Entity},
};
use cuebox_repo::collection::EntityWithMembersSummaryCollector;

use super::*;
use crate::prelude::tests::*;

fn new_collection_entity(title: &str, kind: CollectionKind) -> Entity {
    Entity::new(
        EntityHeader::initial_random(),
        Collection {
            title: title.into(),
            kind,
            notes: None,
        },
    )
}

#[test]
fn insert_and_load_collection_entity() -> TestResult<()> {
    let mut connection = establish_connection()?;
    let mut db = crate::Connection::new(&mut connection);

    let created_entity = new_collection_entity("Battle Music", CollectionKind::Playlist);
    let record_id = db.insert_collection_entity(UtcDateTimeMs::now(), &created_entity)?;

    let (record_header, loaded_entity) = db.load_collection_entity(record_id)?;
    assert_eq!(record_id, record_header.id);
    assert_eq!(created_entity, loaded_entity);

    assert_eq!(record_id, db.resolve_collection_id(&created_entity.hdr.uid)?);
    Ok(())
}

#[test]
fn touch_collection_entity_revision_with_outdated_revision_fails() -> TestResult<()> {
    let mut connection = establish_connection()?;
    let mut db = crate::Connection::new(&mut connection);

    let created_entity = new_collection_entity("Ambience", CollectionKind::AmbienceSet);
    db.insert_collection_entity(UtcDateTimeMs::now(), &created_entity)?;

    let (_, next_rev) =
        db.touch_collection_entity_revision(&created_entity.hdr, UtcDateTimeMs::now())?;
    assert_eq!(created_entity.hdr.rev.next(), Some(next_rev));

    // Touching again with the outdated header must fail.
    let err = db
        .touch_collection_entity_revision(&created_entity.hdr, UtcDateTimeMs::now())
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict));
    Ok(())
}

#[test]
fn update_collection_entity_replaces_the_body() -> TestResult<()> {
    let mut connection = establish_connection()?;
    let mut db = crate::Connection::new(&mut connection);

    let created_entity = new_collection_entity("Sfx", CollectionKind::SfxSet);
    let record_id = db.insert_collection_entity(UtcDateTimeMs::now(), &created_entity)?;

    let mut updated_entity = created_entity.clone();
    updated_entity.hdr = updated_entity.hdr.next_rev().expect("next revision");
    updated_entity.body.title = "Renamed".into();
    updated_entity.body.notes = Some("with notes".into());
    db.update_collection_entity(record_id, UtcDateTimeMs::now(), &updated_entity)?;

    let (_, loaded_entity) = db.load_collection_entity(record_id)?;
    assert_eq!(updated_entity, loaded_entity);
    Ok(())
}

#[test]
fn load_collection_entities_filtered_by_kind() -> TestResult<()> {
    let mut connection = establish_connection()?;
    let mut db = crate::Connection::new(&mut connection);

    db.insert_collection_entity(
        UtcDateTimeMs::now(),
        &new_collection_entity("Playlist 1", CollectionKind::Playlist),
    )?;
    db.insert_collection_entity(
        UtcDateTimeMs::now(),
        &new_collection_entity("Playlist 2", CollectionKind::Playlist),
    )?;
    db.insert_collection_entity(
        UtcDateTimeMs::now(),
        &new_collection_entity("Macros", CollectionKind::MacroContainer),
    )?;

    let mut collector = EntityWithMembersSummaryCollector::default();
    db.load_collection_entities(Some(CollectionKind::Playlist), None, &mut collector)?;
    let playlists = collector.finish();
    assert_eq!(2, playlists.len());
    assert!(
        playlists
            .iter()
            .all(|record| record.entity.body.kind == CollectionKind::Playlist)
    );

    let mut collector = EntityWithMembersSummaryCollector::default();
    db.load_collection_entities(None, None, &mut collector)?;
    assert_eq!(3, collector.finish().len());

    // Pagination
    let pagination = Pagination {
        limit: Some(1),
        offset: Some(2),
    };
    let mut collector = EntityWithMembersSummaryCollector::default();
    db.load_collection_entities(None, Some(&pagination), &mut collector)?;
    assert_eq!(1, collector.finish().len());
    Ok(())
}

#[test]
fn purge_collection_entity_not_found() -> TestResult<()> {
    let mut connection = establish_connection()?;
    let mut db = crate::Connection::new(&mut connection);

    let err = db.purge_collection_entity(4711.into()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
    Ok(())
}
