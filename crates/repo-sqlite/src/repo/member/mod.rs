// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use diesel::dsl::count_star;

use cuebox_core::{
    member::{InsertOutcome, Item, Member},
    ordering::{
        self, LedgerEntry, Position, PositionLedger, PositionShift,
    },
};
use cuebox_repo::{
    collection::RecordId as CollectionId,
    member::{MemberRepo, MembersSummary},
    prelude::*,
};

use crate::{
    db::{collection_item as item_db, collection_macro as macro_db},
    prelude::*,
};

/// Rows are parked below the valid position range while a move is in
/// progress, keeping the unique (collection_id, position) constraint
/// satisfied at any time.
const PARKED_POSITION: i64 = -1;

fn shift_item_positions(
    db: &mut crate::Connection<'_>,
    collection_id: CollectionId,
    shift: &PositionShift,
) -> RepoResult<usize> {
    use item_db::schema::*;
    // The position column cannot be updated by a single SQL statement.
    // The update would fail with a UNIQUE constraint violation unless
    // the rows are updated in an order that ensures uniqueness at any
    // time: descending positions when shifting up, ascending positions
    // when shifting down.
    let row_ids_query = collection_item::table
        .select(collection_item::row_id)
        .filter(collection_item::collection_id.eq(RowId::from(collection_id)))
        .filter(collection_item::position.ge(shift.range.start as i64))
        .filter(collection_item::position.lt(shift.range.end as i64));
    let row_ids = if shift.descending() {
        row_ids_query
            .order_by(collection_item::position.desc())
            .load::<RowId>(db.as_mut())
    } else {
        row_ids_query
            .order_by(collection_item::position.asc())
            .load::<RowId>(db.as_mut())
    }
    .map_err(repo_error)?;
    let mut rows_updated = 0;
    for row_id in row_ids {
        rows_updated +=
            diesel::update(collection_item::table.filter(collection_item::row_id.eq(row_id)))
                .set(collection_item::position.eq(collection_item::position + shift.delta))
                .execute(db.as_mut())
                .map_err(repo_error)?;
    }
    Ok(rows_updated)
}

fn shift_macro_positions(
    db: &mut crate::Connection<'_>,
    collection_id: CollectionId,
    shift: &PositionShift,
) -> RepoResult<usize> {
    use macro_db::schema::*;
    let row_ids_query = collection_macro::table
        .select(collection_macro::row_id)
        .filter(collection_macro::collection_id.eq(RowId::from(collection_id)))
        .filter(collection_macro::position.ge(shift.range.start as i64))
        .filter(collection_macro::position.lt(shift.range.end as i64));
    let row_ids = if shift.descending() {
        row_ids_query
            .order_by(collection_macro::position.desc())
            .load::<RowId>(db.as_mut())
    } else {
        row_ids_query
            .order_by(collection_macro::position.asc())
            .load::<RowId>(db.as_mut())
    }
    .map_err(repo_error)?;
    let mut rows_updated = 0;
    for row_id in row_ids {
        rows_updated +=
            diesel::update(collection_macro::table.filter(collection_macro::row_id.eq(row_id)))
                .set(collection_macro::position.eq(collection_macro::position + shift.delta))
                .execute(db.as_mut())
                .map_err(repo_error)?;
    }
    Ok(rows_updated)
}

/// Shift occupants of the given position range across both member kinds.
fn shift_member_positions(
    db: &mut crate::Connection<'_>,
    collection_id: CollectionId,
    shift: &PositionShift,
) -> RepoResult<usize> {
    debug_assert!(!shift.is_empty());
    let rows_updated = shift_item_positions(db, collection_id, shift)?
        + shift_macro_positions(db, collection_id, shift)?;
    Ok(rows_updated)
}

fn set_member_position(
    db: &mut crate::Connection<'_>,
    collection_id: CollectionId,
    item: &Item,
    position: i64,
) -> RepoResult<()> {
    let rows_affected = match item {
        Item::File { uid } => {
            use item_db::schema::*;
            diesel::update(
                collection_item::table
                    .filter(collection_item::collection_id.eq(RowId::from(collection_id)))
                    .filter(collection_item::item_uid.eq(encode_entity_uid(uid))),
            )
            .set(collection_item::position.eq(position))
            .execute(db.as_mut())
            .map_err(repo_error)?
        }
        Item::Macro { uid } => {
            use macro_db::schema::*;
            diesel::update(
                collection_macro::table
                    .filter(collection_macro::collection_id.eq(RowId::from(collection_id)))
                    .filter(collection_macro::macro_uid.eq(encode_entity_uid(uid))),
            )
            .set(collection_macro::position.eq(position))
            .execute(db.as_mut())
            .map_err(repo_error)?
        }
    };
    debug_assert!(rows_affected <= 1);
    if rows_affected < 1 {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

fn insert_member_row(
    db: &mut crate::Connection<'_>,
    collection_id: CollectionId,
    position: Position,
    created_at: UtcDateTimeMs,
    member: &Member,
) -> RepoResult<()> {
    let rows_affected = match member.item {
        Item::File { uid } => {
            use item_db::{models::InsertableRecord, schema::*};
            let insertable =
                InsertableRecord::bind(collection_id, uid, position as i64, created_at, member);
            diesel::insert_into(collection_item::table)
                .values(&insertable)
                .execute(db.as_mut())
                .map_err(repo_error)?
        }
        Item::Macro { uid } => {
            use macro_db::{models::InsertableRecord, schema::*};
            let insertable =
                InsertableRecord::bind(collection_id, uid, position as i64, created_at, member);
            diesel::insert_into(collection_macro::table)
                .values(&insertable)
                .execute(db.as_mut())
                .map_err(repo_error)?
        }
    };
    debug_assert_eq!(1, rows_affected);
    Ok(())
}

impl MemberRepo for crate::Connection<'_> {
    fn load_position_ledger(
        &mut self,
        collection_id: CollectionId,
    ) -> RepoResult<PositionLedger> {
        let mut entries: Vec<LedgerEntry> = Vec::new();
        {
            use item_db::schema::*;
            let rows = collection_item::table
                .select((collection_item::item_uid, collection_item::position))
                .filter(collection_item::collection_id.eq(RowId::from(collection_id)))
                .load::<(String, i64)>(self.as_mut())
                .map_err(repo_error)?;
            entries.extend(rows.into_iter().map(|(uid, position)| LedgerEntry {
                item: Item::File {
                    uid: decode_entity_uid(&uid),
                },
                position: position as Position,
            }));
        }
        {
            use macro_db::schema::*;
            let rows = collection_macro::table
                .select((collection_macro::macro_uid, collection_macro::position))
                .filter(collection_macro::collection_id.eq(RowId::from(collection_id)))
                .load::<(String, i64)>(self.as_mut())
                .map_err(repo_error)?;
            entries.extend(rows.into_iter().map(|(uid, position)| LedgerEntry {
                item: Item::Macro {
                    uid: decode_entity_uid(&uid),
                },
                position: position as Position,
            }));
        }
        entries.sort_unstable_by_key(|entry| entry.position);
        Ok(PositionLedger::from_sorted(entries))
    }

    fn load_all_members(&mut self, collection_id: CollectionId) -> RepoResult<Vec<Member>> {
        let mut records: Vec<(i64, Member)> = Vec::new();
        {
            use item_db::{models::QueryableRecord, schema::*};
            let rows = collection_item::table
                .select((
                    collection_item::collection_id,
                    collection_item::item_uid,
                    collection_item::position,
                    collection_item::added_ms,
                    collection_item::title,
                ))
                .filter(collection_item::collection_id.eq(RowId::from(collection_id)))
                .load::<QueryableRecord>(self.as_mut())
                .map_err(repo_error)?;
            for row in rows {
                let (record_collection_id, position, member) = row.into();
                debug_assert_eq!(collection_id, record_collection_id);
                records.push((position, member));
            }
        }
        {
            use macro_db::{models::QueryableRecord, schema::*};
            let rows = collection_macro::table
                .select((
                    collection_macro::collection_id,
                    collection_macro::macro_uid,
                    collection_macro::position,
                    collection_macro::added_ms,
                    collection_macro::title,
                ))
                .filter(collection_macro::collection_id.eq(RowId::from(collection_id)))
                .load::<QueryableRecord>(self.as_mut())
                .map_err(repo_error)?;
            for row in rows {
                let (record_collection_id, position, member) = row.into();
                debug_assert_eq!(collection_id, record_collection_id);
                records.push((position, member));
            }
        }
        records.sort_unstable_by_key(|(position, _)| *position);
        debug_assert!(
            records
                .iter()
                .enumerate()
                .all(|(index, (position, _))| *position == index as i64)
        );
        Ok(records.into_iter().map(|(_, member)| member).collect())
    }

    fn count_members(&mut self, collection_id: CollectionId) -> RepoResult<usize> {
        let item_count = {
            use item_db::schema::*;
            collection_item::table
                .filter(collection_item::collection_id.eq(RowId::from(collection_id)))
                .select(count_star())
                .first::<i64>(self.as_mut())
                .map_err(repo_error)?
        };
        let macro_count = {
            use macro_db::schema::*;
            collection_macro::table
                .filter(collection_macro::collection_id.eq(RowId::from(collection_id)))
                .select(count_star())
                .first::<i64>(self.as_mut())
                .map_err(repo_error)?
        };
        Ok((item_count + macro_count) as usize)
    }

    fn load_members_summary(
        &mut self,
        collection_id: CollectionId,
    ) -> RepoResult<MembersSummary> {
        let (file_count, file_added_minmax) = {
            use item_db::schema::*;
            let count = collection_item::table
                .filter(collection_item::collection_id.eq(RowId::from(collection_id)))
                .select(count_star())
                .first::<i64>(self.as_mut())
                .map_err(repo_error)?;
            let minmax = collection_item::table
                .filter(collection_item::collection_id.eq(RowId::from(collection_id)))
                .select((
                    diesel::dsl::min(collection_item::added_ms),
                    diesel::dsl::max(collection_item::added_ms),
                ))
                .first::<(Option<i64>, Option<i64>)>(self.as_mut())
                .map_err(repo_error)?;
            (count as usize, minmax)
        };
        let (macro_count, macro_added_minmax) = {
            use macro_db::schema::*;
            let count = collection_macro::table
                .filter(collection_macro::collection_id.eq(RowId::from(collection_id)))
                .select(count_star())
                .first::<i64>(self.as_mut())
                .map_err(repo_error)?;
            let minmax = collection_macro::table
                .filter(collection_macro::collection_id.eq(RowId::from(collection_id)))
                .select((
                    diesel::dsl::min(collection_macro::added_ms),
                    diesel::dsl::max(collection_macro::added_ms),
                ))
                .first::<(Option<i64>, Option<i64>)>(self.as_mut())
                .map_err(repo_error)?;
            (count as usize, minmax)
        };
        let added_at_min = [file_added_minmax.0, macro_added_minmax.0]
            .into_iter()
            .flatten()
            .min();
        let added_at_max = [file_added_minmax.1, macro_added_minmax.1]
            .into_iter()
            .flatten()
            .max();
        let added_at_minmax = added_at_min.zip(added_at_max).map(|(min, max)| {
            (parse_timestamp_millis(min), parse_timestamp_millis(max))
        });
        Ok(MembersSummary {
            total_count: file_count + macro_count,
            file_count,
            macro_count,
            added_at_minmax,
        })
    }

    fn insert_members(
        &mut self,
        collection_id: CollectionId,
        before: Option<Position>,
        new_members: &[Member],
    ) -> RepoResult<InsertOutcome> {
        if new_members.is_empty() {
            return Ok(InsertOutcome::default());
        }
        let ledger = self.load_position_ledger(collection_id)?;
        let new_items: Vec<_> = new_members.iter().map(|member| member.item).collect();
        let plan = ordering::plan_insert(&ledger, &new_items, before)?;
        if let Some(shift) = &plan.shift {
            let rows_updated = shift_member_positions(self, collection_id, shift)?;
            log::debug!(
                "Shifted {rows_updated} members of collection {row_id} before inserting \
                 {num_new_members} members",
                row_id = RowId::from(collection_id),
                num_new_members = plan.inserted.len(),
            );
        }
        let created_at = UtcDateTimeMs::now();
        // Retain the first occurrence of each planned item, preserving
        // the batch order.
        let mut pending = plan.inserted.as_slice();
        let mut position = plan.insert_at;
        for member in new_members {
            if pending.first() != Some(&member.item) {
                continue;
            }
            pending = &pending[1..];
            insert_member_row(self, collection_id, position, created_at, member)?;
            position += 1;
        }
        debug_assert!(pending.is_empty());
        Ok(plan.outcome())
    }

    fn remove_members(
        &mut self,
        collection_id: CollectionId,
        items: &[Item],
    ) -> RepoResult<usize> {
        if items.is_empty() {
            return Ok(0);
        }
        let ledger = self.load_position_ledger(collection_id)?;
        let plan = ordering::plan_remove(&ledger, items);
        if plan.removals.is_empty() {
            return Ok(0);
        }
        let file_uids: Vec<_> = items
            .iter()
            .filter(|item| item.is_file())
            .map(|item| encode_entity_uid(&item.uid()))
            .collect();
        let macro_uids: Vec<_> = items
            .iter()
            .filter(|item| item.is_macro())
            .map(|item| encode_entity_uid(&item.uid()))
            .collect();
        let mut rows_deleted = 0;
        if !file_uids.is_empty() {
            use item_db::schema::*;
            rows_deleted += diesel::delete(
                collection_item::table
                    .filter(collection_item::collection_id.eq(RowId::from(collection_id)))
                    .filter(collection_item::item_uid.eq_any(&file_uids)),
            )
            .execute(self.as_mut())
            .map_err(repo_error)?;
        }
        if !macro_uids.is_empty() {
            use macro_db::schema::*;
            rows_deleted += diesel::delete(
                collection_macro::table
                    .filter(collection_macro::collection_id.eq(RowId::from(collection_id)))
                    .filter(collection_macro::macro_uid.eq_any(&macro_uids)),
            )
            .execute(self.as_mut())
            .map_err(repo_error)?;
        }
        debug_assert_eq!(rows_deleted, plan.removals.len());
        for shift in &plan.shifts {
            shift_member_positions(self, collection_id, shift)?;
        }
        Ok(rows_deleted)
    }

    fn move_member(
        &mut self,
        collection_id: CollectionId,
        item: &Item,
        target: Position,
    ) -> RepoResult<()> {
        let ledger = self.load_position_ledger(collection_id)?;
        let plan = ordering::plan_move(&ledger, item, target)?;
        if plan.is_no_op() {
            return Ok(());
        }
        set_member_position(self, collection_id, item, PARKED_POSITION)?;
        if let Some(shift) = &plan.shift {
            shift_member_positions(self, collection_id, shift)?;
        }
        set_member_position(self, collection_id, item, plan.to as i64)?;
        log::debug!(
            "Moved member of collection {row_id} from position {from} to {to}",
            row_id = RowId::from(collection_id),
            from = plan.from,
            to = plan.to,
        );
        Ok(())
    }

    fn move_member_range(
        &mut self,
        collection_id: CollectionId,
        start: Position,
        end: Position,
        target: Position,
    ) -> RepoResult<()> {
        let ledger = self.load_position_ledger(collection_id)?;
        let plan = ordering::plan_move_range(&ledger, start, end, target)?;
        if plan.is_no_op() {
            return Ok(());
        }
        let block = &ledger.entries()[plan.source.clone()];
        for (offset, entry) in block.iter().enumerate() {
            set_member_position(
                self,
                collection_id,
                &entry.item,
                PARKED_POSITION - offset as i64,
            )?;
        }
        if let Some(shift) = &plan.shift {
            shift_member_positions(self, collection_id, shift)?;
        }
        for (offset, entry) in block.iter().enumerate() {
            set_member_position(
                self,
                collection_id,
                &entry.item,
                (plan.to + offset) as i64,
            )?;
        }
        log::debug!(
            "Moved {num_moved_members} members of collection {row_id} to position {to}",
            num_moved_members = block.len(),
            row_id = RowId::from(collection_id),
            to = plan.to,
        );
        Ok(())
    }

    fn remove_all_members(&mut self, collection_id: CollectionId) -> RepoResult<usize> {
        let item_rows_deleted = {
            use item_db::schema::*;
            diesel::delete(
                collection_item::table
                    .filter(collection_item::collection_id.eq(RowId::from(collection_id))),
            )
            .execute(self.as_mut())
            .map_err(repo_error)?
        };
        let macro_rows_deleted = {
            use macro_db::schema::*;
            diesel::delete(
                collection_macro::table
                    .filter(collection_macro::collection_id.eq(RowId::from(collection_id))),
            )
            .execute(self.as_mut())
            .map_err(repo_error)?
        };
        Ok(item_rows_deleted + macro_rows_deleted)
    }
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests;
