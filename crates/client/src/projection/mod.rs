// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

//! Optimistic, per-collection projections of durable member sequences.
//!
//! Every mutation is applied speculatively to the cached sequence before
//! the corresponding durable operation has been confirmed. The
//! pre-mutation snapshot is retained until the durable outcome is known:
//! a commit marks the projection stale so it gets refreshed from the
//! store, a rollback restores the snapshot verbatim.

use std::collections::HashMap;

use thiserror::Error;

use cuebox_core::{
    CollectionUid,
    collection::Entity as CollectionEntity,
    member::{Member, PatchOperation, UnsupportedItemKind, validate_item_kinds},
    ordering::{self, OrderingError, PatchOutcome},
};

use crate::util::remote::{PendingToken, RemoteData};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("no projection cached for this collection")]
    NotCached,

    /// Only a single mutation per collection may be in flight. Callers
    /// queue subsequent mutations until the pending one has been
    /// reconciled.
    #[error("another mutation is pending")]
    Pending,

    /// The cached sequence diverged from durable state and must be
    /// refreshed before further speculation.
    #[error("projection is stale and must be refreshed")]
    Stale,

    #[error(transparent)]
    UnsupportedItemKind(#[from] UnsupportedItemKind),

    #[error(transparent)]
    Ordering(#[from] OrderingError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMutation {
    /// Reconciliation handle for the in-flight durable operation.
    pub token: PendingToken,

    pub outcome: PatchOutcome,
}

#[derive(Debug)]
struct PendingMutation {
    token: PendingToken,

    /// Pre-mutation member sequence, restored verbatim on rollback.
    snapshot: Vec<Member>,
}

/// Cached member sequence of a single collection.
#[derive(Debug)]
pub struct CollectionProjection {
    entity: CollectionEntity,
    members: RemoteData<Vec<Member>>,
    pending_mutation: Option<PendingMutation>,
}

impl CollectionProjection {
    #[must_use]
    pub fn new(entity: CollectionEntity, members: Vec<Member>) -> Self {
        Self {
            entity,
            members: RemoteData::ready_now(members),
            pending_mutation: None,
        }
    }

    #[must_use]
    pub const fn entity(&self) -> &CollectionEntity {
        &self.entity
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        self.members
            .last_value()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.members.is_pending()
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.members.is_stale()
    }

    /// Apply a mutation speculatively.
    ///
    /// Validation and planning run against the cached sequence; on
    /// success the sequence is replaced synchronously and the returned
    /// token awaits reconciliation with the durable outcome. Validation
    /// errors never reach the durable layer.
    pub fn apply(&mut self, operation: &PatchOperation) -> Result<AppliedMutation, ProjectionError> {
        if self.is_stale() {
            return Err(ProjectionError::Stale);
        }
        if self.is_pending() {
            return Err(ProjectionError::Pending);
        }
        if let PatchOperation::Insert {
            members: new_members,
            ..
        } = operation
        {
            validate_item_kinds(
                self.entity.body.kind,
                new_members.iter().map(|member| &member.item),
            )?;
        }
        let snapshot = self.members.last_value().cloned().unwrap_or_default();
        let mut next = snapshot.clone();
        let outcome = ordering::apply_patch(&mut next, operation)?;
        let Some(token) = self.members.try_start_pending_now() else {
            return Err(ProjectionError::Pending);
        };
        self.members.set_value_now(next);
        self.pending_mutation = Some(PendingMutation { token, snapshot });
        Ok(AppliedMutation { token, outcome })
    }

    /// Reconcile a committed durable operation.
    ///
    /// The speculative value is kept, but the projection is marked stale:
    /// concurrent durable-side changes are not reflected by the
    /// speculative patch, so the sequence must be refreshed from the
    /// store before further speculation. Returns `false` for outdated
    /// tokens.
    pub fn finish_committed(&mut self, token: PendingToken) -> bool {
        if !self.members.finish_pending(token) {
            log::debug!("Discarding outcome of outdated mutation {token:?}");
            return false;
        }
        self.pending_mutation = None;
        self.members.mark_stale();
        true
    }

    /// Reconcile a failed durable operation.
    ///
    /// The retained pre-mutation snapshot is restored verbatim,
    /// discarding the speculative change. Returns `false` for outdated
    /// tokens.
    pub fn finish_rolled_back(&mut self, token: PendingToken) -> bool {
        if !self.members.finish_pending(token) {
            log::debug!("Discarding outcome of outdated mutation {token:?}");
            return false;
        }
        if let Some(PendingMutation {
            token: pending_token,
            snapshot,
        }) = self.pending_mutation.take()
        {
            debug_assert_eq!(pending_token, token);
            self.members.set_value_now(snapshot);
        }
        true
    }

    /// Replace the projection wholesale with authoritative state.
    ///
    /// Any in-flight mutation is abandoned, its token outdated and any
    /// further local speculation discarded.
    pub fn refresh(&mut self, entity: CollectionEntity, members: Vec<Member>) {
        self.pending_mutation = None;
        self.entity = entity;
        self.members.replace_value_now(members);
    }
}

/// Projections of all collections known to the client, by collection UID.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    projections: HashMap<CollectionUid, CollectionProjection>,
}

impl ProjectionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, uid: &CollectionUid) -> Option<&CollectionProjection> {
        self.projections.get(uid)
    }

    #[must_use]
    pub fn get_mut(&mut self, uid: &CollectionUid) -> Option<&mut CollectionProjection> {
        self.projections.get_mut(uid)
    }

    pub fn remove(&mut self, uid: &CollectionUid) -> Option<CollectionProjection> {
        self.projections.remove(uid)
    }

    /// Cache or replace the projection with freshly loaded state.
    pub fn refresh(
        &mut self,
        entity: CollectionEntity,
        members: Vec<Member>,
    ) -> &mut CollectionProjection {
        let uid = entity.hdr.uid;
        match self.projections.entry(uid) {
            std::collections::hash_map::Entry::Occupied(entry) => {
                let projection = entry.into_mut();
                projection.refresh(entity, members);
                projection
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(CollectionProjection::new(entity, members))
            }
        }
    }

    pub fn apply(
        &mut self,
        uid: &CollectionUid,
        operation: &PatchOperation,
    ) -> Result<AppliedMutation, ProjectionError> {
        let projection = self
            .projections
            .get_mut(uid)
            .ok_or(ProjectionError::NotCached)?;
        projection.apply(operation)
    }

    pub fn finish_committed(&mut self, uid: &CollectionUid, token: PendingToken) -> bool {
        self.projections
            .get_mut(uid)
            .is_some_and(|projection| projection.finish_committed(token))
    }

    pub fn finish_rolled_back(&mut self, uid: &CollectionUid, token: PendingToken) -> bool {
        self.projections
            .get_mut(uid)
            .is_some_and(|projection| projection.finish_rolled_back(token))
    }
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////
