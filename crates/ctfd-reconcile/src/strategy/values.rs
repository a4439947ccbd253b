//! Full-replace policy for value-only collections (tags, topics).
//!
//! Update: list the live collection, delete every entry, then create every
//! declared value in order. The first failure aborts the rest of the kind.

use std::marker::PhantomData;

use ctfd_gateway::wire::{TagCreate, TopicCreate};
use ctfd_gateway::{CtfdApi, Gateway, GatewayResult};
use ctfd_schemas::{ChallengeId, SubresourceKind};
use tracing::info;

use super::{Pass, Strategy};
use crate::diagnostics::Severity;
use crate::error::InvariantViolation;

/// A live entry of a value collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteValue {
    pub id: i64,
    pub value: String,
}

/// Remote verbs of one value collection kind.
pub trait ValueCollection {
    const KIND: SubresourceKind;

    fn list<A: CtfdApi>(gw: &Gateway<A>, root: ChallengeId) -> GatewayResult<Vec<RemoteValue>>;
    fn create<A: CtfdApi>(gw: &Gateway<A>, root: ChallengeId, value: &str) -> GatewayResult<()>;
    fn delete<A: CtfdApi>(gw: &Gateway<A>, remote_id: i64) -> GatewayResult<()>;
}

pub enum Tags {}

impl ValueCollection for Tags {
    const KIND: SubresourceKind = SubresourceKind::Tag;

    fn list<A: CtfdApi>(gw: &Gateway<A>, root: ChallengeId) -> GatewayResult<Vec<RemoteValue>> {
        Ok(gw
            .list_tags(root)?
            .into_iter()
            .map(|t| RemoteValue {
                id: t.id,
                value: t.value,
            })
            .collect())
    }

    fn create<A: CtfdApi>(gw: &Gateway<A>, root: ChallengeId, value: &str) -> GatewayResult<()> {
        gw.create_tag(&TagCreate {
            challenge: root.get(),
            value: value.to_string(),
        })
        .map(|_| ())
    }

    fn delete<A: CtfdApi>(gw: &Gateway<A>, remote_id: i64) -> GatewayResult<()> {
        gw.delete_tag(remote_id)
    }
}

pub enum Topics {}

impl ValueCollection for Topics {
    const KIND: SubresourceKind = SubresourceKind::Topic;

    fn list<A: CtfdApi>(gw: &Gateway<A>, root: ChallengeId) -> GatewayResult<Vec<RemoteValue>> {
        Ok(gw
            .list_topics(root)?
            .into_iter()
            .map(|t| RemoteValue {
                id: t.id,
                value: t.value,
            })
            .collect())
    }

    fn create<A: CtfdApi>(gw: &Gateway<A>, root: ChallengeId, value: &str) -> GatewayResult<()> {
        gw.create_topic(&TopicCreate::for_challenge(root, value))
            .map(|_| ())
    }

    fn delete<A: CtfdApi>(gw: &Gateway<A>, remote_id: i64) -> GatewayResult<()> {
        gw.delete_topic(remote_id)
    }
}

pub struct FullReplace<K: ValueCollection> {
    _kind: PhantomData<K>,
}

impl<K: ValueCollection> FullReplace<K> {
    pub const fn new() -> Self {
        Self { _kind: PhantomData }
    }
}

impl<K: ValueCollection> Default for FullReplace<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ValueCollection> Strategy for FullReplace<K> {
    type State = Vec<String>;

    fn kind(&self) -> SubresourceKind {
        K::KIND
    }

    fn reconcile<A: CtfdApi>(
        &self,
        pass: &mut Pass<'_, A>,
        root: ChallengeId,
        old: Option<&Vec<String>>,
        new: &Vec<String>,
    ) -> Result<Vec<String>, InvariantViolation> {
        let kind = K::KIND;
        let mut deleted = 0usize;

        if let Some(old) = old {
            let live = match K::list(pass.gateway(), root) {
                Ok(live) => live,
                Err(e) => {
                    pass.remote_failure(
                        Severity::Error,
                        format!("Unable to list {kind}s of challenge {root}"),
                        &e,
                    );
                    return Ok(old.clone());
                }
            };

            for (i, entry) in live.iter().enumerate() {
                if let Err(e) = K::delete(pass.gateway(), entry.id) {
                    pass.remote_failure(
                        Severity::Error,
                        format!(
                            "Unable to delete {kind} '{}' ({}) of challenge {root}",
                            entry.value, entry.id
                        ),
                        &e,
                    );
                    // entries from i on were never deleted
                    return Ok(live[i..].iter().map(|v| v.value.clone()).collect());
                }
                deleted += 1;
            }
        }

        let mut created = Vec::with_capacity(new.len());
        for value in new {
            if let Err(e) = K::create(pass.gateway(), root, value) {
                pass.remote_failure(
                    Severity::Error,
                    format!("Unable to create {kind} '{value}' for challenge {root}"),
                    &e,
                );
                return Ok(created);
            }
            created.push(value.clone());
        }

        info!(
            challenge_id = %root,
            kind = %kind,
            deleted,
            created = created.len(),
            "reconcile/full_replace"
        );
        Ok(created)
    }
}
