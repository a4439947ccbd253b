//! Create-once policy for the flag.
//!
//! CTFd offers no per-challenge flag listing, so the flag is created at
//! root creation and never updated or re-read afterwards.

use ctfd_gateway::CtfdApi;
use ctfd_schemas::{ChallengeId, Flag, SubresourceKind};
use tracing::info;

use super::{Pass, Strategy};
use crate::codec;
use crate::diagnostics::{summary, Severity};
use crate::error::InvariantViolation;

pub struct FlagOnce;

impl FlagOnce {
    fn create<A: CtfdApi>(pass: &mut Pass<'_, A>, root: ChallengeId, flag: &Flag) -> Option<Flag> {
        match pass.gateway().create_flag(&codec::flag_create(root, flag)) {
            Ok(remote) => {
                info!(challenge_id = %root, flag_id = remote.id, "reconcile/flag_created");
                Some(Flag {
                    remote_id: Some(remote.id),
                    ..flag.clone()
                })
            }
            Err(e) => {
                pass.remote_failure(
                    Severity::Error,
                    format!("Unable to create flag for challenge {root}"),
                    &e,
                );
                None
            }
        }
    }
}

impl Strategy for FlagOnce {
    type State = Option<Flag>;

    fn kind(&self) -> SubresourceKind {
        SubresourceKind::Flag
    }

    fn reconcile<A: CtfdApi>(
        &self,
        pass: &mut Pass<'_, A>,
        root: ChallengeId,
        old: Option<&Option<Flag>>,
        new: &Option<Flag>,
    ) -> Result<Option<Flag>, InvariantViolation> {
        let Some(prior) = old else {
            return Ok(new.as_ref().and_then(|flag| Self::create(pass, root, flag)));
        };

        let unchanged = match (prior, new) {
            (Some(a), Some(b)) => a.same_declaration(b),
            (None, None) => true,
            _ => false,
        };
        if !unchanged {
            pass.warn(
                summary::UNAPPLIED,
                format!(
                    "Flag of challenge {root} differs from the declaration; flags are only \
                     set when the challenge is created"
                ),
            );
        }
        Ok(prior.clone())
    }
}
