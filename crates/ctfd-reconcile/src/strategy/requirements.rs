//! Full-replace policy for the requirements singleton.
//!
//! On creation the block travels inside the root create payload, so the
//! creation pass issues no call. Every update sends the declared block
//! verbatim as one PATCH.

use ctfd_gateway::wire::{ChallengePatch, RequirementsWire};
use ctfd_gateway::CtfdApi;
use ctfd_schemas::{ChallengeId, Requirements, SubresourceKind};
use tracing::info;

use super::{Pass, Strategy};
use crate::codec;
use crate::diagnostics::Severity;
use crate::error::InvariantViolation;

pub struct RequirementsReplace;

impl Strategy for RequirementsReplace {
    type State = Option<Requirements>;

    fn kind(&self) -> SubresourceKind {
        SubresourceKind::Requirements
    }

    fn reconcile<A: CtfdApi>(
        &self,
        pass: &mut Pass<'_, A>,
        root: ChallengeId,
        old: Option<&Option<Requirements>>,
        new: &Option<Requirements>,
    ) -> Result<Option<Requirements>, InvariantViolation> {
        let Some(prior) = old else {
            return Ok(new.clone());
        };

        let wire = match (prior, new) {
            (_, Some(reqs)) => codec::requirements_to_wire(reqs),
            // removed: clear with an empty prerequisite list
            (Some(_), None) => RequirementsWire::default(),
            (None, None) => return Ok(None),
        };

        match pass
            .gateway()
            .patch_challenge(root, &ChallengePatch::requirements_only(wire))
        {
            Ok(_) => {
                info!(challenge_id = %root, cleared = new.is_none(), "reconcile/requirements");
                Ok(new.clone())
            }
            Err(e) => {
                pass.remote_failure(
                    Severity::Error,
                    format!("Unable to update requirements of challenge {root}"),
                    &e,
                );
                Ok(prior.clone())
            }
        }
    }
}
