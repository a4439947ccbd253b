//! Per-kind reconciliation strategies.
//!
//! Each subresource kind has its own sync policy, selected at compile time:
//!
//! | kind         | strategy                | policy                         |
//! |--------------|-------------------------|--------------------------------|
//! | tags         | `FullReplace<Tags>`     | delete all live, create all    |
//! | topics       | `FullReplace<Topics>`   | delete all live, create all    |
//! | files        | [`FileSync`]            | diff by logical name           |
//! | flag         | [`FlagOnce`]            | create at root creation only   |
//! | requirements | [`RequirementsReplace`] | one PATCH per update           |
//!
//! `old == None` denotes the creation pass. The returned state always
//! describes what is believed live remotely, even after a failure.

mod files;
mod flag;
mod requirements;
mod values;

pub use files::FileSync;
pub use flag::FlagOnce;
pub use requirements::RequirementsReplace;
pub use values::{FullReplace, RemoteValue, Tags, Topics, ValueCollection};

use ctfd_gateway::{CtfdApi, Gateway, GatewayError};
use ctfd_schemas::{ChallengeId, SubresourceKind};

use crate::diagnostics::{summary, Diagnostics, Severity};
use crate::error::InvariantViolation;

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

/// State shared by every strategy invoked during one operation.
pub struct Pass<'g, A: CtfdApi> {
    gateway: &'g Gateway<A>,
    diagnostics: Diagnostics,
}

impl<'g, A: CtfdApi> Pass<'g, A> {
    pub fn new(gateway: &'g Gateway<A>) -> Self {
        Self {
            gateway,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn gateway(&self) -> &'g Gateway<A> {
        self.gateway
    }

    pub fn is_cancelled(&self) -> bool {
        self.gateway.is_cancelled()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    pub fn warn(&mut self, summary: &str, detail: impl Into<String>) {
        self.diagnostics.warn(summary, detail);
    }

    pub fn error(&mut self, summary: &str, detail: impl Into<String>) {
        self.diagnostics.error(summary, detail);
    }

    /// Record a failed remote call. Cancelled calls are skipped: the
    /// controller reports cancellation once for the whole pass.
    pub fn remote_failure(&mut self, severity: Severity, what: impl AsRef<str>, err: &GatewayError) {
        if err.is_cancelled() {
            return;
        }
        let detail = format!("{}, got error: {err}", what.as_ref());
        match severity {
            Severity::Warning => self.diagnostics.warn(summary::CLIENT, detail),
            Severity::Error => self.diagnostics.error(summary::CLIENT, detail),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

pub trait Strategy {
    type State: Clone;

    fn kind(&self) -> SubresourceKind;

    /// Drive the remote collection from `old` towards `new` and return the
    /// resulting believed-live state.
    ///
    /// # Errors
    /// Only [`InvariantViolation`]. Remote and configuration failures are
    /// recorded on the pass and reflected in the returned state.
    fn reconcile<A: CtfdApi>(
        &self,
        pass: &mut Pass<'_, A>,
        root: ChallengeId,
        old: Option<&Self::State>,
        new: &Self::State,
    ) -> Result<Self::State, InvariantViolation>;
}
