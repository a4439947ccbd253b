//! Gateway: the SINGLE choke-point for all CTFd calls made by the core.
//!
//! Every verb checks the pass's [`CancelToken`] before touching the adapter.
//! Once cancelled, every further call fails with [`GatewayError::Cancelled`]
//! and the adapter is never reached. Calls already committed are left alone.
//!
//! ```text
//! reconciliation core
//!     │
//!     └──► Gateway::<verb>(…)
//!                │
//!                ├── CancelToken::is_cancelled() → GatewayError::Cancelled
//!                │
//!                └── CtfdApi::<verb>(…)  ◄── only reached while not cancelled
//! ```

use ctfd_schemas::ChallengeId;
use tracing::debug;

use crate::adapter::CtfdApi;
use crate::cancel::CancelToken;
use crate::error::GatewayError;
use crate::wire::{
    ChallengeCreate, ChallengePatch, FileQuery, FileUpload, FlagCreate, RemoteChallenge,
    RemoteFile, RemoteFlag, RemoteTag, RemoteTopic, RequirementsWire, TagCreate, TopicCreate,
};
use crate::GatewayResult;

pub struct Gateway<A: CtfdApi> {
    /// Private: the core cannot bypass the cancellation check.
    adapter: A,
    cancel: CancelToken,
}

impl<A: CtfdApi> Gateway<A> {
    pub fn new(adapter: A, cancel: CancelToken) -> Self {
        Self { adapter, cancel }
    }

    /// Gateway with a token nobody else holds. Never cancels.
    pub fn uncancellable(adapter: A) -> Self {
        Self::new(adapter, CancelToken::new())
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    fn call<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&A) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        if self.cancel.is_cancelled() {
            debug!(op, "gateway/refused_cancelled");
            return Err(GatewayError::Cancelled);
        }
        debug!(op, "gateway/call");
        let res = f(&self.adapter);
        if let Err(err) = &res {
            debug!(op, error = %err, "gateway/call_failed");
        }
        res
    }

    // -- challenge ----------------------------------------------------------

    pub fn create_challenge(&self, req: &ChallengeCreate) -> GatewayResult<RemoteChallenge> {
        self.call("create_challenge", |a| a.create_challenge(req))
    }

    pub fn get_challenge(&self, id: ChallengeId) -> GatewayResult<RemoteChallenge> {
        self.call("get_challenge", |a| a.get_challenge(id))
    }

    pub fn patch_challenge(
        &self,
        id: ChallengeId,
        req: &ChallengePatch,
    ) -> GatewayResult<RemoteChallenge> {
        self.call("patch_challenge", |a| a.patch_challenge(id, req))
    }

    pub fn delete_challenge(&self, id: ChallengeId) -> GatewayResult<()> {
        self.call("delete_challenge", |a| a.delete_challenge(id))
    }

    pub fn get_requirements(&self, id: ChallengeId) -> GatewayResult<Option<RequirementsWire>> {
        self.call("get_requirements", |a| a.get_requirements(id))
    }

    // -- flag ---------------------------------------------------------------

    pub fn create_flag(&self, req: &FlagCreate) -> GatewayResult<RemoteFlag> {
        self.call("create_flag", |a| a.create_flag(req))
    }

    pub fn delete_flag(&self, flag_id: i64) -> GatewayResult<()> {
        self.call("delete_flag", |a| a.delete_flag(flag_id))
    }

    // -- tags ---------------------------------------------------------------

    pub fn list_tags(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTag>> {
        self.call("list_tags", |a| a.list_tags(id))
    }

    pub fn create_tag(&self, req: &TagCreate) -> GatewayResult<RemoteTag> {
        self.call("create_tag", |a| a.create_tag(req))
    }

    pub fn delete_tag(&self, tag_id: i64) -> GatewayResult<()> {
        self.call("delete_tag", |a| a.delete_tag(tag_id))
    }

    // -- topics -------------------------------------------------------------

    pub fn list_topics(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTopic>> {
        self.call("list_topics", |a| a.list_topics(id))
    }

    pub fn create_topic(&self, req: &TopicCreate) -> GatewayResult<RemoteTopic> {
        self.call("create_topic", |a| a.create_topic(req))
    }

    pub fn delete_topic(&self, association_id: i64) -> GatewayResult<()> {
        self.call("delete_topic", |a| a.delete_topic(association_id))
    }

    // -- files --------------------------------------------------------------

    pub fn list_files(&self, query: &FileQuery) -> GatewayResult<Vec<RemoteFile>> {
        self.call("list_files", |a| a.list_files(query))
    }

    pub fn upload_file(&self, req: &FileUpload) -> GatewayResult<Vec<RemoteFile>> {
        self.call("upload_file", |a| a.upload_file(req))
    }

    pub fn delete_file(&self, file_id: i64) -> GatewayResult<()> {
        self.call("delete_file", |a| a.delete_file(file_id))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use ctfd_schemas::{Logic, Visibility};

    /// Records verb names; tags are the only verbs with real behavior.
    #[derive(Default)]
    struct MockCtfd {
        calls: RefCell<Vec<&'static str>>,
        tags: RefCell<Vec<RemoteTag>>,
    }

    impl MockCtfd {
        fn hit(&self, op: &'static str) {
            self.calls.borrow_mut().push(op);
        }
    }

    fn challenge(id: i64) -> RemoteChallenge {
        RemoteChallenge {
            id,
            name: "n".into(),
            category: "c".into(),
            description: "d".into(),
            attribution: None,
            connection_info: None,
            max_attempts: None,
            value: 1,
            logic: Logic::Any,
            state: Visibility::Hidden,
            challenge_type: "standard".into(),
            next_id: None,
        }
    }

    impl CtfdApi for MockCtfd {
        fn create_challenge(&self, _: &ChallengeCreate) -> GatewayResult<RemoteChallenge> {
            self.hit("create_challenge");
            Ok(challenge(1))
        }
        fn get_challenge(&self, id: ChallengeId) -> GatewayResult<RemoteChallenge> {
            self.hit("get_challenge");
            Ok(challenge(id.get()))
        }
        fn patch_challenge(
            &self,
            id: ChallengeId,
            _: &ChallengePatch,
        ) -> GatewayResult<RemoteChallenge> {
            self.hit("patch_challenge");
            Ok(challenge(id.get()))
        }
        fn delete_challenge(&self, _: ChallengeId) -> GatewayResult<()> {
            self.hit("delete_challenge");
            Ok(())
        }
        fn get_requirements(&self, _: ChallengeId) -> GatewayResult<Option<RequirementsWire>> {
            self.hit("get_requirements");
            Ok(None)
        }
        fn create_flag(&self, _: &FlagCreate) -> GatewayResult<RemoteFlag> {
            self.hit("create_flag");
            Ok(RemoteFlag {
                id: 1,
                challenge_id: None,
            })
        }
        fn delete_flag(&self, _: i64) -> GatewayResult<()> {
            self.hit("delete_flag");
            Ok(())
        }
        fn list_tags(&self, _: ChallengeId) -> GatewayResult<Vec<RemoteTag>> {
            self.hit("list_tags");
            Ok(self.tags.borrow().clone())
        }
        fn create_tag(&self, req: &TagCreate) -> GatewayResult<RemoteTag> {
            self.hit("create_tag");
            let tag = RemoteTag {
                id: self.tags.borrow().len() as i64 + 1,
                value: req.value.clone(),
            };
            self.tags.borrow_mut().push(tag.clone());
            Ok(tag)
        }
        fn delete_tag(&self, _: i64) -> GatewayResult<()> {
            self.hit("delete_tag");
            Ok(())
        }
        fn list_topics(&self, _: ChallengeId) -> GatewayResult<Vec<RemoteTopic>> {
            self.hit("list_topics");
            Ok(Vec::new())
        }
        fn create_topic(&self, req: &TopicCreate) -> GatewayResult<RemoteTopic> {
            self.hit("create_topic");
            Ok(RemoteTopic {
                id: 1,
                value: req.value.clone(),
            })
        }
        fn delete_topic(&self, _: i64) -> GatewayResult<()> {
            self.hit("delete_topic");
            Ok(())
        }
        fn list_files(&self, _: &FileQuery) -> GatewayResult<Vec<RemoteFile>> {
            self.hit("list_files");
            Ok(Vec::new())
        }
        fn upload_file(&self, _: &FileUpload) -> GatewayResult<Vec<RemoteFile>> {
            self.hit("upload_file");
            Ok(Vec::new())
        }
        fn delete_file(&self, _: i64) -> GatewayResult<()> {
            self.hit("delete_file");
            Ok(())
        }
    }

    fn tag(value: &str) -> TagCreate {
        TagCreate {
            challenge: 1,
            value: value.to_string(),
        }
    }

    #[test]
    fn calls_reach_adapter_while_not_cancelled() {
        let gw = Gateway::uncancellable(MockCtfd::default());
        gw.create_tag(&tag("web")).unwrap();
        let tags = gw.list_tags(ChallengeId(1)).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(*gw.adapter().calls.borrow(), vec!["create_tag", "list_tags"]);
    }

    #[test]
    fn cancelled_gateway_never_reaches_adapter() {
        let token = CancelToken::new();
        let gw = Gateway::new(MockCtfd::default(), token.clone());
        gw.create_tag(&tag("a")).unwrap();

        token.cancel();

        let err = gw.create_tag(&tag("b")).unwrap_err();
        assert!(err.is_cancelled());
        assert!(gw.delete_challenge(ChallengeId(1)).unwrap_err().is_cancelled());
        assert_eq!(*gw.adapter().calls.borrow(), vec!["create_tag"]);
    }

    #[test]
    fn cancellation_does_not_undo_committed_calls() {
        let token = CancelToken::new();
        let gw = Gateway::new(MockCtfd::default(), token.clone());
        gw.create_tag(&tag("a")).unwrap();
        token.cancel();
        let _ = gw.create_tag(&tag("b"));
        assert_eq!(gw.into_adapter().tags.into_inner().len(), 1);
    }

    #[test]
    fn adapter_trait_is_object_safe() {
        let mock = MockCtfd::default();
        let dynamic: &dyn CtfdApi = &mock;
        let gw = Gateway::uncancellable(dynamic);
        gw.get_requirements(ChallengeId(3)).unwrap();
        assert_eq!(*mock.calls.borrow(), vec!["get_requirements"]);
    }
}
