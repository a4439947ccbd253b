use ctfd_schemas::ChallengeId;

use crate::wire::{
    ChallengeCreate, ChallengePatch, FileQuery, FileUpload, FlagCreate, RemoteChallenge,
    RemoteFile, RemoteFlag, RemoteTag, RemoteTopic, RequirementsWire, TagCreate, TopicCreate,
};
use crate::GatewayResult;

/// Verbs the reconciliation core needs from CTFd.
///
/// Declared `pub` so the live HTTP client and test doubles can implement it,
/// but the core only ever calls through [`crate::Gateway`].
pub trait CtfdApi {
    // challenge
    fn create_challenge(&self, req: &ChallengeCreate) -> GatewayResult<RemoteChallenge>;
    fn get_challenge(&self, id: ChallengeId) -> GatewayResult<RemoteChallenge>;
    fn patch_challenge(&self, id: ChallengeId, req: &ChallengePatch)
        -> GatewayResult<RemoteChallenge>;
    fn delete_challenge(&self, id: ChallengeId) -> GatewayResult<()>;

    /// `Ok(None)` when the challenge has no requirements.
    fn get_requirements(&self, id: ChallengeId) -> GatewayResult<Option<RequirementsWire>>;

    // flag
    fn create_flag(&self, req: &FlagCreate) -> GatewayResult<RemoteFlag>;
    fn delete_flag(&self, flag_id: i64) -> GatewayResult<()>;

    // tags
    fn list_tags(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTag>>;
    fn create_tag(&self, req: &TagCreate) -> GatewayResult<RemoteTag>;
    fn delete_tag(&self, tag_id: i64) -> GatewayResult<()>;

    // topics
    fn list_topics(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTopic>>;
    fn create_topic(&self, req: &TopicCreate) -> GatewayResult<RemoteTopic>;
    fn delete_topic(&self, association_id: i64) -> GatewayResult<()>;

    // files
    fn list_files(&self, query: &FileQuery) -> GatewayResult<Vec<RemoteFile>>;
    /// CTFd answers an upload with a list; an empty list is a valid reply.
    fn upload_file(&self, req: &FileUpload) -> GatewayResult<Vec<RemoteFile>>;
    fn delete_file(&self, file_id: i64) -> GatewayResult<()>;
}

impl<T: CtfdApi + ?Sized> CtfdApi for &T {
    fn create_challenge(&self, req: &ChallengeCreate) -> GatewayResult<RemoteChallenge> {
        (**self).create_challenge(req)
    }
    fn get_challenge(&self, id: ChallengeId) -> GatewayResult<RemoteChallenge> {
        (**self).get_challenge(id)
    }
    fn patch_challenge(
        &self,
        id: ChallengeId,
        req: &ChallengePatch,
    ) -> GatewayResult<RemoteChallenge> {
        (**self).patch_challenge(id, req)
    }
    fn delete_challenge(&self, id: ChallengeId) -> GatewayResult<()> {
        (**self).delete_challenge(id)
    }
    fn get_requirements(&self, id: ChallengeId) -> GatewayResult<Option<RequirementsWire>> {
        (**self).get_requirements(id)
    }
    fn create_flag(&self, req: &FlagCreate) -> GatewayResult<RemoteFlag> {
        (**self).create_flag(req)
    }
    fn delete_flag(&self, flag_id: i64) -> GatewayResult<()> {
        (**self).delete_flag(flag_id)
    }
    fn list_tags(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTag>> {
        (**self).list_tags(id)
    }
    fn create_tag(&self, req: &TagCreate) -> GatewayResult<RemoteTag> {
        (**self).create_tag(req)
    }
    fn delete_tag(&self, tag_id: i64) -> GatewayResult<()> {
        (**self).delete_tag(tag_id)
    }
    fn list_topics(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTopic>> {
        (**self).list_topics(id)
    }
    fn create_topic(&self, req: &TopicCreate) -> GatewayResult<RemoteTopic> {
        (**self).create_topic(req)
    }
    fn delete_topic(&self, association_id: i64) -> GatewayResult<()> {
        (**self).delete_topic(association_id)
    }
    fn list_files(&self, query: &FileQuery) -> GatewayResult<Vec<RemoteFile>> {
        (**self).list_files(query)
    }
    fn upload_file(&self, req: &FileUpload) -> GatewayResult<Vec<RemoteFile>> {
        (**self).upload_file(req)
    }
    fn delete_file(&self, file_id: i64) -> GatewayResult<()> {
        (**self).delete_file(file_id)
    }
}
