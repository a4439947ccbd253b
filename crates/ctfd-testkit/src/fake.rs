//! In-memory CTFd.
//!
//! Design decisions (kept deterministic):
//! - every remote object draws its id from one counter starting at 1
//! - file locations are `"{id:04x}/{name}"`
//! - deleting a challenge cascades to its flags, tags, topics and files
//! - every verb is logged as a [`Call`] before faults are evaluated, so a
//!   failed call still shows up in the log
//! - a fault answers with `Http { status: 500 }` and leaves state untouched
//! - a patch field sent as `null` clears the stored value

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use ctfd_gateway::wire::{
    ChallengeCreate, ChallengePatch, FileQuery, FileUpload, FlagCreate, RemoteChallenge,
    RemoteFile, RemoteFlag, RemoteTag, RemoteTopic, RequirementsWire, TagCreate, TopicCreate,
};
use ctfd_gateway::{CtfdApi, GatewayError, GatewayResult};
use ctfd_schemas::ChallengeId;

/// One verb invocation as seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateChallenge { name: String },
    GetChallenge(i64),
    PatchChallenge { id: i64, requirements_only: bool },
    DeleteChallenge(i64),
    GetRequirements(i64),
    CreateFlag { challenge: i64 },
    DeleteFlag(i64),
    ListTags(i64),
    CreateTag { challenge: i64, value: String },
    DeleteTag(i64),
    ListTopics(i64),
    CreateTopic { challenge: i64, value: String },
    DeleteTopic(i64),
    ListFiles,
    UploadFile { challenge: i64, name: String },
    DeleteFile(i64),
}

impl Call {
    /// `true` for calls that change remote state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::GetChallenge(_)
                | Call::GetRequirements(_)
                | Call::ListTags(_)
                | Call::ListTopics(_)
                | Call::ListFiles
        )
    }
}

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeFile {
    pub challenge: i64,
    pub name: String,
    pub file_type: String,
    pub location: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
struct StoredChallenge {
    remote: RemoteChallenge,
    requirements: Option<RequirementsWire>,
}

#[derive(Debug, Default)]
struct World {
    next_id: i64,
    challenges: BTreeMap<i64, StoredChallenge>,
    flags: BTreeMap<i64, (i64, FlagCreate)>,
    tags: BTreeMap<i64, (i64, String)>,
    topics: BTreeMap<i64, (i64, String)>,
    files: BTreeMap<i64, FakeFile>,
}

impl World {
    fn alloc(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Predicate = Box<dyn Fn(&Call) -> bool>;
type Hook = Box<dyn Fn(&Call)>;

#[derive(Default)]
pub struct FakeCtfd {
    world: RefCell<World>,
    calls: RefCell<Vec<Call>>,
    faults: RefCell<Vec<Predicate>>,
    hooks: RefCell<Vec<Hook>>,
    empty_uploads: Cell<bool>,
}

impl FakeCtfd {
    pub fn new() -> Self {
        Self::default()
    }

    // -- configuration ------------------------------------------------------

    /// Every call matching `pred` fails with HTTP 500 and changes nothing.
    pub fn fail_when(&self, pred: impl Fn(&Call) -> bool + 'static) {
        self.faults.borrow_mut().push(Box::new(pred));
    }

    /// Runs after a call is logged and before it is served.
    pub fn on_call(&self, hook: impl Fn(&Call) + 'static) {
        self.hooks.borrow_mut().push(Box::new(hook));
    }

    /// Uploads store the file but answer with an empty list.
    pub fn answer_uploads_with_nothing(&self) {
        self.empty_uploads.set(true);
    }

    pub fn clear_faults(&self) {
        self.faults.borrow_mut().clear();
        self.empty_uploads.set(false);
    }

    // -- seeding (out-of-band remote state) ---------------------------------

    /// A file owned by some other challenge, to exercise read attribution.
    pub fn seed_file(&self, challenge: i64, name: &str) -> i64 {
        let mut w = self.world.borrow_mut();
        let id = w.alloc();
        w.files.insert(
            id,
            FakeFile {
                challenge,
                name: name.to_string(),
                file_type: "challenge".to_string(),
                location: format!("{id:04x}/{name}"),
                content: Vec::new(),
            },
        );
        id
    }

    pub fn seed_tag(&self, challenge: i64, value: &str) -> i64 {
        let mut w = self.world.borrow_mut();
        let id = w.alloc();
        w.tags.insert(id, (challenge, value.to_string()));
        id
    }

    /// Overwrite stored requirements as if edited out of band.
    pub fn set_requirements(&self, challenge: i64, reqs: Option<RequirementsWire>) {
        if let Some(c) = self.world.borrow_mut().challenges.get_mut(&challenge) {
            c.requirements = reqs;
        }
    }

    // -- inspection ---------------------------------------------------------

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn challenge(&self, id: i64) -> Option<RemoteChallenge> {
        self.world
            .borrow()
            .challenges
            .get(&id)
            .map(|c| c.remote.clone())
    }

    pub fn challenge_count(&self) -> usize {
        self.world.borrow().challenges.len()
    }

    pub fn requirements_of(&self, challenge: i64) -> Option<RequirementsWire> {
        self.world
            .borrow()
            .challenges
            .get(&challenge)
            .and_then(|c| c.requirements.clone())
    }

    /// Tag values in creation order.
    pub fn tags_of(&self, challenge: i64) -> Vec<String> {
        self.world
            .borrow()
            .tags
            .values()
            .filter(|(c, _)| *c == challenge)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn topics_of(&self, challenge: i64) -> Vec<String> {
        self.world
            .borrow()
            .topics
            .values()
            .filter(|(c, _)| *c == challenge)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// `(id, file)` pairs in creation order.
    pub fn files_of(&self, challenge: i64) -> Vec<(i64, FakeFile)> {
        self.world
            .borrow()
            .files
            .iter()
            .filter(|(_, f)| f.challenge == challenge)
            .map(|(id, f)| (*id, f.clone()))
            .collect()
    }

    /// Flag ids attached to `challenge`.
    pub fn flags_of(&self, challenge: i64) -> Vec<i64> {
        self.world
            .borrow()
            .flags
            .iter()
            .filter(|(_, (c, _))| *c == challenge)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Stored flag content, for asserting what was sent.
    pub fn flag(&self, flag_id: i64) -> Option<FlagCreate> {
        self.world
            .borrow()
            .flags
            .get(&flag_id)
            .map(|(_, f)| f.clone())
    }

    // -- internals ----------------------------------------------------------

    fn enter(&self, call: Call) -> GatewayResult<()> {
        self.calls.borrow_mut().push(call.clone());
        for hook in self.hooks.borrow().iter() {
            hook(&call);
        }
        if self.faults.borrow().iter().any(|f| f(&call)) {
            return Err(GatewayError::Http {
                status: 500,
                message: format!("injected failure on {call:?}"),
            });
        }
        Ok(())
    }

    fn require_challenge(&self, id: i64) -> GatewayResult<()> {
        if self.world.borrow().challenges.contains_key(&id) {
            Ok(())
        } else {
            Err(GatewayError::NotFound {
                what: format!("challenge {id}"),
            })
        }
    }
}

impl CtfdApi for FakeCtfd {
    fn create_challenge(&self, req: &ChallengeCreate) -> GatewayResult<RemoteChallenge> {
        self.enter(Call::CreateChallenge {
            name: req.name.clone(),
        })?;
        let mut w = self.world.borrow_mut();
        let id = w.alloc();
        let remote = RemoteChallenge {
            id,
            name: req.name.clone(),
            category: req.category.clone(),
            description: req.description.clone(),
            attribution: req.attribution.clone(),
            connection_info: Some(req.connection_info.clone()),
            max_attempts: Some(req.max_attempts),
            value: req.value,
            logic: req.logic,
            state: req.state,
            challenge_type: req.challenge_type.clone(),
            next_id: req.next_id,
        };
        w.challenges.insert(
            id,
            StoredChallenge {
                remote: remote.clone(),
                requirements: req.requirements.clone(),
            },
        );
        Ok(remote)
    }

    fn get_challenge(&self, id: ChallengeId) -> GatewayResult<RemoteChallenge> {
        self.enter(Call::GetChallenge(id.get()))?;
        self.require_challenge(id.get())?;
        Ok(self.world.borrow().challenges[&id.get()].remote.clone())
    }

    fn patch_challenge(
        &self,
        id: ChallengeId,
        req: &ChallengePatch,
    ) -> GatewayResult<RemoteChallenge> {
        let requirements_only = ChallengePatch {
            requirements: None,
            ..req.clone()
        } == ChallengePatch::default();
        self.enter(Call::PatchChallenge {
            id: id.get(),
            requirements_only,
        })?;
        self.require_challenge(id.get())?;

        let mut w = self.world.borrow_mut();
        let Some(stored) = w.challenges.get_mut(&id.get()) else {
            return Err(GatewayError::NotFound {
                what: format!("challenge {id}"),
            });
        };
        let r = &mut stored.remote;
        if let Some(v) = &req.name {
            r.name = v.clone();
        }
        if let Some(v) = &req.category {
            r.category = v.clone();
        }
        if let Some(v) = &req.description {
            r.description = v.clone();
        }
        if let Some(v) = &req.attribution {
            r.attribution = v.clone();
        }
        if let Some(v) = &req.connection_info {
            r.connection_info = Some(v.clone());
        }
        if let Some(v) = req.max_attempts {
            r.max_attempts = Some(v);
        }
        if let Some(v) = req.value {
            r.value = v;
        }
        if let Some(v) = req.logic {
            r.logic = v;
        }
        if let Some(v) = req.state {
            r.state = v;
        }
        if let Some(v) = req.next_id {
            r.next_id = v;
        }
        if let Some(v) = &req.requirements {
            stored.requirements = Some(v.clone());
        }
        Ok(stored.remote.clone())
    }

    fn delete_challenge(&self, id: ChallengeId) -> GatewayResult<()> {
        self.enter(Call::DeleteChallenge(id.get()))?;
        self.require_challenge(id.get())?;
        let cid = id.get();
        let mut w = self.world.borrow_mut();
        w.challenges.remove(&cid);
        w.flags.retain(|_, (c, _)| *c != cid);
        w.tags.retain(|_, (c, _)| *c != cid);
        w.topics.retain(|_, (c, _)| *c != cid);
        w.files.retain(|_, f| f.challenge != cid);
        Ok(())
    }

    fn get_requirements(&self, id: ChallengeId) -> GatewayResult<Option<RequirementsWire>> {
        self.enter(Call::GetRequirements(id.get()))?;
        self.require_challenge(id.get())?;
        Ok(self.requirements_of(id.get()))
    }

    fn create_flag(&self, req: &FlagCreate) -> GatewayResult<RemoteFlag> {
        self.enter(Call::CreateFlag {
            challenge: req.challenge,
        })?;
        self.require_challenge(req.challenge)?;
        let mut w = self.world.borrow_mut();
        let id = w.alloc();
        w.flags.insert(id, (req.challenge, req.clone()));
        Ok(RemoteFlag {
            id,
            challenge_id: Some(req.challenge),
        })
    }

    fn delete_flag(&self, flag_id: i64) -> GatewayResult<()> {
        self.enter(Call::DeleteFlag(flag_id))?;
        match self.world.borrow_mut().flags.remove(&flag_id) {
            Some(_) => Ok(()),
            None => Err(GatewayError::NotFound {
                what: format!("flag {flag_id}"),
            }),
        }
    }

    fn list_tags(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTag>> {
        self.enter(Call::ListTags(id.get()))?;
        self.require_challenge(id.get())?;
        Ok(self
            .world
            .borrow()
            .tags
            .iter()
            .filter(|(_, (c, _))| *c == id.get())
            .map(|(tid, (_, v))| RemoteTag {
                id: *tid,
                value: v.clone(),
            })
            .collect())
    }

    fn create_tag(&self, req: &TagCreate) -> GatewayResult<RemoteTag> {
        self.enter(Call::CreateTag {
            challenge: req.challenge,
            value: req.value.clone(),
        })?;
        self.require_challenge(req.challenge)?;
        let mut w = self.world.borrow_mut();
        let id = w.alloc();
        w.tags.insert(id, (req.challenge, req.value.clone()));
        Ok(RemoteTag {
            id,
            value: req.value.clone(),
        })
    }

    fn delete_tag(&self, tag_id: i64) -> GatewayResult<()> {
        self.enter(Call::DeleteTag(tag_id))?;
        match self.world.borrow_mut().tags.remove(&tag_id) {
            Some(_) => Ok(()),
            None => Err(GatewayError::NotFound {
                what: format!("tag {tag_id}"),
            }),
        }
    }

    fn list_topics(&self, id: ChallengeId) -> GatewayResult<Vec<RemoteTopic>> {
        self.enter(Call::ListTopics(id.get()))?;
        self.require_challenge(id.get())?;
        Ok(self
            .world
            .borrow()
            .topics
            .iter()
            .filter(|(_, (c, _))| *c == id.get())
            .map(|(tid, (_, v))| RemoteTopic {
                id: *tid,
                value: v.clone(),
            })
            .collect())
    }

    fn create_topic(&self, req: &TopicCreate) -> GatewayResult<RemoteTopic> {
        self.enter(Call::CreateTopic {
            challenge: req.challenge,
            value: req.value.clone(),
        })?;
        self.require_challenge(req.challenge)?;
        let mut w = self.world.borrow_mut();
        let id = w.alloc();
        w.topics.insert(id, (req.challenge, req.value.clone()));
        Ok(RemoteTopic {
            id,
            value: req.value.clone(),
        })
    }

    fn delete_topic(&self, association_id: i64) -> GatewayResult<()> {
        self.enter(Call::DeleteTopic(association_id))?;
        match self.world.borrow_mut().topics.remove(&association_id) {
            Some(_) => Ok(()),
            None => Err(GatewayError::NotFound {
                what: format!("topic {association_id}"),
            }),
        }
    }

    fn list_files(&self, query: &FileQuery) -> GatewayResult<Vec<RemoteFile>> {
        self.enter(Call::ListFiles)?;
        Ok(self
            .world
            .borrow()
            .files
            .iter()
            .filter(|(_, f)| f.file_type == query.file_type.as_str())
            .map(|(id, f)| RemoteFile {
                id: *id,
                file_type: f.file_type.clone(),
                location: f.location.clone(),
            })
            .collect())
    }

    fn upload_file(&self, req: &FileUpload) -> GatewayResult<Vec<RemoteFile>> {
        self.enter(Call::UploadFile {
            challenge: req.challenge.get(),
            name: req.name.clone(),
        })?;
        self.require_challenge(req.challenge.get())?;
        let mut w = self.world.borrow_mut();
        let id = w.alloc();
        let file = FakeFile {
            challenge: req.challenge.get(),
            name: req.name.clone(),
            file_type: req.file_type.as_str().to_string(),
            location: format!("{id:04x}/{}", req.name),
            content: req.content.clone(),
        };
        let reply = RemoteFile {
            id,
            file_type: file.file_type.clone(),
            location: file.location.clone(),
        };
        w.files.insert(id, file);
        if self.empty_uploads.get() {
            return Ok(Vec::new());
        }
        Ok(vec![reply])
    }

    fn delete_file(&self, file_id: i64) -> GatewayResult<()> {
        self.enter(Call::DeleteFile(file_id))?;
        match self.world.borrow_mut().files.remove(&file_id) {
            Some(_) => Ok(()),
            None => Err(GatewayError::NotFound {
                what: format!("file {file_id}"),
            }),
        }
    }
}
