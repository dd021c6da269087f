// File: teamboard-core/tests/test_utils/mod.rs
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use twilight_model::id::Id;
use twilight_model::id::marker::{GuildMarker, UserMarker};

use teamboard_common::models::{LiveMember, PresenceStatus, RawActivity, StaticProfile};
use teamboard_common::traits::{GuildDirectory, ProfileApi};
use teamboard_core::Error;
use teamboard_core::cache::ProfileCache;
use teamboard_core::eventbus::BroadcastHub;
use teamboard_core::roster::Roster;
use teamboard_core::services::{PresenceResolver, ProfileNormalizer, RosterRefresher};

pub fn user(id: u64) -> Id<UserMarker> {
    Id::new(id)
}

pub fn guild(id: u64) -> Id<GuildMarker> {
    Id::new(id)
}

pub fn online_coding() -> LiveMember {
    LiveMember::new(
        PresenceStatus::Online,
        vec![RawActivity::new("Visual Studio Code", 0).with_details("Editing main.rs")],
    )
}

/// How a fake profile lookup should behave for one account.
#[derive(Clone)]
pub enum ProfileBehaviour {
    Found(StaticProfile),
    Unknown,
    Fail(String),
    Hang,
}

/// In-memory [`ProfileApi`] that counts calls per account.
#[derive(Default)]
pub struct FakeProfileApi {
    behaviour: Mutex<HashMap<Id<UserMarker>, ProfileBehaviour>>,
    calls: Mutex<HashMap<Id<UserMarker>, usize>>,
    total: AtomicUsize,
}

impl FakeProfileApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: StaticProfile) -> Self {
        self.behaviour
            .lock()
            .insert(profile.id, ProfileBehaviour::Found(profile));
        self
    }

    pub fn with_behaviour(self, user_id: Id<UserMarker>, behaviour: ProfileBehaviour) -> Self {
        self.behaviour.lock().insert(user_id, behaviour);
        self
    }

    pub fn calls_for(&self, user_id: Id<UserMarker>) -> usize {
        self.calls.lock().get(&user_id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileApi for FakeProfileApi {
    async fn fetch_profile(&self, user_id: Id<UserMarker>) -> Result<StaticProfile, Error> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().entry(user_id).or_default() += 1;

        let behaviour = self.behaviour.lock().get(&user_id).cloned();
        match behaviour {
            Some(ProfileBehaviour::Found(profile)) => Ok(profile),
            Some(ProfileBehaviour::Unknown) | None => Err(Error::UnknownAccount(user_id.to_string())),
            Some(ProfileBehaviour::Fail(msg)) => Err(Error::Platform(msg)),
            Some(ProfileBehaviour::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::Platform("hung lookup woke up".into()))
            }
        }
    }
}

/// In-memory [`GuildDirectory`]: a set of known guilds, a member cache and
/// a separate table of members only reachable through `fetch_member`.
#[derive(Default)]
pub struct FakeDirectory {
    guilds: Vec<Id<GuildMarker>>,
    cached: HashMap<(Id<GuildMarker>, Id<UserMarker>), LiveMember>,
    fetchable: HashMap<(Id<GuildMarker>, Id<UserMarker>), LiveMember>,
    failing_fetch: HashSet<Id<GuildMarker>>,
    fetch_calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guild(mut self, guild_id: Id<GuildMarker>) -> Self {
        if !self.guilds.contains(&guild_id) {
            self.guilds.push(guild_id);
        }
        self
    }

    pub fn with_cached(mut self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>, member: LiveMember) -> Self {
        self.cached.insert((guild_id, user_id), member);
        self
    }

    pub fn with_fetchable(mut self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>, member: LiveMember) -> Self {
        self.fetchable.insert((guild_id, user_id), member);
        self
    }

    pub fn with_failing_fetch(mut self, guild_id: Id<GuildMarker>) -> Self {
        self.failing_fetch.insert(guild_id);
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuildDirectory for FakeDirectory {
    fn knows_guild(&self, guild_id: Id<GuildMarker>) -> bool {
        self.guilds.contains(&guild_id)
    }

    fn guild_ids(&self) -> Vec<Id<GuildMarker>> {
        self.guilds.clone()
    }

    fn cached_member(&self, guild_id: Id<GuildMarker>, user_id: Id<UserMarker>) -> Option<LiveMember> {
        self.cached.get(&(guild_id, user_id)).cloned()
    }

    async fn fetch_member(
        &self,
        guild_id: Id<GuildMarker>,
        user_id: Id<UserMarker>,
    ) -> Result<Option<LiveMember>, Error> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_fetch.contains(&guild_id) {
            return Err(Error::Platform("member fetch failed".into()));
        }
        Ok(self.fetchable.get(&(guild_id, user_id)).cloned())
    }
}

/// Wires a refresher over the given fakes with no bio overrides.
pub fn build_refresher(
    api: Arc<FakeProfileApi>,
    directory: Arc<FakeDirectory>,
    primary_guild: Option<Id<GuildMarker>>,
    hub: BroadcastHub,
    roster: Roster,
) -> RosterRefresher {
    let cache = Arc::new(ProfileCache::new(api));
    let resolver = Arc::new(PresenceResolver::new(directory, primary_guild));
    let normalizer = Arc::new(ProfileNormalizer::default());
    RosterRefresher::new(cache, resolver, normalizer, hub, roster)
}
