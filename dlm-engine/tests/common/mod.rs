//! In-memory collaborators for engine tests

#![allow(dead_code)]

use dlm_engine::prelude::*;
use dlm_types::audience::Evaluator;
use dlm_types::PreferenceScope;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const DEPT_LAYOUT: &str = r#"
<layout ID="1">
  <folder ID="s1" type="root" hidden="false">
    <folder ID="s2" type="header" hidden="false">
      <channel ID="n3"/>
    </folder>
    <folder ID="s3" type="regular" hidden="false">
      <channel ID="n7"/>
      <channel ID=""/>
    </folder>
    <folder ID="s4" type="regular" hidden="true"/>
  </folder>
</layout>
"#;

#[derive(Default)]
pub struct FakeConfig {
    pub fragments: Vec<FragmentDefinition>,
    pub properties: HashMap<String, String>,
    pub system: HashMap<String, String>,
}

impl FakeConfig {
    pub fn with_fragments(fragments: Vec<FragmentDefinition>) -> Self {
        let fragments = fragments
            .into_iter()
            .enumerate()
            .map(|(i, fragment)| fragment.with_index(i))
            .collect();
        FakeConfig {
            fragments,
            ..Default::default()
        }
    }

    pub fn with_system(mut self, name: &str, value: &str) -> Self {
        self.system.insert(name.into(), value.into());
        self
    }
}

impl ConfigSource for FakeConfig {
    fn fragments(&self) -> &[FragmentDefinition] {
        &self.fragments
    }

    fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    fn system_property(&self, name: &str) -> Option<&str> {
        self.system.get(name).map(String::as_str)
    }

    fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Holds callers until `parties` of them have arrived, or a deadline passes
pub struct Rendezvous {
    parties: usize,
    arrived: AtomicUsize,
    timed_out: AtomicBool,
}

impl Rendezvous {
    pub fn new(parties: usize) -> Self {
        Rendezvous {
            parties,
            arrived: AtomicUsize::new(0),
            timed_out: AtomicBool::new(false),
        }
    }

    fn meet(&self) {
        self.arrived.fetch_add(1, Ordering::SeqCst);
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.arrived.load(Ordering::SeqCst) < self.parties {
            if Instant::now() > deadline {
                self.timed_out.store(true, Ordering::SeqCst);
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn all_met(&self) -> bool {
        !self.timed_out.load(Ordering::SeqCst) && self.arrived.load(Ordering::SeqCst) >= self.parties
    }
}

/// Identity and layout store with knobs for failure and timing
pub struct FakeStore {
    pub users: Mutex<HashMap<String, i64>>,
    pub next_id: AtomicI64,

    /// Owners whose layout cannot be loaded
    pub failing: Mutex<HashSet<String>>,

    /// Owners whose default profile has no stylesheets
    pub unstyled: HashSet<String>,

    pub layout_loads: Mutex<HashMap<String, usize>>,
    pub saved: Mutex<Vec<(String, LayoutDocument)>>,
    pub provisioned: Mutex<Vec<(String, String)>>,

    /// Time spent inside every layout load
    pub load_delay: Duration,

    /// Every layout load waits here before returning
    pub rendezvous: Option<Arc<Rendezvous>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        FakeStore {
            users: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(100),
            failing: Mutex::new(HashSet::new()),
            unstyled: HashSet::new(),
            layout_loads: Mutex::new(HashMap::new()),
            saved: Mutex::new(Vec::new()),
            provisioned: Mutex::new(Vec::new()),
            load_delay: Duration::ZERO,
            rendezvous: None,
        }
    }
}

impl FakeStore {
    pub fn with_users(users: &[(&str, i64)]) -> Self {
        let store = FakeStore::default();
        store
            .users
            .lock()
            .extend(users.iter().map(|(name, id)| (name.to_string(), *id)));
        store
    }

    pub fn loads_of(&self, owner: &str) -> usize {
        self.layout_loads.lock().get(owner).copied().unwrap_or(0)
    }

    pub fn total_loads(&self) -> usize {
        self.layout_loads.lock().values().sum()
    }
}

impl IdentityStore for FakeStore {
    fn resolve_id(&self, owner: &OwnerId, _allow_create: bool) -> Result<Option<UserId>, StoreError> {
        Ok(self.users.lock().get(owner.as_str()).copied().map(UserId))
    }

    fn provision(&self, owner: &OwnerId, template: &str) -> Result<UserId, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.users.lock().insert(owner.to_string(), id);
        self.provisioned
            .lock()
            .push((owner.to_string(), template.to_string()));
        Ok(UserId(id))
    }
}

impl LayoutStore for FakeStore {
    fn default_profile(&self, owner: &Owner) -> Result<UserProfile, StoreError> {
        let styled = !self.unstyled.contains(owner.username.as_str());
        Ok(UserProfile {
            id: 1,
            fname: "default".into(),
            layout_id: 1,
            structure_stylesheet_id: if styled { 4 } else { 0 },
            theme_stylesheet_id: if styled { 5 } else { 0 },
        })
    }

    fn system_profile(&self, fname: &str) -> Result<UserProfile, StoreError> {
        Ok(UserProfile {
            id: 2,
            fname: fname.into(),
            layout_id: 3,
            structure_stylesheet_id: 6,
            theme_stylesheet_id: 7,
        })
    }

    fn fragment_layout(&self, owner: &Owner, _profile: &UserProfile) -> Result<LayoutDocument, StoreError> {
        *self
            .layout_loads
            .lock()
            .entry(owner.username.to_string())
            .or_default() += 1;

        if let Some(rendezvous) = &self.rendezvous {
            rendezvous.meet();
        }
        if !self.load_delay.is_zero() {
            thread::sleep(self.load_delay);
        }

        if self.failing.lock().contains(owner.username.as_str()) {
            return Err(StoreError::Backend(format!("layout of {} unreadable", owner.username)));
        }
        Ok(LayoutDocument::parse(DEPT_LAYOUT)?)
    }

    fn structure_preferences(
        &self,
        _owner: &Owner,
        _profile_id: i32,
        stylesheet_id: i32,
    ) -> Result<PreferenceSet, StoreError> {
        let mut prefs = PreferenceSet::new(stylesheet_id);
        prefs.set_attribute(PreferenceScope::Folders, "s3", "width", "50%");
        prefs.set_attribute(PreferenceScope::Channels, "n7", "minimized", "false");
        Ok(prefs)
    }

    fn theme_preferences(
        &self,
        _owner: &Owner,
        _profile_id: i32,
        stylesheet_id: i32,
    ) -> Result<PreferenceSet, StoreError> {
        let mut prefs = PreferenceSet::new(stylesheet_id);
        prefs.set_attribute(PreferenceScope::Channels, "n7", "skin", "blue");
        Ok(prefs)
    }

    fn save_layout(
        &self,
        owner: &Owner,
        _profile: &UserProfile,
        layout: &LayoutDocument,
        is_fragment: bool,
        clear_cache: bool,
    ) -> Result<(), StoreError> {
        assert!(is_fragment);
        assert!(!clear_cache);
        self.saved
            .lock()
            .push((owner.username.to_string(), layout.clone()));
        Ok(())
    }
}

pub fn fragment(name: &str, owner: &str, precedence: f64) -> FragmentDefinition {
    FragmentDefinition::new(name, owner)
        .with_precedence(precedence)
        .with_evaluator(Evaluator::Everyone)
}

pub fn activator(config: FakeConfig, store: Arc<FakeStore>) -> FragmentActivator {
    FragmentActivator::new(Arc::new(config), store.clone(), store)
}
