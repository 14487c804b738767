use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::skill::{SkillDraft, SkillRecord};
use crate::storage::{KeyValueStore, StorageError};

pub const SKILLS_STORAGE_KEY: &str = "user-skills";

/// Owns the in-memory skill list and mirrors every mutation to durable storage.
///
/// Storage failures never reach the caller: a failed load yields an empty
/// profile and a failed save leaves the in-memory list authoritative.
pub struct SkillProfileStore {
    storage: Arc<dyn KeyValueStore>,
    skills: Vec<SkillRecord>,
}

impl SkillProfileStore {
    /// Opens the profile, loading whatever is persisted.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            storage,
            skills: Vec::new(),
        };
        store.load();
        store
    }

    pub fn skills(&self) -> &[SkillRecord] {
        &self.skills
    }

    /// Re-reads the persisted collection, replacing the in-memory list.
    pub fn load(&mut self) -> &[SkillRecord] {
        self.skills = load(self.storage.as_ref());
        &self.skills
    }

    pub fn create(&mut self, draft: SkillDraft) -> SkillRecord {
        let mut id = Uuid::new_v4();
        while self.skills.iter().any(|s| s.id == id) {
            id = Uuid::new_v4();
        }

        // Stored verbatim; the handoff description is joined from this exact text.
        let description = draft.description.filter(|d| !d.trim().is_empty());

        let record = SkillRecord {
            id,
            skill_name: draft.skill_name,
            level: draft.level,
            months: draft.months,
            description,
        };
        self.skills.push(record.clone());
        self.persist();

        debug!("Added skill {} ({})", record.id, record.skill_name.as_str());
        record
    }

    /// Removes the record with `id`. Returns false when no such record exists.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s.id != id);
        let removed = self.skills.len() != before;
        if removed {
            self.persist();
            debug!("Deleted skill {id}");
        }
        removed
    }

    fn persist(&self) {
        if let Err(e) = save(self.storage.as_ref(), &self.skills) {
            warn!("Failed to persist skill profile, continuing in memory: {e}");
        }
    }
}

fn load(storage: &dyn KeyValueStore) -> Vec<SkillRecord> {
    let raw = match storage.get(SKILLS_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read skill profile: {e}");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<SkillRecord>>(&raw) {
        Ok(skills) => dedup_ids(skills),
        Err(e) => {
            warn!("Discarding corrupt skill profile: {e}");
            Vec::new()
        }
    }
}

/// Keeps the first occurrence of each id so the uniqueness invariant holds
/// even for hand-edited files.
fn dedup_ids(skills: Vec<SkillRecord>) -> Vec<SkillRecord> {
    let mut seen = std::collections::HashSet::new();
    let total = skills.len();
    let unique: Vec<SkillRecord> = skills.into_iter().filter(|s| seen.insert(s.id)).collect();
    if unique.len() != total {
        warn!(
            "Dropped {} skill records with duplicate ids",
            total - unique.len()
        );
    }
    unique
}

fn save(storage: &dyn KeyValueStore, skills: &[SkillRecord]) -> Result<(), StorageError> {
    let json = serde_json::to_string(skills)?;
    storage.set(SKILLS_STORAGE_KEY, &json)
}
