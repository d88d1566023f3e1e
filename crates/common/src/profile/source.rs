//! Profile data access
//!
//! The router never loads profiles itself; callers fetch one through a
//! [`ProfileSource`] and pass it in by reference.

use super::{demo_roster, PatientProfile};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for patient profile lookup
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch one profile by id
    async fn find(&self, id: &str) -> Result<Option<Arc<PatientProfile>>>;

    /// All profiles, in roster order
    async fn list(&self) -> Result<Vec<Arc<PatientProfile>>>;

    /// Number of profiles available
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed in-memory profile set
pub struct StaticProfileSource {
    order: Vec<String>,
    profiles: HashMap<String, Arc<PatientProfile>>,
}

impl StaticProfileSource {
    /// Build from profiles; a later duplicate id replaces the earlier one
    pub fn new(profiles: impl IntoIterator<Item = PatientProfile>) -> Self {
        let mut order = Vec::new();
        let mut map = HashMap::new();

        for profile in profiles {
            if !map.contains_key(&profile.id) {
                order.push(profile.id.clone());
            }
            map.insert(profile.id.clone(), Arc::new(profile));
        }

        Self {
            order,
            profiles: map,
        }
    }

    /// Source seeded with the demo roster
    pub fn demo() -> Self {
        Self::new(demo_roster())
    }
}

#[async_trait]
impl ProfileSource for StaticProfileSource {
    async fn find(&self, id: &str) -> Result<Option<Arc<PatientProfile>>> {
        Ok(self.profiles.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Arc<PatientProfile>>> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.profiles.get(id).cloned())
            .collect())
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}
