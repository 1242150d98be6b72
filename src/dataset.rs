//! A snapshot of the document collections with an ID index.
//!
//! Claims reference villages and innovations, and innovations reference innovators, by document
//! ID. The [Dataset] resolves those references in memory. References that do not resolve are
//! never matched by name; the claim is reported as orphaned instead.

use hashbrown::HashMap;
use tracing::warn;

use crate::resource_manager::MemoryReservation;
use crate::types::{Claim, ClaimStatus, Document, Innovation, Innovator, Village};

/// Position of each document in its collection, by ID.
fn index_by_id<T: Document>(documents: &[T]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(documents.len());
    for (position, document) in documents.iter().enumerate() {
        if index.contains_key(document.id()) {
            warn!(
                collection = T::COLLECTION,
                id = document.id(),
                "duplicate document ID, keeping the first"
            );
            continue;
        }
        index.insert(document.id().to_string(), position);
    }
    index
}

/// A claim with its references resolved.
#[derive(Clone, Copy, Debug)]
pub struct Adoption<'a> {
    pub claim: &'a Claim,
    pub village: &'a Village,
    pub innovation: &'a Innovation,
    /// Innovator of the innovation, if the reference resolves
    pub innovator: Option<&'a Innovator>,
}

/// Snapshot of all collections.
#[derive(Debug, Default)]
pub struct Dataset {
    pub villages: Vec<Village>,
    pub innovators: Vec<Innovator>,
    pub innovations: Vec<Innovation>,
    pub claims: Vec<Claim>,
    village_index: HashMap<String, usize>,
    innovator_index: HashMap<String, usize>,
    innovation_index: HashMap<String, usize>,
    /// Released when the dataset is dropped
    memory: MemoryReservation,
}

impl Dataset {
    /// Build a dataset from the collections.
    pub fn new(
        villages: Vec<Village>,
        innovators: Vec<Innovator>,
        innovations: Vec<Innovation>,
        claims: Vec<Claim>,
    ) -> Self {
        let village_index = index_by_id(&villages);
        let innovator_index = index_by_id(&innovators);
        let innovation_index = index_by_id(&innovations);
        Self {
            villages,
            innovators,
            innovations,
            claims,
            village_index,
            innovator_index,
            innovation_index,
            memory: MemoryReservation::default(),
        }
    }

    /// Attach the memory reserved for the responses the dataset was decoded from.
    pub fn with_memory(mut self, memory: MemoryReservation) -> Self {
        self.memory = memory;
        self
    }

    /// Bytes of source responses held by the dataset.
    pub fn memory(&self) -> usize {
        self.memory.bytes()
    }

    /// Returns the village with the given ID.
    pub fn village(&self, id: &str) -> Option<&Village> {
        self.village_index.get(id).map(|i| &self.villages[*i])
    }

    /// Returns the innovator with the given ID.
    pub fn innovator(&self, id: &str) -> Option<&Innovator> {
        self.innovator_index.get(id).map(|i| &self.innovators[*i])
    }

    /// Returns the innovation with the given ID.
    pub fn innovation(&self, id: &str) -> Option<&Innovation> {
        self.innovation_index.get(id).map(|i| &self.innovations[*i])
    }

    /// Resolve the references of a claim.
    ///
    /// Returns `None` when the village or the innovation does not exist.
    pub fn resolve<'a>(&'a self, claim: &'a Claim) -> Option<Adoption<'a>> {
        let village = self.village(&claim.village_id)?;
        let innovation = self.innovation(&claim.innovation_id)?;
        Some(Adoption {
            claim,
            village,
            innovation,
            innovator: self.innovator(&innovation.innovator_id),
        })
    }

    /// Claims with one of the given statuses, resolved. Orphaned claims are skipped.
    pub fn adoptions<'a>(
        &'a self,
        statuses: &'a [ClaimStatus],
    ) -> impl Iterator<Item = Adoption<'a>> + 'a {
        self.claims
            .iter()
            .filter(move |claim| statuses.contains(&claim.status))
            .filter_map(move |claim| self.resolve(claim))
    }

    /// Claims whose village or innovation does not exist.
    pub fn orphaned_claims(&self) -> impl Iterator<Item = &Claim> + '_ {
        self.claims
            .iter()
            .filter(move |claim| self.resolve(claim).is_none())
    }

    /// Innovations introduced by an innovator.
    pub fn innovations_of<'a>(
        &'a self,
        innovator_id: &'a str,
    ) -> impl Iterator<Item = &'a Innovation> + 'a {
        self.innovations
            .iter()
            .filter(move |innovation| innovation.innovator_id == innovator_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils;

    #[test]
    fn test_lookup() {
        let dataset = test_utils::dataset();
        assert_eq!("Sukamaju", dataset.village("v1").unwrap().name);
        assert_eq!("Tani Digital", dataset.innovator("n1").unwrap().name);
        assert_eq!("eFishery Desa", dataset.innovation("i2").unwrap().name);
        assert!(dataset.village("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let dataset = Dataset::new(
            vec![
                test_utils::village("v1", "First", "Bali"),
                test_utils::village("v1", "Second", "Bali"),
            ],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!("First", dataset.village("v1").unwrap().name);
    }

    #[test]
    fn test_adoptions_filter_status() {
        let dataset = test_utils::dataset();
        let verified = dataset.adoptions(&[ClaimStatus::Terverifikasi]).count();
        let pending = dataset.adoptions(&[ClaimStatus::Menunggu]).count();
        let all = dataset.adoptions(&ClaimStatus::ALL).count();
        assert_eq!(6, verified);
        assert_eq!(1, pending);
        // One rejected claim, and the orphaned claim is never resolved.
        assert_eq!(8, all);
    }

    #[test]
    fn test_adoption_resolves_innovator() {
        let dataset = test_utils::dataset();
        let adoption = dataset
            .adoptions(&[ClaimStatus::Terverifikasi])
            .find(|adoption| adoption.claim.id == "c1")
            .unwrap();
        assert_eq!("v1", adoption.village.id);
        assert_eq!("i1", adoption.innovation.id);
        assert_eq!("n1", adoption.innovator.unwrap().id);
    }

    #[test]
    fn test_orphaned_claims() {
        let dataset = test_utils::dataset();
        let orphans: Vec<&str> = dataset
            .orphaned_claims()
            .map(|claim| claim.id.as_str())
            .collect();
        assert_eq!(vec!["c9"], orphans);
    }

    #[test]
    fn test_innovations_of() {
        let dataset = test_utils::dataset();
        let ids: Vec<&str> = dataset
            .innovations_of("n1")
            .map(|innovation| innovation.id.as_str())
            .collect();
        assert_eq!(vec!["i1", "i2"], ids);
    }
}
