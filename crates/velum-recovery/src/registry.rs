//! Encrypted guardian registry.
//!
//! Stores each holder's guardians as opaque ciphertext handles. A replace
//! is atomic: the previous set is discarded in the same operation that
//! installs the new one, so a partially-updated registry is never
//! observable. The registry exposes exactly one plaintext observable, the
//! guardian count.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use velum_core::{EncGuardian, HolderId};

/// Ordered collection of encrypted guardian identifiers.
///
/// Collection wrapper to make it harder to misuse raw vectors. Order is
/// preserved as submitted; nothing in this workspace compares or decrypts
/// the entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardianSet {
    guardians: Vec<EncGuardian>,
}

impl GuardianSet {
    /// Create from encrypted guardian handles.
    pub fn new(guardians: Vec<EncGuardian>) -> Self {
        Self { guardians }
    }

    /// Number of guardians.
    pub fn len(&self) -> usize {
        self.guardians.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.guardians.is_empty()
    }

    /// Iterate over the encrypted handles, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EncGuardian> {
        self.guardians.iter()
    }

    /// Convert into the inner vector.
    pub fn into_vec(self) -> Vec<EncGuardian> {
        self.guardians
    }
}

impl<'a> IntoIterator for &'a GuardianSet {
    type Item = &'a EncGuardian;
    type IntoIter = std::slice::Iter<'a, EncGuardian>;

    fn into_iter(self) -> Self::IntoIter {
        self.guardians.iter()
    }
}

/// Per-deployment store of guardian sets keyed by holder.
#[derive(Debug, Default)]
pub struct GuardianRegistry {
    sets: HashMap<HolderId, GuardianSet>,
}

impl GuardianRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `holder`'s entire guardian set.
    ///
    /// Full replace: whatever was registered before is discarded in the
    /// same operation. Only the owning holder reaches this through the
    /// protocol surface, so there is no caller check here.
    pub fn set_guardians(&mut self, holder: HolderId, guardians: Vec<EncGuardian>) {
        self.sets.insert(holder, GuardianSet::new(guardians));
    }

    /// Number of registered guardians; zero for unconfigured holders.
    pub fn guardian_count(&self, holder: &HolderId) -> usize {
        self.sets.get(holder).map_or(0, GuardianSet::len)
    }

    /// The holder's current set, for pass-through display.
    pub fn guardian_set(&self, holder: &HolderId) -> Option<&GuardianSet> {
        self.sets.get(holder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use velum_core::CiphertextHandle;

    fn guardian(seed: u8) -> EncGuardian {
        EncGuardian::new(CiphertextHandle::from_bytes(vec![seed; 16]))
    }

    fn holder(seed: u8) -> HolderId {
        HolderId::new_from_entropy([seed; 32])
    }

    #[test]
    fn unconfigured_holder_has_zero_guardians() {
        let registry = GuardianRegistry::new();
        assert_eq!(registry.guardian_count(&holder(1)), 0);
        assert!(registry.guardian_set(&holder(1)).is_none());
    }

    #[test]
    fn set_guardians_is_a_full_replace() {
        let mut registry = GuardianRegistry::new();
        let owner = holder(1);

        registry.set_guardians(owner, vec![guardian(1), guardian(2), guardian(3)]);
        assert_eq!(registry.guardian_count(&owner), 3);

        registry.set_guardians(owner, vec![guardian(9)]);
        assert_eq!(registry.guardian_count(&owner), 1);
        let set = registry.guardian_set(&owner).unwrap();
        assert_eq!(set.iter().next(), Some(&guardian(9)));
    }

    #[test]
    fn holders_are_isolated() {
        let mut registry = GuardianRegistry::new();
        registry.set_guardians(holder(1), vec![guardian(1), guardian(2)]);

        assert_eq!(registry.guardian_count(&holder(1)), 2);
        assert_eq!(registry.guardian_count(&holder(2)), 0);
    }

    #[test]
    fn registration_order_is_preserved() {
        let set = GuardianSet::new(vec![guardian(3), guardian(1), guardian(2)]);
        let order: Vec<_> = set.iter().cloned().collect();
        assert_eq!(order, vec![guardian(3), guardian(1), guardian(2)]);
    }
}
