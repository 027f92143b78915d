//! Recovery request store.
//!
//! Owns the deployment-wide request identifier counter and the request
//! records themselves. Identifiers start at one, only ever grow, and are
//! never reused; zero stays reserved as the invalid identifier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use velum_core::{EncUint, HolderId, RecoveryError, RecoveryResult, RequestId};

/// One recovery request and its encrypted approval counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryRequest {
    /// Deployment-wide identifier, never reused.
    pub id: RequestId,
    /// Holder whose credential is being recovered.
    pub holder: HolderId,
    /// Homomorphically maintained approval counter.
    pub approvals: EncUint,
    /// Creation time, epoch milliseconds.
    pub created_at_ms: u64,
    /// Terminal flag. Transitions false to true at most once, and only as
    /// the result of a verified decryption callback; once true, the
    /// counter and this flag are immutable.
    pub executed: bool,
}

/// Store of all recovery requests, owner of the id counter.
#[derive(Debug, Default)]
pub struct RequestStore {
    // Last allocated id; the first allocation yields 1.
    last_id: u64,
    requests: HashMap<RequestId, RecoveryRequest>,
}

impl RequestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh identifier and store a new open request.
    pub fn create(&mut self, holder: HolderId, approvals: EncUint, now_ms: u64) -> RequestId {
        self.last_id += 1;
        let id = RequestId(self.last_id);
        self.requests.insert(
            id,
            RecoveryRequest {
                id,
                holder,
                approvals,
                created_at_ms: now_ms,
                executed: false,
            },
        );
        id
    }

    /// Look up a request.
    ///
    /// Fails with `InvalidRequest` for the reserved identifier, for
    /// identifiers beyond the allocation counter, and for identifiers
    /// never created.
    pub fn get(&self, id: RequestId) -> RecoveryResult<&RecoveryRequest> {
        self.requests
            .get(&id)
            .ok_or_else(|| RecoveryError::invalid_request(id))
    }

    pub(crate) fn get_mut(&mut self, id: RequestId) -> RecoveryResult<&mut RecoveryRequest> {
        self.requests
            .get_mut(&id)
            .ok_or_else(|| RecoveryError::invalid_request(id))
    }

    /// Flip the terminal flag, enforcing the at-most-once transition.
    pub(crate) fn mark_executed(&mut self, id: RequestId) -> RecoveryResult<()> {
        let request = self.get_mut(id)?;
        if request.executed {
            return Err(RecoveryError::already_executed(id));
        }
        request.executed = true;
        Ok(())
    }

    /// All requests owned by `holder`, ordered by identifier.
    pub fn for_holder(&self, holder: &HolderId) -> Vec<&RecoveryRequest> {
        let mut owned: Vec<_> = self
            .requests
            .values()
            .filter(|request| &request.holder == holder)
            .collect();
        owned.sort_by_key(|request| request.id);
        owned
    }

    /// Number of requests ever created.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no request was ever created.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
