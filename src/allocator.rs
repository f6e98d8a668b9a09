//! Identity allocation

use std::fmt::Debug;

use uuid::Uuid;

/// Produces cart tokens for stores that cannot assign identities themselves.
pub trait IdentityAllocator: Debug + Send + Sync {
    /// Next token. Must be globally unique with overwhelming probability.
    fn allocate(&self) -> Uuid;
}

/// Random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokens;

impl IdentityAllocator for RandomTokens {
    fn allocate(&self) -> Uuid {
        Uuid::new_v4()
    }
}
