//! Who may cut: the authorization collaborator.

use crate::error::{DiamondError, Result};
use diamond_core::Address;
use parking_lot::RwLock;
use std::sync::Arc;

/// Decides whether a caller may change the diamond.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, caller: &Address) -> bool;
}

impl<A: Authorizer + ?Sized> Authorizer for Arc<A> {
    fn authorize(&self, caller: &Address) -> bool {
        (**self).authorize(caller)
    }
}

/// Single-owner authorization (ERC-173 style).
#[derive(Debug)]
pub struct Ownership {
    owner: RwLock<Address>,
}

impl Ownership {
    pub fn new(owner: Address) -> Self {
        Self {
            owner: RwLock::new(owner),
        }
    }

    pub fn owner(&self) -> Address {
        *self.owner.read()
    }

    /// Hand ownership to `new_owner`. Only the current owner may do this.
    /// Returns the previous owner.
    pub fn transfer(&self, caller: &Address, new_owner: Address) -> Result<Address> {
        let mut owner = self.owner.write();
        if caller.is_zero() || *owner != *caller {
            return Err(DiamondError::Unauthorized(*caller));
        }
        let previous = std::mem::replace(&mut *owner, new_owner);
        tracing::info!(from = %previous, to = %new_owner, "ownership transferred");
        Ok(previous)
    }
}

impl Authorizer for Ownership {
    fn authorize(&self, caller: &Address) -> bool {
        !caller.is_zero() && *caller == *self.owner.read()
    }
}

/// Authorizes every caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _caller: &Address) -> bool {
        true
    }
}
