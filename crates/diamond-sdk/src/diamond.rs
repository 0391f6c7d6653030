//! The diamond handle: an ownership-gated routing registry.

use crate::config::DiamondConfig;
use crate::error::{DiamondError, Result};
use crate::interfaces::{InterfaceId, InterfaceTable};
use crate::ownership::{Authorizer, Ownership};
use diamond_core::{Address, Facet, FacetCut, Hash, Selector};
use diamond_registry::{CutReceipt, NoHook, PostCutHook, Registry, RegistrySnapshot};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

/// A diamond: selector routing plus the ownership and interface state
/// around it.
///
/// Cloning is cheap and every clone shares the same state. Cuts are
/// serialized behind a write lock; loupe queries take the read lock and may
/// run concurrently with each other.
///
/// # Example
///
/// ```rust
/// use diamond_core::{Address, FacetCut, Selector};
/// use diamond_sdk::{Diamond, DiamondConfigBuilder};
///
/// let owner = Address::from_low_u64(1);
/// let diamond = Diamond::new(DiamondConfigBuilder::new().owner(owner).build());
///
/// let facet = Address::from_low_u64(0xf1);
/// diamond
///     .diamond_cut(&owner, &[FacetCut::add(facet, [Selector::from_u32(0x8da5cb5b)])])
///     .unwrap();
///
/// assert_eq!(diamond.route(&Selector::from_u32(0x8da5cb5b)).unwrap(), facet);
/// assert!(diamond.route(&Selector::from_u32(0xdeadbeef)).is_err());
/// ```
#[derive(Clone)]
pub struct Diamond {
    config: DiamondConfig,
    registry: Arc<RwLock<Registry>>,
    ownership: Arc<Ownership>,
    authorizer: Arc<dyn Authorizer>,
    interfaces: Arc<RwLock<InterfaceTable>>,
}

impl Diamond {
    /// Create an empty diamond owned by `config.owner`.
    pub fn new(config: DiamondConfig) -> Self {
        let ownership = Arc::new(Ownership::new(config.owner));
        let interfaces = if config.default_interfaces {
            InterfaceTable::with_defaults()
        } else {
            InterfaceTable::new()
        };

        Self {
            registry: Arc::new(RwLock::new(Registry::new(config.registry.clone()))),
            authorizer: ownership.clone(),
            ownership,
            interfaces: Arc::new(RwLock::new(interfaces)),
            config,
        }
    }

    /// Create a diamond with its initial facet set installed.
    pub fn with_facets(config: DiamondConfig, cuts: &[FacetCut]) -> Result<Self> {
        let registry = Registry::with_cuts(config.registry.clone(), cuts)?;
        let diamond = Self::new(config);
        *diamond.registry.write() = registry;
        Ok(diamond)
    }

    /// Replace the cut gate. Ownership queries and transfers still go
    /// through the owner record.
    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }

    pub fn config(&self) -> &DiamondConfig {
        &self.config
    }

    /// Apply a cut with no initializer.
    pub fn diamond_cut(&self, caller: &Address, cuts: &[FacetCut]) -> Result<CutReceipt> {
        self.diamond_cut_with_init(caller, cuts, Address::ZERO, &[], &NoHook)
    }

    /// Apply a cut and run `hook` with `calldata` if `init` is not null.
    ///
    /// The write lock is held from the authorization check through the
    /// hook, so the hook must not call back into this diamond.
    pub fn diamond_cut_with_init<H>(
        &self,
        caller: &Address,
        cuts: &[FacetCut],
        init: Address,
        calldata: &[u8],
        hook: &H,
    ) -> Result<CutReceipt>
    where
        H: PostCutHook + ?Sized,
    {
        let mut registry = self.registry.write();
        self.ensure_authorized(caller, "diamond_cut", self.authorizer.as_ref())?;
        let receipt = registry.cut(cuts, init, calldata, hook)?;
        Ok(receipt)
    }

    /// The facet a call with `selector` is forwarded to.
    pub fn route(&self, selector: &Selector) -> Result<Address> {
        self.registry
            .read()
            .facet_address(selector)
            .ok_or(DiamondError::FunctionNotFound(*selector))
    }

    pub fn facet_address(&self, selector: &Selector) -> Option<Address> {
        self.registry.read().facet_address(selector)
    }

    pub fn facet_function_selectors(&self, facet: &Address) -> Vec<Selector> {
        self.registry.read().facet_function_selectors(facet)
    }

    pub fn facet_addresses(&self) -> Vec<Address> {
        self.registry.read().facet_addresses()
    }

    pub fn facets(&self) -> Vec<Facet> {
        self.registry.read().facets()
    }

    /// Read access to the registry for several queries against one
    /// consistent state.
    pub fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read()
    }

    pub fn state_root(&self) -> Hash {
        self.registry.read().state_root()
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    /// Hand ownership to `new_owner`. Returns the previous owner.
    ///
    /// Waits for any in-flight owner-gated operation, so none of them can
    /// commit on the strength of the previous owner once this returns.
    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<Address> {
        let _registry = self.registry.write();
        let _interfaces = self.interfaces.write();
        self.ownership.transfer(caller, new_owner)
    }

    pub fn supports_interface(&self, id: &InterfaceId) -> bool {
        self.interfaces.read().supports(id)
    }

    /// Owner-only. Returns the previous setting.
    pub fn set_supported_interface(
        &self,
        caller: &Address,
        id: InterfaceId,
        supported: bool,
    ) -> Result<bool> {
        let mut interfaces = self.interfaces.write();
        self.ensure_authorized(caller, "set_supported_interface", self.ownership.as_ref())?;
        Ok(interfaces.set(id, supported))
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.read().snapshot()
    }

    /// Owner-only. Replace the routing table with one rebuilt from
    /// `snapshot`; on error the current table is kept.
    pub fn restore(&self, caller: &Address, snapshot: &RegistrySnapshot) -> Result<()> {
        let mut registry = self.registry.write();
        self.ensure_authorized(caller, "restore", self.ownership.as_ref())?;
        *registry = Registry::from_snapshot(self.config.registry.clone(), snapshot)?;
        Ok(())
    }

    fn ensure_authorized(
        &self,
        caller: &Address,
        operation: &str,
        authorizer: &dyn Authorizer,
    ) -> Result<()> {
        if authorizer.authorize(caller) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, operation, "unauthorized call rejected");
            Err(DiamondError::Unauthorized(*caller))
        }
    }
}

impl std::fmt::Debug for Diamond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("Diamond")
            .field("owner", &self.owner())
            .field("generation", &registry.generation())
            .field("selectors", &registry.selector_count())
            .field("facets", &registry.facet_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiamondConfigBuilder;
    use crate::interfaces::{DIAMOND_LOUPE, ERC165};
    use crate::ownership::AllowAll;
    use diamond_registry::CutError;

    fn owner() -> Address {
        Address::from_low_u64(0x0a)
    }

    fn diamond() -> Diamond {
        Diamond::new(DiamondConfigBuilder::new().owner(owner()).build())
    }

    #[test]
    fn test_owner_can_cut() {
        let d = diamond();
        let facet = Address::from_low_u64(0xf1);
        let receipt = d
            .diamond_cut(&owner(), &[FacetCut::add(facet, [Selector::from_u32(1)])])
            .unwrap();

        assert_eq!(receipt.added, 1);
        assert_eq!(d.facet_addresses(), vec![facet]);
    }

    #[test]
    fn test_stranger_cannot_cut() {
        let d = diamond();
        let stranger = Address::from_low_u64(0x0b);
        let err = d
            .diamond_cut(
                &stranger,
                &[FacetCut::add(Address::from_low_u64(0xf1), [Selector::from_u32(1)])],
            )
            .unwrap_err();

        assert_eq!(err, DiamondError::Unauthorized(stranger));
        assert!(d.read().is_empty());
    }

    #[test]
    fn test_allow_all_authorizer() {
        let d = diamond().with_authorizer(AllowAll);
        let anyone = Address::from_low_u64(0x0b);
        d.diamond_cut(
            &anyone,
            &[FacetCut::add(Address::from_low_u64(0xf1), [Selector::from_u32(1)])],
        )
        .unwrap();

        // Interface changes still need the owner.
        assert!(d.set_supported_interface(&anyone, ERC165, false).is_err());
    }

    #[test]
    fn test_route_unknown_selector() {
        let d = diamond();
        let sel = Selector::from_u32(0xdead_beef);
        assert_eq!(d.route(&sel), Err(DiamondError::FunctionNotFound(sel)));
        assert_eq!(
            d.route(&sel).unwrap_err().to_string(),
            "Diamond: Function 0xdeadbeef does not exist"
        );
    }

    #[test]
    fn test_cut_error_passes_through() {
        let d = diamond();
        let err = d
            .diamond_cut(&owner(), &[FacetCut::remove([Selector::from_u32(9)])])
            .unwrap_err();
        assert_eq!(
            err,
            DiamondError::Cut(CutError::SelectorNotFound(Selector::from_u32(9)))
        );
    }

    #[test]
    fn test_init_hook_sees_new_routes() {
        let d = diamond();
        let facet = Address::from_low_u64(0xf1);
        let sel = Selector::from_u32(0x0102_0304);
        let hook = |_: &Address, data: &[u8], r: &Registry| -> std::result::Result<(), String> {
            assert_eq!(data, b"setup");
            assert_eq!(
                r.facet_address(&Selector::from_u32(0x0102_0304)),
                Some(Address::from_low_u64(0xf1))
            );
            Ok(())
        };

        d.diamond_cut_with_init(
            &owner(),
            &[FacetCut::add(facet, [sel])],
            Address::from_low_u64(0x1417),
            b"setup",
            &hook,
        )
        .unwrap();
        assert_eq!(d.route(&sel), Ok(facet));
    }

    #[test]
    fn test_transfer_ownership_moves_cut_rights() {
        let d = diamond();
        let next = Address::from_low_u64(0x0b);
        assert_eq!(d.transfer_ownership(&owner(), next), Ok(owner()));
        assert_eq!(d.owner(), next);

        let cut = [FacetCut::add(Address::from_low_u64(0xf1), [Selector::from_u32(1)])];
        assert!(d.diamond_cut(&owner(), &cut).is_err());
        assert!(d.diamond_cut(&next, &cut).is_ok());
    }

    #[test]
    fn test_transfer_waits_for_in_flight_cut() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let d = diamond();
        let next = Address::from_low_u64(0x0b);
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let cutter = {
            let d = d.clone();
            thread::spawn(move || {
                let hook = move |_: &Address,
                                 _: &[u8],
                                 _: &Registry|
                      -> std::result::Result<(), String> {
                    entered_tx.send(()).map_err(|e| e.to_string())?;
                    release_rx.recv().map_err(|e| e.to_string())
                };
                d.diamond_cut_with_init(
                    &owner(),
                    &[FacetCut::add(Address::from_low_u64(0xf1), [Selector::from_u32(1)])],
                    Address::from_low_u64(0x1417),
                    &[],
                    &hook,
                )
            })
        };
        entered_rx.recv().unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        let transfer = {
            let d = d.clone();
            thread::spawn(move || {
                let result = d.transfer_ownership(&owner(), next);
                done_tx.send(()).unwrap();
                result
            })
        };

        // The cut holds the lock, so the transfer cannot have landed yet.
        thread::sleep(Duration::from_millis(50));
        assert!(done_rx.try_recv().is_err());
        assert_eq!(d.owner(), owner());

        release_tx.send(()).unwrap();
        assert!(cutter.join().unwrap().is_ok());
        assert_eq!(transfer.join().unwrap(), Ok(owner()));

        let cut = [FacetCut::add(Address::from_low_u64(0xf2), [Selector::from_u32(2)])];
        assert_eq!(
            d.diamond_cut(&owner(), &cut),
            Err(DiamondError::Unauthorized(owner()))
        );
        assert!(d.diamond_cut(&next, &cut).is_ok());
    }

    #[test]
    fn test_interfaces() {
        let d = diamond();
        assert!(d.supports_interface(&DIAMOND_LOUPE));

        let custom = Selector::from_u32(0x1234_5678);
        assert_eq!(d.set_supported_interface(&owner(), custom, true), Ok(false));
        assert!(d.supports_interface(&custom));

        let bare = Diamond::new(DiamondConfigBuilder::new().default_interfaces(false).build());
        assert!(!bare.supports_interface(&ERC165));
    }

    #[test]
    fn test_snapshot_restore() {
        let d = diamond();
        let facet = Address::from_low_u64(0xf1);
        d.diamond_cut(
            &owner(),
            &[FacetCut::add(facet, (0..10).map(Selector::from_u32))],
        )
        .unwrap();
        let snapshot = d.snapshot();
        let root = d.state_root();

        d.diamond_cut(&owner(), &[FacetCut::remove((0..5).map(Selector::from_u32))])
            .unwrap();
        assert_ne!(d.state_root(), root);

        assert!(d.restore(&Address::from_low_u64(0x0b), &snapshot).is_err());
        d.restore(&owner(), &snapshot).unwrap();
        assert_eq!(d.state_root(), root);
        assert_eq!(d.facet_function_selectors(&facet).len(), 10);
    }

    #[test]
    fn test_clones_share_state() {
        let d = diamond();
        let other = d.clone();
        d.diamond_cut(
            &owner(),
            &[FacetCut::add(Address::from_low_u64(0xf1), [Selector::from_u32(1)])],
        )
        .unwrap();
        assert_eq!(other.read().selector_count(), 1);
    }
}
