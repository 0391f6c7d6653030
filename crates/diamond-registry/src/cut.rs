//! The cut protocol: validate, mutate, notify, commit or roll back.

use crate::error::CutError;
use crate::registry::Registry;
use crate::undo::UndoLog;
use diamond_core::{Address, FacetCut, FacetCutAction, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ulid::Ulid;

/// Unique identifier for a committed cut.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CutId(Ulid);

impl CutId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn as_ulid(&self) -> &Ulid {
        &self.0
    }

    /// Commit time in milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl Default for CutId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of a committed cut.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutReceipt {
    pub id: CutId,
    /// Registry generation after this cut.
    pub generation: u64,
    pub added: usize,
    pub replaced: usize,
    pub removed: usize,
    /// Removals that moved the last selector into a gap.
    pub relocations: usize,
}

/// The initializer invoked once after a cut's mutations, before commit.
///
/// It sees the mutated registry. Returning an error reverts the whole cut.
pub trait PostCutHook {
    fn call(&self, init: &Address, calldata: &[u8], registry: &Registry) -> Result<(), String>;
}

impl<F> PostCutHook for F
where
    F: Fn(&Address, &[u8], &Registry) -> Result<(), String>,
{
    fn call(&self, init: &Address, calldata: &[u8], registry: &Registry) -> Result<(), String> {
        self(init, calldata, registry)
    }
}

/// A hook that accepts every initializer call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHook;

impl PostCutHook for NoHook {
    fn call(&self, _init: &Address, _calldata: &[u8], _registry: &Registry) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Default)]
struct Tally {
    added: usize,
    replaced: usize,
    removed: usize,
    relocations: usize,
}

impl Registry {
    /// Apply a cut with no initializer.
    pub fn apply(&mut self, cuts: &[FacetCut]) -> Result<CutReceipt, CutError> {
        self.cut(cuts, Address::ZERO, &[], &NoHook)
    }

    /// Apply `cuts` in order, then call `hook` with `calldata` if `init` is
    /// not the null address.
    ///
    /// All-or-nothing: on any error, including a hook failure, the registry
    /// is restored to exactly the state it had before the call.
    pub fn cut<H>(
        &mut self,
        cuts: &[FacetCut],
        init: Address,
        calldata: &[u8],
        hook: &H,
    ) -> Result<CutReceipt, CutError>
    where
        H: PostCutHook + ?Sized,
    {
        self.check_size(cuts)?;

        let mut log = UndoLog::new();
        let mut tally = Tally::default();
        let outcome = self
            .apply_all(cuts, &mut log, &mut tally)
            .and_then(|()| self.notify(init, calldata, hook))
            .and_then(|()| self.check_invariants());

        if let Err(err) = outcome {
            tracing::warn!(
                error = %err,
                undo_entries = log.len(),
                "cut rejected, rolling back"
            );
            self.rollback(log)?;
            return Err(err);
        }

        self.generation += 1;
        let receipt = CutReceipt {
            id: CutId::new(),
            generation: self.generation,
            added: tally.added,
            replaced: tally.replaced,
            removed: tally.removed,
            relocations: tally.relocations,
        };
        tracing::info!(
            cut = %receipt.id,
            generation = receipt.generation,
            added = receipt.added,
            replaced = receipt.replaced,
            removed = receipt.removed,
            selectors = self.selector_count(),
            facets = self.facet_count(),
            root = %self.state_root().short(),
            "cut committed"
        );
        Ok(receipt)
    }

    fn check_size(&self, cuts: &[FacetCut]) -> Result<(), CutError> {
        if let Some(limit) = self.config.max_cut_size {
            let found: usize = cuts.iter().map(|c| c.function_selectors.len()).sum();
            if found > limit {
                return Err(CutError::CutTooLarge { limit, found });
            }
        }
        Ok(())
    }

    fn apply_all(
        &mut self,
        cuts: &[FacetCut],
        log: &mut UndoLog,
        tally: &mut Tally,
    ) -> Result<(), CutError> {
        for cut in cuts {
            tracing::debug!(
                facet = %cut.facet_address,
                action = %cut.action,
                selectors = cut.function_selectors.len(),
                "applying facet cut"
            );
            self.validate(cut)?;

            let facet = cut.facet_address;
            for &selector in &cut.function_selectors {
                match cut.action {
                    FacetCutAction::Add => {
                        log.record(self.insert_selector(selector, facet));
                        tally.added += 1;
                    }
                    FacetCutAction::Replace => {
                        log.record(self.transfer_selector(selector, facet)?);
                        tally.replaced += 1;
                    }
                    FacetCutAction::Remove => {
                        let entry = self.remove_selector(selector)?;
                        if entry.relocated() {
                            tally.relocations += 1;
                        }
                        log.record(entry);
                        tally.removed += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Check one triple against the current state before touching it.
    fn validate(&self, cut: &FacetCut) -> Result<(), CutError> {
        let facet = cut.facet_address;
        let invalid_facet = match cut.action {
            FacetCutAction::Add | FacetCutAction::Replace => facet.is_zero(),
            FacetCutAction::Remove => !facet.is_zero(),
        };
        if invalid_facet {
            return Err(CutError::InvalidFacet {
                action: cut.action,
                facet,
            });
        }

        let mut batch: HashSet<Selector> = HashSet::with_capacity(cut.function_selectors.len());
        for &selector in &cut.function_selectors {
            let repeated = !batch.insert(selector);
            let owner = self.facet_address(&selector);
            match cut.action {
                FacetCutAction::Add => {
                    if repeated || owner.is_some() {
                        return Err(CutError::DuplicateSelector(selector));
                    }
                }
                FacetCutAction::Replace => match owner {
                    None => return Err(CutError::SelectorNotFound(selector)),
                    Some(current) if current == facet || repeated => {
                        return Err(CutError::NoOpReplace(selector))
                    }
                    Some(_) => {}
                },
                FacetCutAction::Remove => {
                    if repeated || owner.is_none() {
                        return Err(CutError::SelectorNotFound(selector));
                    }
                }
            }
        }
        Ok(())
    }

    fn notify<H>(&self, init: Address, calldata: &[u8], hook: &H) -> Result<(), CutError>
    where
        H: PostCutHook + ?Sized,
    {
        if init.is_zero() {
            return Ok(());
        }
        tracing::debug!(init = %init, calldata_len = calldata.len(), "calling post-cut hook");
        hook.call(&init, calldata, self)
            .map_err(CutError::PostHookFailed)
    }

    fn check_invariants(&self) -> Result<(), CutError> {
        if self.config.verify_after_cut {
            self.verify().map_err(CutError::Invariant)?;
        }
        Ok(())
    }
}
