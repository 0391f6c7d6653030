//! Loupe readers running alongside a cutting writer.

use diamond_sdk::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const OWNER: u64 = 0x0a;

fn facet(i: u64) -> Address {
    Address::from_low_u64(0xf0 + i)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_cut() {
    let owner = Address::from_low_u64(OWNER);
    let diamond = Diamond::new(DiamondConfigBuilder::new().owner(owner).build());
    let done = Arc::new(AtomicBool::new(false));

    let mut readers = Vec::new();
    for _ in 0..4 {
        let diamond = diamond.clone();
        let done = done.clone();
        readers.push(tokio::spawn(async move {
            let mut observed = 0usize;
            loop {
                let finished = done.load(Ordering::Acquire);
                {
                    let registry = diamond.read();
                    // Every batch moves selectors in groups of four.
                    assert_eq!(registry.selector_count() % 4, 0);
                    for row in registry.facets() {
                        assert!(!row.function_selectors.is_empty());
                        for selector in &row.function_selectors {
                            assert_eq!(
                                registry.facet_address(selector),
                                Some(row.facet_address)
                            );
                        }
                    }
                }
                observed += 1;
                if finished {
                    break;
                }
                tokio::task::yield_now().await;
            }
            observed
        }));
    }

    let writer = {
        let diamond = diamond.clone();
        tokio::task::spawn_blocking(move || {
            for round in 0..200u32 {
                let base = round * 4;
                let selectors: Vec<Selector> = (base..base + 4).map(Selector::from_u32).collect();
                let target = facet(u64::from(round % 3));
                diamond
                    .diamond_cut(&owner, &[FacetCut::add(target, selectors.clone())])
                    .unwrap();
                if round % 2 == 1 {
                    diamond
                        .diamond_cut(&owner, &[FacetCut::replace(facet(3), selectors.clone())])
                        .unwrap();
                }
                if round % 5 == 4 {
                    diamond
                        .diamond_cut(&owner, &[FacetCut::remove(selectors)])
                        .unwrap();
                }
                // A rejected batch must not leak its first half.
                let bad = diamond.diamond_cut(
                    &owner,
                    &[
                        FacetCut::add(facet(4), (10_000..10_004).map(Selector::from_u32)),
                        FacetCut::remove([Selector::from_u32(99_999)]),
                    ],
                );
                assert!(bad.is_err());
            }
        })
    };

    writer.await.unwrap();
    done.store(true, Ordering::Release);
    for reader in readers {
        assert!(reader.await.unwrap() > 0);
    }

    let registry = diamond.read();
    assert!(registry.verify().is_ok());
    assert_eq!(registry.selector_count(), 160 * 4);
    assert!(!registry.contains(&Selector::from_u32(10_000)));
}
