//! End-to-end lifecycle of a diamond's routing table.
//!
//! Mirrors the classic deployment: three initial facets (cut, loupe,
//! ownership), then two test facets are added, partially replaced,
//! partially removed, stripped back to the bare cut + loupe pair and
//! re-added.

use diamond_core::{Address, Facet, FacetCut, Selector};
use diamond_registry::{Registry, RegistryConfig};

const DIAMOND_CUT: u32 = 0x1f93_1c1c;
const FACETS: u32 = 0x7a0e_d627;
const FACET_FUNCTION_SELECTORS: u32 = 0xadfc_a15e;
const FACET_ADDRESSES: u32 = 0x52ef_6b2c;
const FACET_ADDRESS: u32 = 0xcdff_acc6;
const SUPPORTS_INTERFACE: u32 = 0x01ff_c9a7;
const TRANSFER_OWNERSHIP: u32 = 0xf2fd_e38b;
const OWNER: u32 = 0x8da5_cb5b;

fn sels(raw: &[u32]) -> Vec<Selector> {
    raw.iter().copied().map(Selector::from_u32).collect()
}

fn cut_selectors() -> Vec<Selector> {
    sels(&[DIAMOND_CUT])
}

fn loupe_selectors() -> Vec<Selector> {
    sels(&[
        FACET_FUNCTION_SELECTORS,
        FACETS,
        FACET_ADDRESS,
        FACET_ADDRESSES,
        SUPPORTS_INTERFACE,
    ])
}

fn ownership_selectors() -> Vec<Selector> {
    sels(&[TRANSFER_OWNERSHIP, OWNER])
}

/// Twenty test functions plus `supportsInterface` last.
fn test1_selectors() -> Vec<Selector> {
    let mut v: Vec<Selector> = (1..=20).map(|i| Selector::from_u32(0x7100_0000 + i)).collect();
    v.push(Selector::from_u32(SUPPORTS_INTERFACE));
    v
}

fn test2_selectors() -> Vec<Selector> {
    (1..=20).map(|i| Selector::from_u32(0x7200_0000 + i)).collect()
}

fn assert_same_members(mut got: Vec<Selector>, mut want: Vec<Selector>) {
    got.sort();
    want.sort();
    assert_eq!(got, want);
}

fn without(mut list: Vec<Selector>, item: u32) -> Vec<Selector> {
    let sel = Selector::from_u32(item);
    list.retain(|s| *s != sel);
    list
}

struct Fixture {
    registry: Registry,
    cut: Address,
    loupe: Address,
    ownership: Address,
    test1: Address,
    test2: Address,
}

fn deploy() -> Fixture {
    let cut = Address::from_low_u64(0xc0);
    let loupe = Address::from_low_u64(0x10);
    let ownership = Address::from_low_u64(0x0e);
    let registry = Registry::with_cuts(
        RegistryConfig::default(),
        &[
            FacetCut::add(cut, cut_selectors()),
            FacetCut::add(loupe, loupe_selectors()),
            FacetCut::add(ownership, ownership_selectors()),
        ],
    )
    .unwrap();

    Fixture {
        registry,
        cut,
        loupe,
        ownership,
        test1: Address::from_low_u64(0x71),
        test2: Address::from_low_u64(0x72),
    }
}

#[test]
fn test_initial_facets() {
    let f = deploy();
    let addresses = f.registry.facet_addresses();
    assert_eq!(addresses, vec![f.cut, f.loupe, f.ownership]);

    assert_same_members(f.registry.facet_function_selectors(&addresses[0]), cut_selectors());
    assert_same_members(f.registry.facet_function_selectors(&addresses[1]), loupe_selectors());
    assert_same_members(
        f.registry.facet_function_selectors(&addresses[2]),
        ownership_selectors(),
    );

    let lookup = |raw| f.registry.facet_address(&Selector::from_u32(raw));
    assert_eq!(lookup(DIAMOND_CUT), Some(f.cut));
    assert_eq!(lookup(FACET_ADDRESS), Some(f.loupe));
    assert_eq!(lookup(SUPPORTS_INTERFACE), Some(f.loupe));
    assert_eq!(lookup(TRANSFER_OWNERSHIP), Some(f.ownership));

    let facets = f.registry.facets();
    assert_eq!(facets.len(), 3);
    assert_eq!(facets[0].facet_address, f.cut);
    assert_eq!(facets[1].facet_address, f.loupe);
    assert_eq!(facets[2].facet_address, f.ownership);
}

#[test]
fn test_full_lifecycle() {
    let mut f = deploy();
    let r = &mut f.registry;

    // Add test1, all but its last selector.
    let t1 = test1_selectors();
    r.apply(&[FacetCut::add(f.test1, t1[..t1.len() - 1].to_vec())])
        .unwrap();
    assert_same_members(r.facet_function_selectors(&f.test1), t1[..t1.len() - 1].to_vec());

    // Replace supportsInterface onto test1.
    let positions_before: Vec<Option<usize>> =
        r.selectors().iter().map(|s| r.position_of(s)).collect();
    r.apply(&[FacetCut::replace(f.test1, t1[t1.len() - 1..].to_vec())])
        .unwrap();
    assert_same_members(r.facet_function_selectors(&f.test1), t1.clone());
    assert_same_members(
        r.facet_function_selectors(&f.loupe),
        without(loupe_selectors(), SUPPORTS_INTERFACE),
    );
    let positions_after: Vec<Option<usize>> =
        r.selectors().iter().map(|s| r.position_of(s)).collect();
    assert_eq!(positions_before, positions_after);

    // Add test2.
    let t2 = test2_selectors();
    r.apply(&[FacetCut::add(f.test2, t2.clone())]).unwrap();
    assert_same_members(r.facet_function_selectors(&f.test2), t2.clone());

    // Remove some test2 functions.
    let remove2: Vec<Selector> = [&t2[0..1], &t2[4..6], &t2[t2.len() - 2..]].concat();
    r.apply(&[FacetCut::remove(remove2.clone())]).unwrap();
    let keep2: Vec<Selector> = t2.iter().copied().filter(|s| !remove2.contains(s)).collect();
    assert_same_members(r.facet_function_selectors(&f.test2), keep2);

    // Remove some test1 functions.
    let remove1: Vec<Selector> = [&t1[1..2], &t1[8..10]].concat();
    r.apply(&[FacetCut::remove(remove1.clone())]).unwrap();
    let keep1: Vec<Selector> = t1.iter().copied().filter(|s| !remove1.contains(s)).collect();
    assert_same_members(r.facet_function_selectors(&f.test1), keep1);

    // Strip everything except diamondCut and facets().
    let mut strip: Vec<Selector> = r
        .facets()
        .iter()
        .skip(1)
        .flat_map(|facet| facet.function_selectors.clone())
        .collect();
    strip.retain(|s| *s != Selector::from_u32(FACETS));
    r.apply(&[FacetCut::remove(strip)]).unwrap();

    let facets = r.facets();
    assert_eq!(facets.len(), 2);
    assert_eq!(facets[0].facet_address, f.cut);
    assert_same_members(facets[0].function_selectors.clone(), sels(&[DIAMOND_CUT]));
    assert_eq!(facets[1].facet_address, f.loupe);
    assert_same_members(facets[1].function_selectors.clone(), sels(&[FACETS]));
    assert_eq!(r.selector_count(), 2);

    // Re-add most functions and facets in one cut.
    let loupe_rest = without(without(loupe_selectors(), FACETS), SUPPORTS_INTERFACE);
    r.apply(&[
        FacetCut::add(f.loupe, loupe_rest),
        FacetCut::add(f.ownership, ownership_selectors()),
        FacetCut::add(f.test1, test1_selectors()),
        FacetCut::add(f.test2, test2_selectors()),
    ])
    .unwrap();

    let facets = r.facets();
    let addresses = r.facet_addresses();
    assert_eq!(addresses.len(), 5);
    assert_eq!(facets.len(), 5);
    assert_eq!(
        addresses,
        vec![f.cut, f.loupe, f.ownership, f.test1, f.test2]
    );
    for (row, address) in facets.iter().zip(&addresses) {
        assert_eq!(row.facet_address, *address);
    }

    let find = |address: Address| -> Facet {
        facets
            .iter()
            .find(|row| row.facet_address == address)
            .cloned()
            .unwrap()
    };
    assert_same_members(find(f.cut).function_selectors, cut_selectors());
    assert_same_members(
        find(f.loupe).function_selectors,
        without(loupe_selectors(), SUPPORTS_INTERFACE),
    );
    assert_same_members(find(f.ownership).function_selectors, ownership_selectors());
    assert_same_members(find(f.test1).function_selectors, test1_selectors());
    assert_same_members(find(f.test2).function_selectors, test2_selectors());

    assert!(r.verify().is_ok());
}

#[test]
fn test_add_remove_round_trip_restores_loupe() {
    let mut f = deploy();
    let addresses = f.registry.facet_addresses();
    let facets = f.registry.facets();

    f.registry
        .apply(&[FacetCut::add(f.test1, [Selector::from_u32(0x1234_5678)])])
        .unwrap();
    f.registry
        .apply(&[FacetCut::remove([Selector::from_u32(0x1234_5678)])])
        .unwrap();

    assert_eq!(f.registry.facet_addresses(), addresses);
    assert_eq!(f.registry.facets(), facets);
}

#[test]
fn test_facet_dropped_when_last_selector_replaced_away() {
    let mut f = deploy();
    f.registry
        .apply(&[FacetCut::replace(f.test1, cut_selectors())])
        .unwrap();

    assert_eq!(
        f.registry.facet_addresses(),
        vec![f.loupe, f.ownership, f.test1]
    );
    assert!(f.registry.facet_function_selectors(&f.cut).is_empty());
}
