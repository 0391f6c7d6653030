//! # Diamond CLI
//!
//! A standalone walkthrough of the diamond routing registry built on the
//! diamond SDK. Facets are named handles; selectors are 4-byte ids written
//! as hex (`0x1f931c1c`) or as one of the well-known function names below.
//!
//! ## Routing model
//!
//! ```text
//! selector ──route──▶ facet        (exactly one owner per selector)
//! facet    ──loupe──▶ [selectors]  (facets with no selectors disappear)
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::*;
use diamond_sdk::{
    Address, Diamond, DiamondConfigBuilder, DiamondError, FacetCut, RegistrySnapshot, Selector,
};
use tracing_subscriber::EnvFilter;

// ─── CLI ───────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "diamond-cli")]
#[command(about = "Selector-to-facet routing registry walkthrough (diamond SDK)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full lifecycle: deploy, add, replace, remove, strip, re-add
    Demo,
    /// Removal across a slot boundary that once corrupted the table
    CacheBug,
    /// Snapshot to JSON, mutate, restore and compare state roots
    Snapshot {
        /// Write the snapshot here instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Interactive REPL for manual experimentation
    Interactive,
}

// ─── Well-known selectors ──────────────────────────────────────────────────

const KNOWN: &[(&str, u32)] = &[
    ("diamondCut", 0x1f93_1c1c),
    ("facets", 0x7a0e_d627),
    ("facetFunctionSelectors", 0xadfc_a15e),
    ("facetAddresses", 0x52ef_6b2c),
    ("facetAddress", 0xcdff_acc6),
    ("supportsInterface", 0x01ff_c9a7),
    ("transferOwnership", 0xf2fd_e38b),
    ("owner", 0x8da5_cb5b),
];

fn known(name: &str) -> Selector {
    KNOWN
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, raw)| Selector::from_u32(*raw))
        .unwrap_or(Selector::ZERO)
}

fn selector_label(selector: &Selector) -> String {
    match KNOWN.iter().find(|(_, raw)| *raw == selector.as_u32()) {
        Some((name, _)) => format!("{} ({})", selector, name),
        None => selector.to_string(),
    }
}

fn parse_selector(token: &str) -> Option<Selector> {
    KNOWN
        .iter()
        .find(|(n, _)| *n == token)
        .map(|(_, raw)| Selector::from_u32(*raw))
        .or_else(|| token.parse().ok())
}

/// Synthetic selectors for demo facets: `base + 1 ..= base + count`.
fn numbered(base: u32, count: u32) -> Vec<Selector> {
    (1..=count).map(|i| Selector::from_u32(base + i)).collect()
}

// ─── Named facets ──────────────────────────────────────────────────────────

/// Human names for facet addresses.
struct FacetBook {
    by_name: HashMap<String, Address>,
    by_address: HashMap<Address, String>,
}

impl FacetBook {
    fn new() -> Self {
        Self {
            by_name: HashMap::new(),
            by_address: HashMap::new(),
        }
    }

    fn get_or_create(&mut self, name: &str) -> Address {
        if let Some(address) = self.by_name.get(name) {
            return *address;
        }
        let address = Address::from_low_u64(0xfa00 + self.by_name.len() as u64 + 1);
        self.by_name.insert(name.to_string(), address);
        self.by_address.insert(address, name.to_string());
        address
    }

    fn label(&self, address: &Address) -> String {
        match self.by_address.get(address) {
            Some(name) => name.clone(),
            None => address.short(),
        }
    }
}

// ─── Pretty printing ──────────────────────────────────────────────────────

fn header(text: &str) {
    let bar = "═".repeat(60);
    println!("\n{}", bar.bright_cyan());
    println!("  {}", text.bold().bright_white());
    println!("{}", bar.bright_cyan());
}

fn section(text: &str) {
    println!("\n{} {}", "▸".bright_yellow(), text.bold());
}

fn step(text: &str) {
    println!("  {} {}", "•".bright_green(), text);
}

fn failure(text: &str) {
    println!("  {} {}", "✗".bright_red(), text);
}

fn show_facets(diamond: &Diamond, book: &FacetBook) {
    let border = "─".repeat(56);
    let registry = diamond.read();
    println!("  ┌{}┐", border);
    println!(
        "  │ {:^54} │",
        format!(
            "generation {} · {} selectors · {} facets",
            registry.generation(),
            registry.selector_count(),
            registry.facet_count()
        )
        .bright_yellow()
        .to_string()
    );
    println!("  ├{}┤", border);

    let facets = registry.facets();
    if facets.is_empty() {
        println!("  │ {:^54} │", "(no facets)".dimmed().to_string());
    }
    for facet in &facets {
        let title = format!(
            "{} [{}]",
            book.label(&facet.facet_address),
            facet.function_selectors.len()
        );
        println!("  │ {:<54} │", title.bright_magenta().to_string());
        for selector in &facet.function_selectors {
            println!("  │     {:<50} │", selector_label(selector));
        }
    }
    println!("  └{}┘", border);
}

fn invariant_result(diamond: &Diamond) -> bool {
    match diamond.read().verify() {
        Ok(()) => {
            println!(
                "\n  {} {}",
                "✓".bright_green().bold(),
                "INVARIANTS HOLD: routing table is consistent and dense"
                    .bright_green()
                    .bold()
            );
            true
        }
        Err(violation) => {
            println!(
                "\n  {} {} {}",
                "✗".bright_red().bold(),
                "INVARIANT VIOLATED:".bright_red().bold(),
                violation
            );
            false
        }
    }
}

fn report(result: Result<diamond_sdk::CutReceipt, DiamondError>, what: &str) {
    match result {
        Ok(receipt) => step(&format!(
            "{} → generation {} (+{} ~{} -{}, {} relocations)",
            what,
            receipt.generation,
            receipt.added,
            receipt.replaced,
            receipt.removed,
            receipt.relocations
        )),
        Err(err) => failure(&format!("{} rejected: {}", what, err)),
    }
}

// ─── Deployment ────────────────────────────────────────────────────────────

const OWNER: u64 = 0x0a;

fn deploy(book: &mut FacetBook) -> Result<Diamond, DiamondError> {
    let cut = book.get_or_create("DiamondCutFacet");
    let loupe = book.get_or_create("DiamondLoupeFacet");
    let ownership = book.get_or_create("OwnershipFacet");

    Diamond::with_facets(
        DiamondConfigBuilder::new()
            .owner(Address::from_low_u64(OWNER))
            .build(),
        &[
            FacetCut::add(cut, [known("diamondCut")]),
            FacetCut::add(
                loupe,
                [
                    known("facets"),
                    known("facetFunctionSelectors"),
                    known("facetAddresses"),
                    known("facetAddress"),
                    known("supportsInterface"),
                ],
            ),
            FacetCut::add(ownership, [known("transferOwnership"), known("owner")]),
        ],
    )
}

// ─── Demo ──────────────────────────────────────────────────────────────────

fn run_demo() -> Result<(), DiamondError> {
    header("DEMO: Diamond Lifecycle");
    let owner = Address::from_low_u64(OWNER);
    let mut book = FacetBook::new();

    section("Phase 1: Deploy with cut, loupe and ownership facets");
    let diamond = deploy(&mut book)?;
    show_facets(&diamond, &book);

    section("Phase 2: Add Test1Facet, then replace supportsInterface onto it");
    let test1 = book.get_or_create("Test1Facet");
    report(
        diamond.diamond_cut(&owner, &[FacetCut::add(test1, numbered(0x7100_0000, 5))]),
        "add Test1Facet (5 selectors)",
    );
    report(
        diamond.diamond_cut(&owner, &[FacetCut::replace(test1, [known("supportsInterface")])]),
        "replace supportsInterface → Test1Facet",
    );
    step(&format!(
        "route(supportsInterface) = {}",
        book.label(&diamond.route(&known("supportsInterface"))?)
    ));

    section("Phase 3: Add Test2Facet and remove a few selectors");
    let test2 = book.get_or_create("Test2Facet");
    let t2 = numbered(0x7200_0000, 6);
    report(
        diamond.diamond_cut(&owner, &[FacetCut::add(test2, t2.clone())]),
        "add Test2Facet (6 selectors)",
    );
    report(
        diamond.diamond_cut(&owner, &[FacetCut::remove([t2[0], t2[4], t2[5]])]),
        "remove 3 Test2Facet selectors",
    );
    show_facets(&diamond, &book);

    section("Phase 4: A failing batch changes nothing");
    let root = diamond.state_root();
    report(
        diamond.diamond_cut(
            &owner,
            &[
                FacetCut::remove([t2[1]]),
                FacetCut::add(test2, [known("diamondCut")]),
            ],
        ),
        "remove + duplicate add",
    );
    step(&format!(
        "state root unchanged: {}",
        if diamond.state_root() == root { "yes".bright_green() } else { "no".bright_red() }
    ));
    report(
        diamond.diamond_cut(&Address::from_low_u64(0xbad), &[FacetCut::remove([t2[1]])]),
        "cut from a stranger",
    );

    section("Phase 5: Strip to diamondCut + facets, then re-add");
    let strip: Vec<Selector> = diamond
        .facets()
        .iter()
        .skip(1)
        .flat_map(|f| f.function_selectors.clone())
        .filter(|s| *s != known("facets"))
        .collect();
    report(diamond.diamond_cut(&owner, &[FacetCut::remove(strip)]), "strip");
    show_facets(&diamond, &book);

    let loupe = book.get_or_create("DiamondLoupeFacet");
    let ownership = book.get_or_create("OwnershipFacet");
    report(
        diamond.diamond_cut(
            &owner,
            &[
                FacetCut::add(
                    loupe,
                    [
                        known("facetFunctionSelectors"),
                        known("facetAddresses"),
                        known("facetAddress"),
                    ],
                ),
                FacetCut::add(ownership, [known("transferOwnership"), known("owner")]),
                FacetCut::add(test1, numbered(0x7100_0000, 5)),
                FacetCut::add(test1, [known("supportsInterface")]),
                FacetCut::add(test2, t2.clone()),
            ],
        ),
        "re-add",
    );
    show_facets(&diamond, &book);

    invariant_result(&diamond);
    step(&format!(
        "route(0xdeadbeef): {}",
        match diamond.route(&Selector::from_u32(0xdead_beef)) {
            Ok(facet) => book.label(&facet),
            Err(err) => err.to_string(),
        }
    ));
    Ok(())
}

// ─── Cache bug ─────────────────────────────────────────────────────────────

fn run_cache_bug() -> Result<(), DiamondError> {
    header("CACHE BUG: Removal Across a Slot Boundary");
    let owner = Address::from_low_u64(OWNER);
    let mut book = FacetBook::new();

    section("Phase 1: 8 base selectors fill slot 0");
    let diamond = deploy(&mut book)?;
    step(&format!("slots in use: {}", diamond.snapshot().slots.len()));

    section("Phase 2: Add sel0..sel10 to Test1Facet (spills into slot 2)");
    let test1 = book.get_or_create("Test1Facet");
    let sel: Vec<Selector> = (0..11).map(|i| Selector::from_u32(0x1900_0000 + i)).collect();
    report(
        diamond.diamond_cut(&owner, &[FacetCut::add(test1, sel.clone())]),
        "add 11 selectors",
    );
    step(&format!("slots in use: {}", diamond.snapshot().slots.len()));

    section("Phase 3: Remove owner, sel5 and sel10 in one batch");
    report(
        diamond.diamond_cut(&owner, &[FacetCut::remove([known("owner"), sel[5], sel[10]])]),
        "remove 3 selectors",
    );

    let remaining = diamond.facet_function_selectors(&test1);
    let mut ok = remaining.len() == 9;
    for (i, s) in sel.iter().enumerate() {
        let expected = i != 5 && i != 10;
        if remaining.contains(s) != expected {
            ok = false;
        }
    }
    if diamond.facet_address(&known("owner")).is_some() {
        ok = false;
    }
    show_facets(&diamond, &book);

    if ok {
        step("Test1Facet holds exactly sel0..sel4 and sel6..sel9");
    } else {
        failure("Test1Facet selectors do not match the expected set");
    }
    invariant_result(&diamond);
    Ok(())
}

// ─── Snapshot ──────────────────────────────────────────────────────────────

fn run_snapshot(out: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    header("SNAPSHOT: Persist, Mutate, Restore");
    let owner = Address::from_low_u64(OWNER);
    let mut book = FacetBook::new();
    let diamond = deploy(&mut book)?;
    let test1 = book.get_or_create("Test1Facet");
    diamond.diamond_cut(&owner, &[FacetCut::add(test1, numbered(0x7100_0000, 12))])?;

    section("Phase 1: Take snapshot");
    let snapshot = diamond.snapshot();
    let json = snapshot.to_json()?;
    match &out {
        Some(path) => {
            fs::write(path, &json)?;
            step(&format!("wrote {} bytes to {}", json.len(), path.display()));
        }
        None => println!("{}", json.dimmed()),
    }
    step(&format!("state root: {}", snapshot.state_root.short()));

    section("Phase 2: Mutate");
    diamond.diamond_cut(&owner, &[FacetCut::remove(numbered(0x7100_0000, 6))])?;
    step(&format!("state root now: {}", diamond.state_root().short()));

    section("Phase 3: Restore from JSON");
    let parsed = RegistrySnapshot::from_json(&json)?;
    diamond.restore(&owner, &parsed)?;
    let restored = diamond.state_root();
    step(&format!("state root restored: {}", restored.short()));
    if restored == snapshot.state_root {
        step("roots match");
    } else {
        failure("roots differ");
    }

    section("Phase 4: Tampered snapshot is rejected");
    let mut tampered: serde_json::Value = serde_json::from_str(&json)?;
    tampered["selectorCount"] = serde_json::json!(3);
    let tampered: RegistrySnapshot = serde_json::from_value(tampered)?;
    match diamond.restore(&owner, &tampered) {
        Ok(()) => failure("tampered snapshot accepted"),
        Err(err) => step(&format!("rejected: {}", err)),
    }
    invariant_result(&diamond);
    Ok(())
}

// ─── Interactive ───────────────────────────────────────────────────────────

fn selectors_from(tokens: &[&str]) -> Option<Vec<Selector>> {
    tokens.iter().map(|t| parse_selector(t)).collect()
}

fn run_interactive() -> Result<(), DiamondError> {
    header("INTERACTIVE REPL: Diamond SDK");
    let owner = Address::from_low_u64(OWNER);
    let mut book = FacetBook::new();
    let diamond = deploy(&mut book)?;

    println!();
    println!("  {}", "Commands:".bold().underline());
    println!("    {} <facet> <sel...>       Add selectors to a facet", "add".bright_cyan());
    println!("    {} <facet> <sel...>   Point selectors at a facet", "replace".bright_cyan());
    println!("    {} <sel...>            Remove selectors", "remove".bright_cyan());
    println!("    {} <sel>                Which facet handles a selector", "route".bright_cyan());
    println!("    {} <facet>               Selectors of one facet", "show".bright_cyan());
    println!("    {}                      All facets", "list".bright_cyan());
    println!("    {}                      State root", "root".bright_cyan());
    println!("    {}                    Check invariants", "verify".bright_cyan());
    println!("    {}                  Print snapshot JSON", "snapshot".bright_cyan());
    println!("    {}                      Exit", "quit".bright_cyan());
    println!();

    loop {
        print!("{}", "diamond> ".bright_cyan().bold());
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() || input.is_empty() {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "add" | "replace" => {
                if parts.len() < 3 {
                    println!("  {} Usage: {} <facet> <sel...>", "!".bright_red(), parts[0]);
                    continue;
                }
                let Some(selectors) = selectors_from(&parts[2..]) else {
                    println!("  {} Bad selector", "!".bright_red());
                    continue;
                };
                let facet = book.get_or_create(parts[1]);
                let cut = if parts[0] == "add" {
                    FacetCut::add(facet, selectors)
                } else {
                    FacetCut::replace(facet, selectors)
                };
                report(diamond.diamond_cut(&owner, &[cut]), parts[0]);
            }

            "remove" | "rm" => {
                let Some(selectors) = selectors_from(&parts[1..]) else {
                    println!("  {} Bad selector", "!".bright_red());
                    continue;
                };
                report(diamond.diamond_cut(&owner, &[FacetCut::remove(selectors)]), "remove");
            }

            "route" => match parts.get(1).and_then(|t| parse_selector(t)) {
                Some(selector) => match diamond.route(&selector) {
                    Ok(facet) => step(&format!(
                        "{} → {}",
                        selector_label(&selector),
                        book.label(&facet)
                    )),
                    Err(err) => failure(&err.to_string()),
                },
                None => println!("  {} Usage: route <sel>", "!".bright_red()),
            },

            "show" => match parts.get(1) {
                Some(name) => {
                    let facet = book.get_or_create(name);
                    let selectors = diamond.facet_function_selectors(&facet);
                    if selectors.is_empty() {
                        step(&format!("{} has no selectors", name));
                    }
                    for selector in &selectors {
                        step(&selector_label(selector));
                    }
                }
                None => println!("  {} Usage: show <facet>", "!".bright_red()),
            },

            "list" | "ls" => show_facets(&diamond, &book),

            "root" => step(&diamond.state_root().to_string()),

            "verify" => {
                invariant_result(&diamond);
            }

            "snapshot" => match diamond.snapshot().to_json() {
                Ok(json) => println!("{}", json),
                Err(err) => failure(&err.to_string()),
            },

            "quit" | "exit" | "q" => break,

            other => println!("  {} Unknown command '{}'", "!".bright_red(), other),
        }
    }

    println!("\n  {}", "Goodbye!".bright_cyan());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo => run_demo()?,
        Commands::CacheBug => run_cache_bug()?,
        Commands::Snapshot { out } => run_snapshot(out)?,
        Commands::Interactive => run_interactive()?,
    }
    Ok(())
}
