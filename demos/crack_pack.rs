//! Open a booster pack from the command line.
//!
//! Run with:
//!   cargo run --example crack_pack -- --set tst
//!   cargo run --example crack_pack -- --set tsr --seed 1234
//!   cargo run --example crack_pack -- --set tst --explore
//!   cargo run --example crack_pack -- --list
//!
//! Defaults read `demos/data/sample_catalog.json`; point `--catalog` (or
//! `catalog_path` in a `--config` TOML file) at an MTGJSON `AllPrintings.json`
//! to open real products. `RUST_LOG=booster_gen=debug` or `-v` shows each
//! variant choice and slot draw.

use std::path::PathBuf;

use booster_gen::{
    distribution_response, pack_response, CardId, CardLookup, Catalog, EngineConfig,
    GeneratedPack, NoPrices, PackGenerator, PackRequest, PriceLookup, PriceTable,
    ProbabilityTable, ProductId,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SAMPLE_CATALOG: &str = "demos/data/sample_catalog.json";

#[derive(Parser, Debug)]
#[command(name = "crack_pack", about = "Open simulated booster packs")]
struct Cli {
    /// Engine settings (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Booster catalog JSON; overrides `catalog_path` from the config.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Price table JSON: `{ "<uuid>": { "normal": "0.25", "foil": "1.10" } }`.
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Set code, case-insensitive.
    #[arg(long, short)]
    set: Option<String>,

    /// Product type; defaults to `default_product` from the config.
    #[arg(long, short)]
    product: Option<String>,

    /// Replay a previous pack.
    #[arg(long)]
    seed: Option<u64>,

    /// List sets and their products, then exit.
    #[arg(long)]
    list: bool,

    /// Show per-card pull rates instead of opening a pack.
    #[arg(long)]
    explore: bool,

    /// Print the JSON response body instead of a table.
    #[arg(long)]
    json: bool,

    #[arg(long, short)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let default = if verbose { "booster_gen=debug,info" } else { "booster_gen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn print_pack(pack: &GeneratedPack) {
    let share = f64::from(pack.variant_weight) / pack.total_weight as f64;
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  {}  variant {} ({}/{} = {:.1}%)  seed {}",
        pack.product,
        pack.variant_index,
        pack.variant_weight,
        pack.total_weight,
        share * 100.0,
        pack.seed
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for slot in &pack.slots {
        let card = &slot.card;
        let mut tags: Vec<String> = card.treatments.iter().map(|t| t.to_string()).collect();
        if card.finish.is_foil() {
            tags.insert(0, "foil".to_owned());
        }
        let tags = if tags.is_empty() { String::new() } else { format!(" [{}]", tags.join(", ")) };
        let price = card.price.map(|p| p.to_string()).unwrap_or_else(|| "-".to_owned());

        println!(
            "  {:<14} {:<28} {:<9} {:>10}{}",
            slot.sheet_name, card.name, card.rarity.to_string(), price, tags
        );
        if let Some(url) = &card.purchase_url {
            println!("  {:<14} {}", "", url);
        }
    }
}

fn card_name(catalog: &Catalog, card_id: &CardId) -> String {
    catalog.resolve(card_id).map(|r| r.name).unwrap_or_else(|| card_id.to_string())
}

fn print_table(table: &ProbabilityTable, catalog: &Catalog) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  {}  total weight {}", table.product, table.total_weight);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for v in &table.variants {
        let contents: Vec<String> = v
            .contents
            .iter()
            .map(|slot| match &slot.source_set {
                Some(set) => format!("{}×{}:{}", slot.card_count, set, slot.sheet_name),
                None      => format!("{}×{}", slot.card_count, slot.sheet_name),
            })
            .collect();
        println!("  variant {:<3} {:>6.2}%  {}", v.variant_index, v.fraction * 100.0, contents.join(", "));
    }
    println!();

    for s in &table.sheets {
        println!(
            "  sheet {}:{:<14} {:>4} cards  weight {:<6} {}",
            s.set_code,
            s.name,
            s.card_count,
            s.total_weight,
            if s.foil { "foil" } else { "" },
        );
        for c in &s.cards {
            let rates: Vec<String> = c
                .inclusion
                .iter()
                .map(|(drawn, p)| format!("{drawn} drawn: {:.2}%", p * 100.0))
                .collect();
            println!("      {:>6}  {:<28} {}", c.weight, card_name(catalog, &c.card_id), rates.join(", "));
        }
    }
    println!();

    let mut cards: Vec<_> = table.cards.iter().collect();
    cards.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    for c in cards {
        println!("  {:>8.3}%  {}", c.probability * 100.0, card_name(catalog, &c.card_id));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let settings = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None       => EngineConfig::default(),
    };
    let catalog_path = cli
        .catalog
        .clone()
        .or_else(|| settings.catalog_path.clone())
        .unwrap_or_else(|| PathBuf::from(SAMPLE_CATALOG));
    let catalog = Catalog::load(&catalog_path)?;

    let price_table = match &cli.prices {
        Some(path) => Some(PriceTable::from_json(&std::fs::read_to_string(path)?)?),
        None       => None,
    };
    let prices: &dyn PriceLookup = match &price_table {
        Some(table) => table,
        None        => &NoPrices,
    };

    let generator = PackGenerator::new(&catalog, &catalog, prices).with_settings(&settings);

    if cli.list {
        for (code, name) in generator.list_sets() {
            let products = generator.list_products(&code)?;
            println!("  {:<6} {:<32} {}", code, name, products.join(", "));
        }
        return Ok(());
    }

    let set = cli.set.as_deref().ok_or("--set is required unless --list is given")?;
    let product = cli.product.as_deref().unwrap_or(&settings.default_product);

    if cli.explore {
        let table = generator.compute_distribution(&ProductId::new(set, product))?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&distribution_response(&table))?);
        } else {
            print_table(&table, &catalog);
        }
        return Ok(());
    }

    let mut request = PackRequest::new(set, product);
    if let Some(seed) = cli.seed {
        request = request.with_seed(seed);
    }
    let pack = generator.generate_pack(request)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&pack_response(&pack))?);
    } else {
        print_pack(&pack);
    }
    Ok(())
}
