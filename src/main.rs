//! Carbon Trace CLI
//!
//! `carbon_trace phases <text>`                 canonical form of a phase list
//! `carbon_trace summary <record.json> [token]` per-node totals and diffs
//! `carbon_trace links <record.json>`           flattened footprint links

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use carbon_trace::model::format_diff;
use carbon_trace::{
    collect_links, telemetry, BufferedWarnings, CarbonTree, CarbonTreeBuilder, CarbonTreeRecord,
    LifeCyclePhases, TraceConfig,
};

const USAGE: &str = "usage: carbon_trace <phases <text> | summary <record.json> [token] | links <record.json>>";

#[tokio::main]
async fn main() -> Result<()> {
    let config = TraceConfig::from_env();
    telemetry::init_logging(&config.log_filter);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("phases") => {
            let text = args[1..].join(" ");
            print_phases(&text);
        }
        Some("summary") => {
            let path = args.get(1).context(USAGE)?;
            let warnings = Arc::new(BufferedWarnings::new(config.dedupe_warnings));
            let tree = load_tree(path, args.get(2).map(String::as_str), &config, warnings.clone()).await?;
            print_summary(&tree);
            for warning in warnings.drain() {
                println!("warning: {}", warning);
            }
        }
        Some("links") => {
            let path = args.get(1).context(USAGE)?;
            let warnings = Arc::new(BufferedWarnings::new(config.dedupe_warnings));
            let tree = load_tree(path, None, &config, warnings).await?;
            for link in collect_links(&tree)? {
                println!(
                    "{} <- {} [{:?}] {:.3} kg ({})",
                    link.source, link.target, link.kind, link.value, link.product_life_cycle_phases
                );
            }
        }
        _ => bail!(USAGE),
    }
    Ok(())
}

async fn load_tree(
    path: impl AsRef<Path>,
    token: Option<&str>,
    config: &TraceConfig,
    warnings: Arc<BufferedWarnings>,
) -> Result<CarbonTree> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let record = CarbonTreeRecord::from_json(&json)?;
    let changes = token
        .filter(|t| !t.is_empty())
        .map(CarbonTree::parse_changes)
        .transpose()
        .context("Discarding simulation, token cannot be read")?;

    let mut builder = CarbonTreeBuilder::new(record)
        .with_warnings(warnings)
        .with_event_capacity(config.event_capacity);
    if let Some(changes) = &changes {
        builder = builder.with_changes(changes);
    }
    let tree = builder.build();
    info!(asset = %tree.asset().id, simulated = changes.is_some(), "Loaded carbon tree");
    Ok(tree)
}

fn print_phases(text: &str) {
    let phases = LifeCyclePhases::parse(text);
    let stages: Vec<&str> = phases.stages().iter().map(|s| s.code()).collect();
    let [r, g, b] = phases.color();
    println!("phases: {}", phases.to_display_string(false, true));
    println!("stages: {}", stages.join(", "));
    println!("color:  rgb({:.0}, {:.0}, {:.0})", r, g, b);
}

fn print_summary(tree: &CarbonTree) {
    tree.for_each(|node, _, depth, bulk| {
        println!(
            "{}{} x{} total {:.3} kg ({}) product {:.3} ({}) transport {:.3} ({}) phases {}",
            "  ".repeat(depth),
            node.name(),
            bulk,
            node.total_co2eq(),
            format_diff(node.total_co2eq_diff(), 3),
            node.product_co2eq(),
            format_diff(node.product_co2eq_diff(), 3),
            node.transport_co2eq(),
            format_diff(node.transport_co2eq_diff(), 3),
            node.covered_life_cycle_phases().to_display_string(false, false),
        );
        for (id, status) in node.connection_status() {
            if !status.is_original() {
                println!("{}  - {} {}", "  ".repeat(depth), id, status);
            }
        }
        true
    });
    println!(
        "components: {} direct, {} total ({})",
        tree.direct_components_count(),
        tree.all_components_count(),
        format_diff(tree.all_components_count_diff(), 0)
    );
}
