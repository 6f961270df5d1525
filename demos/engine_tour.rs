//! Tour of the workspace: bulk elasticity calculation over a small catalog
//! followed by scenario comparisons for the most elastic product.
//!
//! Run with: `cargo run --example engine_tour`

use std::sync::Arc;

use elasticity_engine::{
    ElasticityEngine, EngineConfig, InMemoryCatalog, InMemoryResultStore, InMemorySalesHistory,
    ModelKind, ProductProvider, ResultStore, SalesHistoryProvider,
};
use retail_sales::history::{generate_history, HistorySpec};
use retail_sales::ProductPricing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let history = Arc::new(InMemorySalesHistory::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let store = Arc::new(InMemoryResultStore::new());

    let products: &[(&str, f64, f64, f64)] = &[
        ("sku-coffee", -1.6, 100.0, 55.0),
        ("sku-detergent", -0.5, 12.0, 7.5),
        ("sku-headphones", -2.4, 250.0, 140.0),
    ];
    for (i, (product_id, elasticity, price, cost)) in products.iter().enumerate() {
        history.insert(
            *product_id,
            generate_history(
                &HistorySpec {
                    base_price: *price,
                    base_quantity: 400.0,
                    ..HistorySpec::default()
                }
                .with_days(365)
                .with_elasticity(*elasticity)
                .with_seed(100 + i as u64),
            ),
        );
        catalog.insert(*product_id, ProductPricing::new(*price, *cost));
    }

    let engine = ElasticityEngine::new(
        EngineConfig::default(),
        Arc::clone(&history) as Arc<dyn SalesHistoryProvider>,
        Arc::clone(&catalog) as Arc<dyn ProductProvider>,
        Arc::clone(&store) as Arc<dyn ResultStore>,
    );

    let product_ids: Vec<String> = products.iter().map(|p| p.0.to_string()).collect();
    let outcome = engine.calculate_bulk(&product_ids, ModelKind::Linear).await;
    println!(
        "bulk run: {} calculated, {} failed",
        outcome.total_calculated, outcome.total_errors
    );

    let mut most_elastic = None;
    for product_id in &product_ids {
        if let Some(latest) = store.latest_elasticity(product_id) {
            println!(
                "  {}: {:.2} ({}), optimal price {:.2}",
                product_id,
                latest.record.coefficient,
                latest.record.elasticity_type,
                latest.record.optimal_price,
            );
            let is_steeper = most_elastic
                .as_ref()
                .map_or(true, |best: &elasticity_engine::ElasticityResult| {
                    latest.record.coefficient < best.coefficient
                });
            if is_steeper {
                most_elastic = Some(latest.record);
            }
        }
    }

    let target = most_elastic.expect("bulk run produced results");
    println!("scenario sweep for {}:", target.product_id);
    let current_price = catalog.pricing(&target.product_id)?.current_price;
    for change in [-0.15, -0.05, 0.05, 0.15] {
        let scenario = engine
            .simulate_scenario(&target, current_price * (1.0 + change), 30)
            .await?;
        println!(
            "  {:+.0}%: revenue {:+.1}%, profit {:+.1}%, {} ({:?} risk)",
            change * 100.0,
            scenario.revenue_change_pct.unwrap_or(0.0) * 100.0,
            scenario.profit_change_pct.unwrap_or(0.0) * 100.0,
            scenario.recommendation.action,
            scenario.recommendation.risk_level,
        );
    }

    Ok(())
}
