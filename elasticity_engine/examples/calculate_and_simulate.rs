//! End-to-end walkthrough: seed a synthetic history, calculate elasticity
//! with both model variants, then project a what-if price cut.
//!
//! Run with: `cargo run --example calculate_and_simulate`

use std::sync::Arc;

use elasticity_engine::{
    ElasticityEngine, EngineConfig, GradientBoostingConfig, InMemoryCatalog, InMemoryResultStore,
    InMemorySalesHistory, ModelKind, ProductProvider, ResultStore, SalesHistoryProvider,
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

    // A year of synthetic daily sales with a known elasticity of -1.6.
    let history = Arc::new(InMemorySalesHistory::new());
    history.insert(
        "sku-espresso-1kg",
        generate_history(
            &HistorySpec::default()
                .with_days(365)
                .with_elasticity(-1.6)
                .with_seed(2024),
        ),
    );

    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.insert("sku-espresso-1kg", ProductPricing::new(100.0, 55.0));

    let store = Arc::new(InMemoryResultStore::new());

    let config = EngineConfig::default()
        .with_gradient_boosting(GradientBoostingConfig::default().with_seed(7));
    let engine = ElasticityEngine::new(
        config,
        Arc::clone(&history) as Arc<dyn SalesHistoryProvider>,
        Arc::clone(&catalog) as Arc<dyn ProductProvider>,
        Arc::clone(&store) as Arc<dyn ResultStore>,
    );

    for model in [ModelKind::Linear, ModelKind::GradientBoosting] {
        let result = engine
            .calculate_elasticity("sku-espresso-1kg", model, None)
            .await?;
        println!(
            "{}: coefficient {:.3} [{:.3}, {:.3}] ({}), optimal price {:.2}, \
             expected revenue change {:+.1}%",
            model,
            result.coefficient,
            result.confidence_interval.lower,
            result.confidence_interval.upper,
            result.elasticity_type,
            result.optimal_price,
            result.expected_revenue_change * 100.0,
        );
    }

    // Project a 10% price cut from the latest stored result.
    let latest = store
        .latest_elasticity("sku-espresso-1kg")
        .expect("just calculated");
    let scenario = engine.simulate_scenario(&latest.record, 90.0, 30).await?;

    println!(
        "10% cut over {} days: demand {:.0} -> {:.0}, revenue {:+.1}%, profit {:+.1}%, \
         {} ({:?} risk)",
        scenario.simulation_days,
        scenario.current_demand,
        scenario.predicted_demand,
        scenario.revenue_change_pct.unwrap_or(0.0) * 100.0,
        scenario.profit_change_pct.unwrap_or(0.0) * 100.0,
        scenario.recommendation.action,
        scenario.recommendation.risk_level,
    );

    Ok(())
}
