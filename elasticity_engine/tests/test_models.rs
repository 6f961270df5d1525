use assert_approx_eq::assert_approx_eq;
use elasticity_engine::{
    compute, ElasticityType, EngineConfig, GradientBoostingConfig, ModelKind,
};
use pricing_math::descriptive::correlation;
use retail_sales::history::{generate_history, HistorySpec};
use retail_sales::{ProductPricing, SaleRecord};

fn noisy_history(elasticity: f64, seed: u64) -> Vec<SaleRecord> {
    generate_history(
        &HistorySpec::default()
            .with_elasticity(elasticity)
            .with_noise(0.05)
            .with_seed(seed),
    )
}

fn pricing() -> ProductPricing {
    ProductPricing::new(100.0, 60.0)
}

#[test]
fn linear_coefficient_tracks_the_generating_elasticity() {
    let history = noisy_history(-1.5, 3);
    let result = compute(
        &EngineConfig::default(),
        "sku-1",
        ModelKind::Linear,
        &history,
        &pricing(),
    )
    .unwrap();

    assert_approx_eq!(result.coefficient, -1.5, 0.15);
    assert_eq!(result.elasticity_type, ElasticityType::Elastic);
    assert_eq!(result.model_kind, ModelKind::Linear);
    assert_eq!(result.sample_size, history.len());
    assert!(result.r_squared.unwrap() > 0.8);
    assert!(result.confidence_interval.contains(result.coefficient));
}

#[test]
fn coefficient_sign_matches_log_log_correlation() {
    // Downward-sloping, nearly flat, and upward-sloping synthetic demand.
    for (elasticity, seed) in [(-1.8, 5), (-0.4, 6), (0.7, 7)] {
        let history = noisy_history(elasticity, seed);
        let result = compute(
            &EngineConfig::default(),
            "sku-1",
            ModelKind::Linear,
            &history,
            &pricing(),
        )
        .unwrap();

        let log_prices: Vec<f64> = history.iter().map(|r| r.price.ln()).collect();
        let log_quantities: Vec<f64> = history.iter().map(|r| r.quantity.ln()).collect();
        let corr = correlation(&log_prices, &log_quantities).unwrap();

        assert_eq!(
            result.coefficient.is_sign_negative(),
            corr.is_sign_negative(),
            "sign mismatch for generating elasticity {}",
            elasticity
        );
    }
}

#[test]
fn linear_path_is_bit_for_bit_reproducible() {
    let history = noisy_history(-1.5, 9);
    let config = EngineConfig::default();

    let a = compute(&config, "sku-1", ModelKind::Linear, &history, &pricing()).unwrap();
    let b = compute(&config, "sku-1", ModelKind::Linear, &history, &pricing()).unwrap();

    assert_eq!(a.coefficient.to_bits(), b.coefficient.to_bits());
    assert_eq!(
        a.r_squared.unwrap().to_bits(),
        b.r_squared.unwrap().to_bits()
    );
    assert_eq!(
        a.confidence_interval.lower.to_bits(),
        b.confidence_interval.lower.to_bits()
    );
    assert_eq!(
        a.confidence_interval.upper.to_bits(),
        b.confidence_interval.upper.to_bits()
    );
}

#[test]
fn gradient_boosting_sees_downward_sloping_demand() {
    let history = generate_history(
        &HistorySpec::default()
            .with_days(240)
            .with_elasticity(-2.5)
            .with_noise(0.02)
            .with_seed(11),
    );
    let config = EngineConfig::default().with_gradient_boosting(
        GradientBoostingConfig::default()
            .with_bootstrap_iterations(25)
            .with_seed(42),
    );

    let result = compute(
        &config,
        "sku-1",
        ModelKind::GradientBoosting,
        &history,
        &pricing(),
    )
    .unwrap();

    assert!(result.coefficient < 0.0);
    assert_eq!(result.model_kind, ModelKind::GradientBoosting);
    assert!(result.r_squared.unwrap() > 0.5);
    assert!(result.confidence_interval.lower <= result.confidence_interval.upper);
}

#[test]
fn seeded_gradient_boosting_is_exactly_reproducible() {
    let history = noisy_history(-1.8, 13);
    let config = EngineConfig::default().with_gradient_boosting(
        GradientBoostingConfig::default()
            .with_bootstrap_iterations(25)
            .with_seed(7),
    );

    let a = compute(
        &config,
        "sku-1",
        ModelKind::GradientBoosting,
        &history,
        &pricing(),
    )
    .unwrap();
    let b = compute(
        &config,
        "sku-1",
        ModelKind::GradientBoosting,
        &history,
        &pricing(),
    )
    .unwrap();

    assert_eq!(a.coefficient.to_bits(), b.coefficient.to_bits());
    assert_eq!(
        a.confidence_interval.lower.to_bits(),
        b.confidence_interval.lower.to_bits()
    );
    assert_eq!(
        a.confidence_interval.upper.to_bits(),
        b.confidence_interval.upper.to_bits()
    );
}

#[test]
fn three_records_fail_with_insufficient_data() {
    let history: Vec<SaleRecord> = noisy_history(-1.5, 3).into_iter().take(3).collect();

    let err = compute(
        &EngineConfig::default(),
        "sku-1",
        ModelKind::Linear,
        &history,
        &pricing(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), "insufficient_data");
    assert_eq!(
        err,
        elasticity_engine::ElasticityError::InsufficientData { got: 3, need: 10 }
    );
}

#[test]
fn constant_price_history_never_returns_a_coefficient() {
    use chrono::NaiveDate;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let history: Vec<SaleRecord> = (0..30)
        .map(|i| SaleRecord::new(start + chrono::Duration::days(i), 25.0, 100.0 + i as f64))
        .collect();

    let err = compute(
        &EngineConfig::default(),
        "sku-1",
        ModelKind::Linear,
        &history,
        &pricing(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), "insufficient_data");
}

#[test]
fn results_serialize_with_snake_case_tags() {
    let history = noisy_history(-1.5, 3);
    let result = compute(
        &EngineConfig::default(),
        "sku-1",
        ModelKind::Linear,
        &history,
        &pricing(),
    )
    .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"model_kind\":\"linear\""));
    assert!(json.contains("\"elasticity_type\":\"elastic\""));
    assert!(json.contains("\"recommended_action\":\"decrease_price\""));

    let back: elasticity_engine::ElasticityResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}
