//! Serde roundtrip and JsonSchema validation tests for core records.

use chrono::Utc;
use pretty_assertions::assert_eq;
use roost_core::entities::*;
use roost_core::enums::*;
use roost_core::responses::*;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn site() -> Site {
    Site {
        site_id: "ridge-03".into(),
        latitude: 44.5,
        z_latitude: 0.25,
        first_observed_year: 2001,
        last_observed_year: 2012,
        count_of_observations: 9,
    }
}

fn summary() -> ChangeSummary {
    ChangeSummary {
        start_year: 2001,
        end_year: 2020,
        mean: Some(-32.5),
        sd: Some(8.25),
        median: Some(-31.0),
        quantiles: vec![
            QuantileValue {
                probability: 0.05,
                value: -46.5,
            },
            QuantileValue {
                probability: 0.95,
                value: -18.75,
            },
        ],
        p_decline_at_threshold: vec![ThresholdProbability {
            threshold: -30.0,
            probability: 0.5,
        }],
        category_probabilities: vec![
            CategoryProbability {
                category: DeclineCategory::Decline25To50,
                probability: 0.75,
            },
            CategoryProbability {
                category: DeclineCategory::Decline0To25,
                probability: 0.25,
            },
        ],
        median_category: Some(DeclineCategory::Decline25To50),
        extrapolated_fraction: 0.125,
        draws_total: 400,
        draws_used: 398,
        dropped: vec![DroppedDraws {
            reason: DropReason::DivisionByZero,
            count: 2,
        }],
        dropped_fraction: 0.005,
        excessive_drops: false,
    }
}

roundtrip_and_validate!(
    observation_roundtrip,
    Observation,
    Observation {
        site_id: "ridge-03".into(),
        year: 2004,
        count: 118,
        latitude: 44.5,
    }
);

roundtrip_and_validate!(site_roundtrip, Site, site());

roundtrip_and_validate!(
    standardization_roundtrip,
    Standardization,
    Standardization {
        year_mean: 2008.5,
        year_sd: 5.75,
        latitude_mean: 43.25,
        latitude_sd: 1.5,
        max_observed_count: 4200,
    }
);

roundtrip_and_validate!(
    draw_record_roundtrip,
    DrawRecord,
    DrawRecord {
        draw_index: 12,
        fixed: FixedEffects {
            intercept: 3.5,
            year_slope: -0.25,
            latitude_slope: 0.125,
            interaction: 0.0625,
        },
        random: vec![RandomEffectCoefficient {
            effect: EffectType::YearSlope,
            site_id: "ridge-03".into(),
            value: -0.5,
        }],
    }
);

roundtrip_and_validate!(
    prediction_result_roundtrip,
    PredictionResult,
    PredictionResult {
        draw_index: 1,
        site_id: "ridge-03".into(),
        year: 1990,
        expected_count: 57.25,
        overflow_clamped: false,
        extrapolation: ExtrapolationFlag::ExtrapolatedBefore,
    }
);

roundtrip_and_validate!(
    regional_total_roundtrip,
    RegionalTotal,
    RegionalTotal {
        draw_index: 1,
        year: 2020,
        total: 1234.5,
        site_count: 8,
        extrapolated_count: 1,
        excluded_count: 0,
        clamped_count: 0,
    }
);

roundtrip_and_validate!(change_summary_roundtrip, ChangeSummary, summary());

roundtrip_and_validate!(
    empty_summary_roundtrip,
    ChangeSummary,
    ChangeSummary {
        mean: None,
        sd: None,
        median: None,
        quantiles: vec![],
        p_decline_at_threshold: vec![],
        category_probabilities: vec![],
        median_category: None,
        draws_used: 0,
        dropped_fraction: 1.0,
        excessive_drops: true,
        ..summary()
    }
);

roundtrip_and_validate!(
    run_report_roundtrip,
    RunReport,
    RunReport {
        generated_at: Utc::now(),
        mode: PredictionMode::Conditional,
        extrapolation_policy: ExtrapolationPolicy::Include,
        site_count: 8,
        summary: summary(),
        clamped_predictions: 0,
        warnings: vec![],
        draws: vec![DrawChange {
            draw_index: 0,
            percent_change: -31.5,
        }],
        totals: vec![],
    }
);

roundtrip_and_validate!(
    trajectory_roundtrip,
    TrajectoryResponse,
    TrajectoryResponse {
        mode: PredictionMode::Marginal,
        draws: 100,
        sites: vec![TrajectoryPoint {
            site_id: "ridge-03".into(),
            year: 2013,
            mean: 40.5,
            q05: 30.25,
            median: 40.0,
            q95: 52.75,
            extrapolation: ExtrapolationFlag::ExtrapolatedAfter,
            clamped_draws: 0,
        }],
        regional: vec![RegionalTrajectoryPoint {
            year: 2013,
            mean: 40.5,
            q05: 30.25,
            median: 40.0,
            q95: 52.75,
            extrapolated_fraction: 1.0,
        }],
    }
);

roundtrip_and_validate!(
    sites_response_roundtrip,
    SitesResponse,
    SitesResponse {
        standardization: Standardization {
            year_mean: 2008.5,
            year_sd: 5.75,
            latitude_mean: 43.25,
            latitude_sd: 1.5,
            max_observed_count: 4200,
        },
        sites: vec![site()],
    }
);

#[test]
fn summary_lookups_find_recorded_values() {
    let s = summary();
    assert_eq!(s.quantile(0.05), Some(-46.5));
    assert_eq!(s.quantile(0.5), None);
    assert_eq!(s.p_decline(-30.0), Some(0.5));
    assert_eq!(s.dropped_total(), 2);
}

#[test]
fn posterior_draw_serializes_as_draw_record() {
    let draw = PosteriorDraw::new(
        4,
        FixedEffects {
            intercept: 1.0,
            year_slope: 0.0,
            latitude_slope: 0.0,
            interaction: 0.0,
        },
    )
    .with_site(
        "ridge-03",
        SiteDeviation {
            intercept_deviation: 0.5,
            year_slope_deviation: -0.25,
        },
    );

    let value = serde_json::to_value(&draw).unwrap();
    let schema = serde_json::to_value(schema_for!(DrawRecord)).unwrap();
    assert!(validate_against_schema(&schema, &value).is_empty());
    assert_eq!(value["random"].as_array().map(Vec::len), Some(2));
}
