//! End-to-end scenarios over small synthetic registries and draw tables.

use pretty_assertions::assert_eq;
use roost_core::entities::{FixedEffects, Observation, PosteriorDraw, PredictionResult, SiteDeviation};
use roost_core::enums::{DropReason, ExtrapolationFlag, ExtrapolationPolicy, PredictionMode};
use roost_engine::aggregate::{SUMMATION_TOLERANCE, aggregate_draw};
use roost_engine::{
    CancellationToken, ChangeRequest, Link, Pipeline, Predictor, SiteRegistry, SummaryOptions,
};
use rstest::rstest;

const SITES: [(&str, f64); 3] = [("north", 46.0), ("middle", 43.5), ("south", 41.0)];

fn twenty_year_registry() -> SiteRegistry {
    let observations: Vec<Observation> = SITES
        .iter()
        .flat_map(|&(site, latitude)| {
            (2000..2020).map(move |year| Observation {
                site_id: site.into(),
                year,
                count: 40,
                latitude,
            })
        })
        .collect();
    SiteRegistry::from_observations(&observations).unwrap()
}

fn fixed(intercept: f64, year_slope: f64) -> FixedEffects {
    FixedEffects {
        intercept,
        year_slope,
        latitude_slope: 0.0,
        interaction: 0.0,
    }
}

/// A draw whose expected counts grow at `rate` per year at every site.
fn growth_draw(registry: &SiteRegistry, draw_index: usize, rate: f64) -> PosteriorDraw {
    let year_sd = registry.standardization().year_sd;
    let offsets = [0.3, -0.2, 0.1];
    SITES.iter().zip(offsets).fold(
        PosteriorDraw::new(draw_index, fixed(3.0, rate * year_sd)),
        |draw, (&(site, _), offset)| {
            draw.with_site(
                site,
                SiteDeviation {
                    intercept_deviation: offset,
                    year_slope_deviation: 0.0,
                },
            )
        },
    )
}

fn request(start_year: i32, end_year: i32, mode: PredictionMode) -> ChangeRequest {
    ChangeRequest {
        start_year,
        end_year,
        site_ids: None,
        mode,
        policy: ExtrapolationPolicy::Include,
        summary: SummaryOptions::default(),
        link: Link::with_ceiling(1.0e9).unwrap(),
    }
}

#[rstest]
#[case(-0.05)]
#[case(0.0)]
#[case(0.02)]
fn synthetic_growth_is_recovered(#[case] rate: f64) {
    let registry = twenty_year_registry();
    let draws: Vec<PosteriorDraw> = (0..5).map(|i| growth_draw(&registry, i, rate)).collect();
    let report = Pipeline::new(&registry, &draws)
        .unwrap()
        .run_change(
            &request(2000, 2019, PredictionMode::Conditional),
            &CancellationToken::new(),
            None,
        )
        .unwrap();

    let expected = 100.0 * ((rate * 19.0).exp() - 1.0);
    assert_eq!(report.draws.len(), 5);
    for change in &report.draws {
        assert!(
            (change.percent_change - expected).abs() <= 1e-9 * expected.abs().max(1.0),
            "draw {} gave {} for rate {rate}, expected {expected}",
            change.draw_index,
            change.percent_change
        );
    }
    assert!((report.summary.median.unwrap() - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    assert!(report.summary.extrapolated_fraction.abs() < f64::EPSILON);
}

#[test]
fn degenerate_draw_is_dropped_and_counted() {
    let registry = twenty_year_registry();
    let mut draws: Vec<PosteriorDraw> = (0..4).map(|i| growth_draw(&registry, i, -0.03)).collect();
    // exp(-1000) underflows to exactly zero at every site
    draws.push(
        SITES
            .iter()
            .fold(PosteriorDraw::new(4, fixed(-1000.0, 0.0)), |draw, &(site, _)| {
                draw.with_site(site, SiteDeviation::ZERO)
            }),
    );

    let report = Pipeline::new(&registry, &draws)
        .unwrap()
        .run_change(
            &request(2000, 2019, PredictionMode::Conditional),
            &CancellationToken::new(),
            None,
        )
        .unwrap();

    assert_eq!(report.summary.draws_total, 5);
    assert_eq!(report.summary.draws_used, 4);
    assert_eq!(report.summary.dropped.len(), 1);
    assert_eq!(report.summary.dropped[0].reason, DropReason::DivisionByZero);
    assert_eq!(report.summary.dropped[0].count, 1);
    assert!(report.draws.iter().all(|d| d.draw_index != 4));

    let expected = 100.0 * ((-0.03_f64 * 19.0).exp() - 1.0);
    let q05 = report.summary.quantile(0.05).unwrap();
    assert!((q05 - expected).abs() < 1e-9);
    assert!(report.summary.excessive_drops);
    assert!(report.warnings.iter().any(|w| w.contains("draws dropped")));
}

#[test]
fn zero_random_effects_make_modes_agree() {
    let registry = twenty_year_registry();
    let draws: Vec<PosteriorDraw> = (0..6)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let slope = -0.4 + 0.1 * i as f64;
            SITES.iter().fold(
                PosteriorDraw::new(
                    i,
                    FixedEffects {
                        intercept: 2.5,
                        year_slope: slope,
                        latitude_slope: 0.3,
                        interaction: -0.1,
                    },
                ),
                |draw, &(site, _)| draw.with_site(site, SiteDeviation::ZERO),
            )
        })
        .collect();
    let pipeline = Pipeline::new(&registry, &draws).unwrap();
    let cancel = CancellationToken::new();

    let conditional = pipeline
        .run_change(&request(2003, 2017, PredictionMode::Conditional), &cancel, None)
        .unwrap();
    let marginal = pipeline
        .run_change(&request(2003, 2017, PredictionMode::Marginal), &cancel, None)
        .unwrap();

    for (c, m) in conditional.draws.iter().zip(&marginal.draws) {
        assert_eq!(c.draw_index, m.draw_index);
        assert!((c.percent_change - m.percent_change).abs() < 1e-9);
    }
}

#[test]
fn missing_random_effect_aborts_conditional_run() {
    let registry = twenty_year_registry();
    let draws = vec![PosteriorDraw::new(0, fixed(1.0, 0.0)).with_site("north", SiteDeviation::ZERO)];
    let err = Pipeline::new(&registry, &draws)
        .unwrap()
        .run_change(
            &request(2000, 2019, PredictionMode::Conditional),
            &CancellationToken::new(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, roost_engine::EngineError::MissingRandomEffect { .. }));
}

#[test]
fn aggregation_is_order_independent() {
    let registry = twenty_year_registry();
    let draw = PosteriorDraw::new(0, fixed(0.0, 0.0));
    let predictor = Predictor::new(&registry, Link::with_ceiling(1.0e12).unwrap());
    let mut predictions: Vec<PredictionResult> = (0..200)
        .map(|i| {
            let mut p = predictor
                .predict_site(&draw, registry.site("north").unwrap(), 2010, false)
                .unwrap();
            p.site_id = format!("site-{i:03}");
            p.expected_count = 10.0_f64.powi(i % 9) * (1.0 + f64::from(i) / 7.0);
            p
        })
        .collect();

    let forward = aggregate_draw(0, 2010, &predictions, ExtrapolationPolicy::Include).unwrap();
    predictions.reverse();
    let backward = aggregate_draw(0, 2010, &predictions, ExtrapolationPolicy::Include).unwrap();
    predictions.sort_by(|a, b| a.expected_count.total_cmp(&b.expected_count));
    let ascending = aggregate_draw(0, 2010, &predictions, ExtrapolationPolicy::Include).unwrap();

    for other in [&backward, &ascending] {
        let relative = (forward.total - other.total).abs() / forward.total;
        assert!(relative <= SUMMATION_TOLERANCE, "relative error {relative}");
    }
}

#[test]
fn site_observed_2000_to_2010_is_flagged_for_1990() {
    let observations: Vec<Observation> = [2000, 2005, 2010]
        .iter()
        .map(|&year| Observation {
            site_id: "ridge".into(),
            year,
            count: 12,
            latitude: 44.0,
        })
        .collect();
    let registry = SiteRegistry::from_observations(&observations).unwrap();
    let predictor = Predictor::new(&registry, Link::with_ceiling(1.0e4).unwrap());
    let draw = PosteriorDraw::new(0, fixed(1.0, 0.0));
    let site = registry.site("ridge").unwrap();

    let before = predictor.predict_site(&draw, site, 1990, false).unwrap();
    assert_eq!(before.extrapolation, ExtrapolationFlag::ExtrapolatedBefore);
    let inside = predictor.predict_site(&draw, site, 2010, false).unwrap();
    assert_eq!(inside.extrapolation, ExtrapolationFlag::WithinRange);
}

#[test]
fn exclude_policy_leaves_out_sites_outside_their_window() {
    let observations: Vec<Observation> = [("early", 1990), ("early", 2000), ("late", 2005), ("late", 2015)]
        .iter()
        .map(|&(site, year)| Observation {
            site_id: site.into(),
            year,
            count: 8,
            latitude: 40.0,
        })
        .collect();
    let registry = SiteRegistry::from_observations(&observations).unwrap();
    let draws = vec![PosteriorDraw::new(0, fixed(1.0, 0.0))];
    let pipeline = Pipeline::new(&registry, &draws).unwrap();
    let cancel = CancellationToken::new();

    let mut req = request(1995, 2010, PredictionMode::Marginal);
    let included = pipeline.run_change(&req, &cancel, None).unwrap();
    req.policy = ExtrapolationPolicy::Exclude;
    let excluded = pipeline.run_change(&req, &cancel, None).unwrap();

    // each year has one site inside and one outside its window
    assert!((included.summary.extrapolated_fraction - 0.5).abs() < f64::EPSILON);
    assert!((included.totals[0].total - 2.0 * 1.0_f64.exp()).abs() < 1e-12);
    assert!((excluded.totals[0].total - 1.0_f64.exp()).abs() < 1e-12);
    assert_eq!(excluded.totals[0].excluded_count, 1);
    assert!(included.warnings.iter().any(|w| w.contains("outside")));
}

#[test]
fn overflow_is_clamped_and_reported() {
    let registry = twenty_year_registry();
    let draws: Vec<PosteriorDraw> = vec![PosteriorDraw::new(0, fixed(50.0, 0.0))];
    let link = Link::from_observed_max(registry.standardization().max_observed_count, 10.0).unwrap();
    let mut req = request(2000, 2019, PredictionMode::Marginal);
    req.link = link;
    let report = Pipeline::new(&registry, &draws)
        .unwrap()
        .run_change(&req, &CancellationToken::new(), None)
        .unwrap();

    assert_eq!(report.clamped_predictions, 6);
    assert!((report.totals[0].total - 3.0 * 400.0).abs() < 1e-9);
    assert!(report.summary.median.unwrap().abs() < f64::EPSILON);
}
