//! Property-based tests for the inventory formulas and the forecast engine

use approx::assert_relative_eq;
use chrono::Datelike;
use proptest::prelude::*;
use rusty_inventory::{
    data::TimeSeriesReshaper,
    forecast::{select_best, ForecastEngine},
    inventory::{
        calculate_safety_stock, derive_features, economic_order_quantity, ZScoreTable,
    },
    types::SkuRecord,
};

fn monthly() -> impl Strategy<Value = [f64; 12]> {
    prop::array::uniform12(0.0f64..10_000.0)
}

proptest! {
    #[test]
    fn safety_stock_never_negative_and_rop_covers_lead_time(
        qty in monthly(),
        lead in 0.0f64..120.0,
        service in 0.5f64..0.999,
    ) {
        let record = SkuRecord::new("SKU-P", qty)
            .with_costs(50.0, 10.0, 0.25)
            .with_service(lead, service);
        let features = derive_features(&record);
        let result = calculate_safety_stock(&features, lead, service, &ZScoreTable::default());
        let value = result.outcome.value().unwrap();

        prop_assert!(value.safety_stock >= 0.0);
        prop_assert!(value.reorder_point >= features.avg_daily_demand * lead - 1e-9);
    }

    #[test]
    fn eoq_scales_with_square_root_of_demand(
        demand in 1.0f64..1e6,
        ordering in 0.01f64..1e4,
        holding in 0.01f64..1e3,
    ) {
        let base = economic_order_quantity(demand, ordering, holding).value().unwrap();
        let doubled = economic_order_quantity(2.0 * demand, ordering, holding).value().unwrap();
        assert_relative_eq!(doubled, base * 2f64.sqrt(), max_relative = 1e-9);
    }

    #[test]
    fn eoq_defined_only_for_positive_inputs(
        demand in -10.0f64..10.0,
        ordering in -10.0f64..10.0,
        holding in -10.0f64..10.0,
    ) {
        let defined = economic_order_quantity(demand, ordering, holding).is_defined();
        prop_assert_eq!(defined, demand > 0.0 && ordering > 0.0 && holding > 0.0);
    }

    #[test]
    fn reshape_preserves_every_quantity(qty in monthly(), year in 2000i32..2100) {
        let record = SkuRecord::new("SKU-P", qty);
        let points = TimeSeriesReshaper::new(year).unwrap().reshape_record(&record);

        prop_assert_eq!(points.len(), 12);
        let total: f64 = points.iter().filter_map(|p| p.qty_sold).sum();
        assert_relative_eq!(total, derive_features(&record).annual_demand, max_relative = 1e-12);
        for (i, point) in points.iter().enumerate() {
            prop_assert_eq!(point.date.year(), year);
            prop_assert_eq!(point.date.month() as usize, i + 1);
            prop_assert_eq!(point.date.day(), 1);
        }
    }

    #[test]
    fn forecast_has_horizon_rows_on_consecutive_months(
        qty in monthly(),
        horizon in 1usize..24,
    ) {
        let record = SkuRecord::new("SKU-P", qty);
        let points = TimeSeriesReshaper::new(2025).unwrap().reshape_record(&record);
        let result = ForecastEngine::new(horizon, 3).forecast_sku("SKU-P", &points);
        let forecast = result.forecast().unwrap();

        prop_assert_eq!(forecast.points.len(), horizon);
        prop_assert_eq!(forecast.points[0].date.year(), 2026);
        prop_assert_eq!(forecast.points[0].date.month(), 1);
        for pair in forecast.points.windows(2) {
            let (a, b) = (pair[0].date, pair[1].date);
            prop_assert_eq!(b.day(), 1);
            prop_assert_eq!((b.year() * 12 + b.month() as i32) - (a.year() * 12 + a.month() as i32), 1);
        }
    }

    #[test]
    fn chosen_model_has_lowest_rmse(qty in monthly()) {
        let record = SkuRecord::new("SKU-P", qty);
        let points = TimeSeriesReshaper::new(2025).unwrap().reshape_record(&record);
        let result = ForecastEngine::default().forecast_sku("SKU-P", &points);
        let chosen = result.chosen_model().unwrap();

        let best = result.rmse(chosen);
        prop_assert!(result.candidates.iter().all(|c| c.rmse >= best));
    }

    #[test]
    fn two_observations_always_forecast(a in 0.0f64..1e4, b in 0.0f64..1e4) {
        let mut record = SkuRecord::new("SKU-P", [0.0; 12]);
        record.monthly_qty = [None; 12];
        record.monthly_qty[0] = Some(a);
        record.monthly_qty[1] = Some(b);
        let points = TimeSeriesReshaper::new(2025).unwrap().reshape_record(&record);
        let result = ForecastEngine::default().forecast_sku("SKU-P", &points);

        prop_assert!(result.rmse(rusty_inventory::forecast::ModelKind::Sma).is_infinite());
        prop_assert!(result.forecast().is_some());
    }

    #[test]
    fn z_lookup_returns_a_table_entry(level in 0.0f64..1.0) {
        let table = ZScoreTable::default();
        let entry = table.nearest(level);
        prop_assert!(table.entries().contains(&entry));
        let distance = (entry.level - level).abs();
        prop_assert!(table.entries().iter().all(|e| (e.level - level).abs() >= distance - 1e-9));
    }

    #[test]
    fn select_best_picks_first_minimum(scores in prop::collection::vec(0.0f64..100.0, 1..8)) {
        let best = select_best(&scores).unwrap();
        prop_assert!(scores.iter().all(|&s| s >= scores[best]));
        prop_assert!(scores[..best].iter().all(|&s| s > scores[best]));
    }
}
