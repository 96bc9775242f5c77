//! Trail wetness model.
//!
//! Pure functions turning a lookback window of daily precipitation and
//! evapotranspiration records into a moisture score and a discrete trail
//! condition. No I/O: same input, same output.
//!
//! Per day, net moisture is rain plus snowmelt equivalent, scaled up for
//! concentrated precipitation events, minus an ET0 drying term whose effect
//! is reduced in winter. Each day's net contribution then decays the further
//! in the past it is, so yesterday's storm matters more than one five days
//! prior.

use trailwake_core::WetnessParams;

use crate::types::{TrailCondition, WetnessInputs, WetnessInterpretation};

/// Compute the wetness interpretation for a window of daily records.
///
/// Records are sorted and deduplicated by date before scoring, so the result
/// is independent of input order. An empty window classifies as dry.
pub fn compute_wetness(inputs: &WetnessInputs, params: &WetnessParams) -> WetnessInterpretation {
    if inputs.records.is_empty() {
        return WetnessInterpretation::dry();
    }

    let mut records = inputs.records.clone();
    records.sort_by_key(|r| r.date);
    records.dedup_by_key(|r| r.date);

    // Sorted, so the last record anchors "today" for the decay weights.
    let latest = match records.last() {
        Some(record) => record.date,
        None => return WetnessInterpretation::dry(),
    };

    let mut weighted_sum = 0.0;
    let mut wet_days = 0u32;

    for record in &records {
        let raw = record.raw_precip_mm();
        if raw > params.wet_day_threshold_mm {
            wet_days += 1;
        }

        let moisture = record.rain_mm + record.snow_mm * params.snow_melt_factor;
        let net = (moisture * intensity_boost(record.precip_hours, raw, params)
            - record.et0_mm * seasonal_factor(record.date, params))
        .max(0.0);

        let days_ago = (latest - record.date).num_days().max(0) as i32;
        weighted_sum += net * params.decay_base.powi(days_ago);
    }

    let avg_precip = weighted_sum / records.len() as f64;
    let is_wet = wet_days > 0;

    WetnessInterpretation {
        is_wet,
        wet_days,
        avg_precip,
        label: classify(is_wet, wet_days, avg_precip),
    }
}

/// Map an interpretation (possibly absent) to a trail condition.
///
/// No data, or an interpretation that already says "not wet", always
/// classifies as dry.
pub fn interpret(wetness: Option<&WetnessInterpretation>) -> TrailCondition {
    match wetness {
        None => TrailCondition::Dry,
        Some(w) if !w.is_wet => TrailCondition::Dry,
        Some(w) => classify(w.is_wet, w.wet_days, w.avg_precip),
    }
}

/// Classification boundaries. `avg_precip` uses strict `>`, so exactly 0.5
/// does not qualify as Wet.
fn classify(is_wet: bool, wet_days: u32, avg_precip: f64) -> TrailCondition {
    if wet_days >= 4 {
        TrailCondition::VeryWet
    } else if wet_days >= 2 || avg_precip > 0.5 {
        TrailCondition::Wet
    } else if is_wet {
        TrailCondition::SlightlyWet
    } else {
        TrailCondition::Dry
    }
}

/// Multiplier weighting concentrated precipitation more heavily than slow
/// drizzle of equal total volume. Neutral (1.0) when the event duration is
/// unreported or there was no precipitation.
fn intensity_boost(precip_hours: f64, raw_mm: f64, params: &WetnessParams) -> f64 {
    if precip_hours <= 0.0 || raw_mm <= 0.0 {
        return 1.0;
    }
    let rate = raw_mm / precip_hours;
    (rate / params.intensity_ref_mm_per_hour).clamp(1.0, params.intensity_max_boost)
}

/// ET0 drying multiplier: reduced in winter months, modeling dormant
/// vegetation and lower solar drying.
fn seasonal_factor(date: chrono::NaiveDate, params: &WetnessParams) -> f64 {
    if params.winter_months.contains(&chrono::Datelike::month(&date)) {
        params.winter_et_factor
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DailyRecord;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rain_record(date: NaiveDate, rain_mm: f64) -> DailyRecord {
        DailyRecord {
            rain_mm,
            ..DailyRecord::new(date)
        }
    }

    /// Five July days ending on the 5th, rain on the given (day, mm) pairs.
    fn window(rain: &[(u32, f64)]) -> WetnessInputs {
        let records = (1..=5)
            .map(|d| {
                let mm = rain
                    .iter()
                    .find(|(rd, _)| *rd == d)
                    .map(|(_, mm)| *mm)
                    .unwrap_or(0.0);
                rain_record(day(2026, 7, d), mm)
            })
            .collect();
        WetnessInputs {
            records,
            lookback_days: 5,
        }
    }

    #[test]
    fn test_empty_window_is_dry() {
        let result = compute_wetness(&WetnessInputs::empty(5), &WetnessParams::default());
        assert_eq!(result, WetnessInterpretation::dry());
    }

    #[test]
    fn test_interpret_absent_or_not_wet_is_dry() {
        assert_eq!(interpret(None), TrailCondition::Dry);

        let not_wet = WetnessInterpretation {
            is_wet: false,
            wet_days: 0,
            avg_precip: 0.0,
            label: TrailCondition::Dry,
        };
        assert_eq!(interpret(Some(&not_wet)), TrailCondition::Dry);
    }

    #[test]
    fn test_classification_boundaries() {
        // Strict > on avg_precip: exactly 0.5 stays Slightly Wet.
        assert_eq!(classify(true, 1, 0.5), TrailCondition::SlightlyWet);
        assert_eq!(classify(true, 1, 0.51), TrailCondition::Wet);
        assert_eq!(classify(true, 2, 0.1), TrailCondition::Wet);
        assert_eq!(classify(true, 4, 0.1), TrailCondition::VeryWet);
        assert_eq!(classify(false, 0, 0.0), TrailCondition::Dry);
    }

    #[test]
    fn test_two_rain_days_classify_wet() {
        let inputs = window(&[(2, 1.2), (4, 0.3)]);
        let result = compute_wetness(&inputs, &WetnessParams::default());

        assert_eq!(result.wet_days, 2);
        assert!(result.is_wet);
        assert_eq!(result.label, TrailCondition::Wet);
    }

    #[test]
    fn test_result_is_independent_of_record_order() {
        let params = WetnessParams::default();
        let inputs = window(&[(2, 1.2), (4, 0.3)]);

        let mut reversed = inputs.clone();
        reversed.records.reverse();

        assert_eq!(
            compute_wetness(&inputs, &params),
            compute_wetness(&reversed, &params)
        );
    }

    #[test]
    fn test_deterministic() {
        let params = WetnessParams::default();
        let inputs = window(&[(1, 3.0), (3, 0.8)]);
        assert_eq!(
            compute_wetness(&inputs, &params),
            compute_wetness(&inputs, &params)
        );
    }

    #[test]
    fn test_duplicate_dates_are_collapsed() {
        let params = WetnessParams::default();
        let mut inputs = window(&[(3, 2.0)]);
        let dup = inputs.records[2].clone();
        inputs.records.push(dup);

        let deduped = compute_wetness(&inputs, &params);
        assert_eq!(deduped.wet_days, 1);
    }

    #[test]
    fn test_recent_rain_outweighs_old_rain() {
        let params = WetnessParams::default();
        let recent = compute_wetness(&window(&[(5, 10.0)]), &params);
        let old = compute_wetness(&window(&[(1, 10.0)]), &params);
        assert!(recent.avg_precip > old.avg_precip);
        assert!(old.avg_precip > 0.0);
    }

    #[test]
    fn test_concentrated_rain_scores_higher_than_drizzle() {
        let params = WetnessParams::default();

        let mut burst = window(&[(5, 12.0)]);
        burst.records[4].precip_hours = 2.0;

        let mut drizzle = window(&[(5, 12.0)]);
        drizzle.records[4].precip_hours = 12.0;

        let burst_score = compute_wetness(&burst, &params).avg_precip;
        let drizzle_score = compute_wetness(&drizzle, &params).avg_precip;
        assert!(burst_score > drizzle_score);
    }

    #[test]
    fn test_unreported_duration_gets_neutral_boost() {
        let params = WetnessParams::default();
        let plain = window(&[(5, 12.0)]);

        let mut slow = plain.clone();
        slow.records[4].precip_hours = 24.0;

        // Slow drizzle clamps to the neutral multiplier, same as unreported.
        assert_eq!(
            compute_wetness(&plain, &params).avg_precip,
            compute_wetness(&slow, &params).avg_precip
        );
    }

    #[test]
    fn test_et0_dries_less_in_winter() {
        let params = WetnessParams::default();

        let make = |month: u32| {
            let records = (1..=3)
                .map(|d| DailyRecord {
                    rain_mm: 2.0,
                    et0_mm: 1.5,
                    ..DailyRecord::new(day(2026, month, d))
                })
                .collect();
            WetnessInputs {
                records,
                lookback_days: 3,
            }
        };

        let january = compute_wetness(&make(1), &params).avg_precip;
        let july = compute_wetness(&make(7), &params).avg_precip;
        assert!(january > july);
    }

    #[test]
    fn test_drying_never_goes_negative() {
        let params = WetnessParams::default();
        let records = vec![DailyRecord {
            rain_mm: 0.1,
            et0_mm: 50.0,
            ..DailyRecord::new(day(2026, 7, 1))
        }];
        let result = compute_wetness(
            &WetnessInputs {
                records,
                lookback_days: 1,
            },
            &params,
        );
        assert!(result.avg_precip >= 0.0);
    }

    #[test]
    fn test_snow_contributes_via_melt() {
        let params = WetnessParams::default();
        let records = vec![DailyRecord {
            snow_mm: 10.0,
            ..DailyRecord::new(day(2026, 1, 5))
        }];
        let result = compute_wetness(
            &WetnessInputs {
                records,
                lookback_days: 1,
            },
            &params,
        );
        assert_eq!(result.wet_days, 1);
        assert!(result.avg_precip > 0.0);
        // Melt factor discounts the snowfall.
        assert!(result.avg_precip < 10.0);
    }

    #[test]
    fn test_trace_rain_below_threshold_is_not_a_wet_day() {
        let params = WetnessParams::default();
        let result = compute_wetness(&window(&[(3, 0.1)]), &params);
        assert_eq!(result.wet_days, 0);
        assert!(!result.is_wet);
        assert_eq!(result.label, TrailCondition::Dry);
    }

    #[test]
    fn test_four_wet_days_is_very_wet() {
        let params = WetnessParams::default();
        let result = compute_wetness(
            &window(&[(1, 1.0), (2, 1.0), (3, 1.0), (4, 1.0)]),
            &params,
        );
        assert_eq!(result.wet_days, 4);
        assert_eq!(result.label, TrailCondition::VeryWet);
    }
}
