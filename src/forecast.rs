//! Contract for forecasting collaborators
//!
//! Forecasters consume one value per year (an annual mean, or the mean of one
//! month in each year) and return predictions keyed by future year. Keys
//! with too little history get an explicit empty map rather than a
//! fabricated value.

use std::collections::BTreeMap;

use crate::audit::aggregate::{AnnualAggregate, monthly_yearly_aggregates, trend_line};
use crate::models::DailyRecord;

/// Which annual mean a history is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reading {
    #[default]
    Max,
    Min,
}

/// One value per observed year, ascending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    values: BTreeMap<i32, f64>,
}

impl HistorySeries {
    pub fn new(values: BTreeMap<i32, f64>) -> Self {
        Self { values }
    }

    /// Annual means, skipping interpolated years
    pub fn from_annual(annual: &[AnnualAggregate], reading: Reading) -> Self {
        let values = annual
            .iter()
            .filter(|a| !a.interpolated)
            .map(|a| {
                let value = match reading {
                    Reading::Max => a.avg_max_temp,
                    Reading::Min => a.avg_min_temp,
                };
                (a.year, value)
            })
            .collect();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.values.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values.iter().map(|(&year, &value)| (year, value))
    }
}

/// Month-within-year histories for every calendar month
///
/// All twelve months are present; a month never observed has an empty
/// history.
pub fn monthly_histories(records: &[DailyRecord], reading: Reading) -> BTreeMap<u32, HistorySeries> {
    (1..=12)
        .map(|month| {
            let values = monthly_yearly_aggregates(records, month)
                .into_iter()
                .map(|m| {
                    let value = match reading {
                        Reading::Max => m.avg_max_temp,
                        Reading::Min => m.avg_min_temp,
                    };
                    (m.year, value)
                })
                .collect();
            (month, HistorySeries::new(values))
        })
        .collect()
}

/// A model producing future-year predictions from a yearly history
pub trait Forecaster {
    /// Fewest observed years the model needs
    fn min_history(&self) -> usize;

    /// Predict values for `years`, keyed by year as a string
    fn predict(&self, history: &HistorySeries, years: &[i32]) -> BTreeMap<String, f64>;

    /// Predict, or return an empty map when history is too short
    fn forecast(&self, history: &HistorySeries, years: &[i32]) -> BTreeMap<String, f64> {
        if history.len() < self.min_history().max(1) {
            return BTreeMap::new();
        }
        self.predict(history, years)
    }
}

/// Forecast every group independently
pub fn forecast_grouped<K, F>(
    forecaster: &F,
    groups: &BTreeMap<K, HistorySeries>,
    years: &[i32],
) -> BTreeMap<K, BTreeMap<String, f64>>
where
    K: Ord + Clone,
    F: Forecaster + ?Sized,
{
    groups
        .iter()
        .map(|(key, history)| (key.clone(), forecaster.forecast(history, years)))
        .collect()
}

/// Extends the least-squares line through the history
#[derive(Debug, Clone, Copy)]
pub struct LinearTrendForecaster {
    pub min_history: usize,
}

impl Default for LinearTrendForecaster {
    fn default() -> Self {
        Self { min_history: 3 }
    }
}

impl Forecaster for LinearTrendForecaster {
    fn min_history(&self) -> usize {
        self.min_history
    }

    fn predict(&self, history: &HistorySeries, years: &[i32]) -> BTreeMap<String, f64> {
        let points: Vec<AnnualAggregate> = history
            .iter()
            .map(|(year, value)| AnnualAggregate {
                year,
                avg_max_temp: value,
                avg_min_temp: value,
                temp_diff: 0.0,
                data_count: 1,
                interpolated: false,
            })
            .collect();

        let Some(trend) = trend_line(&points) else {
            return BTreeMap::new();
        };

        years
            .iter()
            .map(|&year| (year.to_string(), trend.value_at(year)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn history(points: &[(i32, f64)]) -> HistorySeries {
        HistorySeries::new(points.iter().copied().collect())
    }

    #[test]
    fn test_linear_trend_extends_line() {
        let forecaster = LinearTrendForecaster::default();
        let series = history(&[(2020, 20.0), (2021, 20.5), (2022, 21.0)]);

        let predictions = forecaster.forecast(&series, &[2023, 2025]);

        assert_eq!(predictions.len(), 2);
        assert!((predictions["2023"] - 21.5).abs() < 1e-6);
        assert!((predictions["2025"] - 22.5).abs() < 1e-6);
    }

    #[test]
    fn test_insufficient_history_yields_empty_map() {
        let forecaster = LinearTrendForecaster::default();
        let series = history(&[(2020, 20.0), (2021, 20.5)]);

        assert!(forecaster.forecast(&series, &[2025]).is_empty());
        assert!(forecaster.forecast(&HistorySeries::default(), &[2025]).is_empty());
    }

    #[test]
    fn test_history_from_annual_skips_interpolated() {
        let annual = vec![
            AnnualAggregate {
                year: 2000,
                avg_max_temp: 18.0,
                avg_min_temp: 9.0,
                temp_diff: 9.0,
                data_count: 366,
                interpolated: false,
            },
            AnnualAggregate {
                year: 2001,
                avg_max_temp: 18.5,
                avg_min_temp: 9.5,
                temp_diff: 9.0,
                data_count: 0,
                interpolated: true,
            },
        ];

        let series = HistorySeries::from_annual(&annual, Reading::Min);

        assert_eq!(series.len(), 1);
        assert_eq!(series.iter().next(), Some((2000, 9.0)));
        assert_eq!(series.last_year(), Some(2000));
    }

    #[test]
    fn test_grouped_forecast_keeps_empty_groups() {
        let day = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        let records: Vec<DailyRecord> = (2018..=2022)
            .map(|y| DailyRecord::new(day(y, 8), 30.0 + f64::from(y - 2018), 24.0))
            .collect();

        let groups = monthly_histories(&records, Reading::Max);
        let forecasts = forecast_grouped(&LinearTrendForecaster::default(), &groups, &[2023]);

        assert_eq!(forecasts.len(), 12);
        assert!(forecasts[&1].is_empty());
        assert!((forecasts[&8]["2023"] - 35.0).abs() < 1e-6);
    }
}
