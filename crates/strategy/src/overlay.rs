use common::{BarSeries, OverlayPoint, Overlays};

/// Collect `(column, overlay key)` pairs into chart series.
///
/// Missing values are skipped and absent columns omitted. Without a time
/// index the result is empty.
pub fn collect(bars: &BarSeries, series: &[(String, &str)]) -> Overlays {
    let mut overlays = Overlays::new();
    let Some(times) = bars.times_ms() else {
        return overlays;
    };

    for (column, key) in series {
        let Some(values) = bars.column(column) else {
            continue;
        };
        let points = times
            .iter()
            .zip(values)
            .filter_map(|(time, value)| {
                value.map(|value| OverlayPoint { time: *time, value })
            })
            .collect();
        overlays.insert(key.to_string(), points);
    }
    overlays
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn timed(values: Vec<f64>) -> BarSeries {
        let times = (0..values.len() as i64)
            .map(|i| Utc.timestamp_millis_opt(i * 1_000).unwrap())
            .collect();
        BarSeries::new(values.len())
            .with_column("x", values)
            .with_times(times)
    }

    #[test]
    fn missing_values_are_skipped() {
        let overlays = collect(&timed(vec![f64::NAN, 2.0, 3.0]), &[("x".into(), "line")]);
        let line = &overlays["line"];
        assert_eq!(line.len(), 2);
        assert_eq!(line[0], OverlayPoint { time: 1_000, value: 2.0 });
    }

    #[test]
    fn absent_columns_are_omitted() {
        let overlays = collect(&timed(vec![1.0]), &[("y".into(), "other")]);
        assert!(overlays.is_empty());
    }

    #[test]
    fn no_time_index_means_no_overlays() {
        let bars = BarSeries::new(2).with_column("x", vec![1.0, 2.0]);
        assert!(collect(&bars, &[("x".into(), "line")]).is_empty());
    }
}
