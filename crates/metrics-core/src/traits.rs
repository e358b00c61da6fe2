use crate::PeriodSeries;

/// Anything that can hand out a period-keyed series for a metric name.
///
/// Company tables, companies and industry aggregates all implement this so the
/// aggregator never needs to know where a series came from.
pub trait MetricSource {
    fn metric_series(&self, metric: &str) -> Option<&PeriodSeries>;
}

impl<T: MetricSource + ?Sized> MetricSource for &T {
    fn metric_series(&self, metric: &str) -> Option<&PeriodSeries> {
        (**self).metric_series(metric)
    }
}
