use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Метрики сессии записи; читаются из потока статуса и из `main`.
#[derive(Debug, Default)]
pub struct RecorderMetrics {
    pub samples_recorded: AtomicU64,
    pub cycles_written: AtomicU64,
    pub long_term_records: AtomicU64,
    pub gyro_skipped: AtomicU64,
    pub dropped_samples: AtomicU64,
    pub buffer_full_events: AtomicU64,
    pub write_errors: AtomicU64,
    pub bytes_written: AtomicU64,
}

/// Snapshot метрик для отображения / тестирования.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub duration_secs: f64,
    pub samples_recorded: u64,
    pub cycles_written: u64,
    pub long_term_records: u64,
    pub gyro_skipped: u64,
    pub dropped_samples: u64,
    pub buffer_full_events: u64,
    pub write_errors: u64,
    pub bytes_written: u64,
    pub sample_rate_hz: f64,
    pub drop_rate_pct: f64,
}

impl RecorderMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Выборок в секунду с начала сессии.
    pub fn sample_rate_hz(
        &self,
        elapsed: &Instant,
    ) -> f64 {
        let secs = elapsed.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.samples_recorded.load(Ordering::Relaxed) as f64 / secs
    }

    /// Процент потерянных выборок (0.0-100.0).
    pub fn drop_rate_pct(&self) -> f64 {
        let recorded = self.samples_recorded.load(Ordering::Relaxed);
        let dropped = self.dropped_samples.load(Ordering::Relaxed);
        let total = recorded + dropped;

        if total == 0 {
            0.0
        } else {
            dropped as f64 / total as f64 * 100.0
        }
    }

    /// Итоговая сводка для вывода в конце сессии.
    pub fn summary(
        &self,
        elapsed: &Instant,
    ) -> MetricsSummary {
        MetricsSummary {
            duration_secs: elapsed.elapsed().as_secs_f64(),
            samples_recorded: self.samples_recorded.load(Ordering::Relaxed),
            cycles_written: self.cycles_written.load(Ordering::Relaxed),
            long_term_records: self.long_term_records.load(Ordering::Relaxed),
            gyro_skipped: self.gyro_skipped.load(Ordering::Relaxed),
            dropped_samples: self.dropped_samples.load(Ordering::Relaxed),
            buffer_full_events: self.buffer_full_events.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            sample_rate_hz: self.sample_rate_hz(elapsed),
            drop_rate_pct: self.drop_rate_pct(),
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Samples       : {}", self.samples_recorded)?;
        writeln!(f, "  Cycles        : {}", self.cycles_written)?;
        writeln!(f, "  Long-term     : {}", self.long_term_records)?;
        writeln!(f, "  Gyro skipped  : {}", self.gyro_skipped)?;
        writeln!(
            f,
            "  Dropped       : {} ({:.2}%)",
            self.dropped_samples, self.drop_rate_pct
        )?;
        writeln!(f, "  Buffer full   : {}", self.buffer_full_events)?;
        writeln!(f, "  Write errors  : {}", self.write_errors)?;
        writeln!(f, "  Bytes written : {:.1} KB", self.bytes_written as f64 / 1e3)?;
        writeln!(f, "  Sample rate   : {:.1} Hz", self.sample_rate_hz)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;

    #[test]
    fn test_initial_metrics_zero() {
        let metrics = RecorderMetrics::new();
        let start = Instant::now();
        let summary = metrics.summary(&start);

        assert_eq!(summary.samples_recorded, 0);
        assert_eq!(summary.cycles_written, 0);
        assert_eq!(summary.dropped_samples, 0);
        assert_eq!(summary.write_errors, 0);
        assert_eq!(summary.bytes_written, 0);
        assert_eq!(summary.sample_rate_hz, 0.0);
        assert_eq!(summary.drop_rate_pct, 0.0);
    }

    #[test]
    fn test_drop_rate_calculation() {
        let metrics = RecorderMetrics::new();

        metrics.samples_recorded.store(80, Ordering::Relaxed);
        metrics.dropped_samples.store(20, Ordering::Relaxed);

        assert!((metrics.drop_rate_pct() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_rate() {
        let metrics = RecorderMetrics::new();
        metrics.samples_recorded.store(200, Ordering::Relaxed);

        let start = Instant::now() - Duration::from_secs(2);
        let summary = metrics.summary(&start);

        // 200 выборок за ~2 с ≈ 100 Гц
        assert!((summary.sample_rate_hz - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_summary_display() {
        let metrics = RecorderMetrics::new();
        metrics.cycles_written.store(7, Ordering::Relaxed);
        metrics.gyro_skipped.store(2, Ordering::Relaxed);

        let text = metrics.summary(&Instant::now()).to_string();
        assert!(text.contains("Cycles        : 7"));
        assert!(text.contains("Gyro skipped  : 2"));
    }

    #[test]
    fn test_multithreaded_updates() {
        let metrics = RecorderMetrics::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        m.samples_recorded.fetch_add(1, Ordering::Relaxed);
                        m.dropped_samples.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(metrics.samples_recorded.load(Ordering::Relaxed), 4_000);
        assert_eq!(metrics.dropped_samples.load(Ordering::Relaxed), 4_000);
    }
}
