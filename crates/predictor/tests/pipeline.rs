//! End-to-end training on synthetic series.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use predictor::{
    BucketSet, Model, Sample, TrainConfig, TreeBuilder, label_catalog, train, train_vectors,
};
use types::{
    Accuracy, Analysis, Aroon, FeatureKey, FeatureVector, Horizon, Indicator, Label, Macd,
    Outcome, PerHorizon, PeriodRecord, PriceSeries, Stats, StockHistory,
};

fn record(timestamp: NaiveDate, value: f64) -> PeriodRecord {
    PeriodRecord {
        timestamp,
        stats: Stats {
            open: value,
            high: value,
            low: value,
            close: value,
            volume: value,
            adjusted: value,
            dividend: value,
        },
        analysis: Analysis {
            obv: value,
            ad: value,
            adx: value,
            macd: PriceSeries::splat(Macd {
                value,
                signal: value,
                history: value,
            }),
            sma: PriceSeries::splat(value),
            ema: PriceSeries::splat(value),
            rsi: PriceSeries::splat(value),
            aroon: Aroon {
                up: value,
                down: value,
            },
        },
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn seeded(seed: u64) -> TrainConfig {
    TrainConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

/// 60 daily vectors, newest first, close rising 0.5 per day, one week and
/// one month record shared by every day.
fn increasing_series() -> Vec<FeatureVector> {
    let week = record(date("2024-03-29"), 80.0);
    let month = record(date("2024-03-01"), 75.0);
    let start = date("2024-01-01");

    (0..60u64)
        .rev()
        .map(|age| {
            let day = record(
                start.checked_add_days(Days::new(age)).unwrap(),
                10.0 + age as f64 * 0.5,
            );
            FeatureVector::from_records(&day, &week, &month)
        })
        .collect()
}

#[test]
fn test_increasing_series_reproduces_held_in_label() {
    let vectors = increasing_series();
    let model = train_vectors(&vectors, &seeded(17)).unwrap();

    let expected = Label::new(Outcome::Positive, Outcome::Neutral, Outcome::Neutral);

    // Validation samples are drawn from the training partition.
    assert!(!model.validation.is_empty());
    for sample in &model.validation {
        assert_eq!(sample.label, expected);
        assert_eq!(model.predict(&sample.vector), sample.label);
    }

    for vector in &vectors[1..] {
        assert_eq!(model.predict_vector(vector).unwrap(), expected);
    }
    assert!((model.validity.daily - 1.0).abs() < 1e-10);
    assert!((model.confidence.suggestion - 1.0).abs() < 1e-10);
}

#[test]
fn test_symmetric_separable_set_scores_high() {
    let close = FeatureKey::new(Horizon::Daily, Indicator::by_name("close").unwrap());
    let stamp = date("2024-05-06");

    // Ten samples per outcome. Close separates outcomes; everything else is noise.
    let rows: Vec<(FeatureVector, Outcome)> = (0..70usize)
        .map(|i| {
            let outcome = Outcome::ALL[i % 7];
            let noise = record(stamp, ((i * 7) % 13) as f64);
            let mut vector = FeatureVector::from_records(&noise, &noise, &noise);
            let separating = 10.0 * (outcome.value() + 3) as f64 + ((i / 7) % 3) as f64;
            vector.values.insert(close, separating);
            (vector, outcome)
        })
        .collect();

    let vectors: Vec<FeatureVector> = rows.iter().map(|(v, _)| v.clone()).collect();
    let buckets = BucketSet::build(&vectors, 20);

    let samples: Vec<Sample> = rows
        .iter()
        .map(|(vector, outcome)| Sample {
            vector: buckets.bucketize(vector).unwrap(),
            label: Label::new(*outcome, *outcome, *outcome),
        })
        .collect();
    let (even, odd): (Vec<(usize, Sample)>, Vec<(usize, Sample)>) = samples
        .into_iter()
        .enumerate()
        .partition(|(i, _)| i % 2 == 0);
    let training: Vec<Sample> = even.into_iter().map(|(_, s)| s).collect();
    let held_out: Vec<Sample> = odd.into_iter().map(|(_, s)| s).collect();

    let catalog = label_catalog();
    let trees = PerHorizon::from_fn(|h| {
        TreeBuilder::new(h, buckets.keys().copied(), catalog.len()).build(&training)
    });
    assert_eq!(trees.daily.key(), Some(close));

    let model = Model {
        buckets,
        catalog,
        trees,
        tests: held_out,
        validation: Vec::new(),
        validity: Accuracy::default(),
        confidence: Accuracy::default(),
        built_at: chrono::Utc::now(),
    };

    let accuracy = model.test();
    for horizon in Horizon::ALL {
        assert!(accuracy.horizon(horizon) >= 0.9, "{}: {}", horizon, accuracy);
    }
    assert!(accuracy.suggestion >= 0.9);
}

#[test]
fn test_serialized_model_predicts_identically() {
    let vectors = increasing_series();
    let model = train_vectors(&vectors, &seeded(3)).unwrap();

    let json = serde_json::to_string(&model).unwrap();
    let restored: Model = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, model);
    for vector in &vectors {
        assert_eq!(
            restored.predict_vector(vector).unwrap(),
            model.predict_vector(vector).unwrap()
        );
    }
    assert_eq!(restored.test(), model.test());
}

/// Weekday history over several months with weekly (Friday) and monthly
/// (first of month) records, all newest first.
fn weekday_history() -> StockHistory {
    let start = date("2024-01-01");
    let days: Vec<NaiveDate> = (0..120u64)
        .map(|n| start.checked_add_days(Days::new(n)).unwrap())
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect();

    let value = |n: usize| 50.0 + (n as f64 * 0.37).sin() * 8.0 + n as f64 * 0.1;

    let mut daily: Vec<PeriodRecord> = days
        .iter()
        .enumerate()
        .map(|(n, d)| record(*d, value(n)))
        .collect();

    let mut weekly: Vec<PeriodRecord> = days
        .iter()
        .enumerate()
        .filter(|(_, d)| d.weekday() == Weekday::Fri)
        .map(|(n, d)| record(*d, value(n) * 1.1))
        .collect();

    let mut monthly: Vec<PeriodRecord> = (1..=4u32)
        .map(|m| record(NaiveDate::from_ymd_opt(2024, m, 1).unwrap(), 40.0 + m as f64 * 3.0))
        .collect();

    daily.reverse();
    weekly.reverse();
    monthly.reverse();

    StockHistory {
        days: daily,
        weeks: weekly,
        months: monthly,
    }
}

#[test]
fn test_train_from_history_and_forecast() {
    let history = weekday_history();
    let model = train(&history, &seeded(9)).unwrap();

    assert_eq!(model.trees.iter().count(), 3);
    assert!(!model.tests.is_empty());
    assert_eq!(model.tests.len(), model.validation.len());

    let forecast = model
        .forecast(&history.days[0], &history.weeks[0], &history.months[0])
        .unwrap();
    for (_, outcome) in forecast.label.iter() {
        assert!((-3..=3).contains(&outcome.value()));
    }
    assert_eq!(forecast.suggestion, predictor::suggest(&forecast.label, &Default::default()));
}
