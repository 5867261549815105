/// Grading of game predictions against final scores, and accuracy broken down
/// by model confidence.
use serde::{Deserialize, Serialize};

use super::models::{GamePredictionResult, Winner};

/// Confidence at or above which a prediction counts as high-confidence.
const HIGH_CONFIDENCE: f64 = 0.7;
/// Confidence at or above which a prediction counts as medium-confidence.
const MEDIUM_CONFIDENCE: f64 = 0.6;

/// A completed prediction: the model's confidence and whether it was right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradedPrediction {
    pub confidence: f64,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketAccuracy {
    pub total: u64,
    pub correct: u64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBuckets {
    pub high: BucketAccuracy,
    pub medium: BucketAccuracy,
    pub low: BucketAccuracy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub total_predictions: u64,
    pub correct_predictions: u64,
    pub accuracy: f64,
    pub by_confidence: ConfidenceBuckets,
}

/// Whether `result` called the game right. `None` when the final score is
/// level, since there is no winner to compare against.
pub fn grade(result: &GamePredictionResult, home_score: u32, away_score: u32) -> Option<bool> {
    let actual = match home_score.cmp(&away_score) {
        std::cmp::Ordering::Greater => Winner::Home,
        std::cmp::Ordering::Less => Winner::Away,
        std::cmp::Ordering::Equal => return None,
    };
    Some(result.predicted_winner() == actual)
}

impl BucketAccuracy {
    fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.accuracy = if self.total > 0 {
            self.correct as f64 / self.total as f64
        } else {
            0.0
        };
        self
    }
}

/// Aggregate accuracy over completed predictions.
///
/// Buckets: high = [0.7, 1.0], medium = [0.6, 0.7), low = [0.0, 0.6).
pub fn accuracy_report(predictions: &[GradedPrediction]) -> AccuracyReport {
    let mut overall = BucketAccuracy::default();
    let mut buckets = ConfidenceBuckets::default();

    for p in predictions {
        overall.record(p.is_correct);
        let bucket = if p.confidence >= HIGH_CONFIDENCE {
            &mut buckets.high
        } else if p.confidence >= MEDIUM_CONFIDENCE {
            &mut buckets.medium
        } else {
            &mut buckets.low
        };
        bucket.record(p.is_correct);
    }

    let overall = overall.finish();
    AccuracyReport {
        total_predictions: overall.total,
        correct_predictions: overall.correct,
        accuracy: overall.accuracy,
        by_confidence: ConfidenceBuckets {
            high: buckets.high.finish(),
            medium: buckets.medium.finish(),
            low: buckets.low.finish(),
        },
    }
}
