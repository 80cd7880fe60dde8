//! Text emotion blending.
//!
//! Text input is scored by two external classifiers: one for emotion, one
//! for polarity. [`TextAnalysis::new`] combines the two labels with a fixed
//! rule: a negative emotion read alongside positive sentiment becomes `joy`,
//! and `joy` read alongside negative sentiment becomes `neutral`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Polarity reported by a sentiment classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    /// Favourable polarity (`positive` / `pos`).
    Positive,
    /// Unfavourable polarity (`negative` / `neg`).
    Negative,
    /// No clear polarity.
    Neutral,
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Ok(Sentiment::Positive),
            "negative" | "neg" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        })
    }
}

const OVERRIDDEN_BY_POSITIVE: [&str; 3] = ["sadness", "anger", "disgust"];

/// Blend an emotion label with a sentiment.
///
/// `sadness`, `anger` and `disgust` become `joy` under positive sentiment.
/// `joy` becomes `neutral` under negative sentiment. Every other pairing keeps
/// the emotion label unchanged.
pub fn blend_emotion(emotion: &str, sentiment: Sentiment) -> String {
    match sentiment {
        Sentiment::Positive if OVERRIDDEN_BY_POSITIVE.contains(&emotion) => "joy".to_string(),
        Sentiment::Negative if emotion == "joy" => "neutral".to_string(),
        _ => emotion.to_string(),
    }
}

/// Both classifier labels and the blended result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAnalysis {
    /// Label from the emotion classifier.
    pub emotion: String,
    /// Polarity from the sentiment classifier.
    pub sentiment: Sentiment,
    /// Result of [`blend_emotion`].
    pub blended: String,
}

impl TextAnalysis {
    /// Record both labels and compute the blended emotion.
    pub fn new(emotion: impl Into<String>, sentiment: Sentiment) -> Self {
        let emotion = emotion.into();
        let blended = blend_emotion(&emotion, sentiment);
        Self {
            emotion,
            sentiment,
            blended,
        }
    }
}

impl Display for TextAnalysis {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Emotion: {} | Sentiment: {} | Final: {}",
            self.emotion, self.sentiment, self.blended
        )
    }
}
