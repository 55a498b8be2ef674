use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A benchmark composite: tickers and fractional weights, paired by position.
///
/// The weight sum is trusted as configured (conventionally 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkDefinition {
    pub name: String,
    pub tickers: Vec<String>,
    pub weights: Vec<f64>,
}

impl BenchmarkDefinition {
    pub fn new(name: impl Into<String>, tickers: Vec<String>, weights: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            tickers,
            weights,
        }
    }

    /// Check the positional pairing: same, non-zero length and no blank tickers.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.tickers.len() != self.weights.len() {
            return Err(self.malformed(format!(
                "{} tickers but {} weights",
                self.tickers.len(),
                self.weights.len()
            )));
        }
        if self.tickers.is_empty() {
            return Err(self.malformed("no constituents".into()));
        }
        if self.tickers.iter().any(|t| t.trim().is_empty()) {
            return Err(self.malformed("blank ticker".into()));
        }
        Ok(())
    }

    /// `(ticker, fraction)` pairs in configured order.
    pub fn weight_pairs(&self) -> Vec<(String, f64)> {
        self.tickers
            .iter()
            .cloned()
            .zip(self.weights.iter().copied())
            .collect()
    }

    fn malformed(&self, reason: String) -> CoreError {
        CoreError::MalformedBenchmark {
            name: self.name.clone(),
            reason,
        }
    }
}

/// A benchmark as persisted: comma-joined positional lists.
///
/// e.g. `Name = "60% Equity / 40% Bonds"`, `Tickers = "SPY,IEF"`, `Weights = "0.6,0.4"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Tickers")]
    pub tickers: String,
    #[serde(rename = "Weights")]
    pub weights: String,
}

impl BenchmarkRecord {
    pub fn new(name: impl Into<String>, tickers: impl Into<String>, weights: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tickers: tickers.into(),
            weights: weights.into(),
        }
    }

    /// The three benchmarks shipped when no registry file exists.
    pub fn defaults() -> Vec<BenchmarkRecord> {
        vec![
            BenchmarkRecord::new("100% SPY", "SPY", "1"),
            BenchmarkRecord::new("100% World", "VT", "1"),
            BenchmarkRecord::new("60% Equity / 40% Bonds", "SPY,IEF", "0.6,0.4"),
        ]
    }

    /// Split the comma-joined lists into a validated definition.
    pub fn parse(&self) -> Result<BenchmarkDefinition, CoreError> {
        let tickers: Vec<String> = split_list(&self.tickers)
            .map(|t| t.to_uppercase())
            .collect();

        let weights = split_list(&self.weights)
            .map(|w| {
                w.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| CoreError::MalformedBenchmark {
                        name: self.name.clone(),
                        reason: format!("invalid weight '{w}'"),
                    })
            })
            .collect::<Result<Vec<f64>, CoreError>>()?;

        let definition = BenchmarkDefinition::new(self.name.clone(), tickers, weights);
        definition.validate()?;
        Ok(definition)
    }
}

// Empty items are kept so that "SPY," surfaces as a blank ticker.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim)
}
