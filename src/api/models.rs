use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AnalyzeParameters {
    pub ticker: Option<String>,
}

impl AnalyzeParameters {
    /// The trimmed ticker, or `None` when missing or blank.
    pub fn ticker(&self) -> Option<String> {
        self.ticker
            .as_deref()
            .map(str::trim)
            .filter(|ticker| !ticker.is_empty())
            .map(str::to_string)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: String,
}
