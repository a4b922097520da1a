//! Grounding context builder
//!
//! Renders the top-risk lot snapshot into the compact text block that gets
//! injected into the instruction turn. This is the model's only window into
//! the dashboard data, so the rendering is deterministic: stable sort by
//! score descending, at most ten lines, fixed sentinel when nothing has been
//! scored yet.

use serde::{Deserialize, Serialize};

/// Exact sentence emitted when no risk items are available. The model is told
/// explicitly that there is nothing to summarize so it never fabricates lots.
pub const NO_DATA_SENTENCE: &str = "Risk scoring data is not yet available. \
Tell the user that scoring is still in progress and no lots can be summarized yet.";

/// Placeholder for lots whose name field came through blank
const UNNAMED_LOT: &str = "(unnamed lot)";

/// Maximum number of item lines rendered into the grounding block
pub const MAX_CONTEXT_ITEMS: usize = 10;

/// Risk level attached to a scored lot
///
/// Presentation field owned by the scoring pipeline; the assistant never
/// recomputes it or checks it against the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{label}")
    }
}

/// One scored lot from the dashboard's top-risk feed
///
/// Field names mirror the dashboard row shape. All scoring fields are taken
/// at face value as input text material.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskItem {
    pub lot_id: i64,
    #[serde(default)]
    pub lot_name: String,
    #[serde(rename = "risk_score", default)]
    pub score: f64,
    #[serde(rename = "risk_level", default)]
    pub level: RiskLevel,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_bin: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub top_reasons: Vec<String>,
}

impl RiskItem {
    fn display_name(&self) -> &str {
        if self.lot_name.trim().is_empty() {
            UNNAMED_LOT
        } else {
            &self.lot_name
        }
    }

    fn display_customer(&self) -> String {
        match &self.customer_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ if !self.customer_bin.trim().is_empty() => format!("BIN {}", self.customer_bin),
            _ => "unknown customer".to_string(),
        }
    }
}

/// Build the grounding text block from the current risk-item snapshot.
///
/// Pure function: same collection in the same order always yields the same
/// block. Ties on score keep input order (stable sort).
pub fn build_grounding_context(items: &[RiskItem]) -> String {
    if items.is_empty() {
        return NO_DATA_SENTENCE.to_string();
    }

    let mut ranked: Vec<&RiskItem> = items.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
        .iter()
        .take(MAX_CONTEXT_ITEMS)
        .enumerate()
        .map(|(i, item)| render_line(i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(rank: usize, item: &RiskItem) -> String {
    let mut line = format!(
        "{rank}. Lot {id} \"{name}\" | score {score:.0} ({level}) | customer: {customer} | amount: {amount:.2} KZT",
        id = item.lot_id,
        name = item.display_name(),
        score = item.score,
        level = item.level,
        customer = item.display_customer(),
        amount = item.amount,
    );
    if !item.top_reasons.is_empty() {
        line.push_str(" | reasons: ");
        line.push_str(&item.top_reasons.join(", "));
    }
    line
}
