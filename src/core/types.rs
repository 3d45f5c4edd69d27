use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Balances at or below this are treated as fully paid.
pub const PAID_OFF_EPSILON: f64 = 0.01;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Smallest balance first, higher rate breaks ties.
    Snowball,
    /// Highest rate first, smaller balance breaks ties.
    Avalanche,
}

/// Stable identity of a debt within one run: its position in the caller's input.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct DebtId(pub usize);

/// A numeric cell as a caller may hand it over: a number, loose text, or anything else.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
    /// Booleans, arrays, objects: read as non-numeric.
    Other(serde::de::IgnoredAny),
}

/// Raw debt row before normalization. Every numeric column is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DebtRow {
    #[serde(alias = "Name")]
    pub name: Option<String>,
    #[serde(alias = "Rate")]
    pub rate: Option<NumericField>,
    #[serde(alias = "Balance")]
    pub balance: Option<NumericField>,
    #[serde(alias = "Payment")]
    pub payment: Option<NumericField>,
    #[serde(alias = "Extra")]
    pub extra: Option<NumericField>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: DebtId,
    pub name: String,
    pub balance: f64,
    /// Annual nominal rate as a fraction (0.12 == 12%).
    pub rate: f64,
    pub payment: f64,
    pub extra: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assumptions {
    pub extra_budget: f64,
    pub min_floor: f64,
    pub max_months: u32,
    pub start_date: NaiveDate,
    pub strategy: Strategy,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtMonth {
    pub id: DebtId,
    pub name: String,
    pub interest: f64,
    pub applied: f64,
    pub ending_balance: f64,
    pub is_focus: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    pub date: NaiveDate,
    pub month: u32,
    pub total_balance: f64,
    pub total_interest: f64,
    pub total_payment: f64,
    /// Empty when every debt was already paid off.
    pub focus_debt: String,
    pub debts: Vec<DebtMonth>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtOutcome {
    #[serde(flatten)]
    pub debt: Debt,
    pub ending_balance: f64,
    pub is_paid_off: bool,
    /// Months until the balance first dropped to the payoff threshold.
    pub months_to_payoff: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub total_ending_debt: f64,
    pub months_simulated: u32,
    pub total_interest: f64,
    pub total_payment: f64,
    pub all_paid_off: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub strategy: Strategy,
    pub schedule: Vec<MonthRecord>,
    pub outcomes: Vec<DebtOutcome>,
    pub summary: SimulationSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub snowball: SimulationResult,
    pub avalanche: SimulationResult,
    /// Snowball interest minus avalanche interest.
    pub interest_saved_by_avalanche: f64,
    /// Snowball months minus avalanche months.
    pub months_saved_by_avalanche: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOverview {
    pub debt_count: usize,
    pub total_balance: f64,
    pub average_rate: f64,
    pub total_monthly_payment: f64,
}
