mod engine;
mod error;
mod normalize;
mod schedule;
mod strategy;
mod types;

pub use engine::{compare_strategies, simulate};
pub use error::{PayoffError, Result};
pub use normalize::{normalize_debts, portfolio_overview};
pub use schedule::next_month;
pub use strategy::focus_order;
pub use types::{
    Assumptions, Debt, DebtId, DebtMonth, DebtOutcome, DebtRow, MonthRecord, NumericField,
    PAID_OFF_EPSILON, PortfolioOverview, SimulationResult, SimulationSummary, Strategy,
    StrategyComparison,
};
