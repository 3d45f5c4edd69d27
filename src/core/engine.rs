use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::error::{PayoffError, Result};
use super::schedule::next_month;
use super::strategy::focus_order;
use super::types::{
    Assumptions, Debt, DebtId, DebtMonth, DebtOutcome, MonthRecord, PAID_OFF_EPSILON,
    SimulationResult, SimulationSummary, Strategy, StrategyComparison,
};

#[derive(Debug)]
struct Ledger<'a> {
    debt: &'a Debt,
    balance: f64,
    payment: f64,
    months_to_payoff: Option<u32>,
}

impl Ledger<'_> {
    fn outstanding(&self) -> bool {
        self.balance > PAID_OFF_EPSILON
    }
}

#[derive(Debug, Clone, Copy)]
struct MonthTotals {
    balance: f64,
    interest: f64,
    payment: f64,
}

pub fn simulate(debts: &[Debt], assumptions: &Assumptions) -> Result<SimulationResult> {
    validate_assumptions(assumptions)?;
    validate_debts(debts)?;

    let mut ledgers = open_ledgers(debts, assumptions.min_floor);
    debug!(
        debts = debts.len(),
        strategy = ?assumptions.strategy,
        max_months = assumptions.max_months,
        "starting payoff simulation"
    );

    let mut schedule = Vec::new();
    let mut date = assumptions.start_date;
    for month in 0..assumptions.max_months {
        if !ledgers.values().any(Ledger::outstanding) {
            break;
        }
        if month > 0 {
            date = next_month(date)?;
        }
        schedule.push(run_month(&mut ledgers, assumptions, month, date));
    }

    let outcomes = collect_outcomes(debts, &ledgers);
    let summary = summarize(&schedule, &outcomes);
    if summary.all_paid_off {
        debug!(months = summary.months_simulated, "all debts paid off");
    } else {
        warn!(
            months = summary.months_simulated,
            remaining = summary.total_ending_debt,
            "horizon reached with balances outstanding"
        );
    }

    Ok(SimulationResult {
        strategy: assumptions.strategy,
        schedule,
        outcomes,
        summary,
    })
}

/// Runs both strategies on identical inputs. Each run owns its own ledgers.
pub fn compare_strategies(debts: &[Debt], assumptions: &Assumptions) -> Result<StrategyComparison> {
    let with_strategy = |strategy| Assumptions {
        strategy,
        ..assumptions.clone()
    };
    let snowball = simulate(debts, &with_strategy(Strategy::Snowball))?;
    let avalanche = simulate(debts, &with_strategy(Strategy::Avalanche))?;

    let interest_saved_by_avalanche =
        snowball.summary.total_interest - avalanche.summary.total_interest;
    let months_saved_by_avalanche = i64::from(snowball.summary.months_simulated)
        - i64::from(avalanche.summary.months_simulated);

    Ok(StrategyComparison {
        snowball,
        avalanche,
        interest_saved_by_avalanche,
        months_saved_by_avalanche,
    })
}

fn validate_assumptions(assumptions: &Assumptions) -> Result<()> {
    if assumptions.max_months == 0 {
        return Err(PayoffError::InvalidAssumption {
            field: "max_months",
            message: "must be >= 1".to_string(),
        });
    }
    if !assumptions.extra_budget.is_finite() || assumptions.extra_budget < 0.0 {
        return Err(PayoffError::InvalidAssumption {
            field: "extra_budget",
            message: format!("must be >= 0, got {}", assumptions.extra_budget),
        });
    }
    if !assumptions.min_floor.is_finite() || assumptions.min_floor < 0.0 {
        return Err(PayoffError::InvalidAssumption {
            field: "min_floor",
            message: format!("must be >= 0, got {}", assumptions.min_floor),
        });
    }
    Ok(())
}

fn validate_debts(debts: &[Debt]) -> Result<()> {
    let mut ids = HashSet::with_capacity(debts.len());
    let mut names = HashSet::with_capacity(debts.len());

    for debt in debts {
        if !ids.insert(debt.id) {
            return Err(PayoffError::DuplicateDebtId(debt.id.0));
        }
        if !names.insert(debt.name.as_str()) {
            return Err(PayoffError::DuplicateDebtName(debt.name.clone()));
        }

        let fields = [
            ("Balance", debt.balance),
            ("Rate", debt.rate),
            ("Payment", debt.payment),
            ("Extra", debt.extra),
        ];
        for (label, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(PayoffError::InvalidDebt {
                    name: debt.name.clone(),
                    message: format!("{label} must be a finite value >= 0, got {value}"),
                });
            }
        }
    }
    Ok(())
}

fn open_ledgers(debts: &[Debt], min_floor: f64) -> BTreeMap<DebtId, Ledger<'_>> {
    debts
        .iter()
        .map(|debt| {
            let payment = if debt.payment <= 0.0 {
                min_floor
            } else {
                debt.payment
            };
            let ledger = Ledger {
                debt,
                balance: debt.balance,
                payment,
                months_to_payoff: (debt.balance <= PAID_OFF_EPSILON).then_some(0),
            };
            (debt.id, ledger)
        })
        .collect()
}

fn run_month(
    ledgers: &mut BTreeMap<DebtId, Ledger<'_>>,
    assumptions: &Assumptions,
    month: u32,
    date: NaiveDate,
) -> MonthRecord {
    let standings: Vec<(DebtId, f64, f64)> = ledgers
        .iter()
        .map(|(id, ledger)| (*id, ledger.balance, ledger.debt.rate))
        .collect();
    let focus = focus_order(&standings, assumptions.strategy)
        .into_iter()
        .find(|id| ledgers.get(id).is_some_and(Ledger::outstanding));

    let mut totals = MonthTotals {
        balance: 0.0,
        interest: 0.0,
        payment: 0.0,
    };
    let mut lines = Vec::with_capacity(ledgers.len());

    for (id, ledger) in ledgers.iter_mut() {
        let is_focus = focus == Some(*id);
        // settled debts stay frozen so they never take another payment
        let (interest, applied) = if ledger.outstanding() {
            apply_month(ledger, assumptions.extra_budget, is_focus, month)
        } else {
            (0.0, 0.0)
        };

        totals.balance += ledger.balance;
        totals.interest += interest;
        totals.payment += applied;
        lines.push(DebtMonth {
            id: *id,
            name: ledger.debt.name.clone(),
            interest,
            applied,
            ending_balance: ledger.balance,
            is_focus,
        });
    }

    MonthRecord {
        date,
        month,
        total_balance: totals.balance,
        total_interest: totals.interest,
        total_payment: totals.payment,
        focus_debt: focus
            .and_then(|id| ledgers.get(&id))
            .map(|ledger| ledger.debt.name.clone())
            .unwrap_or_default(),
        debts: lines,
    }
}

/// Accrues one month of interest and applies the capped payment.
/// Returns `(interest, applied)`.
fn apply_month(ledger: &mut Ledger<'_>, extra_budget: f64, is_focus: bool, month: u32) -> (f64, f64) {
    let interest = ledger.balance * (ledger.debt.rate / 12.0);
    let focus_extra = if is_focus { extra_budget } else { 0.0 };
    let total = ledger.payment + ledger.debt.extra + focus_extra;

    // never pay below zero; unused amounts are not carried to other debts
    let applied = total.min(ledger.balance + interest);
    ledger.balance = (ledger.balance + interest - applied).max(0.0);

    if ledger.months_to_payoff.is_none() && !ledger.outstanding() {
        ledger.months_to_payoff = Some(month + 1);
    }
    (interest, applied)
}

fn collect_outcomes(debts: &[Debt], ledgers: &BTreeMap<DebtId, Ledger<'_>>) -> Vec<DebtOutcome> {
    debts
        .iter()
        .map(|debt| {
            let (ending_balance, months_to_payoff) = ledgers
                .get(&debt.id)
                .map(|ledger| (ledger.balance, ledger.months_to_payoff))
                .unwrap_or((debt.balance, None));
            DebtOutcome {
                debt: debt.clone(),
                ending_balance,
                is_paid_off: ending_balance <= PAID_OFF_EPSILON,
                months_to_payoff,
            }
        })
        .collect()
}

fn summarize(schedule: &[MonthRecord], outcomes: &[DebtOutcome]) -> SimulationSummary {
    SimulationSummary {
        total_ending_debt: outcomes.iter().map(|o| o.ending_balance).sum(),
        months_simulated: schedule.len() as u32,
        total_interest: schedule.iter().map(|r| r.total_interest).sum(),
        total_payment: schedule.iter().map(|r| r.total_payment).sum(),
        all_paid_off: outcomes.iter().all(|o| o.is_paid_off),
    }
}
