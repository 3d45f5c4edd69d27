use std::collections::HashSet;

use tracing::warn;

use super::error::{PayoffError, Result};
use super::types::{Debt, DebtId, DebtRow, NumericField, PortfolioOverview};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Column {
    Rate,
    Balance,
    Payment,
    Extra,
}

impl Column {
    fn label(self) -> &'static str {
        match self {
            Column::Rate => "Rate",
            Column::Balance => "Balance",
            Column::Payment => "Payment",
            Column::Extra => "Extra",
        }
    }
}

/// Turns caller rows into validated debts.
///
/// Missing or unparseable numbers become 0.0. Negative or non-finite numbers,
/// blank names, and repeated names are rejected.
pub fn normalize_debts(rows: &[DebtRow]) -> Result<Vec<Debt>> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut debts = Vec::with_capacity(rows.len());

    for (row_index, row) in rows.iter().enumerate() {
        let name = row
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(PayoffError::EmptyDebtName { row: row_index })?
            .to_string();

        if !seen.insert(name.clone()) {
            return Err(PayoffError::DuplicateDebtName(name));
        }

        let rate = coerce(&name, Column::Rate, row.rate.as_ref())?;
        let balance = coerce(&name, Column::Balance, row.balance.as_ref())?;
        let payment = coerce(&name, Column::Payment, row.payment.as_ref())?;
        let extra = coerce(&name, Column::Extra, row.extra.as_ref())?;

        debts.push(Debt {
            id: DebtId(row_index),
            name,
            balance,
            rate,
            payment,
            extra,
        });
    }

    Ok(debts)
}

fn coerce(name: &str, column: Column, field: Option<&NumericField>) -> Result<f64> {
    let value = match field {
        None => return Ok(0.0),
        Some(NumericField::Number(value)) => Some(*value),
        Some(NumericField::Text(text)) => parse_loose(text, column),
        Some(NumericField::Other(_)) => None,
    };

    let Some(value) = value else {
        warn!(debt = name, column = column.label(), "non-numeric value coerced to 0.0");
        return Ok(0.0);
    };

    if !value.is_finite() {
        return Err(PayoffError::InvalidDebt {
            name: name.to_string(),
            message: format!("{} must be finite", column.label()),
        });
    }
    if value < 0.0 {
        return Err(PayoffError::InvalidDebt {
            name: name.to_string(),
            message: format!("{} must be >= 0, got {value}", column.label()),
        });
    }
    Ok(value)
}

/// Accepts spreadsheet-style text such as "$1,250.50" or, for rates, "19.9%".
fn parse_loose(text: &str, column: Column) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (body, percent) = match trimmed.strip_suffix('%') {
        Some(body) if column == Column::Rate => (body.trim_end(), true),
        Some(_) => return None,
        None => (trimmed, false),
    };

    // "-$5" and "$-5" both mean minus five
    let (sign, unsigned) = match body.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, body),
    };
    let cleaned: String = unsigned
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if sign < 0.0 && cleaned.starts_with(['-', '+']) {
        return None;
    }
    let value = sign * cleaned.parse::<f64>().ok()?;
    Some(if percent { value / 100.0 } else { value })
}

pub fn portfolio_overview(debts: &[Debt]) -> PortfolioOverview {
    let total_balance = debts.iter().map(|d| d.balance).sum();
    let total_monthly_payment = debts.iter().map(|d| d.payment).sum();
    let average_rate = if debts.is_empty() {
        0.0
    } else {
        debts.iter().map(|d| d.rate).sum::<f64>() / debts.len() as f64
    };

    PortfolioOverview {
        debt_count: debts.len(),
        total_balance,
        average_rate,
        total_monthly_payment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: f64) -> Option<NumericField> {
        Some(NumericField::Number(value))
    }

    fn text(value: &str) -> Option<NumericField> {
        Some(NumericField::Text(value.to_string()))
    }

    fn row(name: &str) -> DebtRow {
        DebtRow {
            name: Some(name.to_string()),
            ..DebtRow::default()
        }
    }

    #[test]
    fn missing_and_garbage_numbers_become_zero() {
        let mut card = row("Card");
        card.balance = text("n/a");
        card.rate = None;
        card.payment = text("   ");
        card.extra = number(15.0);

        let debts = normalize_debts(&[card]).expect("row is recoverable");
        assert_eq!(debts[0].balance, 0.0);
        assert_eq!(debts[0].rate, 0.0);
        assert_eq!(debts[0].payment, 0.0);
        assert_eq!(debts[0].extra, 15.0);
    }

    #[test]
    fn spreadsheet_text_is_parsed() {
        let mut loan = row("Auto");
        loan.balance = text("$12,500.75");
        loan.rate = text("6.5%");
        loan.payment = text(" 310 ");

        let debts = normalize_debts(&[loan]).expect("valid row");
        assert!((debts[0].balance - 12_500.75).abs() < 1e-9);
        assert!((debts[0].rate - 0.065).abs() < 1e-12);
        assert!((debts[0].payment - 310.0).abs() < 1e-9);
    }

    #[test]
    fn percent_suffix_only_applies_to_rate() {
        let mut loan = row("Auto");
        loan.balance = text("50%");
        let debts = normalize_debts(&[loan]).expect("coerced, not rejected");
        assert_eq!(debts[0].balance, 0.0);
    }

    #[test]
    fn negative_balance_is_rejected() {
        let mut card = row("Card");
        card.balance = number(-10.0);
        let err = normalize_debts(&[card]).expect_err("negative balance");
        assert!(matches!(err, PayoffError::InvalidDebt { ref name, .. } if name == "Card"));
        assert!(err.to_string().contains("Balance"));
    }

    #[test]
    fn blank_and_duplicate_names_are_rejected() {
        let err = normalize_debts(&[row("A"), row("  ")]).expect_err("blank name");
        assert_eq!(err, PayoffError::EmptyDebtName { row: 1 });

        let err = normalize_debts(&[row("A"), row("A")]).expect_err("duplicate");
        assert_eq!(err, PayoffError::DuplicateDebtName("A".to_string()));
    }

    #[test]
    fn ids_follow_input_order() {
        let debts = normalize_debts(&[row("B"), row("A")]).expect("valid");
        assert_eq!(debts[0].id, DebtId(0));
        assert_eq!(debts[1].id, DebtId(1));
        assert_eq!(debts[1].name, "A");
    }

    #[test]
    fn rows_deserialize_from_dashboard_columns() {
        let json = r#"[
          {"Name": "Visa", "Rate": 0.2199, "Balance": "4,200", "Payment": 120, "Extra": null},
          {"name": "Student", "balance": 18000, "rate": "4.5%"}
        ]"#;
        let rows: Vec<DebtRow> = serde_json::from_str(json).expect("rows parse");
        let debts = normalize_debts(&rows).expect("valid");
        assert_eq!(debts[0].name, "Visa");
        assert!((debts[0].balance - 4_200.0).abs() < 1e-9);
        assert_eq!(debts[0].extra, 0.0);
        assert!((debts[1].rate - 0.045).abs() < 1e-12);
        assert_eq!(debts[1].payment, 0.0);
    }

    #[test]
    fn non_scalar_cells_become_zero() {
        let json = r#"[
          {"Name": "A", "Balance": 1000, "Extra": true, "Payment": {"min": 20}, "Rate": [0.1]}
        ]"#;
        let rows: Vec<DebtRow> = serde_json::from_str(json).expect("rows parse");
        let debts = normalize_debts(&rows).expect("coerced, not rejected");
        assert!((debts[0].balance - 1_000.0).abs() < 1e-9);
        assert_eq!(debts[0].extra, 0.0);
        assert_eq!(debts[0].payment, 0.0);
        assert_eq!(debts[0].rate, 0.0);
    }

    #[test]
    fn minus_sign_is_honoured_on_either_side_of_currency_symbol() {
        for spelling in ["-$5", "$-5", "-5"] {
            let mut card = row("Card");
            card.balance = text(spelling);
            let err = normalize_debts(&[card]).expect_err("negative balance");
            assert!(
                matches!(err, PayoffError::InvalidDebt { .. }),
                "{spelling} gave {err:?}"
            );
        }
    }

    #[test]
    fn overview_sums_balances_and_averages_rates() {
        let mut a = row("A");
        a.balance = number(1_000.0);
        a.rate = number(0.10);
        a.payment = number(50.0);
        let mut b = row("B");
        b.balance = number(3_000.0);
        b.rate = number(0.20);
        b.payment = number(75.0);

        let debts = normalize_debts(&[a, b]).expect("valid");
        let overview = portfolio_overview(&debts);
        assert_eq!(overview.debt_count, 2);
        assert!((overview.total_balance - 4_000.0).abs() < 1e-9);
        assert!((overview.average_rate - 0.15).abs() < 1e-12);
        assert!((overview.total_monthly_payment - 125.0).abs() < 1e-9);

        let empty = portfolio_overview(&[]);
        assert_eq!(empty.average_rate, 0.0);
    }
}
