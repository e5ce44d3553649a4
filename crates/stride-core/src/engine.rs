//! Expense projection engine
//!
//! Turns monthly income plus a list of expenses into a [`Projection`]:
//! frequencies are normalized to a monthly basis, amounts are grouped by
//! category, and savings are compared against the configured goal.
//!
//! The engine is pure. It does no I/O, keeps no state between calls and never
//! returns a partial projection: every input problem is collected first and
//! reported together as a [`ValidationError`].

use std::collections::BTreeMap;

use crate::error::{ErrorKind, Issue, ValidationError};
use crate::goal::GoalConfig;
use crate::models::{ExpenseEntry, Frequency, Projection, ProjectionRequest};

/// Computes projections against a fixed savings goal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectionEngine {
    goal: GoalConfig,
}

impl ProjectionEngine {
    pub fn new(goal: GoalConfig) -> Self {
        Self { goal }
    }

    pub fn goal(&self) -> &GoalConfig {
        &self.goal
    }

    /// Compute the projection for one request body
    pub fn project(&self, request: &ProjectionRequest) -> Result<Projection, ValidationError> {
        self.compute(request.monthly_income, &request.expenses)
    }

    /// Compute the projection for `monthly_income` and `expenses`
    pub fn compute(
        &self,
        monthly_income: f64,
        expenses: &[ExpenseEntry],
    ) -> Result<Projection, ValidationError> {
        let normalized = normalize(monthly_income, expenses)?;

        let mut expenses_by_category: BTreeMap<String, f64> = BTreeMap::new();
        for (entry, amount) in expenses.iter().zip(&normalized) {
            *expenses_by_category
                .entry(entry.category.clone())
                .or_insert(0.0) += amount;
        }
        let total_expenses: f64 = normalized.iter().sum();

        let monthly_savings = monthly_income - total_expenses;
        let target_amount = self.goal.target_amount;
        let required_monthly_savings = self.goal.required_monthly_savings();
        let shortfall = required_monthly_savings - monthly_savings;

        check_totals(
            &expenses_by_category,
            &[total_expenses, monthly_savings, shortfall],
        )?;

        Ok(Projection {
            monthly_income,
            expenses_by_category,
            total_expenses,
            monthly_savings,
            target_amount,
            horizon_months: self.goal.horizon_months,
            years: self.goal.years(),
            required_monthly_savings,
            shortfall,
        })
    }

    /// Check a request without keeping the projection
    pub fn validate(
        &self,
        monthly_income: f64,
        expenses: &[ExpenseEntry],
    ) -> Result<(), ValidationError> {
        self.compute(monthly_income, expenses).map(|_| ())
    }
}

/// Reject aggregates that overflowed even though every input was finite
fn check_totals(
    expenses_by_category: &BTreeMap<String, f64>,
    totals: &[f64],
) -> Result<(), ValidationError> {
    let overflowed_category = expenses_by_category
        .iter()
        .find(|(_, amount)| !amount.is_finite())
        .map(|(category, _)| category.clone());

    if overflowed_category.is_none() && totals.iter().all(|t| t.is_finite()) {
        return Ok(());
    }

    let issue = Issue {
        kind: ErrorKind::InvalidInput,
        field: "amount",
        index: None,
        category: overflowed_category,
        subcategory: None,
        message: "expense amounts are too large to total".to_string(),
    };
    match ValidationError::from_issues(vec![issue]) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Validate every field and return each entry's monthly-normalized amount,
/// in input order
fn normalize(monthly_income: f64, expenses: &[ExpenseEntry]) -> Result<Vec<f64>, ValidationError> {
    let mut issues = Vec::new();

    if !monthly_income.is_finite() || monthly_income < 0.0 {
        issues.push(Issue {
            kind: ErrorKind::InvalidInput,
            field: "monthly_income",
            index: None,
            category: None,
            subcategory: None,
            message: format!(
                "monthly income must be a non-negative number, got {}",
                monthly_income
            ),
        });
    }

    let mut normalized = Vec::with_capacity(expenses.len());
    for (index, entry) in expenses.iter().enumerate() {
        let issue = |kind, field, message| Issue {
            kind,
            field,
            index: Some(index),
            category: Some(entry.category.clone()),
            subcategory: Some(entry.subcategory.clone()),
            message,
        };

        if entry.category.trim().is_empty() {
            issues.push(issue(
                ErrorKind::InvalidInput,
                "category",
                "category must not be empty".to_string(),
            ));
        }

        if !entry.amount.is_finite() || entry.amount < 0.0 {
            issues.push(issue(
                ErrorKind::InvalidInput,
                "amount",
                format!("amount must be a non-negative number, got {}", entry.amount),
            ));
        }

        match entry.frequency.parse::<Frequency>() {
            Ok(frequency) => normalized.push(frequency.monthly_equivalent(entry.amount)),
            Err(_) => issues.push(issue(
                ErrorKind::UnsupportedFrequency,
                "frequency",
                format!(
                    "unsupported frequency '{}' (expected one of: {})",
                    entry.frequency,
                    Frequency::all()
                        .iter()
                        .map(|f| f.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }

    match ValidationError::from_issues(issues) {
        Some(err) => Err(err),
        None => Ok(normalized),
    }
}
