//! Projection and goal commands

use std::path::Path;

use anyhow::{Context, Result};

use stride_core::advice::{format_amount, format_years, GoalAdvice, DEFAULT_TOP_CATEGORIES};
use stride_core::{GoalConfig, Projection, ValidationError};

use super::{load_engine, read_request};

pub fn cmd_project(config: Option<&Path>, file: &Path, json: bool, check: bool) -> Result<()> {
    let engine = load_engine(config)?;
    let request = read_request(file)?;

    if check {
        let result = engine.validate(request.monthly_income, &request.expenses);
        print!("{}", render_check(request.expenses.len(), &result));
        if let Err(err) = result {
            anyhow::bail!("{} issue(s) found", err.issues().len());
        }
        return Ok(());
    }

    let projection = engine
        .project(&request)
        .context("Projection request rejected")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
    } else {
        print!("{}", render_summary(&projection));
    }

    Ok(())
}

/// "valid" line, or one line per issue
pub fn render_check(
    entries: usize,
    result: &std::result::Result<(), ValidationError>,
) -> String {
    match result {
        Ok(()) => format!("✅ valid ({} expenses)\n", entries),
        Err(err) => {
            let mut out = format!("❌ invalid: {}\n", err.kind());
            for issue in err.issues() {
                out.push_str(&format!("   - {}: {}\n", issue.kind, issue));
            }
            out
        }
    }
}

pub fn cmd_goal(config: Option<&Path>) -> Result<()> {
    let engine = load_engine(config)?;
    print!("{}", render_goal(engine.goal()));
    Ok(())
}

/// Text report: category breakdown, totals, goal status and advice
pub fn render_summary(projection: &Projection) -> String {
    let mut out = String::new();

    out.push_str("📊 Monthly Expenses by Category\n\n");
    if projection.expenses_by_category.is_empty() {
        out.push_str("   No expenses recorded.\n");
    }
    for (category, amount) in projection.categories_by_amount() {
        let share = projection.category_share(category).unwrap_or(0.0);
        out.push_str(&format!(
            "   {:<28} {:>14} {:>6.1}%\n",
            category,
            format_amount(amount),
            share
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "   {:<28} {:>14}\n",
        "Monthly income",
        format_amount(projection.monthly_income)
    ));
    out.push_str(&format!(
        "   {:<28} {:>14}\n",
        "Total expenses",
        format_amount(projection.total_expenses)
    ));
    out.push_str(&format!(
        "   {:<28} {:>14}\n",
        "Monthly savings",
        format_amount(projection.monthly_savings)
    ));
    out.push_str(&format!(
        "   {:<28} {:>14}\n",
        "Required savings",
        format_amount(projection.required_monthly_savings)
    ));
    out.push('\n');

    if projection.is_on_track() {
        out.push_str("✅ On track for the savings goal\n\n");
    } else {
        out.push_str(&format!(
            "⚠️  Short by {}/month\n\n",
            format_amount(projection.shortfall)
        ));
    }

    let advice = GoalAdvice::from_projection(projection, DEFAULT_TOP_CATEGORIES);
    for line in advice.lines(projection.target_amount, projection.years) {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("   {}\n", line));
        }
    }

    out
}

pub fn render_goal(goal: &GoalConfig) -> String {
    format!(
        "🎯 Savings Goal\n   Target: {}\n   Horizon: {} months ({} years)\n   Required: {}/month\n",
        format_amount(goal.target_amount),
        goal.horizon_months,
        format_years(goal.years()),
        format_amount(goal.required_monthly_savings())
    )
}
