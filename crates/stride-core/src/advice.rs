//! Goal advice derived from a projection
//!
//! Mirrors the recommendations shown alongside the export: when savings fall
//! short, point at the largest expense categories; otherwise report the surplus.

use serde::Serialize;

use crate::models::Projection;

/// Number of categories listed by default when under-saving
pub const DEFAULT_TOP_CATEGORIES: usize = 3;

/// Fixed income-side suggestions shown when under-saving
pub const INCOME_SUGGESTIONS: &[&str] = &[
    "Side projects or freelancing",
    "Skill development for promotions",
    "Investment returns",
];

/// A category and its monthly-normalized amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GoalAdvice {
    /// Saving less than the goal requires
    Shortfall {
        required: f64,
        current: f64,
        gap: f64,
        top_categories: Vec<CategoryAmount>,
    },
    /// Saving at least what the goal requires
    OnTrack { current: f64, surplus: f64 },
}

impl GoalAdvice {
    pub fn from_projection(projection: &Projection, top_n: usize) -> Self {
        if projection.is_on_track() {
            return Self::OnTrack {
                current: projection.monthly_savings,
                surplus: -projection.shortfall,
            };
        }

        let top_categories = projection
            .categories_by_amount()
            .into_iter()
            .take(top_n)
            .map(|(category, amount)| CategoryAmount {
                category: category.to_string(),
                amount,
            })
            .collect();

        Self::Shortfall {
            required: projection.required_monthly_savings,
            current: projection.monthly_savings,
            gap: projection.shortfall,
            top_categories,
        }
    }

    /// Human-readable lines, one per paragraph or bullet
    pub fn lines(&self, target_amount: f64, years: f64) -> Vec<String> {
        match self {
            Self::Shortfall {
                required,
                current,
                gap,
                top_categories,
            } => {
                let mut lines = vec![
                    "Current Situation:".to_string(),
                    format!(
                        "You need to save {}/month to reach {} in {} years.",
                        format_amount(*required),
                        format_amount(target_amount),
                        format_years(years)
                    ),
                    format!(
                        "Currently, you're saving {}/month.",
                        format_amount(*current)
                    ),
                    format!(
                        "You need to increase your savings by {}/month.",
                        format_amount(*gap)
                    ),
                    String::new(),
                    "Recommended Actions:".to_string(),
                    "1. Review your top expense categories:".to_string(),
                ];
                for c in top_categories {
                    lines.push(format!(
                        "   - {}: {}/month",
                        c.category,
                        format_amount(c.amount)
                    ));
                }
                lines.push(String::new());
                lines.push("2. Consider increasing your income through:".to_string());
                for suggestion in INCOME_SUGGESTIONS {
                    lines.push(format!("   - {}", suggestion));
                }
                lines
            }
            Self::OnTrack { current, surplus } => vec![
                "Congratulations!".to_string(),
                format!(
                    "You're saving {}/month, which is {} more than required.",
                    format_amount(*current),
                    format_amount(*surplus)
                ),
                "Keep up the great work and stay consistent with your savings.".to_string(),
            ],
        }
    }
}

/// Format with two decimals and comma thousands separators (e.g. `-1,234.50`)
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Whole years without decimals, otherwise one decimal place
pub fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{}", years as u64)
    } else {
        format!("{:.1}", years)
    }
}
