//! Request and projection types shared by the engine, exporter, server and CLI

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Billing cycle of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Charged every month
    Monthly,
    /// Charged once every two months
    Bimonthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Bimonthly => "bimonthly",
        }
    }

    /// Number of months one charge covers
    pub fn divisor(&self) -> f64 {
        match self {
            Self::Monthly => 1.0,
            Self::Bimonthly => 2.0,
        }
    }

    /// Spread an amount billed at this frequency evenly over its cycle
    pub fn monthly_equivalent(&self, amount: f64) -> f64 {
        amount / self.divisor()
    }

    pub fn all() -> &'static [Frequency] {
        &[Self::Monthly, Self::Bimonthly]
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "bimonthly" => Ok(Self::Bimonthly),
            _ => Err(format!("Unsupported frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recurring expense as entered by the user.
///
/// `frequency` stays a raw string so that an unknown billing cycle can be
/// reported against the entry that carried it instead of failing the whole
/// request at deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    /// Amount per billing cycle (not yet normalized)
    pub amount: f64,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

fn default_frequency() -> String {
    Frequency::Monthly.as_str().to_string()
}

impl ExpenseEntry {
    pub fn new(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        amount: f64,
        frequency: Frequency,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            amount,
            frequency: frequency.as_str().to_string(),
        }
    }
}

/// Body of a projection or export request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub monthly_income: f64,
    #[serde(default)]
    pub expenses: Vec<ExpenseEntry>,
}

impl ProjectionRequest {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Normalized monthly view of income, expenses and goal progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub monthly_income: f64,
    /// Monthly-normalized total per category
    pub expenses_by_category: BTreeMap<String, f64>,
    pub total_expenses: f64,
    /// Income minus expenses; negative when overspending
    pub monthly_savings: f64,
    pub target_amount: f64,
    pub horizon_months: u32,
    pub years: f64,
    pub required_monthly_savings: f64,
    /// Required minus actual savings; positive means under-saving
    pub shortfall: f64,
}

/// One month of the cumulative savings projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthPoint {
    /// 1-based month number
    pub month: u32,
    pub monthly_savings: f64,
    pub cumulative_savings: f64,
    /// Cumulative savings as a percentage of the target
    pub progress_percent: f64,
}

impl Projection {
    /// Savings meet or exceed what the goal requires
    pub fn is_on_track(&self) -> bool {
        self.shortfall <= 0.0
    }

    /// Categories ordered by amount, largest first (ties by name)
    pub fn categories_by_amount(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .expenses_by_category
            .iter()
            .map(|(name, amount)| (name.as_str(), *amount))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    /// Percentage of total expenses spent in `category`
    pub fn category_share(&self, category: &str) -> Option<f64> {
        let amount = self.expenses_by_category.get(category)?;
        if self.total_expenses > 0.0 {
            Some(amount / self.total_expenses * 100.0)
        } else {
            Some(0.0)
        }
    }

    /// Month-by-month accumulation at the current savings rate over the horizon
    pub fn timeline(&self) -> Vec<MonthPoint> {
        let mut cumulative = 0.0;
        (1..=self.horizon_months)
            .map(|month| {
                cumulative += self.monthly_savings;
                let progress_percent = if self.target_amount > 0.0 {
                    cumulative / self.target_amount * 100.0
                } else {
                    0.0
                };
                MonthPoint {
                    month,
                    monthly_savings: self.monthly_savings,
                    cumulative_savings: cumulative,
                    progress_percent,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_projection() -> Projection {
        let mut expenses_by_category = BTreeMap::new();
        expenses_by_category.insert("Home".to_string(), 500.0);
        expenses_by_category.insert("Savings".to_string(), 4000.0);
        expenses_by_category.insert("Bike".to_string(), 500.0);
        Projection {
            monthly_income: 10_000.0,
            expenses_by_category,
            total_expenses: 5000.0,
            monthly_savings: 5000.0,
            target_amount: 60_000.0,
            horizon_months: 12,
            years: 1.0,
            required_monthly_savings: 5000.0,
            shortfall: 0.0,
        }
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("monthly".parse::<Frequency>(), Ok(Frequency::Monthly));
        assert_eq!(" Bimonthly ".parse::<Frequency>(), Ok(Frequency::Bimonthly));
        assert!("weekly".parse::<Frequency>().is_err());
        assert!("".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_monthly_equivalent() {
        assert_eq!(Frequency::Monthly.monthly_equivalent(1200.0), 1200.0);
        assert_eq!(Frequency::Bimonthly.monthly_equivalent(1000.0), 500.0);
    }

    #[test]
    fn test_expense_entry_defaults() {
        let entry: ExpenseEntry =
            serde_json::from_str(r#"{"category": "Home", "amount": 300}"#).unwrap();
        assert_eq!(entry.frequency, "monthly");
        assert_eq!(entry.subcategory, "");
    }

    #[test]
    fn test_request_from_json() {
        let request = ProjectionRequest::from_json(
            r#"{"monthly_income": 92000, "expenses": [
                {"category": "Savings", "subcategory": "SIP", "amount": 4000, "frequency": "monthly"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(request.monthly_income, 92000.0);
        assert_eq!(request.expenses.len(), 1);
        assert_eq!(request.expenses[0].subcategory, "SIP");
    }

    #[test]
    fn test_request_from_json_rejects_garbage() {
        assert!(ProjectionRequest::from_json("{not json").is_err());
    }

    #[test]
    fn test_categories_by_amount_breaks_ties_by_name() {
        let projection = sample_projection();
        let ranked = projection.categories_by_amount();
        assert_eq!(
            ranked,
            vec![("Savings", 4000.0), ("Bike", 500.0), ("Home", 500.0)]
        );
    }

    #[test]
    fn test_category_share() {
        let projection = sample_projection();
        assert_eq!(projection.category_share("Savings"), Some(80.0));
        assert_eq!(projection.category_share("Missing"), None);
    }

    #[test]
    fn test_category_share_zero_total() {
        let mut projection = sample_projection();
        projection.total_expenses = 0.0;
        assert_eq!(projection.category_share("Home"), Some(0.0));
    }

    #[test]
    fn test_timeline_accumulates() {
        let projection = sample_projection();
        let timeline = projection.timeline();
        assert_eq!(timeline.len(), 12);
        assert_eq!(timeline[0].month, 1);
        assert_eq!(timeline[0].cumulative_savings, 5000.0);
        let last = timeline.last().unwrap();
        assert_eq!(last.month, 12);
        assert_eq!(last.cumulative_savings, 60_000.0);
        assert!((last.progress_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_timeline_negative_savings() {
        let mut projection = sample_projection();
        projection.monthly_savings = -100.0;
        let timeline = projection.timeline();
        assert!(timeline.iter().all(|p| p.cumulative_savings < 0.0));
        assert!(timeline[11].progress_percent < 0.0);
    }

    #[test]
    fn test_is_on_track() {
        let mut projection = sample_projection();
        assert!(projection.is_on_track());
        projection.shortfall = 0.01;
        assert!(!projection.is_on_track());
    }
}
