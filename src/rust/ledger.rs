//! Expense records and spending summaries built on the categorizer.

use std::collections::BTreeMap;

use log::debug;

use crate::category::ParseCategoryError;
use crate::categorizer::Categorizer;
use crate::Category;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpenseError {
    #[error("Description is required")]
    EmptyDescription,
    #[error("Please enter a valid positive amount (got '{0}')")]
    InvalidAmount(String),
    #[error(transparent)]
    UnknownCategory(#[from] ParseCategoryError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub description: String,
    pub amount: f64,
    pub category: Category,
}

impl Expense {
    /// Validates user input and resolves the category.
    ///
    /// A non-blank `manual_category` must name one of the five categories
    /// and takes precedence; otherwise the categorizer decides.
    pub fn record(
        categorizer: &Categorizer,
        description: &str,
        amount: &str,
        manual_category: Option<&str>,
    ) -> Result<Self, ExpenseError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ExpenseError::EmptyDescription);
        }
        let amount = parse_amount(amount)?;

        let category = match manual_category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(manual) => manual.parse::<Category>()?,
            None => categorizer.predict(description).category(),
        };
        debug!("Recorded '{}' ({:.2}) as {}", description, amount, category);

        Ok(Self {
            description: description.to_string(),
            amount,
            category,
        })
    }
}

fn parse_amount(amount: &str) -> Result<f64, ExpenseError> {
    match amount.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ExpenseError::InvalidAmount(amount.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: usize,
}

/// Total spent and per-category breakdown, largest total first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpendingSummary {
    pub total_spent: f64,
    pub by_category: Vec<CategoryTotal>,
}

impl SpendingSummary {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let mut totals: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
        for expense in expenses {
            let entry = totals.entry(expense.category).or_insert((0.0, 0));
            entry.0 += expense.amount;
            entry.1 += 1;
        }

        let mut by_category: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, (total, count))| CategoryTotal { category, total, count })
            .collect();
        // stable sort keeps category order among equal totals
        by_category.sort_by(|a, b| b.total.total_cmp(&a.total));

        Self {
            total_spent: expenses.iter().map(|e| e.amount).sum(),
            by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CategorizerConfig;

    fn expense(description: &str, amount: f64, category: Category) -> Expense {
        Expense { description: description.into(), amount, category }
    }

    #[test]
    fn test_amount_validation() {
        assert_eq!(parse_amount(" 12.50 "), Ok(12.5));
        for bad in ["", "abc", "0", "-3", "NaN", "inf"] {
            assert!(matches!(parse_amount(bad), Err(ExpenseError::InvalidAmount(_))), "{}", bad);
        }
    }

    #[test]
    fn test_record_resolves_category() {
        let dir = tempfile::tempdir().unwrap();
        let categorizer = Categorizer::new(CategorizerConfig::with_model_path(dir.path().join("m.bin"))).unwrap();

        let manual = Expense::record(&categorizer, "pizza night", "20", Some("entertainment")).unwrap();
        assert_eq!(manual.category, Category::Entertainment);

        let predicted = Expense::record(&categorizer, " pizza night ", "20", Some("  ")).unwrap();
        assert_eq!(predicted.category, Category::Food);
        assert_eq!(predicted.description, "pizza night");

        assert_eq!(
            Expense::record(&categorizer, "   ", "20", None),
            Err(ExpenseError::EmptyDescription)
        );
        assert!(matches!(
            Expense::record(&categorizer, "pizza", "20", Some("groceries")),
            Err(ExpenseError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_summary_ordering() {
        let summary = SpendingSummary::from_expenses(&[
            expense("rent payment", 1200.0, Category::Bills),
            expense("pizza", 15.0, Category::Food),
            expense("coffee", 5.0, Category::Food),
            expense("movie tickets", 20.0, Category::Entertainment),
        ]);
        assert_eq!(summary.total_spent, 1240.0);
        let order: Vec<_> = summary.by_category.iter().map(|c| (c.category, c.count)).collect();
        assert_eq!(
            order,
            vec![(Category::Bills, 1), (Category::Food, 2), (Category::Entertainment, 1)]
        );
        assert_eq!(summary.by_category[1].total, 20.0);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(SpendingSummary::from_expenses(&[]), SpendingSummary::default());
    }
}
