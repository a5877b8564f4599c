use serde::{Deserialize, Serialize};

use super::LovItem;

/// Sort column for the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortColumn {
    Name,
    Email,
    IncomeKg,
    ExpenseKg,
}

/// A single income or expense entry recorded by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(default)]
    pub item: Option<LovItem>,
    #[serde(rename = "totalQuantityKg", default)]
    pub total_quantity_kg: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// A registered user with their recapitulated transaction history,
/// as returned by the `/rekaptulasi/user-inputs` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecap {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub items: Vec<LovItem>,
    #[serde(default)]
    pub incomes: Vec<Transaction>,
    #[serde(default)]
    pub expenses: Vec<Transaction>,
}

impl UserRecap {
    /// Total income quantity across all entries, in kilograms.
    pub fn total_income_kg(&self) -> f64 {
        Self::sum_kg(&self.incomes)
    }

    /// Total expense quantity across all entries, in kilograms.
    pub fn total_expense_kg(&self) -> f64 {
        Self::sum_kg(&self.expenses)
    }

    fn sum_kg(transactions: &[Transaction]) -> f64 {
        transactions
            .iter()
            .filter_map(|t| t.total_quantity_kg)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_recap() {
        let json = r#"{
            "id": 3,
            "name": "Siti",
            "email": "siti@example.com",
            "items": [{"id": 1, "name": "Bayam", "type": "VEGETABLES"}],
            "incomes": [
                {"id": 10, "item": {"id": 1, "name": "Bayam", "type": "VEGETABLES"},
                 "totalQuantityKg": 12.5, "note": "pagi", "createdAt": "2025-06-01T08:30:00Z"},
                {"id": 11, "totalQuantityKg": 2.5}
            ],
            "expenses": [
                {"id": 12, "totalQuantityKg": 4.0, "note": null}
            ]
        }"#;

        let user: UserRecap = serde_json::from_str(json).unwrap();
        assert_eq!(user.name, "Siti");
        assert_eq!(user.items.len(), 1);
        assert_eq!(user.total_income_kg(), 15.0);
        assert_eq!(user.total_expense_kg(), 4.0);
    }

    #[test]
    fn test_totals_ignore_missing_quantities() {
        let json = r#"{"id": 1, "name": "Budi", "email": "budi@example.com",
                       "incomes": [{"id": 2}], "expenses": []}"#;
        let user: UserRecap = serde_json::from_str(json).unwrap();
        assert_eq!(user.total_income_kg(), 0.0);
        assert_eq!(user.total_expense_kg(), 0.0);
    }
}
