use crate::clock::SimSpeed;
use serde::{Deserialize, Serialize};

/// All player-issued commands. Applied between ticks, never mid-cycle.
/// Variants are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetSpeed { speed: SimSpeed },

    // ── Monetary policy ───────────────────────────
    /// Percent.
    SetInterestRate { rate: f64 },

    // ── Fiscal policy ─────────────────────────────
    SetCorporateTaxRate { rate: f64 },
    SetSalesTaxRate { rate: f64 },
    /// Public spending dial, 0..10.
    SetSpendingLevel { level: f64 },
    /// Book a one-off public works cost against the current year.
    RecordCapitalExpense { amount: f64 },
}

impl PlayerCommand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::SetSpeed { .. } => "set_speed",
            Self::SetInterestRate { .. } => "set_interest_rate",
            Self::SetCorporateTaxRate { .. } => "set_corporate_tax_rate",
            Self::SetSalesTaxRate { .. } => "set_sales_tax_rate",
            Self::SetSpendingLevel { .. } => "set_spending_level",
            Self::RecordCapitalExpense { .. } => "record_capital_expense",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_tagged_json() {
        let cmd: PlayerCommand =
            serde_json::from_str(r#"{"cmd":"set_speed","speed":"fast_forward"}"#).unwrap();
        assert_eq!(cmd, PlayerCommand::SetSpeed { speed: SimSpeed::FastForward });
        let cmd: PlayerCommand =
            serde_json::from_str(r#"{"cmd":"set_interest_rate","rate":7.5}"#).unwrap();
        assert_eq!(cmd.label(), "set_interest_rate");
    }
}
