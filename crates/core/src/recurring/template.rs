//! Template expansion.
//!
//! Turns a definition's template lines into a ledger line set. Tax rates are
//! resolved through the injected lookup at execution time and frozen into
//! the generated lines; they are never recomputed later.

use rust_decimal::Decimal;

use super::error::RecurringError;
use super::types::TemplateLine;
use crate::ledger::{LedgerError, LineInput, LineSide};
use tally_shared::types::{RecurringDefinitionId, TaxRateId, gross_up};

/// Expand template lines into postable ledger lines.
///
/// Tax-bearing lines are grossed up by the resolved rate and carry the rate
/// as a frozen snapshot. Amount signs are validated here so a malformed
/// template fails before any posting is attempted.
///
/// # Errors
///
/// - `EmptyTemplate` when the definition has no lines.
/// - `Ledger(ZeroAmount | NegativeAmount)` for malformed base amounts.
/// - Whatever `rate_for` returns for an unresolvable tax rate.
pub fn expand_template<R>(
    definition_id: RecurringDefinitionId,
    template: &[TemplateLine],
    rate_for: R,
) -> Result<Vec<LineInput>, RecurringError>
where
    R: Fn(TaxRateId) -> Result<Decimal, RecurringError>,
{
    if template.is_empty() {
        return Err(RecurringError::EmptyTemplate(definition_id.into_inner()));
    }

    let mut lines = Vec::with_capacity(template.len());
    for line in template {
        if line.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount.into());
        }
        if line.amount == Decimal::ZERO {
            return Err(LedgerError::ZeroAmount.into());
        }

        let (amount, tax_rate) = match line.tax_rate_id {
            Some(tax_rate_id) => {
                let rate = rate_for(tax_rate_id)?;
                (gross_up(line.amount, rate), Some(rate))
            }
            None => (line.amount, None),
        };

        let mut input = LineInput::new(line.account_id, line.side, amount);
        input.tax_rate = tax_rate;
        input.memo.clone_from(&line.memo);
        lines.push(input);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::AccountId;

    fn template_line(side: LineSide, amount: Decimal, tax: Option<TaxRateId>) -> TemplateLine {
        TemplateLine {
            account_id: AccountId::new(),
            side,
            amount,
            tax_rate_id: tax,
            memo: Some("Monthly depreciation".to_string()),
        }
    }

    fn no_tax(_: TaxRateId) -> Result<Decimal, RecurringError> {
        panic!("rate lookup must not be called for untaxed lines");
    }

    #[test]
    fn test_expand_without_tax() {
        let template = vec![
            template_line(LineSide::Debit, dec!(250.00), None),
            template_line(LineSide::Credit, dec!(250.00), None),
        ];

        let lines = expand_template(RecurringDefinitionId::new(), &template, no_tax).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].debit, dec!(250.00));
        assert_eq!(lines[1].credit, dec!(250.00));
        assert_eq!(lines[0].tax_rate, None);
        assert_eq!(lines[0].memo.as_deref(), Some("Monthly depreciation"));
    }

    #[test]
    fn test_expand_freezes_tax_rate() {
        let tax_id = TaxRateId::new();
        let template = vec![
            template_line(LineSide::Debit, dec!(100.00), Some(tax_id)),
            template_line(LineSide::Credit, dec!(100.00), Some(tax_id)),
        ];

        let lines = expand_template(RecurringDefinitionId::new(), &template, |id| {
            assert_eq!(id, tax_id);
            Ok(dec!(0.10))
        })
        .unwrap();

        // Both sides grossed up symmetrically; the set stays balanced
        assert_eq!(lines[0].debit, dec!(110.00));
        assert_eq!(lines[1].credit, dec!(110.00));
        assert_eq!(lines[0].tax_rate, Some(dec!(0.10)));
        assert_eq!(lines[1].tax_rate, Some(dec!(0.10)));
    }

    #[test]
    fn test_expand_empty_template_rejected() {
        let result = expand_template(RecurringDefinitionId::new(), &[], no_tax);
        assert!(matches!(result, Err(RecurringError::EmptyTemplate(_))));
    }

    #[test]
    fn test_expand_zero_amount_rejected() {
        let template = vec![
            template_line(LineSide::Debit, dec!(0), None),
            template_line(LineSide::Credit, dec!(100.00), None),
        ];
        let result = expand_template(RecurringDefinitionId::new(), &template, no_tax);
        assert!(matches!(
            result,
            Err(RecurringError::Ledger(LedgerError::ZeroAmount))
        ));
    }

    #[test]
    fn test_expand_negative_amount_rejected() {
        let template = vec![
            template_line(LineSide::Debit, dec!(-5.00), None),
            template_line(LineSide::Credit, dec!(100.00), None),
        ];
        let result = expand_template(RecurringDefinitionId::new(), &template, no_tax);
        assert!(matches!(
            result,
            Err(RecurringError::Ledger(LedgerError::NegativeAmount))
        ));
    }

    #[test]
    fn test_expand_tax_lookup_failure_propagates() {
        let tax_id = TaxRateId::new();
        let template = vec![
            template_line(LineSide::Debit, dec!(100.00), Some(tax_id)),
            template_line(LineSide::Credit, dec!(100.00), None),
        ];

        let result = expand_template(RecurringDefinitionId::new(), &template, |id: TaxRateId| {
            Err(RecurringError::TaxLookup {
                tax_rate_id: id.into_inner(),
                message: "provider unavailable".to_string(),
            })
        });

        assert!(matches!(result, Err(RecurringError::TaxLookup { .. })));
    }
}
