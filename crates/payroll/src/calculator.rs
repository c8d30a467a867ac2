use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{PayrollError, PayrollResult};
use crate::model::{Employee, PayrollItem};

/// Result of one employee's pay calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayBreakdown {
    pub basic_salary: Decimal,
    pub gross_pay: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
}

pub trait PayrollCalculator: Send + Sync {
    fn calculate(&self, employee: &Employee, items: &[PayrollItem]) -> PayrollResult<PayBreakdown>;
}

/// Basic rate plus earnings, minus deductions and taxes.
///
/// Items are filtered through [`PayrollItem::applies_to`]; percentages are
/// taken of the basic salary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCalculator;

impl PayrollCalculator for StandardCalculator {
    fn calculate(&self, employee: &Employee, items: &[PayrollItem]) -> PayrollResult<PayBreakdown> {
        let basic_salary = employee
            .basic_rate
            .ok_or(PayrollError::MissingRate(employee.id))?;

        let applicable = || items.iter().filter(|item| item.applies_to(employee));

        let earnings: Decimal = applicable()
            .filter(|item| item.item_type.is_earning())
            .map(|item| item.amount_for(basic_salary))
            .sum();
        let total_deductions: Decimal = applicable()
            .filter(|item| item.item_type.is_deduction())
            .map(|item| item.amount_for(basic_salary))
            .sum();

        let gross_pay = basic_salary + earnings;
        Ok(PayBreakdown {
            basic_salary,
            gross_pay,
            total_deductions,
            net_pay: gross_pay - total_deductions,
        })
    }
}

impl<C: PayrollCalculator + ?Sized> PayrollCalculator for std::sync::Arc<C> {
    fn calculate(&self, employee: &Employee, items: &[PayrollItem]) -> PayrollResult<PayBreakdown> {
        (**self).calculate(employee, items)
    }
}
