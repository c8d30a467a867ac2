use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{
    BranchId, DomainError, DomainResult, EmployeeId, EmployeePayrollId, Entity, PayrollItemId,
    PayrollPeriodId, UserId,
};

/// Back-office login. Batch runs are attributed to one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl UserAccount {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Contract kind; payroll items can be restricted to some of these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "FT")]
    FullTime,
    #[serde(rename = "PT")]
    PartTime,
    #[serde(rename = "TEMP")]
    Temporary,
    #[serde(rename = "SEA")]
    Seasonal,
    #[serde(rename = "INT")]
    Intern,
    #[serde(rename = "CASUAL")]
    Casual,
    #[serde(rename = "CONTRACT")]
    Contract,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub branch_id: Option<BranchId>,
    pub employment_type: EmploymentType,
    /// Resolved pay rate for one period. `None` means nothing is configured.
    pub basic_rate: Option<Decimal>,
    pub is_active: bool,
}

impl Employee {
    pub fn new(name: impl Into<String>, employment_type: EmploymentType) -> Self {
        Self {
            id: EmployeeId::new(),
            name: name.into(),
            branch_id: None,
            employment_type,
            basic_rate: None,
            is_active: true,
        }
    }

    pub fn at_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.basic_rate = Some(rate);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Draft,
    Processing,
    Completed,
    Closed,
}

impl PeriodStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodStatus::Draft => "draft",
            PeriodStatus::Processing => "processing",
            PeriodStatus::Completed => "completed",
            PeriodStatus::Closed => "closed",
        }
    }
}

impl core::fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pay period, company-wide or scoped to one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    pub id: PayrollPeriodId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub branch_id: Option<BranchId>,
    pub status: PeriodStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub last_modified_by: Option<UserId>,
}

impl PayrollPeriod {
    /// New draft period. Fails when `start_date` is after `end_date`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> DomainResult<Self> {
        let period = Self {
            id: PayrollPeriodId::new(),
            start_date,
            end_date,
            branch_id: None,
            status: PeriodStatus::Draft,
            notes: String::new(),
            last_modified_by: None,
        };
        period.validate()?;
        Ok(period)
    }

    pub fn for_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn with_status(mut self, status: PeriodStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.start_date > self.end_date {
            return Err(DomainError::validation(
                "payroll period start date cannot be after end date",
            ));
        }
        Ok(())
    }

    /// Active employees, restricted to the period's branch when it has one.
    pub fn covers(&self, employee: &Employee) -> bool {
        employee.is_active
            && self
                .branch_id
                .is_none_or(|branch| employee.branch_id == Some(branch))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Calculated,
    Approved,
    Paid,
    Cancelled,
}

/// One employee's pay for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayroll {
    pub id: EmployeePayrollId,
    pub employee_id: EmployeeId,
    pub period_id: PayrollPeriodId,
    pub basic_salary: Decimal,
    pub gross_pay: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
    pub status: PayrollStatus,
    pub created_by: Option<UserId>,
    pub last_modified_by: Option<UserId>,
    #[serde(default)]
    pub calculated_at: Option<DateTime<Utc>>,
}

impl EmployeePayroll {
    pub fn draft(employee_id: EmployeeId, period_id: PayrollPeriodId, author: UserId) -> Self {
        Self {
            id: EmployeePayrollId::new(),
            employee_id,
            period_id,
            basic_salary: Decimal::ZERO,
            gross_pay: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            net_pay: Decimal::ZERO,
            status: PayrollStatus::Draft,
            created_by: Some(author),
            last_modified_by: Some(author),
            calculated_at: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollItemType {
    Salary,
    Allowance,
    Deduction,
    Tax,
    Bonus,
    Overtime,
}

impl PayrollItemType {
    pub fn is_earning(self) -> bool {
        matches!(self, PayrollItemType::Allowance | PayrollItemType::Bonus)
    }

    pub fn is_deduction(self) -> bool {
        matches!(self, PayrollItemType::Deduction | PayrollItemType::Tax)
    }
}

/// Allowance, bonus, deduction or tax definition applied during calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollItem {
    pub id: PayrollItemId,
    pub name: String,
    pub item_type: PayrollItemType,
    #[serde(default)]
    pub amount: Decimal,
    /// Percent of basic salary, used when `is_percentage` is set.
    #[serde(default)]
    pub percentage: Decimal,
    #[serde(default)]
    pub is_percentage: bool,
    /// Empty means every employment type.
    #[serde(default)]
    pub applicable_employment_types: Vec<EmploymentType>,
    /// `None` means company-wide.
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    pub is_active: bool,
}

impl PayrollItem {
    pub fn fixed(name: impl Into<String>, item_type: PayrollItemType, amount: Decimal) -> Self {
        Self {
            id: PayrollItemId::new(),
            name: name.into(),
            item_type,
            amount,
            percentage: Decimal::ZERO,
            is_percentage: false,
            applicable_employment_types: Vec::new(),
            branch_id: None,
            is_active: true,
        }
    }

    pub fn percent(name: impl Into<String>, item_type: PayrollItemType, percentage: Decimal) -> Self {
        Self {
            percentage,
            is_percentage: true,
            ..Self::fixed(name, item_type, Decimal::ZERO)
        }
    }

    pub fn only_for(mut self, types: impl IntoIterator<Item = EmploymentType>) -> Self {
        self.applicable_employment_types = types.into_iter().collect();
        self
    }

    pub fn at_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn applies_to(&self, employee: &Employee) -> bool {
        self.is_active
            && (self.applicable_employment_types.is_empty()
                || self
                    .applicable_employment_types
                    .contains(&employee.employment_type))
            && self.branch_id.is_none_or(|b| employee.branch_id == Some(b))
    }

    pub fn amount_for(&self, basic_salary: Decimal) -> Decimal {
        if self.is_percentage {
            basic_salary * self.percentage / Decimal::ONE_HUNDRED
        } else {
            self.amount
        }
    }
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> EmployeeId {
        self.id
    }
}

impl Entity for PayrollPeriod {
    type Id = PayrollPeriodId;

    fn id(&self) -> PayrollPeriodId {
        self.id
    }
}

impl Entity for PayrollItem {
    type Id = PayrollItemId;

    fn id(&self) -> PayrollItemId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn period_rejects_inverted_dates() {
        assert!(PayrollPeriod::new(date(30), date(1)).is_err());
        assert!(PayrollPeriod::new(date(1), date(1)).is_ok());
    }

    #[test]
    fn branch_period_only_covers_its_branch() {
        let branch = BranchId::new();
        let period = PayrollPeriod::new(date(1), date(30)).unwrap().for_branch(branch);

        let here = Employee::new("Ana", EmploymentType::FullTime).at_branch(branch);
        let elsewhere = Employee::new("Bo", EmploymentType::FullTime).at_branch(BranchId::new());
        let unassigned = Employee::new("Cy", EmploymentType::FullTime);

        assert!(period.covers(&here));
        assert!(!period.covers(&elsewhere));
        assert!(!period.covers(&unassigned));
        assert!(!period.covers(&here.clone().inactive()));
    }

    #[test]
    fn item_scope_by_type_and_branch() {
        let branch = BranchId::new();
        let casual = Employee::new("Dee", EmploymentType::Casual).at_branch(branch);

        let everyone = PayrollItem::fixed("Meal", PayrollItemType::Allowance, dec!(10));
        let full_time_only = everyone.clone().only_for([EmploymentType::FullTime]);
        let other_branch = everyone.clone().at_branch(BranchId::new());
        let mut retired = everyone.clone();
        retired.is_active = false;

        assert!(everyone.applies_to(&casual));
        assert!(!full_time_only.applies_to(&casual));
        assert!(!other_branch.applies_to(&casual));
        assert!(!retired.applies_to(&casual));
    }

    #[test]
    fn percentage_items_scale_with_basic() {
        let tax = PayrollItem::percent("PAYE", PayrollItemType::Tax, dec!(12.5));
        assert_eq!(tax.amount_for(dec!(2000)), dec!(250));

        let flat = PayrollItem::fixed("Union", PayrollItemType::Deduction, dec!(15));
        assert_eq!(flat.amount_for(dec!(2000)), dec!(15));
    }

    #[test]
    fn employment_types_use_short_codes() {
        assert_eq!(serde_json::to_string(&EmploymentType::FullTime).unwrap(), "\"FT\"");
        assert_eq!(
            serde_json::from_str::<EmploymentType>("\"CASUAL\"").unwrap(),
            EmploymentType::Casual
        );
    }
}
