//! Payroll persistence seam and its in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use tillpoint_core::{EmployeeId, PayrollPeriodId, UserId};

use crate::error::{PayrollError, PayrollResult};
use crate::model::{
    Employee, EmployeePayroll, PayrollItem, PayrollPeriod, PeriodStatus, UserAccount,
};

/// Writes available inside [`PayrollStore::transaction`].
///
/// Nothing written through a `PayrollTx` is visible outside it until the
/// transaction commits.
pub trait PayrollTx {
    /// Existing payroll for `(employee, period)`, or a new draft authored by
    /// `author`.
    fn get_or_create_payroll(
        &mut self,
        employee_id: EmployeeId,
        period_id: PayrollPeriodId,
        author: UserId,
    ) -> PayrollResult<EmployeePayroll>;

    fn save_payroll(&mut self, payroll: EmployeePayroll) -> PayrollResult<()>;

    fn save_period(&mut self, period: PayrollPeriod) -> PayrollResult<()>;
}

/// Work run inside one transaction.
pub type TxWork<'a> = dyn FnMut(&mut dyn PayrollTx) -> PayrollResult<()> + 'a;

pub trait PayrollStore: Send + Sync {
    fn user_by_email(&self, email: &str) -> Option<UserAccount>;
    fn period(&self, id: PayrollPeriodId) -> Option<PayrollPeriod>;

    /// Draft period with the latest start date.
    fn latest_draft_period(&self) -> Option<PayrollPeriod>;

    fn employees(&self) -> Vec<Employee>;
    fn payroll_items(&self) -> Vec<PayrollItem>;
    fn payroll(&self, employee_id: EmployeeId, period_id: PayrollPeriodId)
    -> Option<EmployeePayroll>;

    /// Run `work` atomically: every write commits when it returns `Ok`, none
    /// do when it returns `Err` (which is passed through).
    fn transaction(&self, work: &mut TxWork<'_>) -> PayrollResult<()>;
}

impl<S> PayrollStore for Arc<S>
where
    S: PayrollStore + ?Sized,
{
    fn user_by_email(&self, email: &str) -> Option<UserAccount> {
        (**self).user_by_email(email)
    }

    fn period(&self, id: PayrollPeriodId) -> Option<PayrollPeriod> {
        (**self).period(id)
    }

    fn latest_draft_period(&self) -> Option<PayrollPeriod> {
        (**self).latest_draft_period()
    }

    fn employees(&self) -> Vec<Employee> {
        (**self).employees()
    }

    fn payroll_items(&self) -> Vec<PayrollItem> {
        (**self).payroll_items()
    }

    fn payroll(
        &self,
        employee_id: EmployeeId,
        period_id: PayrollPeriodId,
    ) -> Option<EmployeePayroll> {
        (**self).payroll(employee_id, period_id)
    }

    fn transaction(&self, work: &mut TxWork<'_>) -> PayrollResult<()> {
        (**self).transaction(work)
    }
}

/// Everything the payroll batch reads and writes, as a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollDataset {
    #[serde(default)]
    pub users: Vec<UserAccount>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub periods: Vec<PayrollPeriod>,
    #[serde(default)]
    pub payroll_items: Vec<PayrollItem>,
    #[serde(default)]
    pub employee_payrolls: Vec<EmployeePayroll>,
}

impl PayrollDataset {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// In-memory payroll store for tests, dev and the file-backed CLI.
///
/// - Transactions hold the write lock and stage writes until commit
/// - Lock poisoning degrades reads to "no data" and fails transactions
#[derive(Debug, Default)]
pub struct InMemoryPayrollStore {
    inner: RwLock<PayrollDataset>,
}

impl InMemoryPayrollStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: PayrollDataset) -> Self {
        Self {
            inner: RwLock::new(dataset),
        }
    }

    /// Owned copy of the current contents.
    pub fn dataset(&self) -> PayrollDataset {
        match self.inner.read() {
            Ok(inner) => inner.clone(),
            Err(_) => PayrollDataset::default(),
        }
    }

    pub fn insert_user(&self, user: UserAccount) {
        if let Ok(mut inner) = self.inner.write() {
            inner.users.push(user);
        }
    }

    pub fn insert_employee(&self, employee: Employee) {
        if let Ok(mut inner) = self.inner.write() {
            inner.employees.push(employee);
        }
    }

    pub fn insert_period(&self, period: PayrollPeriod) {
        if let Ok(mut inner) = self.inner.write() {
            inner.periods.push(period);
        }
    }

    pub fn insert_item(&self, item: PayrollItem) {
        if let Ok(mut inner) = self.inner.write() {
            inner.payroll_items.push(item);
        }
    }

    pub fn payrolls(&self) -> Vec<EmployeePayroll> {
        match self.inner.read() {
            Ok(inner) => inner.employee_payrolls.clone(),
            Err(_) => vec![],
        }
    }
}

impl PayrollStore for InMemoryPayrollStore {
    fn user_by_email(&self, email: &str) -> Option<UserAccount> {
        let inner = self.inner.read().ok()?;
        inner
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    fn period(&self, id: PayrollPeriodId) -> Option<PayrollPeriod> {
        let inner = self.inner.read().ok()?;
        inner.periods.iter().find(|p| p.id == id).cloned()
    }

    fn latest_draft_period(&self) -> Option<PayrollPeriod> {
        let inner = self.inner.read().ok()?;
        inner
            .periods
            .iter()
            .filter(|p| p.status == PeriodStatus::Draft)
            .max_by_key(|p| (p.start_date, p.id))
            .cloned()
    }

    fn employees(&self) -> Vec<Employee> {
        match self.inner.read() {
            Ok(inner) => inner.employees.clone(),
            Err(_) => vec![],
        }
    }

    fn payroll_items(&self) -> Vec<PayrollItem> {
        match self.inner.read() {
            Ok(inner) => inner.payroll_items.clone(),
            Err(_) => vec![],
        }
    }

    fn payroll(
        &self,
        employee_id: EmployeeId,
        period_id: PayrollPeriodId,
    ) -> Option<EmployeePayroll> {
        let inner = self.inner.read().ok()?;
        inner
            .employee_payrolls
            .iter()
            .find(|p| p.employee_id == employee_id && p.period_id == period_id)
            .cloned()
    }

    fn transaction(&self, work: &mut TxWork<'_>) -> PayrollResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| PayrollError::Store("lock poisoned".to_string()))?;

        let mut tx = StagedTx {
            base: &*inner,
            payrolls: BTreeMap::new(),
            periods: BTreeMap::new(),
        };
        work(&mut tx)?;

        let StagedTx {
            payrolls, periods, ..
        } = tx;
        commit(&mut inner, payrolls, periods);
        Ok(())
    }
}

/// Writes buffered on top of a read-only view of the committed data.
struct StagedTx<'a> {
    base: &'a PayrollDataset,
    payrolls: BTreeMap<(EmployeeId, PayrollPeriodId), EmployeePayroll>,
    periods: BTreeMap<PayrollPeriodId, PayrollPeriod>,
}

impl PayrollTx for StagedTx<'_> {
    fn get_or_create_payroll(
        &mut self,
        employee_id: EmployeeId,
        period_id: PayrollPeriodId,
        author: UserId,
    ) -> PayrollResult<EmployeePayroll> {
        let key = (employee_id, period_id);
        if let Some(staged) = self.payrolls.get(&key) {
            return Ok(staged.clone());
        }
        let existing = self
            .base
            .employee_payrolls
            .iter()
            .find(|p| p.employee_id == employee_id && p.period_id == period_id)
            .cloned();

        let payroll = existing
            .unwrap_or_else(|| EmployeePayroll::draft(employee_id, period_id, author));
        self.payrolls.insert(key, payroll.clone());
        Ok(payroll)
    }

    fn save_payroll(&mut self, payroll: EmployeePayroll) -> PayrollResult<()> {
        self.payrolls
            .insert((payroll.employee_id, payroll.period_id), payroll);
        Ok(())
    }

    fn save_period(&mut self, period: PayrollPeriod) -> PayrollResult<()> {
        if !self.base.periods.iter().any(|p| p.id == period.id) {
            return Err(PayrollError::PeriodNotFound(period.id));
        }
        self.periods.insert(period.id, period);
        Ok(())
    }
}

fn commit(
    data: &mut PayrollDataset,
    payrolls: BTreeMap<(EmployeeId, PayrollPeriodId), EmployeePayroll>,
    periods: BTreeMap<PayrollPeriodId, PayrollPeriod>,
) {
    for (_, payroll) in payrolls {
        match data
            .employee_payrolls
            .iter_mut()
            .find(|p| p.employee_id == payroll.employee_id && p.period_id == payroll.period_id)
        {
            Some(slot) => *slot = payroll,
            None => data.employee_payrolls.push(payroll),
        }
    }
    for (id, period) in periods {
        if let Some(slot) = data.periods.iter_mut().find(|p| p.id == id) {
            *slot = period;
        }
    }
}
