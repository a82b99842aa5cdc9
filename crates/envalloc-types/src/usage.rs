use chrono::Month;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of monthly values every usage series carries.
pub const MONTHS_PER_YEAR: u8 = 12;

/// A single month's usage amount. `month` is 1-based (January = 1).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyValue {
    pub month: u8,
    pub amount: f64,
}

impl MonthlyValue {
    pub const fn new(month: u8, amount: f64) -> Self {
        Self { month, amount }
    }

    /// Calendar month for this value, or `None` when `month` is outside 1..=12.
    pub fn calendar_month(&self) -> Option<Month> {
        Month::try_from(self.month).ok()
    }

    /// English month name used in reports ("January", ...). Out-of-range
    /// months render as `"M<n>"`.
    pub fn month_name(&self) -> String {
        match self.calendar_month() {
            Some(month) => month.name().to_string(),
            None => format!("M{}", self.month),
        }
    }
}

/// Twelve zero-valued months, January through December.
pub fn zero_months() -> Vec<MonthlyValue> {
    (1..=MONTHS_PER_YEAR).map(|month| MonthlyValue::new(month, 0.0)).collect()
}

/// Sum `amount` for the given month across a slice of series, matching by
/// month number rather than position.
pub fn monthly_sum<'a, I>(series: I, month: u8) -> f64
where
    I: IntoIterator<Item = &'a [MonthlyValue]>,
{
    series.into_iter().map(|values| amount_for(values, month)).sum()
}

fn amount_for(values: &[MonthlyValue], month: u8) -> f64 {
    values.iter().find(|v| v.month == month).map_or(0.0, |v| v.amount)
}

/// How a usage figure was obtained.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Measured,
    Calculated,
    Estimated,
    #[default]
    Unset,
}

/// Resource category tracked by one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Electricity,
    Steam,
    Waste,
    Refrigerant,
    FlareStack,
    AirPollutionFacility,
    Boiler,
    Other(String),
}

impl ResourceKind {
    pub fn label(&self) -> &str {
        match self {
            ResourceKind::Electricity => "Electricity",
            ResourceKind::Steam => "Steam",
            ResourceKind::Waste => "Waste",
            ResourceKind::Refrigerant => "Refrigerant",
            ResourceKind::FlareStack => "Flare stack gas",
            ResourceKind::AirPollutionFacility => "Air pollution facility",
            ResourceKind::Boiler => "Boiler",
            ResourceKind::Other(name) => name,
        }
    }

    /// Unit the resource is usually reported in.
    pub fn default_unit(&self) -> &'static str {
        match self {
            ResourceKind::Electricity => "kWh",
            ResourceKind::Steam | ResourceKind::Waste => "ton",
            ResourceKind::Refrigerant => "kg",
            ResourceKind::FlareStack | ResourceKind::AirPollutionFacility => "Nm3",
            ResourceKind::Boiler => "GJ",
            ResourceKind::Other(_) => "unit",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Business-level aggregate usage for one resource instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub id: String,
    pub monthly: Vec<MonthlyValue>,
    #[serde(default)]
    pub data_quality: DataQuality,
}

impl UsageEntry {
    /// A new entry with twelve zero months.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), monthly: zero_months(), data_quality: DataQuality::Unset }
    }

    pub fn with_monthly(id: impl Into<String>, amounts: [f64; 12]) -> Self {
        Self { id: id.into(), monthly: months_from(amounts), data_quality: DataQuality::Unset }
    }

    /// Always recomputed from `monthly`.
    pub fn total_amount(&self) -> f64 {
        self.monthly.iter().map(|v| v.amount).sum()
    }

    pub fn amount_for(&self, month: u8) -> f64 {
        amount_for(&self.monthly, month)
    }

    /// Overwrite one month's amount. Returns `false` if the month is absent.
    pub fn set_amount(&mut self, month: u8, amount: f64) -> bool {
        set_amount(&mut self.monthly, month, amount)
    }
}

fn months_from(amounts: [f64; 12]) -> Vec<MonthlyValue> {
    amounts.iter().zip(1u8..).map(|(&amount, month)| MonthlyValue::new(month, amount)).collect()
}

fn set_amount(values: &mut [MonthlyValue], month: u8, amount: f64) -> bool {
    match values.iter_mut().find(|v| v.month == month) {
        Some(value) => {
            value.amount = amount;
            true
        }
        None => false,
    }
}

/// Location kind of a physical measurement point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Site,
    Building,
    Process,
    SubProcess,
    Facility,
}

impl ScopeKind {
    /// Allocation granularity for this kind. Sub-process and facility
    /// measurements are too fine-grained to allocate against.
    pub fn allocation_scope(self) -> Option<crate::AllocationScope> {
        use crate::AllocationScope;
        match self {
            ScopeKind::Site => Some(AllocationScope::Site),
            ScopeKind::Building => Some(AllocationScope::Building),
            ScopeKind::Process => Some(AllocationScope::Process),
            ScopeKind::SubProcess | ScopeKind::Facility => None,
        }
    }
}

/// Where a measurement was taken.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ScopeRef {
    #[default]
    Site,
    Building(String),
    Process(String),
    SubProcess(String),
    Facility(String),
}

impl ScopeRef {
    pub fn kind(&self) -> ScopeKind {
        match self {
            ScopeRef::Site => ScopeKind::Site,
            ScopeRef::Building(_) => ScopeKind::Building,
            ScopeRef::Process(_) => ScopeKind::Process,
            ScopeRef::SubProcess(_) => ScopeKind::SubProcess,
            ScopeRef::Facility(_) => ScopeKind::Facility,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            ScopeRef::Site => None,
            ScopeRef::Building(id)
            | ScopeRef::Process(id)
            | ScopeRef::SubProcess(id)
            | ScopeRef::Facility(id) => Some(id),
        }
    }
}

/// Usage figure tied to a physical measurement point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementEntry {
    pub id: String,
    pub monthly: Vec<MonthlyValue>,
    #[serde(default)]
    pub data_quality: DataQuality,
    #[serde(default)]
    pub scope: ScopeRef,
}

impl MeasurementEntry {
    pub fn new(id: impl Into<String>, scope: ScopeRef) -> Self {
        Self { id: id.into(), monthly: zero_months(), data_quality: DataQuality::Measured, scope }
    }

    pub fn with_monthly(id: impl Into<String>, scope: ScopeRef, amounts: [f64; 12]) -> Self {
        Self {
            id: id.into(),
            monthly: months_from(amounts),
            data_quality: DataQuality::Measured,
            scope,
        }
    }

    pub fn total_amount(&self) -> f64 {
        self.monthly.iter().map(|v| v.amount).sum()
    }

    pub fn amount_for(&self, month: u8) -> f64 {
        amount_for(&self.monthly, month)
    }

    pub fn set_amount(&mut self, month: u8, amount: f64) -> bool {
        set_amount(&mut self.monthly, month, amount)
    }
}

/// Measurement entry after the aggregate has been redistributed onto it.
///
/// Data quality is always [`DataQuality::Calculated`] and `total_amount` is
/// fixed at construction from the monthly series.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorrectedEntry {
    id: String,
    scope: ScopeRef,
    monthly: Vec<MonthlyValue>,
    total_amount: f64,
    data_quality: DataQuality,
}

impl CorrectedEntry {
    pub fn new(id: impl Into<String>, scope: ScopeRef, monthly: Vec<MonthlyValue>) -> Self {
        let total_amount = monthly.iter().map(|v| v.amount).sum();
        Self { id: id.into(), scope, monthly, total_amount, data_quality: DataQuality::Calculated }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    pub fn monthly(&self) -> &[MonthlyValue] {
        &self.monthly
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn data_quality(&self) -> DataQuality {
        self.data_quality
    }

    pub fn amount_for(&self, month: u8) -> f64 {
        amount_for(&self.monthly, month)
    }
}
