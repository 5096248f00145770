//! The nine customer-engagement metrics, in column order.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    VisitsPerMonth,
    AvgSessionDuration,
    PagesPerSession,
    EmailOpenRate,
    EmailCtr,
    PurchaseFrequency,
    AverageOrderValue,
    CustomerLifetimeValue,
    NpsScore,
}

impl Metric {
    /// Column order of the metric table and of the correlation matrix.
    /// NEVER reorder: the stream slot of each metric follows this order.
    pub const ALL: [Metric; 9] = [
        Metric::VisitsPerMonth,
        Metric::AvgSessionDuration,
        Metric::PagesPerSession,
        Metric::EmailOpenRate,
        Metric::EmailCtr,
        Metric::PurchaseFrequency,
        Metric::AverageOrderValue,
        Metric::CustomerLifetimeValue,
        Metric::NpsScore,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Axis label used on the rendered chart.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VisitsPerMonth => "Visits per Month",
            Self::AvgSessionDuration => "Avg Session Duration (min)",
            Self::PagesPerSession => "Pages per Session",
            Self::EmailOpenRate => "Email Open Rate",
            Self::EmailCtr => "Email CTR",
            Self::PurchaseFrequency => "Purchase Frequency / Month",
            Self::AverageOrderValue => "Average Order Value ($)",
            Self::CustomerLifetimeValue => "Customer Lifetime Value ($)",
            Self::NpsScore => "NPS Score",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::VisitsPerMonth => "visits_per_month",
            Self::AvgSessionDuration => "avg_session_duration_min",
            Self::PagesPerSession => "pages_per_session",
            Self::EmailOpenRate => "email_open_rate",
            Self::EmailCtr => "email_click_through_rate",
            Self::PurchaseFrequency => "purchase_frequency_per_month",
            Self::AverageOrderValue => "avg_order_value",
            Self::CustomerLifetimeValue => "customer_lifetime_value",
            Self::NpsScore => "nps_score",
        }
    }
}
