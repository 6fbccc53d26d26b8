use chrono::NaiveDate;
use serde::Deserialize;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Filters for the Shipping Company Orders report. Everything is optional;
/// `chart_type` only switches the chart, it never filters rows.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrdersReportFilters {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// "All" | "Return" | "No Return"
    pub is_return: Option<String>,
    pub city: Option<String>,
    pub shipping_company: Option<String>,
    /// Delivery note workflow status, e.g. "Submitted".
    pub delivery_note_status: Option<String>,
    /// "shipping_company" | "payment_status" | "return_vs_sales" | "amount_by_company"
    pub chart_type: Option<String>,
}

impl OrdersReportFilters {
    /// The `is_return` filter as a tri-state: None means no filtering.
    pub fn return_filter(&self) -> Option<bool> {
        match non_empty(&self.is_return) {
            Some("Return") => Some(true),
            Some("No Return") => Some(false),
            _ => None,
        }
    }

    pub fn city_filter(&self) -> Option<&str> {
        non_empty(&self.city)
    }

    pub fn shipping_company_filter(&self) -> Option<&str> {
        non_empty(&self.shipping_company)
    }

    pub fn status_filter(&self) -> Option<&str> {
        non_empty(&self.delivery_note_status)
    }
}

/// Filters for the Settlement Analytics report. The settlement-status filter
/// is applied after the per-row computation, not in SQL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsFilters {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub shipping_company: Option<String>,
    pub shipping_status: Option<String>,
    pub company: Option<String>,
    pub customer: Option<String>,
    /// "All" | "Pending" | "Partially Paid" | "Fully Paid"
    pub settlement_status: Option<String>,
}

impl AnalyticsFilters {
    pub fn shipping_company_filter(&self) -> Option<&str> {
        non_empty(&self.shipping_company)
    }

    pub fn shipping_status_filter(&self) -> Option<&str> {
        non_empty(&self.shipping_status)
    }

    pub fn company_filter(&self) -> Option<&str> {
        non_empty(&self.company)
    }

    pub fn customer_filter(&self) -> Option<&str> {
        non_empty(&self.customer)
    }

    pub fn settlement_status_filter(&self) -> Option<&str> {
        non_empty(&self.settlement_status).filter(|v| *v != "All")
    }
}

/// Filters for the flat Shipping Company Summary report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SummaryFilters {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub shipping_company: Option<String>,
    pub shipping_status: Option<String>,
    pub company: Option<String>,
    pub customer: Option<String>,
}

impl SummaryFilters {
    pub fn shipping_company_filter(&self) -> Option<&str> {
        non_empty(&self.shipping_company)
    }

    pub fn shipping_status_filter(&self) -> Option<&str> {
        non_empty(&self.shipping_status)
    }

    pub fn company_filter(&self) -> Option<&str> {
        non_empty(&self.company)
    }

    pub fn customer_filter(&self) -> Option<&str> {
        non_empty(&self.customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_filter_tri_state() {
        let mut f = OrdersReportFilters::default();
        assert_eq!(f.return_filter(), None);

        f.is_return = Some("All".to_string());
        assert_eq!(f.return_filter(), None);

        f.is_return = Some("Return".to_string());
        assert_eq!(f.return_filter(), Some(true));

        f.is_return = Some("No Return".to_string());
        assert_eq!(f.return_filter(), Some(false));
    }

    #[test]
    fn empty_strings_behave_like_absent_filters() {
        let f = OrdersReportFilters {
            city: Some("  ".to_string()),
            delivery_note_status: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(f.city_filter(), None);
        assert_eq!(f.status_filter(), None);
    }

    #[test]
    fn settlement_status_all_means_no_filter() {
        let mut f = AnalyticsFilters::default();
        assert_eq!(f.settlement_status_filter(), None);

        f.settlement_status = Some("All".to_string());
        assert_eq!(f.settlement_status_filter(), None);

        f.settlement_status = Some("Pending".to_string());
        assert_eq!(f.settlement_status_filter(), Some("Pending"));
    }
}
