//! Weekly dashboard built from the trend and peak-hour tables.

use crate::errors::ServiceError;
use crate::models::{
    DashboardResult, OperationalRecommendations, PeakHourTable, TrendStatus, TrendTable,
    WeeklySummary,
};

/// Longest rising or falling list shown.
pub const TOP_PRODUCTS: usize = 5;

pub fn build_dashboard(
    trends: Option<&TrendTable>,
    peak_hours: Option<&PeakHourTable>,
) -> Result<DashboardResult, ServiceError> {
    let trends = match trends {
        Some(trends) if !trends.is_empty() => trends,
        _ => return Err(ServiceError::TrendDataUnavailable),
    };

    let top = |status| {
        trends
            .products_with(status)
            .take(TOP_PRODUCTS)
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    let peak_hours = peak_hours
        .map(PeakHourTable::sorted_desc)
        .unwrap_or_default();
    let peak_hour = peak_hours.top_bucket().to_string();

    Ok(DashboardResult {
        summary: WeeklySummary {
            rising: top(TrendStatus::Rising),
            falling: top(TrendStatus::Falling),
            peak_hour: peak_hour.clone(),
        },
        recommendations: OperationalRecommendations {
            staffing_message: format!("Reinforce staff during: {}.", peak_hour),
            peak_hours,
        },
        trends: trends.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrendEntry;
    use assert_matches::assert_matches;

    fn trend(status: TrendStatus) -> TrendEntry {
        let slope = match status {
            TrendStatus::Rising => 1.0,
            TrendStatus::Falling => -1.0,
            TrendStatus::Stable => 0.0,
        };
        TrendEntry { slope, status }
    }

    #[test]
    fn caps_lists_at_five_in_table_order() {
        let mut trends = TrendTable::default();
        for i in 0..7 {
            trends.push(format!("up{i}"), trend(TrendStatus::Rising));
        }
        trends.push("down", trend(TrendStatus::Falling));
        trends.push("flat", trend(TrendStatus::Stable));

        let peaks = PeakHourTable::from_totals([("Morning", 3.0), ("Night", 9.0)]);
        let result = build_dashboard(Some(&trends), Some(&peaks)).unwrap();

        assert_eq!(result.summary.rising, vec!["up0", "up1", "up2", "up3", "up4"]);
        assert_eq!(result.summary.falling, vec!["down"]);
        assert_eq!(result.summary.peak_hour, "Night");
        assert_eq!(
            result.recommendations.staffing_message,
            "Reinforce staff during: Night."
        );
        assert_eq!(result.trends.len(), 9);
    }

    #[test]
    fn no_peak_hours_reports_not_available() {
        let mut trends = TrendTable::default();
        trends.push("Apple", TrendEntry::stable());

        let result = build_dashboard(Some(&trends), None).unwrap();
        assert_eq!(result.summary.peak_hour, "N/A");
        assert_eq!(
            result.recommendations.staffing_message,
            "Reinforce staff during: N/A."
        );
        assert!(result.summary.rising.is_empty());
        assert!(result.recommendations.peak_hours.is_empty());
    }

    #[test]
    fn empty_or_missing_trends_are_an_error() {
        assert_matches!(
            build_dashboard(None, None),
            Err(ServiceError::TrendDataUnavailable)
        );
        assert_matches!(
            build_dashboard(Some(&TrendTable::default()), None),
            Err(ServiceError::TrendDataUnavailable)
        );
    }
}
