use rust_decimal::Decimal;
use service::{
    booking::SessionRow,
    capacity::{CapacityService, CapacityUsage},
    ServiceError,
};
use studio_utils::round_hours;
use tracing::{debug, warn};

/// Usage beyond the allotment up to this amount of hours is accepted.
const CAPACITY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

pub struct CapacityServiceImpl;

impl CapacityService for CapacityServiceImpl {
    fn compute_usage(
        &self,
        session_rows: &[SessionRow],
        total_hours: Decimal,
    ) -> Result<CapacityUsage, ServiceError> {
        let mut rows = Vec::with_capacity(session_rows.len());
        let mut used_hours = Decimal::ZERO;

        for row in session_rows {
            match row.time_range().transpose()? {
                Some(range) => {
                    let hours = range.hours();
                    used_hours += hours;
                    rows.push(SessionRow {
                        hours: Some(round_hours(hours)),
                        ..row.clone()
                    });
                }
                None => rows.push(SessionRow {
                    hours: row.hours.or(Some(Decimal::ZERO)),
                    ..row.clone()
                }),
            }
        }

        if used_hours - total_hours >= CAPACITY_TOLERANCE {
            warn!(
                used_hours = %used_hours,
                total_hours = %total_hours,
                "Package capacity exceeded"
            );
            return Err(ServiceError::CapacityExceeded {
                used_hours: used_hours.round_dp(4),
                allotted_hours: total_hours,
            });
        }

        let used_hours = round_hours(used_hours);
        let remaining_hours = (total_hours - used_hours).max(Decimal::ZERO);
        debug!(used_hours = %used_hours, remaining_hours = %remaining_hours, "Computed usage");
        Ok(CapacityUsage {
            session_rows: rows.into(),
            used_hours,
            remaining_hours,
        })
    }
}
