use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::catalog::{AgeRange, Vaccine, VaccineId};

/// One dose the generator wants on the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedDose {
    pub vaccine_id: VaccineId,
    pub dose_number: u32,
    pub recommended_date: NaiveDate,
}

/// Whole months elapsed from `birth_date` to `today`, borrowing a month
/// when the day-of-month has not yet been reached.
pub(crate) fn age_in_whole_months(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut months = (today.year() - birth_date.year()) * 12 + today.month() as i32
        - birth_date.month() as i32;
    if today.day() < birth_date.day() {
        months -= 1;
    }
    months
}

/// Plan every dose of one vaccine, or `None` when the vaccine carries no
/// parseable age window and must be omitted from the generated schedule.
///
/// Dose 1 lands when the child reaches the window's lower bound; a child
/// already past it gets `today` (catch-up) rather than a date in the past.
/// Follow-up doses are spaced by the configured interval and are only
/// planned when that interval is present.
pub(crate) fn plan_vaccine_doses(
    vaccine: &Vaccine,
    birth_date: NaiveDate,
    today: NaiveDate,
) -> Option<Vec<PlannedDose>> {
    let range: AgeRange = vaccine.age_range()?;
    let age_months = age_in_whole_months(birth_date, today);

    let first_dose_date = if age_months < range.min_months as i32 {
        birth_date.checked_add_months(Months::new(range.min_months))?
    } else {
        today
    };

    let mut doses = vec![PlannedDose {
        vaccine_id: vaccine.id,
        dose_number: 1,
        recommended_date: first_dose_date,
    }];

    if vaccine.doses_required > 1 {
        if let Some(interval_days) = vaccine.days_between_doses {
            for dose_number in 2..=vaccine.doses_required {
                doses.push(PlannedDose {
                    vaccine_id: vaccine.id,
                    dose_number,
                    recommended_date: first_dose_date
                        + Duration::days(interval_days * (dose_number as i64 - 1)),
                });
            }
        }
    }

    Some(doses)
}
