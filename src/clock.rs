use chrono::NaiveDate;

/// Source of "today" for anything date-relative. Handlers read it once per request.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_never_moves() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let clock = FixedClock(day);
        assert_eq!(clock.today(), day);
        assert_eq!(clock.today(), clock.today());
    }
}
