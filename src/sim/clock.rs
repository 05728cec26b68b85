use time::Date;

/// A simulation calendar that hands out consecutive dates.
///
/// The engine advances it one day at a time with [`Calendar::tick`].
///
/// # Examples
///
/// ```
/// use time::macros::date;
/// use utility_metering::sim::clock::Calendar;
///
/// let mut calendar = Calendar::new(date!(2024 - 02 - 28), 3);
/// let days: Vec<_> = std::iter::from_fn(|| calendar.tick()).collect();
///
/// assert_eq!(
///     days,
///     vec![date!(2024 - 02 - 28), date!(2024 - 02 - 29), date!(2024 - 03 - 01)]
/// );
/// ```
pub struct Calendar {
    /// Next date to hand out
    next: Option<Date>,
    /// Days left to hand out
    remaining: usize,
}

impl Calendar {
    /// Creates a calendar starting at `start` that runs for `days` days.
    pub fn new(start: Date, days: usize) -> Self {
        Self {
            next: Some(start),
            remaining: days,
        }
    }

    /// Advances the calendar by one day.
    ///
    /// # Returns
    ///
    /// * `Some(date)` - The current date before advancing
    /// * `None` - If every day has been handed out, or the date range ran
    ///   past the last representable date
    pub fn tick(&mut self) -> Option<Date> {
        if self.remaining == 0 {
            return None;
        }
        let day = self.next?;
        self.remaining -= 1;
        self.next = day.next_day();
        Some(day)
    }
}
