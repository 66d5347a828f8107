use mockall::automock;

#[automock]
pub trait ClockService {
    /// Current UTC timestamp, used for the `created` stamp of bookings.
    fn date_time_now(&self) -> time::PrimitiveDateTime;
}
