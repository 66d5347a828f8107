use mockall::automock;
use rust_decimal::Decimal;

use crate::booking::PaymentStatus;
use crate::config::BookingConfig;
use crate::ServiceError;

#[automock]
pub trait DepositService {
    /// Deposit for `basis` which never exceeds the basis and never falls
    /// below the configured minimum amount (unless the basis does).
    fn compute_deposit(
        &self,
        basis: Decimal,
        deposit_percentage: Decimal,
        config: &BookingConfig,
    ) -> Decimal;

    fn payment_status(&self, paid: Decimal, basis: Decimal, current: PaymentStatus)
        -> PaymentStatus;

    /// Fails with `ServiceError::DepositShortfall` if a recorded payment
    /// covers neither the deposit nor the basis.
    fn check_payment(
        &self,
        paid: Decimal,
        deposit: Decimal,
        basis: Decimal,
    ) -> Result<(), ServiceError>;
}
