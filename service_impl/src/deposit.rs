use rust_decimal::Decimal;
use service::{
    booking::PaymentStatus, config::BookingConfig, deposit::DepositService, ServiceError,
};
use studio_utils::{clamp_percentage, percentage_of, round_money};

pub struct DepositServiceImpl;

impl DepositService for DepositServiceImpl {
    fn compute_deposit(
        &self,
        basis: Decimal,
        deposit_percentage: Decimal,
        config: &BookingConfig,
    ) -> Decimal {
        let percentage = clamp_percentage(deposit_percentage);
        let mut deposit = round_money(percentage_of(basis, percentage)).min(basis);

        let minimum = config.minimum_booking_amount;
        if minimum > Decimal::ZERO && basis > Decimal::ZERO && deposit < minimum {
            deposit = minimum.min(basis);
        }
        deposit.max(Decimal::ZERO)
    }

    fn payment_status(
        &self,
        paid: Decimal,
        basis: Decimal,
        current: PaymentStatus,
    ) -> PaymentStatus {
        if basis > Decimal::ZERO && paid >= basis {
            PaymentStatus::Paid
        } else if paid > Decimal::ZERO && paid < basis {
            PaymentStatus::PartiallyPaid
        } else {
            current
        }
    }

    fn check_payment(
        &self,
        paid: Decimal,
        deposit: Decimal,
        basis: Decimal,
    ) -> Result<(), ServiceError> {
        if paid > Decimal::ZERO && paid < deposit && paid < basis {
            let required = deposit.min(basis);
            return Err(ServiceError::DepositShortfall {
                paid,
                required,
                shortfall: required - paid,
            });
        }
        Ok(())
    }
}
