//! Platform reporting.

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use service_core::error::AppError;

use crate::{dtos::AdminReport, middleware::ActorContext, models::BookingStatus, startup::AppState};

pub async fn report(
    State(state): State<AppState>,
    actor: ActorContext,
) -> Result<Json<AdminReport>, AppError> {
    actor.require_admin()?;

    let report = state
        .repository
        .read(|s| {
            let mut report = AdminReport {
                total_users: s.users().count(),
                total_bookings: 0,
                completed_bookings: 0,
                cancelled_bookings: 0,
                open_bookings: 0,
                gross_volume: Decimal::ZERO,
                commission_collected: Decimal::ZERO,
                hospitality_cashflow: s.users().map(|u| u.hospitality_cashflow).sum(),
            };

            for booking in s.bookings_newest_first() {
                report.total_bookings += 1;
                match booking.status {
                    BookingStatus::Completed => report.completed_bookings += 1,
                    BookingStatus::Cancelled => report.cancelled_bookings += 1,
                    _ => report.open_bookings += 1,
                }
                if booking.is_paid {
                    report.gross_volume += booking.price;
                    if booking.provider_id.is_some() {
                        report.commission_collected += booking.commission;
                    }
                }
            }

            report
        })
        .await;

    Ok(Json(report))
}
