//! Booking handlers. Authorization and lifecycle rules live in the booking
//! service; these map HTTP to it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{BookingResponse, CreateBookingRequest, UpdateBookingStatusRequest},
    middleware::ActorContext,
    services::NewBooking,
    startup::AppState,
};

/// Create a booking for the acting customer. Payment is authorized against
/// the actor's wallet before the booking exists; insufficient balance means
/// no booking.
pub async fn create_booking(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    payload.validate()?;

    let input = NewBooking {
        category: payload.category,
        description: payload.description,
        location: payload.location,
        price: payload.price,
        lodge_id: payload.lodge_id,
        trusted_transport_only: payload.trusted_transport_only,
    };

    let booking = state.bookings.create(&actor.user, input).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Bookings visible to the actor, most recent first. Customers see their
/// own, providers see their assignments plus the unassigned job board,
/// lodges see lodging work, admins see everything.
pub async fn list_bookings(
    State(state): State<AppState>,
    actor: ActorContext,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = state.bookings.list_for(&actor.user).await;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

pub async fn get_booking(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.get(&actor.user, booking_id).await?;
    Ok(Json(booking.into()))
}

/// Status transition. Completion settles the payment as part of the same
/// call.
pub async fn update_booking_status(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    tracing::info!(
        %booking_id,
        actor_id = %actor.user.id,
        new_status = %payload.status,
        "updating booking status"
    );

    let booking = state
        .bookings
        .update_status(&actor.user, booking_id, payload.status)
        .await?;
    Ok(Json(booking.into()))
}

/// Direct settlement trigger (admin). Idempotent.
pub async fn settle_booking(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.settle(&actor.user, booking_id).await?;
    Ok(Json(booking.into()))
}
