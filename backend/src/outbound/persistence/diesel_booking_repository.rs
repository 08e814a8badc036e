//! PostgreSQL-backed `BookingRepository` implementation.
//!
//! Payment state changes are guarded in SQL so that a stale read in the
//! service layer can never move a paid booking backwards.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, BookingStatusUpdate, PaymentIntentRecord,
    PaymentSettlement,
};
use crate::domain::{Booking, BookingId, BookingStatus, PaymentStatus, ProfessionalId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error, map_row_error};
use super::models::{BookingRow, NewBookingRow};
use super::pool::DbPool;
use super::schema::bookings;

/// Diesel-backed implementation of the booking repository port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a repository over the shared connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: DieselError) -> BookingRepositoryError {
    map_diesel_error(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

fn to_domain(row: BookingRow) -> Result<Booking, BookingRepositoryError> {
    Booking::try_from(row).map_err(|err| map_row_error(err, BookingRepositoryError::query))
}

/// Outcome of the locked settlement step, before row conversion.
struct SettledRow {
    row: BookingRow,
    transitioned: bool,
}

async fn settle(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Option<SettledRow>, DieselError> {
    let Some(row) = bookings::table
        .filter(bookings::id.eq(id))
        .select(BookingRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?
    else {
        return Ok(None);
    };
    let cancelled = row.status == BookingStatus::Cancelled.as_str();
    if cancelled || row.payment_status == PaymentStatus::Paid.as_str() {
        return Ok(Some(SettledRow {
            row,
            transitioned: false,
        }));
    }

    let status = row
        .status
        .parse()
        .map(Booking::status_after_payment)
        .map(|status| status.as_str().to_owned())
        .unwrap_or_else(|_| row.status.clone());
    let row = diesel::update(bookings::table.filter(bookings::id.eq(id)))
        .set((
            bookings::payment_status.eq(PaymentStatus::Paid.as_str()),
            bookings::status.eq(status),
        ))
        .returning(BookingRow::as_returning())
        .get_result(conn)
        .await?;
    Ok(Some(SettledRow {
        row,
        transitioned: true,
    }))
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BookingRepositoryError::connection))?;

        diesel::insert_into(bookings::table)
            .values(NewBookingRow::from(booking))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BookingRepositoryError::connection))?;

        bookings::table
            .filter(bookings::id.eq(id.as_uuid()))
            .select(BookingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list_for_customer(
        &self,
        customer_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BookingRepositoryError::connection))?;

        bookings::table
            .filter(bookings::customer_id.eq(customer_id.as_uuid()))
            .order(bookings::created_at.desc())
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn list_for_professional(
        &self,
        professional_id: &ProfessionalId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BookingRepositoryError::connection))?;

        bookings::table
            .filter(bookings::professional_id.eq(professional_id.as_uuid()))
            .order(bookings::created_at.desc())
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn record_payment_intent(
        &self,
        id: &BookingId,
        record: &PaymentIntentRecord,
    ) -> Result<bool, BookingRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BookingRepositoryError::connection))?;

        let updated = diesel::update(
            bookings::table
                .filter(bookings::id.eq(id.as_uuid()))
                .filter(bookings::payment_status.ne(PaymentStatus::Paid.as_str())),
        )
        .set((
            bookings::payment_status.eq(PaymentStatus::Pending.as_str()),
            bookings::payment_intent_id.eq(Some(record.intent_id.as_str())),
            bookings::amount_cents.eq(Some(record.amount.cents())),
            bookings::platform_fee_cents.eq(Some(record.platform_fee.cents())),
        ))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(updated == 1)
    }

    async fn mark_paid(
        &self,
        id: &BookingId,
    ) -> Result<Option<PaymentSettlement>, BookingRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BookingRepositoryError::connection))?;

        let booking_id = *id.as_uuid();
        let settled = conn
            .transaction(|conn| async move { settle(conn, booking_id).await }.scope_boxed())
            .await
            .map_err(diesel_error)?;

        settled
            .map(|SettledRow { row, transitioned }| {
                to_domain(row).map(|booking| PaymentSettlement {
                    booking,
                    transitioned,
                })
            })
            .transpose()
    }

    async fn update_status(
        &self,
        id: &BookingId,
        update: BookingStatusUpdate,
    ) -> Result<bool, BookingRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BookingRepositoryError::connection))?;

        let target = bookings::table
            .filter(bookings::id.eq(id.as_uuid()))
            .filter(bookings::status.eq(update.from.as_str()));
        let updated = if update.require_unpaid {
            diesel::update(target.filter(bookings::payment_status.ne(PaymentStatus::Paid.as_str())))
                .set(bookings::status.eq(update.to.as_str()))
                .execute(&mut conn)
                .await
        } else {
            diesel::update(target)
                .set(bookings::status.eq(update.to.as_str()))
                .execute(&mut conn)
                .await
        }
        .map_err(diesel_error)?;
        Ok(updated == 1)
    }
}
