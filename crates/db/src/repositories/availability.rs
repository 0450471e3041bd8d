use eyre::Result;
use mentorhub_core::models::{availability::AvailabilitySlot, role::Role};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{DbAvailabilitySlot, convert_all};

pub async fn list_slots(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    role: Role,
) -> Result<Vec<AvailabilitySlot>> {
    tracing::debug!("Listing {} slots for owner {}", role, owner_id);

    let rows = sqlx::query_as::<_, DbAvailabilitySlot>(
        r#"
        SELECT id, owner_id, role, day_of_week, start_time, end_time, is_active, max_occupants, created_at
        FROM availability_slots
        WHERE owner_id = $1 AND role = $2
        ORDER BY day_of_week ASC, start_time ASC
        "#,
    )
    .bind(owner_id)
    .bind(role.as_str())
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

pub async fn get_slot(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<AvailabilitySlot>> {
    let row = sqlx::query_as::<_, DbAvailabilitySlot>(
        r#"
        SELECT id, owner_id, role, day_of_week, start_time, end_time, is_active, max_occupants, created_at
        FROM availability_slots
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(AvailabilitySlot::try_from).transpose()
}

/// Inserts the slot, or updates it in place when a slot with the same id
/// already exists. Resubmitting the same edit leaves exactly one row.
///
/// A slot is only ever updated by its own owner and role; `None` means the id
/// is taken by someone else's slot and nothing was written.
pub async fn upsert_slot(
    pool: &Pool<Postgres>,
    slot: &AvailabilitySlot,
) -> Result<Option<AvailabilitySlot>> {
    tracing::debug!(
        "Upserting slot: id={}, owner={}, day={}, {}-{}",
        slot.id,
        slot.owner_id,
        slot.day_of_week,
        slot.start_time,
        slot.end_time
    );

    let row = sqlx::query_as::<_, DbAvailabilitySlot>(
        r#"
        INSERT INTO availability_slots
            (id, owner_id, role, day_of_week, start_time, end_time, is_active, max_occupants, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE SET
            day_of_week = EXCLUDED.day_of_week,
            start_time = EXCLUDED.start_time,
            end_time = EXCLUDED.end_time,
            is_active = EXCLUDED.is_active,
            max_occupants = EXCLUDED.max_occupants
        WHERE availability_slots.owner_id = EXCLUDED.owner_id
            AND availability_slots.role = EXCLUDED.role
        RETURNING id, owner_id, role, day_of_week, start_time, end_time, is_active, max_occupants, created_at
        "#,
    )
    .bind(slot.id)
    .bind(slot.owner_id)
    .bind(slot.role.as_str())
    .bind(i16::from(slot.day_of_week))
    .bind(slot.start_time)
    .bind(slot.end_time)
    .bind(slot.is_active)
    .bind(i32::try_from(slot.max_occupants)?)
    .bind(slot.created_at)
    .fetch_optional(pool)
    .await?;

    row.map(AvailabilitySlot::try_from).transpose()
}

/// Returns whether a slot was deleted.
pub async fn delete_slot(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
    role: Role,
    id: Uuid,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM availability_slots
        WHERE id = $1 AND owner_id = $2 AND role = $3
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
