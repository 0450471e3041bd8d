use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_availability_slots_owner ON availability_slots(owner_id, role)",
    "CREATE INDEX IF NOT EXISTS idx_mentoring_requests_mentor_id ON mentoring_requests(mentor_id)",
    "CREATE INDEX IF NOT EXISTS idx_mentoring_sessions_mentor_id ON mentoring_sessions(mentor_id)",
    "CREATE INDEX IF NOT EXISTS idx_mentoring_sessions_start_time ON mentoring_sessions(start_time)",
    "CREATE INDEX IF NOT EXISTS idx_tutoring_bookings_tutor_id ON tutoring_bookings(tutor_id)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create availability_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_slots (
            id UUID PRIMARY KEY,
            owner_id UUID NOT NULL,
            role VARCHAR(32) NOT NULL,
            day_of_week SMALLINT NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            max_occupants INTEGER NOT NULL DEFAULT 1 CHECK (max_occupants >= 1),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_slot_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create mentoring_requests table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mentoring_requests (
            id UUID PRIMARY KEY,
            mentor_id UUID NOT NULL,
            student_id UUID NOT NULL,
            topic VARCHAR(255) NOT NULL,
            description TEXT NOT NULL,
            preferred_start TIMESTAMP WITH TIME ZONE NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create mentoring_sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mentoring_sessions (
            id UUID PRIMARY KEY,
            mentor_id UUID NOT NULL,
            student_id UUID NOT NULL,
            request_id UUID NULL REFERENCES mentoring_requests(id),
            topic VARCHAR(255) NOT NULL,
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'scheduled',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_session_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create tutoring_bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tutoring_bookings (
            id UUID PRIMARY KEY,
            tutor_id UUID NOT NULL,
            student_id UUID NOT NULL,
            availability_id UUID NOT NULL,
            topic VARCHAR(255) NOT NULL,
            description TEXT NOT NULL,
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending_payment',
            payment_reference VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_booking_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Prepared statements take one command each
    for statement in INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
