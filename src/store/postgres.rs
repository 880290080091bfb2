//! PostgreSQL appointment store

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::AppointmentStore;
use crate::error::StoreError;
use crate::types::{Appointment, GeoLocation};

#[derive(Debug, FromRow)]
struct AppointmentRow {
    id: Uuid,
    client_name: String,
    lat: f64,
    lng: f64,
    address: String,
    start_at: NaiveDateTime,
    end_at: NaiveDateTime,
    notes: Option<String>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Appointment {
            id: row.id,
            client_name: row.client_name,
            location: GeoLocation {
                lat: row.lat,
                lng: row.lng,
                address: row.address,
            },
            start: row.start_at,
            end: row.end_at,
            notes: row.notes,
        }
    }
}

const INSERT_APPOINTMENT: &str = r#"
    INSERT INTO appointments (id, client_name, lat, lng, address, start_at, end_at, notes)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

/// Appointments table in PostgreSQL
pub struct PgAppointmentStore {
    pool: PgPool,
}

impl PgAppointmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a connection pool
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Apply the migrations under `./migrations`
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        info!("Running database migrations...");

        let migrator = sqlx::migrate!("./migrations");
        let versions: Vec<i64> = migrator.iter().map(|m| m.version).collect();
        info!("Compiled migration versions: {:?}", versions);

        migrator.run(&self.pool).await?;

        info!("Database migrations complete");
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn load(&self) -> Result<Vec<Appointment>, StoreError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(
            r#"
            SELECT id, client_name, lat, lng, address, start_at, end_at, notes
            FROM appointments
            ORDER BY start_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn save(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM appointments").execute(&mut *tx).await?;
        for apt in appointments {
            bind_appointment(sqlx::query(INSERT_APPOINTMENT), apt)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn add(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Blocks other writers until commit so the overlap check stays valid
        sqlx::query("LOCK TABLE appointments IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let taken = sqlx::query_as::<_, AppointmentRow>(
            r#"
            SELECT id, client_name, lat, lng, address, start_at, end_at, notes
            FROM appointments
            WHERE start_at < $2 AND end_at > $1
            ORDER BY start_at
            LIMIT 1
            "#,
        )
        .bind(appointment.start)
        .bind(appointment.end)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = taken {
            return Err(StoreError::SlotTaken {
                start: appointment.start,
                end: appointment.end,
                client_name: row.client_name,
            });
        }

        bind_appointment(sqlx::query(INSERT_APPOINTMENT), &appointment)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

fn bind_appointment<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    apt: &'q Appointment,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(apt.id)
        .bind(&apt.client_name)
        .bind(apt.location.lat)
        .bind(apt.location.lng)
        .bind(&apt.location.address)
        .bind(apt.start)
        .bind(apt.end)
        .bind(&apt.notes)
}
