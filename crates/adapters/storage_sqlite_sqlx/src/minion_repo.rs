//! `SQLite` implementation of [`MinionRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use minionhub_app::ports::MinionRepository;
use minionhub_domain::error::MinionHubError;
use minionhub_domain::id::MinionId;
use minionhub_domain::minion::{Minion, MinionDevice};
use minionhub_domain::network::LocalNetworkDevice;
use minionhub_domain::status::{MinionStatus, MinionType};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Minion`].
struct Wrapper(Minion);

fn decode<E: std::error::Error + Send + Sync + 'static>(err: E) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let minion_type: String = row.try_get("minion_type")?;
        let mac: String = row.try_get("mac")?;
        let device_name: String = row.try_get("device_name")?;
        let ip: String = row.try_get("ip")?;
        let brand: String = row.try_get("brand")?;
        let model: String = row.try_get("model")?;
        let token: Option<String> = row.try_get("token")?;
        let status_json: String = row.try_get("status")?;
        let is_properly_communicated: bool = row.try_get("is_properly_communicated")?;
        let auto_turn_off_ms: Option<i64> = row.try_get("auto_turn_off_ms")?;

        let id = MinionId::from_str(&id).map_err(decode)?;
        let minion_type: MinionType =
            serde_json::from_str(&format!("\"{minion_type}\"")).map_err(decode)?;
        let status: MinionStatus = serde_json::from_str(&status_json).map_err(decode)?;
        let auto_turn_off_ms = auto_turn_off_ms
            .map(u64::try_from)
            .transpose()
            .map_err(decode)?;

        Ok(Self(Minion {
            id,
            name,
            minion_type,
            device: MinionDevice {
                physical_device: LocalNetworkDevice {
                    mac,
                    name: device_name,
                    ip,
                },
                brand,
                model,
                token,
            },
            status,
            is_properly_communicated,
            auto_turn_off_ms,
        }))
    }
}

fn millis(value: Option<u64>) -> Option<i64> {
    value.map(|ms| i64::try_from(ms).unwrap_or(i64::MAX))
}

const INSERT: &str = "INSERT INTO minions (id, name, minion_type, mac, device_name, ip, brand, model, token, status, is_properly_communicated, auto_turn_off_ms) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_ALL: &str = "SELECT * FROM minions ORDER BY rowid";
const UPDATE: &str = "UPDATE minions SET name = ?, minion_type = ?, mac = ?, device_name = ?, ip = ?, brand = ?, model = ?, token = ?, status = ?, is_properly_communicated = ?, auto_turn_off_ms = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM minions WHERE id = ?";

/// `SQLite`-backed minion repository.
pub struct SqliteMinionRepository {
    pool: SqlitePool,
}

impl SqliteMinionRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl MinionRepository for SqliteMinionRepository {
    fn get_all(&self) -> impl Future<Output = Result<Vec<Minion>, MinionHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn create(
        &self,
        minion: Minion,
    ) -> impl Future<Output = Result<Minion, MinionHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let status_json = serde_json::to_string(&minion.status).map_err(StorageError::from)?;
            let physical = &minion.device.physical_device;

            sqlx::query(INSERT)
                .bind(minion.id.to_string())
                .bind(&minion.name)
                .bind(minion.minion_type.as_str())
                .bind(&physical.mac)
                .bind(&physical.name)
                .bind(&physical.ip)
                .bind(&minion.device.brand)
                .bind(&minion.device.model)
                .bind(&minion.device.token)
                .bind(&status_json)
                .bind(minion.is_properly_communicated)
                .bind(millis(minion.auto_turn_off_ms))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(minion)
        }
    }

    fn update(
        &self,
        minion: Minion,
    ) -> impl Future<Output = Result<Minion, MinionHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let status_json = serde_json::to_string(&minion.status).map_err(StorageError::from)?;
            let physical = &minion.device.physical_device;

            sqlx::query(UPDATE)
                .bind(&minion.name)
                .bind(minion.minion_type.as_str())
                .bind(&physical.mac)
                .bind(&physical.name)
                .bind(&physical.ip)
                .bind(&minion.device.brand)
                .bind(&minion.device.model)
                .bind(&minion.device.token)
                .bind(&status_json)
                .bind(minion.is_properly_communicated)
                .bind(millis(minion.auto_turn_off_ms))
                .bind(minion.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(minion)
        }
    }

    fn delete(&self, id: MinionId) -> impl Future<Output = Result<(), MinionHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
