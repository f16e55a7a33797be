//! Road reference store: Postgres queries over the TIGER address-range and
//! place tables.
//!
//! The store is an optional capability: a resolver built without database
//! settings gets the `disabled` variant, and the strategies that need it
//! fail with `Unavailable` instead of probing for a driver at runtime.

use std::time::Duration;

use anyhow::Result;
use geo::Point;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Executor, FromRow};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::StoreSettings;

use super::RoadSegment;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No database configured, or the server cannot be reached.
    #[error("db_unavailable")]
    Unavailable,
    /// Connect or statement timeout.
    #[error("db_timeout")]
    Timeout,
    #[error("db_error:{0}")]
    Query(String),
}

/// Distinct road names for a postcode, across every name key the place
/// table populates.
const ROAD_NAMES_SQL: &str = r#"
WITH roads AS (
  SELECT DISTINCT NULLIF(BTRIM(p.name->>'name'), '') AS road_name
  FROM location_property_tiger t
  JOIN placex p ON p.place_id = t.parent_place_id
  WHERE t.postcode = $1
  UNION
  SELECT DISTINCT NULLIF(BTRIM(p.name->>'name:en'), '') AS road_name
  FROM location_property_tiger t
  JOIN placex p ON p.place_id = t.parent_place_id
  WHERE t.postcode = $1
  UNION
  SELECT DISTINCT NULLIF(BTRIM(p.name->>'alt_name'), '') AS road_name
  FROM location_property_tiger t
  JOIN placex p ON p.place_id = t.parent_place_id
  WHERE t.postcode = $1
  UNION
  SELECT DISTINCT NULLIF(BTRIM(p.name->>'official_name'), '') AS road_name
  FROM location_property_tiger t
  JOIN placex p ON p.place_id = t.parent_place_id
  WHERE t.postcode = $1
  UNION
  SELECT DISTINCT NULLIF(BTRIM(p.address->>'road'), '') AS road_name
  FROM location_property_tiger t
  JOIN placex p ON p.place_id = t.parent_place_id
  WHERE t.postcode = $1
)
SELECT road_name
FROM roads
WHERE road_name IS NOT NULL
ORDER BY road_name
"#;

/// Fallback when the postcode has no TIGER rows: every named highway within
/// the configured radius of the postcode centroid.
const PROXIMITY_ROAD_NAMES_SQL: &str = r#"
WITH z AS (
  SELECT centroid::geometry AS g
  FROM location_postcode
  WHERE country_code = $1 AND postcode = $2
  LIMIT 1
),
roads AS (
  SELECT DISTINCT
    NULLIF(
      BTRIM(
        COALESCE(
          p.name->>'name',
          p.name->>'name:en',
          p.name->>'alt_name',
          p.name->>'official_name',
          p.address->>'road',
          p.address->>'pedestrian',
          p.address->>'footway',
          p.address->>'path'
        )
      ),
      ''
    ) AS road_name
  FROM placex p, z
  WHERE p.class = 'highway'
    AND p.geometry IS NOT NULL
    AND ST_DWithin(p.geometry::geography, z.g::geography, $3)
)
SELECT road_name
FROM roads
WHERE road_name IS NOT NULL
ORDER BY road_name
"#;

/// Address-ranged segments for a postcode and road-name fragment, with the
/// line endpoints extracted server-side.
const SEGMENTS_SQL: &str = r#"
SELECT
  t.place_id,
  t.startnumber::bigint AS startnumber,
  t.endnumber::bigint   AS endnumber,
  t.step::bigint        AS step,
  p.name->>'name' AS road_name,
  p.class AS road_class,
  p.type  AS road_type,
  ST_X(ST_StartPoint(t.linegeo::geometry)) AS start_lon,
  ST_Y(ST_StartPoint(t.linegeo::geometry)) AS start_lat,
  ST_X(ST_EndPoint(t.linegeo::geometry))   AS end_lon,
  ST_Y(ST_EndPoint(t.linegeo::geometry))   AS end_lat
FROM location_property_tiger t
JOIN placex p ON p.place_id = t.parent_place_id
WHERE t.postcode = $1
  AND COALESCE(p.name->>'name', '') ILIKE '%' || $2 || '%'
ORDER BY
  p.name->>'name',
  LEAST(t.startnumber, t.endnumber),
  GREATEST(t.startnumber, t.endnumber)
"#;

#[derive(Debug, FromRow)]
struct SegmentRow {
    place_id: Option<i64>,
    startnumber: Option<i64>,
    endnumber: Option<i64>,
    step: Option<i64>,
    road_name: Option<String>,
    road_class: Option<String>,
    road_type: Option<String>,
    start_lon: Option<f64>,
    start_lat: Option<f64>,
    end_lon: Option<f64>,
    end_lat: Option<f64>,
}

impl SegmentRow {
    fn into_segment(self) -> Option<RoadSegment> {
        Some(RoadSegment {
            road_name: self.road_name.filter(|n| !n.is_empty())?,
            start_number: self.startnumber?,
            end_number: self.endnumber?,
            step: self.step,
            start: Point::new(self.start_lon?, self.start_lat?),
            end: Point::new(self.end_lon?, self.end_lat?),
            place_id: self.place_id,
            road_class: self.road_class,
            road_type: self.road_type,
        })
    }
}

/// Connection handle for the road reference store.
#[derive(Clone)]
pub struct RoadStore {
    pool: Option<PgPool>,
    country_code: String,
    radius_m: f64,
}

impl RoadStore {
    /// Lazy pool: nothing connects until the first query, so a down
    /// database degrades the fuzzy/interpolation strategies instead of
    /// failing startup.
    pub fn connect(settings: &StoreSettings) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.dbname)
            .username(&settings.user)
            .password(&settings.password);

        let statement_timeout_ms = settings.statement_timeout_ms;
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    let sql = format!("SET statement_timeout = {statement_timeout_ms}");
                    conn.execute(sql.as_str()).await?;
                    Ok(())
                })
            })
            .connect_lazy_with(options);

        info!(
            host = %settings.host,
            port = settings.port,
            dbname = %settings.dbname,
            "Road reference store configured"
        );
        Ok(Self {
            pool: Some(pool),
            country_code: settings.country_code.clone(),
            radius_m: settings.radius_m as f64,
        })
    }

    /// The not-configured variant: every query reports `Unavailable`.
    pub fn disabled() -> Self {
        Self {
            pool: None,
            country_code: String::new(),
            radius_m: 0.0,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.pool.is_some()
    }

    fn pool(&self) -> Result<&PgPool, StoreError> {
        self.pool.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Distinct road names for a postcode, falling back to a
    /// geometry-proximity search when the postcode has no TIGER rows.
    pub async fn road_names(&self, postcode: &str) -> Result<Vec<String>, StoreError> {
        let pool = self.pool()?;

        let rows: Vec<(String,)> = sqlx::query_as(ROAD_NAMES_SQL)
            .bind(postcode)
            .fetch_all(pool)
            .await
            .map_err(map_db_error)?;
        let mut names: Vec<String> = rows.into_iter().map(|(name,)| name).collect();

        if names.is_empty() {
            debug!(postcode, "no TIGER road names; trying proximity fallback");
            let rows: Vec<(String,)> = sqlx::query_as(PROXIMITY_ROAD_NAMES_SQL)
                .bind(&self.country_code)
                .bind(postcode)
                .bind(self.radius_m)
                .fetch_all(pool)
                .await
                .map_err(map_db_error)?;
            names = rows.into_iter().map(|(name,)| name).collect();
        }

        names.sort();
        names.dedup();
        debug!(postcode, count = names.len(), "road name candidates");
        Ok(names)
    }

    /// Address-ranged segments for a postcode and road-name fragment. Rows
    /// missing a numeric range or endpoint geometry are dropped.
    pub async fn segments(
        &self,
        postcode: &str,
        road_like: &str,
    ) -> Result<Vec<RoadSegment>, StoreError> {
        let pool = self.pool()?;

        let rows: Vec<SegmentRow> = sqlx::query_as(SEGMENTS_SQL)
            .bind(postcode)
            .bind(road_like)
            .fetch_all(pool)
            .await
            .map_err(map_db_error)?;

        let total = rows.len();
        let segments: Vec<RoadSegment> =
            rows.into_iter().filter_map(SegmentRow::into_segment).collect();
        if segments.len() < total {
            warn!(
                postcode,
                dropped = total - segments.len(),
                "dropped address-range rows with unusable geometry"
            );
        }
        Ok(segments)
    }
}

fn map_db_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Configuration(_) => {
            StoreError::Unavailable
        }
        sqlx::Error::Database(db) => {
            let message = db.message().to_lowercase();
            if message.contains("statement timeout") || message.contains("canceling statement") {
                StoreError::Timeout
            } else {
                StoreError::Query(db.message().to_string())
            }
        }
        other => StoreError::Query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_store_reports_unavailable() {
        let store = RoadStore::disabled();
        assert!(!store.is_configured());
        assert!(matches!(
            store.road_names("02835").await,
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(
            store.segments("02835", "Walcott").await,
            Err(StoreError::Unavailable)
        ));
    }

    #[test]
    fn rows_without_geometry_are_dropped() {
        let row = SegmentRow {
            place_id: Some(1),
            startnumber: Some(100),
            endnumber: Some(200),
            step: Some(2),
            road_name: Some("Walcott Avenue".to_string()),
            road_class: Some("highway".to_string()),
            road_type: Some("residential".to_string()),
            start_lon: None,
            start_lat: Some(41.5),
            end_lon: Some(-71.36),
            end_lat: Some(41.51),
        };
        assert!(row.into_segment().is_none());
    }

    #[test]
    fn complete_rows_convert() {
        let row = SegmentRow {
            place_id: Some(1),
            startnumber: Some(200),
            endnumber: Some(100),
            step: None,
            road_name: Some("Walcott Avenue".to_string()),
            road_class: None,
            road_type: None,
            start_lon: Some(-71.37),
            start_lat: Some(41.50),
            end_lon: Some(-71.36),
            end_lat: Some(41.51),
        };
        let segment = row.into_segment().unwrap();
        assert_eq!(segment.start_number, 200);
        assert_eq!(segment.end_number, 100);
        assert_eq!(segment.road_name, "Walcott Avenue");
    }
}
