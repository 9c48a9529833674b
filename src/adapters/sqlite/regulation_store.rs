//! SQLite implementation of the RegulationStore.
//!
//! Neighborhood lookups take the caller's spelling variants and match them
//! uppercased against the stored names; the tables keep the original
//! (sometimes unaccented) spellings from the source spreadsheets.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Capabilities, RegimeRow, RiskRow, ZoneMembership};
use crate::domain::ports::RegulationStore;

#[derive(Clone)]
pub struct SqliteRegulationStore {
    pool: SqlitePool,
}

impl SqliteRegulationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[async_trait]
impl RegulationStore for SqliteRegulationStore {
    async fn regime_by_neighborhood(&self, patterns: &[String]) -> DomainResult<Vec<RegimeRow>> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT bairro, zona, altura_maxima, coef_aproveitamento_basico, \
             coef_aproveitamento_maximo, taxa_ocupacao FROM regime_urbanistico \
             WHERE UPPER(bairro) IN ({}) ORDER BY bairro, zona",
            placeholders(patterns.len())
        );
        let mut query = sqlx::query_as::<_, RegimeDbRow>(&sql);
        for pattern in patterns {
            query = query.bind(pattern.to_uppercase());
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn regime_by_zone(&self, zone: &str) -> DomainResult<Vec<RegimeRow>> {
        let rows: Vec<RegimeDbRow> = sqlx::query_as(
            "SELECT bairro, zona, altura_maxima, coef_aproveitamento_basico, \
             coef_aproveitamento_maximo, taxa_ocupacao FROM regime_urbanistico \
             WHERE UPPER(zona) = ? ORDER BY bairro",
        )
        .bind(zone.to_uppercase())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn zones_for_neighborhood(
        &self,
        patterns: &[String],
    ) -> DomainResult<Vec<ZoneMembership>> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT bairro, zona, total_zonas_no_bairro FROM zots_bairros \
             WHERE UPPER(bairro) IN ({}) ORDER BY zona",
            placeholders(patterns.len())
        );
        let mut query = sqlx::query_as::<_, MembershipDbRow>(&sql);
        for pattern in patterns {
            query = query.bind(pattern.to_uppercase());
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn neighborhoods_in_zone(&self, zone: &str) -> DomainResult<Vec<ZoneMembership>> {
        let rows: Vec<MembershipDbRow> = sqlx::query_as(
            "SELECT bairro, zona, total_zonas_no_bairro FROM zots_bairros \
             WHERE UPPER(zona) = ? ORDER BY bairro",
        )
        .bind(zone.to_uppercase())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn neighborhood_count(&self) -> DomainResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(DISTINCT bairro) FROM zots_bairros")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn tallest_regime(&self) -> DomainResult<Option<RegimeRow>> {
        let row: Option<RegimeDbRow> = sqlx::query_as(
            "SELECT bairro, zona, altura_maxima, coef_aproveitamento_basico, \
             coef_aproveitamento_maximo, taxa_ocupacao FROM regime_urbanistico \
             WHERE altura_maxima IS NOT NULL ORDER BY altura_maxima DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn risks_for_neighborhood(&self, patterns: &[String]) -> DomainResult<Vec<RiskRow>> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT bairro, nivel_risco, tipo_risco FROM bairros_risco \
             WHERE UPPER(bairro) IN ({}) ORDER BY bairro",
            placeholders(patterns.len())
        );
        let mut query = sqlx::query_as::<_, RiskDbRow>(&sql);
        for pattern in patterns {
            query = query.bind(pattern.to_uppercase());
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn capabilities(&self) -> DomainResult<Capabilities> {
        let (regime_rows,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM regime_urbanistico")
                .fetch_one(&self.pool)
                .await?;
        let (zone_rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM zots_bairros")
            .fetch_one(&self.pool)
            .await?;
        let (risk_rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bairros_risco")
            .fetch_one(&self.pool)
            .await?;

        let mut domains = Vec::new();
        if regime_rows > 0 {
            domains.push("regime_urbanistico".to_string());
        }
        if zone_rows > 0 {
            domains.push("zots_bairros".to_string());
        }
        if risk_rows > 0 {
            domains.push("bairros_risco".to_string());
        }

        Ok(Capabilities {
            domains,
            regime_queries: regime_rows > 0,
            vector_search: true,
            risk_data: risk_rows > 0,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RegimeDbRow {
    bairro: String,
    zona: String,
    altura_maxima: Option<f64>,
    coef_aproveitamento_basico: Option<f64>,
    coef_aproveitamento_maximo: Option<f64>,
    taxa_ocupacao: Option<f64>,
}

impl From<RegimeDbRow> for RegimeRow {
    fn from(row: RegimeDbRow) -> Self {
        Self {
            neighborhood: row.bairro,
            zone: row.zona,
            max_height_m: row.altura_maxima,
            base_utilization_coefficient: row.coef_aproveitamento_basico,
            max_utilization_coefficient: row.coef_aproveitamento_maximo,
            occupancy_rate: row.taxa_ocupacao,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MembershipDbRow {
    bairro: String,
    zona: String,
    total_zonas_no_bairro: Option<i64>,
}

impl From<MembershipDbRow> for ZoneMembership {
    fn from(row: MembershipDbRow) -> Self {
        Self {
            neighborhood: row.bairro,
            zone: row.zona,
            zones_in_neighborhood: row.total_zonas_no_bairro,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RiskDbRow {
    bairro: String,
    nivel_risco: Option<String>,
    tipo_risco: Option<String>,
}

impl From<RiskDbRow> for RiskRow {
    fn from(row: RiskDbRow) -> Self {
        Self {
            neighborhood: row.bairro,
            risk_level: row.nivel_risco,
            risk_kind: row.tipo_risco,
        }
    }
}
