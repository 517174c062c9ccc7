//! Persistence layer for leads.
//!
//! A thin service over the Postgres pool using plain runtime queries.
//! Writes always target the canonical column set; reads go through a single
//! row adapter that tolerates the column spellings of earlier schema
//! revisions (`razaosocial`/`empresa`, `datacriacao`,
//! `dataultimaatualizacao`, text `"Sim"`/`"Não"` visit flags), so the core
//! logic never sees the drift.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::errors::AppError;
use crate::estados;
use crate::models::{Lead, NewLead, Regiao, Status, Temperatura};

/// Database storage service for lead records.
pub struct LeadStorage {
    pool: PgPool,
}

impl LeadStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the full collection. Order is whatever the store returns;
    /// the engines downstream are defined over arbitrary order.
    pub async fn list_all(&self) -> Result<Vec<Lead>, AppError> {
        let rows = sqlx::query("SELECT * FROM leads")
            .fetch_all(&self.pool)
            .await?;

        let mut leads = Vec::with_capacity(rows.len());
        for row in &rows {
            leads.push(lead_from_row(row)?);
        }
        Ok(leads)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let row = sqlx::query("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(lead_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Inserts a new lead with a server-assigned id and creation timestamp.
    pub async fn insert(&self, new: NewLead) -> Result<Lead, AppError> {
        let lead = new.into_lead(Uuid::new_v4(), Some(Utc::now()));
        self.insert_lead(&self.pool, &lead).await?;
        Ok(lead)
    }

    /// Full-field replace. Returns the stored lead, or `None` when the id
    /// does not exist. Last write wins; there is no concurrency check.
    pub async fn update(&self, id: Uuid, new: NewLead) -> Result<Option<Lead>, AppError> {
        let existing = match self.get(id).await? {
            Some(lead) => lead,
            None => return Ok(None),
        };

        let mut lead = new.into_lead(id, existing.data_criacao);
        lead.data_ultima_atualizacao = Some(Utc::now());

        let result = sqlx::query(
            r#"
            UPDATE leads SET
                nome = $2, razao_social = $3, email = $4, telefone = $5,
                endereco = $6, numero = $7, bairro = $8, cidade = $9,
                estado = $10, regiao = $11, status = $12, temperatura = $13,
                em_projecao = $14, detalhes_status = $15, visita_feita = $16,
                data_visita = $17, data_ultima_atualizacao = $18
            WHERE id = $1
            "#,
        )
        .bind(lead.id)
        .bind(&lead.nome)
        .bind(&lead.razao_social)
        .bind(&lead.email)
        .bind(&lead.telefone)
        .bind(&lead.endereco)
        .bind(&lead.numero)
        .bind(&lead.bairro)
        .bind(&lead.cidade)
        .bind(&lead.estado)
        .bind(lead.regiao.as_str())
        .bind(lead.status.as_str())
        .bind(lead.temperatura.map(|t| t.as_str()))
        .bind(lead.em_projecao)
        .bind(&lead.detalhes_status)
        .bind(lead.visita_feita)
        .bind(lead.data_visita)
        .bind(lead.data_ultima_atualizacao)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(lead))
    }

    /// Deletes one lead; `false` when the id was not present.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes a batch of ids in a single statement. Either the statement
    /// succeeds as a whole or the call errors; ids that were already gone
    /// simply do not count toward the result.
    pub async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM leads WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Inserts a batch of already-built leads inside one transaction, so an
    /// import either lands completely or not at all.
    pub async fn insert_many(&self, leads: &[Lead]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        for lead in leads {
            self.insert_lead(&mut *tx, lead).await?;
        }
        tx.commit().await?;
        Ok(leads.len() as u64)
    }

    async fn insert_lead<'e, E>(&self, executor: E, lead: &Lead) -> Result<(), AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO leads (
                id, nome, razao_social, email, telefone,
                endereco, numero, bairro, cidade, estado, regiao,
                status, temperatura, em_projecao, detalhes_status,
                visita_feita, data_visita, data_criacao, data_ultima_atualizacao
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19
            )
            "#,
        )
        .bind(lead.id)
        .bind(&lead.nome)
        .bind(&lead.razao_social)
        .bind(&lead.email)
        .bind(&lead.telefone)
        .bind(&lead.endereco)
        .bind(&lead.numero)
        .bind(&lead.bairro)
        .bind(&lead.cidade)
        .bind(&lead.estado)
        .bind(lead.regiao.as_str())
        .bind(lead.status.as_str())
        .bind(lead.temperatura.map(|t| t.as_str()))
        .bind(lead.em_projecao)
        .bind(&lead.detalhes_status)
        .bind(lead.visita_feita)
        .bind(lead.data_visita)
        .bind(lead.data_criacao)
        .bind(lead.data_ultima_atualizacao)
        .execute(executor)
        .await?;
        Ok(())
    }
}

/// Maps a row to the canonical lead, absorbing legacy column spellings.
///
/// Text fields tolerate NULL; the status/temperature/region strings go
/// through the enum parsers with the documented fallbacks (unknown status →
/// `Ativo`, unparseable temperature → none, region re-derived from the UF).
fn lead_from_row(row: &PgRow) -> Result<Lead, AppError> {
    let id: Uuid = row.try_get("id")?;

    let nome = text_column(row, &["nome"]);
    let razao_social = text_column(row, &["razao_social", "razaosocial", "empresa"]);
    let email = text_column(row, &["email"]);
    let telefone = text_column(row, &["telefone"]);
    let endereco = text_column(row, &["endereco"]);
    let numero = text_column(row, &["numero"]);
    let bairro = text_column(row, &["bairro"]);
    let cidade = text_column(row, &["cidade"]);
    let estado = text_column(row, &["estado"]);

    let status = match Status::parse(&text_column(row, &["status"])) {
        Some(status) => status,
        None => {
            tracing::warn!("Lead {} has unknown status value, defaulting to Ativo", id);
            Status::Ativo
        }
    };

    let temperatura = if status.is_terminal() {
        None
    } else {
        Temperatura::parse(&text_column(row, &["temperatura"]))
    };

    let regiao = Regiao::parse(&text_column(row, &["regiao"]))
        .unwrap_or_else(|| estados::regiao_do_estado(&estado));

    let em_projecao = bool_column(row, &["em_projecao", "emprojecao"]);
    let visita_feita = bool_column(row, &["visita_feita", "visitafeita"]);

    let data_visita: Option<NaiveDate> = date_column(row, &["data_visita", "datavisita"]);
    let data_criacao: Option<DateTime<Utc>> = timestamp_column(row, &["data_criacao", "datacriacao"]);
    let data_ultima_atualizacao: Option<DateTime<Utc>> =
        timestamp_column(row, &["data_ultima_atualizacao", "dataultimaatualizacao"]);

    Ok(Lead {
        id,
        nome,
        razao_social,
        email,
        telefone,
        endereco,
        numero,
        bairro,
        cidade,
        estado,
        regiao,
        status,
        temperatura,
        em_projecao,
        detalhes_status: text_column(row, &["detalhes_status", "detalhesstatus"]),
        visita_feita,
        data_visita,
        data_criacao,
        data_ultima_atualizacao,
        coordenadas: None,
    })
}

/// First readable text column among the given names; NULL and absent both
/// collapse to an empty string.
fn text_column(row: &PgRow, names: &[&str]) -> String {
    for name in names {
        if let Ok(value) = row.try_get::<Option<String>, _>(*name) {
            return value.unwrap_or_default();
        }
    }
    String::new()
}

/// Boolean column that may be stored as BOOL or as legacy `"Sim"`/`"Não"` text.
fn bool_column(row: &PgRow, names: &[&str]) -> bool {
    for name in names {
        if let Ok(value) = row.try_get::<Option<bool>, _>(*name) {
            return value.unwrap_or(false);
        }
        if let Ok(value) = row.try_get::<Option<String>, _>(*name) {
            return matches!(value.as_deref(), Some(v) if v.eq_ignore_ascii_case("sim"));
        }
    }
    false
}

fn date_column(row: &PgRow, names: &[&str]) -> Option<NaiveDate> {
    for name in names {
        if let Ok(value) = row.try_get::<Option<NaiveDate>, _>(*name) {
            return value;
        }
    }
    None
}

fn timestamp_column(row: &PgRow, names: &[&str]) -> Option<DateTime<Utc>> {
    for name in names {
        if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>(*name) {
            return value;
        }
    }
    None
}
