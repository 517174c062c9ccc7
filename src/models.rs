use chrono::{DateTime, NaiveDate, Utc};
use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::estados;

// ============ Domain enums ============

/// One of the five Brazilian macro-regions.
///
/// Serialized with the hyphenated spelling used by the stored data
/// (`"Centro-Oeste"`); the unhyphenated chart-key spelling is accepted on
/// input for tolerance with older exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regiao {
    Norte,
    Nordeste,
    #[serde(rename = "Centro-Oeste", alias = "CentroOeste")]
    CentroOeste,
    Sudeste,
    Sul,
}

impl Regiao {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regiao::Norte => "Norte",
            Regiao::Nordeste => "Nordeste",
            Regiao::CentroOeste => "Centro-Oeste",
            Regiao::Sudeste => "Sudeste",
            Regiao::Sul => "Sul",
        }
    }

    /// Parses either spelling of the region name. Unknown input maps to `None`.
    pub fn parse(s: &str) -> Option<Regiao> {
        match s.trim() {
            "Norte" => Some(Regiao::Norte),
            "Nordeste" => Some(Regiao::Nordeste),
            "Centro-Oeste" | "CentroOeste" => Some(Regiao::CentroOeste),
            "Sudeste" => Some(Regiao::Sudeste),
            "Sul" => Some(Regiao::Sul),
            _ => None,
        }
    }
}

impl std::fmt::Display for Regiao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lead lifecycle status.
///
/// Stored data spans two schema revisions (`Ativo`/`Inativo` and
/// `Lead`/`Cliente`/`Cancelado`), so the canonical enum carries all five
/// values and classification goes through `is_ativo`/`is_inativo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Ativo,
    Inativo,
    Lead,
    Cliente,
    Cancelado,
}

impl Status {
    /// Active class: operating customers in either schema revision.
    pub fn is_ativo(&self) -> bool {
        matches!(self, Status::Ativo | Status::Cliente)
    }

    /// Inactive class: out-of-operation leads in either schema revision.
    pub fn is_inativo(&self) -> bool {
        matches!(self, Status::Inativo | Status::Cancelado)
    }

    /// Terminal states carry no temperature.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Cliente | Status::Cancelado)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ativo => "Ativo",
            Status::Inativo => "Inativo",
            Status::Lead => "Lead",
            Status::Cliente => "Cliente",
            Status::Cancelado => "Cancelado",
        }
    }

    /// Case-insensitive parse of any revision's status value.
    pub fn parse(s: &str) -> Option<Status> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("ativo") {
            Some(Status::Ativo)
        } else if s.eq_ignore_ascii_case("inativo") {
            Some(Status::Inativo)
        } else if s.eq_ignore_ascii_case("lead") {
            Some(Status::Lead)
        } else if s.eq_ignore_ascii_case("cliente") {
            Some(Status::Cliente)
        } else if s.eq_ignore_ascii_case("cancelado") {
            Some(Status::Cancelado)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commercial temperature of an open lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temperatura {
    Quente,
    Morno,
    Frio,
}

impl Temperatura {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temperatura::Quente => "Quente",
            Temperatura::Morno => "Morno",
            Temperatura::Frio => "Frio",
        }
    }

    /// Case-insensitive parse. Anything unrecognized maps to `None`; this is
    /// the single defaulting site for unparseable temperature values.
    pub fn parse(s: &str) -> Option<Temperatura> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("quente") {
            Some(Temperatura::Quente)
        } else if s.eq_ignore_ascii_case("morno") {
            Some(Temperatura::Morno)
        } else if s.eq_ignore_ascii_case("frio") {
            Some(Temperatura::Frio)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Temperatura {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map coordinate derived for a lead. Never authoritative, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordenadas {
    pub lat: f64,
    pub lng: f64,
}

// ============ Canonical lead ============

/// Canonical lead record.
///
/// All schema drift between revisions (`razaosocial`/`empresa`, lowercase
/// timestamp columns, `"Sim"`/`"Não"` visit flags) is resolved at the
/// persistence and import boundaries; core logic only ever sees this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub nome: String,
    #[serde(alias = "razaosocial", alias = "empresa")]
    pub razao_social: String,
    pub email: String,
    pub telefone: String,
    pub endereco: String,
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    /// Two-letter UF code. Unknown codes are tolerated; the region and map
    /// fallbacks in `estados` handle them.
    pub estado: String,
    pub regiao: Regiao,
    pub status: Status,
    pub temperatura: Option<Temperatura>,
    pub em_projecao: bool,
    pub detalhes_status: String,
    pub visita_feita: bool,
    pub data_visita: Option<NaiveDate>,
    pub data_criacao: Option<DateTime<Utc>>,
    #[serde(alias = "dataultimaatualizacao")]
    pub data_ultima_atualizacao: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordenadas: Option<Coordenadas>,
}

/// Payload for creating or replacing a lead.
///
/// `regiao` is never accepted from the client; it is re-derived from
/// `estado` so the region invariant cannot drift.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[serde(default)]
    pub nome: String,
    #[serde(default, alias = "razaosocial", alias = "empresa")]
    pub razao_social: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub endereco: String,
    #[serde(default)]
    pub numero: String,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub temperatura: Option<Temperatura>,
    #[serde(default)]
    pub em_projecao: bool,
    #[serde(default)]
    pub detalhes_status: String,
    #[serde(default)]
    pub visita_feita: bool,
    #[serde(default)]
    pub data_visita: Option<NaiveDate>,
}

impl NewLead {
    /// Validates the required fields and the email format.
    ///
    /// Mirrors the submit-time checks of the lead form: nome, razão social
    /// and estado block the request; everything else is optional.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut missing = Vec::new();
        if self.nome.trim().is_empty() {
            missing.push("nome");
        }
        if self.razao_social.trim().is_empty() {
            missing.push("razaoSocial");
        }
        if self.estado.trim().is_empty() {
            missing.push("estado");
        }
        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Required fields missing: {}",
                missing.join(", ")
            )));
        }

        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            return Err(AppError::BadRequest(format!(
                "Invalid email address: {}",
                self.email
            )));
        }

        Ok(())
    }

    /// Builds the canonical lead, applying the normalization rules:
    /// UF uppercased, region derived, phone normalized to E.164 when it
    /// parses as a valid Brazilian number, temperature cleared on terminal
    /// statuses.
    pub fn into_lead(self, id: Uuid, created: Option<DateTime<Utc>>) -> Lead {
        let estado = self.estado.trim().to_ascii_uppercase();
        let regiao = estados::regiao_do_estado(&estado);
        let telefone = match normalize_br_phone(&self.telefone) {
            Some(e164) => e164,
            None => self.telefone.trim().to_string(),
        };
        let temperatura = if self.status.is_terminal() {
            None
        } else {
            self.temperatura
        };

        Lead {
            id,
            nome: self.nome.trim().to_string(),
            razao_social: self.razao_social.trim().to_string(),
            email: self.email.trim().to_string(),
            telefone,
            endereco: self.endereco.trim().to_string(),
            numero: self.numero.trim().to_string(),
            bairro: self.bairro.trim().to_string(),
            cidade: self.cidade.trim().to_string(),
            estado,
            regiao,
            status: self.status,
            temperatura,
            em_projecao: self.em_projecao,
            detalhes_status: self.detalhes_status.trim().to_string(),
            visita_feita: self.visita_feita,
            data_visita: self.data_visita,
            data_criacao: created,
            data_ultima_atualizacao: created,
            coordenadas: None,
        }
    }
}

// ============ Dashboard DTOs ============

/// Per-region lead counts. Serialized with the chart-key spellings the
/// dashboard consumes (`CentroOeste`, no hyphen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegiaoDistribution {
    #[serde(rename = "Norte")]
    pub norte: usize,
    #[serde(rename = "Nordeste")]
    pub nordeste: usize,
    #[serde(rename = "CentroOeste")]
    pub centro_oeste: usize,
    #[serde(rename = "Sudeste")]
    pub sudeste: usize,
    #[serde(rename = "Sul")]
    pub sul: usize,
}

impl RegiaoDistribution {
    pub fn increment(&mut self, regiao: Regiao) {
        match regiao {
            Regiao::Norte => self.norte += 1,
            Regiao::Nordeste => self.nordeste += 1,
            Regiao::CentroOeste => self.centro_oeste += 1,
            Regiao::Sudeste => self.sudeste += 1,
            Regiao::Sul => self.sul += 1,
        }
    }

    pub fn get(&self, regiao: Regiao) -> usize {
        match regiao {
            Regiao::Norte => self.norte,
            Regiao::Nordeste => self.nordeste,
            Regiao::CentroOeste => self.centro_oeste,
            Regiao::Sudeste => self.sudeste,
            Regiao::Sul => self.sul,
        }
    }

    pub fn total(&self) -> usize {
        self.norte + self.nordeste + self.centro_oeste + self.sudeste + self.sul
    }
}

/// Summary block rendered as the dashboard metric cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: usize,
    pub leads_ativos: usize,
    pub leads_inativos: usize,
    pub leads_quentes: usize,
    pub leads_frios: usize,
    pub leads_em_projecao: usize,
    pub distribuicao_por_regiao: RegiaoDistribution,
}

// ============ Request DTOs ============

/// Body of the bulk delete endpoint.
#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<Uuid>,
}

/// Response of mutating bulk endpoints.
#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub affected: u64,
}

// ============ Validation helpers ============

/// Validate email address format (RFC 5322 simplified).
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap();

    email_regex.is_match(email)
}

/// Normalize a Brazilian phone number to E.164 (+5511987654321).
///
/// Uses the phonenumber library (port of Google's libphonenumber) with the
/// BR region. Returns `None` when the input does not parse as a valid
/// Brazilian number, in which case callers keep the raw value.
pub fn normalize_br_phone(raw: &str) -> Option<String> {
    if raw.trim().is_empty() || raw.len() < 8 {
        return None;
    }

    match phonenumber::parse(Some(CountryId::BR), raw) {
        Ok(number) if phonenumber::is_valid(&number) => {
            Some(number.format().mode(Mode::E164).to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_new_lead() -> NewLead {
        NewLead {
            nome: "Maria".to_string(),
            razao_social: "Mercado Central LTDA".to_string(),
            email: String::new(),
            telefone: String::new(),
            endereco: String::new(),
            numero: String::new(),
            bairro: String::new(),
            cidade: "Campinas".to_string(),
            estado: "sp".to_string(),
            status: Status::Ativo,
            temperatura: Some(Temperatura::Quente),
            em_projecao: false,
            detalhes_status: String::new(),
            visita_feita: false,
            data_visita: None,
        }
    }

    #[test]
    fn test_validate_requires_nome_razao_social_estado() {
        let mut lead = base_new_lead();
        lead.nome = String::new();
        lead.estado = "  ".to_string();
        let err = lead.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nome"));
        assert!(msg.contains("estado"));
        assert!(!msg.contains("razaoSocial"));
    }

    #[test]
    fn test_validate_rejects_malformed_email() {
        let mut lead = base_new_lead();
        lead.email = "not_an_email".to_string();
        assert!(lead.validate().is_err());

        lead.email = "maria@mercado.com.br".to_string();
        assert!(lead.validate().is_ok());
    }

    #[test]
    fn test_into_lead_derives_region_and_uppercases_uf() {
        let lead = base_new_lead().into_lead(Uuid::new_v4(), None);
        assert_eq!(lead.estado, "SP");
        assert_eq!(lead.regiao, Regiao::Sudeste);
    }

    #[test]
    fn test_into_lead_unknown_uf_falls_back_to_sudeste() {
        let mut new = base_new_lead();
        new.estado = "XX".to_string();
        let lead = new.into_lead(Uuid::new_v4(), None);
        assert_eq!(lead.regiao, Regiao::Sudeste);
    }

    #[test]
    fn test_into_lead_clears_temperatura_on_terminal_status() {
        let mut new = base_new_lead();
        new.status = Status::Cancelado;
        new.temperatura = Some(Temperatura::Quente);
        let lead = new.into_lead(Uuid::new_v4(), None);
        assert_eq!(lead.temperatura, None);

        let mut new = base_new_lead();
        new.status = Status::Lead;
        new.temperatura = Some(Temperatura::Morno);
        let lead = new.into_lead(Uuid::new_v4(), None);
        assert_eq!(lead.temperatura, Some(Temperatura::Morno));
    }

    #[test]
    fn test_into_lead_normalizes_valid_br_phone() {
        let mut new = base_new_lead();
        new.telefone = "(11) 98765-4321".to_string();
        let lead = new.into_lead(Uuid::new_v4(), None);
        assert_eq!(lead.telefone, "+5511987654321");
    }

    #[test]
    fn test_into_lead_keeps_unparseable_phone_verbatim() {
        let mut new = base_new_lead();
        new.telefone = "ramal 42".to_string();
        let lead = new.into_lead(Uuid::new_v4(), None);
        assert_eq!(lead.telefone, "ramal 42");
    }

    #[test]
    fn test_status_classes_cover_both_revisions() {
        assert!(Status::Ativo.is_ativo());
        assert!(Status::Cliente.is_ativo());
        assert!(Status::Inativo.is_inativo());
        assert!(Status::Cancelado.is_inativo());
        assert!(!Status::Lead.is_ativo());
        assert!(!Status::Lead.is_inativo());
    }

    #[test]
    fn test_temperatura_parse_is_case_insensitive() {
        assert_eq!(Temperatura::parse("QUENTE"), Some(Temperatura::Quente));
        assert_eq!(Temperatura::parse(" morno "), Some(Temperatura::Morno));
        assert_eq!(Temperatura::parse("gelado"), None);
        assert_eq!(Temperatura::parse(""), None);
    }

    #[test]
    fn test_new_lead_accepts_legacy_field_aliases() {
        let json = r#"{"nome":"Ana","empresa":"Padaria Sol","estado":"RJ"}"#;
        let new: NewLead = serde_json::from_str(json).unwrap();
        assert_eq!(new.razao_social, "Padaria Sol");

        let json = r#"{"nome":"Ana","razaosocial":"Padaria Lua","estado":"RJ"}"#;
        let new: NewLead = serde_json::from_str(json).unwrap();
        assert_eq!(new.razao_social, "Padaria Lua");
    }

    #[test]
    fn test_regiao_serde_spellings() {
        let r: Regiao = serde_json::from_str("\"Centro-Oeste\"").unwrap();
        assert_eq!(r, Regiao::CentroOeste);
        let r: Regiao = serde_json::from_str("\"CentroOeste\"").unwrap();
        assert_eq!(r, Regiao::CentroOeste);
        assert_eq!(
            serde_json::to_string(&Regiao::CentroOeste).unwrap(),
            "\"Centro-Oeste\""
        );
    }
}
