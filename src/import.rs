//! Spreadsheet import.
//!
//! Parses tabular rows keyed by the human-readable Portuguese headers the
//! planilhas use (`"Nome"`, `"Razão Social"`, `"Em Projeção"`, …) into
//! canonical leads, applying the same state→region derivation and
//! defaulting rules as manual entry. Parsing is all-or-nothing: a malformed
//! file rejects the whole import before anything is written.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Lead, NewLead, Status, Temperatura};

/// Parses a CSV document into leads with server-assigned ids.
///
/// Header matching is tolerant of the spellings that circulated across
/// revisions (`Razão Social`/`Empresa`, `Número`/`Numero`). Missing columns
/// or empty cells fall back to the manual-entry defaults: empty strings,
/// status `Ativo`, no temperature.
pub fn parse_csv(data: &[u8]) -> Result<Vec<Lead>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::ImportError(format!("Unreadable CSV header: {}", e)))?
        .clone();

    let column = |candidates: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| candidates.iter().any(|c| h.trim().eq_ignore_ascii_case(c)))
    };

    let col_nome = column(&["Nome"]);
    let col_razao_social = column(&["Razão Social", "Empresa"]);
    let col_email = column(&["Email", "E-mail"]);
    let col_telefone = column(&["Telefone"]);
    let col_endereco = column(&["Endereço", "Endereco"]);
    let col_numero = column(&["Número", "Numero"]);
    let col_bairro = column(&["Bairro"]);
    let col_cidade = column(&["Cidade"]);
    let col_estado = column(&["Estado"]);
    let col_status = column(&["Status"]);
    let col_temperatura = column(&["Temperatura"]);
    let col_em_projecao = column(&["Em Projeção", "Em Projecao"]);
    let col_detalhes = column(&["Detalhes do Status", "Detalhes Status"]);
    let col_visita_feita = column(&["Visita feita", "Visita Feita"]);
    let col_data_visita = column(&["Data da Visita", "Data da Última Visita"]);

    let now = Utc::now();
    let mut leads = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::ImportError(format!("Malformed CSV at data row {}: {}", line + 1, e))
        })?;

        let cell = |col: Option<usize>| -> String {
            col.and_then(|i| record.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let new = NewLead {
            nome: cell(col_nome),
            razao_social: cell(col_razao_social),
            email: cell(col_email),
            telefone: cell(col_telefone),
            endereco: cell(col_endereco),
            numero: cell(col_numero),
            bairro: cell(col_bairro),
            cidade: cell(col_cidade),
            estado: cell(col_estado),
            status: Status::parse(&cell(col_status)).unwrap_or_default(),
            temperatura: Temperatura::parse(&cell(col_temperatura)),
            em_projecao: parse_sim(&cell(col_em_projecao)),
            detalhes_status: cell(col_detalhes),
            visita_feita: parse_sim(&cell(col_visita_feita)),
            data_visita: parse_data(&cell(col_data_visita)),
        };

        leads.push(new.into_lead(Uuid::new_v4(), Some(now)));
    }

    Ok(leads)
}

/// `"Sim"` means yes; anything else (including blank) means no.
fn parse_sim(value: &str) -> bool {
    value.eq_ignore_ascii_case("sim")
}

/// Accepts ISO (`2024-03-01`) and Brazilian (`01/03/2024`) dates.
fn parse_data(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}
