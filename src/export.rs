//! Lead list and dashboard exports.
//!
//! The core contribution here is row shaping — which fields, in which
//! order, under which Portuguese header labels, honoring a field-exclusion
//! list. The file formats themselves are delegated to the `csv` crate and
//! to genpdf.

use genpdf::{elements, style, Element};

use crate::errors::AppError;
use crate::models::{DashboardStats, Lead, Regiao};

/// One export column: spreadsheet header, canonical field key (used by the
/// exclusion list) and the cell formatter.
pub struct ExportColumn {
    pub header: &'static str,
    pub key: &'static str,
    value: fn(&Lead) -> String,
}

/// Full column set, in spreadsheet order.
pub const COLUMNS: &[ExportColumn] = &[
    ExportColumn { header: "Nome", key: "nome", value: |l| l.nome.clone() },
    ExportColumn { header: "Razão Social", key: "razao_social", value: |l| l.razao_social.clone() },
    ExportColumn { header: "Email", key: "email", value: |l| l.email.clone() },
    ExportColumn { header: "Telefone", key: "telefone", value: |l| l.telefone.clone() },
    ExportColumn { header: "Endereço", key: "endereco", value: |l| l.endereco.clone() },
    ExportColumn { header: "Numero", key: "numero", value: |l| l.numero.clone() },
    ExportColumn { header: "Bairro", key: "bairro", value: |l| l.bairro.clone() },
    ExportColumn { header: "Cidade", key: "cidade", value: |l| l.cidade.clone() },
    ExportColumn { header: "Estado", key: "estado", value: |l| l.estado.clone() },
    ExportColumn { header: "Região", key: "regiao", value: |l| l.regiao.to_string() },
    ExportColumn {
        header: "Data da Última Visita",
        key: "data_visita",
        value: |l| {
            l.data_visita
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_default()
        },
    },
    ExportColumn { header: "Status", key: "status", value: |l| l.status.to_string() },
    ExportColumn {
        header: "Temperatura",
        key: "temperatura",
        value: |l| l.temperatura.map(|t| t.to_string()).unwrap_or_default(),
    },
    ExportColumn { header: "Em Projeção", key: "em_projecao", value: |l| sim_nao(l.em_projecao) },
    ExportColumn { header: "Visita feita", key: "visita_feita", value: |l| sim_nao(l.visita_feita) },
    ExportColumn {
        header: "Detalhes Status",
        key: "detalhes_status",
        value: |l| l.detalhes_status.clone(),
    },
];

fn sim_nao(value: bool) -> String {
    if value { "Sim" } else { "Não" }.to_string()
}

/// Columns left after applying the exclusion list (keys, case-insensitive).
pub fn selected_columns(exclude: &[String]) -> Vec<&'static ExportColumn> {
    COLUMNS
        .iter()
        .filter(|c| !exclude.iter().any(|e| e.trim().eq_ignore_ascii_case(c.key)))
        .collect()
}

/// Renders the lead list as CSV.
pub fn leads_to_csv(leads: &[Lead], exclude: &[String]) -> Result<Vec<u8>, AppError> {
    let columns = selected_columns(exclude);
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|c| c.header))
        .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))?;

    for lead in leads {
        writer
            .write_record(columns.iter().map(|c| (c.value)(lead)))
            .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))
}

/// Cells of the condensed PDF table row.
fn pdf_row(lead: &Lead) -> [String; 6] {
    [
        lead.nome.clone(),
        lead.razao_social.clone(),
        lead.cidade.clone(),
        lead.estado.clone(),
        lead.status.to_string(),
        lead.temperatura.map(|t| t.to_string()).unwrap_or_default(),
    ]
}

fn load_fonts(fonts_dir: &str) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, AppError> {
    genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|e| AppError::InternalError(format!("PDF font not found in {}: {}", fonts_dir, e)))
}

/// Renders the lead list as a landscape A4 PDF table.
pub fn leads_to_pdf(leads: &[Lead], fonts_dir: &str) -> Result<Vec<u8>, AppError> {
    let font_family = load_fonts(fonts_dir)?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title("Lista de Leads");
    // A4 landscape; the table is too wide for portrait.
    doc.set_paper_size(genpdf::Size::new(297.0, 210.0));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new("Lista de Leads")
            .styled(style::Style::new().bold().with_font_size(16)),
    );
    doc.push(elements::Break::new(1.5));

    let mut table = elements::TableLayout::new(vec![3, 3, 2, 1, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Nome").styled(style_bold))
        .element(elements::Paragraph::new("Razão Social").styled(style_bold))
        .element(elements::Paragraph::new("Cidade").styled(style_bold))
        .element(elements::Paragraph::new("UF").styled(style_bold))
        .element(elements::Paragraph::new("Status").styled(style_bold))
        .element(elements::Paragraph::new("Temperatura").styled(style_bold))
        .push()
        .map_err(|e| AppError::InternalError(format!("PDF table error: {}", e)))?;

    for lead in leads {
        let mut row = table.row();
        for cell in pdf_row(lead) {
            row = row.element(elements::Paragraph::new(cell));
        }
        row.push()
            .map_err(|e| AppError::InternalError(format!("PDF table error: {}", e)))?;
    }

    doc.push(table);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::InternalError(format!("PDF render failed: {}", e)))?;
    Ok(buffer)
}

/// Renders the dashboard summary (metric cards + region distribution) as PDF.
pub fn dashboard_to_pdf(stats: &DashboardStats, fonts_dir: &str) -> Result<Vec<u8>, AppError> {
    let font_family = load_fonts(fonts_dir)?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title("Dashboard de Leads");
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new("Dashboard de Leads")
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    doc.push(elements::Break::new(1.5));

    let metrics = [
        ("Total de Leads", stats.total_leads),
        ("Leads Ativos", stats.leads_ativos),
        ("Leads Inativos", stats.leads_inativos),
        ("Leads Quentes", stats.leads_quentes),
        ("Leads Frios", stats.leads_frios),
        ("Em Projeção", stats.leads_em_projecao),
    ];
    for (label, value) in metrics {
        doc.push(elements::Paragraph::new(format!("{}: {}", label, value)));
    }

    doc.push(elements::Break::new(1.5));
    doc.push(
        elements::Paragraph::new("Distribuição por Região")
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Break::new(1.0));

    let mut table = elements::TableLayout::new(vec![3, 1]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Região").styled(style_bold))
        .element(elements::Paragraph::new("Leads").styled(style_bold))
        .push()
        .map_err(|e| AppError::InternalError(format!("PDF table error: {}", e)))?;

    let regioes = [
        Regiao::Norte,
        Regiao::Nordeste,
        Regiao::CentroOeste,
        Regiao::Sudeste,
        Regiao::Sul,
    ];
    for regiao in regioes {
        table
            .row()
            .element(elements::Paragraph::new(regiao.as_str()))
            .element(elements::Paragraph::new(
                stats.distribuicao_por_regiao.get(regiao).to_string(),
            ))
            .push()
            .map_err(|e| AppError::InternalError(format!("PDF table error: {}", e)))?;
    }

    doc.push(table);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::InternalError(format!("PDF render failed: {}", e)))?;
    Ok(buffer)
}
