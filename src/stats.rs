//! Aggregation engine for the dashboard.
//!
//! Pure functions over a lead collection: the summary card counters, the
//! per-state bar chart series and the per-region pie chart series. All of
//! them are single-pass (or one grouping pass plus a sort), never mutate
//! their input and yield all-zero/empty output for an empty collection.

use serde::{Deserialize, Serialize};

use crate::models::{DashboardStats, Lead, Regiao, RegiaoDistribution, Temperatura};

/// The bar chart keeps only the busiest states.
pub const TOP_ESTADOS: usize = 8;

/// One bar of the per-state chart: total leads plus the active/inactive split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstadoChartEntry {
    pub estado: String,
    pub total: usize,
    pub ativos: usize,
    pub inativos: usize,
}

/// One slice of the per-region chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegiaoChartEntry {
    pub regiao: Regiao,
    pub total: usize,
    /// Share of all leads, rounded to one decimal place.
    pub percentual: f64,
}

/// Computes the dashboard summary from the full lead collection.
pub fn aggregate(leads: &[Lead]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_leads: leads.len(),
        leads_ativos: 0,
        leads_inativos: 0,
        leads_quentes: 0,
        leads_frios: 0,
        leads_em_projecao: 0,
        distribuicao_por_regiao: RegiaoDistribution::default(),
    };

    for lead in leads {
        if lead.status.is_ativo() {
            stats.leads_ativos += 1;
        }
        if lead.status.is_inativo() {
            stats.leads_inativos += 1;
        }
        match lead.temperatura {
            Some(Temperatura::Quente) => stats.leads_quentes += 1,
            Some(Temperatura::Frio) => stats.leads_frios += 1,
            _ => {}
        }
        if lead.em_projecao {
            stats.leads_em_projecao += 1;
        }
        stats.distribuicao_por_regiao.increment(lead.regiao);
    }

    stats
}

/// Per-state chart data: groups in first-encounter order, sorted descending
/// by total and truncated to the top `TOP_ESTADOS`.
///
/// The sort is stable, so states with equal totals keep the order in which
/// they first appeared in the collection.
pub fn estados_chart(leads: &[Lead]) -> Vec<EstadoChartEntry> {
    let mut entries: Vec<EstadoChartEntry> = Vec::new();

    for lead in leads {
        match entries.iter_mut().find(|e| e.estado == lead.estado) {
            Some(entry) => {
                entry.total += 1;
                if lead.status.is_ativo() {
                    entry.ativos += 1;
                } else {
                    entry.inativos += 1;
                }
            }
            None => {
                let ativo = lead.status.is_ativo();
                entries.push(EstadoChartEntry {
                    estado: lead.estado.clone(),
                    total: 1,
                    ativos: if ativo { 1 } else { 0 },
                    inativos: if ativo { 0 } else { 1 },
                });
            }
        }
    }

    entries.sort_by(|a, b| b.total.cmp(&a.total));
    entries.truncate(TOP_ESTADOS);
    entries
}

/// Per-region chart data with percentage shares, regions in first-encounter
/// order. Percentages are 0 for an empty collection, never NaN.
pub fn regioes_chart(leads: &[Lead]) -> Vec<RegiaoChartEntry> {
    let mut entries: Vec<RegiaoChartEntry> = Vec::new();

    for lead in leads {
        match entries.iter_mut().find(|e| e.regiao == lead.regiao) {
            Some(entry) => entry.total += 1,
            None => entries.push(RegiaoChartEntry {
                regiao: lead.regiao,
                total: 1,
                percentual: 0.0,
            }),
        }
    }

    let total = leads.len();
    if total > 0 {
        for entry in &mut entries {
            let share = entry.total as f64 / total as f64 * 100.0;
            entry.percentual = (share * 10.0).round() / 10.0;
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, Temperatura};
    use uuid::Uuid;

    fn lead(estado: &str, status: Status, temperatura: Option<Temperatura>) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            nome: "Teste".to_string(),
            razao_social: "Empresa Teste".to_string(),
            email: String::new(),
            telefone: String::new(),
            endereco: String::new(),
            numero: String::new(),
            bairro: String::new(),
            cidade: String::new(),
            estado: estado.to_string(),
            regiao: crate::estados::regiao_do_estado(estado),
            status,
            temperatura,
            em_projecao: false,
            detalhes_status: String::new(),
            visita_feita: false,
            data_visita: None,
            data_criacao: None,
            data_ultima_atualizacao: None,
            coordenadas: None,
        }
    }

    #[test]
    fn test_empty_collection_yields_all_zero_stats() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.leads_ativos, 0);
        assert_eq!(stats.leads_inativos, 0);
        assert_eq!(stats.leads_quentes, 0);
        assert_eq!(stats.leads_frios, 0);
        assert_eq!(stats.leads_em_projecao, 0);
        assert_eq!(stats.distribuicao_por_regiao.total(), 0);
        assert!(estados_chart(&[]).is_empty());
        assert!(regioes_chart(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_worked_example() {
        let leads = vec![
            lead("SP", Status::Ativo, None),
            lead("SP", Status::Inativo, None),
            lead("RJ", Status::Ativo, None),
        ];
        let stats = aggregate(&leads);
        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.leads_ativos, 2);
        assert_eq!(stats.leads_inativos, 1);
        assert_eq!(stats.distribuicao_por_regiao.sudeste, 3);

        let chart = estados_chart(&leads);
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].estado, "SP");
        assert_eq!(chart[0].total, 2);
        assert_eq!(chart[1].estado, "RJ");
        assert_eq!(chart[1].total, 1);
    }

    #[test]
    fn test_aggregate_counts_both_status_revisions() {
        let leads = vec![
            lead("SP", Status::Cliente, None),
            lead("SP", Status::Cancelado, None),
            lead("BA", Status::Ativo, None),
            lead("BA", Status::Lead, Some(Temperatura::Quente)),
        ];
        let stats = aggregate(&leads);
        assert_eq!(stats.leads_ativos, 2); // Cliente + Ativo
        assert_eq!(stats.leads_inativos, 1); // Cancelado
        assert_eq!(stats.leads_quentes, 1);
    }

    #[test]
    fn test_temperature_and_projection_counters() {
        let mut hot = lead("SP", Status::Ativo, Some(Temperatura::Quente));
        hot.em_projecao = true;
        let leads = vec![
            hot,
            lead("SP", Status::Ativo, Some(Temperatura::Frio)),
            lead("SP", Status::Ativo, Some(Temperatura::Morno)),
            lead("SP", Status::Ativo, None),
        ];
        let stats = aggregate(&leads);
        assert_eq!(stats.leads_quentes, 1);
        assert_eq!(stats.leads_frios, 1);
        assert_eq!(stats.leads_em_projecao, 1);
    }

    #[test]
    fn test_region_distribution_sums_to_total() {
        let leads = vec![
            lead("AM", Status::Ativo, None),
            lead("BA", Status::Ativo, None),
            lead("DF", Status::Inativo, None),
            lead("SP", Status::Ativo, None),
            lead("RS", Status::Inativo, None),
            lead("XX", Status::Ativo, None), // unknown UF lands in Sudeste
        ];
        let stats = aggregate(&leads);
        assert_eq!(stats.distribuicao_por_regiao.total(), leads.len());
        assert_eq!(stats.distribuicao_por_regiao.norte, 1);
        assert_eq!(stats.distribuicao_por_regiao.sudeste, 2);
    }

    #[test]
    fn test_estados_chart_truncates_to_top_8() {
        let ufs = ["SP", "RJ", "MG", "BA", "RS", "PR", "SC", "GO", "PE", "CE"];
        let mut leads = Vec::new();
        // UF at position i occurs (10 - i) times, so the order is already
        // descending and the two smallest groups must be cut.
        for (i, uf) in ufs.iter().enumerate() {
            for _ in 0..(10 - i) {
                leads.push(lead(uf, Status::Ativo, None));
            }
        }
        let chart = estados_chart(&leads);
        assert_eq!(chart.len(), TOP_ESTADOS);
        assert_eq!(chart[0].estado, "SP");
        assert!(chart.windows(2).all(|w| w[0].total >= w[1].total));
        assert!(!chart.iter().any(|e| e.estado == "CE"));
    }

    #[test]
    fn test_estados_chart_ties_preserve_encounter_order() {
        let leads = vec![
            lead("RJ", Status::Ativo, None),
            lead("SP", Status::Ativo, None),
            lead("MG", Status::Ativo, None),
        ];
        let chart = estados_chart(&leads);
        let order: Vec<&str> = chart.iter().map(|e| e.estado.as_str()).collect();
        assert_eq!(order, vec!["RJ", "SP", "MG"]);
    }

    #[test]
    fn test_regioes_chart_percentages() {
        let leads = vec![
            lead("SP", Status::Ativo, None),
            lead("RJ", Status::Ativo, None),
            lead("BA", Status::Ativo, None),
        ];
        let chart = regioes_chart(&leads);
        assert_eq!(chart.len(), 2);
        assert_eq!(chart[0].regiao, Regiao::Sudeste);
        assert_eq!(chart[0].total, 2);
        assert_eq!(chart[0].percentual, 66.7);
        assert_eq!(chart[1].regiao, Regiao::Nordeste);
        assert_eq!(chart[1].percentual, 33.3);
    }
}
