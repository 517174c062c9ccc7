/// Property-based tests using proptest
/// Tests invariants of the aggregation engine, the filter engine and the
/// synthetic coordinate assigner that should hold for all inputs.
use proptest::prelude::*;
use uuid::Uuid;

use aghora_leads_api::filters::{LeadFilter, StatusFilter};
use aghora_leads_api::geo;
use aghora_leads_api::models::{Lead, Regiao, Status, Temperatura};
use aghora_leads_api::stats;

fn status_strategy() -> impl Strategy<Value = Status> {
    prop::sample::select(vec![
        Status::Ativo,
        Status::Inativo,
        Status::Lead,
        Status::Cliente,
        Status::Cancelado,
    ])
}

fn temperatura_strategy() -> impl Strategy<Value = Option<Temperatura>> {
    prop::sample::select(vec![
        None,
        Some(Temperatura::Quente),
        Some(Temperatura::Morno),
        Some(Temperatura::Frio),
    ])
}

fn estado_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "SP", "RJ", "MG", "BA", "RS", "PR", "AM", "DF", "PE", "GO", "XX",
    ])
    .prop_map(String::from)
}

prop_compose! {
    fn lead_strategy()(
        nome in "[A-Za-z ]{0,12}",
        razao_social in "[A-Za-z ]{0,12}",
        cidade in "[A-Za-z ]{0,10}",
        estado in estado_strategy(),
        status in status_strategy(),
        temperatura in temperatura_strategy(),
        em_projecao in proptest::bool::ANY,
    ) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            nome,
            razao_social,
            email: String::new(),
            telefone: String::new(),
            endereco: String::new(),
            numero: String::new(),
            bairro: String::new(),
            cidade,
            estado: estado.clone(),
            regiao: aghora_leads_api::estados::regiao_do_estado(&estado),
            status,
            temperatura,
            em_projecao,
            detalhes_status: String::new(),
            visita_feita: false,
            data_visita: None,
            data_criacao: None,
            data_ultima_atualizacao: None,
            coordenadas: None,
        }
    }
}

proptest! {
    // aggregate(L).totalLeads == L.len(), for any collection
    #[test]
    fn total_leads_equals_collection_length(leads in prop::collection::vec(lead_strategy(), 0..50)) {
        let summary = stats::aggregate(&leads);
        prop_assert_eq!(summary.total_leads, leads.len());
    }

    // The region distribution always partitions the collection
    #[test]
    fn region_distribution_sums_to_length(leads in prop::collection::vec(lead_strategy(), 0..50)) {
        let summary = stats::aggregate(&leads);
        prop_assert_eq!(summary.distribuicao_por_regiao.total(), leads.len());
    }

    // On the two-status revision set, ativos + inativos partition the collection
    #[test]
    fn two_status_revision_partitions(
        statuses in prop::collection::vec(prop::sample::select(vec![Status::Ativo, Status::Inativo]), 0..50)
    ) {
        let leads: Vec<Lead> = statuses.into_iter().map(|status| {
            let mut lead = Lead {
                id: Uuid::new_v4(),
                nome: String::new(),
                razao_social: String::new(),
                email: String::new(),
                telefone: String::new(),
                endereco: String::new(),
                numero: String::new(),
                bairro: String::new(),
                cidade: String::new(),
                estado: "SP".to_string(),
                regiao: Regiao::Sudeste,
                status: Status::Ativo,
                temperatura: None,
                em_projecao: false,
                detalhes_status: String::new(),
                visita_feita: false,
                data_visita: None,
                data_criacao: None,
                data_ultima_atualizacao: None,
                coordenadas: None,
            };
            lead.status = status;
            lead
        }).collect();

        let summary = stats::aggregate(&leads);
        prop_assert_eq!(summary.leads_ativos + summary.leads_inativos, leads.len());
    }

    // filter(L, identity) == L: same leads, same order
    #[test]
    fn identity_filter_returns_input(leads in prop::collection::vec(lead_strategy(), 0..50)) {
        let filter = LeadFilter::default();
        let before: Vec<Uuid> = leads.iter().map(|l| l.id).collect();
        let after: Vec<Uuid> = filter.apply(leads).iter().map(|l| l.id).collect();
        prop_assert_eq!(before, after);
    }

    // Every lead in a state-filtered result carries that state
    #[test]
    fn estado_filter_only_returns_that_estado(leads in prop::collection::vec(lead_strategy(), 0..50)) {
        let filter = LeadFilter {
            estado: Some("SP".to_string()),
            ..Default::default()
        };
        for lead in filter.apply(leads) {
            prop_assert_eq!(lead.estado, "SP");
        }
    }

    // Filtering preserves relative source order
    #[test]
    fn filters_are_stable(leads in prop::collection::vec(lead_strategy(), 0..50)) {
        let filter = LeadFilter {
            status: StatusFilter::Ativos,
            ..Default::default()
        };
        let source_order: Vec<Uuid> = leads
            .iter()
            .filter(|l| filter.matches(l))
            .map(|l| l.id)
            .collect();
        let result_order: Vec<Uuid> = filter.apply(leads).iter().map(|l| l.id).collect();
        prop_assert_eq!(source_order, result_order);
    }

    // Top-8 chart: length == min(8, distinct states), sorted descending
    #[test]
    fn estados_chart_shape(leads in prop::collection::vec(lead_strategy(), 0..80)) {
        let chart = stats::estados_chart(&leads);

        let mut distinct: Vec<&str> = Vec::new();
        for lead in &leads {
            if !distinct.contains(&lead.estado.as_str()) {
                distinct.push(&lead.estado);
            }
        }

        prop_assert_eq!(chart.len(), distinct.len().min(8));
        prop_assert!(chart.windows(2).all(|w| w[0].total >= w[1].total));
        // Per-group split partitions the group
        for entry in &chart {
            prop_assert_eq!(entry.ativos + entry.inativos, entry.total);
        }
    }

    // Same (state, index) always yields the same coordinate
    #[test]
    fn spiral_position_is_deterministic(estado in estado_strategy(), index in 0u32..64) {
        let a = geo::spiral_position(&estado, index);
        let b = geo::spiral_position(&estado, index);
        prop_assert_eq!(a, b);
    }

    // Consecutive ring slots never overlap exactly
    #[test]
    fn spiral_slots_within_a_ring_are_distinct(index in 0u32..8) {
        let a = geo::spiral_offset(index);
        let b = geo::spiral_offset((index + 1) % 8);
        prop_assert!((a.0 - b.0).abs() > 1e-9 || (a.1 - b.1).abs() > 1e-9);
    }
}

#[test]
fn spiral_index_8_doubles_the_radius_of_index_0() {
    let (lat0, lng0) = geo::spiral_offset(0);
    let (lat8, lng8) = geo::spiral_offset(8);
    assert!((lat8 - 2.0 * lat0).abs() < 1e-9);
    assert!((lng8 - 2.0 * lng0).abs() < 1e-9);
}

#[test]
fn unknown_estado_gets_brasilia_fallback_marker() {
    let pos = geo::spiral_position("XX", 0);
    // Base (-15.7801, -47.9292) plus the slot-0 offset of +0.02 latitude
    assert!((pos.lat - (-15.7801 + 0.02)).abs() < 1e-9);
    assert!((pos.lng - (-47.9292)).abs() < 1e-9);
}
