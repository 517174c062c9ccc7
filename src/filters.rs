//! Filter engine for the lead listing.
//!
//! A filter is plain data (three predicates plus a page context) and its
//! application is a pure, order-preserving function: the result keeps the
//! source order and the source collection is never mutated. Selection for
//! bulk deletes is carried separately as explicit id lists.

use serde::Deserialize;

use crate::models::{Lead, Status, Temperatura};

/// Value of the combined status/temperature dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Todos,
    Ativos,
    Inativos,
    Quentes,
    Frios,
}

impl StatusFilter {
    fn matches(&self, lead: &Lead) -> bool {
        match self {
            StatusFilter::Todos => true,
            StatusFilter::Ativos => lead.status.is_ativo(),
            StatusFilter::Inativos => lead.status.is_inativo(),
            StatusFilter::Quentes => lead.temperatura == Some(Temperatura::Quente),
            StatusFilter::Frios => lead.temperatura == Some(Temperatura::Frio),
        }
    }
}

/// Page-level listing context. Each listing page sees a fixed slice of the
/// collection before the user filters kick in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFilter {
    #[default]
    All,
    /// Operating customers of either schema revision.
    Ativos,
    /// Out-of-operation entries of either schema revision.
    Inativos,
    /// Open leads only (not yet customers, not cancelled).
    Leads,
    /// Customers and cancellations.
    Clientes,
    /// Hot leads only.
    Quentes,
}

impl PageFilter {
    fn matches(&self, lead: &Lead) -> bool {
        match self {
            PageFilter::All => true,
            PageFilter::Ativos => lead.status.is_ativo(),
            PageFilter::Inativos => lead.status.is_inativo(),
            PageFilter::Leads => lead.status == Status::Lead,
            PageFilter::Clientes => {
                matches!(lead.status, Status::Cliente | Status::Cancelado)
            }
            PageFilter::Quentes => lead.temperatura == Some(Temperatura::Quente),
        }
    }
}

/// Current filter state of the listing UI.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    /// Free-text search over nome, razão social and cidade.
    pub search_term: String,
    pub status: StatusFilter,
    /// UF code, or `None` for "todos".
    pub estado: Option<String>,
    pub page: PageFilter,
}

impl LeadFilter {
    /// True when the lead passes the page context and all three predicates.
    pub fn matches(&self, lead: &Lead) -> bool {
        self.page.matches(lead)
            && self.matches_search(lead)
            && self.status.matches(lead)
            && self.matches_estado(lead)
    }

    /// Case-insensitive substring match against nome OR razão social OR
    /// cidade. An empty search term matches everything; an empty cidade
    /// only fails that one alternative.
    fn matches_search(&self, lead: &Lead) -> bool {
        let term = self.search_term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        lead.nome.to_lowercase().contains(&term)
            || lead.razao_social.to_lowercase().contains(&term)
            || (!lead.cidade.is_empty() && lead.cidade.to_lowercase().contains(&term))
    }

    fn matches_estado(&self, lead: &Lead) -> bool {
        match &self.estado {
            None => true,
            Some(uf) if uf.eq_ignore_ascii_case("todos") => true,
            Some(uf) => lead.estado.eq_ignore_ascii_case(uf),
        }
    }

    /// Applies the filter, preserving source order.
    pub fn apply(&self, leads: Vec<Lead>) -> Vec<Lead> {
        leads.into_iter().filter(|l| self.matches(l)).collect()
    }
}

/// Stable reorder that floats hot leads to the top, used by the open-leads
/// page listing. Kept out of `LeadFilter::apply` so the filter itself stays
/// order-preserving.
pub fn sort_quentes_first(leads: &mut [Lead]) {
    leads.sort_by_key(|l| l.temperatura != Some(Temperatura::Quente));
}
