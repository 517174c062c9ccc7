use crate::models::Regiao;

/// Static reference data for the 27 Brazilian federative units.
///
/// Each entry carries the UF code, the display name, the canonical region
/// and the reference coordinate used by the map marker placement. The
/// coordinates are fixed per-state anchors, not geocoded addresses.
#[derive(Debug, Clone, Copy)]
pub struct EstadoInfo {
    pub sigla: &'static str,
    pub nome: &'static str,
    pub regiao: Regiao,
    pub lat: f64,
    pub lng: f64,
}

/// Coordinate used when a UF code is unknown (center of Brazil, Brasília).
pub const COORDENADA_FALLBACK: (f64, f64) = (-15.7801, -47.9292);

pub const ESTADOS: [EstadoInfo; 27] = [
    EstadoInfo { sigla: "AC", nome: "Acre", regiao: Regiao::Norte, lat: -9.0238, lng: -70.812 },
    EstadoInfo { sigla: "AL", nome: "Alagoas", regiao: Regiao::Nordeste, lat: -9.5713, lng: -36.782 },
    EstadoInfo { sigla: "AP", nome: "Amapá", regiao: Regiao::Norte, lat: 0.902, lng: -52.003 },
    EstadoInfo { sigla: "AM", nome: "Amazonas", regiao: Regiao::Norte, lat: -3.4168, lng: -65.8561 },
    EstadoInfo { sigla: "BA", nome: "Bahia", regiao: Regiao::Nordeste, lat: -12.9718, lng: -38.5011 },
    EstadoInfo { sigla: "CE", nome: "Ceará", regiao: Regiao::Nordeste, lat: -3.7172, lng: -38.5433 },
    EstadoInfo { sigla: "DF", nome: "Distrito Federal", regiao: Regiao::CentroOeste, lat: -15.7801, lng: -47.9292 },
    EstadoInfo { sigla: "ES", nome: "Espírito Santo", regiao: Regiao::Sudeste, lat: -20.2976, lng: -40.2958 },
    EstadoInfo { sigla: "GO", nome: "Goiás", regiao: Regiao::CentroOeste, lat: -16.6864, lng: -49.2643 },
    EstadoInfo { sigla: "MA", nome: "Maranhão", regiao: Regiao::Nordeste, lat: -2.5307, lng: -44.2987 },
    EstadoInfo { sigla: "MT", nome: "Mato Grosso", regiao: Regiao::CentroOeste, lat: -15.601, lng: -56.0974 },
    EstadoInfo { sigla: "MS", nome: "Mato Grosso do Sul", regiao: Regiao::CentroOeste, lat: -20.4697, lng: -54.6201 },
    EstadoInfo { sigla: "MG", nome: "Minas Gerais", regiao: Regiao::Sudeste, lat: -19.9167, lng: -43.9345 },
    EstadoInfo { sigla: "PA", nome: "Pará", regiao: Regiao::Norte, lat: -1.4554, lng: -48.4898 },
    EstadoInfo { sigla: "PB", nome: "Paraíba", regiao: Regiao::Nordeste, lat: -7.115, lng: -34.8631 },
    EstadoInfo { sigla: "PR", nome: "Paraná", regiao: Regiao::Sul, lat: -25.4195, lng: -49.2646 },
    EstadoInfo { sigla: "PE", nome: "Pernambuco", regiao: Regiao::Nordeste, lat: -8.0476, lng: -34.877 },
    EstadoInfo { sigla: "PI", nome: "Piauí", regiao: Regiao::Nordeste, lat: -5.0892, lng: -42.8019 },
    EstadoInfo { sigla: "RJ", nome: "Rio de Janeiro", regiao: Regiao::Sudeste, lat: -22.9068, lng: -43.1729 },
    EstadoInfo { sigla: "RN", nome: "Rio Grande do Norte", regiao: Regiao::Nordeste, lat: -5.7945, lng: -35.212 },
    EstadoInfo { sigla: "RS", nome: "Rio Grande do Sul", regiao: Regiao::Sul, lat: -30.0346, lng: -51.2177 },
    EstadoInfo { sigla: "RO", nome: "Rondônia", regiao: Regiao::Norte, lat: -8.7619, lng: -63.9039 },
    EstadoInfo { sigla: "RR", nome: "Roraima", regiao: Regiao::Norte, lat: 2.8235, lng: -60.6758 },
    EstadoInfo { sigla: "SC", nome: "Santa Catarina", regiao: Regiao::Sul, lat: -27.5945, lng: -48.5477 },
    EstadoInfo { sigla: "SP", nome: "São Paulo", regiao: Regiao::Sudeste, lat: -23.5505, lng: -46.6333 },
    EstadoInfo { sigla: "SE", nome: "Sergipe", regiao: Regiao::Nordeste, lat: -10.9091, lng: -37.0677 },
    EstadoInfo { sigla: "TO", nome: "Tocantins", regiao: Regiao::Norte, lat: -10.1753, lng: -48.2982 },
];

/// Looks up the reference entry for a UF code (case-insensitive).
pub fn estado_info(uf: &str) -> Option<&'static EstadoInfo> {
    ESTADOS.iter().find(|e| e.sigla.eq_ignore_ascii_case(uf.trim()))
}

/// Canonical region for a UF code.
///
/// Unknown codes fall back to `Sudeste`. This is the single mapping site
/// for the fallback; callers must not special-case unknown codes themselves.
pub fn regiao_do_estado(uf: &str) -> Regiao {
    estado_info(uf).map(|e| e.regiao).unwrap_or(Regiao::Sudeste)
}

/// Reference coordinate for a UF code; unknown codes map to Brasília.
pub fn coordenadas_base(uf: &str) -> (f64, f64) {
    estado_info(uf)
        .map(|e| (e.lat, e.lng))
        .unwrap_or(COORDENADA_FALLBACK)
}
