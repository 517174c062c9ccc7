//! Synthetic map coordinates for leads.
//!
//! There is no real geocoding: each lead is placed on a spiral around its
//! state's reference coordinate so that markers in the same state never sit
//! exactly on top of each other. The spiral slot is derived from a SHA-256
//! hash of the lead id, so a lead keeps its marker position across reloads,
//! insertions and deletions.

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::estados;
use crate::models::{Coordenadas, Lead, Status, Temperatura};

/// Points per spiral ring before the radius grows.
const RING_SIZE: u32 = 8;

/// Base radius of the first ring, in degrees.
const RING_RADIUS: f64 = 0.02;

/// Hashed slots are folded into this many spiral positions (30 rings).
const SLOT_COUNT: u64 = 240;

/// Marker payload for the map endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: Uuid,
    pub nome: String,
    pub razao_social: String,
    pub cidade: String,
    pub estado: String,
    pub status: Status,
    pub temperatura: Option<Temperatura>,
    pub coordenadas: Coordenadas,
}

/// Offset of spiral slot `index` from the ring center.
///
/// 45° between consecutive points; the radius grows by `RING_RADIUS` every
/// `RING_SIZE` points. Slot 0 sits due east of the center.
pub fn spiral_offset(index: u32) -> (f64, f64) {
    let angle = index as f64 * std::f64::consts::FRAC_PI_4;
    let radius = RING_RADIUS * ((index / RING_SIZE) as f64 + 1.0);
    (radius * angle.cos(), radius * angle.sin())
}

/// Coordinate of spiral slot `index` around the reference point of `uf`.
///
/// Unknown UF codes place the marker around the national center (Brasília);
/// this never fails.
pub fn spiral_position(uf: &str, index: u32) -> Coordenadas {
    let (lat, lng) = estados::coordenadas_base(uf);
    let (dlat, dlng) = spiral_offset(index);
    Coordenadas {
        lat: lat + dlat,
        lng: lng + dlng,
    }
}

/// Stable spiral slot for a lead id.
///
/// First 8 bytes of the SHA-256 digest, folded modulo `SLOT_COUNT`. Two
/// leads in the same state can collide on a slot; that is accepted in
/// exchange for positions that survive reordering of the working set.
pub fn stable_slot(id: &Uuid) -> u32 {
    let digest = Sha256::digest(id.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % SLOT_COUNT) as u32
}

/// Derived coordinate for a single lead.
pub fn marker_position(lead: &Lead) -> Coordenadas {
    spiral_position(&lead.estado, stable_slot(&lead.id))
}

/// Builds the map marker list for a collection of leads.
pub fn markers(leads: &[Lead]) -> Vec<MapMarker> {
    leads
        .iter()
        .map(|lead| MapMarker {
            id: lead.id,
            nome: lead.nome.clone(),
            razao_social: lead.razao_social.clone(),
            cidade: lead.cidade.clone(),
            estado: lead.estado.clone(),
            status: lead.status,
            temperatura: lead.temperatura,
            coordenadas: lead.coordenadas.unwrap_or_else(|| marker_position(lead)),
        })
        .collect()
}
