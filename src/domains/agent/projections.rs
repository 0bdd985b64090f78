//! Read models for the map and the sidebar. Nothing here writes back into the
//! store.
use super::aggregate::{Agent, AgentKind, AgentStore, LatLng};
use serde::{Deserialize, Serialize};

pub const PEDESTRIAN_COLOR: &str = "#ffffff";
pub const VEHICLE_COLOR: &str = "#0066cc";
pub const FLEEING_COLOR: &str = "#ff0000";
pub const DEFAULT_MAP_CENTER: LatLng = LatLng::new(37.7749, -122.4194);
pub const SIDEBAR_ROWS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: String,
    pub radius: u32,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    pub fn for_agent(agent: &Agent) -> Self {
        let color = if agent.is_fleeing {
            FLEEING_COLOR
        } else {
            match agent.kind {
                AgentKind::Pedestrian => PEDESTRIAN_COLOR,
                AgentKind::Vehicle => VEHICLE_COLOR,
            }
        };
        let radius = match agent.kind {
            AgentKind::Pedestrian => 4,
            AgentKind::Vehicle => 6,
        };
        Self {
            color: color.to_string(),
            radius,
            fill_opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRow {
    pub id: String,
    pub kind: String,
    pub position: String,
    pub is_fleeing: bool,
}

impl AgentRow {
    fn from_agent(agent: &Agent) -> Self {
        let kind = match agent.kind {
            AgentKind::Pedestrian => "Ped",
            AgentKind::Vehicle => "Veh",
        };
        Self {
            id: agent.id.to_string(),
            kind: kind.to_string(),
            position: format!("{:.4}, {:.4}", agent.position.lat, agent.position.lng),
            is_fleeing: agent.is_fleeing,
        }
    }
}

/// Sidebar listing: total count, the first few rows and how many were left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentListProjection {
    pub total: usize,
    pub rows: Vec<AgentRow>,
    pub remaining: usize,
}

impl AgentListProjection {
    pub fn from_store(store: &AgentStore) -> Self {
        Self::with_limit(store, SIDEBAR_ROWS)
    }

    pub fn with_limit(store: &AgentStore, limit: usize) -> Self {
        let rows: Vec<AgentRow> = store.iter().take(limit).map(AgentRow::from_agent).collect();
        Self {
            total: store.len(),
            remaining: store.len().saturating_sub(rows.len()),
            rows,
        }
    }

    pub fn summary(&self) -> String {
        let mut out = format!("Agents Online: {}", self.total);
        for row in &self.rows {
            out.push_str(&format!("\n  ID: {} - Type: {} - Pos: {}", row.id, row.kind, row.position));
            if row.is_fleeing {
                out.push_str(" (Fleeing)");
            }
        }
        if self.remaining > 0 {
            out.push_str(&format!("\n  ...and {} more", self.remaining));
        }
        out
    }
}

/// Initial map center: the configured focus wins, otherwise the first agent
/// added. Once set it never moves.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCenter {
    center: LatLng,
    settled: bool,
}

impl MapCenter {
    pub fn new(focus: Option<LatLng>) -> Self {
        match focus {
            Some(center) => Self { center, settled: true },
            None => Self {
                center: DEFAULT_MAP_CENTER,
                settled: false,
            },
        }
    }

    /// Returns true when this call settled the center.
    pub fn observe_agent(&mut self, position: LatLng) -> bool {
        if self.settled {
            return false;
        }
        self.center = position;
        self.settled = true;
        true
    }

    pub fn center(&self) -> LatLng {
        self.center
    }
}
