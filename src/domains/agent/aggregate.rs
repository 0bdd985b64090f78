use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Opaque agent identifier. The server may send it as a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "WireId")]
pub struct AgentId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u64),
}

impl From<WireId> for AgentId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => AgentId(s),
            WireId::Number(n) => AgentId(n.to_string()),
        }
    }
}

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        AgentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        AgentId(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        AgentId(id)
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic point in degrees, `[lat, lng]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

/// One point of a server-issued path, `[lat, lng, elevation]` on the wire.
/// Elevation is carried along but motion is planar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
    pub elevation: f64,
}

impl Waypoint {
    pub const fn new(lat: f64, lng: f64, elevation: f64) -> Self {
        Self { lat, lng, elevation }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

impl From<[f64; 3]> for Waypoint {
    fn from([lat, lng, elevation]: [f64; 3]) -> Self {
        Self { lat, lng, elevation }
    }
}

impl From<Waypoint> for [f64; 3] {
    fn from(w: Waypoint) -> Self {
        [w.lat, w.lng, w.elevation]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AgentKind {
    Pedestrian,
    Vehicle,
}

impl TryFrom<u8> for AgentKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AgentKind::Pedestrian),
            1 => Ok(AgentKind::Vehicle),
            other => Err(format!("unknown agent type {}", other)),
        }
    }
}

impl From<AgentKind> for u8 {
    fn from(kind: AgentKind) -> Self {
        match kind {
            AgentKind::Pedestrian => 0,
            AgentKind::Vehicle => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: LatLng,
    pub kind: AgentKind,
    pub is_fleeing: bool,
    pub path: Option<Vec<Waypoint>>,
    pub path_cursor: Option<usize>,
    pub goal: Option<LatLng>,
    /// Set once a path has been walked to its end and no replacement has
    /// arrived yet.
    pub awaiting_path: bool,
    #[serde(skip)]
    pub last_path_request: Option<Instant>,
}

impl Agent {
    pub fn new(id: AgentId, position: LatLng, kind: AgentKind) -> Self {
        Self {
            id,
            position,
            kind,
            is_fleeing: false,
            path: None,
            path_cursor: None,
            goal: None,
            awaiting_path: false,
            last_path_request: None,
        }
    }

    pub fn fleeing(mut self, is_fleeing: bool) -> Self {
        self.is_fleeing = is_fleeing;
        self
    }

    /// Builder form of [`Agent::assign_path`] without a goal.
    pub fn with_path(mut self, path: Vec<Waypoint>) -> Self {
        self.assign_path(self.goal, path);
        self
    }

    /// Replace the current path wholesale. An empty path leaves the agent
    /// without an active path.
    pub fn assign_path(&mut self, goal: Option<LatLng>, path: Vec<Waypoint>) {
        self.goal = goal;
        if path.is_empty() {
            self.path = None;
            self.path_cursor = None;
        } else {
            self.path = Some(path);
            self.path_cursor = Some(0);
            self.awaiting_path = false;
        }
    }

    /// The waypoint the agent is currently heading for, if the path and
    /// cursor are both present and consistent.
    pub fn current_target(&self) -> Option<Waypoint> {
        match (&self.path, self.path_cursor) {
            (Some(path), Some(cursor)) => path.get(cursor).copied(),
            _ => None,
        }
    }

    pub fn has_active_path(&self) -> bool {
        self.current_target().is_some()
    }

    /// Drop the path after its last waypoint has been reached.
    pub fn finish_path(&mut self) {
        self.path = None;
        self.path_cursor = None;
        self.awaiting_path = true;
    }
}

/// Map of agents, published as `Arc<AgentStore>`. Writers copy on write
/// (`with_*` or `Arc::make_mut`), so a published snapshot never changes under
/// a reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentStore {
    agents: BTreeMap<AgentId, Agent>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&Agent>
    where
        AgentId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.agents.get(id)
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        AgentId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.agents.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// New store with `agent` inserted, replacing any agent with the same id.
    pub fn with_agent(&self, agent: Agent) -> AgentStore {
        let mut next = self.clone();
        next.insert(agent);
        next
    }

    /// Insert or replace an agent in place. Callers holding a published
    /// snapshot go through `Arc::make_mut` so the snapshot itself is never
    /// touched.
    pub fn insert(&mut self, agent: Agent) {
        self.agents.insert(agent.id.clone(), agent);
    }

    /// Apply `update` to one agent in place. Returns false, without calling
    /// `update`, when the id is unknown.
    pub fn update<F>(&mut self, id: &AgentId, update: F) -> bool
    where
        F: FnOnce(&mut Agent),
    {
        match self.agents.get_mut(id) {
            Some(agent) => {
                update(agent);
                true
            }
            None => false,
        }
    }

    /// New store with a batch of agents replaced in one step.
    pub fn with_replaced<I>(&self, agents: I) -> AgentStore
    where
        I: IntoIterator<Item = Agent>,
    {
        let mut next = self.clone();
        for agent in agents {
            next.insert(agent);
        }
        next
    }
}

impl FromIterator<Agent> for AgentStore {
    fn from_iter<I: IntoIterator<Item = Agent>>(iter: I) -> Self {
        Self {
            agents: iter.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(id: &str) -> Agent {
        Agent::new(AgentId::from(id), LatLng::new(0.0, 0.0), AgentKind::Vehicle)
    }

    #[test]
    fn test_agent_id_accepts_string_and_number() {
        let text: AgentId = serde_json::from_str("\"veh-7\"").unwrap();
        let number: AgentId = serde_json::from_str("42").unwrap();
        assert_eq!(text.as_str(), "veh-7");
        assert_eq!(number.as_str(), "42");
    }

    #[test]
    fn test_agent_kind_rejects_unknown_type() {
        assert!(serde_json::from_str::<AgentKind>("2").is_err());
        assert_eq!(serde_json::from_str::<AgentKind>("0").unwrap(), AgentKind::Pedestrian);
    }

    #[test]
    fn test_assign_empty_path_clears_cursor() {
        let mut agent = vehicle("a").with_path(vec![Waypoint::new(0.0, 1.0, 0.0)]);
        assert_eq!(agent.path_cursor, Some(0));

        agent.assign_path(Some(LatLng::new(1.0, 1.0)), Vec::new());
        assert!(agent.path.is_none());
        assert!(agent.path_cursor.is_none());
        assert_eq!(agent.goal, Some(LatLng::new(1.0, 1.0)));
    }

    #[test]
    fn test_current_target_requires_valid_cursor() {
        let mut agent = vehicle("a").with_path(vec![Waypoint::new(0.0, 1.0, 0.0)]);
        agent.path_cursor = Some(3);
        assert!(agent.current_target().is_none());
        assert!(!agent.has_active_path());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = AgentStore::new().with_agent(vehicle("a"));
        let before = store.clone();
        assert!(!store.update(&AgentId::from("missing"), |a| a.is_fleeing = true));
        assert_eq!(store, before);
    }

    #[test]
    fn test_with_agent_leaves_original_untouched() {
        let store = AgentStore::new().with_agent(vehicle("a"));
        let next = store.with_agent(vehicle("a").fleeing(true));

        assert!(!store.get("a").unwrap().is_fleeing);
        assert!(next.get("a").unwrap().is_fleeing);
        assert_eq!(next.len(), 1);
    }
}
