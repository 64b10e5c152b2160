use serde::Deserialize;

/// Top-level feed response envelope (spec §6: "Response is a JSON object with
/// `records: [Surebet]`").
#[derive(Debug, Deserialize)]
pub struct RawFeedResponse {
    pub records: Vec<RawRecord>,
}

/// One raw surebet record as returned by upstream (spec §6).
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub sort_by: String,
    /// Event start, ms epoch.
    pub time: i64,
    #[serde(default)]
    pub created: Option<i64>,
    pub profit: f64,
    pub prongs: Vec<RawProng>,
    /// "rd" differing-sports-rules flag. The feed request already sets
    /// `hide-different-rules=true`; per spec §9's open question this flag's
    /// downstream handling beyond honoring that request parameter is
    /// unspecified and is intentionally not interpreted here.
    #[serde(default)]
    pub rd: Option<bool>,
}

/// One side of a surebet record.
#[derive(Debug, Deserialize)]
pub struct RawProng {
    pub bk: String,
    pub value: f64,
    pub time: i64,
    pub teams: [String; 2],
    pub tournament: String,
    #[serde(rename = "type")]
    pub market_type: RawMarketType,
    #[serde(default)]
    pub event_nav: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawMarketType {
    pub kind: String,
    #[serde(default)]
    pub condition: Option<f64>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub no: Option<bool>,
}
