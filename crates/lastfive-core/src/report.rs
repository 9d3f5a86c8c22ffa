//! Report data model
//!
//! These types mirror the JSON returned by the reasoning service's
//! `/api/analyze` endpoint. The fallback generator builds the same types, so
//! everything downstream of the transport is unaware of where a report came from.

use serde::{Deserialize, Serialize};

/// Ordinal purchase-risk category, from "safe" to "run"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Caution,
    Warning,
    Danger,
    Run,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Caution => "caution",
            RiskLevel::Warning => "warning",
            RiskLevel::Danger => "danger",
            RiskLevel::Run => "run",
        }
    }

    /// Short verdict shown next to the score
    pub fn verdict(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Worth a try",
            RiskLevel::Caution => "Mind the details",
            RiskLevel::Warning => "Buy with care",
            RiskLevel::Danger => "Better skip it",
            RiskLevel::Run => "Run!",
        }
    }
}

/// Defect category tag. Unknown tags from the service are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefectCategory {
    Hardware,
    Software,
    Design,
    Durability,
    Performance,
    Safety,
    Value,
    Other(String),
}

impl DefectCategory {
    pub fn as_str(&self) -> &str {
        match self {
            DefectCategory::Hardware => "hardware",
            DefectCategory::Software => "software",
            DefectCategory::Design => "design",
            DefectCategory::Durability => "durability",
            DefectCategory::Performance => "performance",
            DefectCategory::Safety => "safety",
            DefectCategory::Value => "value",
            DefectCategory::Other(tag) => tag,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            DefectCategory::Hardware => "Hardware failure",
            DefectCategory::Software => "Software bug",
            DefectCategory::Design => "Design flaw",
            DefectCategory::Durability => "Durability",
            DefectCategory::Performance => "Performance",
            DefectCategory::Safety => "Safety hazard",
            DefectCategory::Value => "Value for money",
            DefectCategory::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DefectCategory::Other(_))
    }
}

impl From<String> for DefectCategory {
    fn from(tag: String) -> Self {
        match tag.to_lowercase().as_str() {
            "hardware" => DefectCategory::Hardware,
            "software" => DefectCategory::Software,
            "design" => DefectCategory::Design,
            "durability" => DefectCategory::Durability,
            "performance" => DefectCategory::Performance,
            "safety" => DefectCategory::Safety,
            "value" => DefectCategory::Value,
            _ => DefectCategory::Other(tag),
        }
    }
}

impl From<DefectCategory> for String {
    fn from(category: DefectCategory) -> Self {
        category.as_str().to_string()
    }
}

/// Kind of event in a product's track record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HistoryEventType {
    Recall,
    Defect,
    Rebrand,
    BrandHistory,
    Other(String),
}

impl HistoryEventType {
    pub fn as_str(&self) -> &str {
        match self {
            HistoryEventType::Recall => "recall",
            HistoryEventType::Defect => "defect",
            HistoryEventType::Rebrand => "rebrand",
            HistoryEventType::BrandHistory => "brand_history",
            HistoryEventType::Other(tag) => tag,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            HistoryEventType::Recall => "Recall",
            HistoryEventType::Defect => "Known defect",
            HistoryEventType::Rebrand => "Rebrand",
            HistoryEventType::BrandHistory => "Brand history",
            HistoryEventType::Other(tag) => tag,
        }
    }
}

impl From<String> for HistoryEventType {
    fn from(tag: String) -> Self {
        match tag.to_lowercase().as_str() {
            "recall" => HistoryEventType::Recall,
            "defect" => HistoryEventType::Defect,
            "rebrand" => HistoryEventType::Rebrand,
            "brand_history" => HistoryEventType::BrandHistory,
            _ => HistoryEventType::Other(tag),
        }
    }
}

impl From<HistoryEventType> for String {
    fn from(kind: HistoryEventType) -> Self {
        kind.as_str().to_string()
    }
}

/// Where a complaint was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSource {
    pub platform: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default = "default_credibility")]
    pub credibility_score: f64,
}

fn default_credibility() -> f64 {
    0.5
}

fn default_frequency() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    pub category: DefectCategory,
    pub description: String,
    /// 1-10, clamped by [`Report::normalized`]
    pub severity: u8,
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default)]
    pub sources: Vec<ReviewSource>,
    #[serde(default, rename = "original_quotes", alias = "quotes")]
    pub quotes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioWarning {
    #[serde(rename = "user_scenario", alias = "scenario")]
    pub scenario: String,
    #[serde(default, rename = "product_spec", alias = "spec")]
    pub spec: String,
    #[serde(rename = "warning_message", alias = "message")]
    pub message: String,
    #[serde(default)]
    pub impact_percentage: f64,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub event_type: HistoryEventType,
    #[serde(default, rename = "event_date", alias = "date")]
    pub date: Option<String>,
    pub description: String,
    #[serde(default, rename = "source_url", alias = "source")]
    pub source: String,
    #[serde(default)]
    pub related_models: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: String,
    #[serde(default)]
    pub price_range: String,
    #[serde(default)]
    pub advantage: String,
    #[serde(default)]
    pub solved_defects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Aggregate complaints for one product dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapBucket {
    pub dimension: String,
    pub complaint_count: u32,
    #[serde(default)]
    pub severity_avg: f64,
    #[serde(default)]
    pub percentage: f64,
}

/// A complete "reasons not to buy" report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub product_name: String,
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub summary: String,
    #[serde(default)]
    pub defects: Vec<Defect>,
    #[serde(default)]
    pub scenario_warnings: Vec<ScenarioWarning>,
    #[serde(default)]
    pub history_events: Vec<HistoryEvent>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub heatmap_data: Vec<HeatmapBucket>,
    #[serde(default)]
    pub analyzed_reviews_count: u32,
    #[serde(default)]
    pub noise_filtered: u32,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<String>,
}

impl Report {
    pub const MAX_SCORE: u32 = 100;
    pub const MIN_SEVERITY: u8 = 1;
    pub const MAX_SEVERITY: u8 = 10;

    /// Clamp numeric fields into their documented ranges.
    pub fn normalized(mut self) -> Self {
        self.risk_score = self.risk_score.min(Self::MAX_SCORE);
        for defect in &mut self.defects {
            defect.severity = defect.severity.clamp(Self::MIN_SEVERITY, Self::MAX_SEVERITY);
        }
        self
    }

    /// Score as a display value; always within 0..=100 after normalization
    pub fn display_score(&self) -> u8 {
        self.risk_score.min(Self::MAX_SCORE) as u8
    }
}

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub product_name: String,
    pub user_scenario: Option<String>,
}

impl AnalysisRequest {
    /// Separates the product from an optional usage scenario.
    pub const SCENARIO_SEPARATOR: char = '@';

    pub fn new(product_name: &str, user_scenario: Option<&str>) -> Self {
        Self {
            product_name: product_name.trim().to_string(),
            user_scenario: user_scenario
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// Parse a query line such as `robot vacuum @ two cats, thick rugs`.
    ///
    /// Returns `None` when there is no product name to analyze.
    pub fn from_query(text: &str) -> Option<Self> {
        let (product, scenario) = match text.split_once(Self::SCENARIO_SEPARATOR) {
            Some((product, scenario)) => (product, Some(scenario)),
            None => (text, None),
        };

        let request = Self::new(product, scenario);
        if request.product_name.is_empty() {
            None
        } else {
            Some(request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKEND_JSON: &str = r#"{
        "product_name": "Robot Vacuum X10",
        "risk_level": "danger",
        "risk_score": 72,
        "summary": "Too many weak spots.",
        "defects": [
            {
                "category": "hardware",
                "description": "Brush motor gets loud after six months",
                "severity": 8,
                "frequency": 28,
                "sources": [{"platform": "V2EX", "url": "https://v2ex.com/t/1"}],
                "original_quotes": ["sounds like a tractor"]
            },
            {
                "category": "firmware",
                "description": "OTA bricked the dock",
                "severity": 12
            }
        ],
        "scenario_warnings": [
            {
                "user_scenario": "Thresholds above 2cm",
                "product_spec": "Climb height: 2cm",
                "warning_message": "Gets stuck at 1.8cm",
                "impact_percentage": 100.0,
                "recommendation": "Pick a 2.5cm model"
            }
        ],
        "history_events": [
            {
                "event_type": "rebrand",
                "event_date": "2023-08",
                "description": "Same module as the S9",
                "source_url": "V2EX teardown",
                "related_models": ["S9"]
            }
        ],
        "heatmap_data": [
            {"dimension": "Hardware", "complaint_count": 28, "severity_avg": 8.0, "percentage": 100.0}
        ],
        "alternatives": [
            {"name": "G20", "price_range": "3000-3500", "advantage": "Self-cleaning mop", "solved_defects": ["noise"], "link": null}
        ],
        "analyzed_reviews_count": 120,
        "noise_filtered": 14,
        "data_sources": ["V2EX", "Zhihu"],
        "analysis_timestamp": "2024-05-01T12:00:00.123456"
    }"#;

    #[test]
    fn test_deserialize_backend_payload() {
        let report: Report = serde_json::from_str(BACKEND_JSON).unwrap();
        assert_eq!(report.risk_level, RiskLevel::Danger);
        assert_eq!(report.defects.len(), 2);
        assert_eq!(report.defects[0].quotes, vec!["sounds like a tractor"]);
        assert_eq!(report.defects[0].sources[0].credibility_score, 0.5);
        assert_eq!(report.defects[1].frequency, 1);
        assert_eq!(
            report.defects[1].category,
            DefectCategory::Other("firmware".to_string())
        );
        assert_eq!(report.scenario_warnings[0].spec, "Climb height: 2cm");
        assert_eq!(report.history_events[0].event_type, HistoryEventType::Rebrand);
        assert_eq!(report.history_events[0].date.as_deref(), Some("2023-08"));
    }

    #[test]
    fn test_short_field_names_are_accepted() {
        let json = r#"{
            "product_name": "P",
            "risk_level": "safe",
            "risk_score": 3,
            "summary": "",
            "defects": [{"category": "value", "description": "d", "severity": 2, "frequency": 0, "quotes": ["q"]}],
            "scenario_warnings": [{"scenario": "s", "spec": "p", "message": "m", "impact_percentage": 10, "recommendation": "r"}],
            "history_events": [{"event_type": "recall", "date": null, "description": "d", "source": "src"}]
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.defects[0].quotes, vec!["q"]);
        assert_eq!(report.scenario_warnings[0].message, "m");
        assert_eq!(report.history_events[0].source, "src");
        assert!(report.alternatives.is_empty());
        assert!(report.data_sources.is_empty());
    }

    #[test]
    fn test_normalized_clamps_ranges() {
        let mut report: Report = serde_json::from_str(BACKEND_JSON).unwrap();
        report.risk_score = 250;
        report.defects[0].severity = 0;
        let report = report.normalized();
        assert_eq!(report.risk_score, 100);
        assert_eq!(report.defects[0].severity, 1);
        assert_eq!(report.defects[1].severity, 10);
    }

    #[test]
    fn test_category_round_trips_unknown_tag() {
        let category = DefectCategory::from("Firmware".to_string());
        assert!(!category.is_known());
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"Firmware\"");
        assert_eq!(DefectCategory::from("SAFETY".to_string()), DefectCategory::Safety);
    }

    #[test]
    fn test_request_from_query_splits_scenario() {
        let request = AnalysisRequest::from_query("robot vacuum @ two cats, thick rugs").unwrap();
        assert_eq!(request.product_name, "robot vacuum");
        assert_eq!(request.user_scenario.as_deref(), Some("two cats, thick rugs"));

        let request = AnalysisRequest::from_query("  projector  ").unwrap();
        assert_eq!(request.product_name, "projector");
        assert_eq!(request.user_scenario, None);

        let request = AnalysisRequest::from_query("projector @   ").unwrap();
        assert_eq!(request.user_scenario, None);

        assert!(AnalysisRequest::from_query("   ").is_none());
        assert!(AnalysisRequest::from_query(" @ living room").is_none());
    }

    #[test]
    fn test_request_serializes_null_scenario() {
        let request = AnalysisRequest::new("投影仪A", None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["product_name"], "投影仪A");
        assert!(json["user_scenario"].is_null());
    }
}
