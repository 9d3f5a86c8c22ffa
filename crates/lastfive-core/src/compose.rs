//! Report composition
//!
//! Maps a [`Report`] onto a keyed, display-ready section tree. Composition is pure:
//! the same report always yields the same tree, whether it came from the live
//! service or from the fallback generator. Every string that originated outside
//! the program passes through [`sanitize`] on the way in, so renderers can put
//! tree text straight onto the terminal.

use regex::Regex;
use std::sync::OnceLock;

use crate::report::{DefectCategory, HistoryEventType, Report, RiskLevel};

/// Number of units in a defect's severity indicator
pub const SEVERITY_UNITS: usize = 10;
/// Quotes shown per defect
pub const MAX_QUOTES: usize = 3;

const HIGH_SEVERITY: u8 = 7;
const MEDIUM_SEVERITY: u8 = 5;

/// Sections in the order they are always rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    RiskSummary,
    Defects,
    ScenarioWarnings,
    HistoryEvents,
    Alternatives,
    DataSources,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::RiskSummary,
        SectionKind::Defects,
        SectionKind::ScenarioWarnings,
        SectionKind::HistoryEvents,
        SectionKind::Alternatives,
        SectionKind::DataSources,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::RiskSummary => "risk-summary",
            SectionKind::Defects => "defects",
            SectionKind::ScenarioWarnings => "scenario-warnings",
            SectionKind::HistoryEvents => "history-events",
            SectionKind::Alternatives => "alternatives",
            SectionKind::DataSources => "data-sources",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::RiskSummary => "Risk verdict",
            SectionKind::Defects => "Real defects",
            SectionKind::ScenarioWarnings => "Scenario warnings",
            SectionKind::HistoryEvents => "Track record",
            SectionKind::Alternatives => "Alternatives",
            SectionKind::DataSources => "Data sources",
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            SectionKind::RiskSummary => "",
            SectionKind::Defects => "No confirmed defects found",
            SectionKind::ScenarioWarnings => "No scenario conflicts found",
            SectionKind::HistoryEvents => "No recalls or incidents on record",
            SectionKind::Alternatives => "No alternatives suggested",
            SectionKind::DataSources => "No sources listed",
        }
    }
}

/// Display bucket for a 1-10 severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

impl SeverityTier {
    pub fn from_severity(severity: u8) -> Self {
        if severity >= HIGH_SEVERITY {
            SeverityTier::High
        } else if severity >= MEDIUM_SEVERITY {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

/// A list section's content, or the placeholder shown in its place
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Items(Vec<T>),
    Nothing(&'static str),
}

impl<T> Listing<T> {
    fn from_items(items: Vec<T>, placeholder: &'static str) -> Self {
        if items.is_empty() {
            Listing::Nothing(placeholder)
        } else {
            Listing::Items(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Items(items) => items,
            Listing::Nothing(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummaryView {
    pub product_name: String,
    pub risk_level: RiskLevel,
    pub verdict: &'static str,
    pub risk_score: u8,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefectView {
    pub key: String,
    pub marker: &'static str,
    pub category: String,
    pub description: String,
    pub severity: u8,
    pub tier: SeverityTier,
    /// First `severity` units are marked
    pub meter: [bool; SEVERITY_UNITS],
    pub frequency: u32,
    pub quotes: Vec<String>,
    pub hidden_quotes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatBar {
    pub key: String,
    pub dimension: String,
    pub complaint_count: u32,
    /// 0-100, relative to the busiest bucket
    pub width: f64,
    pub severity_avg: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarningView {
    pub key: String,
    pub scenario: String,
    pub spec: String,
    pub message: String,
    pub impact_percentage: i64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEventView {
    pub key: String,
    pub marker: &'static str,
    pub event_label: String,
    pub date: Option<String>,
    pub description: String,
    pub source: String,
    pub related_models: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeView {
    pub key: String,
    pub name: String,
    pub price_range: String,
    pub advantage: String,
    pub solved_defects: Vec<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSourcesView {
    pub sources: Listing<String>,
    pub analyzed_reviews_count: u32,
    pub noise_filtered: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    RiskSummary(RiskSummaryView),
    Defects {
        /// `None` when every bucket is empty
        heatmap: Option<Vec<HeatBar>>,
        defects: Listing<DefectView>,
    },
    ScenarioWarnings(Listing<WarningView>),
    HistoryEvents(Listing<HistoryEventView>),
    Alternatives(Listing<AlternativeView>),
    DataSources(DataSourcesView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub title: &'static str,
    pub body: SectionBody,
}

impl Section {
    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    /// Number of entries, shown next to collapsed headers
    pub fn item_count(&self) -> usize {
        match &self.body {
            SectionBody::RiskSummary(_) => 1,
            SectionBody::Defects { defects, .. } => defects.len(),
            SectionBody::ScenarioWarnings(items) => items.len(),
            SectionBody::HistoryEvents(items) => items.len(),
            SectionBody::Alternatives(items) => items.len(),
            SectionBody::DataSources(view) => view.sources.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionTree {
    pub sections: Vec<Section>,
}

impl SectionTree {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

pub fn compose(report: &Report) -> SectionTree {
    let sections = SectionKind::ALL
        .iter()
        .map(|&kind| Section {
            kind,
            title: kind.title(),
            body: compose_body(kind, report),
        })
        .collect();

    SectionTree { sections }
}

fn compose_body(kind: SectionKind, report: &Report) -> SectionBody {
    let placeholder = kind.placeholder();
    match kind {
        SectionKind::RiskSummary => SectionBody::RiskSummary(RiskSummaryView {
            product_name: sanitize(&report.product_name),
            risk_level: report.risk_level,
            verdict: report.risk_level.verdict(),
            risk_score: report.display_score(),
            summary: sanitize(&report.summary),
        }),
        SectionKind::Defects => SectionBody::Defects {
            heatmap: compose_heatmap(report),
            defects: Listing::from_items(compose_defects(report), placeholder),
        },
        SectionKind::ScenarioWarnings => {
            let items = report
                .scenario_warnings
                .iter()
                .enumerate()
                .map(|(i, w)| WarningView {
                    key: format!("{}/{}", kind.key(), i),
                    scenario: sanitize(&w.scenario),
                    spec: sanitize(&w.spec),
                    message: sanitize(&w.message),
                    impact_percentage: w.impact_percentage.round() as i64,
                    recommendation: sanitize(&w.recommendation),
                })
                .collect();
            SectionBody::ScenarioWarnings(Listing::from_items(items, placeholder))
        }
        SectionKind::HistoryEvents => {
            let items = report
                .history_events
                .iter()
                .enumerate()
                .map(|(i, e)| HistoryEventView {
                    key: format!("{}/{}", kind.key(), i),
                    marker: event_marker(&e.event_type),
                    event_label: sanitize(e.event_type.display_name()),
                    date: e.date.as_deref().map(sanitize).filter(|d| !d.is_empty()),
                    description: sanitize(&e.description),
                    source: sanitize(&e.source),
                    related_models: e.related_models.iter().map(|m| sanitize(m)).collect(),
                })
                .collect();
            SectionBody::HistoryEvents(Listing::from_items(items, placeholder))
        }
        SectionKind::Alternatives => {
            let items = report
                .alternatives
                .iter()
                .enumerate()
                .map(|(i, a)| AlternativeView {
                    key: format!("{}/{}", kind.key(), i),
                    name: sanitize(&a.name),
                    price_range: sanitize(&a.price_range),
                    advantage: sanitize(&a.advantage),
                    solved_defects: dedup(a.solved_defects.iter().map(|d| sanitize(d))),
                    link: a.link.as_deref().map(sanitize).filter(|l| !l.is_empty()),
                })
                .collect();
            SectionBody::Alternatives(Listing::from_items(items, placeholder))
        }
        SectionKind::DataSources => SectionBody::DataSources(DataSourcesView {
            sources: Listing::from_items(
                report.data_sources.iter().map(|s| sanitize(s)).collect(),
                placeholder,
            ),
            analyzed_reviews_count: report.analyzed_reviews_count,
            noise_filtered: report.noise_filtered,
        }),
    }
}

fn compose_defects(report: &Report) -> Vec<DefectView> {
    report
        .defects
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let severity = d.severity.clamp(Report::MIN_SEVERITY, Report::MAX_SEVERITY);
            let mut meter = [false; SEVERITY_UNITS];
            for unit in meter.iter_mut().take(severity as usize) {
                *unit = true;
            }

            DefectView {
                key: format!("{}/{}", SectionKind::Defects.key(), i),
                marker: category_marker(&d.category),
                category: sanitize(d.category.display_name()),
                description: sanitize(&d.description),
                severity,
                tier: SeverityTier::from_severity(severity),
                meter,
                frequency: d.frequency,
                quotes: d.quotes.iter().take(MAX_QUOTES).map(|q| sanitize(q)).collect(),
                hidden_quotes: d.quotes.len().saturating_sub(MAX_QUOTES),
            }
        })
        .collect()
}

fn compose_heatmap(report: &Report) -> Option<Vec<HeatBar>> {
    let max = report
        .heatmap_data
        .iter()
        .map(|b| b.complaint_count)
        .max()
        .unwrap_or(0);

    if max == 0 {
        return None;
    }

    let bars = report
        .heatmap_data
        .iter()
        .enumerate()
        .map(|(i, b)| HeatBar {
            key: format!("heatmap/{}", i),
            dimension: sanitize(&b.dimension),
            complaint_count: b.complaint_count,
            width: b.complaint_count as f64 / max as f64 * 100.0,
            severity_avg: b.severity_avg,
            percentage: b.percentage,
        })
        .collect();

    Some(bars)
}

fn category_marker(category: &DefectCategory) -> &'static str {
    match category {
        DefectCategory::Hardware => "🔧",
        DefectCategory::Software => "🐛",
        DefectCategory::Design => "📐",
        DefectCategory::Durability => "⏳",
        DefectCategory::Performance => "🐢",
        DefectCategory::Safety => "🔥",
        DefectCategory::Value => "💸",
        DefectCategory::Other(_) => "❓",
    }
}

fn event_marker(kind: &HistoryEventType) -> &'static str {
    match kind {
        HistoryEventType::Recall => "🚨",
        HistoryEventType::Defect => "🔧",
        HistoryEventType::Rebrand => "🏷",
        HistoryEventType::BrandHistory => "📜",
        HistoryEventType::Other(_) => "📌",
    }
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn escape_sequence() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // CSI, OSC (BEL or ST terminated), then any other two-byte ESC sequence
    PATTERN.get_or_init(|| {
        Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\)?|[@-_])")
            .expect("escape sequence pattern is valid")
    })
}

/// Make untrusted text safe to draw: terminal escape sequences and bidi
/// overrides are removed, line breaks and tabs become spaces, other control
/// characters are dropped.
pub fn sanitize(text: &str) -> String {
    let stripped = escape_sequence().replace_all(text, "");
    stripped
        .chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}
