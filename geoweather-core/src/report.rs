//! What the presentation layer shows for a query result, independent of how
//! it is drawn.

use url::Url;

use crate::model::{UNKNOWN_LOCATION, WeatherQueryResult};

pub const NO_RAW_DATA: &str = "No JSON data available.";
pub const NO_SOURCES_NOTE: &str = "No specific data sources were cited for this information.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Summary,
    Raw,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Summary => "Summary",
            Tab::Raw => "JSON Data",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Tab::Summary => Tab::Raw,
            Tab::Raw => Tab::Summary,
        }
    }
}

/// A source string the model cited; links only when it is an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitedSource {
    pub text: String,
    pub is_link: bool,
}

/// A grounding citation as displayed: title when present, else the URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebReference {
    pub label: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub rows: Vec<(&'static str, String)>,
    pub ai_sources: Vec<CitedSource>,
    pub web_references: Vec<WebReference>,
}

impl SummaryView {
    pub fn from_result(result: &WeatherQueryResult) -> Self {
        let d = &result.details;
        let mut rows = Vec::new();

        if !d.location_name.is_empty() && d.location_name != UNKNOWN_LOCATION {
            rows.push(("Location", d.location_name.clone()));
        }
        for (label, value) in [
            ("Condition", &d.condition),
            ("Temperature", &d.temperature),
            ("Humidity", &d.humidity),
            ("Wind", &d.wind),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                rows.push((label, v.to_string()));
            }
        }

        let ai_sources = d
            .source
            .iter()
            .map(|s| CitedSource {
                text: s.clone(),
                is_link: Url::parse(s).is_ok(),
            })
            .collect();

        let web_references = result
            .grounding_sources
            .iter()
            .map(|g| WebReference {
                label: if g.title.is_empty() {
                    g.uri.clone()
                } else {
                    g.title.clone()
                },
                uri: g.uri.clone(),
            })
            .collect();

        Self {
            rows,
            ai_sources,
            web_references,
        }
    }

    pub fn has_sources(&self) -> bool {
        !self.ai_sources.is_empty() || !self.web_references.is_empty()
    }
}

/// Body of the raw tab.
pub fn raw_text(result: &WeatherQueryResult) -> &str {
    if result.raw_text.is_empty() {
        NO_RAW_DATA
    } else {
        &result.raw_text
    }
}

pub const TERMS_OF_SERVICE: &str = "\
Terms of Service

These terms govern your use of GeoWeather Realtime.

1. Acceptance of Terms
By using the application you agree to these terms. If you do not agree, do not use it.

2. Use of Service
GeoWeather Realtime reports weather for geographic coordinates, for information only. \
Data comes from third-party services (Google Gemini API, OpenStreetMap Nominatim); its \
accuracy, availability and timeliness depend on them and are not guaranteed. Do not misuse \
the service or attempt to interfere with it.

3. API Usage
Your use of the Gemini API and Nominatim through this application is also subject to their \
own terms, including quotas. The Gemini API key is supplied by you through configuration or \
the environment.

4. Intellectual Property
The application and its original content, excluding data retrieved from third parties, \
belong to its authors.

5. Limitation of Liability
The authors are not liable for any indirect, incidental or consequential damages arising \
from use of, or inability to use, the service.

6. Changes to Terms
These terms may be changed at any time; material changes will be announced in advance.
";

pub const PRIVACY_POLICY: &str = "\
Privacy Policy

1. Information We Use
Location: your configured home location, or a coordinate you choose, is sent to the \
weather service to answer your query. It is used only for the current session.
Search queries: text you search for is sent to OpenStreetMap Nominatim to find coordinates. \
Queries are not stored by GeoWeather Realtime.
API key: your Gemini API key stays in your local configuration file or environment and is \
only sent to the Gemini API.

2. How We Use Information
Only to fetch and display weather for the selected location and to search for places.

3. Third-Party Services
Google Gemini API (weather answers) and OpenStreetMap Nominatim (search). Their own privacy \
policies apply to your interactions with them.

4. Data Security
GeoWeather Realtime has no server and stores no query results or personal data.

5. Children's Privacy
The service is not directed at children under 13.

6. Changes to This Privacy Policy
Updates will be published with new releases of the application.
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coordinate::Coordinate,
        model::{GroundingSource, WeatherDetails},
    };
    use chrono::Utc;

    fn result(details: WeatherDetails, grounding: Vec<GroundingSource>) -> WeatherQueryResult {
        WeatherQueryResult {
            coordinate: Coordinate::DEFAULT,
            details,
            raw_text: String::new(),
            grounding_sources: grounding,
            retrieved_at: Utc::now(),
        }
    }

    fn details() -> WeatherDetails {
        WeatherDetails {
            location_name: UNKNOWN_LOCATION.into(),
            condition: Some("Clear".into()),
            temperature: Some("30°C".into()),
            humidity: Some(String::new()),
            wind: None,
            source: vec!["NEA".into(), "https://www.nea.gov.sg".into()],
        }
    }

    #[test]
    fn rows_skip_sentinel_and_empty_fields() {
        let view = SummaryView::from_result(&result(details(), vec![]));
        assert_eq!(
            view.rows,
            vec![("Condition", "Clear".to_string()), ("Temperature", "30°C".to_string())]
        );
    }

    #[test]
    fn ai_sources_link_only_urls() {
        let view = SummaryView::from_result(&result(details(), vec![]));
        assert!(!view.ai_sources[0].is_link);
        assert!(view.ai_sources[1].is_link);
    }

    #[test]
    fn sources_are_listed_separately_even_when_overlapping() {
        let grounding = vec![GroundingSource {
            uri: "https://www.nea.gov.sg".into(),
            title: String::new(),
        }];
        let view = SummaryView::from_result(&result(details(), grounding));
        assert_eq!(view.ai_sources.len(), 2);
        assert_eq!(view.web_references.len(), 1);
        assert_eq!(view.web_references[0].label, "https://www.nea.gov.sg");
    }

    #[test]
    fn empty_raw_text_has_placeholder() {
        let r = result(details(), vec![]);
        assert_eq!(raw_text(&r), NO_RAW_DATA);
        assert_eq!(Tab::Summary.toggled(), Tab::Raw);
    }

    #[test]
    fn no_sources_detected() {
        let mut d = details();
        d.source.clear();
        assert!(!SummaryView::from_result(&result(d, vec![])).has_sources());
    }
}
