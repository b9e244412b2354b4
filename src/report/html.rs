//! HTML summary page.
//!
//! The template lives in `templates/index.html` and is compiled into the
//! binary by askama, so a missing or malformed template fails the build rather
//! than the run. Every interpolated field is HTML-escaped.

use askama::Template;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::domain::{RunConfig, SummaryFact};
use crate::error::AppError;
use crate::report::summary::{format_daily_rate, format_value};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage<'a> {
    countries: Vec<CountryView<'a>>,
    image_src: String,
    horizon: String,
    last_update: String,
}

struct CountryView<'a> {
    code: &'a str,
    name: &'a str,
    emblem: &'a str,
    color: String,
    current: String,
    daily_rate: String,
    crossings: Vec<CrossingView>,
}

struct CrossingView {
    target: String,
    date: String,
    reached: bool,
}

/// Render the summary page for `facts` (countries without facts are skipped).
pub fn render_html(
    facts: &IndexMap<String, SummaryFact>,
    config: &RunConfig,
    generated_at: DateTime<Utc>,
) -> Result<String, AppError> {
    let countries = config
        .countries
        .iter()
        .filter_map(|country| {
            let fact = facts.get(&country.code)?;
            Some(CountryView {
                code: &country.code,
                name: &country.name,
                emblem: country.emblem.as_deref().unwrap_or(""),
                color: country.color.to_css(),
                current: format_value(fact.current),
                daily_rate: format_daily_rate(fact.daily_rate),
                crossings: fact
                    .crossings
                    .iter()
                    .map(|c| CrossingView {
                        target: format!("{:.0}", c.target),
                        date: c.date.format(DATE_FORMAT).to_string(),
                        reached: c.reached,
                    })
                    .collect(),
            })
        })
        .collect();

    let image_src = config
        .image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let page = IndexPage {
        countries,
        image_src,
        horizon: config.horizon.format(DATE_FORMAT).to_string(),
        last_update: generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    };

    page.render()
        .map_err(|e| AppError::Template(format!("Failed to render summary page: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, Rgb, ThresholdCrossing};
    use chrono::{NaiveDate, TimeZone};

    fn fact(code: &str, current: f64, daily_rate: f64, crossings: Vec<ThresholdCrossing>) -> SummaryFact {
        SummaryFact {
            country_code: code.into(),
            current,
            daily_rate,
            crossings,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn page_lists_each_country_with_formatted_facts() {
        let config = RunConfig::default();
        let date = NaiveDate::from_ymd_opt(2021, 8, 2).unwrap();
        let mut facts = IndexMap::new();
        facts.insert(
            "GBR".to_string(),
            fact(
                "GBR",
                36.512,
                0.7,
                vec![
                    ThresholdCrossing { target: 100.0, date, reached: true },
                    ThresholdCrossing { target: 200.0, date: config.horizon, reached: false },
                ],
            ),
        );
        facts.insert("DEU".to_string(), fact("DEU", 4.1, 0.25, vec![]));

        let html = render_html(&facts, &config, generated_at()).unwrap();

        assert!(html.contains("United Kingdom"));
        assert!(html.contains("36.51"));
        assert!(html.contains("+0.70"));
        assert!(html.contains("2021-08-02"));
        assert!(html.contains("Germany"));
        assert!(html.contains("4.10"));
        assert!(html.contains("2021-03-14 09:30 UTC"));
        assert!(html.contains("vactrend.png"));
        assert!(html.contains("#007bff"));
        // Configuration order, not insertion order.
        assert!(html.find("United Kingdom").unwrap() < html.find("Germany").unwrap());
    }

    #[test]
    fn data_fields_are_escaped() {
        let config = RunConfig {
            countries: vec![Country::new("XSS", "<script>alert(1)</script>", Rgb::from_hex(0xff0000))],
            ..RunConfig::default()
        };
        let mut facts = IndexMap::new();
        facts.insert("XSS".to_string(), fact("XSS", 1.0, 1.0, vec![]));

        let html = render_html(&facts, &config, generated_at()).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn countries_without_facts_are_skipped() {
        let config = RunConfig::default();
        let mut facts = IndexMap::new();
        facts.insert("DEU".to_string(), fact("DEU", 4.1, 0.25, vec![]));

        let html = render_html(&facts, &config, generated_at()).unwrap();
        assert!(html.contains("Germany"));
        assert!(!html.contains("United Kingdom"));
    }
}
