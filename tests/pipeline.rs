use std::path::Path;

use chrono::NaiveDate;
use vactrend::app::pipeline::{Stage, run_offline};
use vactrend::domain::{Country, Rgb, RunConfig};
use vactrend::error::AppError;
use vactrend::report::{format_daily_rate, format_value};

fn config(dir: &Path) -> RunConfig {
    RunConfig {
        countries: vec![
            Country::new("A", "Country A", Rgb::from_hex(0xff0000)).with_emblem("🅰"),
            Country::new("B", "Country B", Rgb::from_hex(0x0000ff)),
        ],
        epoch: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        display_end: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
        horizon: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        cache_path: dir.join("vaccinations.csv"),
        image_path: dir.join("public").join("vactrend.png"),
        image_scale: 0.5,
        image_dpi: 72.0,
        html_path: dir.join("public").join("index.html"),
        targets: vec![100.0, 200.0],
        ..RunConfig::default()
    }
}

fn write_csv(path: &Path, body: &str) {
    std::fs::write(
        path,
        format!("location,iso_code,date,total_vaccinations,total_vaccinations_per_hundred\n{body}"),
    )
    .unwrap();
}

const TWO_COUNTRIES: &str = "\
Country A,A,2021-01-01,100,10
Country B,B,2021-01-01,50,5
Elsewhere,ZZZ,2021-01-01,1,1
Country A,A,2021-01-02,200,20
Country B,B,2021-01-02,50,5
Country A,A,2021-01-03,300,30
Country B,B,2021-01-03,50,5
";

#[test]
fn two_country_scenario_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_csv(&config.cache_path, TWO_COUNTRIES);

    let out = run_offline(&config, &config.cache_path).unwrap();

    let a = &out.facts["A"];
    let b = &out.facts["B"];
    assert_eq!(a.current, 30.0);
    assert_eq!(b.current, 5.0);
    assert_eq!(format_daily_rate(a.daily_rate), "+10.00");
    assert_eq!(format_daily_rate(b.daily_rate), "+0.00");

    // A grows by 10/day and sits on 100 at day 9, so the strict crossing lands on day 9 or 10.
    let first = &a.crossings[0];
    assert!(first.reached);
    assert!(
        (NaiveDate::from_ymd_opt(2021, 1, 10).unwrap()..=NaiveDate::from_ymd_opt(2021, 1, 11).unwrap())
            .contains(&first.date),
        "{first:?}"
    );
    // B is flat at 5 and never reaches either target.
    assert!(b.crossings.iter().all(|c| !c.reached && c.date == config.horizon));

    for curve in out.curves.values() {
        assert_eq!(curve.points.len(), config.horizon_len());
    }
    assert!(out.image_path.exists());
}

#[test]
fn rendered_html_contains_names_and_current_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_csv(&config.cache_path, TWO_COUNTRIES);

    let out = run_offline(&config, &config.cache_path).unwrap();
    let html = std::fs::read_to_string(&out.html_path).unwrap();

    for country in &config.countries {
        let fact = &out.facts[&country.code];
        assert!(html.contains(&country.name), "missing {}", country.name);
        assert!(html.contains(&format_value(fact.current)), "missing current for {}", country.name);
        assert!(html.contains(&format_daily_rate(fact.daily_rate)));
    }
    assert!(html.contains("30.00"));
    assert!(html.contains("5.00"));
    assert!(html.contains("vactrend.png"));
}

#[test]
fn nulls_are_dropped_before_fitting() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_csv(
        &config.cache_path,
        "\
Country A,A,2021-01-01,100,10
Country A,A,2021-01-02,,
Country A,A,2021-01-03,300,30
Country A,A,2021-01-04,400,40
Country B,B,2021-01-01,50,5
Country B,B,2021-01-02,60,6
Country B,B,2021-01-03,70,7
",
    );

    let out = run_offline(&config, &config.cache_path).unwrap();
    assert_eq!(out.facts["A"].daily_rate, 10.0);
    assert_eq!(out.curves["A"].optimistic.quality.n, 3);
}

#[test]
fn country_with_two_points_fails_the_fit_stage() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    write_csv(
        &config.cache_path,
        "\
Country A,A,2021-01-01,100,10
Country A,A,2021-01-02,200,20
Country A,A,2021-01-03,300,30
Country B,B,2021-01-01,50,5
Country B,B,2021-01-02,,
Country B,B,2021-01-03,60,6
",
    );

    let err = run_offline(&config, &config.cache_path).unwrap_err();
    assert_eq!(err.stage, Stage::Fit);
    assert_eq!(
        err.source,
        AppError::InsufficientData {
            country: "B".into(),
            model: "optimistic",
            points: 2,
            required: 3,
        }
    );
    assert_eq!(err.exit_code(), 4);
    assert!(!config.html_path.exists());
}

#[test]
fn schema_mismatch_fails_the_load_stage() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    std::fs::write(&config.cache_path, "iso_code,day,value\nA,1,10\n").unwrap();

    let err = run_offline(&config, &config.cache_path).unwrap_err();
    assert_eq!(err.stage, Stage::Load);
    assert!(matches!(err.source, AppError::DataFormat(_)));
    assert!(err.to_string().starts_with("load stage failed"));
}
