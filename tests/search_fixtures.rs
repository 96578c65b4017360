mod common;

use chrono::NaiveDate;
use common::{Call, StubTransport, read_fixture};
use hkexkit::{
    CategoryTable, HkexError, ResolvedWindow, SearchOperations, TickerInfo, parse_search_results,
};

fn window() -> ResolvedWindow {
    ResolvedWindow {
        from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        to: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
    }
}

fn ckh() -> TickerInfo {
    TickerInfo {
        internal_id: 1,
        code: "00001".to_string(),
        display_name: "CKH HOLDINGS".to_string(),
    }
}

#[test]
fn parse_annual_report_results() {
    let content = read_fixture("search/titlesearch-annual.html");
    let links = parse_search_results(&content);

    let paths: Vec<&str> = links.iter().map(|l| l.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/listedco/listconews/sehk/2023/0420/2023042000614.pdf",
            "/listedco/listconews/sehk/2023/0420/2023042000612.pdf",
        ]
    );
    assert_eq!(links[0].file_name(), "2023042000614.pdf");
}

#[test]
fn parse_empty_results() {
    let content = read_fixture("search/titlesearch-empty.html");
    assert!(parse_search_results(&content).is_empty());
}

#[tokio::test]
async fn search_posts_query_fields() {
    let (hkex, stub) =
        StubTransport::new("", read_fixture("search/titlesearch-annual.html")).into_client();
    let query = CategoryTable::default()
        .build_query("Annual Report", &ckh(), &window())
        .unwrap();

    let links = hkex.search_reports(&query).await.unwrap();
    assert_eq!(links.len(), 2);

    let calls = stub.calls();
    assert_eq!(calls, vec![Call::Search(query.form_params().to_vec())]);
}

#[tokio::test]
async fn no_matches_is_not_an_error() {
    let (hkex, _) =
        StubTransport::new("", read_fixture("search/titlesearch-empty.html")).into_client();
    let query = CategoryTable::default()
        .build_query("ESG", &ckh(), &window())
        .unwrap();

    assert!(hkex.search_reports(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn transport_error_is_search_failure() {
    let (hkex, _) = StubTransport::default()
        .with_failing_search()
        .into_client();
    let query = CategoryTable::default()
        .build_query("ESG", &ckh(), &window())
        .unwrap();

    let err = hkex.search_reports(&query).await.unwrap_err();
    assert!(matches!(err, HkexError::SearchFailure { ref category, .. } if category == "ESG"));
}
