mod common;

use chrono::NaiveDate;
use common::{BASE, Call, StubTransport, read_fixture};
use hkexkit::{
    CategoryTable, DateWindow, ErrorPolicy, HkexError, MatchPolicy, ReportCategory, RunConfig,
    run_at,
};
use tempfile::TempDir;

const SEARCH_BODY: &str = r#"<table>
  <tr><td><a href="/listedco/a/2023.pdf">Annual Report 2023</a></td></tr>
  <tr><td><a href="/other/ignored.txt">Something else</a></td></tr>
</table>"#;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn annual_report_config(root: &TempDir, tickers: Vec<u32>) -> RunConfig {
    RunConfig {
        output_dir: root.path().join("out"),
        tickers,
        categories: CategoryTable::new(vec![ReportCategory::annual_report()]),
        window: DateWindow::Fixed {
            from: day(2023, 1, 1),
            to: day(2023, 12, 31),
        },
        error_policy: ErrorPolicy::Continue,
        match_policy: MatchPolicy::ExactCode,
    }
}

fn stub() -> StubTransport {
    StubTransport::new(read_fixture("lookup/partial-00001.txt"), SEARCH_BODY)
        .with_document("/listedco/a/2023.pdf", b"%PDF-1.4 report")
}

#[tokio::test]
async fn single_ticker_end_to_end_and_rerun() {
    let root = TempDir::new().unwrap();
    let config = annual_report_config(&root, vec![1]);

    let (hkex, first_stub) = stub().into_client();
    let summary = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap();

    assert!(summary.is_clean());
    assert_eq!(summary.tickers_resolved, 1);
    assert_eq!(summary.searches, 1);
    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.skipped, 0);

    let category_dir = config
        .output_dir
        .join("00001-CKH HOLDINGS")
        .join("Annual Report");
    assert!(category_dir.is_dir());
    assert_eq!(
        std::fs::read(category_dir.join("2023.pdf")).unwrap(),
        b"%PDF-1.4 report"
    );
    assert_eq!(std::fs::read_dir(&category_dir).unwrap().count(), 1);
    assert_eq!(
        first_stub.document_calls(),
        vec![format!("{}/listedco/a/2023.pdf", BASE)]
    );

    let search_form = first_stub
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::Search(form) => Some(form),
            _ => None,
        })
        .unwrap();
    assert!(search_form.contains(&("from".to_string(), "20230101".to_string())));
    assert!(search_form.contains(&("to".to_string(), "20231231".to_string())));
    assert!(search_form.contains(&("stockId".to_string(), "1".to_string())));

    let (hkex, second_stub) = stub().into_client();
    let rerun = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap();

    assert!(rerun.is_clean());
    assert_eq!(rerun.downloaded, 0);
    assert_eq!(rerun.skipped, 1);
    assert!(second_stub.document_calls().is_empty());
}

#[tokio::test]
async fn continue_policy_records_and_moves_on() {
    let root = TempDir::new().unwrap();
    let config = annual_report_config(&root, vec![5, 1]);

    let (hkex, stub) = stub().into_client();
    let summary = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap();

    assert_eq!(summary.failed(), 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.ticker, 5);
    assert!(failure.category.is_none());
    assert!(matches!(failure.error, HkexError::LookupFailure { code: 5, .. }));

    assert_eq!(summary.tickers_resolved, 1);
    assert_eq!(summary.downloaded, 1);
    assert_eq!(stub.document_calls().len(), 1);
}

#[tokio::test]
async fn abort_policy_stops_at_first_failure() {
    let root = TempDir::new().unwrap();
    let config = RunConfig {
        error_policy: ErrorPolicy::Abort,
        ..annual_report_config(&root, vec![5, 1])
    };

    let (hkex, stub) = stub().into_client();
    let err = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap_err();

    assert!(matches!(err, HkexError::LookupFailure { code: 5, .. }));
    assert_eq!(stub.calls().len(), 1);
}

fn both_categories_config(root: &TempDir, policy: ErrorPolicy) -> RunConfig {
    RunConfig {
        categories: CategoryTable::default(),
        error_policy: policy,
        ..annual_report_config(root, vec![1])
    }
}

#[tokio::test]
async fn continue_policy_moves_on_after_search_failure() {
    let root = TempDir::new().unwrap();
    let config = both_categories_config(&root, ErrorPolicy::Continue);

    let (hkex, stub) = stub().with_failing_search().into_client();
    let summary = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap();

    assert_eq!(summary.tickers_resolved, 1);
    assert_eq!(summary.searches, 0);
    assert_eq!(summary.downloaded, 0);

    let categories: Vec<Option<&str>> = summary
        .failures
        .iter()
        .map(|f| f.category.as_deref())
        .collect();
    assert_eq!(categories, vec![Some("Annual Report"), Some("ESG")]);
    assert!(
        summary
            .failures
            .iter()
            .all(|f| f.link.is_none() && matches!(f.error, HkexError::SearchFailure { .. }))
    );

    // One lookup, then one search per category.
    let calls = stub.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], Call::Lookup(_)));
    assert!(calls[1..].iter().all(|c| matches!(c, Call::Search(_))));
}

#[tokio::test]
async fn abort_policy_stops_on_search_failure() {
    let root = TempDir::new().unwrap();
    let config = both_categories_config(&root, ErrorPolicy::Abort);

    let (hkex, stub) = stub().with_failing_search().into_client();
    let err = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap_err();

    match err {
        HkexError::SearchFailure { category, .. } => assert_eq!(category, "Annual Report"),
        other => panic!("expected SearchFailure, got {:?}", other),
    }
    assert_eq!(stub.calls().len(), 2);
}

#[tokio::test]
async fn abort_policy_stops_on_download_failure() {
    let root = TempDir::new().unwrap();
    let config = both_categories_config(&root, ErrorPolicy::Abort);

    let (hkex, stub) = StubTransport::new(read_fixture("lookup/partial-00001.txt"), SEARCH_BODY)
        .into_client();
    let err = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap_err();

    match err {
        HkexError::DownloadFailure { link, .. } => assert_eq!(link, "/listedco/a/2023.pdf"),
        other => panic!("expected DownloadFailure, got {:?}", other),
    }
    // The ESG search is never issued.
    let calls = stub.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[2], Call::Document(_)));

    let annual_dir = config
        .output_dir
        .join("00001-CKH HOLDINGS")
        .join("Annual Report");
    assert_eq!(std::fs::read_dir(&annual_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_document_is_recorded_per_link() {
    let root = TempDir::new().unwrap();
    let config = annual_report_config(&root, vec![1]);

    let (hkex, _) = StubTransport::new(read_fixture("lookup/partial-00001.txt"), SEARCH_BODY)
        .into_client();
    let summary = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap();

    assert_eq!(summary.failed(), 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.category.as_deref(), Some("Annual Report"));
    assert_eq!(failure.link.as_deref(), Some("/listedco/a/2023.pdf"));
    assert_eq!(failure.error.stage(), "download");
}

#[tokio::test]
async fn hostile_company_name_stays_under_output_root() {
    let root = TempDir::new().unwrap();
    let config = annual_report_config(&root, vec![1]);
    let lookup = r#"callback({"more":"0","stockInfo":[{"stockId":1,"code":"00001","name":"../../escape"}]});"#;

    let (hkex, _) = StubTransport::new(lookup, SEARCH_BODY)
        .with_document("/listedco/a/2023.pdf", b"%PDF")
        .into_client();
    let summary = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap();
    assert!(summary.is_clean());

    let entries: Vec<String> = std::fs::read_dir(&config.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["00001-.._.._escape".to_string()]);
    assert!(!root.path().join("escape").exists());
}

#[tokio::test]
async fn invalid_config_fails_before_any_request() {
    let root = TempDir::new().unwrap();
    let config = annual_report_config(&root, vec![]);

    let (hkex, stub) = stub().into_client();
    let err = run_at(&hkex, &config, day(2024, 6, 1)).await.unwrap_err();

    assert!(matches!(err, HkexError::ConfigError(_)));
    assert!(stub.calls().is_empty());
}
