//! Application-level price check and interactive view tests.
//!
//! Uses an in-memory catalog and a scripted quote source:
//! - Unknown items are reported, known items are fully priced
//! - Initial flags select the starting view
//! - Interactive commands re-render, and the view ends on quit, EOF or timeout

use rust_decimal_macros::dec;
use skinpilot_bot::{initial_state, AppConfig, AppError, Application, ItemCatalog};
use skinpilot_core::{ErrorKind, Price, QuoteStatus, Wear};
use skinpilot_engine::{MockQuoteSource, MockResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const CATALOG: &str = r#"[
    {"name": "AK-47 | Redline", "raw_name": "AK-47 | Redline (Minimal Wear)", "buff_id": 100, "wear": "Minimal Wear", "is_stattrak": false, "is_souvenir": false},
    {"name": "AK-47 | Redline", "raw_name": "AK-47 | Redline (Field-Tested)", "buff_id": 101, "wear": "Field-Tested", "is_stattrak": false, "is_souvenir": false},
    {"name": "AK-47 | Redline", "raw_name": "StatTrak™ AK-47 | Redline (Field-Tested)", "buff_id": 102, "wear": "Field-Tested", "is_stattrak": true, "is_souvenir": false}
]"#;

fn setup() -> (Application, Arc<MockQuoteSource>) {
    let catalog = Arc::new(ItemCatalog::from_json(CATALOG).unwrap());
    let source = Arc::new(MockQuoteSource::new());
    source.set_response(
        100,
        MockResponse::priced(
            Price::new(dec!(45.10)),
            Price::new(dec!(52.00)),
            "https://img/100.png",
        ),
    );
    source.set_response(
        101,
        MockResponse::priced(
            Price::new(dec!(20.00)),
            Price::new(dec!(2400.00)),
            "https://img/101.png",
        ),
    );
    source.set_response(102, MockResponse::Unavailable(ErrorKind::RateLimited));

    let app = Application::with_parts(AppConfig::default(), catalog, source.clone());
    (app, source)
}

#[tokio::test]
async fn test_unknown_item() {
    let (app, source) = setup();
    let err = app
        .price_check("M4A4 | Howl", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UnknownItem(name) if name == "M4A4 | Howl"));
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn test_price_check_prices_every_variant() {
    let (app, source) = setup();
    let result = app
        .price_check("ak-47 | redline", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.canonical_name, "AK-47 | Redline");
    assert_eq!(result.len(), 3);
    assert_eq!(result.quotes[2].status, QuoteStatus::Failed);
    let mut calls = source.calls();
    calls.sort_unstable();
    assert_eq!(calls, vec![100, 101, 102]);
}

#[tokio::test]
async fn test_default_render() {
    let (app, _) = setup();
    let result = app
        .price_check("AK-47 | Redline", &CancellationToken::new())
        .await
        .unwrap();
    let session = app.open_view(result, initial_state(None, false, false));
    let text = app.render(&session);

    assert!(text.starts_with("AK-47 | Redline\n"));
    assert!(text.contains("Image: https://img/100.png"));
    assert!(text.contains("Minimal Wear      | $45.10      | $52.00"));
    // Reference above the display ceiling.
    assert!(text.contains("Field-Tested      | $20.00      | N/A"));
    assert!(!text.contains("ST Field-Tested"));
}

#[tokio::test]
async fn test_initial_flags_select_view() {
    let (app, _) = setup();
    let result = app
        .price_check("AK-47 | Redline", &CancellationToken::new())
        .await
        .unwrap();
    let session = app.open_view(result, initial_state(Some(Wear::FieldTested), true, false));
    let text = app.render(&session);

    assert!(text.starts_with("StatTrak™ AK-47 | Redline\n"));
    assert!(text.contains("ST Field-Tested   | N/A         | N/A"));
    assert!(text.contains("Filter: StatTrak, Field-Tested"));
}

#[tokio::test]
async fn test_interactive_toggles_until_quit() {
    let (app, _) = setup();
    let result = app
        .price_check("AK-47 | Redline", &CancellationToken::new())
        .await
        .unwrap();
    let session = app.open_view(result, initial_state(None, false, false));
    let id = session.id();

    let input: &[u8] = b"st\nsv\nnope\nq\nmw\n";
    let mut output = Vec::new();
    app.run_interactive(session, input, &mut output, &CancellationToken::new())
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Filter: StatTrak"));
    assert!(text.contains("Filter: Souvenir"));
    assert!(text.contains("showing the default view"));
    assert!(text.contains("Unknown command \"nope\""));
    // Nothing after quit is processed.
    assert!(!text.contains("Filter: Souvenir, Minimal Wear"));
    assert!(app.sessions().get(id).is_err());
}

#[tokio::test]
async fn test_interactive_ends_on_eof() {
    let (app, _) = setup();
    let result = app
        .price_check("AK-47 | Redline", &CancellationToken::new())
        .await
        .unwrap();
    let session = app.open_view(result, initial_state(None, false, false));

    let input = tokio_test::io::Builder::new().read(b"f").read(b"t\n").build();
    let mut output = Vec::new();
    app.run_interactive(
        session,
        tokio::io::BufReader::new(input),
        &mut output,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Filter: Field-Tested"));
    assert!(app.sessions().is_empty());
}

#[tokio::test]
async fn test_interactive_closes_session_on_input_error() {
    let (app, _) = setup();
    let result = app
        .price_check("AK-47 | Redline", &CancellationToken::new())
        .await
        .unwrap();
    let session = app.open_view(result, initial_state(None, false, false));

    let input = tokio_test::io::Builder::new()
        .read(b"st\n")
        .read_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin gone"))
        .build();
    let mut output = Vec::new();
    let err = app
        .run_interactive(
            session,
            tokio::io::BufReader::new(input),
            &mut output,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Io(_)));
    assert!(String::from_utf8(output).unwrap().contains("Filter: StatTrak"));
    assert!(app.sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_interactive_view_times_out() {
    let (app, _) = setup();
    let result = app
        .price_check("AK-47 | Redline", &CancellationToken::new())
        .await
        .unwrap();
    let session = app.open_view(result, initial_state(None, false, false));

    // Writer half kept open so reads never finish.
    let (_writer, reader) = tokio::io::duplex(64);
    let started = tokio::time::Instant::now();
    let mut output = Vec::new();
    app.run_interactive(
        session,
        tokio::io::BufReader::new(reader),
        &mut output,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(180));
    assert!(String::from_utf8(output).unwrap().contains("View expired."));
    assert!(app.sessions().is_empty());
}
