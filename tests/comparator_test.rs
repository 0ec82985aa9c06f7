use chrono::{Local, TimeZone};

use sift::{CompareOp, Comparator, Pattern, SiftError};

fn now_secs() -> i64 {
    Local::now().timestamp()
}

// ---------------------------------------------------------------------------
// Size expressions
// ---------------------------------------------------------------------------

#[test]
fn size_with_decimal_and_binary_units() {
    let c = Comparator::size("< 1K").unwrap();
    assert!(c.matches(500));
    assert!(!c.matches(2000));

    let c = Comparator::size("< 1Ki").unwrap();
    assert!(c.matches(1023));
    assert!(!c.matches(1024));

    let c = Comparator::size(">= 2M").unwrap();
    assert!(c.matches(2_000_000));
    assert!(!c.matches(1_999_999));

    let c = Comparator::size("> 1Gi").unwrap();
    assert!(c.matches(1024 * 1024 * 1024 + 1));
    assert!(!c.matches(1024 * 1024 * 1024));
}

#[test]
fn size_without_operator_means_equality() {
    let c = Comparator::size("42").unwrap();
    assert_eq!(c.op(), CompareOp::Eq);
    assert!(c.matches(42));
    assert!(!c.matches(41));

    let c = Comparator::size("1k").unwrap();
    assert!(c.matches(1000));
}

#[test]
fn size_rejects_malformed_expressions() {
    for bad in ["", "abc", "1x", "<", "12 KB", "--3"] {
        let err = Comparator::size(bad).unwrap_err();
        assert!(matches!(err, SiftError::Parse { .. }), "`{bad}` must not parse");
    }
}

// ---------------------------------------------------------------------------
// Depth expressions
// ---------------------------------------------------------------------------

#[test]
fn depth_uses_the_numeric_grammar_without_units() {
    let c = Comparator::depth("< 3").unwrap();
    assert!(c.matches(2));
    assert!(!c.matches(3));

    let c = Comparator::depth("2").unwrap();
    assert_eq!(c.op(), CompareOp::Eq);

    assert!(Comparator::depth("1k").is_err());
}

#[test]
fn ceiling_and_floor_reflect_the_operator() {
    assert_eq!(Comparator::depth("< 3").unwrap().ceiling(), Some(2));
    assert_eq!(Comparator::depth("<= 3").unwrap().ceiling(), Some(3));
    assert_eq!(Comparator::depth("3").unwrap().ceiling(), Some(3));
    assert_eq!(Comparator::depth("> 3").unwrap().ceiling(), None);

    assert_eq!(Comparator::depth("> 3").unwrap().floor(), Some(4));
    assert_eq!(Comparator::depth(">= 3").unwrap().floor(), Some(3));
    assert_eq!(Comparator::depth("< 3").unwrap().floor(), None);
}

// ---------------------------------------------------------------------------
// Date expressions
// ---------------------------------------------------------------------------

#[test]
fn relative_phrases_resolve_against_the_clock() {
    let c = Comparator::date("until last month").unwrap();
    assert_eq!(c.op(), CompareOp::LessEq);
    assert!(c.matches(now_secs() - 40 * 86_400));
    assert!(!c.matches(now_secs()));

    let c = Comparator::date("since yesterday").unwrap();
    assert_eq!(c.op(), CompareOp::GreaterEq);
    assert!(c.matches(now_secs()));
    assert!(!c.matches(now_secs() - 3 * 86_400));

    // A bare phrase means on-or-after.
    let c = Comparator::date("2 days ago").unwrap();
    assert_eq!(c.op(), CompareOp::GreaterEq);
    assert!(c.matches(now_secs()));
    assert!(!c.matches(now_secs() - 3 * 86_400));

    let c = Comparator::date("now").unwrap();
    assert!((c.target() - now_secs()).abs() < 5);
}

#[test]
fn absolute_dates_parse_in_local_time() {
    let c = Comparator::date(">= 2020-06-15").unwrap();
    let expected = Local
        .with_ymd_and_hms(2020, 6, 15, 0, 0, 0)
        .single()
        .unwrap()
        .timestamp();
    assert_eq!(c.target(), expected);
    assert_eq!(c.op(), CompareOp::GreaterEq);

    let c = Comparator::date("before 2020-06-15 10:30:00").unwrap();
    assert_eq!(c.op(), CompareOp::LessEq);
    assert_eq!(c.target(), expected + 10 * 3600 + 30 * 60);
}

#[test]
fn date_rejects_malformed_expressions() {
    for bad in ["", "until next flood", "since", "15/06/2020"] {
        let err = Comparator::date(bad).unwrap_err();
        assert!(matches!(err, SiftError::Parse { .. }), "`{bad}` must not parse");
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[test]
fn plain_name_patterns_are_globs() {
    let p = Pattern::name("*.php").unwrap();
    assert!(p.is_match("test.php"));
    assert!(!p.is_match("test.py"));

    let p = Pattern::name("test.ph?").unwrap();
    assert!(p.is_match("test.php"));
    assert!(!p.is_match("test.phps"));

    let p = Pattern::name("[tf]oto").unwrap();
    assert!(p.is_match("toto"));
    assert!(p.is_match("foto"));
    assert!(!p.is_match("moto"));
}

#[test]
fn delimited_patterns_are_regexes_with_flags() {
    let p = Pattern::name("~^test~i").unwrap();
    assert!(p.is_match("TEST.php"));

    let p = Pattern::name(r"/\.php$/").unwrap();
    assert!(p.is_match("test.php"));
    assert!(!p.is_match("test.php.bak"));

    let p = Pattern::content("~^ipsum~m").unwrap();
    assert!(p.is_match("lorem\nipsum"));
    assert!(!Pattern::content("~^ipsum~").unwrap().is_match("lorem\nipsum"));
}

#[test]
fn plain_content_patterns_are_literal_substrings() {
    let p = Pattern::content("a+b").unwrap();
    assert!(p.is_match("xa+by"));
    assert!(!p.is_match("aab"));

    // The empty literal matches everything.
    assert!(Pattern::content("").unwrap().is_match("anything"));
}

#[test]
fn a_leading_slash_without_flags_stays_a_glob() {
    let p = Pattern::path("/tmp/x*").unwrap();
    assert!(p.is_match("/tmp/x1"));
}

#[test]
fn invalid_patterns_surface_parse_errors() {
    assert!(matches!(
        Pattern::name("~(~").unwrap_err(),
        SiftError::Parse { .. }
    ));
    assert!(matches!(
        Pattern::name("[").unwrap_err(),
        SiftError::Parse { .. }
    ));
}
