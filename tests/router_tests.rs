use std::collections::HashSet;
use std::sync::Arc;

use routrie::{BuildError, Record, Router};

fn routes() -> Vec<Record<&'static str>> {
    vec![
        Record::new("/", "testroute0"),
        Record::new("/path/to/route", "testroute1"),
        Record::new("/path/to/other", "testroute2"),
        Record::new("/path/to/route/a", "testroute3"),
        Record::new("/path/to/:param", "testroute4"),
        Record::new("/path/to/wildcard/*routepath", "testroute5"),
        Record::new("/path/to/:param1/:param2", "testroute6"),
        Record::new("/path/to/:param1/sep/:param2", "testroute7"),
        Record::new("/:year/:month/:day", "testroute8"),
        Record::new("/user/:id", "testroute9"),
        Record::new("/a/to/b/:param/*routepath", "testroute10"),
    ]
}

type Expected<'a> = Option<(&'a str, &'a [(&'a str, &'a str)])>;

fn assert_lookup(router: &Router<&str>, path: &str, expected: Expected<'_>) {
    let result = router.lookup(path);
    match (&result, expected) {
        (Some(m), Some((value, params))) => {
            assert_eq!(*m.value, value, "lookup({path:?}) returned the wrong value");
            let got: Vec<(&str, &str)> = m
                .params
                .iter()
                .map(|(k, v)| (k.as_ref(), v.as_str()))
                .collect();
            assert_eq!(got, params, "lookup({path:?}) returned the wrong params");
        }
        (None, None) => {}
        _ => panic!("lookup({path:?}) => {result:?}, want {expected:?}"),
    }
}

#[test]
fn lookup_matches_the_fixture_table() {
    let router = Router::build(routes()).expect("build failed");
    let cases: &[(&str, Expected)] = &[
        ("/", Some(("testroute0", &[]))),
        ("/path/to/route", Some(("testroute1", &[]))),
        ("/path/to/other", Some(("testroute2", &[]))),
        ("/path/to/route/a", Some(("testroute3", &[]))),
        ("/path/to/hoge", Some(("testroute4", &[("param", "hoge")]))),
        (
            "/path/to/wildcard/some/params",
            Some(("testroute5", &[("routepath", "some/params")])),
        ),
        (
            "/path/to/o1/o2",
            Some(("testroute6", &[("param1", "o1"), ("param2", "o2")])),
        ),
        (
            "/path/to/p1/sep/p2",
            Some(("testroute7", &[("param1", "p1"), ("param2", "p2")])),
        ),
        (
            "/2014/01/06",
            Some(("testroute8", &[("year", "2014"), ("month", "01"), ("day", "06")])),
        ),
        ("/user/777", Some(("testroute9", &[("id", "777")]))),
        (
            "/a/to/b/p1/some/wildcard/params",
            Some(("testroute10", &[("param", "p1"), ("routepath", "some/wildcard/params")])),
        ),
        ("/missing", None),
        ("/path/to", None),
        ("", None),
    ];
    for (path, expected) in cases {
        assert_lookup(&router, path, *expected);
    }
}

#[test]
fn lookup_matches_root_level_captures() {
    let router = Router::build([
        Record::new("/", "testroute0"),
        Record::new("/:b", "testroute1"),
        Record::new("/*wildcard", "testroute2"),
    ])
    .expect("build failed");
    assert_lookup(&router, "/", Some(("testroute0", &[])));
    assert_lookup(&router, "/true", Some(("testroute1", &[("b", "true")])));
    assert_lookup(
        &router,
        "/foo/bar",
        Some(("testroute2", &[("wildcard", "foo/bar")])),
    );
}

#[test]
fn params_keep_declaration_order() {
    let router = Router::build([("/:a/:b/:c", "r")]).expect("build failed");
    let m = router.lookup("/x/y/z").expect("no match");
    let got: Vec<(&str, &str)> = m
        .params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_str()))
        .collect();
    assert_eq!(got, [("a", "x"), ("b", "y"), ("c", "z")]);
}

#[test]
fn literal_route_beats_parameter_route() {
    let router = Router::build([
        ("/path/to/route", "literal"),
        ("/path/to/:param", "param"),
    ])
    .expect("build failed");
    let m = router.lookup("/path/to/route").expect("no match");
    assert_eq!(*m.value, "literal");
    assert!(m.params.is_empty());
    // The parameter route still catches everything else at that position.
    let m = router.lookup("/path/to/something").expect("no match");
    assert_eq!(*m.value, "param");
}

#[test]
fn wildcard_capture_is_greedy() {
    let router = Router::build([("/static/*rest", "asset")]).expect("build failed");
    let m = router.lookup("/static/a/b/c").expect("no match");
    assert_eq!(m.get_param("rest"), Some("a/b/c"));
    assert!(router.lookup("/static").is_none());
}

#[test]
fn build_rejects_duplicate_parameter_names() {
    for records in [
        vec![Record::new("/:id/:id", 0)],
        vec![
            Record::new("/:user/:id/:id", 0),
            Record::new("/:user/:user/:id", 0),
        ],
    ] {
        match Router::build(records) {
            Err(BuildError::DuplicateParamName { .. }) => {}
            other => panic!("expected DuplicateParamName, got {other:?}", other = other.err()),
        }
    }
}

#[test]
fn lookup_misses_are_not_errors() {
    let router = Router::build([("/user/:id", "u")]).expect("build failed");
    for path in ["/", "/user", "/user/1/2", "/users/1", "no-slash"] {
        assert!(router.lookup(path).is_none(), "path = {path:?}");
    }
}

#[test]
fn empty_segment_captures_empty_value() {
    let router = Router::build([("/users/:a/x", "r")]).expect("build failed");
    let m = router.lookup("/users//x").expect("no match");
    assert_eq!(m.get_param("a"), Some(""));
}

#[test]
fn random_literal_round_trip() {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789/";
    fastrand::seed(0x5eed);
    let mut keys = HashSet::new();
    while keys.len() < 1000 {
        let len = fastrand::usize(10..60);
        let mut key = String::with_capacity(len + 1);
        key.push('/');
        for _ in 0..len {
            key.push(CHARSET[fastrand::usize(..CHARSET.len())] as char);
        }
        keys.insert(key);
    }
    let records: Vec<Record<usize>> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| Record::new(key.clone(), i))
        .collect();
    let router = Router::build(records.clone()).expect("build failed");
    assert_eq!(router.len(), 1000);
    for record in &records {
        let m = router
            .lookup(&record.key)
            .unwrap_or_else(|| panic!("lookup({:?}) missed", record.key));
        assert_eq!(*m.value, record.value);
        assert!(m.params.is_empty());
    }
}

#[test]
fn router_is_shareable_across_threads() {
    let router = Arc::new(Router::build(routes()).expect("build failed"));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let router = Arc::clone(&router);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    let m = router.lookup("/path/to/p1/sep/p2").expect("no match");
                    assert_eq!(*m.value, "testroute7");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("lookup thread panicked");
    }
}
