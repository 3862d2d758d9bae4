use rankset::{
    AddFlags, Encoding, Keyspace, LexRange, ScoreRange, SortedSet, ZSetConfig, ZSetError,
};

fn add_all(set: &mut SortedSet, items: &[(f64, &str)]) {
    for (score, member) in items {
        set.add(*score, member, AddFlags::default()).unwrap();
    }
}

fn names(items: &[(String, f64)]) -> Vec<&str> {
    items.iter().map(|(m, _)| m.as_str()).collect()
}

#[test]
fn lifecycle_across_the_conversion_boundary() {
    let config = ZSetConfig::new(8, 16);
    let mut set = SortedSet::new(config);

    for i in 0..8 {
        set.add(f64::from(i), &format!("player-{i}"), AddFlags::default())
            .unwrap();
    }
    assert_eq!(set.encoding(), Encoding::Packed);
    assert_eq!(set.len(), 8);

    // the ninth element crosses the cardinality threshold
    set.add(8.0, "player-8", AddFlags::default()).unwrap();
    assert_eq!(set.encoding(), Encoding::Skip);
    assert_eq!(set.len(), 9);

    // everything still answers identically after the conversion
    assert_eq!(set.score("player-3"), Some(3.0));
    assert_eq!(set.rank("player-0", false), Some(0));
    assert_eq!(set.rank("player-0", true), Some(8));
    let out = set.range_by_rank(0, 2, false);
    assert_eq!(names(&out), ["player-0", "player-1", "player-2"]);

    for i in 0..9 {
        assert!(set.remove(&format!("player-{i}")));
    }
    assert!(set.is_empty());
}

#[test]
fn long_members_force_the_skiplist_encoding() {
    let config = ZSetConfig::new(128, 10);
    let mut set = SortedSet::new(config);
    set.add(1.0, "short", AddFlags::default()).unwrap();
    assert_eq!(set.encoding(), Encoding::Packed);
    set.add(2.0, "member-name-well-past-ten-bytes", AddFlags::default())
        .unwrap();
    assert_eq!(set.encoding(), Encoding::Skip);
    assert_eq!(set.len(), 2);
}

#[test]
fn score_ranges_parse_and_query() {
    let mut set = SortedSet::default();
    add_all(
        &mut set,
        &[(3.0, "a"), (5.0, "b"), (7.0, "c"), (10.0, "d"), (12.0, "e")],
    );

    let range = ScoreRange::parse("5", "10").unwrap();
    let out = set.range_by_score(&range, false, 0, None);
    assert_eq!(names(&out), ["b", "c", "d"]);
    assert_eq!(set.count_by_score(&range), 3);

    let range = ScoreRange::parse("(5", "10").unwrap();
    let out = set.range_by_score(&range, false, 0, None);
    assert_eq!(names(&out), ["c", "d"]);

    let range = ScoreRange::parse("-inf", "+inf").unwrap();
    let out = set.range_by_score(&range, true, 1, Some(2));
    assert_eq!(names(&out), ["d", "c"]);
}

#[test]
fn lex_ranges_over_uniform_scores() {
    let mut set = SortedSet::default();
    add_all(
        &mut set,
        &[(0.0, "apple"), (0.0, "banana"), (0.0, "cherry"), (0.0, "date")],
    );

    let range = LexRange::parse("[banana", "(date").unwrap();
    let out = set.range_by_lex(&range, false, 0, None);
    assert_eq!(names(&out), ["banana", "cherry"]);
    assert_eq!(set.count_by_lex(&range), 2);

    let range = LexRange::parse("-", "+").unwrap();
    assert_eq!(set.count_by_lex(&range), 4);
    let out = set.range_by_lex(&range, true, 0, Some(2));
    assert_eq!(names(&out), ["date", "cherry"]);

    assert_eq!(set.remove_range_by_lex(&LexRange::parse("-", "(cherry").unwrap()), 2);
    assert_eq!(set.len(), 2);
}

#[test]
fn nan_never_mutates() {
    let mut set = SortedSet::default();
    add_all(&mut set, &[(1.0, "a")]);
    assert_eq!(
        set.add(f64::NAN, "x", AddFlags::default()),
        Err(ZSetError::NanScore)
    );
    assert_eq!(set.len(), 1);

    set.add(f64::INFINITY, "inf", AddFlags::default()).unwrap();
    assert_eq!(set.incr_by(f64::NEG_INFINITY, "inf"), Err(ZSetError::NanScore));
    assert_eq!(set.score("inf"), Some(f64::INFINITY));
}

#[test]
fn removals_by_score_and_rank() {
    for config in [ZSetConfig::default(), ZSetConfig::always_expanded()] {
        let mut set = SortedSet::new(config);
        add_all(
            &mut set,
            &[(1.0, "a"), (2.0, "b"), (3.0, "c"), (4.0, "d"), (5.0, "e")],
        );
        assert_eq!(
            set.remove_range_by_score(&ScoreRange::new(2.0, 4.0, false, true)),
            2
        );
        let out = set.range_by_rank(0, -1, false);
        assert_eq!(names(&out), ["a", "d", "e"]);

        assert_eq!(set.remove_range_by_rank(-2, -1), 2);
        let out = set.range_by_rank(0, -1, false);
        assert_eq!(names(&out), ["a"]);
    }
}

#[test]
fn keyspace_drops_empty_keys() {
    let mut ks = Keyspace::new();
    ks.with_write("board", |s| {
        s.add(10.0, "alice", AddFlags::default()).unwrap();
        s.add(20.0, "bob", AddFlags::default()).unwrap();
    });
    assert!(ks.contains_key("board"));

    let removed = ks.with_write("board", |s| {
        s.remove_range_by_rank(0, -1)
    });
    assert_eq!(removed, 2);
    assert!(!ks.contains_key("board"));
}

#[test]
fn update_heavy_workload_keeps_ranks_exact() {
    let mut set = SortedSet::new(ZSetConfig::always_expanded());
    for i in 0..500u32 {
        set.add(f64::from(i % 50), &format!("m{i:03}"), AddFlags::default())
            .unwrap();
    }
    // move every member, many across long distances
    for i in 0..500u32 {
        set.add(f64::from((i * 31) % 97), &format!("m{i:03}"), AddFlags::default())
            .unwrap();
    }
    let all = set.range_by_rank(0, -1, false);
    assert_eq!(all.len(), 500);
    for window in all.windows(2) {
        let (ref m1, s1) = window[0];
        let (ref m2, s2) = window[1];
        assert!(s1 < s2 || (s1 == s2 && m1 < m2), "{m1}:{s1} vs {m2}:{s2}");
    }
    for (i, (m, _)) in all.iter().enumerate() {
        assert_eq!(set.rank(m, false), Some(i));
        assert_eq!(set.rank(m, true), Some(499 - i));
    }
}
