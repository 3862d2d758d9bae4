use rankset::{
    intersect, union, AddFlags, Aggregate, Encoding, Keyspace, OpSource, PlainSet, SortedSet,
    Weighted, ZSetConfig,
};

fn zset(items: &[(f64, &str)]) -> SortedSet {
    let mut set = SortedSet::default();
    for (score, member) in items {
        set.add(*score, member, AddFlags::default()).unwrap();
    }
    set
}

fn contents(set: &SortedSet) -> Vec<(String, f64)> {
    set.iter().map(|(m, s)| (m.to_owned(), s)).collect()
}

#[test]
fn union_and_intersection_end_to_end() {
    let a = zset(&[(1.0, "a"), (2.0, "b")]);
    let b = zset(&[(3.0, "b"), (4.0, "c")]);
    let sources = [
        Weighted::new(OpSource::Sorted(&a)),
        Weighted::new(OpSource::Sorted(&b)),
    ];

    let sum = union(&sources, Aggregate::Sum, ZSetConfig::default());
    assert_eq!(
        contents(&sum),
        vec![
            ("a".to_owned(), 1.0),
            ("c".to_owned(), 4.0),
            ("b".to_owned(), 5.0)
        ]
    );

    let max = union(&sources, Aggregate::Max, ZSetConfig::default());
    assert_eq!(
        contents(&max),
        vec![
            ("a".to_owned(), 1.0),
            ("b".to_owned(), 3.0),
            ("c".to_owned(), 4.0)
        ]
    );

    let inter_sum = intersect(&sources, Aggregate::Sum, ZSetConfig::default());
    assert_eq!(contents(&inter_sum), vec![("b".to_owned(), 5.0)]);

    let inter_max = intersect(&sources, Aggregate::Max, ZSetConfig::default());
    assert_eq!(contents(&inter_max), vec![("b".to_owned(), 3.0)]);
}

#[test]
fn plain_sets_join_sorted_sets() {
    let board = zset(&[(10.0, "alice"), (20.0, "bob"), (30.0, "carol")]);
    let online = PlainSet::from_members(vec!["bob".to_owned(), "carol".to_owned()]);
    let sources = [
        Weighted::new(OpSource::Sorted(&board)),
        Weighted::new(OpSource::Plain(&online)),
    ];
    let result = intersect(&sources, Aggregate::Max, ZSetConfig::default());
    assert_eq!(
        contents(&result),
        vec![("bob".to_owned(), 20.0), ("carol".to_owned(), 30.0)]
    );
}

#[test]
fn integer_sets_render_members_decimally() {
    let ids = PlainSet::from_ints(vec![10, 2, 33]);
    let sources = [Weighted::new(OpSource::Plain(&ids))];
    let result = union(&sources, Aggregate::Sum, ZSetConfig::default());
    let members: Vec<_> = result.iter().map(|(m, _)| m.to_owned()).collect();
    // all score 1.0, so ordering falls back to member bytes
    assert_eq!(members, ["10", "2", "33"]);
}

#[test]
fn large_results_stay_in_the_skiplist_encoding() {
    let mut big = SortedSet::default();
    for i in 0..300 {
        big.add(f64::from(i), &format!("member-{i:03}"), AddFlags::default())
            .unwrap();
    }
    let sources = [Weighted::new(OpSource::Sorted(&big))];
    let result = union(&sources, Aggregate::Sum, ZSetConfig::default());
    assert_eq!(result.len(), 300);
    assert_eq!(result.encoding(), Encoding::Skip);

    let small = zset(&[(1.0, "a")]);
    let sources = [Weighted::new(OpSource::Sorted(&small))];
    let result = union(&sources, Aggregate::Sum, ZSetConfig::default());
    assert_eq!(result.encoding(), Encoding::Packed);
}

#[test]
fn keyspace_store_replaces_and_removes_destinations() {
    let mut ks = Keyspace::new();
    ks.with_write("a", |s| {
        s.add(1.0, "x", AddFlags::default()).unwrap();
        s.add(2.0, "y", AddFlags::default()).unwrap();
    });
    ks.with_write("b", |s| {
        s.add(5.0, "y", AddFlags::default()).unwrap();
        s.add(6.0, "z", AddFlags::default()).unwrap();
    });

    let n = ks.union_store("dest", &["a", "b"], None, Aggregate::Sum);
    assert_eq!(n, 3);
    assert_eq!(ks.with_read("dest", |s| s.score("y")), Some(7.0));

    // an empty intersection removes the destination entirely
    let n = ks.inter_store("dest", &["a", "missing"], None, Aggregate::Sum);
    assert_eq!(n, 0);
    assert!(!ks.contains_key("dest"));
}

#[test]
fn weights_default_to_one_and_scale_when_given() {
    let mut ks = Keyspace::new();
    ks.with_write("a", |s| {
        s.add(2.0, "m", AddFlags::default()).unwrap();
    });
    ks.with_write("b", |s| {
        s.add(3.0, "m", AddFlags::default()).unwrap();
    });
    let n = ks.union_store("plain", &["a", "b"], None, Aggregate::Sum);
    assert_eq!(n, 1);
    assert_eq!(ks.with_read("plain", |s| s.score("m")), Some(5.0));

    let n = ks.union_store("scaled", &["a", "b"], Some(&[10.0, 0.5]), Aggregate::Sum);
    assert_eq!(n, 1);
    assert_eq!(ks.with_read("scaled", |s| s.score("m")), Some(21.5));
}
