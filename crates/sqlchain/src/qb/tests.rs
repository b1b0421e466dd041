//! Cross-builder tests for the qb module.

use crate::placeholder::PlaceholderFormat;
use crate::qb::{
    Expr, Fragment, Param, SetValue, SqlQb, Statement, delete, insert, select, update, with,
};
use std::collections::HashMap;

fn args(params: &[Param]) -> Vec<String> {
    params.iter().map(|p| format!("{:?}", p)).collect()
}

#[test]
fn test_update_assignment_groups_and_arg_count() {
    let sub = select(["avg(score)"])
        .from("scores")
        .eq("team", "red")
        .eq("season", 2024i32);
    let qb = update("teams")
        .set("a", 1i32)
        .set_expr("b", Expr::new("b + ?").bind(2i32))
        .set_expr("c", sub)
        .set("d", 4i32);

    let built = qb.to_sql().unwrap();
    assert_eq!(
        built.sql,
        "UPDATE teams SET a = ?, b = b + ?, c = (SELECT avg(score) FROM scores WHERE team = ? AND season = ?), d = ?"
    );
    // Plain values count once each; fragments contribute their own args.
    assert_eq!(
        args(&built.params),
        vec!["Param(1)", "Param(2)", "Param(\"red\")", "Param(2024)", "Param(4)"]
    );
}

#[test]
fn test_rendering_is_idempotent() {
    let qbs: Vec<Statement> = vec![
        select(["id"]).from("t").eq("a", 1i32).into(),
        insert("t").values([SetValue::value(1i32)]).into(),
        update("t").set("a", 1i32).into(),
        delete("t").eq("a", 1i32).into(),
    ];
    for qb in qbs {
        let qb = qb.with_placeholder_format(PlaceholderFormat::Dollar);
        let first = qb.to_sql().unwrap();
        let second = qb.to_sql().unwrap();
        assert_eq!(first.sql, second.sql);
        assert_eq!(args(&first.params), args(&second.params));
    }
}

#[test]
fn test_deriving_leaves_parent_unchanged() {
    let b1 = update("users").set("a", 1i32).eq("id", 9i32);
    let before = b1.to_sql().unwrap();

    let _b2 = b1.set("b", 2i32);
    let _b3 = b1.where_("deleted_at IS NULL").limit(1);

    let after = b1.to_sql().unwrap();
    assert_eq!(before.sql, after.sql);
    assert_eq!(args(&before.params), args(&after.params));
}

#[test]
fn test_sibling_derivations_do_not_share_sequences() {
    let base = select(["id"]).from("t").eq("a", 1i32);
    let left = base.eq("b", 2i32);
    let right = base.eq("c", 3i32);

    assert_eq!(left.to_sql().unwrap().sql, "SELECT id FROM t WHERE a = ? AND b = ?");
    assert_eq!(right.to_sql().unwrap().sql, "SELECT id FROM t WHERE a = ? AND c = ?");
}

#[test]
fn test_set_map_order_is_deterministic() {
    for _ in 0..8 {
        let mut m: HashMap<String, Param> = HashMap::new();
        m.insert("b".into(), Param::new(2i32));
        m.insert("a".into(), Param::new(1i32));
        let built = update("t").set_map(m).to_sql().unwrap();
        assert_eq!(built.sql, "UPDATE t SET a = ?, b = ?");
        assert_eq!(args(&built.params), vec!["Param(1)", "Param(2)"]);
    }
}

#[test]
fn test_escaped_marker_with_dollar() {
    let built = select(["*"])
        .from("t")
        .where_expr(Expr::new("x = ? AND y = ??").bind(5i32))
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(built.sql, "SELECT * FROM t WHERE x = $1 AND y = ?");
    assert_eq!(args(&built.params), vec!["Param(5)"]);
}

#[test]
fn test_escaped_marker_question_is_verbatim() {
    let built = select(["*"])
        .from("t")
        .where_expr(Expr::new("doc ?? 'key' AND id = ?").bind(1i32))
        .to_sql()
        .unwrap();
    assert_eq!(built.sql, "SELECT * FROM t WHERE doc ?? 'key' AND id = ?");
}

#[test]
fn test_recursive_cte_round_trip() {
    let built = with()
        .recursive(true)
        .cte("t")
        .as_(select(["n"]).from("seed"))
        .select(select(["n"]).from("t").lt("n", 10i32))
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "WITH RECURSIVE t AS (SELECT n FROM seed) SELECT n FROM t WHERE n < $1"
    );
    assert_eq!(args(&built.params), vec!["Param(10)"]);
}

#[test]
fn test_update_without_set_fails_cleanly() {
    let result = update("users").eq("id", 1i32).to_sql();
    let err = result.unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_select_as_set_value_splices_args() {
    let sub = select(["max(v)"]).from("s").eq("k", "x");
    let built = update("t")
        .set("before", 1i32)
        .set_value("m", sub)
        .set("after", 2i32)
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "UPDATE t SET before = $1, m = (SELECT max(v) FROM s WHERE k = $2), after = $3"
    );
    assert_eq!(
        args(&built.params),
        vec!["Param(1)", "Param(\"x\")", "Param(2)"]
    );
}

#[test]
fn test_deeply_nested_numbering() {
    let innermost = select(["id"])
        .from("c")
        .eq("z", 3i32)
        .placeholder_format(PlaceholderFormat::Dollar);
    let middle = select(["id"])
        .from_select(innermost, "ci")
        .eq("y", 2i32)
        .placeholder_format(PlaceholderFormat::Colon);
    let built = select(["*"])
        .from_select(middle, "mi")
        .eq("x", 1i32)
        .placeholder_format(PlaceholderFormat::AtP)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT * FROM (SELECT id FROM (SELECT id FROM c WHERE z = @p1) AS ci WHERE y = @p2) AS mi \
         WHERE x = @p3"
    );
    assert_eq!(args(&built.params), vec!["Param(3)", "Param(2)", "Param(1)"]);
}

#[test]
fn test_groups_compose_across_builders() {
    let pred = Fragment::or([
        Fragment::from(Expr::eq("owner_id", 5i64)),
        Fragment::and([Expr::eq("public", true), Expr::is_null("deleted_at")]),
    ]);
    let sel = select(["id"]).from("docs").where_expr(pred.clone());
    let del = delete("docs").where_expr(pred);

    assert_eq!(
        sel.to_sql().unwrap().sql,
        "SELECT id FROM docs WHERE (owner_id = ? OR (public = ? AND deleted_at IS NULL))"
    );
    assert_eq!(
        del.to_sql().unwrap().sql,
        "DELETE FROM docs WHERE (owner_id = ? OR (public = ? AND deleted_at IS NULL))"
    );
}

#[test]
fn test_builders_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<crate::qb::SelectBuilder>();
    assert_send_sync::<crate::qb::InsertBuilder>();
    assert_send_sync::<crate::qb::UpdateBuilder>();
    assert_send_sync::<crate::qb::DeleteBuilder>();
    assert_send_sync::<crate::qb::CteBuilder>();
}

#[test]
fn test_driver_types_bind_as_params() {
    let id = uuid::Uuid::new_v4();
    let since = chrono::Utc::now();
    let built = select(["id"])
        .from("sessions")
        .eq("user_id", id)
        .gte("created_at", since)
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(built.sql, "SELECT id FROM sessions WHERE user_id = $1 AND created_at >= $2");
    assert_eq!(built.params.len(), 2);
    assert_eq!(args(&built.params)[0], format!("Param({:?})", id));
}

#[test]
fn test_empty_fragment_drops_its_args() {
    let built = select(["id"])
        .from("t")
        .where_expr(Expr::new("").bind(1i32))
        .eq("a", 2i32)
        .placeholder_format(PlaceholderFormat::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(built.sql, "SELECT id FROM t WHERE a = $1");
    assert_eq!(args(&built.params), vec!["Param(2)"]);
}

#[test]
fn test_clauses_of_only_empty_fragments_are_omitted() {
    let blank = || Expr::new("").bind(0i32);

    let sel = select(["id"])
        .prefix_expr(blank())
        .from("t")
        .where_expr(blank())
        .suffix_expr(blank())
        .to_sql()
        .unwrap();
    assert_eq!(sel.sql, "SELECT id FROM t");
    assert!(sel.params.is_empty());

    let upd = update("t")
        .prefix_expr(blank())
        .set("a", 1i32)
        .where_expr(blank())
        .to_sql()
        .unwrap();
    assert_eq!(upd.sql, "UPDATE t SET a = ?");
    assert_eq!(args(&upd.params), vec!["Param(1)"]);

    let ins = insert("t")
        .prefix_expr(blank())
        .values([SetValue::value(1i32)])
        .suffix_expr(blank())
        .to_sql()
        .unwrap();
    assert_eq!(ins.sql, "INSERT INTO t VALUES (?)");

    let del = delete("t").prefix_expr(blank()).where_expr(blank()).to_sql().unwrap();
    assert_eq!(del.sql, "DELETE FROM t");
    assert!(del.params.is_empty());
}
