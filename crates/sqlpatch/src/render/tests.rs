use super::*;
use crate::dialect::{POSTGRES, QUESTION_MARK};
use crate::fields::Field;
use crate::params;

fn fields() -> Fields {
    [
        Field::new("name", Param::new("golang"), 1),
        Field::new("email", Param::new("f@oo.bar"), 2),
        Field::new("power", Param::new(100_i32), 3),
    ]
    .into_iter()
    .collect()
}

fn postgres() -> SetClause {
    fields().set_clause(Arc::new(POSTGRES))
}

fn question_mark() -> SetClause {
    fields().set_clause(Arc::new(QUESTION_MARK))
}

fn debug(args: &[Param]) -> String {
    format!("{args:?}")
}

#[test]
fn test_numbered_offsets() {
    struct Case {
        prepend: Vec<Param>,
        append: Vec<Param>,
        sql: &'static str,
        args: &'static str,
    }

    let cases = [
        Case {
            prepend: params![],
            append: params![123_i32],
            sql: "name=$2,email=$3,power=$4",
            args: r#"[123, "golang", "f@oo.bar", 100]"#,
        },
        Case {
            prepend: params![],
            append: params![100_i32, "user_type"],
            sql: "name=$3,email=$4,power=$5",
            args: r#"[100, "user_type", "golang", "f@oo.bar", 100]"#,
        },
        Case {
            prepend: params![],
            append: params![],
            sql: "name=$1,email=$2,power=$3",
            args: r#"["golang", "f@oo.bar", 100]"#,
        },
        Case {
            prepend: params!["foo", "bar"],
            append: params![2000_i32],
            sql: "name=$4,email=$5,power=$6",
            args: r#"["foo", "bar", 2000, "golang", "f@oo.bar", 100]"#,
        },
    ];

    for (i, case) in cases.into_iter().enumerate() {
        let mut clause = postgres();
        clause.prepend(case.prepend);
        let (sql, args) = clause.render(case.append);
        assert_eq!(sql, case.sql, "case {i}");
        assert_eq!(debug(&args), case.args, "case {i}");
    }
}

#[test]
fn test_positional_order() {
    let cases = [
        (params![], params![123_i32], r#"["golang", "f@oo.bar", 100, 123]"#),
        (
            params![],
            params![100_i32, "user_type"],
            r#"["golang", "f@oo.bar", 100, 100, "user_type"]"#,
        ),
        (params![], params![], r#"["golang", "f@oo.bar", 100]"#),
        (
            params!["foo", "bar"],
            params![2000_i32],
            r#"["foo", "bar", "golang", "f@oo.bar", 100, 2000]"#,
        ),
    ];

    for (i, (prepend, append, expected)) in cases.into_iter().enumerate() {
        let mut clause = question_mark();
        clause.prepend(prepend);
        let (sql, args) = clause.render(append);
        assert_eq!(sql, "name=?,email=?,power=?", "case {i}");
        assert_eq!(debug(&args), expected, "case {i}");
    }
}

#[test]
fn test_arguments_accumulate() {
    let mut clause = postgres();
    clause.prepend(params!["a"]).prepend(params!["b"]);
    let (sql, args) = clause.render(params![]);
    assert_eq!(sql, "name=$3,email=$4,power=$5");
    assert_eq!(debug(&args), r#"["a", "b", "golang", "f@oo.bar", 100]"#);

    // a second render keeps earlier appends
    clause.render(params![1_i32]);
    let (sql, args) = clause.render(params![2_i32]);
    assert_eq!(sql, "name=$5,email=$6,power=$7");
    assert_eq!(debug(&args), r#"["a", "b", 1, 2, "golang", "f@oo.bar", 100]"#);
}

#[test]
fn test_render_reflects_field_mutation() {
    let mut clause = question_mark();
    clause.fields_mut().remove("email");
    clause.fields_mut().set("updated_by", 7_i64);
    let (sql, args) = clause.render(params![]);
    assert_eq!(sql, "name=?,power=?,updated_by=?");
    assert_eq!(debug(&args), r#"["golang", 100, 7]"#);
}

#[test]
fn test_columns_and_binds() {
    let mut clause = postgres();
    clause.prepend(params![9_i32]);
    assert_eq!(
        clause.columns(),
        ColumnBinds {
            columns: "name,email,power".to_string(),
            binds: "$2,$3,$4".to_string(),
        }
    );
    assert_eq!(debug(&clause.args()), r#"[9, "golang", "f@oo.bar", 100]"#);
}

#[test]
fn test_empty_fields_render_empty_fragment() {
    let mut clause = Fields::new().set_clause(Arc::new(POSTGRES));
    let (sql, args) = clause.render(params![1_i32]);
    assert_eq!(sql, "");
    assert_eq!(debug(&args), "[1]");
}

#[derive(Debug)]
struct OnlyOne;

impl Dialect for OnlyOne {
    fn placeholders(&self, _offset: usize, _count: usize) -> Vec<String> {
        vec!["?".to_string()]
    }

    fn merge_args(&self, pre: &[Param], fields: &[Param], post: &[Param]) -> Vec<Param> {
        QUESTION_MARK.merge_args(pre, fields, post)
    }
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "OnlyOne returned the wrong number of placeholders")]
fn test_short_placeholder_list_is_caught() {
    let mut clause = fields().set_clause(Arc::new(OnlyOne));
    clause.render(params![]);
}
