use relmodel_core::{AssignError, Error, FromValue, Record, Row, ToValue, Value};
use relmodel_macros::Record;

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Author {
    id: i64,
    name: String,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Post {
    #[record(readonly)]
    id: i64,
    author_id: Option<i64>,
    #[record(rename = "headline")]
    title: String,
    #[record(relation)]
    author: Option<Author>,
    #[record(skip)]
    draft: bool,
}

#[derive(Debug, Default, Record)]
struct Empty {}

#[test]
fn reads_accept_both_casings() {
    let post = Post {
        id: 1,
        author_id: Some(5),
        title: "Hi".to_string(),
        ..Post::default()
    };
    assert_eq!(post.get_field("author_id"), Some(Value::BigInt(5)));
    assert_eq!(post.get_field("AuthorID"), Some(Value::BigInt(5)));
    assert_eq!(post.get_field("ID"), Some(Value::BigInt(1)));
    assert_eq!(post.get_field("headline"), Some(Value::from("Hi")));
    assert_eq!(post.get_field("author"), Some(Value::Null));
    assert_eq!(post.get_field("draft"), None);
    assert!(!post.draft);
}

#[test]
fn writes_match_exact_names() {
    let mut post = Post::default();
    let author = Author {
        id: 5,
        name: "Ada".to_string(),
    };

    post.set_field("author", author.to_value()).unwrap();
    assert_eq!(post.author, Some(author));

    post.set_field("author", Value::Null).unwrap();
    assert_eq!(post.author, None);

    assert_eq!(
        post.set_field("Author", Value::Null),
        Err(AssignError::UnknownField("Author".to_string()))
    );
    assert_eq!(
        post.set_field("id", Value::BigInt(2)),
        Err(AssignError::NotSettable("id".to_string()))
    );
    assert!(matches!(
        post.set_field("headline", Value::BigInt(2)),
        Err(AssignError::TypeMismatch { actual: "BIGINT", .. })
    ));
}

#[test]
fn rows_round_through_the_struct() {
    let row = Row::from_pairs([
        ("id", Value::BigInt(3)),
        ("headline", Value::from("Hello")),
    ]);
    let post = Post::from_row(&row).unwrap();
    assert_eq!(post.id, 3);
    assert_eq!(post.author_id, None);
    assert_eq!(post.title, "Hello");

    let rendered = post.to_row();
    assert_eq!(rendered.get_by_name("headline"), Some(&Value::from("Hello")));
    assert_eq!(rendered.get_by_name("author_id"), Some(&Value::Null));
    assert!(!rendered.contains_column("draft"));
}

#[test]
fn missing_required_column_names_the_column() {
    let row = Row::from_pairs([("id", Value::BigInt(3))]);
    match Post::from_row(&row) {
        Err(Error::Type(err)) => assert_eq!(err.column.as_deref(), Some("headline")),
        other => panic!("expected type error, got {:?}", other),
    }

    let row = Row::from_pairs([("id", Value::from("x")), ("headline", Value::from("t"))]);
    match Post::from_row(&row) {
        Err(Error::Type(err)) => assert_eq!(err.column.as_deref(), Some("id")),
        other => panic!("expected type error, got {:?}", other),
    }
}

#[test]
fn related_struct_from_record_value() {
    let value = Value::Record(Box::new(Row::from_pairs([
        ("id", Value::BigInt(5)),
        ("name", Value::from("Ada")),
    ])));
    let author = Author::from_value(&value).unwrap();
    assert_eq!(author.name, "Ada");
    assert!(Author::from_value(&Value::BigInt(5)).is_err());
}

#[test]
fn struct_without_fields() {
    let mut empty = Empty::default();
    assert_eq!(empty.get_field("id"), None);
    assert!(empty.set_field("id", Value::Null).is_err());
}
