use super::*;

#[test]
fn test_quote_ident_simple() {
    assert_eq!(quote_ident("schema_migrations"), r#""schema_migrations""#);
}

#[test]
fn test_quote_ident_with_embedded_quotes() {
    assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
}

#[test]
fn test_quote_ident_with_dots() {
    // Dots are NOT special inside quote_ident; they are plain characters
    assert_eq!(quote_ident("schema.table"), r#""schema.table""#);
}

#[test]
fn test_quote_ident_keeps_spaces() {
    assert_eq!(quote_ident("lock table"), r#""lock table""#);
}
