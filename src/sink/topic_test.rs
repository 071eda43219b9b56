use super::topic::TopicExpression;
use super::topic::TopicGenerator;
use crate::Error;
use crate::SinkError;

fn expect_invalid(rule: &str) {
    match TopicExpression::parse(rule) {
        Err(Error::Sink(SinkError::InvalidTopicExpression(_))) => {}
        other => panic!("rule {:?} should be invalid, got {:?}", rule, other),
    }
}

#[test]
fn test_empty_rule_falls_back_to_default_topic() {
    let generator = TopicGenerator::from_rule("", "cdc-events").unwrap();
    assert_eq!(TopicGenerator::Static("cdc-events".to_string()), generator);
    assert_eq!("cdc-events", generator.substitute("shop", "orders"));
}

#[test]
fn test_hard_coded_rule_falls_back_to_default_topic() {
    let generator = TopicGenerator::from_rule("fixed-topic.v1", "cdc-events").unwrap();
    assert_eq!(TopicGenerator::Static("cdc-events".to_string()), generator);
}

#[test]
fn test_schema_table_expression() {
    let generator = TopicGenerator::from_rule("{schema}_{table}", "unused").unwrap();
    assert_eq!("shop_orders", generator.substitute("shop", "orders"));
    assert_eq!("shop_users", generator.substitute("shop", "users"));
}

#[test]
fn test_schema_only_expression_ignores_table() {
    let generator = TopicGenerator::from_rule("cdc_{schema}", "unused").unwrap();
    assert_eq!("cdc_shop", generator.substitute("shop", "orders"));
}

#[test]
fn test_expression_with_prefix_and_suffix() {
    let expression = TopicExpression::parse("prod.{schema}.{table}.v2").unwrap();
    assert_eq!("prod.shop.orders.v2", expression.substitute("shop", "orders"));
}

#[test]
fn test_missing_schema_placeholder_is_invalid() {
    expect_invalid("{table}_only");
    expect_invalid("events_{tab}");
}

#[test]
fn test_table_before_schema_is_invalid() {
    expect_invalid("{table}_{schema}");
}

#[test]
fn test_duplicate_placeholders_are_invalid() {
    expect_invalid("{schema}{schema}");
    expect_invalid("{schema}_{table}_{table}");
}

#[test]
fn test_illegal_literal_characters_are_invalid() {
    expect_invalid("my topic_{schema}");
    expect_invalid("{schema}/{table}");
}

#[test]
fn test_substitution_sanitizes_names() {
    let expression = TopicExpression::parse("{schema}_{table}").unwrap();
    assert_eq!(
        "my_schema__or_ders",
        expression.substitute("my schema!", "or:ders")
    );
}

#[test]
fn test_substitution_caps_topic_length() {
    let expression = TopicExpression::parse("{schema}_{table}").unwrap();
    let long_schema = "s".repeat(300);
    let topic = expression.substitute(&long_schema, "orders");
    assert_eq!(249, topic.len());
}

#[test]
fn test_display_round_trips_the_rule() {
    let generator = TopicGenerator::from_rule("{schema}_{table}", "unused").unwrap();
    assert_eq!("{schema}_{table}", generator.to_string());

    let fixed = TopicGenerator::from_rule("", "cdc-events").unwrap();
    assert_eq!("cdc-events", fixed.to_string());
}
