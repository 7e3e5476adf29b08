// tests/parser_tests.rs

mod common;

use common::{fixtures, minecraft_registry, parse_err, parse_ok};
use commodore::{
    parse_file, parse_reader, ArgumentTypeSpec, CommandNode, ErrorType, ParserConfig,
    ResolverRegistry, StringMode,
};

// ---
// Grammar
// ---

#[test]
fn test_literal_and_argument_disambiguation() {
    let tree = parse_ok("root { foo; bar bool; }");
    let foo = tree.child("foo").unwrap();
    assert!(foo.is_literal());
    let bar = tree.child("bar").unwrap();
    assert!(bar.is_argument());
    assert_eq!(bar.argument_type(), Some(&ArgumentTypeSpec::Bool));
}

#[test]
fn test_numeric_bound_defaulting() {
    let tree = parse_ok("root { a integer; b integer 0; c integer 0 10; }");
    assert_eq!(
        tree.child("a").unwrap().argument_type(),
        Some(&ArgumentTypeSpec::Integer {
            min: i32::MIN,
            max: i32::MAX
        })
    );
    assert_eq!(
        tree.child("b").unwrap().argument_type(),
        Some(&ArgumentTypeSpec::Integer {
            min: 0,
            max: i32::MAX
        })
    );
    assert_eq!(
        tree.child("c").unwrap().argument_type(),
        Some(&ArgumentTypeSpec::Integer { min: 0, max: 10 })
    );
}

#[test]
fn test_every_builtin_type() {
    let tree = parse_ok(
        "root {
            flag bool;
            word string single_word;
            phrase string quotable_phrase;
            rest string greedy_phrase;
            big long -5 5;
            ratio float 0.5;
            precise double min 1e10;
        }",
    );
    let types: Vec<ArgumentTypeSpec> = tree
        .children()
        .iter()
        .filter_map(|child| child.argument_type().cloned())
        .collect();
    assert_eq!(
        types,
        vec![
            ArgumentTypeSpec::Bool,
            ArgumentTypeSpec::String {
                mode: StringMode::SingleWord
            },
            ArgumentTypeSpec::String {
                mode: StringMode::QuotablePhrase
            },
            ArgumentTypeSpec::String {
                mode: StringMode::GreedyPhrase
            },
            ArgumentTypeSpec::Long { min: -5, max: 5 },
            ArgumentTypeSpec::Float {
                min: 0.5,
                max: f32::MAX
            },
            ArgumentTypeSpec::Double {
                min: f64::MIN,
                max: 1e10
            },
        ]
    );
}

#[test]
fn test_end_to_end_example() {
    let source = "root {\n    give player_name entity single;\n    help;\n}\n";
    let tree = parse_ok(source);

    assert_eq!(tree.name(), "root");
    assert!(tree.is_literal());
    assert_eq!(tree.children().len(), 2);

    let give = &tree.children()[0];
    assert_eq!(give.name(), "give");
    assert_eq!(
        give.argument_type(),
        Some(&ArgumentTypeSpec::Extension {
            namespace: "minecraft".into(),
            name: "player_name".into(),
            payload: vec!["entity".into(), "single".into()],
        })
    );

    let help = &tree.children()[1];
    assert_eq!(help.name(), "help");
    assert!(help.is_literal());
    assert!(help.children().is_empty());
}

#[test]
fn test_comments_and_quoted_names() {
    let tree = parse_ok(
        "// header\nroot { /* block */ \"two words\" bool; say// trailing\n; }",
    );
    assert!(tree.child("two words").is_some());
    assert!(tree.child("say").unwrap().is_literal());
}

// ---
// Errors and line numbers
// ---

#[test]
fn test_unclosed_scope_reports_eof_line() {
    // The input ends on line 3, inside the scope opened on line 1.
    let err = parse_err("root {\n    child;\n    other;");
    assert_eq!(err.error_type(), ErrorType::Parse);
    assert_eq!(err.line(), 3);
    assert!(err.message().contains("opened at line 1"));
    assert_eq!(err.ctx().related[0].label, "scope opened here");

    // A trailing newline puts the end of input on the next line.
    let err = parse_err("root {\n    child;\n    other;\n");
    assert_eq!(err.line(), 4);
}

#[test]
fn test_unclosed_scope_on_line_three() {
    let err = parse_err("root {\n    a;\n    b {");
    assert_eq!(err.line(), 3);
    assert!(err.message().contains("opened at line 3"));
}

#[test]
fn test_structural_errors() {
    let err = parse_err("root integer;");
    assert_eq!(err.error_type(), ErrorType::Parse);
    assert!(err.message().contains("must be a literal"));

    let err = parse_err("root;\nroot2;");
    assert_eq!(err.line(), 2);
    assert!(err.message().contains("expected end of input"));

    let err = parse_err("root {\n  a;\n  a bool;\n}");
    assert_eq!(err.line(), 3);
    assert!(err.message().contains("duplicate child node 'a'"));

    let err = parse_err("{ }");
    assert!(err.message().contains("found '{'"));
}

#[test]
fn test_type_errors() {
    let err = parse_err("root {\n\n  s string phrase;\n}");
    assert_eq!(err.error_type(), ErrorType::Type);
    assert_eq!(err.line(), 3);

    let err = parse_err("root { n integer 1.5; }");
    assert_eq!(err.error_type(), ErrorType::Type);
    assert!(err.message().contains("'1.5'"));

    let err = parse_err("root { n double 5 1; }");
    assert!(err.message().contains("greater than"));
}

#[test]
fn test_lex_errors() {
    let err = parse_err("root {\n  caf\u{e9};\n}");
    assert_eq!(err.error_type(), ErrorType::Lex);
    assert_eq!(err.line(), 2);

    let err = parse_reader(&[b'r', 0xff, b';'][..], &ResolverRegistry::new()).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Lex);
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_errors_render_with_source() {
    let err = parse_err("root {\n  a;\n  a;\n}");
    let rendered = format!("{:?}", miette::Report::new(err));
    assert!(rendered.contains("commodore::parse"));
    assert!(rendered.contains("first defined here"));
}

#[test]
fn test_end_of_input_error_keeps_its_label() {
    let source = "root {\n  child;";
    let err = parse_err(source);
    let labels: Vec<_> = miette::Diagnostic::labels(&err).unwrap().collect();
    let primary = labels
        .iter()
        .find(|label| label.label() == Some(err.message()))
        .expect("primary label");
    assert!(primary.offset() + primary.len() <= source.len());
    assert_eq!(&source[primary.offset()..primary.offset() + primary.len()], ";");
    assert!(labels.iter().any(|label| label.label() == Some("scope opened here")));
}

#[test]
fn test_custom_default_namespace() {
    let registry = minecraft_registry();
    let config = ParserConfig {
        default_namespace: "other".into(),
        ..ParserConfig::default()
    };
    let result = commodore::Parser::with_config("root { p block_pos; }".as_bytes(), &registry, config)
        .parse();
    let err = result.unwrap_err();
    assert!(err.message().contains("other:block_pos"));
}

// ---
// Files
// ---

#[test]
fn test_valid_fixtures_parse() {
    let files = fixtures("valid");
    assert!(!files.is_empty());
    for file in files {
        let tree: CommandNode = parse_file(&file, &minecraft_registry())
            .unwrap_or_else(|e| panic!("{} failed: {}", file.display(), e));
        assert!(tree.node_count() > 1, "{}", file.display());
    }
}

#[test]
fn test_invalid_fixtures_fail() {
    let files = fixtures("invalid");
    assert_eq!(files.len(), 4);
    for file in files {
        let err = parse_file(&file, &minecraft_registry()).unwrap_err();
        let source = err.ctx().source.as_ref().expect("source attached");
        assert_eq!(source.name(), file.display().to_string());
    }
}

#[test]
fn test_missing_file() {
    let err = parse_file("tests/fixtures/nope.commodore", &ResolverRegistry::new()).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Lex);
    assert!(err.message().contains("cannot open"));
}
