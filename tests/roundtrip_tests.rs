// tests/roundtrip_tests.rs

mod common;

use commodore::ast::alias::expand_aliases;
use commodore::ast::builder::NodeBuilder;
use commodore::types::NamespacedKey;
use commodore::{parse_str, ArgumentTypeSpec, CommandNode, StringMode};
use im::Vector;

fn reparse(tree: &CommandNode) -> CommandNode {
    let text = tree.to_source();
    parse_str(&text, &common::minecraft_registry())
        .unwrap_or_else(|e| panic!("canonical text failed to parse: {}\n{}", e, text))
}

#[test]
fn test_hand_built_tree_roundtrips() {
    let entity = NamespacedKey::new("minecraft", "entity").unwrap();
    let tree = NodeBuilder::literal("admin")
        .then(
            NodeBuilder::literal("ban")
                .then(
                    NodeBuilder::argument(
                        "target",
                        ArgumentTypeSpec::extension(&entity, vec!["player".into()]),
                    )
                    .then(NodeBuilder::argument(
                        "reason",
                        ArgumentTypeSpec::String {
                            mode: StringMode::GreedyPhrase,
                        },
                    )),
                )
                .then(NodeBuilder::argument(
                    "days",
                    ArgumentTypeSpec::Integer { min: 1, max: 365 },
                )),
        )
        .then(NodeBuilder::argument(
            "volume",
            ArgumentTypeSpec::Double {
                min: f64::MIN,
                max: 0.75,
            },
        ))
        .then(NodeBuilder::argument(
            "offset",
            ArgumentTypeSpec::Float {
                min: -2.5,
                max: f32::MAX,
            },
        ))
        .then(NodeBuilder::argument("seed", ArgumentTypeSpec::long()))
        .then(NodeBuilder::argument("flag", ArgumentTypeSpec::Bool))
        .then(NodeBuilder::literal("with space"))
        .then(NodeBuilder::literal("{braces}"))
        .build()
        .unwrap();

    assert_eq!(reparse(&tree), tree);
}

#[test]
fn test_extreme_bounds_roundtrip() {
    let tree = CommandNode::literal(
        "root",
        Vector::from(vec![
            CommandNode::argument(
                "a",
                ArgumentTypeSpec::Integer {
                    min: i32::MIN,
                    max: 0,
                },
                Vector::new(),
            ),
            CommandNode::argument(
                "b",
                ArgumentTypeSpec::Long {
                    min: i64::MIN,
                    max: i64::MIN,
                },
                Vector::new(),
            ),
            CommandNode::argument(
                "c",
                ArgumentTypeSpec::Float {
                    min: f32::MAX,
                    max: f32::MAX,
                },
                Vector::new(),
            ),
        ]),
    );
    assert_eq!(reparse(&tree), tree);
}

#[test]
fn test_formatting_is_idempotent() {
    let messy = "root{a integer 0 10;b{c string single_word;}  \"d e\";}";
    let tree = parse_str(messy, &common::minecraft_registry()).unwrap();
    let once = tree.to_source();
    let twice = reparse(&tree).to_source();
    assert_eq!(once, twice);
    assert_eq!(
        once,
        "root {\n    a integer 0 10;\n    b {\n        c string single_word;\n    }\n    \"d e\";\n}\n"
    );
}

#[test]
fn test_alias_copies_leave_original_intact() {
    let tree = common::parse_ok("give { target minecraft:entity players { count integer 1 64; } }");
    let copies = expand_aliases(&tree, "give", &["g", "give"], Some("Essentials"));
    let names: Vec<&str> = copies.iter().map(CommandNode::name).collect();
    assert_eq!(names, vec!["give", "essentials:give", "g", "essentials:g"]);
    for copy in copies.iter() {
        assert_eq!(copy.children(), tree.children());
        assert_eq!(reparse(copy).name(), copy.name());
    }
    assert_eq!(tree.name(), "give");
}
