use graft_ast::{DocFormat, DocLine, Module, NodeId, SharedText as _, parse_module, print};

fn sole_statement(module: &Module) -> NodeId {
    let root = module.root().unwrap();
    let children = module.children(root);
    assert_eq!(children.len(), 1);
    children[0]
}

fn code(module: &Module) -> String {
    print(module, module.root().unwrap()).code
}

#[test]
fn documenting_a_function() {
    let (mut module, _) = parse_module("f x = 123");
    let statement = sole_statement(&module);

    module.set_documentation(statement, "Some docs").unwrap();
    assert_eq!(code(&module), "## Some docs\nf x = 123");

    module.set_documentation(statement, "").unwrap();
    assert_eq!(code(&module), "f x = 123");
}

#[test]
fn clearing_parsed_documentation() {
    let (mut module, _) = parse_module("## Some docs\nf x = 123");
    let statement = sole_statement(&module);
    assert_eq!(module.documentation(statement), Some("Some docs"));

    module.set_documentation(statement, "").unwrap();
    assert_eq!(code(&module), "f x = 123");
}

#[test]
fn documenting_an_expression() {
    let (mut module, _) = parse_module("2 + 2");
    let statement = sole_statement(&module);

    module.set_documentation(statement, "Calculate five").unwrap();
    assert_eq!(code(&module), "## Calculate five\n2 + 2");
}

#[test]
fn unchanged_documentation_keeps_its_formatting() {
    let source = "##   Odd    spacing\n    and a wrapped\n      line.\nf x = x";
    let (mut module, _) = parse_module(source);
    let statement = sole_statement(&module);
    let text = module.documentation(statement).unwrap().to_owned();

    module.set_documentation(statement, "Changed").unwrap();
    assert_eq!(code(&module), "## Changed\nf x = x");

    module.set_documentation(statement, &text).unwrap();
    assert_eq!(code(&module), source);
}

#[test]
fn documentation_edits_through_shared_text() {
    let (mut module, _) = parse_module("## Sums.\nx = a + b");
    let statement = sole_statement(&module);

    module.edit_documentation(statement, |text| text.insert(0, "Adds and ")).unwrap();
    assert_eq!(module.documentation(statement), Some("Adds and Sums."));
    module
        .edit_documentation(statement, |text| {
            let len = text.len();
            text.delete(len - 1, 1);
        })
        .unwrap();
    assert_eq!(code(&module), "## Adds and Sums\nx = a + b");
}

#[test]
fn markdown_round_trips_through_tokens() {
    let samples = [
        "One line.",
        "First paragraph.\nSecond paragraph.",
        "One.\n\nTwo.",
        "ICON data_input\nReads a file.\n# Arguments\n- `path`: where to read from\n- `format`: how",
        "Example:\n```\nx = f 1\n\ny = x\n```\nDone.",
        "> A quote\n| a | b |\n|---|---|",
    ];
    for markdown in samples {
        for indent in ["   ", "       "] {
            let doc_line = DocLine::from_text(markdown, DocFormat::Markdown, indent);
            assert_eq!(doc_line.to_text(DocFormat::Markdown), markdown, "{markdown:?}");
        }
    }
}

#[test]
fn plain_text_round_trips_through_tokens() {
    for text in ["Calculate five", "two\nlines", "blank\n\nline", ""] {
        let doc_line = DocLine::from_text(text, DocFormat::Plain, "");
        assert_eq!(doc_line.to_text(DocFormat::Plain), text, "{text:?}");
    }
}

#[test]
fn rendered_markdown_parses_back() {
    let (mut module, _) = parse_module("main =\n    f x = x");
    let root = module.root().unwrap();
    let function = module
        .descendants(root)
        .into_iter()
        .find(|&id| module.kind(id) == graft_ast::NodeKind::FunctionDef)
        .unwrap();

    let markdown = "Identity.\nReturns its argument.";
    module.set_documentation(function, markdown).unwrap();
    let printed = code(&module);
    assert_eq!(printed, "main =\n    ## Identity.\n\n       Returns its argument.\n    f x = x");

    let (reparsed, _) = parse_module(&printed);
    let reparsed_function = reparsed
        .descendants(reparsed.root().unwrap())
        .into_iter()
        .find(|&id| reparsed.kind(id) == graft_ast::NodeKind::FunctionDef)
        .unwrap();
    assert_eq!(reparsed.documentation(reparsed_function), Some(markdown));
}
