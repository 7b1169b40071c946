use graft_ast::{
    App, Assignment, BodyBlock, ExpressionStatement, FunctionDef, Group, Ident, Module,
    NegationApp, NumericLiteral, OprApp, PropertyAccess, TextLiteral, Vector, parse_module, print,
};

const SOURCES: &[&str] = &[
    "",
    "main = 42",
    "x = 1\n\n\ny = x  +  2\n",
    "main =\n    data = read 'input.csv'\n    data.filter (x -> x.value > 10)\n",
    "f a b =\n    c = a * (b - 1)\n    [a, b, c]\n",
    "## Adds one.\n   Works on numbers.\ninc x = x + 1",
    "import Standard.Base\nfrom Standard.Base import all\n",
    "x = -y.z ^ 2 ^ 3",
    "foo bar\n    baz # comment\n    qux",
    "x = 'unterminated\n)",
    "a\r\nb\r\n",
    "x= 1\ny =2\nf x= 1\n1=  all",
    "a .b\na. b\nc . d",
    "from.\nfrom'a\nimport A as\nx,+ y",
];

#[test]
fn printing_reproduces_parsed_source() {
    for &source in SOURCES {
        let (module, _) = parse_module(source);
        let root = module.root().unwrap();
        assert_eq!(print(&module, root).code, source, "{source:?}");
    }
}

#[test]
fn printed_spans_match_reparsed_spans() {
    for &source in SOURCES {
        let (module, parsed_spans) = parse_module(source);
        let printed = print(&module, module.root().unwrap());
        let mut parsed: Vec<_> = parsed_spans.nodes.keys().collect();
        let mut printed: Vec<_> = printed.spans.nodes.keys().collect();
        parsed.sort_by_key(|range| (range.start(), range.end()));
        printed.sort_by_key(|range| (range.start(), range.end()));
        assert_eq!(printed, parsed, "{source:?}");
    }
}

fn built_module() -> Module {
    let mut module = Module::new();
    let m = &mut module;

    let sum = {
        let lhs = Ident::new(m, "a");
        let rhs = NumericLiteral::new(m, "2");
        OprApp::new(m, Some(lhs), "+", Some(rhs))
    };
    let call = {
        let f = Ident::new(m, "f");
        let group = Group::new(m, sum);
        App::positional(m, f, group)
    };
    let first = Assignment::new(m, "x", call);

    let list = {
        let one = NumericLiteral::new(m, "1");
        let two = TextLiteral::new(m, "two");
        let neg = {
            let y = Ident::new(m, "y");
            let access = PropertyAccess::new(m, y, "z");
            NegationApp::new(m, access)
        };
        Vector::new(m, vec![one, two, neg])
    };
    let second = ExpressionStatement::new(m, list);

    let body = {
        let x = Ident::new(m, "x");
        let statement = ExpressionStatement::new(m, x);
        BodyBlock::new(m, vec![statement])
    };
    let function = FunctionDef::new(m, "g", &["a"], body);

    let root = BodyBlock::new(m, vec![first, second, function]);
    let _ = module.replace_root(root);
    module
}

#[test]
fn reprinting_built_tree_is_idempotent() {
    let module = built_module();
    let printed = print(&module, module.root().unwrap()).code;
    assert_eq!(printed, "x = f (a + 2)\n[1, 'two', -y.z]\ng a =\n    x");

    let (reparsed, _) = parse_module(&printed);
    assert_eq!(print(&reparsed, reparsed.root().unwrap()).code, printed);
}
