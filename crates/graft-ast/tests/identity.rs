use graft_ast::{
    ExternalId, Module, ModuleUpdate, NodeKind, Origin, SourceDocument, TextEdit, TextRange,
    TextSize, apply_text_edits, apply_text_edits_to_ast, parse_module, print,
};
use rustc_hash::FxHashMap;

fn offset(at: usize) -> TextSize {
    TextSize::try_from(at).unwrap()
}

/// External ids of the printed tree keyed by what each node looks like.
fn identities(module: &Module) -> FxHashMap<(String, NodeKind), ExternalId> {
    let root = module.root().unwrap();
    let mut out = FxHashMap::default();
    for id in module.descendants(root) {
        out.insert((module.code(id), module.kind(id)), module.external_id(id));
    }
    out
}

fn edit(module: &mut Module, edits: &[TextEdit]) {
    let before = module.fork();
    let root = module.root().unwrap();
    apply_text_edits_to_ast(module, root, edits, &before).unwrap();
}

const SOURCE: &str = "main =\n    x = f 1\n    y = x + 2\n    y";

#[test]
fn inserting_and_deleting_a_line_keeps_identities() {
    let (mut module, _) = parse_module(SOURCE);
    let before = identities(&module);

    let at = SOURCE.find("\n    y = x").unwrap();
    let line = "\n    z = 4";
    edit(&mut module, &[TextEdit::insert(offset(at), line)]);
    assert_eq!(module.code(module.root().unwrap()), "main =\n    x = f 1\n    z = 4\n    y = x + 2\n    y");
    edit(&mut module, &[TextEdit::delete(TextRange::at(offset(at), offset(line.len())))]);

    assert_eq!(module.code(module.root().unwrap()), SOURCE);
    assert_eq!(identities(&module), before);
}

#[test]
fn extending_and_restoring_a_literal_keeps_identities() {
    let (mut module, _) = parse_module(SOURCE);
    let root = module.root().unwrap();
    let before = identities(&module);

    let at = SOURCE.find("f 1").unwrap() + 3;
    edit(&mut module, &[TextEdit::insert(offset(at), "0")]);
    assert_eq!(module.code(root), "main =\n    x = f 10\n    y = x + 2\n    y");
    edit(&mut module, &[TextEdit::delete(TextRange::at(offset(at), offset(1)))]);

    assert_eq!(module.root(), Some(root));
    assert_eq!(module.code(root), SOURCE);
    assert_eq!(identities(&module), before);
}

const LINES: [&str; 3] = ["a = f 1", "b = g 2", "c = h 3"];

fn statement_ids(module: &Module) -> FxHashMap<String, ExternalId> {
    let root = module.root().unwrap();
    module.children(root).into_iter().map(|id| (module.code(id), module.external_id(id))).collect()
}

#[test]
fn moving_first_line_to_end_keeps_identities() {
    let code = LINES.join("\n");
    let (mut module, _) = parse_module(&code);
    let before = statement_ids(&module);

    let first = LINES[0];
    edit(
        &mut module,
        &[
            TextEdit::delete(TextRange::up_to(offset(first.len() + 1))),
            TextEdit::insert(offset(code.len()), format!("\n{first}")),
        ],
    );

    assert_eq!(module.code(module.root().unwrap()), "b = g 2\nc = h 3\na = f 1");
    assert_eq!(statement_ids(&module), before);
}

#[test]
fn moving_last_line_to_start_keeps_identities() {
    let code = LINES.join("\n");
    let (mut module, _) = parse_module(&code);
    let before = statement_ids(&module);

    let last = LINES[2];
    edit(
        &mut module,
        &[
            TextEdit::insert(offset(0), format!("{last}\n")),
            TextEdit::delete(TextRange::new(offset(code.len() - last.len() - 1), offset(code.len()))),
        ],
    );

    assert_eq!(module.code(module.root().unwrap()), "c = h 3\na = f 1\nb = g 2");
    assert_eq!(statement_ids(&module), before);
}

#[test]
fn unmatched_target_retires_its_identity() {
    let (mut module, _) = parse_module("x = a + b");
    let root = module.root().unwrap();
    let sum = module.descendants(root).into_iter().find(|&id| module.kind(id) == NodeKind::OprApp).unwrap();
    let old_id = module.external_id(sum);

    let before = module.fork();
    graft_ast::sync_to_code(&mut module, sum, "[a]", &before).unwrap();

    assert_eq!(module.code(root), "x = [a]");
    let vector = module.descendants(root).into_iter().find(|&id| module.kind(id) == NodeKind::Vector).unwrap();
    assert_eq!(module.external_id(vector), old_id);
    assert_ne!(module.external_id(sum), old_id);
}

#[test]
fn source_document_follows_text_edits() {
    let (mut module, _) = parse_module(SOURCE);
    let mut doc = SourceDocument::new();
    doc.apply_update(&module, &ModuleUpdate::between(&Module::new(), &module, None));

    let mirror = std::rc::Rc::new(std::cell::RefCell::new(String::new()));
    let sink = std::rc::Rc::clone(&mirror);
    let _handle = doc.observe(move |edits, _| {
        let text = apply_text_edits(&sink.borrow(), edits);
        *sink.borrow_mut() = text;
    });
    assert_eq!(*mirror.borrow(), SOURCE);

    let before = module.fork();
    let at = SOURCE.find("x + 2").unwrap();
    edit(&mut module, &[TextEdit::new(TextRange::at(offset(at), offset(1)), "x * x")]);
    doc.apply_update(&module, &ModuleUpdate::between(&before, &module, Some(Origin::Remote)));

    let expected = "main =\n    x = f 1\n    y = x * x + 2\n    y";
    assert_eq!(doc.text(), expected);
    assert_eq!(*mirror.borrow(), expected);
}
