use serde_json::json;

use blockedit::{
    DocumentEditor, EditorOptions, ListOp, ListPath,
    cms::{BlockKind, ContentBlock},
    io::{DocumentFormat, OutputOptions, encode_document},
    validate::{site_validator, validate_document},
};

fn quiet_options() -> EditorOptions {
    EditorOptions::default().with_output(OutputOptions::default().with_destinations(Vec::new()))
}

#[test]
fn builds_a_landing_page_from_nothing() {
    let mut doc = DocumentEditor::new(json!({})).with_options(quiet_options());
    let faq = serde_json::to_value(ContentBlock::new(BlockKind::Faq)).unwrap();
    let hero = serde_json::to_value(ContentBlock::new(BlockKind::Hero)).unwrap();

    assert!(doc.apply(&ListPath::Blocks, ListOp::Add(Some(faq))).unwrap());
    assert!(doc.apply(&ListPath::Blocks, ListOp::Add(Some(hero))).unwrap());
    assert!(doc.apply(&ListPath::Blocks, ListOp::Move { from: 1, to: 0 }).unwrap());
    assert!(doc.apply(&ListPath::BlockFaq(1), ListOp::Add(None)).unwrap());
    assert!(
        doc.apply(
            &ListPath::BlockFaq(1),
            ListOp::Update {
                index: 0,
                patch: json!({"answer": "Yes."}),
            },
        )
        .unwrap()
    );

    let site = doc.site().unwrap();
    assert_eq!(site.blocks[0].kind(), BlockKind::Hero);
    assert_eq!(site.blocks[1].summary(), "FAQ: Frequently asked questions (1 question)");
    assert_eq!(doc.validate().unwrap(), Vec::new());
    doc.save().unwrap();
    assert!(!doc.is_dirty());
}

#[test]
fn nested_footer_links_use_their_own_sessions() {
    let mut doc = DocumentEditor::new(json!({
        "footer": [
            {"title": "Company", "links": [{"label": "About", "href": "/about"}]},
            {"title": "Legal", "links": []}
        ]
    }));
    doc.apply(&ListPath::FooterLinks(1), ListOp::Add(None)).unwrap();
    doc.apply(&ListPath::FooterLinks(0), ListOp::Delete { index: 0 }).unwrap();
    assert_eq!(
        doc.document()["footer"],
        json!([
            {"title": "Company", "links": []},
            {"title": "Legal", "links": [{"label": "New link", "href": "/"}]}
        ])
    );
}

#[test]
fn auto_validation_can_be_turned_off() {
    let options = quiet_options().with_auto_validate(false);
    let mut doc = DocumentEditor::new(json!({"headerNav": []})).with_options(options);
    doc.apply(
        &ListPath::Nav,
        ListOp::Add(Some(json!({"label": "Broken", "href": "javascript:alert(1)"}))),
    )
    .unwrap();
    assert_eq!(doc.validate().unwrap().len(), 1);
    doc.save().unwrap();
}

#[test]
fn validation_and_output_agree_on_the_same_document() {
    let doc = json!({
        "headerNav": [{"label": "Docs", "href": "https://docs.example.com", "icon": "book"}],
        "blocks": [{"type": "cta", "headline": "Go", "buttonLabel": "Start", "buttonHref": "/start"}]
    });
    let validator = site_validator().unwrap();
    assert!(validate_document(&validator, &doc).is_empty());
    let compact = encode_document(&doc, &OutputOptions::new(DocumentFormat::Json).with_pretty(false))
        .unwrap();
    assert!(!compact.contains('\n'));
    assert!(compact.contains(r#""buttonHref":"/start""#));
}

#[test]
fn outline_reflects_operations() {
    let mut doc = DocumentEditor::new(json!({
        "headerNav": [
            {"label": "A", "href": "/a"},
            {"label": "B", "href": "/b"}
        ]
    }));
    doc.apply(&ListPath::Nav, ListOp::Move { from: 0, to: 1 }).unwrap();
    let lines = doc.outline(false).unwrap();
    assert_eq!(
        &lines[..3],
        ["Header navigation (2)", "  ▸ B → /b", "  ▸ A → /a"]
    );
}
