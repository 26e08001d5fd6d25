use docpatch::{
    apply_patches, parse_patches_json, BlockPosition, Document, DocumentPatch, ErrorKind,
    PatchEngine, Value,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;

fn article() -> Document {
    Document::from(json!({
        "title": "Launch notes",
        "tags": ["news", "release"],
        "meta": {"author": {"name": "Ada"}, "seo": null},
        "blocks": [
            {"id": "hero_1", "type": "hero", "title": "Welcome"},
            {"id": "photo_1", "type": "photo", "alt": "rocket"},
            {"id": "text_1", "type": "richtext", "body": "Lorem"}
        ]
    }))
}

/// A batch mixing valid patches with every kind of failure.
fn mixed_batch() -> Vec<DocumentPatch> {
    vec![
        DocumentPatch::field_set("title", "Launch notes v2"),
        DocumentPatch::field_set("tags", "oops"),
        DocumentPatch::array_insert("tags", 2, "product"),
        DocumentPatch::array_remove("tags", 10),
        DocumentPatch::field_clear("meta.subtitle"),
        DocumentPatch::field_set("meta.seo.title", "x"),
        DocumentPatch::block_add("blocks", "quote", json!({"text": "hi"}), BlockPosition::After("photo_1".into())),
        DocumentPatch::block_remove("blocks", "ghost"),
        DocumentPatch::block_move("blocks", "text_1", 0),
        DocumentPatch::block_update_field("blocks", "hero_1", "title.sub", "x"),
        DocumentPatch::block_update_field("blocks", "hero_1", "title", "Hello"),
        DocumentPatch::array_move("tags[", 0, 1),
        DocumentPatch::array_update_item("tags", 0, "breaking"),
    ]
}

#[test]
fn scenario_move_to_end() {
    let doc = Document::from(json!({"tags": ["a", "b", "c"]}));
    let result = apply_patches(&doc, &[DocumentPatch::array_move("tags", 0, 2)]);
    assert!(result.is_ok());
    assert_eq!(result.document.to_json(), json!({"tags": ["b", "c", "a"]}));
}

#[test]
fn scenario_set_title() {
    let doc = Document::from(json!({"title": "Old"}));
    let result = apply_patches(&doc, &[DocumentPatch::field_set("title", "New")]);
    assert!(result.errors.is_empty());
    assert_eq!(result.document.to_json(), json!({"title": "New"}));
}

#[test]
fn scenario_add_photo_block() {
    let doc = Document::from(json!({"blocks": []}));
    let result = apply_patches(
        &doc,
        &[DocumentPatch::block_add("blocks", "photo", json!({"alt": "x"}), BlockPosition::End)],
    );
    assert!(result.is_ok());

    let blocks = result.document.root().get("blocks").and_then(Value::as_array).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].get("type"), Some(&Value::from("photo")));
    assert_eq!(blocks[0].get("alt"), Some(&Value::from("x")));
    let id = blocks[0].get("id").and_then(Value::as_str).unwrap();
    assert!(!id.is_empty());
}

#[test]
fn scenario_remove_out_of_bounds() {
    let doc = Document::from(json!({"items": [1, 2]}));
    let result = apply_patches(&doc, &[DocumentPatch::array_remove("items", 5)]);
    assert_eq!(result.document, doc);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorKind::IndexOutOfBounds);
}

#[test]
fn scenario_second_patch_type_mismatch() {
    let doc = Document::from(json!({"title": "X"}));
    let result = apply_patches(
        &doc,
        &[
            DocumentPatch::field_set("title", "A"),
            DocumentPatch::array_remove("title", 0),
        ],
    );
    assert_eq!(result.document.to_json(), json!({"title": "A"}));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorKind::TypeMismatch);
    assert_eq!(result.errors[0].index, Some(1));
}

#[test]
fn applying_twice_is_deterministic() {
    let doc = article();
    let batch = mixed_batch();
    let first = apply_patches(&doc, &batch);
    let second = apply_patches(&doc, &batch);
    assert_eq!(first, second);
}

#[test]
fn mixed_batch_reports_each_failure() {
    let result = apply_patches(&article(), &mixed_batch());
    let failures: Vec<(usize, ErrorKind)> = result
        .errors
        .iter()
        .map(|e| (e.index.unwrap(), e.code))
        .collect();
    assert_eq!(
        failures,
        vec![
            (1, ErrorKind::TypeMismatch),
            (3, ErrorKind::IndexOutOfBounds),
            (4, ErrorKind::FieldNotFound),
            (5, ErrorKind::PathNotFound),
            (7, ErrorKind::BlockNotFound),
            (9, ErrorKind::TypeMismatch),
            (11, ErrorKind::InvalidPath),
        ]
    );

    assert_eq!(
        result.document.to_json(),
        json!({
            "title": "Launch notes v2",
            "tags": ["breaking", "release", "product"],
            "meta": {"author": {"name": "Ada"}, "seo": null},
            "blocks": [
                {"id": "text_1", "type": "richtext", "body": "Lorem"},
                {"id": "hero_1", "type": "hero", "title": "Hello"},
                {"id": "photo_1", "type": "photo", "alt": "rocket"},
                {"id": "quote_1", "type": "quote", "text": "hi"}
            ]
        })
    );
}

#[test]
fn failed_patch_behaves_as_if_absent() {
    let doc = article();
    let batch = mixed_batch();
    let full = apply_patches(&doc, &batch);

    for failed in full.errors.iter().filter_map(|e| e.index) {
        let without: Vec<_> = batch
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != failed)
            .map(|(_, p)| p.clone())
            .collect();
        let reduced = apply_patches(&doc, &without);
        assert_eq!(reduced.document, full.document, "dropping patch #{failed}");
    }
}

#[test]
fn result_stays_well_formed() {
    let doc = article();
    let result = apply_patches(&doc, &mixed_batch());
    let root = result.document.root();

    assert!(root.get("tags").unwrap().is_array());
    assert!(root.get("meta").unwrap().is_object());
    assert!(root.get("meta").and_then(|m| m.get("author")).unwrap().is_object());

    let blocks = root.get("blocks").and_then(Value::as_array).unwrap();
    let mut seen = HashSet::new();
    for block in blocks {
        let id = block.get("id").and_then(Value::as_str).expect("block id");
        assert!(seen.insert(id.to_string()), "duplicate block id {id}");
        assert!(block.get("type").and_then(Value::as_str).is_some());
    }
}

#[test]
fn move_to_same_index_is_a_silent_noop() {
    let doc = Document::from(json!({"xs": [1, 2, 3]}));
    for k in 0..3 {
        let result = apply_patches(&doc, &[DocumentPatch::array_move("xs", k, k)]);
        assert!(result.is_ok());
        assert_eq!(result.document, doc);
    }
}

#[test]
fn insert_then_remove_round_trips() {
    let doc = Document::from(json!({"xs": ["a", "b", "c"]}));
    for i in 0..=3 {
        let result = apply_patches(
            &doc,
            &[
                DocumentPatch::array_insert("xs", i, "new"),
                DocumentPatch::array_remove("xs", i),
            ],
        );
        assert!(result.is_ok());
        assert_eq!(result.document, doc);
    }
}

#[test]
fn untouched_subtrees_are_shared() {
    let doc = article();
    let result = apply_patches(&doc, &[DocumentPatch::field_set("meta.author.name", "Grace")]);

    let before = doc.root();
    let after = result.document.root();
    assert!(before.get("blocks").unwrap().ptr_eq(after.get("blocks").unwrap()));
    assert!(before.get("tags").unwrap().ptr_eq(after.get("tags").unwrap()));
    assert!(!before.get("meta").unwrap().ptr_eq(after.get("meta").unwrap()));
    assert_eq!(
        before.get("meta").and_then(|m| m.get("author")).and_then(|a| a.get("name")),
        Some(&Value::from("Ada"))
    );
}

#[test]
fn batch_from_json_wire_format() {
    let patches = parse_patches_json(
        r#"[
            {"kind": "block.add", "path": "blocks", "blockType": "photo", "value": {"alt": "x"}, "position": "start"},
            {"kind": "block.update-field", "path": "blocks", "blockId": "photo_2", "fieldPath": "alt", "value": "y"},
            {"kind": "array.update-item", "path": "blocks", "index": 1, "value": {"title": "Hi"}}
        ]"#,
    )
    .unwrap();

    let result = apply_patches(&article(), &patches);
    assert!(result.is_ok(), "{:?}", result.errors);
    let blocks = result.document.root().get("blocks").and_then(Value::as_array).unwrap();
    assert_eq!(blocks[0].get("id"), Some(&Value::from("photo_2")));
    assert_eq!(blocks[0].get("alt"), Some(&Value::from("y")));
    assert_eq!(blocks[1].get("title"), Some(&Value::from("Hi")));
}

#[test]
fn allow_list_from_config() {
    let engine = PatchEngine::from_config_str("allowed_block_types:\n  blocks: [hero, photo]\n").unwrap();
    let result = engine.apply(
        &article(),
        &[
            DocumentPatch::block_add("blocks", "video", Value::Null, BlockPosition::End),
            DocumentPatch::block_add("blocks", "hero", Value::Null, BlockPosition::Start),
        ],
    );
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorKind::TypeMismatch);
    let first = &result.document.root().get("blocks").and_then(Value::as_array).unwrap()[0];
    assert_eq!(first.get("id"), Some(&Value::from("hero_2")));
}
