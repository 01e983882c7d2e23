//! End-to-end patch scenarios.
//!
//! Each test applies a complete diff document to a base document and checks
//! the serialized result, covering the structural edit rules of the three
//! operation kinds and the engine's ordering and failure behavior.

use xml_patch::{Error, PatchOptions, Patcher, UnknownOpPolicy};

fn apply(base: &str, diff: &str) -> Result<String, Error> {
    Patcher::new().patch_str(base, diff)
}

#[test]
fn patching_is_deterministic() {
    let base = r#"<inv version="1"><item id="a"/><item id="b"/></inv>"#;
    let diff = r#"<diff>
        <add sel="/inv"><item id="c"/></add>
        <replace sel="/inv/@version">2</replace>
        <remove sel="/inv/item[@id='a']" ws="after"/>
    </diff>"#;

    let first = apply(base, diff).unwrap();
    for _ in 0..10 {
        assert_eq!(apply(base, diff).unwrap(), first);
    }
}

#[test]
fn add_default_position_appends_as_last_child() {
    assert_eq!(
        apply("<a><b/></a>", r#"<diff><add sel="/a"><c/></add></diff>"#).unwrap(),
        "<a><b/><c/></a>"
    );
}

#[test]
fn add_before_inserts_as_preceding_sibling() {
    assert_eq!(
        apply(
            "<a><b/></a>",
            r#"<diff><add sel="/a/b" pos="before"><c/></add></diff>"#
        )
        .unwrap(),
        "<a><c/><b/></a>"
    );
}

#[test]
fn add_after_inserts_as_following_sibling() {
    assert_eq!(
        apply(
            "<a><b/><d/></a>",
            r#"<diff><add sel="/a/b" pos="after"><c/></add></diff>"#
        )
        .unwrap(),
        "<a><b/><c/><d/></a>"
    );
}

#[test]
fn add_unrecognized_position_falls_back_to_append() {
    assert_eq!(
        apply(
            "<a><b/></a>",
            r#"<diff><add sel="/a" pos="sideways"><c/></add></diff>"#
        )
        .unwrap(),
        "<a><b/><c/></a>"
    );
}

#[test]
fn add_attribute_from_inner_text() {
    assert_eq!(
        apply("<a/>", r#"<diff><add sel="/a" type="@x">1</add></diff>"#).unwrap(),
        r#"<a x="1"/>"#
    );
}

#[test]
fn add_attribute_appends_to_existing_set() {
    assert_eq!(
        apply(
            r#"<a x="1"/>"#,
            r#"<diff><add sel="/a" type="@y">2</add></diff>"#
        )
        .unwrap(),
        r#"<a x="1" y="2"/>"#
    );
}

#[test]
fn add_namespace_declaration() {
    assert_eq!(
        apply(
            "<a/>",
            r#"<diff><add sel="/a" type="namespace::ex">urn:example</add></diff>"#
        )
        .unwrap(),
        r#"<a xmlns:ex="urn:example"/>"#
    );
}

#[test]
fn add_with_unsupported_type_fails() {
    let err = apply("<a/>", r#"<diff><add sel="/a" type="attribute::x">1</add></diff>"#)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedAddType(v) if v == "attribute::x"));
}

#[test]
fn add_subtree_is_deep_copied() {
    assert_eq!(
        apply(
            "<a/>",
            r#"<diff><add sel="/a"><b x="1"><c>text</c></b></add></diff>"#
        )
        .unwrap(),
        r#"<a><b x="1"><c>text</c></b></a>"#
    );
}

#[test]
fn remove_collapses_emptied_parent_by_default() {
    assert_eq!(
        apply("<a><b/></a>", r#"<diff><remove sel="/a/b"/></diff>"#).unwrap(),
        "<a/>"
    );
}

#[test]
fn remove_ws_before_and_after_do_not_collapse() {
    assert_eq!(
        apply("<a><b/></a>", r#"<diff><remove sel="/a/b" ws="before"/></diff>"#).unwrap(),
        "<a></a>"
    );
    assert_eq!(
        apply("<a><b/></a>", r#"<diff><remove sel="/a/b" ws="after"/></diff>"#).unwrap(),
        "<a></a>"
    );
}

#[test]
fn remove_leaves_siblings_untouched() {
    assert_eq!(
        apply(
            "<a><b/><c/><d/></a>",
            r#"<diff><remove sel="/a/c"/></diff>"#
        )
        .unwrap(),
        "<a><b/><d/></a>"
    );
}

#[test]
fn remove_attribute() {
    assert_eq!(
        apply(r#"<a x="1"/>"#, r#"<diff><remove sel="/a/@x"/></diff>"#).unwrap(),
        "<a/>"
    );
}

#[test]
fn remove_root_element_fails() {
    let err = apply("<a><b/></a>", r#"<diff><remove sel="/a"/></diff>"#).unwrap_err();
    assert!(matches!(err, Error::UnsupportedRemoveTarget(sel) if sel == "/a"));
}

#[test]
fn replace_element_in_place() {
    assert_eq!(
        apply(
            "<a><b/><d/></a>",
            r#"<diff><replace sel="/a/b"><c/></replace></diff>"#
        )
        .unwrap(),
        "<a><c/><d/></a>"
    );
}

#[test]
fn replace_element_with_several_nodes_keeps_order() {
    assert_eq!(
        apply(
            "<a><x/><b/><y/></a>",
            r#"<diff><replace sel="/a/b"><c/><d/><e/></replace></diff>"#
        )
        .unwrap(),
        "<a><x/><c/><d/><e/><y/></a>"
    );
}

#[test]
fn replace_element_with_nothing_deletes_it() {
    assert_eq!(
        apply("<a><b/><c/></a>", r#"<diff><replace sel="/a/b"/></diff>"#).unwrap(),
        "<a><c/></a>"
    );
}

#[test]
fn replace_attribute_value() {
    assert_eq!(
        apply(r#"<a x="1"/>"#, r#"<diff><replace sel="/a/@x">2</replace></diff>"#).unwrap(),
        r#"<a x="2"/>"#
    );
}

#[test]
fn unresolvable_selector_reports_not_found() {
    let err = apply("<a><b/></a>", r#"<diff><remove sel="/a/z"/></diff>"#).unwrap_err();
    assert!(matches!(err, Error::SelectorNotFound(sel) if sel == "/a/z"));
}

#[test]
fn selectors_resolve_against_the_mutated_tree() {
    // The second operation targets the element the first one created.
    assert_eq!(
        apply(
            "<a/>",
            r#"<diff>
                 <add sel="/a"><b/></add>
                 <add sel="/a/b" type="@made">yes</add>
               </diff>"#
        )
        .unwrap(),
        r#"<a><b made="yes"/></a>"#
    );
}

#[test]
fn operations_apply_strictly_in_document_order() {
    // Remove b first; the positional selector then matches the shifted list.
    assert_eq!(
        apply(
            r#"<a><b/><c n="1"/><c n="2"/></a>"#,
            r#"<diff>
                 <remove sel="/a/b" ws="after"/>
                 <replace sel="/a/*[1]"><d/></replace>
               </diff>"#
        )
        .unwrap(),
        r#"<a><d/><c n="2"/></a>"#
    );
}

#[test]
fn failure_leaves_earlier_operations_applied() {
    let base = xml_patch::parse_str("<a><b/></a>").unwrap();
    let diff = xml_patch::parse_str(
        r#"<diff>
             <add sel="/a"><c/></add>
             <remove sel="/a/missing"/>
           </diff>"#,
    )
    .unwrap();

    let err = Patcher::new().patch(&base, &diff).unwrap_err();
    assert!(matches!(err, Error::SelectorNotFound(_)));
    // No rollback: the first add is still visible.
    assert_eq!(
        xml_patch::print_to_string(&base).unwrap(),
        "<a><b/><c/></a>"
    );
}

#[test]
fn unknown_operations_are_skipped_by_default() {
    assert_eq!(
        apply(
            "<a><b/></a>",
            r#"<diff><move sel="/a/b"/><remove sel="/a/b"/></diff>"#
        )
        .unwrap(),
        "<a/>"
    );
}

#[test]
fn unknown_operations_fail_under_strict_policy() {
    let patcher = Patcher::with_options(PatchOptions {
        unknown_ops: UnknownOpPolicy::Fail,
    });
    let err = patcher
        .patch_str("<a><b/></a>", r#"<diff><move sel="/a/b"/></diff>"#)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownOperation(tag) if tag == "move"));
}

#[test]
fn mixed_content_and_predicates() {
    let base = r#"<doc><sec id="intro"><p>one</p></sec><sec id="body"><p>two</p></sec></doc>"#;
    let diff = r#"<diff>
        <replace sel="/doc/sec[@id='intro']/p"><p>ONE</p></replace>
        <add sel="/doc/sec[2]" type="@reviewed">true</add>
        <add sel="//sec[@id='body']/p" pos="after"><p>three</p></add>
    </diff>"#;
    assert_eq!(
        apply(base, diff).unwrap(),
        r#"<doc><sec id="intro"><p>ONE</p></sec><sec id="body" reviewed="true"><p>two</p><p>three</p></sec></doc>"#
    );
}

#[test]
fn text_content_survives_patching_verbatim() {
    assert_eq!(
        apply(
            "<a><b>keep &amp; hold</b></a>",
            r#"<diff><add sel="/a"><c/></add></diff>"#
        )
        .unwrap(),
        "<a><b>keep &amp; hold</b><c/></a>"
    );
}
