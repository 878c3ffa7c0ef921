//! Behavior that differs between flavors or depends on options.

use flavormark::{Flavor, Markdown, Options};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn convert(options: Options, input: &str) -> String {
    Markdown::with_options(options).unwrap().parse(input)
}

#[rstest]
#[case(Flavor::Markdown, "<p>~~x~~</p>\n")]
#[case(Flavor::Gfm, "<p><del>x</del></p>\n")]
#[case(Flavor::Extra, "<p>~~x~~</p>\n")]
#[case(Flavor::Leanpub, "<p><del>x</del></p>\n")]
fn test_strikeout_by_flavor(#[case] flavor: Flavor, #[case] expected: &str) {
    assert_eq!(Markdown::new(flavor).parse("~~x~~"), expected);
}

#[rstest]
#[case(Flavor::Markdown, "<p>a|b\n-|-\n1|2</p>\n")]
#[case(
    Flavor::Extra,
    "<table>\n<thead>\n<tr><th>a</th><th>b</th></tr>\n</thead>\n<tbody>\n<tr><td>1</td><td>2</td></tr>\n</tbody>\n</table>\n"
)]
fn test_tables_by_flavor(#[case] flavor: Flavor, #[case] expected: &str) {
    assert_eq!(Markdown::new(flavor).parse("a|b\n-|-\n1|2"), expected);
}

#[rstest]
#[case(Flavor::Markdown, "<p>a\nb</p>\n")]
#[case(Flavor::Extra, "<p>a\nb</p>\n")]
#[case(Flavor::Gfm, "<p>a<br />\nb</p>\n")]
#[case(Flavor::Leanpub, "<p>a<br />\nb</p>\n")]
fn test_enable_newlines(#[case] flavor: Flavor, #[case] expected: &str) {
    let options = Options {
        enable_newlines: true,
        ..Options::new(flavor)
    };
    assert_eq!(convert(options, "a\nb"), expected);
}

#[rstest]
#[case(Flavor::Gfm)]
#[case(Flavor::Extra)]
#[case(Flavor::Leanpub)]
fn test_indented_line_continues_open_inline_tag(#[case] flavor: Flavor) {
    assert_eq!(
        Markdown::new(flavor).parse("a <span\n    class=\"x\">b</span>"),
        "<p>a <span\nclass=\"x\">b</span></p>\n"
    );
    assert_eq!(
        Markdown::new(flavor).parse("a <b>x</b>\n    code"),
        "<p>a <b>x</b></p>\n<pre><code>code\n</code></pre>\n"
    );
}

#[rstest]
#[case("A", "aside")]
#[case("W", "warning")]
#[case("T", "tip")]
#[case("E", "error")]
#[case("I", "information")]
#[case("Q", "question")]
#[case("D", "discussion")]
#[case("X", "exercise")]
#[case("G", "generic")]
#[case("C", "centeredparagraph")]
fn test_admonition_types(#[case] letter: &str, #[case] name: &str) {
    let html = Markdown::new(Flavor::Leanpub).parse(&format!("{}> body", letter));
    assert_eq!(
        html,
        format!(
            "<blockquote class=\"notquote {}\" data-type=\"{}\"><p>body</p>\n</blockquote>\n",
            name, name
        )
    );
}

#[test]
fn test_admonitions_are_leanpub_only() {
    assert_eq!(Markdown::new(Flavor::Gfm).parse("W> body"), "<p>W&gt; body</p>\n");
}

#[test]
fn test_html5_image() {
    let options = Options {
        html5: true,
        ..Options::default()
    };
    assert_eq!(convert(options, "![a](/b)"), "<p><img src=\"/b\" alt=\"a\"></p>\n");
}

#[test]
fn test_depth_limit_leaves_literal_text() {
    let options = Options {
        maximum_nesting_level: 2,
        ..Options::default()
    };
    assert_eq!(
        convert(options, "> > > x"),
        "<blockquote><blockquote>&gt; x\n</blockquote>\n</blockquote>\n"
    );
}

#[test]
fn test_extra_fence_language_with_dot() {
    assert_eq!(
        Markdown::new(Flavor::Extra).parse("~~~ .php\n<?php\n~~~"),
        "<pre><code class=\"language-php\">&lt;?php\n</code></pre>\n"
    );
}

#[test]
fn test_angle_destination_and_single_quoted_title() {
    assert_eq!(
        Markdown::default().parse("[a](<b c> 'T')"),
        "<p><a href=\"b c\" title=\"T\">a</a></p>\n"
    );
}

#[test]
fn test_links_do_not_nest() {
    assert_eq!(
        Markdown::default().parse("[a [b](c) d](e)"),
        "<p><a href=\"e\">a [b](c) d</a></p>\n"
    );
}

#[test]
fn test_reference_labels_ignore_case_and_spacing() {
    assert_eq!(
        Markdown::default().parse("[x][Some  LABEL]\n\n[some label]: /there"),
        "<p><a href=\"/there\">x</a></p>\n"
    );
}

#[test]
fn test_reference_title_on_next_line() {
    assert_eq!(
        Markdown::default().parse("[x]\n\n[x]: /url\n    \"Title\""),
        "<p><a href=\"/url\" title=\"Title\">x</a></p>\n"
    );
}

#[test]
fn test_keep_list_start_number_from_json() {
    let options = Options::from_json(r#"{"keep-list-start-number": true}"#).unwrap();
    assert_eq!(
        convert(options, "7. seven\n8. eight"),
        "<ol start=\"7\">\n<li>seven</li>\n<li>eight</li>\n</ol>\n"
    );
}

#[test]
fn test_url_display_is_decoded() {
    assert_eq!(
        Markdown::new(Flavor::Gfm).parse("https://example.com/a%20b"),
        "<p><a href=\"https://example.com/a%20b\">https://example.com/a b</a></p>\n"
    );
}

#[test]
fn test_footnotes_without_definition_produce_no_section() {
    assert_eq!(Markdown::new(Flavor::Leanpub).parse("a[^1]"), "<p>a[^1]</p>\n");
}

#[test]
fn test_unused_footnote_definition_is_dropped() {
    assert_eq!(Markdown::new(Flavor::Leanpub).parse("text\n\n[^1]: unused"), "<p>text</p>\n");
}
