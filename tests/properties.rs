//! Property-based tests for escaping, the nesting limit and reference resolution

use flavormark::{Flavor, Markdown};
use proptest::prelude::*;

/// Words separated by `<`, `>`, `&` or `"`, always padded with spaces so they
/// cannot form tags, entities or autolinks
fn plain_text_strategy() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", prop::collection::vec(("[<>&\"]", "[a-z]{1,8}"), 0..6)).prop_map(|(first, rest)| {
        let mut text = first;
        for (special, word) in rest {
            text.push_str(&format!(" {} {}", special, word));
        }
        text
    })
}

fn flavor_strategy() -> impl Strategy<Value = Flavor> {
    prop_oneof![
        Just(Flavor::Markdown),
        Just(Flavor::Gfm),
        Just(Flavor::Extra),
        Just(Flavor::Leanpub),
    ]
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

proptest! {
    #[test]
    fn plain_text_is_escaped(text in plain_text_strategy(), flavor in flavor_strategy()) {
        let html = Markdown::new(flavor).parse(&text);
        prop_assert_eq!(html, format!("<p>{}</p>\n", escape(&text)));
    }

    #[test]
    fn deep_quotes_stop_at_the_nesting_limit(depth in 40usize..3000) {
        let input = format!("{} deep", ">".repeat(depth));
        let html = Markdown::default().parse(&input);
        prop_assert_eq!(html.matches("<blockquote>").count(), 32);
        prop_assert!(html.contains("deep"));
    }

    #[test]
    fn first_reference_definition_wins(
        label in "[a-z]{1,8}",
        first in "/[a-z]{1,8}",
        second in "/[a-z]{1,8}",
    ) {
        prop_assume!(first != second);
        let input = format!("[x][{label}]\n\n[{label}]: {first}\n[{label}]: {second}\n");
        let html = Markdown::default().parse(&input);
        prop_assert_eq!(html, format!("<p><a href=\"{}\">x</a></p>\n", first));
    }
}
