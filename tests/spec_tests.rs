use flavormark::{Flavor, Markdown};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
struct SpecTest {
    flavor: Flavor,
    markdown: String,
    html: String,
    example: u32,
    section: String,
}

#[test]
fn conversion_examples() {
    let test_data = fs::read_to_string("tests/data/cases.json").expect("Failed to read cases.json");

    let tests: Vec<SpecTest> =
        serde_json::from_str(&test_data).expect("Failed to parse cases.json");

    let mut passed = 0;
    let mut failures = Vec::new();

    for test in tests.iter() {
        let result = Markdown::new(test.flavor).parse(&test.markdown);

        if result == test.html {
            passed += 1;
        } else {
            failures.push(test.example);

            // Print first few failures for debugging
            if failures.len() <= 5 {
                eprintln!("\nExample {} failed ({}, {})", test.example, test.section, test.flavor);
                eprintln!("  Input: {:?}", test.markdown);
                eprintln!("  Expected: {:?}", test.html);
                eprintln!("  Got: {:?}", result);
            }
        }
    }

    eprintln!("\nConversion examples: {} passed, {} failed", passed, failures.len());

    assert!(
        failures.is_empty(),
        "failed examples: {:?}",
        &failures[..failures.len().min(10)]
    );
}
