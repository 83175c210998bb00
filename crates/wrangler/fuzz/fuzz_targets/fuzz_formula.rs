//! Fuzz target for the calculated-column formula language.
//!
//! Parsing arbitrary text must return an error rather than panic, and any
//! formula that parses must evaluate against a row without panicking.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wrangler::operations::Formula;
use wrangler::{row, CellValue};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    source: &'a str,
    price: f64,
    label: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    if input.source.len() > 1_000 {
        return;
    }

    if let Ok(formula) = Formula::parse(input.source) {
        let row = row! {
            "price" => input.price,
            "Unit Label" => input.label,
            "missing" => CellValue::Null,
        };
        let _ = formula.evaluate(&row);
        let _ = formula.columns();
    }
});
