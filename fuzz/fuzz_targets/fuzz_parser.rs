#![no_main]

use libfuzzer_sys::fuzz_target;
use qak_core::{DiagnosticSink, ParseConfig, Source};

// The recursion guard is what keeps this target fast: without it, inputs
// like a few thousand nested `(` would blow the stack instead of producing
// a diagnostic.
fuzz_target!(|data: &[u8]| {
    let source = Source::new("<fuzz>", data.to_vec());
    let mut diagnostics = DiagnosticSink::new();
    let config = ParseConfig::default().with_max_recursion_depth(256);

    if let Some(ast) = qak::parse(&source, config, &mut diagnostics) {
        for stmt_id in &ast.module.statements {
            let span = ast.stmt(*stmt_id).span();
            assert!(span.is_contained_in(ast.module.span));
        }
    }
});
