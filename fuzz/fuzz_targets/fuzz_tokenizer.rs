#![no_main]

use libfuzzer_sys::fuzz_target;
use qak_core::{DiagnosticSink, Source};

// Arbitrary bytes, not just valid UTF-8: the tokenizer must never panic on
// truncated or malformed multi-byte sequences, and every byte it consumes
// must end up inside exactly one token's span or be whitespace/comment.
fuzz_target!(|data: &[u8]| {
    let source = Source::new("<fuzz>", data.to_vec());
    let mut diagnostics = DiagnosticSink::new();
    let tokens = qak::tokenize(&source, &mut diagnostics);

    let mut previous_end = 0u32;
    for token in &tokens {
        assert!(token.span.start >= previous_end);
        assert!(token.span.end <= data.len() as u32);
        previous_end = token.span.end;
    }

    if !diagnostics.is_empty() {
        let _ = diagnostics.render(&source);
    }
});
