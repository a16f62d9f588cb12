//! Fuzz target for knowledge.json parsing and validation.
//!
//! Arbitrary input must never panic: it either fails to parse, fails
//! validation, or yields a knowledge base that can diagnose.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netdiag_core::knowledge::{KnowledgeBase, KnowledgeSpec};
use netdiag_core::DiagnosticService;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Ok(spec) = serde_json::from_slice::<KnowledgeSpec>(data) else {
        return;
    };
    let ids: Vec<String> = spec.symptoms.iter().map(|s| s.id.to_string()).collect();
    if let Ok(kb) = KnowledgeBase::from_spec(spec) {
        let service = DiagnosticService::new(Arc::new(kb));
        let _ = service.diagnose(&ids);
    }
});
