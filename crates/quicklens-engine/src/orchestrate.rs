//! The per-file driver.
//!
//! Runs extract -> build -> evaluate for each call-site, one at a time,
//! in declaration order. Call-sites are processed independently: no
//! synthesized value or result is shared, and one site's failure is just
//! that site's failure message. The only shared state is the read-only
//! resolution context, built once per run.

use serde::Serialize;
use tracing::debug;

use quicklens_frontend::ast::SourceFile;
use quicklens_runtime::CompiledModule;

use crate::build::build_call;
use crate::eval::evaluate;
use crate::extract::extract_call_sites;
use crate::random::RandomSource;
use crate::resolve::ResolutionContext;

/// The engine's sole externally visible artifact: one display line per
/// call-site, anchored to the declaration's start offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Call-expression source concatenated with its rendered result.
    #[serde(rename = "displayText")]
    pub display_text: String,
    #[serde(rename = "anchorPosition")]
    pub anchor: u32,
}

/// Annotate every callable declaration of `file`. Recomputes everything
/// from the given tree and module; nothing persists across invocations.
pub fn annotate_source_file(
    file: &SourceFile,
    module: &CompiledModule,
    random: &mut dyn RandomSource,
) -> Vec<Annotation> {
    let ctx = ResolutionContext::build(file);
    let sites = extract_call_sites(file, &ctx);
    debug!(call_sites = sites.len(), "annotating file");

    sites
        .iter()
        .map(|site| {
            let call = build_call(site, random);
            let outcome = evaluate(module, &call.source_code);
            debug!(
                call = %call.source_code,
                failed = outcome.is_failure(),
                "evaluated call-site"
            );
            Annotation {
                display_text: format!("{} => {}", call.source_code, outcome.display()),
                anchor: call.position,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{EntropyRandom, ScriptedRandom};
    use quicklens_frontend::parse_source;
    use quicklens_runtime::compile;

    fn annotate(source: &str, random: &mut dyn RandomSource) -> Vec<Annotation> {
        let file = parse_source(source).expect("parse failed");
        let module = compile(&file);
        annotate_source_file(&file, &module, random)
    }

    #[test]
    fn annotations_come_in_declaration_order() {
        let mut random = EntropyRandom::seeded(11);
        let annotations = annotate(
            "function a() { return 1; }\nfunction b() { return 2; }\nconst c = () => 3;",
            &mut random,
        );
        assert_eq!(annotations.len(), 3);
        assert!(annotations[0].display_text.starts_with("a() => 1"));
        assert!(annotations[1].display_text.starts_with("b() => 2"));
        assert!(annotations[2].display_text.starts_with("c() => 3"));
        assert!(annotations[0].anchor < annotations[1].anchor);
        assert!(annotations[1].anchor < annotations[2].anchor);
    }

    #[test]
    fn one_throwing_site_does_not_suppress_siblings() {
        let mut random = EntropyRandom::seeded(12);
        let annotations = annotate(
            "function bad() { throw new Error(\"boom\"); }\nfunction good() { return \"ok\"; }",
            &mut random,
        );
        assert_eq!(annotations.len(), 2);
        assert!(annotations[0].display_text.contains("boom"));
        assert_eq!(annotations[1].display_text, "good() => \"ok\"");
    }

    #[test]
    fn file_without_callables_yields_empty_output() {
        let mut random = EntropyRandom::seeded(13);
        let annotations = annotate("const x = 1;\ntype T = number;", &mut random);
        assert!(annotations.is_empty());
    }

    #[test]
    fn typed_arguments_flow_into_the_call() {
        let mut random = ScriptedRandom::with_ints(&[2, 3]);
        let annotations = annotate(
            "function add(a: number, b: number): number { return a + b; }",
            &mut random,
        );
        assert_eq!(annotations[0].display_text, "add(2, 3) => 5");
    }

    #[test]
    fn annotation_serializes_with_camel_case_fields() {
        let annotation = Annotation {
            display_text: "f() => 1".to_string(),
            anchor: 4,
        };
        let json = serde_json::to_string(&annotation).expect("serialize failed");
        assert_eq!(json, "{\"displayText\":\"f() => 1\",\"anchorPosition\":4}");
    }
}
