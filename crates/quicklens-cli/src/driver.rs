//! Driver: read, parse, compile, annotate, print.
//!
//! This is the presentation layer the engine's contract leaves to its
//! caller: anchor offsets become line/column positions, annotations
//! become terminal lines (or JSON records for editor integrations).

use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::path::Path;
use tracing::info_span;

use quicklens_common::LineMap;
use quicklens_engine::{Annotation, EntropyRandom, RandomSource, annotate_source_file};
use quicklens_frontend::parse_source;
use quicklens_runtime::compile;

use crate::args::CliArgs;

/// Parse and annotate one file. A file the front end cannot parse never
/// reaches the engine.
pub fn annotate_path(path: &Path, seed: Option<u64>) -> Result<(String, Vec<Annotation>)> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let file = match parse_source(&source) {
        Ok(file) => file,
        Err(error) => {
            let map = LineMap::build(&source);
            let position = map.offset_to_position(error.span.pos, &source);
            bail!(
                "{}:{}:{}: {}",
                path.display(),
                position.line + 1,
                position.character + 1,
                error
            );
        }
    };
    let module = compile(&file);

    let mut random: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(EntropyRandom::seeded(seed)),
        None => Box::new(EntropyRandom::new()),
    };

    let span = info_span!("annotate", file = %path.display());
    let _guard = span.enter();
    let annotations = annotate_source_file(&file, &module, random.as_mut());
    Ok((source, annotations))
}

pub fn run(args: &CliArgs) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let (source, annotations) = annotate_path(&args.file, args.seed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&annotations)?);
        return Ok(());
    }

    let map = LineMap::build(&source);
    for annotation in &annotations {
        let position = map.offset_to_position(annotation.anchor, &source);
        let location = format!(
            "{}:{}:{}",
            args.file.display(),
            position.line + 1,
            position.character + 1
        );
        println!("{}  {}", location.cyan(), annotation.display_text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn annotates_a_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            "function add(a: number, b: number): number {{ return a + b; }}"
        )
        .expect("write failed");

        let (_, annotations) =
            annotate_path(file.path(), Some(7)).expect("annotation failed");
        assert_eq!(annotations.len(), 1);
        assert!(annotations[0].display_text.starts_with("add("));
        assert!(annotations[0].display_text.contains(" => "));
    }

    #[test]
    fn same_seed_gives_same_annotations() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "const f = (s: string) => s.toUpperCase();").expect("write failed");

        let (_, first) = annotate_path(file.path(), Some(3)).expect("annotation failed");
        let (_, second) = annotate_path(file.path(), Some(3)).expect("annotation failed");
        assert_eq!(first, second);
    }

    #[test]
    fn unparseable_file_is_a_driver_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "function {{").expect("write failed");

        let error = annotate_path(file.path(), None).expect_err("should fail");
        assert!(error.to_string().contains(":1:"));
    }
}
