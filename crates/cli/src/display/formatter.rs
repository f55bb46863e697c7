use projector_core::{BuildOutcome, engine::ProjectionResult};

/// Human-readable summary of one build
pub fn print_build_outcome(outcome: &BuildOutcome) {
    println!("Output root: {}", outcome.result.output_root.display());
    println!("Sources:");
    for source in &outcome.sources {
        println!("  {} ({})", source.path().display(), source.origin());
    }

    println!("Projections:");
    for projection in &outcome.result.projections {
        print_projection(projection, projection.name == outcome.result.source_projection);
    }

    if !outcome.report.is_empty() {
        println!();
        println!("{}", outcome.report);
    }
}

fn print_projection(projection: &ProjectionResult, is_source: bool) {
    let marker = if is_source { " [source]" } else { "" };
    println!("  {}{}: {}", projection.name, marker, projection.outcome);
    for (plugin, dir) in &projection.plugins {
        println!("    {} -> {}", plugin, dir.display());
    }
    for diagnostic in &projection.diagnostics {
        println!("    {diagnostic}");
    }
}
