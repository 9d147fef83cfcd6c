pub mod generate;
pub mod patch;
pub mod synthesize;

pub use generate::handle_generate;
pub use patch::handle_patch;
pub use synthesize::handle_synthesize;

use toolchain_cli_gen::Plan;

/// One-line summary printed after a successful run
fn print_summary(plan: &Plan) {
    let with_parameters = plan
        .schemas
        .iter()
        .filter(|schema| schema.has_properties())
        .count();
    eprintln!(
        "✓ {} tool types ({} with parameters, {} with hard-coded values)",
        plan.schemas.len(),
        with_parameters,
        plan.hardcoded.len()
    );
}
