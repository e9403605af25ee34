//! `dkt plan` -- phased execution plan over the dependency DAG.

use anyhow::Result;

use docket_core::filter::ListFilter;
use docket_planner::{PlanFilter, generate_plan, split_file_collisions};

use crate::cli::PlanArgs;
use crate::commands::{issue_line, parse_id, parse_statuses};
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt plan` command.
pub fn run(ctx: &RuntimeContext, args: &PlanArgs) -> Result<()> {
    let store = ctx.open_store()?;

    let filter = PlanFilter {
        statuses: parse_statuses(&args.statuses)?,
        labels: args.labels.clone(),
        root: args.root.as_deref().map(parse_id).transpose()?,
    };

    let (mut issues, _) = store.list_issues(&ListFilter {
        include_done: true,
        ..Default::default()
    })?;
    // Files drive the collision view below.
    store.hydrate_files(&mut issues)?;
    let relations = store.get_all_directional_relations()?;

    let plan = generate_plan(&issues, &relations, &filter)?;

    let mut lines = vec![format!(
        "{} issues in {} phases (max parallelism {})",
        plan.total_issues, plan.total_phases, plan.max_parallelism
    )];
    for phase in &plan.phases {
        lines.push(String::new());
        lines.push(format!("Phase {}:", phase.number));
        let sub_phases = split_file_collisions(&phase.issues);
        if sub_phases.len() > 1 {
            // File overlaps force serialization inside the phase.
            for (idx, sub_phase) in sub_phases.iter().enumerate() {
                lines.push(format!("  {}.{}:", phase.number, idx + 1));
                for issue in sub_phase {
                    lines.push(format!("    {}", issue_line(issue)));
                }
            }
        } else {
            for issue in &phase.issues {
                lines.push(format!("  {}", issue_line(issue)));
            }
        }
    }

    output::emit_success(ctx, &plan, &lines.join("\n"));
    Ok(())
}
