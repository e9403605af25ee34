//! `dkt` -- local-first, dependency-aware issue tracker CLI.
//!
//! Parses arguments with clap, resolves the runtime context, dispatches
//! to a command handler, and maps any error onto the output envelope and
//! its exit code.

mod cli;
mod commands;
mod context;
mod output;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Tracks whether a Ctrl+C has already been received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

fn main() {
    // First Ctrl+C: exit cleanly. Second: force exit.
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
        std::process::exit(0);
    });

    let cli = Cli::parse();

    let ctx = match RuntimeContext::from_global_args(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => {
            let code = output::emit_error(cli.global.json, &e);
            std::process::exit(code);
        }
    };

    if ctx.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("dkt=debug,docket_storage=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Some(Commands::Init) => commands::init::run(&ctx),
        Some(Commands::Config) => commands::config_cmd::run(&ctx),
        Some(Commands::Version) => commands::version::run(&ctx),
        Some(Commands::Stats) => commands::stats::run(&ctx),
        Some(Commands::List(args)) => commands::list::run(&ctx, &args),
        Some(Commands::Show(args)) => commands::show::run(&ctx, &args),
        Some(Commands::Create(args)) => commands::create::run(&ctx, &args),
        Some(Commands::Edit(args)) => commands::edit::run(&ctx, &args),
        Some(Commands::Move(args)) => commands::move_cmd::run(&ctx, &args),
        Some(Commands::Close(args)) => commands::close::run_close(&ctx, &args),
        Some(Commands::Reopen(args)) => commands::close::run_reopen(&ctx, &args),
        Some(Commands::Delete(args)) => commands::delete::run(&ctx, &args),
        Some(Commands::Comment(args)) => commands::comment::run(&ctx, &args),
        Some(Commands::Comments(args)) => commands::comment::run_list(&ctx, &args),
        Some(Commands::Label(args)) => commands::label::run(&ctx, &args),
        Some(Commands::File(args)) => commands::file::run(&ctx, &args),
        Some(Commands::Link(args)) => commands::link::run(&ctx, &args),
        Some(Commands::Graph(args)) => commands::graph::run(&ctx, &args),
        Some(Commands::Board) => commands::board::run(&ctx),
        Some(Commands::Next(args)) => commands::next::run(&ctx, &args),
        Some(Commands::Plan(args)) => commands::plan::run(&ctx, &args),
        Some(Commands::Export(args)) => commands::export::run(&ctx, &args),
        Some(Commands::Import(args)) => commands::import::run(&ctx, &args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        let code = output::emit_error(ctx.json, &e);
        std::process::exit(code);
    }
}
