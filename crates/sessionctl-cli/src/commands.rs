//! One handler per subcommand, each translating parsed args into a call
//! against `sessionctl_runtime::ops` (or directly into `sessionctl_engine`
//! for the operations runtime doesn't wrap) and rendering the result.

use crate::args::{Cli, Command, DeleteArgs, ExportArgs, FindArgs, IndexArgs, SearchArgs, SmartTrimArgs, TrimArgs, TrimModeArg};
use crate::output::{color_enabled, print_search_hit, print_session_line};
use anyhow::{anyhow, Context, Result};
use sessionctl_analysis::TokioCommandRunner;
use sessionctl_engine as engine;
use sessionctl_runtime::ops::{continuation, delete, export, find, index, smart_trim};
use sessionctl_runtime::RuntimeContext;
use sessionctl_types::{Agent, SessionFilter, TrimParams};

fn build_context(cli: &Cli) -> Result<RuntimeContext> {
    let cwd = std::env::current_dir().context("reading current working directory")?;
    let state_dir = cli.state_dir.clone().unwrap_or_else(RuntimeContext::default_state_dir);
    let mut ctx = RuntimeContext::new(cwd, state_dir);
    if let Some(dir) = &cli.claude_home {
        ctx.store = ctx.store.with_claude_home(dir.clone());
    }
    if let Some(dir) = &cli.codex_home {
        ctx.store = ctx.store.with_codex_home(dir.clone());
    }
    Ok(ctx)
}

fn filter_from_find_args(args: &FindArgs, agent: Option<Agent>, only_original: bool, only_derived: bool) -> SessionFilter {
    SessionFilter { agent, only_original, only_derived, keywords: args.keywords.clone(), limit: args.limit, ..Default::default() }
}

fn run_find(ctx: &RuntimeContext, filter: &SessionFilter, json: bool, color: bool) -> Result<()> {
    let records = find::find_sessions(ctx, filter)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("no sessions found");
        return Ok(());
    }
    for record in &records {
        print_session_line(record, color);
    }
    Ok(())
}

fn trim_params_from_args(args: &TrimArgs) -> TrimParams {
    let tool_names = args.tool_names.clone();
    match args.mode {
        TrimModeArg::ToolResultsOnly => TrimParams::ToolResultsOnly { char_threshold: args.char_threshold, tool_names },
        TrimModeArg::TrimFirstAssistant => {
            TrimParams::TrimFirstAssistant { char_threshold: args.char_threshold, count: args.count, tool_names }
        }
        TrimModeArg::TrimAllExceptLast => {
            TrimParams::TrimAllExceptLast { char_threshold: args.char_threshold, keep: args.keep, tool_names }
        }
    }
}

fn run_trim(ctx: &RuntimeContext, args: &TrimArgs) -> Result<()> {
    let record = find::resolve_ref(ctx, args.session.as_deref())?;
    let options = engine::TrimOptions { params: trim_params_from_args(args) };
    let outcome = engine::trim_session(&record.file_path, &options)?;
    println!(
        "trimmed {} -> {} ({} tool results, {} assistant messages, ~{} bytes removed)",
        record.session_id, outcome.record.session_id, outcome.tools_trimmed, outcome.assistant_messages_trimmed, outcome.bytes_removed
    );
    Ok(())
}

async fn run_smart_trim(ctx: &RuntimeContext, args: &SmartTrimArgs) -> Result<()> {
    let record = find::resolve_ref(ctx, args.session.as_deref())?;
    let agent = args.agent.map(Into::into).unwrap_or(record.agent);
    match smart_trim::smart_trim(&record.file_path, agent, args.instructions.clone()).await? {
        engine::SmartTrimResult::Trimmed(outcome) => {
            println!(
                "smart-trimmed {} -> {} ({} lines replaced, ~{} bytes removed)",
                record.session_id, outcome.record.session_id, outcome.lines_trimmed, outcome.bytes_removed
            );
        }
        engine::SmartTrimResult::AlreadyOptimal => {
            println!("{} already optimal, nothing to trim", record.session_id);
        }
    }
    Ok(())
}

fn run_clone(ctx: &RuntimeContext, session: Option<&str>) -> Result<()> {
    let record = find::resolve_ref(ctx, session)?;
    let cloned = engine::clone_session(&record.file_path)?;
    println!("cloned {} -> {}", record.session_id, cloned.session_id);
    Ok(())
}

fn run_repair(ctx: &RuntimeContext, session: Option<&str>) -> Result<()> {
    let record = find::resolve_ref(ctx, session)?;
    let report = engine::repair_session(&record.file_path)?;
    if report.changed {
        println!("repaired {}: {} field(s) rewritten ({} -> {})", report.path.display(), report.fields_rewritten, report.previous_session_id, report.corrected_session_id);
    } else {
        println!("{} already consistent, nothing to repair", report.path.display());
    }
    Ok(())
}

fn run_export(ctx: &RuntimeContext, args: &ExportArgs) -> Result<()> {
    if args.all {
        let filter = SessionFilter::default();
        let records = find::find_sessions(ctx, &filter)?;
        let summary = export::export_many(ctx, &records, args.force);
        println!("exported {}, skipped {}, failed {}", summary.exported, summary.skipped, summary.failed);
        return Ok(());
    }
    let record = find::resolve_ref(ctx, args.session.as_deref())?;
    let wrote = export::export_one(ctx, &record, args.force)?;
    if wrote {
        println!("exported {}", record.session_id);
    } else {
        println!("{} already exported, skipping (use --force to overwrite)", record.session_id);
    }
    Ok(())
}

async fn run_continue(ctx: &RuntimeContext, session: Option<&str>, agent_override: Option<Agent>, custom_instructions: Option<String>, shell_mode: bool) -> Result<()> {
    let record = find::resolve_ref(ctx, session)?;
    let lineage = engine::continuation_lineage(&record)?;
    let agent = agent_override.unwrap_or(record.agent);
    let runner = TokioCommandRunner;
    let options = continuation::ContinuationOptions { custom_instructions, ..Default::default() };
    let outcome = continuation::continue_lineage(ctx, &runner, agent, &lineage, &options).await?;

    if shell_mode {
        let resume_command = match agent {
            Agent::ClaudeCode => format!("claude --resume {}", outcome.new_session.session_id),
            Agent::Codex => format!("codex resume {}", outcome.new_session.session_id),
        };
        println!("{resume_command}");
    } else {
        eprintln!("spawned continuation session {}", outcome.new_session.session_id);
        #[cfg(unix)]
        {
            continuation::attach_interactive(&options.shell, agent, &outcome.new_session.session_id)?;
        }
        #[cfg(not(unix))]
        {
            eprintln!("attach manually: {}", outcome.new_session.session_id);
        }
    }
    Ok(())
}

fn run_resume(ctx: &RuntimeContext, session: Option<&str>, shell_mode: bool) -> Result<()> {
    let record = find::resolve_ref(ctx, session)?;
    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    if shell_mode {
        let resume_command = match record.agent {
            Agent::ClaudeCode => format!("claude --resume {}", record.session_id),
            Agent::Codex => format!("codex resume {}", record.session_id),
        };
        println!("{resume_command}");
        return Ok(());
    }
    #[cfg(unix)]
    {
        continuation::attach_interactive(&shell, record.agent, &record.session_id)?;
        unreachable!("attach_interactive only returns on error")
    }
    #[cfg(not(unix))]
    {
        Err(anyhow!("interactive resume requires a unix shell; pass --shell to get a launcher command instead"))
    }
}

fn run_search(ctx: &RuntimeContext, args: &SearchArgs, color: bool) -> Result<()> {
    let hits = index::search(ctx, args.query.as_deref(), args.project.as_deref(), args.limit)?;
    if hits.is_empty() {
        println!("no matches");
        return Ok(());
    }
    for hit in &hits {
        print_search_hit(hit, color);
    }
    Ok(())
}

fn run_index(ctx: &RuntimeContext, args: &IndexArgs) -> Result<()> {
    if let Some(export_root) = &args.from_exports {
        let report = index::build_from_exports(ctx, export_root, args.rebuild)?;
        println!("indexed {}, skipped {}", report.indexed, report.skipped);
        return Ok(());
    }
    let report = index::build_from_raw(ctx, &SessionFilter::default(), args.rebuild)?;
    println!("indexed {}, skipped {}, removed {}", report.indexed, report.skipped, report.removed);
    Ok(())
}

fn run_delete(ctx: &RuntimeContext, args: &DeleteArgs) -> Result<()> {
    let record = find::resolve_ref(ctx, args.session.as_deref())?;
    if !args.yes {
        return Err(anyhow!("refusing to delete {} without --yes", record.session_id));
    }
    delete::delete_session(&record)?;
    println!("deleted {}", record.session_id);
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = build_context(&cli)?;
    let color = color_enabled(cli.shell);

    match &cli.command {
        Command::Find(args) => run_find(&ctx, &filter_from_find_args(args, None, false, false), args.json, color),
        Command::FindClaude(args) => run_find(&ctx, &filter_from_find_args(args, Some(Agent::ClaudeCode), false, false), args.json, color),
        Command::FindCodex(args) => run_find(&ctx, &filter_from_find_args(args, Some(Agent::Codex), false, false), args.json, color),
        Command::FindOriginal(args) => run_find(&ctx, &filter_from_find_args(args, None, true, false), args.json, color),
        Command::FindDerived(args) => run_find(&ctx, &filter_from_find_args(args, None, false, true), args.json, color),
        Command::Trim(args) => run_trim(&ctx, args),
        Command::SmartTrim(args) => {
            let rt = tokio::runtime::Runtime::new().context("starting async runtime")?;
            rt.block_on(run_smart_trim(&ctx, args))
        }
        Command::Clone(args) => run_clone(&ctx, args.session.as_deref()),
        Command::Export(args) => run_export(&ctx, args),
        Command::Continue(args) => {
            let rt = tokio::runtime::Runtime::new().context("starting async runtime")?;
            rt.block_on(run_continue(&ctx, args.session.as_deref(), args.agent.map(Into::into), args.instructions.clone(), cli.shell))
        }
        Command::Resume(args) => run_resume(&ctx, args.session.as_deref(), cli.shell),
        Command::Search(args) => run_search(&ctx, args, color),
        Command::Index(args) => run_index(&ctx, args),
        Command::Repair(args) => run_repair(&ctx, args.session.as_deref()),
        Command::Delete(args) => run_delete(&ctx, args),
    }
}
