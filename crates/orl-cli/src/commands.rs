use std::path::Path;

use anyhow::bail;
use colored::Colorize;

use orl_sdk::{Mutability, Orl, OwnerId, Payload, RecordId};

use crate::cli::*;
use crate::persist;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let caller = OwnerId::from_label(&cli.caller);

    let orl = match &cli.command {
        Command::Init(args) => return cmd_init(&cli.ledger, args.force),
        _ => persist::load(&cli.ledger)?,
    };
    let mutated = matches!(
        cli.command,
        Command::Add(_) | Command::SetData(_) | Command::Transfer(_)
    );

    match cli.command {
        Command::Init(_) => unreachable!(),
        Command::Add(args) => cmd_add(&orl, &caller, args, &cli.format)?,
        Command::SetData(args) => cmd_set_data(&orl, &caller, args, &cli.format)?,
        Command::Transfer(args) => cmd_transfer(&orl, &caller, args, &cli.format)?,
        Command::Show(args) => cmd_show(&orl, args, &cli.format)?,
        Command::Log(args) => cmd_log(&orl, args, &cli.format)?,
        Command::History(args) => cmd_history(&orl, args, &cli.format)?,
        Command::Holdings(args) => cmd_holdings(&orl, &caller, args, &cli.format)?,
        Command::Count(_) => cmd_count(&orl, &cli.format)?,
        Command::Verify(_) => cmd_verify(&orl, &cli.format)?,
        Command::Replay(_) => cmd_replay(&orl, &cli.format)?,
        Command::Whoami(_) => cmd_whoami(&cli.caller, &caller, &cli.format)?,
    }

    if mutated {
        persist::save(&orl, &cli.ledger)?;
    }
    Ok(())
}

fn parse_id(input: &str) -> anyhow::Result<RecordId> {
    Ok(input.parse::<RecordId>()?)
}

/// A 64-char hex string is taken as a raw owner id; anything else is a label.
fn resolve_owner(input: &str) -> OwnerId {
    OwnerId::from_hex(input).unwrap_or_else(|_| OwnerId::from_label(input))
}

fn short_hash(hash: &[u8; 32]) -> String {
    hex::encode(&hash[..4])
}

fn cmd_init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "ledger file {} already exists (use --force to overwrite)",
            path.display()
        );
    }
    let orl = Orl::init();
    persist::save(&orl, path)?;
    println!(
        "{} Initialized empty ledger in {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

fn cmd_add(orl: &Orl, caller: &OwnerId, args: AddArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let payload = Payload::parse_hex(&args.payload)?;
    let mutability = Mutability::from_flag(!args.immutable);
    let event = orl.session(caller.clone()).add_record(payload.as_bytes(), mutability)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&event)?),
        OutputFormat::Text => {
            println!(
                "{} Added {} ({})",
                "✓".green().bold(),
                event.id.to_string().yellow().bold(),
                event.mutability.to_string().cyan()
            );
            println!("  Owner:   {}", caller.short_id().cyan());
            println!("  Payload: {}", event.payload);
            println!(
                "  Event:   {} {}",
                format!("e#{}", event.seq).yellow(),
                format!("[{}]", short_hash(&event.event_hash)).dimmed()
            );
        }
    }
    Ok(())
}

fn cmd_set_data(
    orl: &Orl,
    caller: &OwnerId,
    args: SetDataArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let payload = Payload::parse_hex(&args.payload)?;
    let event = orl.session(caller.clone()).change_data(id, payload.as_bytes())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&event)?),
        OutputFormat::Text => {
            println!(
                "{} Data changed on {}",
                "✓".green().bold(),
                id.to_string().yellow().bold()
            );
            println!(
                "  {} → {}",
                event.old_payload.short_hex().dimmed(),
                event.new_payload.short_hex()
            );
        }
    }
    Ok(())
}

fn cmd_transfer(
    orl: &Orl,
    caller: &OwnerId,
    args: TransferArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    let new_owner = resolve_owner(&args.new_owner);
    let event = orl.session(caller.clone()).change_owner(id, &new_owner)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&event)?),
        OutputFormat::Text => {
            println!(
                "{} Transferred {}",
                "✓".green().bold(),
                id.to_string().yellow().bold()
            );
            println!(
                "  {} → {}",
                event.old_owner.short_id().cyan(),
                event.new_owner.short_id().cyan()
            );
        }
    }
    Ok(())
}

fn cmd_show(orl: &Orl, args: ShowArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let record = orl.record(parse_id(&args.id)?)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => {
            println!(
                "{}  {}",
                record.id.to_string().yellow().bold(),
                record.mutability.to_string().cyan()
            );
            println!("  Owner:   {}", record.owner.short_id().cyan());
            println!("  Payload: {}", record.payload);
        }
    }
    Ok(())
}

fn cmd_log(orl: &Orl, args: LogArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let events = orl.audit_log()?;
    let selected: Vec<_> = events.iter().rev().take(args.limit).collect();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&selected)?),
        OutputFormat::Text => {
            if selected.is_empty() {
                println!("Audit log is empty.");
            }
            for event in selected {
                println!(
                    "{} {}  {}  {}  by {}",
                    format!("e#{}", event.seq()).yellow().bold(),
                    format!("[{}]", event.short_hash()).dimmed(),
                    event.kind().to_string().cyan(),
                    event.record_id().to_string().bold(),
                    event.actor().short_id()
                );
            }
        }
    }
    Ok(())
}

fn cmd_history(orl: &Orl, args: HistoryArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let history = orl.history(parse_id(&args.id)?)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&history)?),
        OutputFormat::Text => {
            println!(
                "History of {} ({} event(s))",
                history.id.to_string().yellow().bold(),
                history.entries.len()
            );
            for entry in &history.entries {
                println!(
                    "{} {}  {}",
                    format!("e#{}", entry.seq).yellow(),
                    format!("[{}]", short_hash(&entry.event_hash)).dimmed(),
                    entry.summary
                );
                println!("    by {} at {}", entry.actor.short_id().cyan(), entry.timestamp);
            }
        }
    }
    Ok(())
}

fn cmd_holdings(
    orl: &Orl,
    caller: &OwnerId,
    args: HoldingsArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let owner = match &args.owner {
        Some(input) => resolve_owner(input),
        None => caller.clone(),
    };
    let holdings = orl.holdings(&owner)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&holdings)?),
        OutputFormat::Text => {
            println!(
                "{} holds {} record(s)",
                holdings.owner.short_id().cyan().bold(),
                holdings.records.len()
            );
            for id in &holdings.records {
                println!("  {}", id.to_string().yellow());
            }
        }
    }
    Ok(())
}

fn cmd_count(orl: &Orl, format: &OutputFormat) -> anyhow::Result<()> {
    let records = orl.record_count()?;
    let events = orl.event_count()?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "records": records, "events": events })
        ),
        OutputFormat::Text => {
            println!("Records: {}", records.to_string().bold());
            println!("Audit events: {}", events.to_string().bold());
        }
    }
    Ok(())
}

fn cmd_verify(orl: &Orl, format: &OutputFormat) -> anyhow::Result<()> {
    let report = orl.verify()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            let status = |ok: bool| if ok { "valid".green() } else { "BROKEN".red().bold() };
            println!(
                "Audit log: {} event(s) over {} record(s)",
                report.event_count.to_string().bold(),
                report.record_count.to_string().bold()
            );
            println!("  Hash chain:    {}", status(report.hash_chain_valid));
            println!("  Sequences:     {}", status(report.sequence_monotonic));
            println!("  Id assignment: {}", status(report.ids_dense));
            println!("  Authorization: {}", status(report.mutations_authorized));
            println!("  Immutability:  {}", status(report.immutability_respected));
            println!("  Prior values:  {}", status(report.old_values_consistent));
            for violation in &report.violations {
                println!(
                    "  {} seq {}: {}",
                    "✗".red().bold(),
                    violation.seq,
                    violation.description
                );
            }
            if report.is_valid() {
                println!("{} Audit log integrity verified", "✓".green().bold());
            }
        }
    }
    if !report.is_valid() {
        bail!(
            "audit log failed validation with {} violation(s)",
            report.violations.len()
        );
    }
    Ok(())
}

fn cmd_replay(orl: &Orl, format: &OutputFormat) -> anyhow::Result<()> {
    let result = orl.replay()?;
    let converged = orl.verify_convergence()?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "applied_events": result.applied_events,
                "records": result.records.len(),
                "converged": converged,
            })
        ),
        OutputFormat::Text => {
            println!(
                "{} Replay complete: {} event(s) rebuilt {} record(s)",
                "✓".green().bold(),
                result.applied_events.to_string().bold(),
                result.records.len().to_string().bold()
            );
            if converged {
                println!("  Convergence: {}", "live table matches".green());
            }
        }
    }
    if !converged {
        bail!("replayed state diverges from the live table");
    }
    Ok(())
}

fn cmd_whoami(label: &str, caller: &OwnerId, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "label": label,
                "short": caller.short_id(),
                "id": caller.to_hex(),
            })
        ),
        OutputFormat::Text => {
            println!("Caller: {}", caller.short_id().cyan().bold());
            println!("  Label: {}", label);
            println!("  Id:    {}", caller.to_hex());
        }
    }
    Ok(())
}
