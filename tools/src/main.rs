//! triage-runner: headless front end for the ticket triage engine.
//!
//! Usage:
//!   triage-runner --data-dir ./data --ticket draft.json --export-dir ./out
//!   triage-runner --data-dir ./data --train
//!   triage-runner --data-dir ./data --db tickets.db --ipc-mode

use anyhow::Result;
use serde::Serialize;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use triage_core::{
    bayes::BayesTicket,
    config::TriageConfig,
    desk::TriageDesk,
    store::{MemoryTicketStore, SqliteTicketStore, TicketStore},
    ticket::TicketDraft,
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Submit { ticket: TicketDraft },
    Predict { ticket: BayesTicket },
    Train,
    ModelStats,
    ResetModel,
    Complete { ticket_id: String },
    Remove { ticket_id: String },
    History { ticket_id: String },
    DailyCost { employee: String },
    Employees,
    Export { ticket: TicketDraft, dir: String },
    CostReport,
    ProcessOverdue,
    List,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let train = args.iter().any(|a| a == "--train");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let db = flag_value(&args, "--db");
    let ticket_file = flag_value(&args, "--ticket");
    let export_dir = flag_value(&args, "--export-dir");

    let config = TriageConfig::load(data_dir)?;

    if !ipc_mode {
        println!("Ticket Triage — triage-runner");
        println!("  data_dir:  {data_dir}");
        println!("  db:        {}", db.unwrap_or("(memory)"));
        println!();
    }

    let store: Box<dyn TicketStore> = match db {
        Some(path) => {
            let store = SqliteTicketStore::open(path)?;
            store.migrate()?;
            Box::new(store)
        }
        None => Box::new(MemoryTicketStore::new()),
    };

    let mut desk = TriageDesk::build(config, store);

    if train {
        let report = desk.train_model();
        if !ipc_mode {
            print_json("training", &report)?;
        }
    }

    if ipc_mode {
        run_ipc_loop(&mut desk)?;
    } else if let Some(path) = ticket_file {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let draft: TicketDraft = serde_json::from_str(&content)?;
        let submission = desk.submit(&draft)?;
        print_json("classification", &submission)?;
        if let Some(dir) = export_dir {
            let path = desk
                .export(&draft, Some(&submission.classification))
                .write_to(Path::new(dir))?;
            println!("  exported:  {}", path.display());
            println!();
        }
        print_summary(&mut desk)?;
    } else if !train {
        print_summary(&mut desk)?;
    }

    Ok(())
}

fn run_ipc_loop(desk: &mut TriageDesk) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let reply = match handle_command(desk, cmd) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("IPC command failed: {e}");
                serde_json::json!({ "error": e.to_string() })
            }
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(desk: &mut TriageDesk, cmd: IpcCommand) -> Result<serde_json::Value> {
    let value = match cmd {
        IpcCommand::Submit { ticket } => serde_json::to_value(desk.submit(&ticket)?)?,
        IpcCommand::Predict { ticket } => serde_json::to_value(desk.predict(&ticket)?)?,
        IpcCommand::Train => serde_json::to_value(desk.train_model())?,
        IpcCommand::ModelStats => serde_json::to_value(desk.bayes().model_stats()?)?,
        IpcCommand::ResetModel => {
            desk.bayes_mut().reset();
            serde_json::json!({ "is_trained": false })
        }
        IpcCommand::Complete { ticket_id } => {
            let completed = desk.costs_mut().complete_ticket(&ticket_id)?;
            serde_json::json!({ "ticket_id": ticket_id, "completed": completed })
        }
        IpcCommand::Remove { ticket_id } => {
            let removed = desk.costs_mut().remove_ticket(&ticket_id)?;
            serde_json::json!({ "ticket_id": ticket_id, "removed": removed })
        }
        IpcCommand::History { ticket_id } => {
            serde_json::to_value(desk.costs().delay_history(&ticket_id)?)?
        }
        IpcCommand::DailyCost { employee } => {
            let daily_cost = desk.costs().daily_cost_for(&employee);
            serde_json::json!({ "employee": employee, "daily_cost": daily_cost })
        }
        IpcCommand::Employees => serde_json::to_value(desk.costs().employees())?,
        IpcCommand::Export { ticket, dir } => {
            let classification = desk.classify(&ticket);
            let path = desk.export(&ticket, Some(&classification)).write_to(Path::new(&dir))?;
            serde_json::json!({ "path": path.display().to_string() })
        }
        IpcCommand::CostReport => serde_json::to_value(desk.costs_mut().calculate_cost_of_delay()?)?,
        IpcCommand::ProcessOverdue => serde_json::to_value(desk.costs_mut().process_overdue_tickets()?)?,
        IpcCommand::List => serde_json::to_value(desk.costs().all_tickets()?)?,
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn print_summary(desk: &mut TriageDesk) -> Result<()> {
    let tickets = desk.costs().all_tickets()?;
    let active = tickets.iter().filter(|t| t.is_active()).count();
    let report = desk.costs_mut().calculate_cost_of_delay()?;

    println!("=== COST OF DELAY ===");
    println!("  tickets:        {}", tickets.len());
    println!("  active:         {active}");
    println!("  overdue:        {}", report.overdue_tickets.len());
    println!("  total cost:     ${:.2}", report.total_cost);
    for manager in &report.manager_costs {
        println!(
            "  {} | {} ticket(s) | ${:.2}",
            manager.manager_name,
            manager.tickets.len(),
            manager.total_cost
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(title: &str, value: &T) -> Result<()> {
    println!("=== {} ===", title.to_uppercase());
    println!("{}", serde_json::to_string_pretty(value)?);
    println!();
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
