use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;
use loan_contract::{Contract, Outcome};
use loan_gateway::{GatewayConfig, LoanGateway};
use loan_store::{InMemoryStateStore, StagedStore};
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Invoke(args) => cmd_invoke(args, &cli.format),
        Command::Operations => cmd_operations(&cli.format),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn cmd_invoke(args: InvokeArgs, format: &OutputFormat) -> anyhow::Result<ExitCode> {
    let outcome = invoke_with_state(&args.state, &args.function, &args.args)?;
    match format {
        OutputFormat::Json => println!("{}", outcome_json(&args.function, &outcome)),
        OutputFormat::Text => print_outcome(&args.function, &outcome),
    }
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load the snapshot, run one invocation, and persist only a successful one.
fn invoke_with_state(state: &Path, function: &str, args: &[String]) -> anyhow::Result<Outcome> {
    let store = InMemoryStateStore::load_snapshot(state)?;
    let contract = Contract::new();

    let stage = StagedStore::begin(&store);
    let outcome = contract.invoke(&stage, function, args);
    if !outcome.is_success() {
        stage.rollback();
        return Ok(outcome);
    }

    let written = stage.commit()?;
    if written > 0 {
        store.save_snapshot(state)?;
        debug!(path = %state.display(), keys = written, "snapshot saved");
    }
    Ok(outcome)
}

fn outcome_json(function: &str, outcome: &Outcome) -> Value {
    match outcome {
        Outcome::Success { payload: Some(payload) } => {
            serde_json::from_slice(payload).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(payload).into_owned())
            })
        }
        Outcome::Success { payload: None } => json!({ "message": format!("{function} committed") }),
        Outcome::Failure { kind, message } => json!({ "kind": kind, "message": message }),
    }
}

fn print_outcome(function: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Success { payload: Some(_) } => {
            let rendered = outcome_json(function, outcome);
            match serde_json::to_string_pretty(&rendered) {
                Ok(text) => println!("{text}"),
                Err(_) => println!("{rendered}"),
            }
        }
        Outcome::Success { payload: None } => {
            println!("{} {} committed", "✓".green().bold(), function.bold());
        }
        Outcome::Failure { kind, message } => {
            eprintln!("{} {} {}", "✗".red().bold(), kind.to_string().red(), message);
        }
    }
}

fn cmd_operations(format: &OutputFormat) -> anyhow::Result<ExitCode> {
    let contract = Contract::new();
    match format {
        OutputFormat::Json => {
            let operations: Vec<_> = contract.operations().collect();
            println!("{}", serde_json::to_string_pretty(&operations)?);
        }
        OutputFormat::Text => {
            for info in contract.operations() {
                println!("{}({})", info.name.bold(), info.params.join(", ").cyan());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(state) = args.state {
        config.snapshot_path = Some(state);
    }

    let gateway = LoanGateway::new(config)?;
    println!("Loan gateway on {}", gateway.config().bind_addr.to_string().bold());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(gateway.serve())?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_contract::ErrorKind;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn write_persists_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");

        let outcome = invoke_with_state(&state, "addLender", &args(&["L1", "alice", "pw"])).unwrap();
        assert!(outcome.is_success());
        assert!(state.exists());

        let outcome = invoke_with_state(&state, "queryLenderByID", &args(&["L1"])).unwrap();
        let rows: Value = serde_json::from_slice(outcome.payload().unwrap()).unwrap();
        assert_eq!(rows[0]["Record"]["username"], "alice");
    }

    #[test]
    fn failure_leaves_snapshot_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        invoke_with_state(&state, "addLender", &args(&["L1", "alice", "pw"])).unwrap();
        let before = std::fs::read(&state).unwrap();

        let outcome = invoke_with_state(&state, "addLender", &args(&["L1", "eve", "pw"])).unwrap();
        assert_eq!(outcome.error_kind(), Some(ErrorKind::DuplicateKey));
        assert_eq!(std::fs::read(&state).unwrap(), before);
    }

    #[test]
    fn query_does_not_create_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let outcome = invoke_with_state(&state, "queryAllLenders", &[]).unwrap();
        assert_eq!(outcome.payload(), Some(&b"[]"[..]));
        assert!(!state.exists());
    }

    #[test]
    fn json_rendering() {
        let write = Outcome::success(None);
        assert_eq!(outcome_json("addLendee", &write)["message"], "addLendee committed");

        let query = Outcome::success(Some(br#"[{"Key":"D1","Record":{}}]"#.to_vec()));
        assert_eq!(outcome_json("queryLendeeByID", &query)[0]["Key"], "D1");

        let failure = Outcome::Failure {
            kind: ErrorKind::NotFound,
            message: "request does not exist: R1".into(),
        };
        let rendered = outcome_json("updateRequest", &failure);
        assert_eq!(rendered["kind"], "not_found");
        assert_eq!(rendered["message"], "request does not exist: R1");
    }
}
