use std::io::{self, BufRead, Write};

use pie_core::{OrderRule, SpokenLine, StateStorage};

use super::flow::{DeliveryReport, GameFlow, KitchenEvent, SceneKey};

/// One parsed driver command. The driver is the terminal stand-in for the
/// touch presentation: it translates lines to flow events and prints what
/// the player would see, and contains no game rules of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DriverCommand {
    Kitchen(KitchenEvent),
    Deliver,
    ShowState,
    Reset,
    Quit,
}

/// Map one input line onto a driver command. Blank lines and `#` comments
/// are skipped.
pub(crate) fn parse_command(line: &str) -> Result<Option<DriverCommand>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let mut parts = trimmed.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let rest = parts.collect::<Vec<_>>();

    let command = match (head, rest.as_slice()) {
        ("begin", []) => DriverCommand::Kitchen(KitchenEvent::BeginAssembly),
        ("filling", [id]) => DriverCommand::Kitchen(KitchenEvent::ApplyFilling((*id).to_string())),
        ("lattice", []) => DriverCommand::Kitchen(KitchenEvent::ApplyLattice),
        ("bake", []) => DriverCommand::Kitchen(KitchenEvent::Bake),
        ("topping", [id]) => DriverCommand::Kitchen(KitchenEvent::AddTopping((*id).to_string())),
        ("carry", []) => DriverCommand::Kitchen(KitchenEvent::CarryToHall),
        ("deliver", []) => DriverCommand::Deliver,
        ("state", []) => DriverCommand::ShowState,
        ("reset", []) => DriverCommand::Reset,
        ("quit" | "exit", []) => DriverCommand::Quit,
        ("filling" | "topping", _) => {
            return Err(format!("{head} takes exactly one identifier"));
        }
        (
            "begin" | "lattice" | "bake" | "carry" | "deliver" | "state" | "reset" | "quit"
            | "exit",
            _,
        ) => {
            return Err(format!("{head} takes no arguments"));
        }
        (other, _) => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

pub(crate) fn run_driver<S, R, W>(
    flow: &mut GameFlow<S>,
    input: R,
    output: &mut W,
) -> io::Result<()>
where
    S: StateStorage,
    R: BufRead,
    W: Write,
{
    writeln!(
        output,
        "piehouse ready | stage {} | type 'begin' to start a pie",
        flow.store().state().stage_id
    )?;

    for line in input.lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(output, "error: {message}")?;
                continue;
            }
        };
        match command {
            DriverCommand::Quit => break,
            DriverCommand::Reset => {
                flow.start_new_run();
                writeln!(output, "new run started | stage 1")?;
            }
            DriverCommand::ShowState => print_state(flow, output)?,
            DriverCommand::Kitchen(event) => {
                let carrying = matches!(event, KitchenEvent::CarryToHall);
                match flow.handle_kitchen_event(event) {
                    Ok(()) => {
                        if carrying && flow.active_scene() == SceneKey::Hall {
                            print_hall_entry(flow, output)?;
                        }
                    }
                    Err(error) => writeln!(output, "error: {error}")?,
                }
            }
            DriverCommand::Deliver => match flow.deliver() {
                Some(report) => print_delivery(flow, &report, output)?,
                None => writeln!(output, "nothing to deliver here")?,
            },
        }
    }
    Ok(())
}

fn print_state<S: StateStorage, W: Write>(flow: &GameFlow<S>, output: &mut W) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(flow.store().state())
        .unwrap_or_else(|_| "<unprintable>".to_string());
    writeln!(output, "scene: {}", flow.active_scene().as_token())?;
    let counts = flow.kitchen_event_counts();
    writeln!(
        output,
        "kitchen events: {} handled, {} ignored",
        counts.total, counts.ignored
    )?;
    writeln!(output, "{rendered}")
}

fn print_line<W: Write>(line: &SpokenLine, output: &mut W) -> io::Result<()> {
    match &line.speaker {
        Some(speaker) => writeln!(output, "{speaker}: {}", line.text),
        None => writeln!(output, "{}", line.text),
    }
}

fn print_hall_entry<S: StateStorage, W: Write>(
    flow: &GameFlow<S>,
    output: &mut W,
) -> io::Result<()> {
    let Some(stage) = flow.hall_stage() else {
        return Ok(());
    };
    if let Some(name) = &stage.name {
        writeln!(output, "-- {name} --")?;
    }
    let customer = stage.lead_customer();
    for line in &customer.pre_dialogue {
        print_line(line, output)?;
    }
    writeln!(output, "order: {}", describe_order(&customer.order))?;
    writeln!(output, "drop the pie with 'deliver'")
}

fn print_delivery<S: StateStorage, W: Write>(
    flow: &GameFlow<S>,
    report: &DeliveryReport,
    output: &mut W,
) -> io::Result<()> {
    print_line(&report.line, output)?;
    if report.ok {
        writeln!(
            output,
            "delivered! stage {} -> {}",
            report.stage_before, report.stage_after
        )?;
    } else {
        writeln!(
            output,
            "rejected. back to the kitchen (stage {})",
            report.stage_after
        )?;
    }
    if let Some(ending) = flow.finished() {
        for line in &report.epilogue {
            print_line(line, output)?;
        }
        writeln!(output, "ending: {}", ending.as_token())?;
        writeln!(output, "type 'reset' to play again")?;
    }
    Ok(())
}

fn describe_order(order: &OrderRule) -> String {
    let mut parts = Vec::new();
    if let Some(filling) = &order.filling {
        parts.push(format!("filling {filling}"));
    }
    if !order.ignore_lattice {
        match order.needs_lattice {
            Some(true) => parts.push("lattice on top".to_string()),
            Some(false) => parts.push("no lattice".to_string()),
            None => {}
        }
    }
    if !order.ignore_toppings {
        if let Some(toppings) = &order.toppings {
            if !toppings.is_empty() {
                let listed = toppings.iter().cloned().collect::<Vec<_>>().join(", ");
                parts.push(format!("toppings {listed}"));
            }
        }
    }
    if parts.is_empty() {
        "anything, as long as it is baked".to_string()
    } else {
        parts.join(" + ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pie_core::{MemoryStorage, RunStateStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn write_stage(dir: &TempDir, id: u8, order: serde_json::Value) {
        let value = json!({
            "id": id,
            "name": format!("Stage {id}"),
            "customers": [
                {
                    "order": order,
                    "success_line": { "speaker": "customer", "text": "Wonderful!" },
                    "fail_line": { "speaker": "customer", "text": "Send it back." },
                    "pre_dialogue": [ { "speaker": "customer", "text": "I have been waiting." } ]
                }
            ]
        });
        let path = pie_core::stage_file_path(dir.path(), id);
        std::fs::write(path, value.to_string()).expect("write stage");
    }

    fn run_script(dir: &TempDir, script: &str) -> (GameFlow<MemoryStorage>, String) {
        let store = RunStateStore::open(MemoryStorage::default());
        let mut flow = GameFlow::new(store, dir.path().to_path_buf());
        let mut output = Vec::new();
        run_driver(&mut flow, script.as_bytes(), &mut output).expect("driver run");
        (flow, String::from_utf8(output).expect("utf8 output"))
    }

    #[test]
    fn parse_maps_known_commands() {
        assert_eq!(
            parse_command("begin").expect("parse"),
            Some(DriverCommand::Kitchen(KitchenEvent::BeginAssembly))
        );
        assert_eq!(
            parse_command("filling pie_jam_apple").expect("parse"),
            Some(DriverCommand::Kitchen(KitchenEvent::ApplyFilling(
                "pie_jam_apple".to_string()
            )))
        );
        assert_eq!(
            parse_command("  deliver  ").expect("parse"),
            Some(DriverCommand::Deliver)
        );
        assert_eq!(parse_command("exit").expect("parse"), Some(DriverCommand::Quit));
    }

    #[test]
    fn parse_skips_blanks_and_comments() {
        assert_eq!(parse_command("").expect("parse"), None);
        assert_eq!(parse_command("   ").expect("parse"), None);
        assert_eq!(parse_command("# a comment").expect("parse"), None);
    }

    #[test]
    fn parse_rejects_bad_arity_and_unknown_commands() {
        assert!(parse_command("filling").is_err());
        assert!(parse_command("filling a b").is_err());
        assert!(parse_command("bake now").is_err());
        assert!(parse_command("microwave").is_err());
    }

    #[test]
    fn scripted_session_plays_one_stage() {
        let dir = TempDir::new().expect("tempdir");
        write_stage(
            &dir,
            1,
            json!({ "filling": "pie_jam_apple", "ignore_lattice": true, "ignore_toppings": true }),
        );

        let script = "begin\nfilling pie_jam_apple\nbake\ncarry\ndeliver\nstate\nquit\n";
        let (flow, output) = run_script(&dir, script);

        assert!(output.contains("-- Stage 1 --"), "{output}");
        assert!(output.contains("I have been waiting."), "{output}");
        assert!(output.contains("order: filling pie_jam_apple"), "{output}");
        assert!(output.contains("customer: Wonderful!"), "{output}");
        assert!(output.contains("delivered! stage 1 -> 2"), "{output}");
        assert_eq!(flow.store().state().stage_id, 2);
        assert_eq!(flow.store().state().stats.good, 1);
    }

    #[test]
    fn rejected_delivery_is_reported_and_the_session_continues() {
        let dir = TempDir::new().expect("tempdir");
        write_stage(
            &dir,
            1,
            json!({ "filling": "pie_jam_apple", "ignore_lattice": true, "ignore_toppings": true }),
        );

        let script = "begin\nfilling pie_jam_peach\nbake\ncarry\ndeliver\nquit\n";
        let (flow, output) = run_script(&dir, script);

        assert!(output.contains("customer: Send it back."), "{output}");
        assert!(output.contains("rejected. back to the kitchen (stage 1)"), "{output}");
        assert_eq!(flow.store().state().stats.bad, 1);
    }

    #[test]
    fn unknown_command_reports_an_error_without_stopping() {
        let dir = TempDir::new().expect("tempdir");
        let script = "microwave\nstate\nquit\n";
        let (_, output) = run_script(&dir, script);
        assert!(output.contains("error: unknown command 'microwave'"), "{output}");
        assert!(output.contains("scene: kitchen"), "{output}");
    }

    #[test]
    fn delivering_from_the_kitchen_prints_a_hint() {
        let dir = TempDir::new().expect("tempdir");
        let (_, output) = run_script(&dir, "deliver\nquit\n");
        assert!(output.contains("nothing to deliver here"), "{output}");
    }

    #[test]
    fn order_descriptions_cover_the_rule_shapes() {
        assert_eq!(
            describe_order(&OrderRule {
                ignore_lattice: true,
                ignore_toppings: true,
                ..OrderRule::default()
            }),
            "anything, as long as it is baked"
        );
        let full = OrderRule {
            filling: Some("pie_jam_apple".to_string()),
            needs_lattice: Some(true),
            ignore_lattice: false,
            toppings: Some(["pie_ingredient_cherry".to_string()].into_iter().collect()),
            ignore_toppings: false,
        };
        assert_eq!(
            describe_order(&full),
            "filling pie_jam_apple + lattice on top + toppings pie_ingredient_cherry"
        );
        assert_eq!(
            describe_order(&OrderRule {
                needs_lattice: Some(false),
                ..OrderRule::default()
            }),
            "no lattice"
        );
    }
}
